//! Prog runtime
//!
//! Runs compiled progs against a host simulation.
//!
//! - [`Engine`] - prog library, compilation, execution with the recursion
//!   ceiling and the fully-static result cache
//! - [`VariableRegister`] - typed per-entity properties with category defaults
//! - [`Scheduler`] - recurring prog invocations on the game calendar
//! - [`Snapshot`] - the records a storage layer persists
//!
//! Execution faults never escape [`Engine::execute`]; they are reported to a
//! [`Notifier`] and the call yields null.

pub mod cache;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod functions;
pub mod host;
pub mod notify;
pub mod persist;
pub mod prog;
pub mod register;
pub mod schedule;
pub mod scope;

pub use cache::StaticResultCache;
pub use calendar::{GameCalendar, GameClock, IntervalUnit, RecurringInterval};
pub use config::{ConfigError, DEFAULT_MAX_RECURSION_DEPTH, EngineConfig};
pub use engine::Engine;
pub use error::{ExecutionFault, Result, RuntimeError};
pub use functions::{
    CallContext, FunctionDescriptor, FunctionImpl, FunctionRegistry, ParamSpec, ReturnResolver,
    ReturnSpec,
};
pub use host::{Host, NullHost};
pub use notify::{Incident, IncidentKind, IncidentLog, Notifier, TracingNotifier};
pub use persist::{ProgRecord, RegisterValueRecord, Snapshot};
pub use prog::{Prog, ProgLibrary, StaticKind};
pub use register::{PropertyDeclaration, VariableRegister};
pub use schedule::{
    EventHandle, Firing, ProgSchedule, ScheduleId, ScheduleRecord, Scheduler, TemporalService,
};
pub use scope::{FrameId, ScopeArena};

pub use prog_compiler::{CompileError, ProgId};
