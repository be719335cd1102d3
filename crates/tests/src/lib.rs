//! Integration test harness for the prog engine.
//!
//! Wires an [`Engine`] with the core function library, an incident log
//! and a recording host so tests can go from source text to results in a
//! few lines.

use prog_functions::core_library;
use prog_runtime::{
    CallContext, Engine, EngineConfig, ExecutionFault, FunctionDescriptor, FunctionRegistry, Host,
    Incident, IncidentKind, IncidentLog, Prog, ProgId, ReturnSpec, RuntimeError,
};
use prog_types::{BaseType, CalendarTime, EntityRef, NativeValue, TypeDescriptor, Value};

/// The zone returned by the `world()` test function.
pub fn world_entity() -> EntityRef {
    EntityRef::new(BaseType::Zone, 1)
}

fn world(_: &mut CallContext<'_>, _: &[Value]) -> Result<Value, ExecutionFault> {
    Ok(Value::entity(world_entity()))
}

/// Core library plus `world()`, which gives scheduled progs an entity to
/// keep state on.
pub fn test_library() -> FunctionRegistry {
    let mut functions = core_library();
    functions.register(FunctionDescriptor::new(
        "world",
        "testing",
        "The test world zone: `world()`",
        vec![],
        ReturnSpec::Fixed(TypeDescriptor::scalar(BaseType::Zone)),
        world,
    ));
    functions
}

/// Host that records everything progs send.
#[derive(Debug)]
pub struct RecordingHost {
    pub now: CalendarTime,
    pub sent: Vec<(EntityRef, String)>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            now: CalendarTime::EPOCH,
            sent: Vec::new(),
        }
    }
}

impl Host for RecordingHost {
    fn now(&self) -> CalendarTime {
        self.now
    }

    fn output(&mut self, target: EntityRef, text: &str) {
        self.sent.push((target, text.to_string()));
    }
}

/// Parse `"<type> <name>"`.
///
/// # Panics
///
/// Panics on a malformed declaration.
fn parameter(text: &str) -> (TypeDescriptor, String) {
    let (ty, name) = text
        .trim()
        .rsplit_once(' ')
        .unwrap_or_else(|| panic!("bad parameter declaration '{}'", text));
    let ty = TypeDescriptor::parse(ty.trim()).unwrap_or_else(|e| panic!("bad parameter type in '{}': {}", text, e));
    (ty, name.to_string())
}

pub struct TestHarness {
    pub engine: Engine,
    pub incidents: IncidentLog,
    pub host: RecordingHost,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let incidents = IncidentLog::new();
        let engine = Engine::with_config(test_library(), config).with_notifier(incidents.clone());
        Self {
            engine,
            incidents,
            host: RecordingHost::default(),
        }
    }

    /// Build a prog without compiling it.
    pub fn build(&self, name: &str, returns: &str, params: &[&str], source: &str) -> Prog {
        let return_type = TypeDescriptor::parse(returns).unwrap_or_else(|e| panic!("bad return type: {}", e));
        let mut prog = Prog::new(self.engine.library().next_id(), name, return_type).with_source(source);
        for p in params {
            let (ty, name) = parameter(p);
            prog = prog.with_parameter(ty, name);
        }
        prog
    }

    /// Add a prog without compiling it.
    ///
    /// # Panics
    ///
    /// Panics if the name is already taken.
    pub fn add(&mut self, name: &str, returns: &str, params: &[&str], source: &str) -> ProgId {
        let prog = self.build(name, returns, params, source);
        self.add_built(prog)
    }

    /// Add a prog assembled with [`TestHarness::build`].
    pub fn add_built(&mut self, prog: Prog) -> ProgId {
        self.engine
            .add_prog(prog)
            .unwrap_or_else(|e| panic!("failed to add prog: {}", e))
    }

    /// Add and compile a prog, returning the compile failure if any.
    pub fn try_prog(
        &mut self,
        name: &str,
        returns: &str,
        params: &[&str],
        source: &str,
    ) -> Result<ProgId, RuntimeError> {
        let id = self.add(name, returns, params, source);
        self.engine.compile(id).map(|_| id)
    }

    /// Add and compile a prog.
    ///
    /// # Panics
    ///
    /// Panics if compilation fails.
    pub fn prog(&mut self, name: &str, returns: &str, params: &[&str], source: &str) -> ProgId {
        match self.try_prog(name, returns, params, source) {
            Ok(id) => id,
            Err(e) => panic!("prog '{}' failed to compile: {}", name, e),
        }
    }

    /// Execute through the host-facing entry point.
    pub fn run(&mut self, id: ProgId, args: &[NativeValue]) -> NativeValue {
        self.engine.execute(&mut self.host, id, args)
    }

    /// Execute with already-typed arguments, keeping the fault.
    pub fn try_run(&mut self, id: ProgId, args: Vec<Value>) -> Result<Value, ExecutionFault> {
        self.engine.try_execute(&mut self.host, id, args)
    }

    pub fn incidents(&self) -> Vec<Incident> {
        self.incidents.incidents()
    }

    /// Incidents of one kind.
    pub fn incidents_of(&self, kind: IncidentKind) -> Vec<Incident> {
        self.incidents()
            .into_iter()
            .filter(|incident| incident.kind == kind)
            .collect()
    }
}

/// A number argument.
pub fn num(n: f64) -> NativeValue {
    NativeValue::Number(n)
}

/// A text argument.
pub fn text(s: &str) -> NativeValue {
    NativeValue::Text(s.to_string())
}

/// A character entity argument.
pub fn character(id: u64) -> NativeValue {
    NativeValue::Entity(EntityRef::new(BaseType::Character, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_parsing() {
        assert_eq!(parameter("number x"), (TypeDescriptor::NUMBER, "x".to_string()));
        assert_eq!(
            parameter("character sequence crowd"),
            (TypeDescriptor::sequence_of(BaseType::Character), "crowd".to_string())
        );
    }

    #[test]
    fn test_world_function_is_registered() {
        assert!(test_library().is_known("world"));
        assert!(test_library().is_known("getregister"));
    }
}
