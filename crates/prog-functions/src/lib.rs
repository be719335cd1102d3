//! Prog Functions
//!
//! The core built-in function library. Each module contributes an explicit
//! list of [`FunctionDescriptor`]s; [`core_library`] gathers them into one
//! [`FunctionRegistry`]. Hosts add their own domain functions to the same
//! registry before handing it to the engine.

mod args;
pub mod collections;
pub mod math;
pub mod register;
pub mod text;
pub mod world;

use prog_runtime::{FunctionDescriptor, FunctionRegistry};
use tracing::debug;

/// Every core descriptor, grouped by module.
pub fn core_descriptors() -> Vec<FunctionDescriptor> {
    let mut all = Vec::new();
    all.extend(math::descriptors());
    all.extend(text::descriptors());
    all.extend(collections::descriptors());
    all.extend(world::descriptors());
    all.extend(register::descriptors());
    all
}

/// A registry holding the core library.
pub fn core_library() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.extend(core_descriptors());
    debug!(functions = registry.len(), "core function library loaded");
    registry
}

#[cfg(test)]
pub(crate) mod testing {
    use prog_runtime::{CallContext, ExecutionFault, FunctionImpl, NullHost, VariableRegister};
    use prog_types::Value;

    pub fn call(f: FunctionImpl, args: &[Value]) -> Result<Value, ExecutionFault> {
        let mut register = VariableRegister::new();
        call_with(f, &mut register, args)
    }

    pub fn call_with(
        f: FunctionImpl,
        register: &mut VariableRegister,
        args: &[Value],
    ) -> Result<Value, ExecutionFault> {
        let mut host = NullHost;
        let mut ctx = CallContext {
            function: "test",
            register,
            host: &mut host,
        };
        f(&mut ctx, args)
    }
}
