//! The prog engine
//!
//! [`Engine`] owns the prog library, the built-in function table, the
//! Variable Register, the fully-static result cache and the notifier. It is
//! the only place where an [`ExecutionFault`] turns into "null plus an
//! incident"; everything below it works with `Result`.

use tracing::{debug, info, instrument, warn};

use prog_compiler::{CompileEnv, CompileError, ProgId};
use prog_types::{NativeValue, Value, marshal};

use crate::cache::StaticResultCache;
use crate::config::EngineConfig;
use crate::error::{ExecutionFault, Result, RuntimeError};
use crate::exec::{ExecutionContext, incident_kind, render_arguments};
use crate::functions::FunctionRegistry;
use crate::host::Host;
use crate::notify::{Incident, IncidentKind, Notifier, TracingNotifier};
use crate::prog::{Prog, ProgLibrary};
use crate::register::VariableRegister;

pub struct Engine {
    library: ProgLibrary,
    functions: FunctionRegistry,
    register: VariableRegister,
    cache: StaticResultCache,
    notifier: Box<dyn Notifier>,
    config: EngineConfig,
}

impl Engine {
    /// An engine with the given built-ins, default configuration and a
    /// notifier that logs incidents.
    pub fn new(functions: FunctionRegistry) -> Self {
        Self::with_config(functions, EngineConfig::default())
    }

    pub fn with_config(functions: FunctionRegistry, config: EngineConfig) -> Self {
        info!(
            functions = functions.len(),
            max_recursion_depth = config.max_recursion_depth,
            "prog engine created"
        );
        Self {
            library: ProgLibrary::new(),
            functions,
            register: VariableRegister::new(),
            cache: StaticResultCache::new(),
            notifier: Box::new(TracingNotifier),
            config,
        }
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn library(&self) -> &ProgLibrary {
        &self.library
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn register(&self) -> &VariableRegister {
        &self.register
    }

    pub fn register_mut(&mut self) -> &mut VariableRegister {
        &mut self.register
    }

    pub fn static_cache(&self) -> &StaticResultCache {
        &self.cache
    }

    pub fn prog(&self, id: ProgId) -> Option<&Prog> {
        self.library.get(id)
    }

    pub fn prog_by_name(&self, name: &str) -> Option<&Prog> {
        self.library.by_name(name)
    }

    /// Add a prog to the library. It starts uncompiled.
    pub fn add_prog(&mut self, prog: Prog) -> Result<ProgId> {
        let id = self.library.insert(prog)?;
        debug!(prog = %id, "prog added");
        Ok(id)
    }

    pub fn remove_prog(&mut self, id: ProgId) -> Option<Prog> {
        self.cache.invalidate(id);
        self.library.remove(id)
    }

    /// Replace a prog's source. The prog is uncompiled until the next
    /// [`Engine::compile`].
    pub fn set_source(&mut self, id: ProgId, source: impl Into<String>) -> Result<()> {
        let prog = self.library.get_mut(id).ok_or(RuntimeError::UnknownProg(id))?;
        prog.set_source(source);
        self.cache.invalidate(id);
        Ok(())
    }

    /// Compile one prog against the current library, functions and register.
    ///
    /// On failure the prog is left uncompiled with no partial statements.
    /// Either way its cached static result is discarded.
    pub fn compile(&mut self, id: ProgId) -> Result<()> {
        let prog = self.library.get(id).ok_or(RuntimeError::UnknownProg(id))?;
        let env = CompileEnv {
            functions: &self.functions,
            progs: &self.library,
            registers: &self.register,
        };
        let outcome = prog_compiler::compile(prog.source(), &prog.parameters, prog.return_type, &env);
        let name = prog.name.clone();

        self.cache.invalidate(id);
        let prog = self.library.get_mut(id).ok_or(RuntimeError::UnknownProg(id))?;
        match outcome {
            Ok(statements) => {
                debug!(prog = %id, name = %name, statements = statements.len(), "prog compiled");
                prog.set_compiled(statements);
                Ok(())
            }
            Err(error) => {
                if self.config.log_compile_failures {
                    warn!(prog = %id, name = %name, line = error.line, "{}", error.message);
                }
                prog.set_failed(error.clone());
                Err(RuntimeError::Compile { prog: name, error })
            }
        }
    }

    /// Compile every prog, returning the ones that failed.
    pub fn compile_all(&mut self) -> Vec<(ProgId, CompileError)> {
        let mut failures = Vec::new();
        for id in self.library.ids() {
            if let Err(RuntimeError::Compile { error, .. }) = self.compile(id) {
                failures.push((id, error));
            }
        }
        info!(
            progs = self.library.len(),
            failed = failures.len(),
            "prog library compiled"
        );
        failures
    }

    /// Run a prog with host-side arguments.
    ///
    /// Never fails: bad arguments become typed nulls, and any fault is
    /// reported to the notifier and yields [`NativeValue::Null`].
    #[instrument(skip_all, fields(prog = %id))]
    pub fn execute(&mut self, host: &mut dyn Host, id: ProgId, args: &[NativeValue]) -> NativeValue {
        let Some(prog) = self.library.get(id) else {
            self.report(id, String::new(), IncidentKind::UnknownProg, format!("prog not found: {}", id), args_text(args));
            return NativeValue::Null;
        };

        if args.len() > prog.parameters.len() && !prog.accepts_any_parameters {
            let message = format!(
                "expected {} arguments, got {}",
                prog.parameters.len(),
                args.len()
            );
            let name = prog.name.clone();
            self.report(id, name, IncidentKind::SurplusArguments, message, args_text(args));
            return NativeValue::Null;
        }

        let mut values = Vec::with_capacity(prog.parameters.len());
        let mut mismatches = Vec::new();
        for (index, parameter) in prog.parameters.iter().enumerate() {
            let value = match args.get(index) {
                Some(native) => marshal(parameter.ty, native).unwrap_or_else(|error| {
                    mismatches.push(format!("parameter '{}': {}", parameter.name, error));
                    Value::null(parameter.ty)
                }),
                None => Value::null(parameter.ty),
            };
            values.push(value);
        }
        let name = prog.name.clone();
        for message in mismatches {
            self.report(id, name.clone(), IncidentKind::ArgumentMismatch, message, args_text(args));
        }

        let arguments = render_arguments(&values);
        match self.try_execute(host, id, values) {
            Ok(value) => value.to_native(),
            Err(fault) => {
                let kind = incident_kind(&fault);
                self.report(id, name, kind, fault.to_string(), arguments);
                NativeValue::Null
            }
        }
    }

    /// Run a prog with already-typed arguments, returning the fault instead
    /// of reporting it. Faults in nested prog calls are still reported.
    pub fn try_execute(
        &mut self,
        host: &mut dyn Host,
        id: ProgId,
        args: Vec<Value>,
    ) -> std::result::Result<Value, ExecutionFault> {
        let mut ctx = ExecutionContext {
            library: &self.library,
            functions: &self.functions,
            register: &mut self.register,
            cache: &mut self.cache,
            notifier: self.notifier.as_ref(),
            host,
            depth: 0,
            max_depth: self.config.max_recursion_depth,
        };
        ctx.invoke(id, args)
    }

    fn report(&self, prog: ProgId, prog_name: String, kind: IncidentKind, message: String, arguments: Vec<String>) {
        self.notifier.report(Incident {
            prog,
            prog_name,
            kind,
            message,
            arguments,
        });
    }
}

fn args_text(args: &[NativeValue]) -> Vec<String> {
    args.iter().map(|arg| format!("{:?}", arg)).collect()
}
