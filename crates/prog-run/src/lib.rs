//! Prog Run
//!
//! Support code for the `prog-run` command-line tool: logging set-up,
//! reading a prog from a source file, and converting arguments and results
//! between JSON and host values.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Value as Json, json};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use prog_runtime::{ConfigError, Engine, Host, Prog, ProgId, RuntimeError};
use prog_types::{BaseType, CalendarTime, EntityRef, NativeValue, TypeDescriptor, TypeError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parameter '{0}': expected '<type> <name>'")]
    Parameter(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid JSON argument: {0}")]
    Json(#[from] serde_json::Error),
}

/// Initialize logging with a default filter.
///
/// `RUST_LOG` overrides the default of `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

/// Parse `"<type> <name>"`, e.g. `"character sequence visitors"`.
pub fn parse_parameter(text: &str) -> Result<(TypeDescriptor, String), CliError> {
    let (ty, name) = text
        .trim()
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| CliError::Parameter(text.to_string()))?;
    if name.is_empty() || ty.trim().is_empty() {
        return Err(CliError::Parameter(text.to_string()));
    }
    Ok((TypeDescriptor::parse(ty.trim())?, name.to_string()))
}

/// Signature and options for a prog read from a file.
#[derive(Debug, Clone)]
pub struct ProgSpec {
    pub name: String,
    pub return_type: TypeDescriptor,
    pub parameters: Vec<(TypeDescriptor, String)>,
    pub fully_static: bool,
}

/// Add the prog in `path` to the engine and compile it.
pub fn load_prog(engine: &mut Engine, path: &Path, spec: &ProgSpec) -> Result<ProgId, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let id = engine.library().next_id();
    let mut prog = Prog::new(id, spec.name.clone(), spec.return_type).with_source(source);
    for (ty, name) in &spec.parameters {
        prog = prog.with_parameter(*ty, name.clone());
    }
    if spec.fully_static {
        prog = prog.fully_static();
    }
    engine.add_prog(prog)?;
    engine.compile(id)?;
    info!(prog = %id, name = %spec.name, "prog loaded");
    Ok(id)
}

/// Convert a JSON argument into a host value.
///
/// An object of the form `{"category": "character", "id": 3}` is an entity
/// reference; other objects are maps.
pub fn json_to_native(json: &Json) -> NativeValue {
    match json {
        Json::Null => NativeValue::Null,
        Json::Bool(b) => NativeValue::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => NativeValue::Integer(i),
            None => NativeValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => NativeValue::Text(s.clone()),
        Json::Array(items) => NativeValue::List(items.iter().map(json_to_native).collect()),
        Json::Object(fields) => {
            if let Some(entity) = entity_from_json(fields) {
                return NativeValue::Entity(entity);
            }
            NativeValue::Map(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), json_to_native(v)))
                    .collect::<IndexMap<_, _>>(),
            )
        }
    }
}

fn entity_from_json(fields: &serde_json::Map<String, Json>) -> Option<EntityRef> {
    if fields.len() != 2 {
        return None;
    }
    let category = BaseType::from_name(fields.get("category")?.as_str()?)?;
    let id = fields.get("id")?.as_u64()?;
    category.is_entity().then(|| EntityRef::new(category, id))
}

/// Convert a host value into JSON for display.
pub fn native_to_json(native: &NativeValue) -> Json {
    match native {
        NativeValue::Null => Json::Null,
        NativeValue::Text(s) => json!(s),
        NativeValue::Number(n) => json!(n),
        NativeValue::Integer(i) => json!(i),
        NativeValue::Boolean(b) => json!(b),
        NativeValue::Enumerated { description, .. } => json!(description),
        NativeValue::DateTime(t) => json!({ "datetime": t.seconds() }),
        NativeValue::TimeSpan(s) => json!({ "timespan": s.seconds() }),
        NativeValue::Entity(e) => json!({ "category": e.category.to_string(), "id": e.id }),
        NativeValue::List(items) => Json::Array(items.iter().map(native_to_json).collect()),
        NativeValue::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), native_to_json(v)))
                .collect(),
        ),
        NativeValue::MultiMap(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, vs)| (k.clone(), Json::Array(vs.iter().map(native_to_json).collect())))
                .collect(),
        ),
    }
}

/// Host that prints prog output to stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleHost {
    pub now: CalendarTime,
}

impl ConsoleHost {
    pub fn new(now: CalendarTime) -> Self {
        Self { now }
    }
}

impl Host for ConsoleHost {
    fn now(&self) -> CalendarTime {
        self.now
    }

    fn output(&mut self, target: EntityRef, text: &str) {
        println!("[{}] {}", target, text);
    }
}
