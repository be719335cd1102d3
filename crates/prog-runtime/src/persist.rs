//! Persistence records
//!
//! The engine does not own storage. It defines the flat, identity-keyed
//! records a storage layer has to keep, and a [`Snapshot`] bundling all of
//! them that round-trips through JSON or a compact binary encoding.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use prog_compiler::{CompileError, Parameter, ProgId};
use prog_types::{EntityRef, TypeDescriptor, Value};

use crate::engine::Engine;
use crate::error::Result;
use crate::prog::{Prog, StaticKind};
use crate::register::PropertyDeclaration;
use crate::schedule::{ScheduleRecord, Scheduler, TemporalService};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgRecord {
    pub id: ProgId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub return_type: TypeDescriptor,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub accepts_any_parameters: bool,
    #[serde(default)]
    pub static_kind: StaticKind,
    pub source: String,
}

impl From<&Prog> for ProgRecord {
    fn from(prog: &Prog) -> Self {
        Self {
            id: prog.id,
            name: prog.name.clone(),
            category: prog.category.clone(),
            subcategory: prog.subcategory.clone(),
            return_type: prog.return_type,
            parameters: prog.parameters.clone(),
            accepts_any_parameters: prog.accepts_any_parameters,
            static_kind: prog.static_kind,
            source: prog.source().to_string(),
        }
    }
}

impl ProgRecord {
    /// An uncompiled prog.
    pub fn into_prog(self) -> Prog {
        let mut prog = Prog::new(self.id, self.name, self.return_type)
            .with_category(self.category, self.subcategory)
            .with_source(self.source);
        for parameter in self.parameters {
            prog = prog.with_parameter(parameter.ty, parameter.name);
        }
        prog.accepts_any_parameters = self.accepts_any_parameters;
        prog.static_kind = self.static_kind;
        prog
    }
}

/// One stored register value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterValueRecord {
    pub entity: EntityRef,
    pub property: String,
    pub value: Value,
}

/// Everything the engine and scheduler need persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub progs: Vec<ProgRecord>,
    pub properties: Vec<PropertyDeclaration>,
    pub values: Vec<RegisterValueRecord>,
    pub schedules: Vec<ScheduleRecord>,
}

impl Snapshot {
    pub fn capture(engine: &Engine, scheduler: &Scheduler) -> Self {
        let register = engine.register();
        Self {
            progs: engine.library().iter().map(ProgRecord::from).collect(),
            properties: register.declarations().cloned().collect(),
            values: register
                .stored_values()
                .map(|(entity, property, value)| RegisterValueRecord {
                    entity,
                    property: property.to_string(),
                    value: value.clone(),
                })
                .collect(),
            schedules: scheduler.records(),
        }
    }

    /// Load into an engine and scheduler, compiling every prog and
    /// re-arming every schedule. Returns the progs that failed to compile;
    /// they are loaded but stay uncompiled.
    pub fn restore_into(
        self,
        engine: &mut Engine,
        scheduler: &mut Scheduler,
        service: &mut dyn TemporalService,
    ) -> Result<Vec<(ProgId, CompileError)>> {
        // Register declarations first: progs are type-checked against them.
        let register = engine.register_mut();
        for declaration in self.properties {
            register.register_property(
                declaration.category,
                &declaration.name,
                declaration.ty,
                declaration.default,
            )?;
        }
        for record in self.values {
            register.restore_value(record.entity, &record.property, record.value);
        }

        for record in self.progs {
            engine.add_prog(record.into_prog())?;
        }
        let failures = engine.compile_all();

        let schedules = self.schedules.len();
        for record in self.schedules {
            scheduler.restore(service, record)?;
        }
        info!(
            progs = engine.library().len(),
            schedules,
            failed = failures.len(),
            "snapshot restored"
        );
        Ok(failures)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
