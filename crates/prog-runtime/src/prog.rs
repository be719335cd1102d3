//! Progs and the prog library

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use prog_compiler::{CompileError, Parameter, ProgCatalog, ProgId, ProgSignature, Statement};
use prog_types::TypeDescriptor;

use crate::error::{Result, RuntimeError};

/// Whether a prog's result may be memoized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticKind {
    #[default]
    NotStatic,
    /// The first successful result is reused for every later call,
    /// whatever the arguments, until the prog is recompiled.
    FullyStatic,
}

/// A named, typed, parameterized script.
#[derive(Debug, Clone)]
pub struct Prog {
    pub id: ProgId,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub return_type: TypeDescriptor,
    pub parameters: Vec<Parameter>,
    /// Accept (and ignore) arguments beyond the declared parameters.
    pub accepts_any_parameters: bool,
    pub static_kind: StaticKind,
    source: String,
    compiled: Option<Vec<Statement>>,
    last_error: Option<CompileError>,
}

impl Prog {
    pub fn new(id: ProgId, name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        Self {
            id,
            name: name.into(),
            category: String::new(),
            subcategory: String::new(),
            return_type: return_type.without_literal(),
            parameters: Vec::new(),
            accepts_any_parameters: false,
            static_kind: StaticKind::NotStatic,
            source: String::new(),
            compiled: None,
            last_error: None,
        }
    }

    pub fn with_parameter(mut self, ty: TypeDescriptor, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(ty.without_literal(), name));
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        self.category = category.into();
        self.subcategory = subcategory.into();
        self
    }

    pub fn fully_static(mut self) -> Self {
        self.static_kind = StaticKind::FullyStatic;
        self
    }

    pub fn accepting_any_parameters(mut self) -> Self {
        self.accepts_any_parameters = true;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the source. The prog is uncompiled until compiled again.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.compiled = None;
        self.last_error = None;
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn statements(&self) -> Option<&[Statement]> {
        self.compiled.as_deref()
    }

    /// The error of the most recent failed compilation, if it failed.
    pub fn last_error(&self) -> Option<&CompileError> {
        self.last_error.as_ref()
    }

    pub(crate) fn set_compiled(&mut self, statements: Vec<Statement>) {
        self.compiled = Some(statements);
        self.last_error = None;
    }

    pub(crate) fn set_failed(&mut self, error: CompileError) {
        self.compiled = None;
        self.last_error = Some(error);
    }

    pub fn signature(&self) -> ProgSignature {
        ProgSignature {
            id: self.id,
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            return_type: self.return_type,
            accepts_any_parameters: self.accepts_any_parameters,
        }
    }
}

/// All known progs, by identity and by case-insensitive name.
#[derive(Debug, Default)]
pub struct ProgLibrary {
    progs: IndexMap<ProgId, Prog>,
    names: IndexMap<String, ProgId>,
}

impl ProgLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prog: Prog) -> Result<ProgId> {
        if self.progs.contains_key(&prog.id) {
            return Err(RuntimeError::DuplicateProgId(prog.id));
        }
        let name = prog.name.to_ascii_lowercase();
        if self.names.contains_key(&name) {
            return Err(RuntimeError::DuplicateProgName(prog.name));
        }
        let id = prog.id;
        self.names.insert(name, id);
        self.progs.insert(id, prog);
        Ok(id)
    }

    pub fn remove(&mut self, id: ProgId) -> Option<Prog> {
        let prog = self.progs.shift_remove(&id)?;
        self.names.shift_remove(&prog.name.to_ascii_lowercase());
        Some(prog)
    }

    pub fn get(&self, id: ProgId) -> Option<&Prog> {
        self.progs.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ProgId) -> Option<&mut Prog> {
        self.progs.get_mut(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Prog> {
        let id = self.names.get(&name.to_ascii_lowercase())?;
        self.progs.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prog> {
        self.progs.values()
    }

    pub fn ids(&self) -> Vec<ProgId> {
        self.progs.keys().copied().collect()
    }

    /// Smallest id greater than every id in use.
    pub fn next_id(&self) -> ProgId {
        ProgId(self.progs.keys().map(|id| id.0 + 1).max().unwrap_or(1))
    }

    pub fn len(&self) -> usize {
        self.progs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.progs.is_empty()
    }
}

impl ProgCatalog for ProgLibrary {
    fn signature(&self, name: &str) -> Option<ProgSignature> {
        self.by_name(name).map(Prog::signature)
    }
}
