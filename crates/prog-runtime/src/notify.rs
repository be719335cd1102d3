//! Runtime incident reporting
//!
//! Faults never escape [`crate::Engine::execute`]; they are turned into an
//! [`Incident`] carrying the prog identity, its name and the arguments of the
//! failing call, and handed to a [`Notifier`].

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::error;

use prog_compiler::ProgId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentKind {
    /// An argument could not be marshalled to its parameter type.
    ArgumentMismatch,
    /// More arguments than parameters, for a prog that does not accept extras.
    SurplusArguments,
    /// The prog has no compiled form.
    NotCompiled,
    /// The requested prog does not exist.
    UnknownProg,
    /// A statement faulted while running.
    Fault,
    /// The call chain went deeper than the recursion ceiling.
    RecursionLimit,
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IncidentKind::ArgumentMismatch => "argument mismatch",
            IncidentKind::SurplusArguments => "surplus arguments",
            IncidentKind::NotCompiled => "not compiled",
            IncidentKind::UnknownProg => "unknown prog",
            IncidentKind::Fault => "execution fault",
            IncidentKind::RecursionLimit => "recursion limit",
        })
    }
}

/// One reported runtime failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub prog: ProgId,
    pub prog_name: String,
    pub kind: IncidentKind,
    pub message: String,
    /// Rendered actual arguments of the failing call.
    pub arguments: Vec<String>,
}

/// Receiver for runtime incidents.
pub trait Notifier: Send + Sync {
    fn report(&self, incident: Incident);
}

/// Logs incidents at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn report(&self, incident: Incident) {
        error!(
            prog = %incident.prog,
            name = %incident.prog_name,
            kind = %incident.kind,
            arguments = ?incident.arguments,
            "{}",
            incident.message
        );
    }
}

/// Records incidents in memory. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct IncidentLog {
    incidents: Arc<Mutex<Vec<Incident>>>,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Incident>> {
        self.incidents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of everything reported so far.
    pub fn incidents(&self) -> Vec<Incident> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Notifier for IncidentLog {
    fn report(&self, incident: Incident) {
        self.lock().push(incident);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let log = IncidentLog::new();
        let handle = log.clone();
        handle.report(Incident {
            prog: ProgId(1),
            prog_name: "Broken".into(),
            kind: IncidentKind::Fault,
            message: "division by zero".into(),
            arguments: vec!["3".into()],
        });
        assert_eq!(log.len(), 1);
        assert_eq!(log.incidents()[0].prog_name, "Broken");
        log.clear();
        assert!(handle.is_empty());
    }
}
