//! Per-phase and per-pass result records.
//!
//! These exist for logging and telemetry only; a report is built during one
//! pass and discarded when the next begins.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhaseName {
    Search,
    Select,
    Extract,
    Write,
}

impl std::fmt::Display for PhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Search => "search",
            Self::Select => "select",
            Self::Extract => "extract",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// What one phase did. "Continue regardless" is a policy decision made by
/// the machine, so a failure here is a recorded fact, not a thrown error.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome {
    pub phase: PhaseName,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl PhaseOutcome {
    pub fn success(phase: PhaseName) -> Self {
        Self {
            phase,
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(phase: PhaseName, error: impl std::fmt::Display) -> Self {
        Self {
            phase,
            succeeded: false,
            error: Some(error.to_string()),
        }
    }
}

/// One pass of the workflow for a single search term.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub search_term: String,
    pub phases: Vec<PhaseOutcome>,
}

impl PassReport {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            search_term: search_term.into(),
            phases: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: PhaseOutcome) {
        self.phases.push(outcome);
    }

    /// Every executed phase succeeded.
    pub fn succeeded(&self) -> bool {
        self.phases.iter().all(|p| p.succeeded)
    }

    pub fn failed_phases(&self) -> impl Iterator<Item = &PhaseOutcome> {
        self.phases.iter().filter(|p| !p.succeeded)
    }
}
