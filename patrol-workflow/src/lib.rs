//! The ordered search-and-select workflow and its seams.
//!
//! A pass walks the page through `SearchPending → Searched → Selected` (with
//! `Extracted`/`Written` modeled as stubs so the machine's shape is
//! complete). Every phase catches its own errors and records them as a
//! [`phase::PhaseOutcome`]; nothing a phase does can take down the pass, and
//! nothing a pass does can take down the polling loop above it.

pub mod control;
pub mod machine;
pub mod phase;
pub mod surface;

pub use control::{PassRunner, SessionControl};
pub use machine::{Workflow, WorkflowState};
pub use phase::{PassReport, PhaseName, PhaseOutcome};
pub use surface::{ListingSurface, SearchSurface, SurfaceSelectors};
