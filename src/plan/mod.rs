//! Plan input module.
//!
//! This module defines the input contract consumed by the analyzer and the
//! loader that decodes it from a JSON plan document.

mod types;
mod overlay;
mod loader;

pub use types::{Action, Change, ChangeType, PathSegment, Plan, PlannedResourceChange, ValueTree};
pub use overlay::Overlay;
pub use loader::{PlanLoader, SUPPORTED_FORMAT_MAJOR};
