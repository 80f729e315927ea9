//! Standalone requirement tickets and their upstream progress.

mod model;
mod overview;
mod repository;

pub use model::{NewRequirement, RequirementProgress, RequirementState, RequirementTicket, TrackedRequirement};
pub use overview::overview;
pub use repository::RequirementRepository;
