//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database writes and their side effects.

mod content;
mod engagement;
mod graph;
mod identity;
pub mod text;

pub use content::ContentService;
pub use engagement::{EngagementService, Notifier, ReactionSummary};
pub use graph::{GraphService, UserStats};
pub use identity::IdentityService;
