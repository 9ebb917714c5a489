//! API types shared between the server and its clients.
//!
//! This crate contains:
//! - Row types (e.g., `Invitation`, `Notification`) - the API representation of database entities
//! - Request types (e.g., `SendInvitationRequest`) - API input types
//! - Shared enums (e.g., `InvitationStatus`, `MemberRole`)

pub mod invitation;
pub mod notification;
pub mod notification_settings;
pub mod project;
pub mod project_member;
pub mod task;
pub mod user;

pub use invitation::*;
pub use notification::*;
pub use notification_settings::*;
pub use project::*;
pub use project_member::*;
pub use task::*;
pub use user::*;
