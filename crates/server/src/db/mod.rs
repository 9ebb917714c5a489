//! Repositories over the directory store. Every write is scoped to a single
//! record; multi-step flows are composed above this layer and written
//! defensively (checked-then-write) rather than transactionally.

pub mod invitations;
pub mod notification_settings;
pub mod notifications;
pub mod project_members;
pub mod projects;
pub mod tasks;
pub mod users;
