//! Domain model for categories, posts, analytics and their read projections.
//!
//! # Responsibility
//! - Define canonical records shared by repositories and services.
//! - Keep partial-update and role types explicit so callers cannot conflate
//!   "unset" with "set to default" or pass roles as ambient state.
//!
//! # Invariants
//! - A category is identified by its trimmed, non-empty title.
//! - At most one analytic exists per post.

pub mod analytic;
pub mod category;
pub mod post;
pub mod role;
pub mod word;
