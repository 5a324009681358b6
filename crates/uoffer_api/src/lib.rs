//! Transport-facing boundary over `uoffer_core`.

pub mod api;
pub mod status;

pub use api::{resolve_role, ApiHandler, ApiResponse, RequestContext};
pub use status::status_for;
