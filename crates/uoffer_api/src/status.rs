//! Error-kind to transport status mapping.
//!
//! # Invariants
//! - This is the only place where status codes are chosen for failures.
//! - The match is exhaustive; a new `ErrorKind` fails to compile here.

use uoffer_core::ErrorKind;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const NO_CONTENT: u16 = 204;
pub const INTERNAL_ERROR: u16 = 500;

/// Returns the status code reported for `kind`.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::CategoryAlreadyExists => 409,
        ErrorKind::CategoryInUse => 409,
        ErrorKind::CategoryNotFound => 404,
        ErrorKind::InvalidTitle => 400,
        ErrorKind::PostNotFound => 404,
        ErrorKind::PostIdAlreadyExists => 400,
        ErrorKind::AnalyticNotFound => 404,
        ErrorKind::AnalyticDependencyNotFound => 409,
        ErrorKind::EmptyUpdate => 400,
        ErrorKind::MissingRole => 401,
        ErrorKind::Unexpected => INTERNAL_ERROR,
    }
}
