//! Status codes exchanged with the resolver.
//!
//! The engine passes collaborator status codes through verbatim; only the
//! constants below are ever produced by the engine itself.

pub const NOERROR: i32 = 0;
pub const SERVFAIL: i32 = 2;
pub const NXDOMAIN: i32 = 3;

/// Returned when followup input could not be interpreted, e.g. a PTR
/// synthesis name with too few labels.
pub const MALFORMED: i32 = -1;
