//! Record identifier generation.
//!
//! Records carry plain string identifiers so that ids minted by the hosted
//! database can be stored as-is. Locally created records get a prefixed ULID,
//! which keeps them time-ordered when sorted lexically.

use ulid::Ulid;

/// Generate a new identifier of the form `{prefix}_{ulid}`.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Ulid::new())
}
