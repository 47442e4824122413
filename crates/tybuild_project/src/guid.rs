//! Project and solution GUIDs.
//!
//! Project GUIDs are derived from `salt:type:name`, so regenerating a project
//! never changes its identity inside Visual Studio. All GUIDs are upper-case
//! and formatted without braces.

use uuid::Uuid;
use xxhash_rust::xxh3::xxh3_128;

/// GUID of the `ALL_BUILD` utility project shipped with the templates.
pub const ALL_BUILD_GUID: &str = "5C330799-6FA6-33C3-B12C-755A9CA12672";

/// GUID of the `ZERO_CHECK` utility project shipped with the templates.
pub const ZERO_CHECK_GUID: &str = "46BE4EB3-B0FD-3982-8000-AE0905052172";

/// Derives the GUID of project `name` of type `kind`.
///
/// The 128-bit XXH3 hash of the seed is stamped with the version 5 and
/// RFC 4122 variant bits so the result is a well-formed UUID.
pub fn project_guid(salt: &str, kind: &str, name: &str) -> String {
    let seed = format!("{salt}:{kind}:{name}");
    let mut bytes = xxh3_128(seed.as_bytes()).to_be_bytes();
    bytes[6] = (bytes[6] & 0x0F) | 0x50;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;
    format_guid(Uuid::from_bytes(bytes))
}

/// A fresh random GUID for a new solution.
pub fn new_solution_guid() -> String {
    format_guid(Uuid::new_v4())
}

fn format_guid(uuid: Uuid) -> String {
    uuid.hyphenated().to_string().to_uppercase()
}
