//! Display-name redaction for departed accounts.
//!
//! Contributions are retained after account deletion so funding aggregates
//! stay auditable; only identifying display data is rewritten. Redaction is
//! idempotent so a retried cascade partition can re-apply it safely.

/// Suffix appended to a contributor's stored display name on redaction.
pub const DELETED_SUFFIX: &str = " (Deleted)";

/// Redact a contributor display name.
///
/// Appends [`DELETED_SUFFIX`] at most once; re-redacting an already
/// redacted name returns it unchanged.
pub fn redact_display_name(name: &str) -> String {
    if name.ends_with(DELETED_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{DELETED_SUFFIX}")
    }
}
