//! Permission claim helpers shared by the token service and the
//! request-level permission gate.

/// Wildcard permission that short-circuits every downstream check.
pub const FULL_ACCESS: &str = "full_access";

/// True iff `required` is absent, the claim set carries the
/// [`FULL_ACCESS`] wildcard, or the claim set contains `required`
/// case-insensitively.
pub fn has_permission(claims: &[String], required: Option<&str>) -> bool {
    let Some(required) = required else {
        return true;
    };
    claims.iter().any(|claim| {
        claim.eq_ignore_ascii_case(FULL_ACCESS) || claim.eq_ignore_ascii_case(required)
    })
}

/// Deduplicate permission strings case-insensitively, preserving the
/// first-seen casing and order.
pub fn dedup_case_insensitive(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value.to_ascii_lowercase()) {
            out.push(value);
        }
    }
    out
}
