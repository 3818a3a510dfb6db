//! Small helpers shared by the query builders

use edu_core::value_objects::Snowflake;

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards in the
/// term itself escaped
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub fn raw_ids(ids: &[Snowflake]) -> Vec<i64> {
    ids.iter().map(|id| id.into_inner()).collect()
}

/// Clamp a client supplied page size
pub fn page_limit(limit: i64) -> i64 {
    limit.clamp(1, 100)
}
