/// Compute effective limit with precedence: local arg -> global flag -> fallback.
#[must_use]
pub fn effective_limit(local: Option<u32>, global: Option<u32>, fallback: u32) -> u32 {
    local.or(global).unwrap_or(fallback)
}

/// Rows shown for a listing: `--limit` when given, else `fallback`.
#[must_use]
pub fn display_cap(global: Option<u32>, fallback: usize) -> usize {
    global.map_or(fallback, |limit| usize::try_from(limit).unwrap_or(usize::MAX))
}
