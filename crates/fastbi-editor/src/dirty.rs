//! Unsaved-change detection

/// Whether the editor text differs from the last synced text.
///
/// Comparison is exact: whitespace and formatting changes are edits the user
/// has to discard explicitly.
pub fn is_dirty(current: &str, baseline: &str) -> bool {
    current != baseline
}
