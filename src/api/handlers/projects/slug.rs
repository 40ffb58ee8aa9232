//! Slug normalization for project URLs.

pub(super) const SLUG_MIN: usize = 2;
pub(super) const SLUG_MAX: usize = 80;

/// Normalizes input into a URL-safe slug (`a-z0-9-`) within the length bounds.
/// Returns `None` when the normalized result is empty or out of bounds; the
/// caller still enforces uniqueness.
pub(super) fn normalize_slug(input: &str) -> Option<String> {
    let mut slug = String::new();
    let mut prev_dash = false;
    for ch in input.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-').to_string();
    if trimmed.is_empty() {
        return None;
    }
    let truncated: String = trimmed.chars().take(SLUG_MAX).collect();
    let normalized = truncated.trim_matches('-').to_string();
    if normalized.len() < SLUG_MIN || normalized.len() > SLUG_MAX {
        return None;
    }
    Some(normalized)
}
