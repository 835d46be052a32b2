//! Category labels.

/// Category used when the submitted label is empty after sanitization.
pub const DEFAULT_CATEGORY: &str = "Others";

/// Categories offered to clients, in display order.
pub const CATEGORIES: [&str; 6] = ["Documents", "Images", "Videos", "Audio", "Archives", "Others"];

pub fn list_categories() -> &'static [&'static str] {
    &CATEGORIES
}

/// Keep only ASCII letters, digits, spaces and hyphens.
pub fn sanitize_category(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        cleaned
    }
}
