//! Static pages for the operator's approval link.
//!
//! The link is opened straight from a notification, so these are plain HTML
//! rather than JSON.

pub fn approved(subject_id: &str) -> String {
    page(
        "Access approved",
        &format!(
            "Access to <strong>{}</strong> has been approved. The requester will be let in on their next check.",
            escape(subject_id)
        ),
    )
}

pub fn unknown_token() -> String {
    page(
        "Link expired",
        "This approval link is unknown, expired, or has already been used.",
    )
}

pub fn failure() -> String {
    page(
        "Something went wrong",
        "The approval could not be recorded. Please try the link again.",
    )
}

fn page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n<p>{message}</p>\n</body>\n</html>\n"
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
