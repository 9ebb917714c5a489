//! Display-name derivation for accounts provisioned from auth claims.

/// Placeholder names that a fresher claim or email derivation may replace.
pub const PLACEHOLDER_NAMES: &[&str] = &["Unknown User", "New User"];

/// Picks a display name: a non-empty claim name wins, otherwise the name is
/// derived from the email local part, otherwise "New User".
pub fn derive_display_name(name: Option<&str>, email: Option<&str>) -> String {
    if let Some(name) = name {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(email) = email {
        if let Some(derived) = name_from_email(email) {
            return derived;
        }
    }

    "New User".to_string()
}

/// Turns an email local part into a readable name: split on `.`, `_` and `-`,
/// title-case each piece, join with spaces. `jane.doe@x.com` -> `Jane Doe`.
fn name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next()?.trim();
    if local.is_empty() {
        return None;
    }

    let parts: Vec<String> = local
        .split(['.', '_', '-'])
        .filter(|part| !part.is_empty())
        .map(title_case)
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
