//! URL slugs for products.

/// Lowercase, keep `[a-z0-9]`, turn whitespace runs into `-`, collapse
/// repeated dashes and trim them from both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' => c,
            '-' => '-',
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if mapped == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(mapped);
    }
    slug.trim_matches('-').to_string()
}

/// `base`, then `base-2`, `base-3`, ... for collision retries.
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}
