//! URL slug derivation.

/// Derive a URL slug from a display name.
///
/// ASCII alphanumerics are lowercased; every other run of characters
/// collapses to a single hyphen. Leading and trailing hyphens are trimmed.
/// Uniqueness is the database's job (unique index on the slug column), not
/// this function's.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Nimbus X1 Laptop"), "nimbus-x1-laptop");
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(slugify("  Wireless -- Headphones! "), "wireless-headphones");
    }

    #[test]
    fn test_strips_non_ascii() {
        assert_eq!(slugify("Pro-Gamer™ Pad"), "pro-gamer-pad");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_already_a_slug() {
        assert_eq!(slugify("gaming-mouse-rgb"), "gaming-mouse-rgb");
    }
}
