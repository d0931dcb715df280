//! Listing id allocation

use std::collections::HashSet;

use xarcon_core::slugify;

const FALLBACK_SLUG: &str = "propiedad";

/// `preferred` when it is free, otherwise the title slug with the first
/// free `-N` suffix.
pub fn generate_unique_id(title: &str, used: &HashSet<String>, preferred: &str) -> String {
    let preferred = preferred.trim();
    if !preferred.is_empty() && !used.contains(preferred) {
        return preferred.to_string();
    }

    let mut base = slugify(title);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }

    let mut candidate = base.clone();
    let mut suffix = 1;
    while used.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_preferred_id_wins_when_free() {
        assert_eq!(generate_unique_id("Casa", &used(&["casa"]), " mi-casa "), "mi-casa");
    }

    #[test]
    fn test_suffixes_until_free() {
        let taken = used(&["casa-en-leon", "casa-en-leon-1"]);
        assert_eq!(generate_unique_id("Casa en León", &taken, ""), "casa-en-leon-2");
        assert_eq!(generate_unique_id("Casa en León", &taken, "casa-en-leon"), "casa-en-leon-2");
    }

    #[test]
    fn test_blank_title_falls_back() {
        assert_eq!(generate_unique_id("¡!", &used(&[]), ""), "propiedad");
        assert_eq!(generate_unique_id("", &used(&["propiedad"]), ""), "propiedad-1");
    }
}
