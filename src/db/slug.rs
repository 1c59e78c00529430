/// Lowercases `input`, collapses every run of non-alphanumeric characters into
/// a single hyphen and trims hyphens from both ends.
///
/// `"DS1-VPS-XS"` becomes `"ds1-vps-xs"`, `"  Main  Pod #2 "` becomes `"main-pod-2"`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Uses `provided` when it is non-empty after trimming, otherwise derives a slug from `source`.
pub fn slug_or_derive(provided: Option<&str>, source: &str) -> String {
    match provided.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => slugify(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("DS1-VPS-XS"), "ds1-vps-xs");
        assert_eq!(slugify("  Main  Pod #2 "), "main-pod-2");
        assert_eq!(slugify("a__b--c"), "a-b-c");
        assert_eq!(slugify("ABC123"), "abc123");
    }

    #[test]
    fn test_slugify_trims_edge_hyphens() {
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slug_or_derive_prefers_provided_value() {
        assert_eq!(slug_or_derive(Some(" custom-slug "), "ABC"), "custom-slug");
        assert_eq!(slug_or_derive(Some("   "), "ABC 1"), "abc-1");
        assert_eq!(slug_or_derive(None, "ABC 1"), "abc-1");
    }
}
