//! Small string helpers shared by the guard, composer and verb scan.

/// True when `needle` occurs in `haystack` with no letter or digit directly
/// on either side. Both sides are expected to be lowercase already.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Split off the first whitespace-delimited word. The remainder keeps its
/// leading whitespace.
pub fn split_first_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], &text[i..]),
        None => (text, ""),
    }
}

/// Join up to `limit` items as "a, b and c".
pub fn join_natural(items: &[String], limit: usize) -> String {
    let items: Vec<&str> = items.iter().take(limit).map(String::as_str).collect();
    match items.as_slice() {
        [] => String::new(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_phrase_respects_word_boundaries() {
        assert!(contains_phrase("built an edc system", "edc"));
        assert!(contains_phrase("edc", "edc"));
        assert!(!contains_phrase("credcard processing", "edc"));
        assert!(!contains_phrase("javascript", "java"));
        assert!(contains_phrase("c++ and c#", "c#"));
        assert!(!contains_phrase("anything", "  "));
    }

    #[test]
    fn test_split_first_word() {
        assert_eq!(split_first_word("Built a thing"), ("Built", " a thing"));
        assert_eq!(split_first_word("  Built"), ("Built", ""));
    }

    #[test]
    fn test_join_natural() {
        let items: Vec<String> = ["docker", "helm", "terraform", "aws"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(join_natural(&items, 3), "docker, helm and terraform");
        assert_eq!(join_natural(&items[..1], 3), "docker");
        assert_eq!(join_natural(&[], 3), "");
    }
}
