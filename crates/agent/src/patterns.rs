//! Rule table compilation shared by the classifiers

use regex::Regex;

/// Compile a table of patterns, skipping (and logging) any that fail.
pub(crate) fn compile_all(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .filter_map(|source| match Regex::new(source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::error!(pattern = %source, error = %e, "Skipping invalid rule pattern");
                None
            }
        })
        .collect()
}

/// Case-insensitive whole-word alternation over `terms`
pub(crate) fn word_alternation(terms: &[&str]) -> String {
    let escaped: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    format!(r"(?i)\b(?:{})\b", escaped.join("|"))
}

pub(crate) fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_patterns_are_skipped() {
        let compiled = compile_all(&[r"(?i)\bhello\b", r"(unclosed"]);
        assert_eq!(compiled.len(), 1);
    }

    #[test]
    fn test_word_alternation_respects_boundaries() {
        let compiled = compile_all(&[word_alternation(&["hi", "thank you"]).as_str()]);
        assert!(any_match(&compiled, "Hi there"));
        assert!(any_match(&compiled, "ok THANK YOU"));
        assert!(!any_match(&compiled, "this is it"));
    }
}
