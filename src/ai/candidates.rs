//! Model identifier candidate generation.
//!
//! Human-supplied model names rarely match a provider's exact identifier
//! (`"Llama 3.1 70B"` vs `"llama-3.1-70b"`). [`model_candidates`] derives an
//! ordered, de-duplicated list of likely spellings from a fixed sequence of
//! normalization rules; the original string always comes first.

/// Collapses every run of separator characters into a single dash.
fn dash_join(s: &str, is_sep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending = false;
    for c in s.chars() {
        if is_sep(c) {
            if !out.is_empty() {
                pending = true;
            }
        } else {
            if pending {
                out.push('-');
                pending = false;
            }
            out.push(c);
        }
    }
    out
}

/// Generates likely model id variants from a human-friendly model name.
///
/// The list is deterministic, ordered from most to least literal, and free
/// of duplicates. An empty or whitespace-only name yields an empty list.
#[must_use]
pub fn model_candidates(name: &str) -> Vec<String> {
    let original = name.trim();
    if original.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<String> = Vec::with_capacity(6);
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    push(original.to_string());

    let lower = original.to_lowercase();
    push(lower.clone());

    // spaces to dashes
    push(dash_join(&lower, char::is_whitespace));

    // spaces and dots to dashes (e.g. "3.1" -> "3-1")
    push(dash_join(&lower, |c| c.is_whitespace() || c == '.'));

    // common variant: remove dots but keep dash between version and size
    let no_dots: String = lower.chars().filter(|c| *c != '.').collect();
    push(dash_join(&no_dots, char::is_whitespace));

    // shortest variant: drop everything outside [a-z0-9-]
    push(
        lower
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect(),
    );

    candidates
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn generates_expected_variants() {
        let candidates = model_candidates("Llama 3.1 70B");
        assert_eq!(candidates.first().map(String::as_str), Some("Llama 3.1 70B"));
        for expected in ["llama 3.1 70b", "llama-3.1-70b", "llama-3-1-70b", "llama-31-70b"] {
            assert!(
                candidates.iter().any(|c| c == expected),
                "missing variant {expected} in {candidates:?}"
            );
        }
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(model_candidates("Llama 3.1 70B"), model_candidates("Llama 3.1 70B"));
    }

    #[test]
    fn already_normalized_name_collapses() {
        let candidates = model_candidates("llama-3-70b");
        assert_eq!(candidates, vec!["llama-3-70b".to_string()]);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let candidates = model_candidates("  Mixtral 8x7B ");
        assert_eq!(candidates.first().map(String::as_str), Some("Mixtral 8x7B"));
    }

    #[test]
    fn empty_name_yields_nothing() {
        assert!(model_candidates("").is_empty());
        assert!(model_candidates("   ").is_empty());
    }

    #[test]
    fn no_duplicates_are_emitted() {
        let candidates = model_candidates("GPT 4");
        let mut deduped = candidates.clone();
        deduped.dedup();
        assert_eq!(candidates.len(), deduped.len());
        let unique: std::collections::HashSet<_> = candidates.iter().collect();
        assert_eq!(unique.len(), candidates.len());
    }
}
