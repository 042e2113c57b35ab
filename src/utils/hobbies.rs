/// Splits a comma-separated hobbies string into trimmed, non-empty tokens.
///
/// `"reading, coding, "` becomes `["reading", "coding"]`.
pub fn split_hobbies(raw: &str) -> Vec<String> {
    normalize_hobbies(raw.split(','))
}

/// Trims every token and drops the empty ones, keeping order.
pub fn normalize_hobbies<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Inverse of `split_hobbies` for filling an edit form
pub fn join_hobbies(hobbies: &[String]) -> String {
    hobbies.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_empty_token_is_dropped() {
        assert_eq!(split_hobbies("reading, coding, "), vec!["reading", "coding"]);
    }

    #[test]
    fn test_blank_input_gives_no_hobbies() {
        assert!(split_hobbies("").is_empty());
        assert!(split_hobbies(" , ,, ").is_empty());
    }

    #[test]
    fn test_inner_spaces_are_kept() {
        assert_eq!(split_hobbies("board games ,chess"), vec!["board games", "chess"]);
    }

    #[test]
    fn test_join_then_split_keeps_tokens() {
        let hobbies = vec!["x".to_string(), "y".to_string()];
        assert_eq!(join_hobbies(&hobbies), "x, y");
        assert_eq!(split_hobbies(&join_hobbies(&hobbies)), hobbies);
    }
}
