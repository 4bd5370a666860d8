//! String match family and string functions.
//!
//! Case functions use Unicode simple case folding via `str::to_lowercase`;
//! the regex operators use regex-lite's `(?i)` flag, whose folding is
//! ASCII-only. The host collation is not consulted.

use regex_lite::Regex;

use crate::error::{GraphError, Result};

pub fn starts_with(s: &str, prefix: &str) -> bool {
    s.starts_with(prefix)
}

pub fn ends_with(s: &str, suffix: &str) -> bool {
    s.ends_with(suffix)
}

pub fn contains(s: &str, needle: &str) -> bool {
    s.contains(needle)
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    let pattern = if case_insensitive {
        format!("(?i){}", pattern)
    } else {
        pattern.to_string()
    };
    Regex::new(&pattern).map_err(|e| GraphError::InvalidInput {
        target: "regex",
        input: e.to_string(),
    })
}

/// `=~` / `=~*`
pub fn regex_match(s: &str, pattern: &str, case_insensitive: bool) -> Result<bool> {
    Ok(compile(pattern, case_insensitive)?.is_match(s))
}

/// `!~` / `!~*`
pub fn regex_not_match(s: &str, pattern: &str, case_insensitive: bool) -> Result<bool> {
    regex_match(s, pattern, case_insensitive).map(|m| !m)
}

// ── String functions ───────────────────────────────────────────────

pub fn to_lower(s: &str) -> String {
    s.to_lowercase()
}

pub fn to_upper(s: &str) -> String {
    s.to_uppercase()
}

pub fn trim(s: &str) -> String {
    s.trim().to_string()
}

pub fn ltrim(s: &str) -> String {
    s.trim_start().to_string()
}

pub fn rtrim(s: &str) -> String {
    s.trim_end().to_string()
}

/// Leftmost `n` characters; negative `n` drops `-n` characters from the end.
pub fn left(s: &str, n: i64) -> String {
    let chars: Vec<char> = s.chars().collect();
    let take = clamp_take(chars.len(), n);
    chars[..take].iter().collect()
}

/// Rightmost `n` characters; negative `n` drops `-n` characters from the start.
pub fn right(s: &str, n: i64) -> String {
    let chars: Vec<char> = s.chars().collect();
    let take = clamp_take(chars.len(), n);
    chars[chars.len() - take..].iter().collect()
}

fn clamp_take(len: usize, n: i64) -> usize {
    if n >= 0 {
        (n as usize).min(len)
    } else {
        len.saturating_sub(n.unsigned_abs() as usize)
    }
}

/// Zero-based substring with character semantics.
pub fn substring(s: &str, start: i64, length: Option<i64>) -> Result<String> {
    if start < 0 {
        return Err(GraphError::Domain("substring start must not be negative".into()));
    }
    if let Some(l) = length {
        if l < 0 {
            return Err(GraphError::Domain(
                "substring length must not be negative".into(),
            ));
        }
    }
    let out: String = match length {
        Some(l) => s
            .chars()
            .skip(start as usize)
            .take(l as usize)
            .collect(),
        None => s.chars().skip(start as usize).collect(),
    };
    Ok(out)
}

pub fn replace(s: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return s.to_string();
    }
    s.replace(from, to)
}

pub fn split(s: &str, sep: &str) -> Vec<String> {
    if sep.is_empty() {
        return s.chars().map(|c| c.to_string()).collect();
    }
    s.split(sep).map(|p| p.to_string()).collect()
}

pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_family() {
        assert!(starts_with("hello world", "hello"));
        assert!(ends_with("hello world", "world"));
        assert!(contains("hello world", "lo wo"));
        assert!(!starts_with("hello", "world"));
    }

    #[test]
    fn test_regex_case_modes() {
        assert!(regex_match("Hello", "^h.llo$", true).unwrap());
        assert!(!regex_match("Hello", "^h.llo$", false).unwrap());
        assert!(regex_not_match("Hello", "^h", false).unwrap());
        assert!(regex_match("abc123", r"\d+", false).unwrap());
    }

    #[test]
    fn test_bad_regex_is_error() {
        assert!(regex_match("x", "(", false).is_err());
    }

    #[test]
    fn test_left_right() {
        assert_eq!(left("hello", 2), "he");
        assert_eq!(left("hello", -2), "hel");
        assert_eq!(right("hello", 2), "lo");
        assert_eq!(right("hello", -2), "llo");
        assert_eq!(left("hi", 10), "hi");
    }

    #[test]
    fn test_substring() {
        assert_eq!(substring("hello", 1, Some(3)).unwrap(), "ell");
        assert_eq!(substring("hello", 1, None).unwrap(), "ello");
        assert!(substring("hello", -1, None).is_err());
    }

    #[test]
    fn test_split_and_replace() {
        assert_eq!(split("a,b,c", ","), vec!["a", "b", "c"]);
        assert_eq!(replace("aXbXc", "X", "-"), "a-b-c");
        assert_eq!(reverse("abc"), "cba");
    }

    #[test]
    fn test_unicode_case_fold() {
        assert_eq!(to_lower("ÁÉÍ"), "áéí");
        assert_eq!(to_upper("straße"), "STRASSE");
    }
}
