//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use uuid::Uuid;

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Join items into a readable English list: "a", "a and b", "a, b, and c"
pub fn format_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}

/// Normalize a food term for comparisons
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Split a comma separated list, trimming entries and dropping empty ones
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remove duplicates (after normalization) keeping first-seen order
pub fn dedup_terms(terms: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    terms
        .into_iter()
        .filter(|term| seen.insert(normalize_term(term)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_list(&[]), "");
        assert_eq!(format_list(&strings(&["rice"])), "rice");
        assert_eq!(format_list(&strings(&["rice", "chicken"])), "rice and chicken");
        assert_eq!(
            format_list(&strings(&["rice", "chicken", "leeks"])),
            "rice, chicken, and leeks"
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" peanuts, shellfish ,, "), strings(&["peanuts", "shellfish"]));
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_dedup_terms() {
        let terms = strings(&["Apple", "banana", "apple ", "Banana", "kiwi"]);
        assert_eq!(dedup_terms(terms), strings(&["Apple", "banana", "kiwi"]));
    }
}
