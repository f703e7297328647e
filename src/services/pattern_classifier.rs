//! Keyword classifier mapping free-text feedback to improvement categories.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::models::Category;

/// Lowercase alphanumeric word tokens of `text`.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// Keyword in `keywords` matched by `token`, allowing a plain plural `s`.
fn match_keyword(token: &str, keywords: &'static [&'static str]) -> Option<&'static str> {
    let singular = token
        .strip_suffix('s')
        .filter(|stem| stem.chars().count() >= 3);

    keywords
        .iter()
        .copied()
        .find(|keyword| *keyword == token || Some(*keyword) == singular)
}

/// Classifies `text` into category weights.
///
/// A category's weight is the number of distinct keywords of that category found in
/// the text. Text with words but no keyword hit is `{general: 1}`; text without any
/// word is an empty map.
pub fn classify(text: &str) -> BTreeMap<Category, u32> {
    let mut hits: BTreeMap<Category, BTreeSet<&'static str>> = BTreeMap::new();
    let mut saw_word = false;

    for token in tokenize(text) {
        saw_word = true;
        for category in Category::KEYWORDED {
            if let Some(keyword) = match_keyword(&token, category.keywords()) {
                hits.entry(category).or_default().insert(keyword);
            }
        }
    }

    let mut weights: BTreeMap<Category, u32> = hits
        .into_iter()
        .map(|(category, keywords)| (category, u32::try_from(keywords.len()).unwrap_or(u32::MAX)))
        .collect();

    if weights.is_empty() && saw_word {
        weights.insert(Category::General, 1);
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_category() {
        let weights = classify("needs MFA details");
        assert_eq!(weights, BTreeMap::from([(Category::AccessControl, 1)]));
    }

    #[test]
    fn test_distinct_keywords_counted_once() {
        let weights = classify("password rules, password complexity, PASSWORD");
        assert_eq!(weights.get(&Category::PasswordPolicy), Some(&2));
    }

    #[test]
    fn test_multiple_categories() {
        let weights = classify("Session timeout and HIPAA, plus RBAC lockout");
        assert_eq!(weights.get(&Category::SessionManagement), Some(&2));
        assert_eq!(weights.get(&Category::Compliance), Some(&1));
        assert_eq!(weights.get(&Category::AccessControl), Some(&2));
        assert!(!weights.contains_key(&Category::General));
    }

    #[test]
    fn test_plurals_match() {
        let weights = classify("Missing passwords and roles; tokens expire");
        assert_eq!(weights.get(&Category::PasswordPolicy), Some(&1));
        assert_eq!(weights.get(&Category::AccessControl), Some(&1));
        assert_eq!(weights.get(&Category::SessionManagement), Some(&1));
    }

    #[test]
    fn test_keywords_are_whole_words() {
        // "passwordless" and "sessionless" are not the keywords themselves
        let weights = classify("passwordless sessionless");
        assert_eq!(weights, BTreeMap::from([(Category::General, 1)]));
    }

    #[test]
    fn test_general_fallback_and_empty_text() {
        assert_eq!(
            classify("Looks too vague"),
            BTreeMap::from([(Category::General, 1)])
        );
        assert!(classify("").is_empty());
        assert!(classify("  ;;, -- ").is_empty());
    }

    #[test]
    fn test_added_categories() {
        let weights = classify("Support SSO via SAML and audit logging");
        assert_eq!(weights.get(&Category::AuthenticationFlow), Some(&2));
        assert_eq!(weights.get(&Category::AuditLogging), Some(&2));
    }
}
