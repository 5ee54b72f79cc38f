//! Whole-word keyword counting

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::error::{PitchwiseError, Result};

lazy_static! {
    // Acronyms that are also everyday words; only the upper-case form counts
    static ref CASE_SENSITIVE: HashSet<&'static str> = ["IT", "PR", "US"].into_iter().collect();
}

/// Text prepared for matching: the original plus a lowercased copy
#[derive(Debug, Clone)]
pub struct MatchText {
    original: String,
    lower: String,
}

impl MatchText {
    pub fn new(text: impl Into<String>) -> Self {
        let original = text.into();
        let lower = original.to_lowercase();
        Self { original, lower }
    }

    /// Join several fragments with spaces, skipping empty ones
    pub fn joined<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = parts
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(text)
    }

    pub fn is_empty(&self) -> bool {
        self.original.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
struct Matcher {
    keyword: String,
    pattern: Regex,
    case_sensitive: bool,
}

/// Compiled keyword list, in data order
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    matchers: Vec<Matcher>,
}

impl KeywordIndex {
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matchers = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                continue;
            }
            let case_sensitive = CASE_SENSITIVE.contains(keyword);
            let needle = if case_sensitive {
                keyword.to_string()
            } else {
                keyword.to_lowercase()
            };
            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&needle))).map_err(|e| {
                PitchwiseError::Internal {
                    message: format!("keyword '{}' does not compile: {}", keyword, e),
                }
            })?;
            matchers.push(Matcher {
                keyword: keyword.to_string(),
                pattern,
                case_sensitive,
            });
        }
        Ok(Self { matchers })
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Occurrences of each keyword that appears at least once
    pub fn counts<'a>(
        &'a self,
        text: &'a MatchText,
    ) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        self.matchers.iter().filter_map(move |m| {
            let haystack = if m.case_sensitive {
                &text.original
            } else {
                &text.lower
            };
            let count = m.pattern.find_iter(haystack).count();
            (count > 0).then_some((m.keyword.as_str(), count))
        })
    }

    /// Total occurrences of all keywords
    pub fn total(&self, text: &MatchText) -> usize {
        self.counts(text).map(|(_, count)| count).sum()
    }

    /// Occurrences weighted per keyword
    pub fn weighted<F>(&self, text: &MatchText, weight: F) -> f64
    where
        F: Fn(&str) -> f64,
    {
        self.counts(text)
            .map(|(keyword, count)| count as f64 * weight(keyword))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_counting() {
        let index = KeywordIndex::new(["store", "retail"]).unwrap();
        let text = MatchText::new("Retail store chain; our stores and one more store.");
        let counts: Vec<_> = index.counts(&text).collect();
        assert_eq!(counts, vec![("store", 2), ("retail", 1)]);
        assert_eq!(index.total(&text), 3);
    }

    #[test]
    fn test_multi_word_and_hyphenated_keywords() {
        let index = KeywordIndex::new(["e-commerce", "online store"]).unwrap();
        let text = MatchText::new("An E-Commerce brand with an Online Store.");
        assert_eq!(index.total(&text), 2);
    }

    #[test]
    fn test_acronyms_are_case_sensitive() {
        let index = KeywordIndex::new(["IT", "software"]).unwrap();
        let pronoun = MatchText::new("We make it easy, and it works.");
        assert_eq!(index.total(&pronoun), 0);

        let acronym = MatchText::new("Managed IT and software services");
        assert_eq!(index.total(&acronym), 2);
    }

    #[test]
    fn test_other_acronyms_match_any_case() {
        let index = KeywordIndex::new(["CEO", "HR", "VP"]).unwrap();
        let text = MatchText::new("ceo, Hr lead and vp of sales");
        assert_eq!(index.total(&text), 3);

        let pr = KeywordIndex::new(["PR"]).unwrap();
        assert_eq!(pr.total(&MatchText::new("pr")), 0);
        assert_eq!(pr.total(&MatchText::new("PR agency")), 1);
    }

    #[test]
    fn test_mixed_case_keywords_match_any_case() {
        let index = KeywordIndex::new(["SaaS", "DevOps"]).unwrap();
        let text = MatchText::new("a saas platform with devops tooling");
        assert_eq!(index.total(&text), 2);
    }

    #[test]
    fn test_weighted() {
        let index = KeywordIndex::new(["ceo", "director"]).unwrap();
        let text = MatchText::new("ceo and director");
        let score = index.weighted(&text, |k| k.len() as f64);
        assert!((score - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_joined_skips_empty_parts() {
        let text = MatchText::joined(["Chief Officer", "", "  ", "strategy"]);
        assert_eq!(text.original, "Chief Officer strategy");
        assert!(!text.is_empty());
        assert!(MatchText::joined(Vec::<String>::new()).is_empty());
    }
}
