//! Ordered pattern cascades and scoped text blocks.

use regex::Regex;

use super::RuleMatch;

/// Return the trimmed first capture of the first pattern that matches `text`.
///
/// Patterns are tried in order; later patterns are never evaluated once one
/// matches. Empty text yields `None`.
pub fn find_first_match(patterns: &[&Regex], text: &str) -> Option<String> {
    first_capture(patterns.iter().copied(), text).map(|(_, value)| value)
}

/// Position and trimmed capture of the first pattern with a first group.
fn first_capture<'r>(
    patterns: impl IntoIterator<Item = &'r Regex>,
    text: &str,
) -> Option<(usize, String)> {
    if text.is_empty() {
        return None;
    }

    patterns.into_iter().enumerate().find_map(|(rank, re)| {
        let caps = re.captures(text)?;
        Some((rank, caps.get(1)?.as_str().trim().to_string()))
    })
}

/// A single named rung of a cascade.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub regex: &'static Regex,
}

impl Rule {
    pub const fn new(name: &'static str, regex: &'static Regex) -> Self {
        Self { name, regex }
    }
}

/// An ordered list of rules where position is priority.
#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<Rule>,
}

impl PatternSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Evaluate the rules in order and report which one fired.
    pub fn find(&self, text: &str) -> Option<RuleMatch> {
        let (rank, value) = first_capture(self.rules.iter().map(|rule| rule.regex), text)?;
        Some(RuleMatch::new(value, self.rules[rank].name, rank))
    }
}

/// A region of text between a start and an end marker.
///
/// The marker pattern must capture the enclosed region as its first group.
#[derive(Debug, Clone, Copy)]
pub struct BlockScope {
    pub name: &'static str,
    regex: &'static Regex,
}

impl BlockScope {
    pub const fn new(name: &'static str, regex: &'static Regex) -> Self {
        Self { name, regex }
    }

    /// Locate the block. A missing start or end marker means no block.
    pub fn locate<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref FIRST: Regex = Regex::new(r"(?is)alpha\s*(\d+)").unwrap();
        static ref SECOND: Regex = Regex::new(r"(?is)beta\s*(\d+)").unwrap();
        static ref BLOCK: Regex = Regex::new(r"(?is)BEGIN(.*?)END").unwrap();
    }

    #[test]
    fn test_first_pattern_wins_over_earlier_position() {
        // beta appears first in the text, but alpha has priority
        let text = "beta 2 ... alpha 1";
        assert_eq!(find_first_match(&[&*FIRST, &*SECOND], text), Some("1".to_string()));
        assert_eq!(find_first_match(&[&*SECOND, &*FIRST], text), Some("2".to_string()));
    }

    #[test]
    fn test_no_match_and_empty_text() {
        assert_eq!(find_first_match(&[&*FIRST, &*SECOND], "gamma 3"), None);
        assert_eq!(find_first_match(&[&*FIRST], ""), None);
        assert_eq!(find_first_match(&[], "alpha 1"), None);
    }

    #[test]
    fn test_capture_is_trimmed_and_case_insensitive() {
        lazy_static! {
            static ref NAME: Regex = Regex::new(r"(?is)name:(.*?)\n").unwrap();
        }
        assert_eq!(
            find_first_match(&[&*NAME], "NAME:   Acme Ltd  \n"),
            Some("Acme Ltd".to_string())
        );
    }

    #[test]
    fn test_pattern_set_reports_rank() {
        let set = PatternSet::new(vec![Rule::new("alpha", &FIRST), Rule::new("beta", &SECOND)]);
        let m = set.find("only beta 7 here").unwrap();
        assert_eq!(m.rule, "beta");
        assert_eq!(m.rank, 1);
        assert_eq!(m.value, "7");
    }

    #[test]
    fn test_pattern_set_agrees_with_find_first_match() {
        let set = PatternSet::new(vec![Rule::new("alpha", &FIRST), Rule::new("beta", &SECOND)]);
        for text in ["beta 2 ... alpha 1", "beta 9", "gamma 3", ""] {
            assert_eq!(
                set.find(text).map(|m| m.value),
                find_first_match(&[&*FIRST, &*SECOND], text)
            );
        }
    }

    #[test]
    fn test_block_scope_requires_both_markers() {
        let scope = BlockScope::new("block", &BLOCK);
        assert_eq!(scope.locate("x BEGIN inner END y"), Some(" inner "));
        assert_eq!(scope.locate("x BEGIN inner without end"), None);
        assert_eq!(scope.locate("no markers"), None);
    }
}
