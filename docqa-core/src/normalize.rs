//! Boilerplate removal for extracted document text.
//!
//! Text extracted from PDFs carries recurring noise that hurts both
//! embedding quality and answer readability: page markers, contact lines,
//! figure captions, citation parentheticals. [`Normalizer`] strips these
//! with an ordered set of regex rules and collapses the remaining
//! whitespace.

use regex::Regex;

use crate::error::{Error, Result};

/// Built-in cleanup rules, applied in declaration order.
///
/// `FaxFragments` runs before `PhoneNumbers` so a fax line is removed as a
/// whole; otherwise the phone rule would take the number and strand the
/// label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `Page 12` style markers, any casing.
    PageMarkers,
    /// `Fax:` labels followed by a number.
    FaxFragments,
    /// North-American phone numbers, with or without separators.
    PhoneNumbers,
    /// `scheme://` and `www.` prefixed tokens.
    Urls,
    /// Email addresses.
    EmailAddresses,
    /// `Figure 3 ...` captions up to the next sentence terminator.
    FigureCaptions,
    /// Numeric dates such as `12/25/2020` or `3-1-99`.
    NumericDates,
    /// Month-name dates such as `January 5, 2020` or `March 2020`.
    MonthYearDates,
    /// Parenthesized groups containing a four-digit year.
    Citations,
    /// Square-bracketed asides such as `[1]` or `[citation needed]`.
    BracketedAsides,
    /// Bullet and emphasis marks left over from list layout.
    BulletMarks,
}

impl RuleKind {
    /// All built-in rules in application order.
    pub const ALL: [RuleKind; 11] = [
        RuleKind::PageMarkers,
        RuleKind::FaxFragments,
        RuleKind::PhoneNumbers,
        RuleKind::Urls,
        RuleKind::EmailAddresses,
        RuleKind::FigureCaptions,
        RuleKind::NumericDates,
        RuleKind::MonthYearDates,
        RuleKind::Citations,
        RuleKind::BracketedAsides,
        RuleKind::BulletMarks,
    ];

    fn pattern(self) -> &'static str {
        match self {
            RuleKind::PageMarkers => r"(?i)\bpage\s*\d+\b",
            RuleKind::FaxFragments => r"(?i)\bfax:?\s*[\d().-]{2,}[\d().\s-]*",
            RuleKind::PhoneNumbers => r"\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
            RuleKind::Urls => r"(?:[A-Za-z][A-Za-z0-9+.-]*://|www\.)\S*",
            RuleKind::EmailAddresses => r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            RuleKind::FigureCaptions => r"(?i)\bfigure\s*\d+[^.!?]*[.!?]?",
            RuleKind::NumericDates => r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b",
            RuleKind::MonthYearDates => {
                r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+(?:\d{1,2},?\s+)?\d{4}\b"
            }
            RuleKind::Citations => r"\([^()]*\d{4}[^()]*\)",
            RuleKind::BracketedAsides => r"\[[^\[\]]*\]",
            RuleKind::BulletMarks => r"[•▪►◦‣*]+",
        }
    }

    fn regex(self) -> Regex {
        Regex::new(self.pattern()).expect("built-in cleanup pattern compiles")
    }
}

/// Removes recurring boilerplate from extracted document text.
///
/// Rules are applied in a fixed order, each replacing its matches with a
/// single space, and the whole pass repeats until the text stops changing.
/// That makes `normalize` idempotent: applying it to its own output
/// returns the output unchanged.
///
/// A normalizer never panics on any input, and its output carries no
/// leading or trailing whitespace and no runs of blanks.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_core::Normalizer;
///
/// let normalizer = Normalizer::new();
/// let cleaned = normalizer.normalize("Symptoms include chest pain.   Page 3");
/// assert_eq!(cleaned, "Symptoms include chest pain.");
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<Regex>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_rules(&RuleKind::ALL)
    }
}

impl Normalizer {
    /// Create a normalizer with every built-in rule enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with a subset of the built-in rules.
    ///
    /// Rules apply in their declaration order regardless of the order given
    /// here; duplicates have no extra effect.
    pub fn with_rules(kinds: &[RuleKind]) -> Self {
        let rules = RuleKind::ALL
            .iter()
            .copied()
            .filter(|kind| kinds.contains(kind))
            .map(|kind| kind.regex());
        Self { rules: rules.collect() }
    }

    /// Create a normalizer with no rules; it only collapses whitespace.
    pub fn whitespace_only() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append custom cleanup patterns, applied after the enabled built-ins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a pattern does not compile.
    pub fn with_extra_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|e| {
                Error::InvalidConfiguration(format!("invalid cleanup pattern '{pattern}': {e}"))
            })?;
            self.rules.push(regex);
        }
        Ok(self)
    }

    /// Normalize text: strip boilerplate matched by the enabled rules and
    /// collapse whitespace runs to single spaces.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = collapse_whitespace(text);
        loop {
            let next = self.pass(&current);
            // A changing pass always removes at least one non-space
            // character, so this terminates.
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// One cleanup pass over already-collapsed text.
    ///
    /// Matches are replaced with a space rather than deleted outright, so
    /// removal can never glue two neighboring tokens into a new match.
    fn pass(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for rule in &self.rules {
            cleaned = rule.replace_all(&cleaned, " ").into_owned();
        }
        collapse_whitespace(&cleaned)
    }
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
