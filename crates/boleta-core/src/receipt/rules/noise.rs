//! Header/footer noise detection.
//!
//! Runs on a line's raw text before any price or name parsing, so rejected
//! lines never reach the decomposer.

use super::patterns::DATE_TIME_FIELD;
use super::LineRejection;
use crate::models::config::ExtractionConfig;

/// Case-insensitive stop-term vocabulary.
///
/// A term that starts with a letter only matches where the preceding
/// character is not a letter, so `TOTAL` matches `TOTALES` but not
/// `Subtotal` on its own. Terms of two characters or fewer must also end at
/// a word boundary, so `ID` matches `ID: 42` but neither `Bebidas` nor
/// `Idioma`. Terms such as `#` match anywhere.
#[derive(Debug, Clone, Default)]
pub struct StopTerms {
    terms: Vec<String>,
}

impl StopTerms {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// Whether `text` contains any term.
    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.terms.iter().any(|term| contains_term(&haystack, term))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Terms up to this length must match a whole word.
const SHORT_TERM_CHARS: usize = 2;

fn contains_term(haystack: &str, term: &str) -> bool {
    let bounded_left = term.chars().next().is_some_and(char::is_alphabetic);
    let bounded_right = term.chars().count() <= SHORT_TERM_CHARS
        && term.chars().next_back().is_some_and(char::is_alphabetic);

    haystack.match_indices(term).any(|(start, found)| {
        let left_ok = !bounded_left
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphabetic);
        let right_ok = !bounded_right
            || !haystack[start + found.len()..]
                .chars()
                .next()
                .is_some_and(char::is_alphabetic);
        left_ok && right_ok
    })
}

/// Whether the text contains at least one letter.
pub fn has_letter(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Labeled date/time shape: a `/` or `:` followed somewhere by a digit.
pub fn looks_like_date_time_field(text: &str) -> bool {
    DATE_TIME_FIELD.is_match(text)
}

/// Noise filter shared by both extractors.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    stop_terms: StopTerms,
    reject_date_time_fields: bool,
}

impl NoiseFilter {
    pub fn new(stop_terms: StopTerms) -> Self {
        Self {
            stop_terms,
            reject_date_time_fields: false,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(StopTerms::new(&config.stop_terms))
            .with_date_time_rejection(config.reject_date_time_fields)
    }

    /// Also reject labeled date/time fields.
    pub fn with_date_time_rejection(mut self, enabled: bool) -> Self {
        self.reject_date_time_fields = enabled;
        self
    }

    /// Whether the line is receipt boilerplate (subtotal, tip, metadata, ...).
    pub fn is_header_noise(&self, raw: &str) -> bool {
        self.stop_terms.matches(raw)
    }

    /// Accept or reject a raw line.
    pub fn check(&self, raw: &str) -> Result<(), LineRejection> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LineRejection::Empty);
        }
        if self.is_header_noise(raw) {
            return Err(LineRejection::StopTerm);
        }
        if !has_letter(raw) {
            return Err(LineRejection::NoLetters);
        }
        if self.reject_date_time_fields && looks_like_date_time_field(raw) {
            return Err(LineRejection::DateTimeField);
        }
        Ok(())
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
