//! Line-level predicates shared by both extractors.
//!
//! Each rule is a small named function or struct so it can be tested on its
//! own; the extractors only compose them.

pub mod amounts;
pub mod names;
pub mod noise;
pub mod patterns;

pub use amounts::{digit_count, is_amount_like, is_price_token, normalize_amount, parse_amount};
pub use names::{has_minimum_letter_content, normalize_name, split_leading_quantity, NameDecomposer};
pub use noise::{has_letter, looks_like_date_time_field, NoiseFilter, StopTerms};

use std::fmt;

/// Why a line was dropped. Never surfaced as an error; only counted and traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRejection {
    Empty,
    StopTerm,
    NoLetters,
    DateTimeField,
    NoPrice,
    ColonInName,
    NameTooShort,
    InsufficientLetters,
    InvalidQuantity,
    EmptyName,
    /// Flat-text line did not match the item pattern.
    NoMatch,
}

impl LineRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::StopTerm => "stop_term",
            Self::NoLetters => "no_letters",
            Self::DateTimeField => "date_time_field",
            Self::NoPrice => "no_price",
            Self::ColonInName => "colon_in_name",
            Self::NameTooShort => "name_too_short",
            Self::InsufficientLetters => "insufficient_letters",
            Self::InvalidQuantity => "invalid_quantity",
            Self::EmptyName => "empty_name",
            Self::NoMatch => "no_match",
        }
    }
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
