//! Item name cleanup and quantity extraction.

use super::patterns::{DASH_RUN, LEADING_QUANTITY, WHITESPACE_RUN};
use super::LineRejection;
use crate::models::config::ExtractionConfig;

/// Replace dash runs with a space, collapse whitespace and trim.
pub fn normalize_name(raw: &str) -> String {
    let dashless = DASH_RUN.replace_all(raw, " ");
    WHITESPACE_RUN.replace_all(&dashless, " ").trim().to_string()
}

/// At least two whitespace-separated words with a letter, or six letters total.
pub fn has_minimum_letter_content(name: &str) -> bool {
    let lettered_words = name
        .split_whitespace()
        .filter(|word| word.chars().any(char::is_alphabetic))
        .count();
    if lettered_words >= 2 {
        return true;
    }
    name.chars().filter(|c| c.is_alphabetic()).count() >= 6
}

/// Split a `"2 Bebidas"` style prefix into `(Some(2), "Bebidas")`.
///
/// Names without a 1-3 digit prefix come back unchanged with `None`.
pub fn split_leading_quantity(name: &str) -> (Option<u32>, &str) {
    match LEADING_QUANTITY.captures(name) {
        Some(caps) => {
            let quantity = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let rest = caps.get(2).map_or("", |m| m.as_str().trim());
            match quantity {
                Some(q) => (Some(q), rest),
                None => (None, name),
            }
        }
        None => (None, name),
    }
}

/// Turns the text left of the price column into a name and a quantity.
#[derive(Debug, Clone)]
pub struct NameDecomposer {
    min_name_chars: usize,
    require_letter_content: bool,
    max_quantity: u32,
}

impl NameDecomposer {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_name_chars: config.min_name_chars,
            require_letter_content: config.require_letter_content,
            max_quantity: config.max_quantity,
        }
    }

    /// Require [`has_minimum_letter_content`] on every name.
    pub fn with_letter_content(mut self, required: bool) -> Self {
        self.require_letter_content = required;
        self
    }

    pub fn with_min_name_chars(mut self, min: usize) -> Self {
        self.min_name_chars = min;
        self
    }

    /// Decompose already-joined name text.
    pub fn decompose(&self, raw: &str) -> Result<(String, u32), LineRejection> {
        let name = normalize_name(raw);

        if name.contains(':') {
            return Err(LineRejection::ColonInName);
        }
        if name.chars().count() < self.min_name_chars {
            return Err(LineRejection::NameTooShort);
        }
        if self.require_letter_content && !has_minimum_letter_content(&name) {
            return Err(LineRejection::InsufficientLetters);
        }

        let (quantity, rest) = split_leading_quantity(&name);
        let quantity = quantity.unwrap_or(1);
        if quantity == 0 || quantity > self.max_quantity {
            return Err(LineRejection::InvalidQuantity);
        }
        if rest.is_empty() {
            return Err(LineRejection::EmptyName);
        }

        Ok((rest.to_string(), quantity))
    }

    /// Decompose name tokens, joined with single spaces.
    pub fn decompose_tokens(&self, tokens: &[&str]) -> Result<(String, u32), LineRejection> {
        self.decompose(&tokens.join(" "))
    }
}

impl Default for NameDecomposer {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Lomo -- a lo   pobre"), "Lomo a lo pobre");
        assert_eq!(normalize_name("Café—Cortado"), "Café Cortado");
        assert_eq!(normalize_name("  Agua  "), "Agua");
    }

    #[test]
    fn test_split_leading_quantity() {
        assert_eq!(split_leading_quantity("2 Bebidas"), (Some(2), "Bebidas"));
        assert_eq!(split_leading_quantity("Bebidas"), (None, "Bebidas"));
        assert_eq!(split_leading_quantity("1000 Islas"), (None, "1000 Islas"));
        assert_eq!(split_leading_quantity("12 "), (None, "12 "));
    }

    #[test]
    fn test_minimum_letter_content() {
        assert!(has_minimum_letter_content("Agua Mineral"));
        assert!(has_minimum_letter_content("Empanada"));
        assert!(has_minimum_letter_content("2 Té Verde"));
        assert!(!has_minimum_letter_content("Pizza"));
        assert!(!has_minimum_letter_content("Té 2"));
    }

    #[test]
    fn test_decompose() {
        let decomposer = NameDecomposer::default();

        assert_eq!(decomposer.decompose("Pizza"), Ok(("Pizza".to_string(), 1)));
        assert_eq!(decomposer.decompose("2 Bebidas"), Ok(("Bebidas".to_string(), 2)));
        assert_eq!(
            decomposer.decompose_tokens(&["3", "Lomo", "-", "Pobre"]),
            Ok(("Lomo Pobre".to_string(), 3))
        );
    }

    #[test]
    fn test_decompose_rejections() {
        let decomposer = NameDecomposer::default();

        assert_eq!(decomposer.decompose("Caja: 3"), Err(LineRejection::ColonInName));
        assert_eq!(decomposer.decompose("Té"), Err(LineRejection::NameTooShort));
        assert_eq!(decomposer.decompose("0 Agua"), Err(LineRejection::InvalidQuantity));
        assert_eq!(
            decomposer.decompose("1 -"),
            Err(LineRejection::NameTooShort)
        );

        let strict = NameDecomposer::default().with_letter_content(true);
        assert_eq!(strict.decompose("Pizza"), Err(LineRejection::InsufficientLetters));
        assert_eq!(strict.decompose("Pizza Napolitana"), Ok(("Pizza Napolitana".to_string(), 1)));
    }

    #[test]
    fn test_max_quantity() {
        let config = ExtractionConfig {
            max_quantity: 50,
            ..ExtractionConfig::default()
        };
        let decomposer = NameDecomposer::from_config(&config);

        assert_eq!(decomposer.decompose("50 Vasos"), Ok(("Vasos".to_string(), 50)));
        assert_eq!(decomposer.decompose("120 Vasos"), Err(LineRejection::InvalidQuantity));
    }
}
