//! Token-to-line grouping by vertical proximity.

use tracing::debug;

use crate::models::config::GroupingConfig;
use crate::ocr::Token;

/// Tokens printed on one receipt row.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    /// Vertical center of the first token assigned to this line.
    pub center_y: f32,
    /// Tokens ordered left to right.
    pub tokens: Vec<&'a Token>,
}

impl<'a> Line<'a> {
    fn seeded(token: &'a Token) -> Self {
        Self {
            center_y: token.center_y(),
            tokens: vec![token],
        }
    }

    /// Token texts in order.
    pub fn texts(&self) -> Vec<&'a str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Token texts joined with single spaces.
    pub fn text(&self) -> String {
        self.texts().join(" ").trim().to_string()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Groups tokens into lines.
///
/// A token joins the first line whose recorded center is within the tolerance
/// of its own center. The recorded center is the seeding token's and is never
/// updated, so tokens of a slanted row may split off into a new line.
#[derive(Debug, Clone)]
pub struct LineGrouper {
    tolerance: f32,
}

impl LineGrouper {
    pub fn new() -> Self {
        Self::from_config(&GroupingConfig::default())
    }

    pub fn from_config(config: &GroupingConfig) -> Self {
        Self {
            tolerance: config.line_tolerance_px,
        }
    }

    /// Set the vertical tolerance in pixels.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Group tokens into lines ordered top to bottom.
    pub fn group<'a, I>(&self, tokens: I) -> Vec<Line<'a>>
    where
        I: IntoIterator<Item = &'a Token>,
    {
        let mut lines: Vec<Line<'a>> = Vec::new();

        for token in tokens {
            let y = token.center_y();
            match lines
                .iter_mut()
                .find(|line| (line.center_y - y).abs() < self.tolerance)
            {
                Some(line) => line.tokens.push(token),
                None => lines.push(Line::seeded(token)),
            }
        }

        lines.sort_by(|a, b| a.center_y.total_cmp(&b.center_y));
        for line in &mut lines {
            line.tokens.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        }

        debug!("Grouped tokens into {} lines", lines.len());
        lines
    }
}

impl Default for LineGrouper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(text: &str, x0: f32, y0: f32) -> Token {
        Token::new(text, x0, y0, x0 + 40.0, y0 + 20.0)
    }

    /// Small deterministic generator for scattered layouts.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (self.0 >> 33) as u32
        }
    }

    #[test]
    fn test_groups_rows_and_orders_tokens() {
        let tokens = vec![
            word("1.500", 300.0, 52.0),
            word("Pizza", 10.0, 10.0),
            word("Agua", 10.0, 50.0),
            word("12.000", 300.0, 12.0),
        ];

        let lines = LineGrouper::new().group(&tokens);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].texts(), vec!["Pizza", "12.000"]);
        assert_eq!(lines[1].text(), "Agua 1.500");
        assert_eq!(lines[0].center_y, 20.0);
        assert_eq!(lines[1].center_y, 62.0);
    }

    #[test]
    fn test_empty_input() {
        let tokens: Vec<Token> = Vec::new();
        assert!(LineGrouper::new().group(&tokens).is_empty());
    }

    #[test]
    fn test_tolerance_is_exclusive() {
        let tokens = vec![word("Pan", 0.0, 0.0), word("1.200", 100.0, 12.0)];

        assert_eq!(LineGrouper::new().with_tolerance(12.0).group(&tokens).len(), 2);
        assert_eq!(LineGrouper::new().with_tolerance(12.5).group(&tokens).len(), 1);
    }

    #[test]
    fn test_first_token_center_is_kept() {
        // Each token is within tolerance of its neighbour but the third is
        // more than 12px below the first, so it starts its own line.
        let tokens = vec![
            word("Lomo", 0.0, 100.0),
            word("a", 50.0, 108.0),
            word("pobre", 100.0, 116.0),
        ];

        let lines = LineGrouper::new().group(&tokens);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].texts(), vec!["Lomo", "a"]);
        assert_eq!(lines[0].center_y, 110.0);
        assert_eq!(lines[1].texts(), vec!["pobre"]);
    }

    #[test]
    fn test_partition_and_order() {
        let mut rng = Lcg(42);
        let tokens: Vec<Token> = (0..300)
            .map(|i| {
                let x = (rng.next() % 800) as f32;
                let y = (rng.next() % 2000) as f32 / 3.0;
                word(&format!("t{}", i), x, y)
            })
            .collect();

        let lines = LineGrouper::new().group(&tokens);

        let mut seen: Vec<&str> = lines
            .iter()
            .flat_map(|line| line.tokens.iter().map(|t| t.text.as_str()))
            .collect();
        assert_eq!(seen.len(), tokens.len());
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), tokens.len());

        for pair in lines.windows(2) {
            assert!(pair[0].center_y < pair[1].center_y);
        }
        for line in &lines {
            for pair in line.tokens.windows(2) {
                assert!(pair[0].x0 <= pair[1].x0);
            }
            for token in &line.tokens {
                assert!((token.center_y() - line.center_y).abs() < 12.0);
            }
        }
    }
}
