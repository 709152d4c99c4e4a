//! Tesseract TSV output parsing.
//!
//! `tesseract image.png out tsv` writes one row per page, block, paragraph,
//! line and word. Only word rows (level 5) become tokens; the text blob is
//! rebuilt from the words of each line.

use tracing::debug;

use super::{OcrOutput, Token};
use crate::error::{BoletaError, Result};

const WORD_LEVEL: u32 = 5;
const COLUMNS: usize = 12;

/// Position of a word's line within the page structure.
type LineKey = (u32, u32, u32, u32);

impl OcrOutput {
    /// Parse Tesseract TSV output into tokens and a text blob.
    pub fn from_tesseract_tsv(tsv: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut lines: Vec<(LineKey, Vec<String>)> = Vec::new();

        for (idx, row) in tsv.lines().enumerate() {
            if row.trim().is_empty() || row.starts_with("level") {
                continue;
            }

            let fields: Vec<&str> = row.splitn(COLUMNS, '\t').collect();
            if fields.len() < COLUMNS - 1 {
                return Err(BoletaError::TokenInput(format!(
                    "TSV row {} has {} columns, expected {}",
                    idx + 1,
                    fields.len(),
                    COLUMNS
                )));
            }

            let level = parse_field::<u32>(fields[0], idx, "level")?;
            if level != WORD_LEVEL {
                continue;
            }

            let text = fields.get(11).map(|t| t.trim()).unwrap_or("");
            let confidence: f32 = parse_field(fields[10], idx, "conf")?;
            if text.is_empty() || confidence < 0.0 {
                continue;
            }

            let key = (
                parse_field(fields[1], idx, "page_num")?,
                parse_field(fields[2], idx, "block_num")?,
                parse_field(fields[3], idx, "par_num")?,
                parse_field(fields[4], idx, "line_num")?,
            );
            let left: f32 = parse_field(fields[6], idx, "left")?;
            let top: f32 = parse_field(fields[7], idx, "top")?;
            let width: f32 = parse_field(fields[8], idx, "width")?;
            let height: f32 = parse_field(fields[9], idx, "height")?;

            tokens.push(Token::new(text, left, top, left + width, top + height));

            match lines.last_mut() {
                Some((last_key, words)) if *last_key == key => words.push(text.to_string()),
                _ => lines.push((key, vec![text.to_string()])),
            }
        }

        let text = lines
            .iter()
            .map(|(_, words)| words.join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        debug!("Parsed {} tokens on {} lines from TSV", tokens.len(), lines.len());

        Ok(Self { tokens, text })
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, row: usize, name: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        BoletaError::TokenInput(format!(
            "TSV row {}: invalid {} value {:?}",
            row + 1,
            name,
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t800\t1200\t-1\t
4\t1\t1\t1\t1\t0\t40\t100\t300\t24\t-1\t
5\t1\t1\t1\t1\t1\t40\t100\t80\t24\t91.5\tPizza
5\t1\t1\t1\t1\t2\t600\t101\t90\t24\t88.0\t12.000
5\t1\t1\t1\t1\t3\t700\t101\t10\t24\t95.0\t
5\t1\t1\t1\t2\t1\t40\t140\t70\t24\t90.1\tAgua
5\t1\t1\t1\t2\t2\t600\t141\t80\t24\t89.3\t1.500
5\t1\t1\t1\t2\t3\t700\t141\t20\t24\t-1\t~
";

    #[test]
    fn test_parse_words() {
        let output = OcrOutput::from_tesseract_tsv(SAMPLE).unwrap();

        assert_eq!(output.tokens.len(), 4);
        assert_eq!(output.tokens[0], Token::new("Pizza", 40.0, 100.0, 120.0, 124.0));
        assert_eq!(output.tokens[3].text, "1.500");
        assert_eq!(output.text, "Pizza 12.000\nAgua 1.500");
    }

    #[test]
    fn test_rejects_malformed_row() {
        let err = OcrOutput::from_tesseract_tsv("5\t1\t1\tx\n").unwrap_err();
        assert!(matches!(err, BoletaError::TokenInput(_)));

        let err = OcrOutput::from_tesseract_tsv("5\t1\t1\t1\t1\t1\tleft\t0\t1\t1\t90\tPan\n")
            .unwrap_err();
        assert!(err.to_string().contains("left"));
    }

    #[test]
    fn test_empty_input() {
        let output = OcrOutput::from_tesseract_tsv("").unwrap();
        assert!(output.is_blank());
    }
}
