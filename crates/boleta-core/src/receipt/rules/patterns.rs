//! Common regex patterns for receipt line parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Leading quantity: "2 Bebidas" -> (2, "Bebidas")
    pub static ref LEADING_QUANTITY: Regex = Regex::new(
        r"^\s*([0-9]{1,3})\s+(.+)$"
    ).unwrap();

    // Hyphen, en-dash and em-dash runs used as fillers between name and price
    pub static ref DASH_RUN: Regex = Regex::new(
        r"[-–—]+"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();

    // Labeled date/time fields, e.g. "Fecha: 14/08/25 20:06:30"
    pub static ref DATE_TIME_FIELD: Regex = Regex::new(
        r"[/:].*[0-9]"
    ).unwrap();

    // Flat text line: [qty] name [qty] amount
    // Amount is grouped triplets (1.200, 1 200, 1,200, 1·200) or a bare 4+ digit run.
    pub static ref FLAT_LINE: Regex = Regex::new(
        r"^(?:([0-9]{1,3})\s+)?(.+?)(?:\s+([0-9]{1,2}))?\s+([0-9]{1,3}(?:[.,·•\s][0-9]{3})+|[0-9]{4,})$"
    ).unwrap();
}
