// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Header card parsing.
//!
//! A header is a sequence of 2880-byte blocks holding 80-byte ASCII cards,
//! terminated by the `END` card. Only the structural keywords are ever
//! looked up, so values are parsed leniently into [`HeaderValue`] and the
//! typed getters decide whether a value is usable.

use crate::core::{FitsError, Result};

use super::constants::{BLOCK_SIZE, CARD_SIZE, END_KEYWORD, KEYWORD_LEN, VALUE_INDICATOR};

/// Parsed value of a header card.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    /// Quoted string, trailing blanks removed
    String(String),
    /// `T` or `F`
    Logical(bool),
    /// Integer literal
    Integer(i64),
    /// Real literal (`E` or `D` exponent)
    Float(f64),
    /// Value indicator present but no value
    Undefined,
    /// Anything else (complex literals, malformed text)
    Unparsed(String),
}

/// A single header card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Keyword (columns 1-8, trailing blanks removed)
    pub keyword: String,
    /// Value, for cards with a value indicator
    pub value: Option<HeaderValue>,
}

/// A parsed HDU header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    /// Parse a header starting at the beginning of `bytes`.
    ///
    /// Returns the header and the number of bytes it occupies, always a
    /// multiple of the block size.
    ///
    /// # Errors
    ///
    /// Returns a `Decode` error if a block is truncated, a card contains
    /// non-ASCII bytes, or no `END` card is found.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut cards = Vec::new();
        let mut offset = 0;

        loop {
            let block = bytes.get(offset..offset + BLOCK_SIZE).ok_or_else(|| {
                if offset == 0 && bytes.len() < BLOCK_SIZE {
                    FitsError::decode(
                        "header",
                        format!(
                            "truncated header block: {} bytes, expected {BLOCK_SIZE}",
                            bytes.len()
                        ),
                    )
                } else {
                    FitsError::decode("header", "missing END card")
                }
            })?;
            offset += BLOCK_SIZE;

            for raw in block.chunks_exact(CARD_SIZE) {
                if let Some(pos) = raw.iter().position(|b| !(0x20..=0x7E).contains(b)) {
                    return Err(FitsError::decode(
                        "header",
                        format!(
                            "non-ASCII byte 0x{:02X} in header card {}",
                            raw[pos],
                            cards.len() + 1
                        ),
                    ));
                }
                // Every byte is printable ASCII, so this cannot fail.
                let text = std::str::from_utf8(raw).unwrap_or_default();

                let keyword = text[..KEYWORD_LEN].trim_end().to_string();
                if keyword == END_KEYWORD {
                    return Ok((Self { cards }, offset));
                }

                let value = if is_commentary(&keyword) || &raw[8..10] != VALUE_INDICATOR {
                    None
                } else {
                    Some(parse_value(&text[10..]))
                };
                cards.push(Card { keyword, value });
            }
        }
    }

    /// Number of cards, excluding `END`.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the header has no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look up the value of the first card carrying `keyword`.
    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|c| c.keyword == keyword && c.value.is_some())
            .and_then(|c| c.value.as_ref())
    }

    /// String value of `keyword`.
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        match self.get(keyword)? {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value of `keyword`.
    ///
    /// Reals with no fractional part (`32768.0`) are accepted.
    pub fn get_int(&self, keyword: &str) -> Option<i64> {
        match self.get(keyword)? {
            HeaderValue::Integer(i) => Some(*i),
            HeaderValue::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    /// Numeric value of `keyword`, integers included.
    pub fn get_float(&self, keyword: &str) -> Option<f64> {
        match self.get(keyword)? {
            HeaderValue::Integer(i) => Some(*i as f64),
            HeaderValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Logical value of `keyword`.
    pub fn get_bool(&self, keyword: &str) -> Option<bool> {
        match self.get(keyword)? {
            HeaderValue::Logical(b) => Some(*b),
            _ => None,
        }
    }

    /// Value of `keyword` as text, whatever its type.
    ///
    /// Used for `TNULLn` in ASCII tables, which writers emit both quoted and
    /// bare.
    pub fn get_text(&self, keyword: &str) -> Option<String> {
        match self.get(keyword)? {
            HeaderValue::String(s) => Some(s.clone()),
            HeaderValue::Integer(i) => Some(i.to_string()),
            HeaderValue::Float(f) => Some(f.to_string()),
            HeaderValue::Unparsed(s) => Some(s.clone()),
            HeaderValue::Logical(_) | HeaderValue::Undefined => None,
        }
    }

    /// Integer value of a mandatory keyword.
    ///
    /// # Errors
    ///
    /// Returns a `Decode` error if the keyword is missing or not an integer.
    pub fn require_int(&self, keyword: &str) -> Result<i64> {
        match self.get(keyword) {
            None => Err(FitsError::decode(
                "header",
                format!("missing required keyword '{keyword}'"),
            )),
            Some(_) => self.get_int(keyword).ok_or_else(|| {
                FitsError::decode(
                    "header",
                    format!("keyword '{keyword}' is not an integer"),
                )
            }),
        }
    }
}

fn is_commentary(keyword: &str) -> bool {
    matches!(keyword, "" | "COMMENT" | "HISTORY")
}

/// Parse the value field (columns 11-80) of a valued card.
fn parse_value(field: &str) -> HeaderValue {
    let field = field.trim_start();

    if let Some(rest) = field.strip_prefix('\'') {
        return parse_string(rest);
    }

    let text = match field.find('/') {
        Some(pos) => &field[..pos],
        None => field,
    }
    .trim();

    match text {
        "" => HeaderValue::Undefined,
        "T" => HeaderValue::Logical(true),
        "F" => HeaderValue::Logical(false),
        _ => {
            if let Ok(i) = text.parse::<i64>() {
                return HeaderValue::Integer(i);
            }
            match parse_real(text) {
                Some(f) => HeaderValue::Float(f),
                None => HeaderValue::Unparsed(text.to_string()),
            }
        }
    }
}

/// Parse a quoted string body; `rest` starts just after the opening quote.
fn parse_string(rest: &str) -> HeaderValue {
    let mut value = String::new();
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                value.push('\'');
            } else {
                return HeaderValue::String(value.trim_end().to_string());
            }
        } else {
            value.push(c);
        }
    }

    // Unterminated string
    HeaderValue::Unparsed(format!("'{rest}"))
}

/// Parse a real number, accepting Fortran `D` exponents.
pub(crate) fn parse_real(text: &str) -> Option<f64> {
    let normalized = text.replace(['D', 'd'], "E");
    let value = normalized.parse::<f64>().ok()?;
    // Rust accepts "inf"/"nan" spellings that are not valid numeric literals here.
    if normalized
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'E' | 'e'))
    {
        Some(value)
    } else {
        None
    }
}
