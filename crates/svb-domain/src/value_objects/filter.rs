//! LDAP-style property filters
//!
//! Filters select references by their property bag. The textual form follows
//! the familiar registry syntax:
//!
//! ```text
//! (&(objectClass=com.acme.Store)(|(region=eu-*)(!(tier=cold))))
//! ```
//!
//! Supported operators are equality, presence (`(key=*)`), substring
//! (`(key=pre*mid*suf)`), conjunction, disjunction and negation. A backslash
//! escapes the next character, so `(name=a\*b)` matches the literal `a*b`.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Source of property values a filter is evaluated against
///
/// A key may carry several values (e.g. the interface list exposed under
/// `objectClass`); an equality or substring test succeeds if any value
/// matches.
pub trait PropertyLookup {
    /// All values recorded under `key`, empty if absent
    fn values(&self, key: &str) -> Vec<&str>;
}

impl PropertyLookup for BTreeMap<String, String> {
    fn values(&self, key: &str) -> Vec<&str> {
        self.get(key).map(|v| vec![v.as_str()]).unwrap_or_default()
    }
}

/// Parsed property filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `(key=value)`
    Equal {
        /// Property key
        key: String,
        /// Literal value
        value: String,
    },
    /// `(key=*)`
    Present {
        /// Property key
        key: String,
    },
    /// `(key=a*b*c)`; segments are the literal parts between wildcards
    Substring {
        /// Property key
        key: String,
        /// Literal segments, first anchored at the start, last at the end
        segments: Vec<String>,
    },
    /// `(&f1f2...)`
    And(Vec<Filter>),
    /// `(|f1f2...)`
    Or(Vec<Filter>),
    /// `(!f)`
    Not(Box<Filter>),
}

impl Filter {
    /// Equality filter
    pub fn equal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Presence filter
    pub fn present(key: impl Into<String>) -> Self {
        Self::Present { key: key.into() }
    }

    /// Conjunction of the given filters
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Disjunction of the given filters
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Negation of a filter
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Combine with another filter under AND, flattening nested conjunctions
    #[must_use]
    pub fn and_also(self, other: Filter) -> Self {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), right) => {
                left.push(right);
                Self::And(left)
            }
            (left, Self::And(mut right)) => {
                right.insert(0, left);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Parse a filter string
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser::new(input);
        parser.skip_whitespace();
        let filter = parser.filter()?;
        parser.skip_whitespace();
        if parser.pos < parser.bytes.len() {
            return Err(Error::filter_parse(
                "unexpected trailing input",
                parser.pos,
            ));
        }
        Ok(filter)
    }

    /// Evaluate the filter against a property source
    pub fn matches<P: PropertyLookup + ?Sized>(&self, props: &P) -> bool {
        match self {
            Self::Equal { key, value } => props.values(key).iter().any(|v| *v == value),
            Self::Present { key } => !props.values(key).is_empty(),
            Self::Substring { key, segments } => props
                .values(key)
                .iter()
                .any(|v| substring_matches(v, segments)),
            Self::And(filters) => filters.iter().all(|f| f.matches(props)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(props)),
            Self::Not(inner) => !inner.matches(props),
        }
    }
}

fn substring_matches(value: &str, segments: &[String]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return value == first;
    };
    if !value.starts_with(first.as_str()) {
        return false;
    }
    let mut cursor = first.len();
    for segment in middle {
        match value[cursor..].find(segment.as_str()) {
            Some(offset) => cursor += offset + segment.len(),
            None => return false,
        }
    }
    value.len() >= cursor + last.len() && value.ends_with(last.as_str())
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for ch in text.chars() {
        if matches!(ch, '(' | ')' | '*' | '\\') {
            write!(f, "\\")?;
        }
        write!(f, "{ch}")?;
    }
    Ok(())
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal { key, value } => {
                write!(f, "({key}=")?;
                write_escaped(f, value)?;
                write!(f, ")")
            }
            Self::Present { key } => write!(f, "({key}=*)"),
            Self::Substring { key, segments } => {
                write!(f, "({key}=")?;
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write_escaped(f, segment)?;
                }
                write!(f, ")")
            }
            Self::And(filters) => {
                write!(f, "(&")?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                write!(f, ")")
            }
            Self::Or(filters) => {
                write!(f, "(|")?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                write!(f, ")")
            }
            Self::Not(inner) => write!(f, "(!{inner})"),
        }
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Filter::parse(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Recursive descent parser
// ============================================================================

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(Error::filter_parse(
                format!("expected '{}'", byte as char),
                self.pos,
            ))
        }
    }

    fn filter(&mut self) -> Result<Filter> {
        self.expect(b'(')?;
        let filter = match self.peek() {
            Some(b'&') => {
                self.pos += 1;
                Filter::And(self.filter_list()?)
            }
            Some(b'|') => {
                self.pos += 1;
                Filter::Or(self.filter_list()?)
            }
            Some(b'!') => {
                self.pos += 1;
                self.skip_whitespace();
                let inner = self.filter()?;
                self.skip_whitespace();
                Filter::Not(Box::new(inner))
            }
            Some(_) => self.item()?,
            None => return Err(Error::filter_parse("unexpected end of filter", self.pos)),
        };
        self.expect(b')')?;
        Ok(filter)
    }

    fn filter_list(&mut self) -> Result<Vec<Filter>> {
        let mut filters = Vec::new();
        self.skip_whitespace();
        while self.peek() == Some(b'(') {
            filters.push(self.filter()?);
            self.skip_whitespace();
        }
        if filters.is_empty() {
            return Err(Error::filter_parse(
                "composite filter requires at least one operand",
                self.pos,
            ));
        }
        Ok(filters)
    }

    fn item(&mut self) -> Result<Filter> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'=' | b'(' | b')' | b'*' | b'\\') {
                break;
            }
            self.pos += 1;
        }
        let key = self.input[start..self.pos].trim();
        if key.is_empty() {
            return Err(Error::filter_parse("missing attribute name", start));
        }
        let key = key.to_string();
        self.expect(b'=')?;

        let mut segments = vec![String::new()];
        loop {
            match self.peek() {
                None => return Err(Error::filter_parse("unterminated value", self.pos)),
                Some(b')') => break,
                Some(b'(') => {
                    return Err(Error::filter_parse("unescaped '(' in value", self.pos));
                }
                Some(b'*') => {
                    self.pos += 1;
                    segments.push(String::new());
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let ch = self.next_char().ok_or_else(|| {
                        Error::filter_parse("dangling escape in value", self.pos)
                    })?;
                    if let Some(segment) = segments.last_mut() {
                        segment.push(ch);
                    }
                }
                Some(_) => {
                    let ch = self
                        .next_char()
                        .ok_or_else(|| Error::filter_parse("invalid character", self.pos))?;
                    if let Some(segment) = segments.last_mut() {
                        segment.push(ch);
                    }
                }
            }
        }

        Ok(match segments.len() {
            1 => Filter::Equal {
                key,
                value: segments.remove(0),
            },
            2 if segments.iter().all(String::is_empty) => Filter::Present { key },
            _ => Filter::Substring { key, segments },
        })
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }
}
