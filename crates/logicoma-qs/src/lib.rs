//! Query string encoding and parsing.
//!
//! Encodes ordered key/value pairs into a query string and parses query
//! strings back into pairs. Both directions keep the order in which pairs
//! appear, and both let the caller pick the separator and key/value
//! delimiter characters.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters percent-encoded in keys and values.
///
/// Everything outside the RFC 3986 unreserved set is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A query value: a single scalar or a list of scalars for a repeated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A single value.
    One(String),
    /// Multiple values under the same key.
    Many(Vec<String>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::One(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::One(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::One(value.to_string())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::One(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::One(value.to_string())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::One(value.to_string())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::One(value.to_string())
    }
}

impl<V: ToString> From<Vec<V>> for Value {
    fn from(values: Vec<V>) -> Self {
        Value::Many(values.iter().map(ToString::to_string).collect())
    }
}

/// Ordered query parameters.
///
/// Pairs encode in insertion order. A key may carry several values, either
/// by pushing a `Vec` or by parsing input that repeats the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, Value)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, consuming and returning the query for chaining.
    pub fn push(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// True when the query holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// All pairs in insertion order.
    pub fn pairs(&self) -> &[(String, Value)] {
        &self.pairs
    }

    /// Iterate over pairs in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.pairs.iter()
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Fold `value` into the query: new keys append, repeated keys collect
    /// their values into a list.
    fn fold(&mut self, key: String, value: String) {
        if let Some(entry) = self.pairs.iter_mut().find(|(name, _)| *name == key) {
            let existing = std::mem::replace(&mut entry.1, Value::Many(Vec::new()));
            entry.1 = match existing {
                Value::One(first) => Value::Many(vec![first, value]),
                Value::Many(mut values) => {
                    values.push(value);
                    Value::Many(values)
                }
            };
        } else {
            self.pairs.push((key, Value::One(value)));
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// How list values spell their key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayFormat {
    /// Repeat the bare key for each value: `tag=a&tag=b`.
    #[default]
    Repeat,
    /// Append `[]` to the key for each value: `tag[]=a&tag[]=b`.
    Brackets,
}

/// Options controlling [`stringify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Character placed between pairs.
    pub separator: char,
    /// Character placed between a key and its value.
    pub equals: char,
    /// Spelling for list values.
    pub array_format: ArrayFormat,
    /// Encode spaces as `+` instead of `%20`.
    pub space_as_plus: bool,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            separator: '&',
            equals: '=',
            array_format: ArrayFormat::Repeat,
            space_as_plus: false,
        }
    }
}

/// Options controlling [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Character separating pairs.
    pub separator: char,
    /// Character separating a key from its value.
    pub equals: char,
    /// Decode `+` as a space before percent-decoding.
    pub plus_as_space: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            separator: '&',
            equals: '=',
            plus_as_space: false,
        }
    }
}

/// Encode `query` into a string.
///
/// Keys and values are percent-encoded; the configured separator and equals
/// characters are inserted verbatim. An empty query and a key whose list is
/// empty both produce nothing.
pub fn stringify(query: &Query, options: &StringifyOptions) -> String {
    let mut out = String::new();
    for (key, value) in query.pairs() {
        match value {
            Value::One(single) => push_pair(&mut out, key, single, options),
            Value::Many(values) => {
                for single in values {
                    let key = match options.array_format {
                        ArrayFormat::Repeat => Cow::Borrowed(key.as_str()),
                        ArrayFormat::Brackets => Cow::Owned(format!("{key}[]")),
                    };
                    push_pair(&mut out, &key, single, options);
                }
            }
        }
    }
    out
}

fn push_pair(out: &mut String, key: &str, value: &str, options: &StringifyOptions) {
    if !out.is_empty() {
        out.push(options.separator);
    }
    out.push_str(&encode(key, options));
    out.push(options.equals);
    out.push_str(&encode(value, options));
}

fn encode(raw: &str, options: &StringifyOptions) -> String {
    let encoded = utf8_percent_encode(raw, COMPONENT).to_string();
    if options.space_as_plus {
        encoded.replace("%20", "+")
    } else {
        encoded
    }
}

/// Parse a query string into pairs.
///
/// Pieces are split on the configured separator, then on the first equals
/// character; a piece without one becomes a key with an empty value. Keys
/// and values are percent-decoded (invalid sequences decode lossily), and a
/// key that repeats collects its values into [`Value::Many`]. Empty pieces
/// from doubled or trailing separators are skipped.
pub fn parse(input: &str, options: &ParseOptions) -> Query {
    let mut query = Query::new();
    for piece in input.split(options.separator).filter(|p| !p.is_empty()) {
        let (key, value) = match piece.split_once(options.equals) {
            Some((key, value)) => (key, value),
            None => (piece, ""),
        };
        query.fold(decode(key, options), decode(value, options));
    }
    query
}

fn decode(raw: &str, options: &ParseOptions) -> String {
    if options.plus_as_space {
        let unplussed = raw.replace('+', " ");
        percent_decode_str(&unplussed).decode_utf8_lossy().into_owned()
    } else {
        percent_decode_str(raw).decode_utf8_lossy().into_owned()
    }
}
