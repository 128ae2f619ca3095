use std::fmt;

/// Dynamic value of a schema option.
///
/// Option values in proto2 source come in three shapes: a scalar (a bare
/// word, a number, a boolean, or a quoted string), a bracketed list, or a
/// braced aggregate keyed by name. Aggregates nest arbitrarily, so the type
/// is recursive.
#[derive(Clone, Debug)]
pub enum OptionValue {
    /// A bare identifier, a number or boolean kept in its original textual
    /// form, or an escape-decoded quoted string.
    Scalar(String),
    /// `[a, b, c]`: an ordered sequence of values.
    List(Vec<OptionValue>),
    /// `{k: v ...}`: an aggregate, keyed by name in source order.
    Map(OptionMap),
}

impl OptionValue {
    /// Get as a scalar string slice.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            OptionValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a list of values.
    pub fn as_list(&self) -> Option<&[OptionValue]> {
        match self {
            OptionValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// Get as an aggregate map.
    pub fn as_map(&self) -> Option<&OptionMap> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns a short type description string.
    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Scalar(_) => "scalar",
            OptionValue::List(_) => "list",
            OptionValue::Map(_) => "map",
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Scalar(a), OptionValue::Scalar(b)) => a == b,
            (OptionValue::List(a), OptionValue::List(b)) => a == b,
            (OptionValue::Map(a), OptionValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OptionValue {}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Scalar(s) => write!(f, "{}", s),
            OptionValue::List(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            OptionValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Scalar(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Scalar(v)
    }
}

impl From<Vec<OptionValue>> for OptionValue {
    fn from(v: Vec<OptionValue>) -> Self {
        OptionValue::List(v)
    }
}

impl From<OptionMap> for OptionValue {
    fn from(v: OptionMap) -> Self {
        OptionValue::Map(v)
    }
}

/// A name -> value mapping that remembers insertion order.
///
/// Keys iterate in the order they first appeared in source. Two maps with
/// the same entries compare equal regardless of that order.
#[derive(Clone, Debug, Default)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        OptionMap {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert an entry. A repeated key folds the previous and new values
    /// into a list, so `{y: 1 y: 2}` reads back as `y -> [1, 2]` and a
    /// third occurrence appends to that list.
    pub fn insert_folding(&mut self, name: String, value: OptionValue) {
        match self.entries.iter().position(|(k, _)| *k == name) {
            Some(pos) => match &mut self.entries[pos].1 {
                OptionValue::List(values) => values.push(value),
                previous => {
                    let first = previous.clone();
                    *previous = OptionValue::List(vec![first, value]);
                }
            },
            None => self.entries.push((name, value)),
        }
    }

    /// Insert an entry. When both the existing and incoming values are
    /// aggregates their sub-mappings are unioned recursively, so
    /// `(range).min = 1` followed by `(range).max = 100` collapses to
    /// `range -> {min: 1, max: 100}`. Anything else replaces.
    pub fn insert_merging(&mut self, name: String, value: OptionValue) {
        match self.entries.iter().position(|(k, _)| *k == name) {
            Some(pos) => match (&mut self.entries[pos].1, value) {
                (OptionValue::Map(existing), OptionValue::Map(incoming)) => {
                    existing.merge(incoming);
                }
                (previous, value) => *previous = value,
            },
            None => self.entries.push((name, value)),
        }
    }

    /// Union another map into this one, entry by entry, with the
    /// [`insert_merging`](Self::insert_merging) rules.
    pub fn merge(&mut self, other: OptionMap) {
        for (name, value) in other.entries {
            self.insert_merging(name, value);
        }
    }
}

impl PartialEq for OptionMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for OptionMap {}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
        OptionMap {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A single named option as written in source.
///
/// `(validation.range).min = 1` parses to name `validation.range` with a
/// single-entry aggregate value `{min: 1}`; the mapping view built by
/// [`as_map`](Self::as_map) is what merges repeated names back together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtoOption {
    pub name: String,
    pub value: OptionValue,
}

impl ProtoOption {
    pub fn new(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        ProtoOption {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Collapse a list of options into a name -> value mapping, merging
    /// repeated names that target sub-fields of the same aggregate.
    pub fn as_map(options: &[ProtoOption]) -> OptionMap {
        let mut map = OptionMap::new();
        for option in options {
            map.insert_merging(option.name.clone(), option.value.clone());
        }
        map
    }
}
