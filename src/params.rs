use std::{
    collections::{hash_map, HashMap},
    ops::Index,
};

use serde::{de, Deserialize};

use crate::de::ParamsDeserializer;

/// Value of a single route parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParamValue {
    /// Parameter is known to the route but has no value.
    #[default]
    Null,

    /// Scalar value, already percent-decoded.
    Str(String),

    /// Wildcard segments, each percent-decoded.
    Seq(Vec<String>),
}

impl ParamValue {
    /// Returns the string value, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(val) => Some(val),
            _ => None,
        }
    }

    /// Returns the segments, if this is a wildcard sequence.
    pub fn as_seq(&self) -> Option<&[String]> {
        match self {
            ParamValue::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// Returns true if this is [`ParamValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Returns true for `Null`, an empty string and an empty sequence.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            ParamValue::Null => true,
            ParamValue::Str(val) => val.is_empty(),
            ParamValue::Seq(seq) => seq.is_empty(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(val: &str) -> Self {
        ParamValue::Str(val.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(val: String) -> Self {
        ParamValue::Str(val)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(val: Option<T>) -> Self {
        val.map_or(ParamValue::Null, Into::into)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(seq: Vec<String>) -> Self {
        ParamValue::Seq(seq)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(seq: Vec<&str>) -> Self {
        ParamValue::Seq(seq.into_iter().map(ToOwned::to_owned).collect())
    }
}

/// Parameters extracted from a successful match.
///
/// Holds the route's default values overlaid with the values captured from the path and server
/// variables. The wildcard parameter, if the route has one, is always a [`ParamValue::Seq`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: HashMap<String, ParamValue>,
}

impl Params {
    /// Returns the value for `name`.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.inner.get(name)
    }

    /// Returns the value for `name` if it is a scalar string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Returns the value for `name` if it is a segment sequence.
    pub fn get_seq(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(ParamValue::as_seq)
    }

    /// Returns true if a parameter named `name` exists, even if its value is `Null`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Return iterator to items in parameter container.
    pub fn iter(&self) -> hash_map::Iter<'_, String, ParamValue> {
        self.inner.iter()
    }

    /// Deserializes parameters to a specified type `T`.
    ///
    /// Scalar fields are parsed from their string values, `Null` maps to `None` and the wildcard
    /// maps to a sequence.
    ///
    /// # Errors
    /// Returns error when parameters cannot be deserialized into a `T` type.
    pub fn load<'de, T: Deserialize<'de>>(&'de self) -> Result<T, de::value::Error> {
        T::deserialize(ParamsDeserializer::new(self))
    }

    pub(crate) fn insert(&mut self, name: String, value: ParamValue) {
        self.inner.insert(name, value);
    }
}

impl From<HashMap<String, ParamValue>> for Params {
    fn from(inner: HashMap<String, ParamValue>) -> Self {
        Params { inner }
    }
}

impl From<Params> for HashMap<String, ParamValue> {
    fn from(params: Params) -> Self {
        params.inner
    }
}

impl<'a> Index<&'a str> for Params {
    type Output = ParamValue;

    fn index(&self, name: &'a str) -> &ParamValue {
        self.get(name)
            .expect("Value for parameter is not available")
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = hash_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = hash_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
