use serde::{Deserialize, Serialize};

/// The value stored under one bag-info key.
///
/// A key seen once holds a `Scalar`; repeating it turns the value into a
/// `Multi` holding every value in the order they were added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BagInfoValue {
    Scalar(String),
    Multi(Vec<String>),
}

impl BagInfoValue {
    /// Add another value, promoting a scalar to a sequence.
    pub fn push(&mut self, value: String) {
        match self {
            Self::Scalar(old) => {
                let old = std::mem::take(old);
                *self = Self::Multi(vec![old, value]);
            }
            Self::Multi(values) => values.push(value),
        }
    }

    /// The value if exactly one is stored.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Multi(_) => None,
        }
    }

    /// Every stored value, in insertion order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Scalar(v) => vec![v.as_str()],
            Self::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// The most recently added value.
    pub fn last(&self) -> &str {
        match self {
            Self::Scalar(v) => v,
            Self::Multi(vs) => vs.last().map(String::as_str).unwrap_or(""),
        }
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Multi(vs) => vs.last_mut(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

impl From<&str> for BagInfoValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for BagInfoValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}
