use serde::{Deserialize, Serialize};
use std::fmt;

/// How many items a field stores, or how many values a prop requests.
///
/// Serialized the way field storage records it: a positive item count, or
/// `-1` for unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Cardinality {
    /// At most this many items (always at least 1).
    Limited(u32),
    Unlimited,
}

impl Cardinality {
    /// A single value.
    pub const SINGLE: Self = Self::Limited(1);

    /// Returns true if more than one item can be held.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        !matches!(self, Self::Limited(1))
    }

    /// Whether a field with this cardinality can feed a prop requesting
    /// `requested` values.
    ///
    /// Equal cardinalities always match. A field holding more items than a
    /// finite request can still satisfy it (a subset is rendered), but a
    /// field can never satisfy a request for more values than it stores.
    #[must_use]
    pub fn satisfies(&self, requested: Cardinality) -> bool {
        match (*self, requested) {
            (field, requested) if field == requested => true,
            (_, Self::Unlimited) => false,
            (Self::Unlimited, Self::Limited(_)) => true,
            (Self::Limited(field), Self::Limited(requested)) => field > requested,
        }
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl TryFrom<i64> for Cardinality {
    type Error = crate::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Unlimited),
            n if n >= 1 && n <= i64::from(u32::MAX) => Ok(Self::Limited(n as u32)),
            n => Err(crate::Error::InvalidCardinality(n)),
        }
    }
}

impl From<Cardinality> for i64 {
    fn from(value: Cardinality) -> Self {
        match value {
            Cardinality::Limited(n) => i64::from(n),
            Cardinality::Unlimited => -1,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}
