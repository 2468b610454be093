//! Requirements a structured-data property must meet to feed a prop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Constraint identifiers shared by requirements and data definitions.
pub mod constraint {
    pub const URI: &str = "Uri";
    pub const URI_SCHEME: &str = "UriScheme";
    pub const MEDIA_TYPE: &str = "MediaType";
    pub const PRIMITIVE_TYPE: &str = "PrimitiveType";
    pub const CHOICE: &str = "Choice";
    pub const REGEX: &str = "Regex";
    pub const RANGE: &str = "Range";
    pub const EMAIL: &str = "Email";
    pub const DATE_TIME: &str = "DateTime";
    pub const NOT_NULL: &str = "NotNull";
    pub const UNSUPPORTED: &str = "Unsupported";
}

/// Options of one constraint (`{"allowRelative": true}`, `{"choices": [...]}`, …).
pub type ConstraintOptions = BTreeMap<String, Value>;

/// Constraints declared on the data side: constraint id → options.
pub type ConstraintMap = BTreeMap<String, ConstraintOptions>;

/// One requirement: a constraint id, its options and an optional capability
/// the data property must declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeRequirement {
    pub constraint: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: ConstraintOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
}

impl ShapeRequirement {
    pub fn new(constraint: &str) -> Self {
        Self {
            constraint: constraint.to_string(),
            options: BTreeMap::new(),
            capability: None,
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_capability(mut self, capability: &str) -> Self {
        self.capability = Some(capability.to_string());
        self
    }

    pub fn uri(allow_relative: bool) -> Self {
        Self::new(constraint::URI).with_option("allowRelative", Value::Bool(allow_relative))
    }

    pub fn uri_scheme(schemes: Vec<Value>) -> Self {
        Self::new(constraint::URI_SCHEME).with_option("schemes", Value::Array(schemes))
    }

    pub fn media_type(mime: &str) -> Self {
        Self::new(constraint::MEDIA_TYPE).with_option("mime", Value::from(mime))
    }

    pub fn primitive_type(capability: &str) -> Self {
        Self::new(constraint::PRIMITIVE_TYPE).with_capability(capability)
    }

    pub fn choice(choices: Vec<Value>) -> Self {
        Self::new(constraint::CHOICE).with_option("choices", Value::Array(choices))
    }

    pub fn regex(pattern: &str) -> Self {
        Self::new(constraint::REGEX).with_option("pattern", Value::from(pattern))
    }

    pub fn range(min: Option<Value>, max: Option<Value>) -> Self {
        let mut requirement = Self::new(constraint::RANGE);
        if let Some(min) = min {
            requirement.options.insert("min".into(), min);
        }
        if let Some(max) = max {
            requirement.options.insert("max".into(), max);
        }
        requirement
    }

    pub fn date_time(format: &str) -> Self {
        Self::new(constraint::DATE_TIME).with_option("format", Value::from(format))
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::new(constraint::UNSUPPORTED).with_option("reason", Value::String(reason.into()))
    }

    pub fn is_unsupported(&self) -> bool {
        self.constraint == constraint::UNSUPPORTED
    }

    /// Whether a data property with the given constraints meets this
    /// requirement.
    pub fn is_satisfied_by(&self, data: &DataConstraints<'_>) -> bool {
        if let Some(capability) = &self.capability {
            if !data.capabilities.contains(capability) {
                return false;
            }
        }
        match self.constraint.as_str() {
            constraint::UNSUPPORTED => false,
            constraint::NOT_NULL => data.required,
            constraint::PRIMITIVE_TYPE => true,
            id => match data.constraints.get(id) {
                None => false,
                Some(actual) => options_satisfy(id, &self.options, actual),
            },
        }
    }
}

fn options_satisfy(id: &str, requested: &ConstraintOptions, actual: &ConstraintOptions) -> bool {
    match id {
        // Absolute-only data also satisfies a request that tolerates relative
        // references; the reverse never holds.
        constraint::URI => {
            let data_relative = flag(actual, "allowRelative");
            !data_relative || flag(requested, "allowRelative")
        }
        constraint::CHOICE => is_subset(actual.get("choices"), requested.get("choices")),
        constraint::URI_SCHEME => is_subset(actual.get("schemes"), requested.get("schemes")),
        constraint::MEDIA_TYPE => match (
            requested.get("mime").and_then(Value::as_str),
            actual.get("mime").and_then(Value::as_str),
        ) {
            (Some(requested), Some(actual)) => media_type_matches(requested, actual),
            _ => false,
        },
        constraint::RANGE => {
            bound_within(requested.get("min"), actual.get("min"), |req, act| act >= req)
                && bound_within(requested.get("max"), actual.get("max"), |req, act| act <= req)
        }
        _ => requested == actual,
    }
}

fn flag(options: &ConstraintOptions, key: &str) -> bool {
    options.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn is_subset(actual: Option<&Value>, requested: Option<&Value>) -> bool {
    match (
        actual.and_then(Value::as_array),
        requested.and_then(Value::as_array),
    ) {
        (Some(actual), Some(requested)) => {
            !actual.is_empty() && actual.iter().all(|v| requested.contains(v))
        }
        _ => false,
    }
}

fn bound_within(
    requested: Option<&Value>,
    actual: Option<&Value>,
    ok: impl Fn(f64, f64) -> bool,
) -> bool {
    match requested.and_then(Value::as_f64) {
        None => true,
        Some(req) => actual.and_then(Value::as_f64).is_some_and(|act| ok(req, act)),
    }
}

/// `image/*` accepts `image/png` and `image/*`; a concrete type accepts
/// only itself.
fn media_type_matches(requested: &str, actual: &str) -> bool {
    match requested.strip_suffix("/*") {
        Some(top) => actual
            .split_once('/')
            .is_some_and(|(actual_top, _)| actual_top == top),
        None => requested == actual,
    }
}

/// The data side of a satisfaction check.
#[derive(Debug, Clone, Copy)]
pub struct DataConstraints<'a> {
    pub constraints: &'a ConstraintMap,
    pub capabilities: &'a BTreeSet<String>,
    /// Whether the property always has a value when its item exists.
    pub required: bool,
}

/// Result of translating a scalar shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeRequirements {
    /// A primitive-type match suffices.
    None,
    Single(ShapeRequirement),
    /// Conjunctive: every requirement must hold.
    All(Vec<ShapeRequirement>),
}

impl ShapeRequirements {
    pub fn from_vec(mut requirements: Vec<ShapeRequirement>) -> Self {
        match requirements.len() {
            0 => Self::None,
            1 => Self::Single(requirements.remove(0)),
            _ => Self::All(requirements),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShapeRequirement> {
        match self {
            Self::None => Default::default(),
            Self::Single(requirement) => std::slice::from_ref(requirement).iter(),
            Self::All(requirements) => requirements.iter(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        self.iter().any(ShapeRequirement::is_unsupported)
    }

    /// True when every requirement holds for `data`.
    pub fn are_satisfied_by(&self, data: &DataConstraints<'_>) -> bool {
        self.iter().all(|r| r.is_satisfied_by(data))
    }
}
