//! Field expressions: addressable paths into an entity's typed data.
//!
//! Every expression has a canonical, human-diffable string form which is
//! also its serialized form and its identity for deduplication:
//!
//! ```text
//! node:article.field_hero.alt                         direct
//! node:article.field_media.entity=>media.name.value   reference chain
//! node:article.field_image{alt=node:article.field_image.alt,src=…}   object
//! ```
//!
//! A bundle is optional (`node.title.value` addresses a base field) and an
//! item delta may follow the field name (`field_tags[0]`).

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One property of one field on an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectField {
    pub entity_type: String,
    pub bundle: Option<String>,
    pub field_name: String,
    /// Item index; `None` addresses every item.
    pub delta: Option<u32>,
    pub property_name: String,
}

impl DirectField {
    pub fn new(
        entity_type: impl Into<String>,
        bundle: Option<&str>,
        field_name: impl Into<String>,
        property_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.map(str::to_string),
            field_name: field_name.into(),
            delta: None,
            property_name: property_name.into(),
        }
    }

    #[must_use]
    pub fn with_delta(mut self, delta: u32) -> Self {
        self.delta = Some(delta);
        self
    }
}

/// A reference property followed into the entity it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceField {
    /// The reference property on the referencing entity.
    pub referencer: DirectField,
    /// The expression evaluated on the referenced entity.
    pub target: Box<FieldExpression>,
}

/// The source of one object property inside an [`ObjectField`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappedField {
    Direct(DirectField),
    Reference(ReferenceField),
}

impl MappedField {
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }
}

/// An object built from several properties of one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectField {
    pub entity_type: String,
    pub bundle: Option<String>,
    pub field_name: String,
    pub delta: Option<u32>,
    /// Object property name → where its value comes from.
    pub property_mapping: BTreeMap<String, MappedField>,
}

/// An addressable path into an entity's typed data graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldExpression {
    Direct(DirectField),
    Reference(ReferenceField),
    Object(ObjectField),
}

impl FieldExpression {
    /// Wraps `target` so it is evaluated through `referencer`.
    #[must_use]
    pub fn reference(referencer: DirectField, target: FieldExpression) -> Self {
        Self::Reference(ReferenceField {
            referencer,
            target: Box::new(target),
        })
    }

    /// Entity type the expression is evaluated on.
    #[must_use]
    pub fn root_entity_type(&self) -> &str {
        match self {
            Self::Direct(d) => &d.entity_type,
            Self::Reference(r) => &r.referencer.entity_type,
            Self::Object(o) => &o.entity_type,
        }
    }

    /// Bundle of the root field, if the expression is bundle-specific.
    #[must_use]
    pub fn root_bundle(&self) -> Option<&str> {
        match self {
            Self::Direct(d) => d.bundle.as_deref(),
            Self::Reference(r) => r.referencer.bundle.as_deref(),
            Self::Object(o) => o.bundle.as_deref(),
        }
    }

    /// Name of the field on the root entity.
    #[must_use]
    pub fn root_field_name(&self) -> &str {
        match self {
            Self::Direct(d) => &d.field_name,
            Self::Reference(r) => &r.referencer.field_name,
            Self::Object(o) => &o.field_name,
        }
    }

    /// Item delta on the root field.
    #[must_use]
    pub fn root_delta(&self) -> Option<u32> {
        match self {
            Self::Direct(d) => d.delta,
            Self::Reference(r) => r.referencer.delta,
            Self::Object(o) => o.delta,
        }
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Property name at the end of the chain; `None` for objects.
    #[must_use]
    pub fn leaf_property_name(&self) -> Option<&str> {
        match self {
            Self::Direct(d) => Some(&d.property_name),
            Self::Reference(r) => r.target.leaf_property_name(),
            Self::Object(_) => None,
        }
    }

    /// Number of entity references followed.
    #[must_use]
    pub fn reference_depth(&self) -> usize {
        match self {
            Self::Direct(_) => 0,
            Self::Reference(r) => 1 + r.target.reference_depth(),
            Self::Object(o) => o
                .property_mapping
                .values()
                .map(|m| match m {
                    MappedField::Direct(_) => 0,
                    MappedField::Reference(r) => 1 + r.target.reference_depth(),
                })
                .max()
                .unwrap_or(0),
        }
    }

    /// Converts to a [`MappedField`] if the expression can feed an object
    /// property.
    #[must_use]
    pub fn into_mapped(self) -> Option<MappedField> {
        match self {
            Self::Direct(d) => Some(MappedField::Direct(d)),
            Self::Reference(r) => Some(MappedField::Reference(r)),
            Self::Object(_) => None,
        }
    }
}

impl From<DirectField> for FieldExpression {
    fn from(d: DirectField) -> Self {
        Self::Direct(d)
    }
}

impl From<MappedField> for FieldExpression {
    fn from(m: MappedField) -> Self {
        match m {
            MappedField::Direct(d) => Self::Direct(d),
            MappedField::Reference(r) => Self::Reference(r),
        }
    }
}

// ── Canonical string form ───────────────────────────────────────

fn write_head(
    f: &mut fmt::Formatter<'_>,
    entity_type: &str,
    bundle: Option<&str>,
    field_name: &str,
    delta: Option<u32>,
) -> fmt::Result {
    f.write_str(entity_type)?;
    if let Some(bundle) = bundle {
        write!(f, ":{bundle}")?;
    }
    write!(f, ".{field_name}")?;
    if let Some(delta) = delta {
        write!(f, "[{delta}]")?;
    }
    Ok(())
}

impl fmt::Display for DirectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_head(
            f,
            &self.entity_type,
            self.bundle.as_deref(),
            &self.field_name,
            self.delta,
        )?;
        write!(f, ".{}", self.property_name)
    }
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=>{}", self.referencer, self.target)
    }
}

impl fmt::Display for MappedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(d) => fmt::Display::fmt(d, f),
            Self::Reference(r) => fmt::Display::fmt(r, f),
        }
    }
}

impl fmt::Display for ObjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_head(
            f,
            &self.entity_type,
            self.bundle.as_deref(),
            &self.field_name,
            self.delta,
        )?;
        f.write_str("{")?;
        for (i, (name, source)) in self.property_mapping.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}={source}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for FieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(d) => fmt::Display::fmt(d, f),
            Self::Reference(r) => fmt::Display::fmt(r, f),
            Self::Object(o) => fmt::Display::fmt(o, f),
        }
    }
}

impl FromStr for FieldExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser::new(s);
        let expression = parser.expression()?;
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expression)
    }
}

impl Serialize for FieldExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldExpression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

struct Head {
    entity_type: String,
    bundle: Option<String>,
    field_name: String,
    delta: Option<u32>,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error(&self, reason: &str) -> Error {
        Error::InvalidExpression {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn ident(&mut self) -> Result<String> {
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error("expected a name"));
        }
        let ident = self.rest()[..len].to_string();
        self.pos += len;
        Ok(ident)
    }

    fn head(&mut self) -> Result<Head> {
        let entity_type = self.ident()?;
        let bundle = if self.eat(":") {
            Some(self.ident()?)
        } else {
            None
        };
        self.expect(".")?;
        let field_name = self.ident()?;
        let delta = if self.eat("[") {
            let digits = self.ident()?;
            let delta = digits
                .parse::<u32>()
                .map_err(|_| self.error("delta must be a non-negative integer"))?;
            self.expect("]")?;
            Some(delta)
        } else {
            None
        };
        Ok(Head {
            entity_type,
            bundle,
            field_name,
            delta,
        })
    }

    fn expression(&mut self) -> Result<FieldExpression> {
        let head = self.head()?;
        if self.eat("{") {
            return self.object(head);
        }
        self.expect(".")?;
        let direct = DirectField {
            entity_type: head.entity_type,
            bundle: head.bundle,
            field_name: head.field_name,
            delta: head.delta,
            property_name: self.ident()?,
        };
        if self.eat("=>") {
            let target = self.expression()?;
            return Ok(FieldExpression::reference(direct, target));
        }
        Ok(FieldExpression::Direct(direct))
    }

    fn object(&mut self, head: Head) -> Result<FieldExpression> {
        let mut property_mapping = BTreeMap::new();
        loop {
            let name = self.ident()?;
            self.expect("=")?;
            let source = self
                .expression()?
                .into_mapped()
                .ok_or_else(|| self.error("object properties cannot map to objects"))?;
            if property_mapping.insert(name, source).is_some() {
                return Err(self.error("duplicate object property"));
            }
            if self.eat("}") {
                break;
            }
            self.expect(",")?;
        }
        Ok(FieldExpression::Object(ObjectField {
            entity_type: head.entity_type,
            bundle: head.bundle,
            field_name: head.field_name,
            delta: head.delta,
            property_mapping,
        }))
    }
}
