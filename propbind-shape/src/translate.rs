use crate::requirement::{constraint, ShapeRequirement, ShapeRequirements};
use crate::shape::{JsonSchemaType, PropShape};
use serde_json::Value;
use tracing::warn;

/// Capability of properties whose value addresses a stored file.
pub const FILE_REFERENCE: &str = "FileReference";
/// Capability of properties that render processed, formatted markup.
pub const FORMATTED_TEXT: &str = "FormattedText";

/// Keywords that change no requirement on their own.
const NEUTRAL_KEYWORDS: &[&str] = &["x-formatting-context"];

/// Maps a scalar shape's constraints to data requirements.
///
/// Object and array shapes are decomposed by the matcher before they get
/// here; passing one yields an `Unsupported` requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeRequirementTranslator;

impl ShapeRequirementTranslator {
    pub fn translate(shape: &PropShape, required: bool) -> ShapeRequirements {
        let mut requirements = match shape.schema_type {
            JsonSchemaType::String => string_requirements(shape),
            JsonSchemaType::Integer | JsonSchemaType::Number => numeric_requirements(shape),
            JsonSchemaType::Boolean => unknown_keywords(shape, &[]),
            JsonSchemaType::Object | JsonSchemaType::Array => vec![ShapeRequirement::unsupported(
                format!("{} shapes have no scalar requirements", shape.schema_type.as_str()),
            )],
        };
        if required {
            requirements.push(ShapeRequirement::new(constraint::NOT_NULL));
        }

        for unsupported in requirements.iter().filter(|r| r.is_unsupported()) {
            let reason = unsupported
                .options
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default();
            warn!(
                shape = %shape.to_schema(),
                reason,
                "Unsupported prop shape constraint; no data can match this shape"
            );
        }
        ShapeRequirements::from_vec(requirements)
    }
}

fn string_requirements(shape: &PropShape) -> Vec<ShapeRequirement> {
    let mut requirements = Vec::new();

    if let Some(format) = shape.constraint("format") {
        requirements.push(match format.as_str() {
            Some("uri" | "iri") => ShapeRequirement::uri(false),
            Some("uri-reference" | "iri-reference") => ShapeRequirement::uri(true),
            Some("email" | "idn-email") => ShapeRequirement::new(constraint::EMAIL),
            Some(f @ ("date" | "date-time")) => ShapeRequirement::date_time(f),
            _ => ShapeRequirement::unsupported(format!("format: {format}")),
        });
    }

    if let Some(media) = shape.constraint("contentMediaType") {
        match media.as_str() {
            Some("text/html") => {
                requirements.push(ShapeRequirement::primitive_type(FORMATTED_TEXT));
            }
            Some(mime) if mime.ends_with("/*") => {
                requirements.push(ShapeRequirement::primitive_type(FILE_REFERENCE));
                requirements.push(ShapeRequirement::media_type(mime));
            }
            _ => requirements.push(ShapeRequirement::unsupported(format!(
                "contentMediaType: {media}"
            ))),
        }
    }

    if let Some(schemes) = shape.constraint("x-allowed-schemes") {
        requirements.push(match schemes.as_array() {
            Some(schemes) => ShapeRequirement::uri_scheme(schemes.clone()),
            None => ShapeRequirement::unsupported(format!("x-allowed-schemes: {schemes}")),
        });
    }

    if let Some(pattern) = shape.constraint("pattern") {
        requirements.push(match pattern.as_str() {
            Some(pattern) => ShapeRequirement::regex(pattern),
            None => ShapeRequirement::unsupported(format!("pattern: {pattern}")),
        });
    }

    requirements.extend(enum_requirement(shape));
    requirements.extend(unknown_keywords(
        shape,
        &["format", "contentMediaType", "x-allowed-schemes", "pattern", "enum"],
    ));
    requirements
}

fn numeric_requirements(shape: &PropShape) -> Vec<ShapeRequirement> {
    let mut requirements = Vec::new();
    let min = shape.constraint("minimum").cloned();
    let max = shape.constraint("maximum").cloned();
    if min.is_some() || max.is_some() {
        requirements.push(ShapeRequirement::range(min, max));
    }
    requirements.extend(enum_requirement(shape));
    requirements.extend(unknown_keywords(shape, &["minimum", "maximum", "enum"]));
    requirements
}

fn enum_requirement(shape: &PropShape) -> Option<ShapeRequirement> {
    shape.constraint("enum").map(|choices| match choices.as_array() {
        Some(choices) if !choices.is_empty() => ShapeRequirement::choice(choices.clone()),
        _ => ShapeRequirement::unsupported(format!("enum: {choices}")),
    })
}

fn unknown_keywords(shape: &PropShape, known: &[&str]) -> Vec<ShapeRequirement> {
    shape
        .constraints
        .keys()
        .filter(|k| !known.contains(&k.as_str()) && !NEUTRAL_KEYWORDS.contains(&k.as_str()))
        .map(|k| {
            ShapeRequirement::unsupported(format!(
                "keyword `{k}` on {} shape",
                shape.schema_type.as_str()
            ))
        })
        .collect()
}
