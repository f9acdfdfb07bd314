use anyhow::{Context, Result, bail};
use serde_json::{Map, Number, Value};

use crate::domain::{FieldCatalog, FieldDescriptor, FieldExtra, FieldKind, ValidationKind, parse_catalog};
use crate::form::{
    ARTICLE_CONTENT, ARTICLE_TITLE, Entity, GALLERY_IMAGE_URLS, RawInputSet, UploadedFileMap,
    is_email_shaped,
};

use super::DocumentFormat;

const ID_ATTRIBUTE: &str = "id";

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::from_str::<toml::Table>(contents)
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

pub fn catalog_from_str(contents: &str, format: DocumentFormat) -> Result<FieldCatalog> {
    let value = parse_document_str(contents, format)?;
    parse_catalog(&value)
}

pub fn entity_from_str(contents: &str, format: DocumentFormat) -> Result<Entity> {
    let value = parse_document_str(contents, format)?;
    Entity::from_value(value).context("failed to read entity document")
}

pub fn raw_inputs_from_str(contents: &str, format: DocumentFormat) -> Result<RawInputSet> {
    let value = parse_document_str(contents, format)?;
    RawInputSet::from_value(&value)
}

/// Read an uploaded-file map: an object of field name to stored path.
pub fn uploads_from_value(value: &Value) -> Result<UploadedFileMap> {
    let Some(map) = value.as_object() else {
        bail!("uploads must be an object of field name to stored path");
    };
    map.iter()
        .map(|(name, path)| match path {
            Value::String(path) => Ok((name.clone(), path.clone())),
            other => bail!("upload '{name}' must be a path string, found {other}"),
        })
        .collect()
}

/// Guess a field catalog from an existing entity document, one descriptor
/// per top-level key. The `id` attribute is never editable and is skipped.
pub fn catalog_from_entity(value: &Value) -> Result<FieldCatalog> {
    let Some(map) = value.as_object() else {
        bail!("cannot infer a catalog from a non-object entity");
    };
    let fields = map
        .iter()
        .filter(|(attribute, _)| attribute.as_str() != ID_ATTRIBUTE)
        .map(|(attribute, value)| infer_descriptor(attribute, value))
        .collect();
    FieldCatalog::new(fields)
}

fn infer_descriptor(attribute: &str, value: &Value) -> FieldDescriptor {
    let label = display_name(attribute);
    match value {
        Value::Bool(_) => FieldDescriptor::new(attribute, label, FieldKind::Checkbox),
        Value::Number(num) => FieldDescriptor::new(attribute, label, FieldKind::Text)
            .with_validation(number_validation(num)),
        Value::String(text) if text.contains('\n') => {
            FieldDescriptor::new(attribute, label, FieldKind::MultilineText)
        }
        Value::String(text) if is_email_shaped(text) => {
            FieldDescriptor::new(attribute, label, FieldKind::Text)
                .with_validation(ValidationKind::Email)
        }
        Value::Null | Value::String(_) => FieldDescriptor::new(attribute, label, FieldKind::Text),
        Value::Array(items) => FieldDescriptor::new(attribute, label, array_kind(items)),
        Value::Object(map) => object_descriptor(attribute, label, map),
    }
}

fn number_validation(number: &Number) -> ValidationKind {
    if number.is_i64() || number.is_u64() {
        ValidationKind::Number
    } else {
        ValidationKind::Price
    }
}

fn array_kind(items: &[Value]) -> FieldKind {
    let rows = items.iter().filter_map(Value::as_object).collect::<Vec<_>>();
    if rows.is_empty() || rows.len() != items.len() {
        return FieldKind::TextList;
    }
    if rows.iter().all(|row| row.contains_key("file_path")) {
        FieldKind::FileMultiple
    } else if rows
        .iter()
        .all(|row| row.contains_key("0") || row.contains_key("1"))
    {
        FieldKind::PairList
    } else {
        FieldKind::TextList
    }
}

fn object_descriptor(attribute: &str, label: String, map: &Map<String, Value>) -> FieldDescriptor {
    if map.contains_key(GALLERY_IMAGE_URLS) {
        let social = map.contains_key("handle") || map.contains_key("profile_photo_url");
        let extra = FieldExtra {
            social_profile: social,
            ..FieldExtra::default()
        };
        return FieldDescriptor::new(attribute, label, FieldKind::Gallery).with_extra(extra);
    }
    if map.contains_key(ARTICLE_TITLE) || map.contains_key(ARTICLE_CONTENT) {
        return FieldDescriptor::new(attribute, label, FieldKind::RichArticle);
    }
    FieldDescriptor::new(attribute, label, FieldKind::Address)
}

/// `first_name` → `First name`.
fn display_name(attribute: &str) -> String {
    let spaced = attribute.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
