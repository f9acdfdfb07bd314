use anyhow::{Context, Result, bail};
use jsonschema::Validator;
use serde_json::Value;

use super::catalog::{CatalogDocument, FieldCatalog};

/// JSON Schema describing a catalog document.
pub fn catalog_schema() -> Result<Value> {
    let schema = schemars::schema_for!(CatalogDocument);
    serde_json::to_value(schema).context("failed to serialize catalog schema")
}

/// Validate a catalog document against [`catalog_schema`] and build the
/// typed catalog from it.
pub fn parse_catalog(document: &Value) -> Result<FieldCatalog> {
    let schema = catalog_schema()?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|err| anyhow::anyhow!("catalog schema is invalid: {err}"))?;
    ensure_matches_schema(document, &validator)?;

    let parsed: CatalogDocument =
        serde_json::from_value(document.clone()).context("failed to read catalog document")?;
    FieldCatalog::from_document(parsed)
}

fn ensure_matches_schema(document: &Value, validator: &Validator) -> Result<()> {
    let issues = validator
        .iter_errors(document)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            let prefix = if pointer.is_empty() {
                "<root>".to_string()
            } else {
                pointer
            };
            format!("{prefix}: {error}")
        })
        .collect::<Vec<_>>();
    if issues.is_empty() {
        return Ok(());
    }
    bail!("catalog document is invalid:\n  {}", issues.join("\n  "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldKind, ValidationKind};
    use serde_json::json;

    #[test]
    fn parses_catalog_documents() {
        let catalog = parse_catalog(&json!({
            "title": "Edit profile",
            "fields": [
                {
                    "attribute": "email",
                    "displayName": "Email",
                    "kind": "Text",
                    "required": true,
                    "validations": ["Email", "TextLengthBelow100"]
                },
                {
                    "attribute": "gallery",
                    "displayName": "Gallery",
                    "kind": "Showcase",
                    "extra": {"maxPhotos": 6, "isInstagramShowcase": true}
                }
            ]
        }))
        .unwrap();
        assert_eq!(catalog.title.as_deref(), Some("Edit profile"));
        let email = catalog.get("email").unwrap();
        assert!(email.required);
        assert_eq!(
            email.validations,
            vec![ValidationKind::Email, ValidationKind::MaxLength(100)]
        );
        let gallery = catalog.get("gallery").unwrap();
        assert_eq!(gallery.kind, FieldKind::Gallery);
        assert_eq!(gallery.extra.max_photos, Some(6));
        assert!(gallery.extra.social_profile);
    }

    #[test]
    fn reports_schema_violations_with_pointers() {
        let err = parse_catalog(&json!({
            "fields": [{"attribute": "name", "displayName": "Name", "kind": "Slider"}]
        }))
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/fields/0/kind"), "{message}");
    }

    #[test]
    fn rejects_unsupported_length_limits() {
        let err = parse_catalog(&json!({
            "fields": [{
                "attribute": "name",
                "displayName": "Name",
                "kind": "Text",
                "validations": ["MaxLength(42)"]
            }]
        }))
        .unwrap_err();
        assert!(format!("{err:#}").contains("42"));
    }
}
