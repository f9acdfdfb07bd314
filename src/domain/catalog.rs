use anyhow::{Result, bail};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kind::{FieldKind, ValidationKind};

const DEFAULT_BUTTON_TEXT: &str = "Save";

/// Per-kind parameters a descriptor may carry. Keys nobody here reads are
/// kept in `other` so a rendering layer can still see them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldExtra {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_photos: Option<usize>,
    #[serde(default, alias = "isInstagramShowcase")]
    pub social_profile: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One editable attribute of the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub attribute: String,
    pub display_name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validations: Vec<ValidationKind>,
    #[serde(default)]
    pub extra: FieldExtra,
}

impl FieldDescriptor {
    pub fn new(
        attribute: impl Into<String>,
        display_name: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            display_name: display_name.into(),
            kind,
            required: false,
            validations: Vec::new(),
            extra: FieldExtra::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, validation: ValidationKind) -> Self {
        self.validations.push(validation);
        self
    }

    pub fn with_extra(mut self, extra: FieldExtra) -> Self {
        self.extra = extra;
        self
    }

    /// Label shown next to the input; required fields carry a `*`.
    pub fn display_label(&self) -> String {
        if self.required {
            format!("{}*", self.display_name)
        } else {
            self.display_name.clone()
        }
    }
}

/// Serialized shape of a field catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

/// Ordered, immutable set of descriptors with attribute lookup.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    pub title: Option<String>,
    pub description: Option<String>,
    pub button_text: Option<String>,
    fields: Vec<FieldDescriptor>,
    index: IndexMap<String, usize>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        let mut index = IndexMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if field.attribute.is_empty() {
                bail!("field #{position} has an empty attribute name");
            }
            if index.insert(field.attribute.clone(), position).is_some() {
                bail!("attribute '{}' is declared more than once", field.attribute);
            }
        }
        Ok(Self {
            title: None,
            description: None,
            button_text: None,
            fields,
            index,
        })
    }

    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let mut catalog = Self::new(document.fields)?;
        catalog.title = document.title;
        catalog.description = document.description;
        catalog.button_text = document.button_text;
        Ok(catalog)
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            title: self.title.clone(),
            description: self.description.clone(),
            button_text: self.button_text.clone(),
            fields: self.fields.clone(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, attribute: &str) -> Option<usize> {
        self.index.get(attribute).copied()
    }

    pub fn get(&self, attribute: &str) -> Option<&FieldDescriptor> {
        self.position(attribute).map(|idx| &self.fields[idx])
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.index.contains_key(attribute)
    }

    pub fn button_text(&self) -> &str {
        self.button_text.as_deref().unwrap_or(DEFAULT_BUTTON_TEXT)
    }
}
