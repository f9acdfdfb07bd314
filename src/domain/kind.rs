use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input control a descriptor renders as, and the merge/normalization rules
/// that apply to it on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    TextList,
    #[serde(alias = "DoubleTextList")]
    PairList,
    #[serde(alias = "TextArea")]
    MultilineText,
    #[serde(alias = "Photo")]
    FileSingle,
    #[serde(alias = "File", alias = "FilePhoto")]
    FileMultiple,
    ProfilePhoto,
    Address,
    Radio,
    Checkbox,
    #[serde(alias = "Article")]
    RichArticle,
    Date,
    Select,
    #[serde(alias = "Showcase")]
    Gallery,
}

impl FieldKind {
    /// Every spelling accepted in catalog documents, canonical names first.
    pub const ACCEPTED_NAMES: &'static [&'static str] = &[
        "Text",
        "TextList",
        "PairList",
        "MultilineText",
        "FileSingle",
        "FileMultiple",
        "ProfilePhoto",
        "Address",
        "Radio",
        "Checkbox",
        "RichArticle",
        "Date",
        "Select",
        "Gallery",
        "DoubleTextList",
        "TextArea",
        "Photo",
        "File",
        "FilePhoto",
        "Article",
        "Showcase",
    ];

    /// Kinds whose rows are tracked with a visible size.
    pub fn is_list(self) -> bool {
        matches!(self, FieldKind::TextList | FieldKind::PairList)
    }

    /// Kinds that take an attached list of stored files.
    pub fn takes_files(self) -> bool {
        matches!(
            self,
            FieldKind::FileSingle
                | FieldKind::FileMultiple
                | FieldKind::ProfilePhoto
                | FieldKind::Gallery
        )
    }
}

impl JsonSchema for FieldKind {
    fn schema_name() -> String {
        "FieldKind".to_string()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            enum_values: Some(
                Self::ACCEPTED_NAMES
                    .iter()
                    .map(|name| Value::String((*name).to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
        .into()
    }
}

/// Length limits a `MaxLength` rule may use.
pub const MAX_LENGTH_LIMITS: [usize; 6] = [30, 50, 100, 200, 300, 400];

/// A validation rule attached to a descriptor. Rules run in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValidationKind {
    Email,
    PhoneNumber,
    UserName,
    CheckboxChecked,
    Required,
    MaxLength(usize),
    Number,
    Price,
}

impl ValidationKind {
    pub fn max_length(limit: usize) -> Option<Self> {
        MAX_LENGTH_LIMITS
            .contains(&limit)
            .then_some(ValidationKind::MaxLength(limit))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationKindError {
    #[error("unknown validation '{0}'")]
    Unknown(String),
    #[error("max length {0} is not one of {MAX_LENGTH_LIMITS:?}")]
    UnsupportedLimit(usize),
}

impl FromStr for ValidationKind {
    type Err = ValidationKindError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let kind = match trimmed {
            "Email" => ValidationKind::Email,
            "PhoneNumber" => ValidationKind::PhoneNumber,
            "UserName" => ValidationKind::UserName,
            "CheckboxChecked" => ValidationKind::CheckboxChecked,
            "Required" | "RequiredField" => ValidationKind::Required,
            "Number" => ValidationKind::Number,
            "Price" => ValidationKind::Price,
            other => {
                let digits = other
                    .strip_prefix("TextLengthBelow")
                    .or_else(|| {
                        other
                            .strip_prefix("MaxLength(")
                            .and_then(|rest| rest.strip_suffix(')'))
                    })
                    .ok_or_else(|| ValidationKindError::Unknown(other.to_string()))?;
                let limit = digits
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ValidationKindError::Unknown(other.to_string()))?;
                return ValidationKind::max_length(limit)
                    .ok_or(ValidationKindError::UnsupportedLimit(limit));
            }
        };
        Ok(kind)
    }
}

impl TryFrom<String> for ValidationKind {
    type Error = ValidationKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValidationKind> for String {
    fn from(kind: ValidationKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationKind::Email => write!(f, "Email"),
            ValidationKind::PhoneNumber => write!(f, "PhoneNumber"),
            ValidationKind::UserName => write!(f, "UserName"),
            ValidationKind::CheckboxChecked => write!(f, "CheckboxChecked"),
            ValidationKind::Required => write!(f, "Required"),
            ValidationKind::MaxLength(limit) => write!(f, "MaxLength({limit})"),
            ValidationKind::Number => write!(f, "Number"),
            ValidationKind::Price => write!(f, "Price"),
        }
    }
}

impl JsonSchema for ValidationKind {
    fn schema_name() -> String {
        "ValidationKind".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}
