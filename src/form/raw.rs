use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// What kind of control produced a raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputControl {
    #[default]
    Value,
    /// Radio buttons are all present in the form; only the checked one counts.
    Radio { checked: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub name: String,
    pub value: String,
    pub control: InputControl,
}

impl RawInput {
    pub fn counts(&self) -> bool {
        !matches!(self.control, InputControl::Radio { checked: false })
    }
}

/// Named values produced by the rendered inputs at submit time, in form
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputSet {
    inputs: Vec<RawInput>,
}

impl RawInputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.inputs.push(RawInput {
            name: name.into(),
            value: value.into(),
            control: InputControl::Value,
        });
        self
    }

    pub fn push_radio(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        checked: bool,
    ) -> &mut Self {
        self.inputs.push(RawInput {
            name: name.into(),
            value: value.into(),
            control: InputControl::Radio { checked },
        });
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawInput> {
        self.inputs.iter()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &str) -> Result<Self> {
        let mut set = Self::new();
        for pair in body.trim().split('&').filter(|pair| !pair.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            set.push(decode_component(name)?, decode_component(value)?);
        }
        Ok(set)
    }

    /// Build from a document object. Arrays repeat the name once per item;
    /// non-string scalars use their JSON rendering.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            bail!("raw inputs must be an object of name/value pairs");
        };
        let mut set = Self::new();
        for (name, value) in map {
            match value {
                Value::Array(items) => {
                    for item in items {
                        set.push(name.clone(), scalar_text(item));
                    }
                }
                other => {
                    set.push(name.clone(), scalar_text(other));
                }
            }
        }
        Ok(set)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInputSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.push(name, value);
        }
        set
    }
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .with_context(|| format!("invalid percent-encoding in '{raw}'"))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
