use anyhow::{Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::domain::PairSide;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Bool(flag) => *flag,
            Scalar::Number(num) => num.as_f64().is_some_and(|n| n != 0.0),
            Scalar::Text(text) => !text.is_empty(),
        }
    }

    fn string_form(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(flag) => Some(flag.to_string()),
            Scalar::Number(num) => Some(num.to_string()),
            Scalar::Text(text) => Some(text.clone()),
        }
    }
}

/// A question/answer style row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pair {
    pub first: String,
    pub second: String,
}

impl Pair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.first.is_empty() && !self.second.is_empty()
    }

    pub fn side_mut(&mut self, side: PairSide) -> &mut String {
        match side {
            PairSide::First => &mut self.first,
            PairSide::Second => &mut self.second,
        }
    }

    fn from_value(value: &Value) -> Self {
        let side = |key: &str| {
            value
                .get(key)
                .map(|v| match v {
                    Value::String(text) => text.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .unwrap_or_default()
        };
        Self {
            first: side(PairSide::First.token()),
            second: side(PairSide::Second.token()),
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            PairSide::First.token().to_string(),
            Value::String(self.first.clone()),
        );
        map.insert(
            PairSide::Second.token().to_string(),
            Value::String(self.second.clone()),
        );
        Value::Object(map)
    }
}

/// The value stored under one entity attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityValue {
    Scalar(Scalar),
    List(Vec<EntityValue>),
    PairList(Vec<Pair>),
    Object(IndexMap<String, EntityValue>),
}

impl Default for EntityValue {
    fn default() -> Self {
        EntityValue::Scalar(Scalar::Null)
    }
}

impl EntityValue {
    pub fn text(value: impl Into<String>) -> Self {
        EntityValue::Scalar(Scalar::Text(value.into()))
    }

    pub fn bool(flag: bool) -> Self {
        EntityValue::Scalar(Scalar::Bool(flag))
    }

    pub fn empty_object() -> Self {
        EntityValue::Object(IndexMap::new())
    }

    /// Lists and objects are truthy even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            EntityValue::Scalar(scalar) => scalar.is_truthy(),
            EntityValue::List(_) | EntityValue::PairList(_) | EntityValue::Object(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntityValue::Scalar(Scalar::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// String rendering of a scalar; containers have none.
    pub fn string_form(&self) -> Option<String> {
        match self {
            EntityValue::Scalar(scalar) => scalar.string_form(),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&EntityValue> {
        match self {
            EntityValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn key_is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(EntityValue::is_truthy)
    }

    pub fn len(&self) -> usize {
        match self {
            EntityValue::Scalar(_) => 0,
            EntityValue::List(items) => items.len(),
            EntityValue::PairList(rows) => rows.len(),
            EntityValue::Object(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow as an object, replacing any other shape with an empty one.
    pub fn object_mut(&mut self) -> &mut IndexMap<String, EntityValue> {
        if !matches!(self, EntityValue::Object(_)) {
            *self = EntityValue::empty_object();
        }
        match self {
            EntityValue::Object(map) => map,
            _ => unreachable!("coerced to object above"),
        }
    }

    /// Borrow as a plain list. An object keyed by row index is converted in
    /// index order; any other shape is replaced with an empty list.
    pub fn list_mut(&mut self) -> &mut Vec<EntityValue> {
        let converted = match self {
            EntityValue::List(_) => None,
            EntityValue::Object(map) => Some(indexed_rows(map).cloned().collect()),
            _ => Some(Vec::new()),
        };
        if let Some(items) = converted {
            *self = EntityValue::List(items);
        }
        match self {
            EntityValue::List(items) => items,
            _ => unreachable!("coerced to list above"),
        }
    }

    /// Borrow as a pair list. A list of row objects (the serialized form), or
    /// an object of them keyed by row index, is converted; any other shape is
    /// replaced with an empty pair list.
    pub fn pair_list_mut(&mut self) -> &mut Vec<Pair> {
        let converted = match self {
            EntityValue::PairList(_) => None,
            EntityValue::List(items) => Some(
                items
                    .iter()
                    .map(|item| Pair::from_value(&Value::from(item)))
                    .collect(),
            ),
            EntityValue::Object(map) => Some(
                indexed_rows(map)
                    .map(|item| Pair::from_value(&Value::from(item)))
                    .collect(),
            ),
            _ => Some(Vec::new()),
        };
        if let Some(rows) = converted {
            *self = EntityValue::PairList(rows);
        }
        match self {
            EntityValue::PairList(rows) => rows,
            _ => unreachable!("coerced to pair list above"),
        }
    }
}

/// Values of an object whose keys are row indices, in index order. Keys
/// that are not indices are skipped.
fn indexed_rows(map: &IndexMap<String, EntityValue>) -> impl Iterator<Item = &EntityValue> {
    let mut rows = map
        .iter()
        .filter_map(|(key, value)| key.parse::<usize>().ok().map(|idx| (idx, value)))
        .collect::<Vec<_>>();
    rows.sort_by_key(|(idx, _)| *idx);
    rows.into_iter().map(|(_, value)| value)
}

impl From<Value> for EntityValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => EntityValue::Scalar(Scalar::Null),
            Value::Bool(flag) => EntityValue::Scalar(Scalar::Bool(flag)),
            Value::Number(num) => EntityValue::Scalar(Scalar::Number(num)),
            Value::String(text) => EntityValue::Scalar(Scalar::Text(text)),
            Value::Array(items) => {
                EntityValue::List(items.into_iter().map(EntityValue::from).collect())
            }
            Value::Object(map) => EntityValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, EntityValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&EntityValue> for Value {
    fn from(value: &EntityValue) -> Self {
        match value {
            EntityValue::Scalar(Scalar::Null) => Value::Null,
            EntityValue::Scalar(Scalar::Bool(flag)) => Value::Bool(*flag),
            EntityValue::Scalar(Scalar::Number(num)) => Value::Number(num.clone()),
            EntityValue::Scalar(Scalar::Text(text)) => Value::String(text.clone()),
            EntityValue::List(items) => Value::Array(items.iter().map(Value::from).collect()),
            EntityValue::PairList(rows) => Value::Array(rows.iter().map(Pair::to_value).collect()),
            EntityValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// The record being edited: attribute name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<String, Value>",
    into = "IndexMap<String, Value>"
)]
pub struct Entity {
    fields: IndexMap<String, EntityValue>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                fields: map
                    .into_iter()
                    .map(|(key, value)| (key, EntityValue::from(value)))
                    .collect(),
            }),
            Value::Null => Ok(Self::default()),
            other => bail!("entity must be an object, found {other}"),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), Value::from(value)))
                .collect(),
        )
    }

    /// Owner id handed to the upload collaborator.
    pub fn id(&self) -> Option<String> {
        self.fields.get("id").and_then(EntityValue::string_form)
    }

    pub fn get(&self, attribute: &str) -> Option<&EntityValue> {
        self.fields.get(attribute)
    }

    pub fn get_mut(&mut self, attribute: &str) -> Option<&mut EntityValue> {
        self.fields.get_mut(attribute)
    }

    pub fn is_truthy(&self, attribute: &str) -> bool {
        self.get(attribute).is_some_and(EntityValue::is_truthy)
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: EntityValue) {
        self.fields.insert(attribute.into(), value);
    }

    pub fn remove(&mut self, attribute: &str) -> Option<EntityValue> {
        self.fields.shift_remove(attribute)
    }

    /// Value under `attribute`, inserting `Null` first when absent.
    pub fn slot(&mut self, attribute: &str) -> &mut EntityValue {
        self.fields.entry(attribute.to_string()).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<IndexMap<String, Value>> for Entity {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self {
            fields: map
                .into_iter()
                .map(|(key, value)| (key, EntityValue::from(value)))
                .collect(),
        }
    }
}

impl From<Entity> for IndexMap<String, Value> {
    fn from(entity: Entity) -> Self {
        entity
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value)))
            .collect()
    }
}
