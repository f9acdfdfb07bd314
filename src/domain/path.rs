//! Grammar of rendered input names.
//!
//! ```text
//! name       := attribute
//!             | attribute "_" key
//!             | attribute "_" "listfieldidx_" index "_" side
//!             | attribute "_" "listfieldsingleidx_" index
//! side       := "0" | "1"
//! ```
//!
//! `attribute` is resolved against the catalog: either the whole name is an
//! attribute, or the text before the first `_` is.

use std::fmt;

pub const PAIR_ROW_MARKER: &str = "listfieldidx_";
pub const LIST_ITEM_MARKER: &str = "listfieldsingleidx_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    First,
    Second,
}

impl PairSide {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "0" => Some(PairSide::First),
            "1" => Some(PairSide::Second),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            PairSide::First => "0",
            PairSide::Second => "1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTarget<'a> {
    /// The attribute itself.
    Whole,
    /// A key of the nested object stored under the attribute.
    Key(&'a str),
    /// One side of a row in a pair list.
    PairCell { index: usize, side: PairSide },
    /// One entry of a plain list.
    ListItem { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath<'a> {
    pub attribute: &'a str,
    pub target: PathTarget<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("'{0}' does not name a catalog attribute")]
    UnknownAttribute(String),
    #[error("'{0}' has a malformed list index")]
    MalformedIndex(String),
    #[error("'{0}' addresses a pair side other than 0 or 1")]
    UnsupportedSide(String),
    #[error("'{0}' has an empty sub-key")]
    EmptyKey(String),
}

impl<'a> FieldPath<'a> {
    pub fn whole(attribute: &'a str) -> Self {
        Self {
            attribute,
            target: PathTarget::Whole,
        }
    }

    pub fn parse(name: &'a str, is_attribute: impl Fn(&str) -> bool) -> Result<Self, PathError> {
        if is_attribute(name) {
            return Ok(Self::whole(name));
        }
        let unknown = || PathError::UnknownAttribute(name.to_string());
        let (attribute, rest) = name.split_once('_').ok_or_else(unknown)?;
        if !is_attribute(attribute) {
            return Err(unknown());
        }

        let target = if let Some((_, tail)) = rest.split_once(PAIR_ROW_MARKER) {
            let (index, side) = tail
                .split_once('_')
                .ok_or_else(|| PathError::MalformedIndex(name.to_string()))?;
            PathTarget::PairCell {
                index: parse_index(index, name)?,
                side: PairSide::from_token(side)
                    .ok_or_else(|| PathError::UnsupportedSide(name.to_string()))?,
            }
        } else if let Some((_, tail)) = rest.split_once(LIST_ITEM_MARKER) {
            let index = tail.split('_').next().unwrap_or_default();
            PathTarget::ListItem {
                index: parse_index(index, name)?,
            }
        } else if rest.is_empty() {
            return Err(PathError::EmptyKey(name.to_string()));
        } else {
            PathTarget::Key(rest)
        };

        Ok(Self { attribute, target })
    }

    /// Renders the input name a rendering layer should give this path.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn list_index(&self) -> Option<usize> {
        match self.target {
            PathTarget::PairCell { index, .. } | PathTarget::ListItem { index } => Some(index),
            PathTarget::Whole | PathTarget::Key(_) => None,
        }
    }
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            PathTarget::Whole => write!(f, "{}", self.attribute),
            PathTarget::Key(key) => write!(f, "{}_{key}", self.attribute),
            PathTarget::PairCell { index, side } => write!(
                f,
                "{}_{PAIR_ROW_MARKER}{index}_{}",
                self.attribute,
                side.token()
            ),
            PathTarget::ListItem { index } => {
                write!(f, "{}_{LIST_ITEM_MARKER}{index}", self.attribute)
            }
        }
    }
}

fn parse_index(raw: &str, name: &str) -> Result<usize, PathError> {
    raw.parse::<usize>()
        .map_err(|_| PathError::MalformedIndex(name.to_string()))
}
