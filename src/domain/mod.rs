mod catalog;
mod kind;
mod parser;
mod path;

pub use catalog::{CatalogDocument, FieldCatalog, FieldDescriptor, FieldExtra};
pub use kind::{FieldKind, MAX_LENGTH_LIMITS, ValidationKind, ValidationKindError};
pub use parser::{catalog_schema, parse_catalog};
pub use path::{FieldPath, LIST_ITEM_MARKER, PAIR_ROW_MARKER, PairSide, PathError, PathTarget};
