mod format;
mod input;
mod output;
mod storage;

pub use format::DocumentFormat;
pub use input::{
    catalog_from_entity, catalog_from_str, entity_from_str, parse_document_str,
    raw_inputs_from_str, uploads_from_value,
};
pub use output::{OutputDestination, OutputOptions, emit_entity, render_entity};
pub use storage::DirectoryUploader;
