#![deny(rust_2018_idioms)]

pub mod domain;
pub mod form;
pub mod io;

pub use domain::{FieldCatalog, FieldDescriptor, FieldExtra, FieldKind, ValidationKind};
pub use form::{EditForm, Entity, EntityValue, FormState, RawInputSet, SubmitError};
pub use io::{
    DirectoryUploader, DocumentFormat, OutputDestination, OutputOptions, catalog_from_entity,
    emit_entity, parse_document_str,
};

pub mod prelude {
    pub use super::domain::{FieldCatalog, FieldDescriptor, FieldKind, ValidationKind, parse_catalog};
    pub use super::form::{
        EditForm, Entity, EntityValue, Navigator, Notice, Notifier, RawInputSet, StoredFile,
        SubmitError, UploadFile, Uploader,
    };
    pub use super::io::{DirectoryUploader, DocumentFormat, OutputDestination, OutputOptions};
}

#[cfg(test)]
mod tests;
