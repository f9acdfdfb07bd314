use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::entity::EntityValue;

/// Largest file the form hands to an uploader, in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 10_090_000;

/// Field (or composite field) name to stored file path.
pub type UploadedFileMap = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredFileState {
    #[default]
    Uploaded,
    Deleted,
}

/// Reference to a file the storage backend holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub file_path: String,
    #[serde(default)]
    pub state: StoredFileState,
}

impl StoredFile {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            state: StoredFileState::Uploaded,
        }
    }

    pub fn deleted(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            state: StoredFileState::Deleted,
        }
    }

    pub fn to_entity_value(&self) -> EntityValue {
        let mut value = EntityValue::empty_object();
        let object = value.object_mut();
        object.insert("file_path".into(), EntityValue::text(self.file_path.clone()));
        let state = match self.state {
            StoredFileState::Uploaded => "uploaded",
            StoredFileState::Deleted => "deleted",
        };
        object.insert("state".into(), EntityValue::text(state));
        value
    }

    /// Whether an entity list entry describes a deleted file.
    pub fn entry_is_deleted(entry: &EntityValue) -> bool {
        entry
            .get("state")
            .and_then(EntityValue::as_text)
            .is_some_and(|state| state.eq_ignore_ascii_case("deleted"))
    }
}

/// A local file waiting to be handed to an [`Uploader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("failed to read file {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Storage backend the form uploads files through.
pub trait Uploader {
    fn upload(
        &self,
        owner_id: &str,
        field_name: &str,
        file: &UploadFile,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<StoredFile>;
}
