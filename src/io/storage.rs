use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::form::{StoredFile, UploadFile, Uploader};

const UNOWNED: &str = "unowned";

/// Stores uploads under `<root>/<owner>/<field>/<name>` and reports the
/// path relative to `root` as the stored file path.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    root: PathBuf,
}

impl DirectoryUploader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Uploader for DirectoryUploader {
    fn upload(
        &self,
        owner_id: &str,
        field_name: &str,
        file: &UploadFile,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<StoredFile> {
        let owner = if owner_id.is_empty() { UNOWNED } else { owner_id };
        let relative = PathBuf::from(single_segment(owner, "owner id")?)
            .join(single_segment(field_name, "field name")?)
            .join(single_segment(&file.name, "file name")?);
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        on_progress(0.0);
        fs::write(&target, &file.bytes)
            .with_context(|| format!("failed to write {}", target.display()))?;
        on_progress(1.0);
        debug!(path = %target.display(), bytes = file.size(), "stored upload");

        let stored = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Ok(StoredFile::new(stored))
    }
}

/// Reject anything that would escape its directory level.
fn single_segment<'a>(raw: &'a str, label: &str) -> Result<&'a str> {
    let mut components = Path::new(raw).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(raw),
        _ => bail!("{label} '{raw}' is not a plain path segment"),
    }
}
