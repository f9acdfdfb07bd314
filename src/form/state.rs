use crate::domain::{FieldCatalog, FieldKind};

use super::entity::{Entity, EntityValue};
use super::upload::{StoredFile, UploadedFileMap};

/// Most rows the Add button will show for a list field.
pub const MAX_VISIBLE_ROWS: usize = 10;
/// Remove never hides the last row.
pub const MIN_VISIBLE_ROWS: usize = 1;

/// UI-side state of one descriptor, kept next to (not inside) the entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    /// Rows currently shown for list kinds.
    pub visible_len: usize,
    /// Option currently picked for radio kinds.
    pub radio: Option<String>,
    /// Last observed toggle; unchecked boxes submit nothing.
    pub checked: bool,
    /// File list attached by a file picker, if it was touched.
    pub files: Option<Vec<StoredFile>>,
    pub character_count: usize,
}

/// Per-form state: one record per descriptor index plus the uploaded-file
/// map. Lives as long as the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    fields: Vec<FieldState>,
    uploads: UploadedFileMap,
}

impl FormState {
    /// Seed list sizes and radio picks from the entity being edited.
    pub fn from_catalog(catalog: &FieldCatalog, entity: &Entity) -> Self {
        let fields = catalog
            .fields()
            .iter()
            .map(|field| {
                let current = entity.get(&field.attribute);
                let mut state = FieldState::default();
                match field.kind {
                    FieldKind::TextList | FieldKind::PairList => {
                        state.visible_len = current.map_or(0, EntityValue::len);
                    }
                    FieldKind::Radio => {
                        state.radio = current.and_then(EntityValue::string_form);
                    }
                    FieldKind::MultilineText => {
                        state.character_count = current
                            .and_then(EntityValue::as_text)
                            .map_or(0, |text| text.chars().count());
                    }
                    _ => {}
                }
                state
            })
            .collect();
        Self {
            fields,
            uploads: UploadedFileMap::new(),
        }
    }

    pub fn field(&self, index: usize) -> Option<&FieldState> {
        self.fields.get(index)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut FieldState> {
        self.fields.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn visible_len(&self, index: usize) -> usize {
        self.field(index).map_or(0, |field| field.visible_len)
    }

    pub fn set_visible_len(&mut self, index: usize, len: usize) {
        if let Some(field) = self.field_mut(index) {
            field.visible_len = len;
        }
    }

    /// Show one more row, capped at [`MAX_VISIBLE_ROWS`]. A list seeded
    /// with more rows than the cap is clamped down by the first Add.
    pub fn add_row(&mut self, index: usize) -> usize {
        let Some(field) = self.field_mut(index) else {
            return 0;
        };
        field.visible_len = MAX_VISIBLE_ROWS.min(field.visible_len + 1);
        field.visible_len
    }

    /// Hide the last row, keeping at least [`MIN_VISIBLE_ROWS`].
    pub fn remove_row(&mut self, index: usize) -> usize {
        let Some(field) = self.field_mut(index) else {
            return 0;
        };
        field.visible_len = MIN_VISIBLE_ROWS.max(field.visible_len.saturating_sub(1));
        field.visible_len
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.field(index).is_some_and(|field| field.checked)
    }

    pub fn set_checked(&mut self, index: usize, checked: bool) {
        if let Some(field) = self.field_mut(index) {
            field.checked = checked;
        }
    }

    pub fn radio(&self, index: usize) -> Option<&str> {
        self.field(index).and_then(|field| field.radio.as_deref())
    }

    pub fn select_radio(&mut self, index: usize, option: impl Into<String>) {
        if let Some(field) = self.field_mut(index) {
            field.radio = Some(option.into());
        }
    }

    pub fn attach_files(&mut self, index: usize, files: Vec<StoredFile>) {
        if let Some(field) = self.field_mut(index) {
            field.files = Some(files);
        }
    }

    pub fn files(&self, index: usize) -> Option<&[StoredFile]> {
        self.field(index).and_then(|field| field.files.as_deref())
    }

    /// Track the live character count of a text area; returns the count.
    pub fn record_text(&mut self, index: usize, text: &str) -> usize {
        let count = text.chars().count();
        if let Some(field) = self.field_mut(index) {
            field.character_count = count;
        }
        count
    }

    pub fn character_count(&self, index: usize) -> usize {
        self.field(index).map_or(0, |field| field.character_count)
    }

    pub fn record_upload(&mut self, field_name: impl Into<String>, path: impl Into<String>) {
        self.uploads.insert(field_name.into(), path.into());
    }

    pub fn uploads(&self) -> &UploadedFileMap {
        &self.uploads
    }

    pub fn clear_uploads(&mut self) {
        self.uploads.clear();
    }
}
