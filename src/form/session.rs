use anyhow::{Result, bail};
use tracing::{info, trace, warn};

use crate::domain::FieldCatalog;

use super::entity::Entity;
use super::error::SubmitError;
use super::notify::{Notice, Notifier, TracingNotifier};
use super::raw::RawInputSet;
use super::reconcile::reconcile;
use super::state::FormState;
use super::upload::{MAX_UPLOAD_BYTES, StoredFile, UploadFile, Uploader};

pub const SUBMIT_SUCCESS: &str = "Successfully submitted!";

/// Leaves the form without submitting.
pub trait Navigator {
    fn back(&mut self);
}

/// One mounted edit form: the catalog, the working entity, the per-field UI
/// state and the notice channel.
#[derive(Debug)]
pub struct EditForm<N: Notifier = TracingNotifier> {
    catalog: FieldCatalog,
    state: FormState,
    entity: Entity,
    notifier: N,
}

impl EditForm<TracingNotifier> {
    pub fn new(catalog: FieldCatalog, entity: Entity) -> Self {
        Self::with_notifier(catalog, entity, TracingNotifier)
    }
}

impl<N: Notifier> EditForm<N> {
    pub fn with_notifier(catalog: FieldCatalog, entity: Entity, notifier: N) -> Self {
        let state = FormState::from_catalog(&catalog, &entity);
        Self {
            catalog,
            state,
            entity,
            notifier,
        }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Swap in a new entity (the caller reloaded it) and reseed field state.
    pub fn reset_entity(&mut self, entity: Entity) {
        self.state = FormState::from_catalog(&self.catalog, &entity);
        self.entity = entity;
    }

    pub fn add_row(&mut self, attribute: &str) -> usize {
        match self.list_position(attribute) {
            Some(index) => self.state.add_row(index),
            None => 0,
        }
    }

    pub fn remove_row(&mut self, attribute: &str) -> usize {
        match self.list_position(attribute) {
            Some(index) => self.state.remove_row(index),
            None => 0,
        }
    }

    pub fn toggle_checkbox(&mut self, attribute: &str, checked: bool) {
        if let Some(index) = self.catalog.position(attribute) {
            self.state.set_checked(index, checked);
        }
    }

    pub fn select_radio(&mut self, attribute: &str, option: impl Into<String>) {
        if let Some(index) = self.catalog.position(attribute) {
            self.state.select_radio(index, option);
        }
    }

    pub fn attach_files(&mut self, attribute: &str, files: Vec<StoredFile>) {
        if let Some(index) = self.catalog.position(attribute) {
            self.state.attach_files(index, files);
        }
    }

    pub fn record_text(&mut self, attribute: &str, text: &str) -> usize {
        match self.catalog.position(attribute) {
            Some(index) => self.state.record_text(index, text),
            None => 0,
        }
    }

    /// Whether a text area's live count exceeds its configured counter.
    pub fn over_character_limit(&self, attribute: &str) -> bool {
        let Some(index) = self.catalog.position(attribute) else {
            return false;
        };
        self.catalog.fields()[index]
            .extra
            .character_count
            .is_some_and(|limit| self.state.character_count(index) > limit)
    }

    /// Hand a file to the storage backend and remember where it landed under
    /// `field_name` (an attribute or a composite name like
    /// `gallery_profile_photo_url`).
    pub fn upload(
        &mut self,
        field_name: &str,
        file: &UploadFile,
        uploader: &dyn Uploader,
    ) -> Result<StoredFile> {
        if file.size() > MAX_UPLOAD_BYTES {
            self.notifier
                .notify(Notice::Error("Please upload file under 10MB.".to_string()));
            bail!(
                "{} is {} bytes, over the {MAX_UPLOAD_BYTES} byte limit",
                file.name,
                file.size()
            );
        }
        let owner = self.entity.id().unwrap_or_default();
        let mut on_progress = |fraction: f32| trace!(%field_name, fraction, "upload progress");
        match uploader.upload(&owner, field_name, file, &mut on_progress) {
            Ok(stored) => {
                self.state
                    .record_upload(field_name, stored.file_path.clone());
                Ok(stored)
            }
            Err(err) => {
                self.notifier
                    .notify(Notice::Error(format!("Upload failed for {field_name}.")));
                Err(err.context(format!("failed to upload {}", file.name)))
            }
        }
    }

    /// Reconcile `inputs` into the working entity. On success `on_success`
    /// runs once with the result; a failing callback is logged and does not
    /// fail the submission.
    pub fn submit<F>(&mut self, inputs: &RawInputSet, on_success: F) -> Result<Entity, SubmitError>
    where
        F: FnOnce(&Entity) -> Result<()>,
    {
        if let Err(err) = reconcile(&self.catalog, inputs, &self.state, &mut self.entity) {
            self.notifier.notify(Notice::Error(err.to_string()));
            return Err(err);
        }
        info!(fields = self.entity.len(), "form submitted");
        match on_success(&self.entity) {
            Ok(()) => self
                .notifier
                .notify(Notice::Success(SUBMIT_SUCCESS.to_string())),
            Err(err) => warn!(error = %format!("{err:#}"), "submit callback failed"),
        }
        Ok(self.entity.clone())
    }

    pub fn cancel(&self, navigator: &mut dyn Navigator) {
        navigator.back();
    }

    /// List attributes with their visible row counts.
    pub fn list_sizes(&self) -> Vec<(&str, usize)> {
        self.catalog
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.kind.is_list())
            .map(|(index, field)| (field.attribute.as_str(), self.state.visible_len(index)))
            .collect()
    }

    fn list_position(&self, attribute: &str) -> Option<usize> {
        self.catalog
            .position(attribute)
            .filter(|index| self.catalog.fields()[*index].kind.is_list())
    }
}
