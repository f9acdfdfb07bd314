use anyhow::anyhow;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::form_with;
use crate::domain::{FieldCatalog, FieldDescriptor, FieldExtra, FieldKind};
use crate::form::{
    EditForm, MAX_UPLOAD_BYTES, MemoryNotifier, Navigator, Notice, RawInputSet, SUBMIT_SUCCESS,
    UploadFile,
};
use crate::io::DirectoryUploader;

fn profile_catalog() -> FieldCatalog {
    FieldCatalog::new(vec![
        FieldDescriptor::new("name", "Name", FieldKind::Text),
        FieldDescriptor::new("bio", "Bio", FieldKind::MultilineText).with_extra(FieldExtra {
            character_count: Some(10),
            ..FieldExtra::default()
        }),
        FieldDescriptor::new("avatar", "Avatar", FieldKind::ProfilePhoto),
        FieldDescriptor::new("links", "Links", FieldKind::TextList),
    ])
    .unwrap()
}

#[derive(Default)]
struct RecordingNavigator {
    backs: usize,
}

impl Navigator for RecordingNavigator {
    fn back(&mut self) {
        self.backs += 1;
    }
}

#[test]
fn success_runs_the_callback_once_and_notifies() {
    let mut form = form_with(profile_catalog(), json!({"id": "u1"}));
    let mut seen = Vec::new();
    form.submit(&RawInputSet::new().with("name", "Ada"), |entity| {
        seen.push(entity.to_value());
        Ok(())
    })
    .unwrap();

    assert_eq!(seen, vec![json!({"id": "u1", "name": "Ada"})]);
    assert_eq!(
        form.notifier().take(),
        vec![Notice::Success(SUBMIT_SUCCESS.into())]
    );
}

#[test]
fn failing_callback_is_swallowed_without_a_success_notice() {
    let mut form = form_with(profile_catalog(), json!({}));
    let entity = form
        .submit(&RawInputSet::new().with("name", "Ada"), |_| {
            Err(anyhow!("backend unavailable"))
        })
        .unwrap();

    assert_eq!(entity.to_value(), json!({"name": "Ada"}));
    assert!(form.notifier().take().is_empty());
}

#[test]
fn uploads_land_in_the_entity_on_submit() {
    let dir = tempfile::tempdir().unwrap();
    let uploader = DirectoryUploader::new(dir.path());
    let mut form = form_with(profile_catalog(), json!({"id": "u1"}));

    let stored = form
        .upload(
            "avatar",
            &UploadFile::new("me.png", b"png".to_vec()),
            &uploader,
        )
        .unwrap();
    assert_eq!(stored.file_path, "u1/avatar/me.png");
    assert!(dir.path().join("u1/avatar/me.png").exists());

    let entity = form.submit(&RawInputSet::new(), |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"id": "u1", "avatar": "u1/avatar/me.png"}));
}

#[test]
fn oversized_uploads_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let uploader = DirectoryUploader::new(dir.path());
    let mut form = form_with(profile_catalog(), json!({"id": "u1"}));
    let file = UploadFile::new("huge.bin", vec![0; MAX_UPLOAD_BYTES as usize + 1]);

    assert!(form.upload("avatar", &file, &uploader).is_err());
    assert_eq!(
        form.notifier().take(),
        vec![Notice::Error("Please upload file under 10MB.".into())]
    );
    assert!(form.state().uploads().is_empty());
}

#[test]
fn a_borrowed_notifier_outlives_the_form() {
    let notifier = MemoryNotifier::default();
    {
        let entity = crate::form::Entity::from_value(json!({})).unwrap();
        let mut form = EditForm::with_notifier(profile_catalog(), entity, &notifier);
        form.submit(&RawInputSet::new().with("name", "Ada"), |_| Ok(()))
            .unwrap();
    }
    assert_eq!(notifier.last(), Some(Notice::Success(SUBMIT_SUCCESS.into())));
}

#[test]
fn cancel_goes_back() {
    let form = form_with(profile_catalog(), json!({}));
    let mut navigator = RecordingNavigator::default();
    form.cancel(&mut navigator);
    assert_eq!(navigator.backs, 1);
}

#[test]
fn character_counter_tracks_the_text_area() {
    let mut form = form_with(profile_catalog(), json!({"bio": "short"}));
    assert!(!form.over_character_limit("bio"));
    assert_eq!(form.record_text("bio", "much longer text"), 16);
    assert!(form.over_character_limit("bio"));
    assert!(!form.over_character_limit("name"));
}

#[test]
fn rows_only_change_for_list_fields() {
    let mut form = form_with(profile_catalog(), json!({"links": ["a"]}));
    assert_eq!(form.list_sizes(), vec![("links", 1)]);
    assert_eq!(form.add_row("links"), 2);
    assert_eq!(form.add_row("name"), 0);
    assert_eq!(form.remove_row("links"), 1);
    assert_eq!(form.remove_row("links"), 1);
}

#[test]
fn reset_entity_reseeds_field_state() {
    let mut form = form_with(profile_catalog(), json!({"links": ["a"]}));
    form.add_row("links");
    form.reset_entity(crate::form::Entity::from_value(json!({"links": ["x", "y", "z"]})).unwrap());
    assert_eq!(form.list_sizes(), vec![("links", 3)]);
    assert_eq!(form.catalog().button_text(), "Save");
}
