use tracing::debug;

use crate::domain::{FieldCatalog, FieldDescriptor, FieldKind, FieldPath, PathTarget};

use super::entity::{Entity, EntityValue, Pair};
use super::error::SubmitError;
use super::raw::RawInputSet;
use super::state::FormState;
use super::upload::{StoredFile, StoredFileState};
use super::validate::check_value;

pub const ARTICLE_TITLE: &str = "title";
pub const ARTICLE_CONTENT: &str = "content";
pub const ARTICLE_IMAGE_URL: &str = "image_url";
pub const ARTICLE_SUBTITLE: &str = "subtitle";
pub const ARTICLE_BUTTON_LINK: &str = "button_link";

pub const GALLERY_TITLE: &str = "title";
pub const GALLERY_IMAGE_URLS: &str = "image_urls";
pub const GALLERY_HANDLE: &str = "handle";
pub const GALLERY_URL: &str = "url";
pub const GALLERY_PROFILE_PHOTO_URL: &str = "profile_photo_url";

const ARTICLE_FIELDS: [&str; 5] = [
    ARTICLE_TITLE,
    ARTICLE_CONTENT,
    ARTICLE_IMAGE_URL,
    ARTICLE_SUBTITLE,
    ARTICLE_BUTTON_LINK,
];
const ARTICLE_MANDATORY: [&str; 3] = [ARTICLE_TITLE, ARTICLE_CONTENT, ARTICLE_IMAGE_URL];
const GALLERY_SOCIAL_FIELDS: [&str; 3] = [GALLERY_HANDLE, GALLERY_URL, GALLERY_PROFILE_PHOTO_URL];
const GALLERY_REQUIRED: usize = 2;
const GALLERY_SOCIAL_REQUIRED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeMode {
    Input,
    Upload,
}

/// Merge raw inputs, uploads and attached files into `entity`, then
/// normalize and validate each descriptor in catalog order.
///
/// Stops at the first failing descriptor. Whatever was merged before the
/// failure stays in `entity`.
pub fn reconcile(
    catalog: &FieldCatalog,
    inputs: &RawInputSet,
    state: &FormState,
    entity: &mut Entity,
) -> Result<(), SubmitError> {
    for input in inputs.iter().filter(|input| input.counts()) {
        merge(
            catalog,
            state,
            entity,
            &input.name,
            &input.value,
            MergeMode::Input,
        );
    }
    apply_radio_picks(catalog, inputs, state, entity);
    for (name, path) in state.uploads() {
        merge(catalog, state, entity, name, path, MergeMode::Upload);
    }
    attach_files(catalog, state, entity);

    for (index, field) in catalog.fields().iter().enumerate() {
        settle_field(index, field, state, entity)?;
    }
    Ok(())
}

fn merge(
    catalog: &FieldCatalog,
    state: &FormState,
    entity: &mut Entity,
    name: &str,
    value: &str,
    mode: MergeMode,
) {
    let path = match FieldPath::parse(name, |candidate| catalog.contains(candidate)) {
        Ok(path) => path,
        Err(err) => {
            debug!(%name, %err, "ignoring input");
            return;
        }
    };
    if let Some(index) = path.list_index() {
        let visible = catalog
            .position(path.attribute)
            .map_or(0, |position| state.visible_len(position));
        if index >= visible {
            debug!(%name, index, visible, "ignoring row outside the visible list");
            return;
        }
    }

    let slot = entity.slot(path.attribute);
    match path.target {
        PathTarget::Whole => *slot = EntityValue::text(value),
        PathTarget::Key(key) => {
            let stored = match mode {
                MergeMode::Input if splits_into_lines(key, value) => EntityValue::List(
                    value
                        .split('\n')
                        .map(|line| line.strip_suffix('\r').unwrap_or(line))
                        .filter(|line| !line.is_empty())
                        .map(EntityValue::text)
                        .collect(),
                ),
                _ => EntityValue::text(value),
            };
            slot.object_mut().insert(key.to_string(), stored);
        }
        PathTarget::PairCell { index, side } => {
            let rows = slot.pair_list_mut();
            if rows.len() <= index {
                rows.resize_with(index + 1, Pair::default);
            }
            *rows[index].side_mut(side) = value.to_string();
        }
        PathTarget::ListItem { index } => {
            let items = slot.list_mut();
            if items.len() <= index {
                items.resize_with(index + 1, EntityValue::default);
            }
            items[index] = EntityValue::text(value);
        }
    }
}

fn splits_into_lines(key: &str, value: &str) -> bool {
    value.contains('\n') || (key == ARTICLE_CONTENT && !value.is_empty())
}

/// The picked option is the checked radio. A checked radio input in the
/// submission takes precedence; a pick outside the declared options checks
/// nothing.
fn apply_radio_picks(
    catalog: &FieldCatalog,
    inputs: &RawInputSet,
    state: &FormState,
    entity: &mut Entity,
) {
    for (index, field) in catalog.fields().iter().enumerate() {
        if field.kind != FieldKind::Radio {
            continue;
        }
        let Some(pick) = state.radio(index) else {
            continue;
        };
        let submitted = inputs
            .iter()
            .any(|input| input.counts() && input.name == field.attribute);
        let options = &field.extra.options;
        if submitted || (!options.is_empty() && !options.iter().any(|option| option == pick)) {
            continue;
        }
        entity.insert(&field.attribute, EntityValue::text(pick));
    }
}

fn attach_files(catalog: &FieldCatalog, state: &FormState, entity: &mut Entity) {
    for (index, field) in catalog.fields().iter().enumerate() {
        let Some(files) = state.files(index) else {
            continue;
        };
        let listed = || EntityValue::List(files.iter().map(StoredFile::to_entity_value).collect());
        match field.kind {
            FieldKind::FileMultiple => entity.insert(field.attribute.clone(), listed()),
            FieldKind::FileSingle | FieldKind::ProfilePhoto => {
                let current = files
                    .iter()
                    .find(|file| file.state != StoredFileState::Deleted)
                    .map_or_else(EntityValue::default, |file| {
                        EntityValue::text(file.file_path.clone())
                    });
                entity.insert(field.attribute.clone(), current);
            }
            FieldKind::Gallery => {
                entity
                    .slot(&field.attribute)
                    .object_mut()
                    .insert(GALLERY_IMAGE_URLS.to_string(), listed());
            }
            _ => debug!(attribute = %field.attribute, "files attached to a non-file field"),
        }
    }
}

fn settle_field(
    index: usize,
    field: &FieldDescriptor,
    state: &FormState,
    entity: &mut Entity,
) -> Result<(), SubmitError> {
    let attribute = field.attribute.as_str();

    if field.required && !entity.is_truthy(attribute) {
        return Err(SubmitError::MissingRequiredField {
            field: field.display_name.clone(),
        });
    }

    match field.kind {
        FieldKind::Checkbox => {
            entity.insert(attribute, EntityValue::bool(state.is_checked(index)));
        }
        FieldKind::RichArticle => settle_article(field, entity)?,
        FieldKind::TextList | FieldKind::PairList => {
            truncate_rows(field.kind, state.visible_len(index), entity.get_mut(attribute));
        }
        _ => {}
    }

    for validation in &field.validations {
        check_value(entity.get(attribute), &field.display_name, *validation)?;
    }

    if field.kind == FieldKind::Gallery {
        check_gallery(field, entity.get(attribute))?;
    }
    Ok(())
}

fn settle_article(field: &FieldDescriptor, entity: &mut Entity) -> Result<(), SubmitError> {
    let article = entity.get(&field.attribute);
    let filled = filled_among(article, &ARTICLE_FIELDS);
    let mandatory = filled_among(article, &ARTICLE_MANDATORY);
    if filled > 0 && mandatory < ARTICLE_MANDATORY.len() {
        return Err(SubmitError::IncompleteArticle {
            field: field.display_name.clone(),
        });
    }
    if filled_among(article, &[ARTICLE_TITLE, ARTICLE_CONTENT]) == 0 {
        entity.insert(field.attribute.clone(), EntityValue::empty_object());
    }
    Ok(())
}

fn filled_among(value: Option<&EntityValue>, keys: &[&str]) -> usize {
    keys.iter()
        .filter(|&&key| value.is_some_and(|value| value.key_is_truthy(key)))
        .count()
}

fn truncate_rows(kind: FieldKind, visible: usize, value: Option<&mut EntityValue>) {
    let Some(value) = value else {
        return;
    };
    if kind == FieldKind::PairList {
        let rows = value.pair_list_mut();
        rows.truncate(visible);
        rows.retain(Pair::is_complete);
    } else {
        value.list_mut().truncate(visible);
    }
}

fn check_gallery(field: &FieldDescriptor, gallery: Option<&EntityValue>) -> Result<(), SubmitError> {
    let photos = match gallery.and_then(|gallery| gallery.get(GALLERY_IMAGE_URLS)) {
        Some(EntityValue::List(entries)) => entries
            .iter()
            .filter(|entry| !StoredFile::entry_is_deleted(entry))
            .count(),
        _ => 0,
    };
    if let Some(max) = field.extra.max_photos.filter(|max| *max > 0)
        && photos > max
    {
        return Err(SubmitError::TooManyPhotos {
            field: field.display_name.clone(),
            max,
        });
    }

    let social = field.extra.social_profile;
    let mut filled = filled_among(gallery, &[GALLERY_TITLE]) + usize::from(photos > 0);
    if social {
        filled += filled_among(gallery, &GALLERY_SOCIAL_FIELDS);
    }
    let required = if social {
        GALLERY_SOCIAL_REQUIRED
    } else {
        GALLERY_REQUIRED
    };
    if filled > 0 && filled < required {
        return Err(SubmitError::IncompleteShowcase {
            field: field.display_name.clone(),
            social_profile: social,
        });
    }
    Ok(())
}
