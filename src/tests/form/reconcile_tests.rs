use pretty_assertions::assert_eq;
use serde_json::json;

use super::form_with;
use crate::domain::{FieldCatalog, FieldDescriptor, FieldExtra, FieldKind, ValidationKind};
use crate::form::{FormatIssue, Notice, RawInputSet, StoredFile, SubmitError};

fn catalog(fields: Vec<FieldDescriptor>) -> FieldCatalog {
    FieldCatalog::new(fields).unwrap()
}

fn gallery(max_photos: usize) -> FieldDescriptor {
    FieldDescriptor::new("showcase", "Showcase", FieldKind::Gallery).with_extra(FieldExtra {
        max_photos: Some(max_photos),
        ..FieldExtra::default()
    })
}

fn photos(count: usize) -> Vec<StoredFile> {
    (0..count)
        .map(|idx| StoredFile::new(format!("u1/showcase/{idx}.png")))
        .collect()
}

#[test]
fn text_values_are_stored_verbatim() {
    let mut form = form_with(
        catalog(vec![
            FieldDescriptor::new("name", "Name", FieldKind::Text)
                .with_validation(ValidationKind::MaxLength(50)),
            FieldDescriptor::new("bio", "Bio", FieldKind::MultilineText),
        ]),
        json!({"id": "u1"}),
    );
    let inputs = RawInputSet::new()
        .with("name", "Ada Lovelace")
        .with("bio", "line one\nline two");

    let entity = form.submit(&inputs, |_| Ok(())).unwrap();
    assert_eq!(
        entity.to_value(),
        json!({"id": "u1", "name": "Ada Lovelace", "bio": "line one\nline two"})
    );
}

#[test]
fn missing_required_field_stops_before_the_callback() {
    let mut form = form_with(
        catalog(vec![
            FieldDescriptor::new("title", "Title", FieldKind::Text).required(),
        ]),
        json!({}),
    );
    let mut called = false;
    let err = form
        .submit(&RawInputSet::new().with("title", ""), |_| {
            called = true;
            Ok(())
        })
        .unwrap_err();

    assert_eq!(
        err,
        SubmitError::MissingRequiredField {
            field: "Title".into()
        }
    );
    assert!(!called);
    assert_eq!(
        form.notifier().take(),
        vec![Notice::Error("Field is required: \"Title\"".into())]
    );
}

#[test]
fn text_list_keeps_only_visible_rows() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new(
            "badges",
            "Badges",
            FieldKind::TextList,
        )]),
        json!({}),
    );
    for _ in 0..3 {
        form.add_row("badges");
    }
    let inputs: RawInputSet = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .enumerate()
        .map(|(idx, value)| (format!("badges_listfieldsingleidx_{idx}"), *value))
        .collect();

    let entity = form.submit(&inputs, |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"badges": ["a", "b", "c"]}));
}

#[test]
fn removed_rows_are_truncated_from_existing_lists() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new(
            "badges",
            "Badges",
            FieldKind::TextList,
        )]),
        json!({"badges": ["a", "b", "c", "d", "e"]}),
    );
    form.remove_row("badges");
    form.remove_row("badges");

    let entity = form.submit(&RawInputSet::new(), |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"badges": ["a", "b", "c"]}));
}

#[test]
fn pair_rows_with_an_empty_side_are_dropped() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new("faq", "FAQ", FieldKind::PairList)]),
        json!({}),
    );
    for _ in 0..3 {
        form.add_row("faq");
    }
    let inputs = RawInputSet::new()
        .with("faq_listfieldidx_0_0", "Q1")
        .with("faq_listfieldidx_0_1", "A1")
        .with("faq_listfieldidx_1_0", "Q2")
        .with("faq_listfieldidx_2_1", "A3");

    let entity = form.submit(&inputs, |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"faq": [{"0": "Q1", "1": "A1"}]}));
}

#[test]
fn price_and_number_rules_run_on_submit() {
    let fields = || {
        catalog(vec![
            FieldDescriptor::new("price", "Price", FieldKind::Text)
                .with_validation(ValidationKind::Price),
            FieldDescriptor::new("stock", "Stock", FieldKind::Text)
                .with_validation(ValidationKind::Number),
        ])
    };
    let submit = |price: &str, stock: &str| {
        let mut form = form_with(fields(), json!({}));
        let inputs = RawInputSet::new().with("price", price).with("stock", stock);
        form.submit(&inputs, |_| Ok(())).map(|_| ())
    };

    assert!(submit("12.34", "999").is_ok());
    assert_eq!(
        submit("12.345", "1"),
        Err(SubmitError::FormatInvalid {
            field: "Price".into(),
            reason: FormatIssue::PriceShape
        })
    );
    assert_eq!(
        submit("1", "1000"),
        Err(SubmitError::FormatInvalid {
            field: "Stock".into(),
            reason: FormatIssue::NumberRange
        })
    );
    assert!(submit("1", "abc").is_err());
}

#[test]
fn gallery_over_its_photo_cap_is_rejected() {
    let mut form = form_with(catalog(vec![gallery(6)]), json!({}));
    form.attach_files("showcase", photos(7));
    let mut called = false;
    let err = form
        .submit(&RawInputSet::new().with("showcase_title", "Work"), |_| {
            called = true;
            Ok(())
        })
        .unwrap_err();

    assert_eq!(
        err,
        SubmitError::TooManyPhotos {
            field: "Showcase".into(),
            max: 6
        }
    );
    assert!(!called);
}

#[test]
fn gallery_at_its_photo_cap_passes() {
    let mut form = form_with(catalog(vec![gallery(6)]), json!({}));
    let mut files = photos(6);
    files.push(StoredFile::deleted("u1/showcase/old.png"));
    form.attach_files("showcase", files);

    let entity = form
        .submit(&RawInputSet::new().with("showcase_title", "Work"), |_| Ok(()))
        .unwrap();
    let urls = &entity.to_value()["showcase"]["image_urls"];
    assert_eq!(urls.as_array().map(Vec::len), Some(7));
    assert_eq!(urls[6], json!({"file_path": "u1/showcase/old.png", "state": "deleted"}));
}

#[test]
fn gallery_needs_title_and_images_together() {
    let mut form = form_with(catalog(vec![gallery(6)]), json!({}));
    let err = form
        .submit(&RawInputSet::new().with("showcase_title", "Work"), |_| Ok(()))
        .unwrap_err();
    assert_eq!(err.to_string(), "Title and Images are required for Showcase.");
}

#[test]
fn social_gallery_needs_every_profile_part() {
    let descriptor =
        FieldDescriptor::new("showcase", "Showcase", FieldKind::Gallery).with_extra(FieldExtra {
            social_profile: true,
            ..FieldExtra::default()
        });
    let mut form = form_with(catalog(vec![descriptor]), json!({}));
    form.attach_files("showcase", photos(2));
    let inputs = RawInputSet::new()
        .with("showcase_title", "Work")
        .with("showcase_handle", "@ada");

    let err = form.submit(&inputs, |_| Ok(())).unwrap_err();
    assert_eq!(
        err,
        SubmitError::IncompleteShowcase {
            field: "Showcase".into(),
            social_profile: true
        }
    );
}

#[test]
fn article_with_only_a_title_is_incomplete() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new(
            "about",
            "About",
            FieldKind::RichArticle,
        )]),
        json!({}),
    );
    let err = form
        .submit(&RawInputSet::new().with("about_title", "Hello"), |_| Ok(()))
        .unwrap_err();
    assert_eq!(
        err,
        SubmitError::IncompleteArticle {
            field: "About".into()
        }
    );
}

#[test]
fn empty_article_resets_to_an_empty_object() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new(
            "about",
            "About",
            FieldKind::RichArticle,
        )]),
        json!({}),
    );
    let entity = form.submit(&RawInputSet::new(), |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"about": {}}));
}

#[test]
fn article_content_is_split_into_paragraphs() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new(
            "about",
            "About",
            FieldKind::RichArticle,
        )]),
        json!({}),
    );
    let inputs = RawInputSet::new()
        .with("about_title", "Hello")
        .with("about_content", "first\r\n\r\nsecond")
        .with("about_image_url", "u1/about/cover.png");

    let entity = form.submit(&inputs, |_| Ok(())).unwrap();
    assert_eq!(
        entity.to_value(),
        json!({"about": {
            "title": "Hello",
            "content": ["first", "second"],
            "image_url": "u1/about/cover.png"
        }})
    );
}

#[test]
fn checkbox_values_follow_the_toggle() {
    let fields = catalog(vec![
        FieldDescriptor::new("newsletter", "Newsletter", FieldKind::Checkbox),
        FieldDescriptor::new("terms", "Terms", FieldKind::Checkbox)
            .with_validation(ValidationKind::CheckboxChecked),
    ]);
    let mut form = form_with(fields, json!({"newsletter": true, "terms": true}));

    let err = form.submit(&RawInputSet::new(), |_| Ok(())).unwrap_err();
    assert_eq!(
        err,
        SubmitError::Unchecked {
            field: "Terms".into()
        }
    );

    form.toggle_checkbox("terms", true);
    let entity = form.submit(&RawInputSet::new(), |_| Ok(())).unwrap();
    assert_eq!(
        entity.to_value(),
        json!({"newsletter": false, "terms": true})
    );
}

#[test]
fn uploads_win_over_typed_values() {
    let mut form = form_with(
        catalog(vec![
            FieldDescriptor::new("avatar", "Avatar", FieldKind::ProfilePhoto),
            FieldDescriptor::new("showcase", "Showcase", FieldKind::Gallery),
        ]),
        json!({}),
    );
    form.state_mut()
        .record_upload("avatar", "u1/avatar/new.png");
    form.state_mut()
        .record_upload("showcase_profile_photo_url", "u1/showcase/a\nb.png");
    let inputs = RawInputSet::new()
        .with("avatar", "old.png")
        .with("showcase_profile_photo_url", "typed");

    let entity = form.submit(&inputs, |_| Ok(())).unwrap();
    assert_eq!(
        entity.to_value(),
        json!({
            "avatar": "u1/avatar/new.png",
            "showcase": {"profile_photo_url": "u1/showcase/a\nb.png"}
        })
    );
}

#[test]
fn only_the_checked_radio_is_merged() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new("plan", "Plan", FieldKind::Radio)]),
        json!({"plan": "free"}),
    );
    let mut inputs = RawInputSet::new();
    inputs
        .push_radio("plan", "free", false)
        .push_radio("plan", "pro", true)
        .push_radio("plan", "team", false);

    let entity = form.submit(&inputs, |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"plan": "pro"}));
}

#[test]
fn selected_radio_reaches_submit() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new("plan", "Plan", FieldKind::Radio)]),
        json!({"plan": "free"}),
    );
    form.select_radio("plan", "pro");

    let entity = form.submit(&RawInputSet::new(), |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"plan": "pro"}));
}

#[test]
fn radio_pick_outside_the_options_checks_nothing() {
    let plan = FieldDescriptor::new("plan", "Plan", FieldKind::Radio)
        .required()
        .with_extra(FieldExtra {
            options: vec!["free".into(), "pro".into()],
            ..FieldExtra::default()
        });
    let mut form = form_with(catalog(vec![plan]), json!({}));
    form.select_radio("plan", "team");

    assert_eq!(
        form.submit(&RawInputSet::new(), |_| Ok(())).unwrap_err(),
        SubmitError::MissingRequiredField {
            field: "Plan".into()
        }
    );

    form.select_radio("plan", "pro");
    let entity = form.submit(&RawInputSet::new(), |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"plan": "pro"}));
}

#[test]
fn unknown_names_are_ignored() {
    let mut form = form_with(
        catalog(vec![FieldDescriptor::new("name", "Name", FieldKind::Text)]),
        json!({}),
    );
    let inputs = RawInputSet::new()
        .with("name", "Ada")
        .with("nickname", "A")
        .with("name_listfieldsingleidx_x", "bad index");

    let entity = form.submit(&inputs, |_| Ok(())).unwrap();
    assert_eq!(entity.to_value(), json!({"name": "Ada"}));
}

#[test]
fn merges_before_a_failure_are_kept() {
    let mut form = form_with(
        catalog(vec![
            FieldDescriptor::new("name", "Name", FieldKind::Text),
            FieldDescriptor::new("title", "Title", FieldKind::Text).required(),
        ]),
        json!({"name": "Old"}),
    );
    let inputs = RawInputSet::new().with("name", "New").with("title", "");

    assert!(form.submit(&inputs, |_| Ok(())).is_err());
    assert_eq!(
        form.entity().to_value(),
        json!({"name": "New", "title": ""})
    );
}
