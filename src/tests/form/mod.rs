mod reconcile_tests;
mod session_tests;

use crate::domain::FieldCatalog;
use crate::form::{EditForm, Entity, MemoryNotifier};

fn form_with(catalog: FieldCatalog, entity: serde_json::Value) -> EditForm<MemoryNotifier> {
    let entity = Entity::from_value(entity).unwrap();
    EditForm::with_notifier(catalog, entity, MemoryNotifier::default())
}
