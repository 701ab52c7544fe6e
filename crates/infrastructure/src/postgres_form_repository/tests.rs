use chrono::Utc;
use formcraft_application::FormRepository;
use formcraft_core::{AppError, UserId};
use formcraft_domain::{
    ElementId, ElementOption, ElementType, Form, FormBranding, FormElement, FormPatch,
    FormStatus, ValidationRules,
};

use super::PostgresFormRepository;
use crate::postgres_test_support::{ensure_user, test_pool};

fn sample_form(owner: UserId) -> Form {
    Form::new_draft(owner, Utc::now())
        .patched(&FormPatch {
            title: Some("Event signup".to_owned()),
            description: Some("Tell us you're coming".to_owned()),
            status: None,
            branding: Some(FormBranding {
                primary_color: Some("#0044ff".to_owned()),
                ..FormBranding::default()
            }),
        })
        .with_element_inserted(
            FormElement::new(ElementId::new("name"), ElementType::Text, "Name", 0)
                .with_required(true)
                .with_validation(Some(ValidationRules {
                    min_length: Some(2),
                    ..ValidationRules::default()
                })),
            0,
        )
        .with_element_inserted(
            FormElement::new(ElementId::new("meal"), ElementType::Select, "Meal", 1).with_options(
                Some(vec![ElementOption {
                    id: "option-1".to_owned(),
                    value: "veg".to_owned(),
                    label: "Vegetarian".to_owned(),
                }]),
            ),
            1,
        )
}

#[tokio::test]
async fn save_inserts_then_replaces_elements() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let owner = ensure_user(&pool).await;
    let repository = PostgresFormRepository::new(pool);
    let form = sample_form(owner);

    let form_id = repository
        .save_form(&form)
        .await
        .unwrap_or_else(|error| panic!("first save failed: {error}"));
    let stored = repository
        .find_form(form_id)
        .await
        .unwrap_or_else(|error| panic!("load failed: {error}"))
        .unwrap_or_else(|| panic!("form missing after save"));

    assert_eq!(stored.title(), "Event signup");
    assert_eq!(stored.elements().len(), 2);
    assert_eq!(stored.elements()[1].renderable_options()[0].label, "Vegetarian");
    assert_eq!(
        stored.branding().and_then(|branding| branding.primary_color.as_deref()),
        Some("#0044ff")
    );

    let edited = stored
        .with_element_removed(&ElementId::new("name"))
        .prepared_for_save(FormStatus::Draft, Utc::now());
    let second_id = repository
        .save_form(&edited)
        .await
        .unwrap_or_else(|error| panic!("second save failed: {error}"));
    let reloaded = repository
        .find_form(form_id)
        .await
        .unwrap_or_else(|error| panic!("reload failed: {error}"))
        .unwrap_or_else(|| panic!("form missing after update"));

    assert_eq!(second_id, form_id);
    assert_eq!(reloaded.elements().len(), 1);
    assert_eq!(reloaded.elements()[0].id().as_str(), "meal");
    assert_eq!(reloaded.elements()[0].position(), 0);
}

#[tokio::test]
async fn published_lookup_ignores_drafts() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let owner = ensure_user(&pool).await;
    let repository = PostgresFormRepository::new(pool);
    let draft_id = repository
        .save_form(&sample_form(owner))
        .await
        .unwrap_or_else(|error| panic!("save failed: {error}"));
    let published = sample_form(owner).prepared_for_save(FormStatus::Published, Utc::now());
    let published_id = repository
        .save_form(&published)
        .await
        .unwrap_or_else(|error| panic!("save failed: {error}"));

    let draft = repository.find_published_form(draft_id).await;
    let live = repository.find_published_form(published_id).await;

    assert!(matches!(draft, Ok(None)));
    assert!(matches!(live, Ok(Some(form)) if form.is_published()));
}

#[tokio::test]
async fn listing_and_deleting_are_owner_scoped() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let owner = ensure_user(&pool).await;
    let other = ensure_user(&pool).await;
    let repository = PostgresFormRepository::new(pool);
    let form_id = repository
        .save_form(&sample_form(owner))
        .await
        .unwrap_or_else(|error| panic!("save failed: {error}"));

    let listed = repository
        .list_forms_by_owner(owner)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].element_count, 2);

    assert!(matches!(
        repository.delete_form(other, form_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(repository.delete_form(owner, form_id).await.is_ok());
    assert!(matches!(repository.find_form(form_id).await, Ok(None)));
}

#[tokio::test]
async fn foreign_form_id_is_not_overwritten() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let owner = ensure_user(&pool).await;
    let intruder = ensure_user(&pool).await;
    let repository = PostgresFormRepository::new(pool);
    let form_id = repository
        .save_form(&sample_form(owner))
        .await
        .unwrap_or_else(|error| panic!("save failed: {error}"));

    let hijack = sample_form(intruder).with_id(form_id);
    let result = repository.save_form(&hijack).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    let untouched = repository.find_form(form_id).await;
    assert!(matches!(untouched, Ok(Some(form)) if form.created_by() == owner));
}
