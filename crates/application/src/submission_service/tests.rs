use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::Utc;
use serde_json::{Value, json};

use formcraft_core::{AppError, UserId, UserIdentity};
use formcraft_domain::{ElementId, ElementType, Form, FormElement, FormId, FormStatus};

use super::SubmissionService;
use crate::test_fakes::{FakeFormRepository, FakeSubmissionRepository, actor};

struct Fixture {
    forms: Arc<FakeFormRepository>,
    submissions: Arc<FakeSubmissionRepository>,
    service: SubmissionService,
}

fn fixture() -> Fixture {
    let forms = Arc::new(FakeFormRepository::default());
    let submissions = Arc::new(FakeSubmissionRepository::default());
    let service = SubmissionService::new(forms.clone(), submissions.clone());
    Fixture {
        forms,
        submissions,
        service,
    }
}

fn two_field_form(owner: UserId, status: FormStatus) -> Form {
    let now = Utc::now();
    Form::new_draft(owner, now)
        .with_element_inserted(
            FormElement::new(ElementId::new("A"), ElementType::Text, "Name", 0)
                .with_required(true),
            0,
        )
        .with_element_inserted(
            FormElement::new(ElementId::new("B"), ElementType::Email, "Email", 1),
            1,
        )
        .prepared_for_save(status, now)
}

#[tokio::test]
async fn draft_and_missing_forms_look_the_same() {
    let fixture = fixture();
    let draft_id = fixture
        .forms
        .insert(two_field_form(UserId::new(), FormStatus::Draft))
        .await;

    let draft = fixture.service.load_published_form(draft_id).await;
    let missing = fixture.service.load_published_form(FormId::new()).await;

    match (draft, missing) {
        (Err(AppError::NotFound(left)), Err(AppError::NotFound(right))) => {
            assert_eq!(left, "form not found");
            assert_eq!(left, right);
        }
        other => panic!("expected two not found errors, got {other:?}"),
    }
}

#[tokio::test]
async fn published_form_loads_in_position_order() {
    let fixture = fixture();
    let form_id = fixture
        .forms
        .insert(two_field_form(UserId::new(), FormStatus::Published))
        .await;

    let form = fixture
        .service
        .load_published_form(form_id)
        .await
        .unwrap_or_else(|_| unreachable!());

    let ids: Vec<&str> = form
        .elements()
        .iter()
        .map(|element| element.id().as_str())
        .collect();
    assert_eq!(ids, ["A", "B"]);
}

#[tokio::test]
async fn submit_answers_every_element_and_drops_unknown_keys() {
    let fixture = fixture();
    let form_id = fixture
        .forms
        .insert(two_field_form(UserId::new(), FormStatus::Published))
        .await;
    let values = HashMap::from([
        ("A".to_owned(), json!("x")),
        ("Z".to_owned(), json!("ignored")),
    ]);

    let submission = fixture
        .service
        .submit(form_id, values, None)
        .await
        .unwrap_or_else(|_| unreachable!());

    let responses: Vec<(&str, &Value)> = submission
        .responses()
        .iter()
        .map(|response| (response.element_id.as_str(), &response.value))
        .collect();
    assert_eq!(responses, [("A", &json!("x")), ("B", &Value::Null)]);
    assert_eq!(fixture.submissions.submissions.lock().await.len(), 1);
}

#[tokio::test]
async fn submit_to_draft_is_not_found_and_stores_nothing() {
    let fixture = fixture();
    let form_id = fixture
        .forms
        .insert(two_field_form(UserId::new(), FormStatus::Draft))
        .await;

    let result = fixture.service.submit(form_id, HashMap::new(), None).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(fixture.submissions.submissions.lock().await.is_empty());
}

#[tokio::test]
async fn storage_failure_is_reported() {
    let fixture = fixture();
    let form_id = fixture
        .forms
        .insert(two_field_form(UserId::new(), FormStatus::Published))
        .await;
    fixture.submissions.fail.store(true, Ordering::SeqCst);

    let result = fixture.service.submit(form_id, HashMap::new(), None).await;

    assert!(matches!(result, Err(AppError::Persistence(_))));
}

#[tokio::test]
async fn only_the_owner_lists_submissions() {
    let fixture = fixture();
    let owner = actor();
    let form_id = fixture
        .forms
        .insert(two_field_form(owner.user_id(), FormStatus::Published))
        .await;
    assert!(
        fixture
            .service
            .submit(form_id, HashMap::new(), None)
            .await
            .is_ok()
    );

    let listed = fixture.service.list_submissions(&owner, form_id).await;
    let stranger = UserIdentity::new(UserId::new(), "x@example.com", None);
    let denied = fixture.service.list_submissions(&stranger, form_id).await;

    assert!(matches!(listed, Ok(submissions) if submissions.len() == 1));
    assert!(matches!(denied, Err(AppError::NotFound(_))));
}
