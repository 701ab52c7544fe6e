use chrono::Utc;
use formcraft_core::UserId;
use proptest::prelude::*;

use super::{BuilderAction, BuilderState};
use crate::element::{ElementId, ElementPatch, ElementType, FormElement, OptionPatch};
use crate::form::{Form, FormPatch, FormStatus};

fn empty_state() -> BuilderState {
    BuilderState::new(Form::new_draft(UserId::new(), Utc::now()))
}

fn add(state: &BuilderState, element_type: ElementType, position: usize) -> (BuilderState, ElementId) {
    let next = state.apply(BuilderAction::AddElement {
        element_type,
        position,
    });
    let id = next
        .selected_element()
        .cloned()
        .unwrap_or_else(|| unreachable!());
    (next, id)
}

fn positions(state: &BuilderState) -> Vec<usize> {
    state
        .form()
        .elements()
        .iter()
        .map(FormElement::position)
        .collect()
}

fn order(state: &BuilderState) -> Vec<ElementId> {
    state
        .form()
        .elements()
        .iter()
        .map(|element| element.id().clone())
        .collect()
}

#[test]
fn add_element_inserts_selects_and_marks_dirty() {
    let (state, first) = add(&empty_state(), ElementType::Text, 0);
    let (state, second) = add(&state, ElementType::Email, 0);

    assert!(state.is_dirty());
    assert_eq!(state.selected_element(), Some(&second));
    assert_eq!(order(&state), vec![second.clone(), first]);
    assert_eq!(positions(&state), vec![0, 1]);
    assert_eq!(
        state
            .form()
            .element(&second)
            .map(|element| element.label().to_owned()),
        Some("New email".to_owned())
    );
}

#[test]
fn add_element_clamps_position() {
    let (state, first) = add(&empty_state(), ElementType::Text, 40);
    let (state, second) = add(&state, ElementType::Number, 40);

    assert_eq!(order(&state), vec![first, second]);
}

#[test]
fn update_element_merges_patch() {
    let (state, id) = add(&empty_state(), ElementType::Text, 0);
    let state = state.apply(BuilderAction::UpdateElement {
        id: id.clone(),
        patch: ElementPatch {
            label: Some("Name".to_owned()),
            required: Some(true),
            ..ElementPatch::default()
        },
    });

    let element = state.form().element(&id).cloned().unwrap_or_else(|| unreachable!());
    assert_eq!(element.label(), "Name");
    assert!(element.required());
    assert_eq!(element.element_type(), ElementType::Text);
}

#[test]
fn update_unknown_element_is_noop_but_dirty() {
    let (state, _) = add(&empty_state(), ElementType::Text, 0);
    let saved = state.saved(state.form().clone());

    let next = saved.apply(BuilderAction::UpdateElement {
        id: ElementId::new("missing"),
        patch: ElementPatch {
            label: Some("ghost".to_owned()),
            ..ElementPatch::default()
        },
    });

    assert!(next.is_dirty());
    assert_eq!(next.form(), saved.form());
}

#[test]
fn remove_selected_element_clears_selection() {
    let (state, first) = add(&empty_state(), ElementType::Text, 0);
    let (state, second) = add(&state, ElementType::Text, 1);
    let state = state.apply(BuilderAction::RemoveElement { id: second });

    assert_eq!(state.selected_element(), None);
    assert_eq!(order(&state), vec![first]);
    assert_eq!(positions(&state), vec![0]);
}

#[test]
fn remove_other_element_keeps_selection() {
    let (state, first) = add(&empty_state(), ElementType::Text, 0);
    let (state, second) = add(&state, ElementType::Text, 1);
    let state = state.apply(BuilderAction::RemoveElement { id: first });

    assert_eq!(state.selected_element(), Some(&second));
}

#[test]
fn select_element_never_marks_dirty() {
    let (state, id) = add(&empty_state(), ElementType::Text, 0);
    let saved = state.saved(state.form().clone());

    let selected = saved.apply(BuilderAction::SelectElement { id: Some(id) });
    let cleared = selected.apply(BuilderAction::SelectElement { id: None });

    assert!(!selected.is_dirty());
    assert!(!cleared.is_dirty());
    assert_eq!(cleared.selected_element(), None);
}

#[test]
fn update_form_merges_metadata() {
    let state = empty_state().apply(BuilderAction::UpdateForm {
        patch: FormPatch {
            title: Some("Event signup".to_owned()),
            status: Some(FormStatus::Archived),
            ..FormPatch::default()
        },
    });

    assert!(state.is_dirty());
    assert_eq!(state.form().title(), "Event signup");
    assert_eq!(state.form().status(), FormStatus::Archived);
}

#[test]
fn option_actions_edit_choice_elements() {
    let (state, id) = add(&empty_state(), ElementType::Select, 0);
    let state = state
        .apply(BuilderAction::AddOption {
            element_id: id.clone(),
        })
        .apply(BuilderAction::AddOption {
            element_id: id.clone(),
        })
        .apply(BuilderAction::UpdateOption {
            element_id: id.clone(),
            index: 1,
            patch: OptionPatch {
                value: Some("blue".to_owned()),
                label: Some("Blue".to_owned()),
            },
        })
        .apply(BuilderAction::RemoveOption {
            element_id: id.clone(),
            index: 0,
        });

    let options = state
        .form()
        .element(&id)
        .and_then(|element| element.options().map(<[_]>::to_vec))
        .unwrap_or_default();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, "blue");
}

#[test]
fn actions_deserialize_from_tagged_json() {
    let action: BuilderAction = serde_json::from_value(serde_json::json!({
        "action": "move_element",
        "from": 2,
        "to": 0
    }))
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(action, BuilderAction::MoveElement { from: 2, to: 0 });
    assert!(action.is_mutating());
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize),
    Remove(usize),
    Move(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ElementType::ALL.len(), 0..12_usize).prop_map(|(kind, position)| Op::Add(kind, position)),
        (0..12_usize).prop_map(Op::Remove),
        (0..12_usize, 0..12_usize).prop_map(|(from, to)| Op::Move(from, to)),
    ]
}

fn run(state: &BuilderState, op: &Op) -> BuilderState {
    let len = state.form().elements().len();
    match *op {
        Op::Add(kind, position) => state.apply(BuilderAction::AddElement {
            element_type: ElementType::ALL[kind],
            position,
        }),
        Op::Remove(index) => match state.form().elements().get(index) {
            Some(element) => state.apply(BuilderAction::RemoveElement {
                id: element.id().clone(),
            }),
            None => state.clone(),
        },
        Op::Move(from, to) if len > 0 => state.apply(BuilderAction::MoveElement {
            from: from % len,
            to: to % len,
        }),
        Op::Move(..) => state.clone(),
    }
}

proptest! {
    #[test]
    fn positions_stay_contiguous(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut state = empty_state();
        for op in &ops {
            state = run(&state, op);
            let expected: Vec<usize> = (0..state.form().elements().len()).collect();
            prop_assert_eq!(positions(&state), expected);
        }
    }

    #[test]
    fn add_then_remove_restores_elements(
        ops in proptest::collection::vec(op_strategy(), 0..20),
        kind in 0..ElementType::ALL.len(),
        position in 0..25_usize,
    ) {
        let mut state = empty_state();
        for op in &ops {
            state = run(&state, op);
        }
        let before = state.form().elements().to_vec();

        let (added, id) = add(&state, ElementType::ALL[kind], position);
        let restored = added.apply(BuilderAction::RemoveElement { id });

        prop_assert_eq!(restored.form().elements(), before.as_slice());
    }

    #[test]
    fn move_and_move_back_restores_order(
        count in 2..10_usize,
        from_seed in 0..100_usize,
        to_seed in 0..100_usize,
    ) {
        let mut state = empty_state();
        for index in 0..count {
            state = add(&state, ElementType::Text, index).0;
        }
        let from = from_seed % count;
        let to = to_seed % count;
        prop_assume!(from != to);
        let before = state.form().elements().to_vec();

        let restored = state
            .apply(BuilderAction::MoveElement { from, to })
            .apply(BuilderAction::MoveElement { from: to, to: from });

        prop_assert_eq!(restored.form().elements(), before.as_slice());
    }
}
