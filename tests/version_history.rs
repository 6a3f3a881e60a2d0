mod common;

use common::{MockService, png};
use futures::executor::block_on;
use inpaint_studio::edit::{EditRequest, VersionStore};
use inpaint_studio::error::EditorError;
use inpaint_studio::image::{Image, ImageRef};
use proptest::prelude::*;

fn raw(tag: u8) -> ImageRef {
    Image::new_ref(vec![tag], "image/png")
}

fn inpaint(store: &VersionStore) -> EditRequest {
    EditRequest::inpaint(store.current().unwrap().clone(), "add a hat", None, Vec::new())
}

#[test]
fn test_set_base_image_discards_history() {
    let service = MockService::new();
    let mut store = VersionStore::new();
    store.set_base_image(raw(1));
    service.push_ok(raw(2));
    block_on(store.submit_edit(&service, inpaint(&store))).unwrap();
    assert_eq!(store.len(), 2);

    let fresh = raw(9);
    store.set_base_image(fresh.clone());
    assert_eq!(store.len(), 1);
    assert_eq!(store.cursor(), 0);
    assert_eq!(store.current().unwrap().id(), fresh.id());
}

#[test]
fn test_edit_after_undo_appends_at_tail() {
    let service = MockService::new();
    let mut store = VersionStore::new();
    let (a, b, c) = (raw(1), raw(2), raw(3));
    store.set_base_image(a.clone());

    service.push_ok(b.clone());
    block_on(store.submit_edit(&service, inpaint(&store))).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.cursor(), 1);

    assert!(store.undo());
    assert_eq!(store.current().unwrap().id(), a.id());

    service.push_ok(c.clone());
    block_on(store.submit_edit(&service, inpaint(&store))).unwrap();

    let ids: Vec<usize> = store.versions().iter().map(|v| v.id()).collect();
    assert_eq!(ids, vec![a.id(), b.id(), c.id()]);
    assert_eq!(store.cursor(), 2);
    assert_eq!(store.current().unwrap().id(), c.id());
    assert!(!store.redo());
    // Still reachable by index
    assert!(store.jump_to(1));
    assert_eq!(store.current().unwrap().id(), b.id());
}

#[test]
fn test_failed_edit_changes_nothing() {
    let service = MockService::new();
    let mut store = VersionStore::new();
    store.set_base_image(raw(1));
    service.push_ok(raw(2));
    block_on(store.submit_edit(&service, inpaint(&store))).unwrap();
    store.undo();

    service.push_err(EditorError::EditRequest("quota exceeded".to_string()));
    let err = block_on(store.submit_edit(&service, inpaint(&store))).unwrap_err();

    assert!(err.is_request_failure());
    assert_eq!(store.len(), 2);
    assert_eq!(store.cursor(), 0);
    assert!(!store.is_loading());
}

#[test]
fn test_submit_sends_current_image() {
    let service = MockService::new();
    let mut store = VersionStore::new();
    let base = png(2, 2, [10, 20, 30]);
    store.set_base_image(base.clone());
    service.push_ok(raw(2));

    block_on(store.submit_edit(&service, inpaint(&store))).unwrap();

    let payloads = service.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].image_base64, base.to_data_uri());
    assert!(payloads[0].mask_base64.is_none());
}

#[test]
fn test_second_submission_rejected_while_loading() {
    let mut store = VersionStore::new();
    store.set_base_image(raw(1));
    let ticket = store.begin_edit().unwrap();

    let service = MockService::new();
    let request = inpaint(&store);
    let err = block_on(store.submit_edit(&service, request)).unwrap_err();
    assert!(matches!(err, EditorError::Concurrency));
    assert!(service.payloads().is_empty());
    assert!(store.is_loading());

    store.complete_edit(ticket, Ok(raw(2))).unwrap();
    assert!(!store.is_loading());
    assert_eq!(store.len(), 2);
}

#[derive(Debug, Clone)]
enum Op {
    Undo,
    Redo,
    Jump(usize),
    EditOk,
    EditFail,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Undo),
        Just(Op::Redo),
        (0usize..8).prop_map(Op::Jump),
        Just(Op::EditOk),
        Just(Op::EditFail),
    ]
}

proptest! {
    #[test]
    fn cursor_stays_in_bounds(ops in proptest::collection::vec(op(), 0..40)) {
        let mut store = VersionStore::new();
        store.set_base_image(raw(0));
        let mut tag = 1u8;

        for op in ops {
            let len_before = store.len();
            let cursor_before = store.cursor();
            match op {
                Op::Undo => {
                    let moved = store.undo();
                    prop_assert_eq!(moved, cursor_before > 0);
                }
                Op::Redo => {
                    let moved = store.redo();
                    prop_assert_eq!(moved, cursor_before + 1 < len_before);
                }
                Op::Jump(index) => {
                    store.jump_to(index);
                }
                Op::EditOk => {
                    let ticket = store.begin_edit().unwrap();
                    let image = raw(tag);
                    tag = tag.wrapping_add(1);
                    store.complete_edit(ticket, Ok(image.clone())).unwrap();
                    prop_assert_eq!(store.len(), len_before + 1);
                    prop_assert_eq!(store.cursor(), store.len() - 1);
                    prop_assert_eq!(store.current().unwrap().id(), image.id());
                }
                Op::EditFail => {
                    let ticket = store.begin_edit().unwrap();
                    let result = store.complete_edit(ticket, Err(EditorError::ModelNoImage));
                    prop_assert!(result.is_err());
                    prop_assert_eq!(store.len(), len_before);
                    prop_assert_eq!(store.cursor(), cursor_before);
                }
            }

            prop_assert!(store.len() >= len_before);
            prop_assert!(store.cursor() < store.len());
            prop_assert_eq!(store.current().unwrap().id(), store.versions()[store.cursor()].id());
            prop_assert!(!store.is_loading());
        }
    }
}
