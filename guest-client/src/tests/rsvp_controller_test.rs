use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::rsvp::{
    FormStatus, RsvpController, RsvpError, RsvpStatus, SaveKind, SearchStatus, CLOSE_TRANSITION,
    SCROLL_TARGET,
};
use wedding_shared::models::{Choice, RsvpDraft, RsvpRecord};
use wedding_shared::store::memory::MemoryRsvpStore;
use wedding_shared::test_utils::recording_store::RecordingStore;
use wedding_shared::test_utils::test_logging::init_test_logging;

type TestStore = RecordingStore<MemoryRsvpStore>;

fn create_controller(records: Vec<RsvpRecord>) -> (Arc<TestStore>, RsvpController<TestStore>) {
    init_test_logging();
    let store = Arc::new(RecordingStore::new(MemoryRsvpStore::with_records(records)));
    let controller = RsvpController::new(store.clone());
    (store, controller)
}

fn record(id: &str, name: &str, birthdate: &str) -> RsvpRecord {
    RsvpRecord::from_draft(
        id.to_string(),
        RsvpDraft {
            name: name.to_string(),
            birthdate: birthdate.to_string(),
            attendance: Some(Choice::Yes),
            meal: Some(Choice::No),
            companion_count: 1,
            message: "축하해요".to_string(),
        },
    )
}

fn fill_form(controller: &mut RsvpController<TestStore>, name: &str, birthdate: &str) {
    let form = controller.form_mut().unwrap();
    form.set_name(name);
    form.set_birthdate(birthdate);
    form.set_attendance(Choice::Yes);
    form.set_meal(Choice::Yes);
}

#[tokio::test]
async fn test_search_without_results_offers_new_form() {
    let (store, mut controller) = create_controller(vec![]);

    let results = controller.search("홍길동").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(controller.status().search, SearchStatus::NoResults);

    controller.open_form_from_search();
    let form = controller.form().unwrap();
    assert_eq!(form.draft.name, "홍길동");
    assert!(!form.is_existing());
    assert_eq!(controller.status().form, FormStatus::OpenNew);
    assert_eq!(store.calls(), vec!["find_by_name"]);
}

#[tokio::test]
async fn test_search_finds_every_record_with_name() {
    let (_, mut controller) = create_controller(vec![
        record("a", "김철수", "900101"),
        record("b", "김철수", "850505"),
        record("c", "김영희", "900101"),
    ]);

    let results = controller.search("김철수").await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.name == "김철수"));
    assert_eq!(controller.status().search, SearchStatus::Found);
}

#[tokio::test]
async fn test_blank_search_skips_store() {
    let (store, mut controller) = create_controller(vec![record("a", "김철수", "900101")]);
    controller.search("김철수").await.unwrap();

    let results = controller.search("   ").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(controller.status().search, SearchStatus::Idle);
    assert_eq!(store.call_count(), 1);
}

#[tokio::test]
async fn test_search_failure_restores_status() {
    let (store, mut controller) = create_controller(vec![]);
    store.set_failing(true);

    let err = controller.search("홍길동").await.unwrap_err();
    assert!(matches!(err, RsvpError::Search(_)));
    assert_eq!(err.user_message(), "검색 중 오류가 발생했습니다.");
    assert_eq!(controller.status().search, SearchStatus::Idle);
    assert!(!controller.status().is_loading());
}

#[tokio::test]
async fn test_incomplete_form_makes_no_store_call() {
    let (store, mut controller) = create_controller(vec![]);
    controller.open_form(None);
    controller.form_mut().unwrap().set_name("홍길동");

    let err = controller.save().await.unwrap_err();
    assert_eq!(
        err,
        RsvpError::MissingFields(vec!["birthdate", "attendance", "meal"])
    );
    assert_eq!(store.call_count(), 0);
    assert_eq!(controller.status().form, FormStatus::OpenNew);
}

#[tokio::test]
async fn test_save_without_open_form() {
    let (store, mut controller) = create_controller(vec![]);
    assert_eq!(controller.save().await.unwrap_err(), RsvpError::FormClosed);
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_create_new_rsvp() {
    let (store, mut controller) = create_controller(vec![]);
    controller.search("홍길동").await.unwrap();
    controller.open_form_from_search();
    fill_form(&mut controller, "  홍길동 ", "900101");

    let outcome = controller.save().await.unwrap();
    assert_eq!(outcome.kind, SaveKind::Created);
    assert_eq!(outcome.message(), "소중한 의사 전달 감사합니다.");
    assert_eq!(outcome.record.name, "홍길동");
    assert_eq!(outcome.scroll.section, SCROLL_TARGET);

    assert_eq!(store.inner().len().await, 1);
    assert!(controller.form().is_none());
    assert!(controller.results().is_empty());
    assert_eq!(controller.query(), "");
    assert_eq!(controller.status(), RsvpStatus::default());
    assert_eq!(
        store.calls(),
        vec!["find_by_name", "find_by_identity", "create_rsvp"]
    );
}

#[tokio::test]
async fn test_duplicate_identity_is_rejected() {
    let (store, mut controller) = create_controller(vec![record("a", "김철수", "900101")]);
    controller.open_form(None);
    fill_form(&mut controller, "김철수", "900101");

    let err = controller.save().await.unwrap_err();
    assert_eq!(err, RsvpError::Duplicate);
    assert_eq!(
        err.user_message(),
        "이미 등록된 정보가 있습니다. 이름으로 검색하여 수정해주세요."
    );
    assert_eq!(store.inner().len().await, 1);
    assert!(!store.calls().contains(&"create_rsvp"));
    assert_eq!(controller.form().unwrap().draft.name, "김철수");
    assert_eq!(controller.status().form, FormStatus::OpenNew);
}

#[tokio::test]
async fn test_same_name_different_birthdate_is_allowed() {
    let (store, mut controller) = create_controller(vec![record("a", "김철수", "900101")]);
    controller.open_form(None);
    fill_form(&mut controller, "김철수", "910101");

    controller.save().await.unwrap();
    assert_eq!(store.inner().len().await, 2);
}

#[tokio::test]
async fn test_update_existing_rsvp() {
    let (store, mut controller) = create_controller(vec![record("a", "김철수", "900101")]);
    let found = controller.search("김철수").await.unwrap()[0].clone();

    controller.open_form(Some(&found));
    assert_eq!(controller.status().form, FormStatus::OpenExisting);
    {
        let form = controller.form_mut().unwrap();
        form.set_attendance(Choice::No);
        form.set_message("못 가서 미안해");
    }

    let outcome = controller.save().await.unwrap();
    assert_eq!(outcome.kind, SaveKind::Updated);
    assert_eq!(outcome.message(), "수정되었습니다.");

    let stored = store.inner().get_rsvp("a").await.unwrap();
    assert_eq!(stored.attendance, Some(Choice::No));
    assert_eq!(stored.message, "못 가서 미안해");
    assert_eq!(stored.created_at, found.created_at);
    assert!(!store.calls().contains(&"find_by_identity"));
}

#[tokio::test]
async fn test_network_failure_keeps_form() {
    let (store, mut controller) = create_controller(vec![]);
    controller.open_form(None);
    fill_form(&mut controller, "홍길동", "900101");
    let before = controller.form().cloned();

    store.set_failing(true);
    let err = controller.save().await.unwrap_err();
    assert!(matches!(err, RsvpError::Save(_)));
    assert_eq!(controller.form().cloned(), before);
    assert_eq!(controller.status().form, FormStatus::OpenNew);

    store.set_failing(false);
    controller.save().await.unwrap();
    assert_eq!(store.inner().len().await, 1);
}

#[tokio::test]
async fn test_birthdate_keeps_six_digits() {
    let (_, mut controller) = create_controller(vec![]);
    controller.open_form(None);
    let form = controller.form_mut().unwrap();

    form.set_birthdate("90-01-01x23");
    assert_eq!(form.draft.birthdate, "900101");
}

#[tokio::test]
async fn test_status_updates_are_published() {
    let (_, mut controller) = create_controller(vec![]);
    let mut updates = controller.subscribe();

    controller.open_form(None);
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().form, FormStatus::OpenNew);

    controller.close_form();
    assert_eq!(updates.borrow_and_update().form, FormStatus::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_close_form_schedules_scroll() {
    let (_, mut controller) = create_controller(vec![]);
    controller.open_form(None);

    let scroll = controller.close_form().unwrap();
    assert!(controller.form().is_none());
    assert!(controller.close_form().is_none());

    let started = Instant::now();
    let target = Arc::new(Mutex::new(None));
    let seen = target.clone();
    scroll
        .schedule(move |section| *seen.lock().unwrap() = Some(section))
        .await
        .unwrap();

    assert!(started.elapsed() >= CLOSE_TRANSITION);
    assert_eq!(*target.lock().unwrap(), Some(SCROLL_TARGET));
}
