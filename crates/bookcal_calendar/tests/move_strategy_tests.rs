
use bookcal_calendar::{AutoAnswer, MoveOutcome};
use bookcal_common::DocumentStore;
use bookcal_config::MoveStrategy;
use fixtures::{book, calendar_with, slot, stored_bounds, FlakyStore, COLLECTION};

fn bounds(start: &str, end: &str) -> (String, String) {
    (start.to_string(), end.to_string())
}

#[tokio::test]
async fn test_upsert_move_is_idempotent() {
    let (mut calendar, store) = calendar_with(MoveStrategy::Upsert);
    let id = book(&mut calendar, "03/06/2024 10:00").await;

    for _ in 0..3 {
        let outcome = calendar
            .move_booking(&id, slot("03/06/2024 11:00"), &AutoAnswer(true))
            .await;
        assert_eq!(outcome, MoveOutcome::Moved);
    }

    assert_eq!(stored_bounds(&store, &id), [bounds("03/06/2024 11:00", "03/06/2024 11:30")]);
    assert_eq!(store.inner.len(COLLECTION), 1);
    assert_eq!(store.inner.snapshot(COLLECTION)[0].id, id);
}

#[tokio::test]
async fn test_upsert_cleans_up_duplicated_records() {
    let (mut calendar, store) = calendar_with(MoveStrategy::Upsert);
    let id = book(&mut calendar, "03/06/2024 10:00").await;
    // A second copy, as left behind by a repeated legacy insert.
    let copy = store.inner.snapshot(COLLECTION)[0].fields.clone();
    store.inner.insert(COLLECTION, copy).await.unwrap();
    assert_eq!(stored_bounds(&store, &id).len(), 2);

    calendar
        .move_booking(&id, slot("04/06/2024 09:00"), &AutoAnswer(true))
        .await;

    assert_eq!(stored_bounds(&store, &id), [bounds("04/06/2024 09:00", "04/06/2024 09:30")]);
}

#[tokio::test]
async fn test_failed_upsert_leaves_booking_in_place() {
    let (mut calendar, store) = calendar_with(MoveStrategy::Upsert);
    let id = book(&mut calendar, "03/06/2024 10:00").await;
    FlakyStore::set(&store.fail_commits, true);

    let outcome = calendar
        .move_booking(&id, slot("03/06/2024 11:00"), &AutoAnswer(true))
        .await;

    assert_eq!(outcome, MoveOutcome::Failed);
    assert_eq!(stored_bounds(&store, &id), [bounds("03/06/2024 10:00", "03/06/2024 10:30")]);
    assert_eq!(
        calendar.state().bookings.get(&id).unwrap().start_time.to_wire(),
        "03/06/2024 10:00"
    );
}

#[tokio::test]
async fn test_legacy_move_replaces_record() {
    let (mut calendar, store) = calendar_with(MoveStrategy::DeleteThenInsert);
    let id = book(&mut calendar, "03/06/2024 10:00").await;

    let outcome = calendar
        .move_booking(&id, slot("03/06/2024 11:00"), &AutoAnswer(true))
        .await;

    assert_eq!(outcome, MoveOutcome::Moved);
    assert_eq!(stored_bounds(&store, &id), [bounds("03/06/2024 11:00", "03/06/2024 11:30")]);
    assert_eq!(
        calendar.state().bookings.get(&id).unwrap().start_time.to_wire(),
        "03/06/2024 11:00"
    );
}

#[tokio::test]
async fn test_legacy_move_loses_booking_when_insert_fails() {
    let (mut calendar, store) = calendar_with(MoveStrategy::DeleteThenInsert);
    let id = book(&mut calendar, "03/06/2024 10:00").await;
    FlakyStore::set(&store.fail_inserts, true);

    let outcome = calendar
        .move_booking(&id, slot("03/06/2024 11:00"), &AutoAnswer(true))
        .await;

    assert_eq!(outcome, MoveOutcome::Failed);
    assert!(stored_bounds(&store, &id).is_empty());
    // The calendar still shows the booking it can no longer find in the store.
    assert!(calendar.state().bookings.get(&id).is_some());
}

#[tokio::test]
async fn test_repeated_legacy_insert_duplicates_booking() {
    let (mut calendar, store) = calendar_with(MoveStrategy::DeleteThenInsert);
    let id = book(&mut calendar, "03/06/2024 10:00").await;
    let moved = calendar
        .state()
        .bookings
        .get(&id)
        .unwrap()
        .moved_to(slot("03/06/2024 11:00"), slot("03/06/2024 11:30"));

    // The insert half replayed, e.g. after a retry of a timed-out request.
    calendar.repository().create(&moved).await.unwrap();
    calendar.repository().create(&moved).await.unwrap();

    assert_eq!(stored_bounds(&store, &id).len(), 3);
}
