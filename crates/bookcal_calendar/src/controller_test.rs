#[cfg(test)]
mod tests {
    use crate::controller::{CalendarController, CreateOutcome, MoveOutcome};
    use crate::prompt::{MockConfirmPrompt, MOVE_CONFIRMATION};
    use crate::settings::{CalendarSettings, VisibleHours};
    use crate::slot_time::SlotTime;
    use crate::state::View;
    use bookcal_common::{
        FederatedCredential, InMemoryDocumentStore, InMemoryIdentityProvider, Session,
        SignInMethod,
    };

    type Controller = CalendarController<InMemoryIdentityProvider, InMemoryDocumentStore>;

    fn controller() -> Controller {
        CalendarController::new(
            InMemoryIdentityProvider::new([("anne@example.com", "pw")]),
            InMemoryDocumentStore::new(),
            CalendarSettings::default(),
        )
    }

    fn slot(value: &str) -> SlotTime {
        SlotTime::parse(value).unwrap()
    }

    async fn with_booking(calendar: &mut Controller, start: &str) -> String {
        calendar.sign_in_with_password("anne@example.com", "pw").await;
        let id = calendar.select_slot(slot(start)).unwrap().id.clone();
        calendar.set_first_name("Anne");
        calendar.set_last_name("Martin");
        assert!(matches!(calendar.confirm_draft().await, CreateOutcome::Created(_)));
        id
    }

    fn prompt_answering(answer: bool) -> MockConfirmPrompt {
        let mut prompt = MockConfirmPrompt::new();
        prompt
            .expect_confirm()
            .withf(|message| message == MOVE_CONFIRMATION)
            .times(1)
            .return_const(answer);
        prompt
    }

    #[tokio::test]
    async fn test_initialize_resumes_existing_session() {
        let session = Session {
            user_id: "uid-1".to_string(),
            email: None,
            display_name: None,
            id_token: "token".to_string(),
            refresh_token: None,
            method: SignInMethod::Password,
        };
        let mut calendar = CalendarController::new(
            InMemoryIdentityProvider::default().with_session(session),
            InMemoryDocumentStore::new(),
            CalendarSettings::default(),
        );

        calendar.initialize().await;

        assert_eq!(calendar.state().view, View::Calendar);
        assert!(calendar.state().bookings.is_loaded());
    }

    #[tokio::test]
    async fn test_select_slot_requires_calendar_view() {
        let mut calendar = controller();
        assert!(calendar.select_slot(slot("03/06/2024 10:00")).is_none());
        assert!(!calendar.state().is_form_open());
    }

    #[tokio::test]
    async fn test_failed_federated_sign_in_shows_no_message() {
        let mut calendar = controller();

        assert!(!calendar.sign_in_federated(&FederatedCredential::google("")).await);

        assert_eq!(calendar.state().view, View::Login);
        assert!(calendar.state().login_error.is_none());
    }

    #[tokio::test]
    async fn test_cancel_discards_draft_without_store_call() {
        let mut calendar = controller();
        calendar.sign_in_with_password("anne@example.com", "pw").await;
        calendar.select_slot(slot("03/06/2024 10:00"));

        calendar.cancel_draft();

        assert!(!calendar.state().is_form_open());
        assert!(calendar.repository().store().is_empty("bookings"));
        assert_eq!(calendar.confirm_draft().await, CreateOutcome::NoDraft);
    }

    #[tokio::test]
    async fn test_move_asks_before_writing() {
        let mut calendar = controller();
        let id = with_booking(&mut calendar, "03/06/2024 10:00").await;
        let prompt = prompt_answering(true);

        let outcome = calendar
            .move_booking(&id, slot("03/06/2024 11:00"), &prompt)
            .await;

        assert_eq!(outcome, MoveOutcome::Moved);
        let moved = calendar.state().bookings.get(&id).unwrap();
        assert_eq!(moved.start_time.to_wire(), "03/06/2024 11:00");
        assert_eq!(moved.end_time.to_wire(), "03/06/2024 11:30");
        assert_eq!(moved.first_name, "Anne");
    }

    #[tokio::test]
    async fn test_declined_move_is_reverted() {
        let mut calendar = controller();
        let id = with_booking(&mut calendar, "03/06/2024 10:00").await;
        let before = calendar.repository().store().snapshot("bookings");
        let prompt = prompt_answering(false);

        let outcome = calendar
            .move_booking(&id, slot("03/06/2024 11:00"), &prompt)
            .await;

        assert_eq!(outcome, MoveOutcome::Reverted);
        assert_eq!(calendar.repository().store().snapshot("bookings"), before);
        assert_eq!(
            calendar.state().bookings.get(&id).unwrap().start_time.to_wire(),
            "03/06/2024 10:00"
        );
    }

    #[tokio::test]
    async fn test_move_of_unknown_booking_fails_before_prompt() {
        let mut calendar = controller();
        with_booking(&mut calendar, "03/06/2024 10:00").await;
        let mut prompt = MockConfirmPrompt::new();
        prompt.expect_confirm().times(0);

        let outcome = calendar
            .move_booking("42", slot("03/06/2024 11:00"), &prompt)
            .await;

        assert_eq!(outcome, MoveOutcome::Failed);
    }

    #[tokio::test]
    async fn test_slot_outside_visible_hours_is_ignored() {
        let mut calendar = controller();
        calendar.sign_in_with_password("anne@example.com", "pw").await;

        assert!(calendar.select_slot(slot("03/06/2024 07:30")).is_none());
        assert!(calendar.select_slot(slot("03/06/2024 18:00")).is_none());
        assert!(!calendar.state().is_form_open());

        let draft = calendar.select_slot(slot("03/06/2024 17:30")).unwrap();
        assert_eq!(draft.end_time.to_wire(), "03/06/2024 18:00");
    }

    #[tokio::test]
    async fn test_slot_at_end_of_calendar_is_refused() {
        let settings = CalendarSettings {
            visible_hours: VisibleHours::parse("00:00", "23:59:59").unwrap(),
            ..CalendarSettings::default()
        };
        let mut calendar = CalendarController::new(
            InMemoryIdentityProvider::new([("anne@example.com", "pw")]),
            InMemoryDocumentStore::new(),
            settings,
        );
        calendar.sign_in_with_password("anne@example.com", "pw").await;

        let last = SlotTime::new(chrono::NaiveDateTime::MAX);
        assert!(calendar.select_slot(last).is_none());
        assert!(!calendar.state().is_form_open());
    }

    #[tokio::test]
    async fn test_move_past_end_of_calendar_fails_before_prompt() {
        let mut calendar = controller();
        let id = with_booking(&mut calendar, "03/06/2024 10:00").await;
        let mut prompt = MockConfirmPrompt::new();
        prompt.expect_confirm().times(0);

        let outcome = calendar
            .move_booking(&id, SlotTime::new(chrono::NaiveDateTime::MAX), &prompt)
            .await;

        assert_eq!(outcome, MoveOutcome::Failed);
        let stored = calendar.repository().store().snapshot("bookings");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].fields["startTime"], "03/06/2024 10:00");
    }

    #[tokio::test]
    async fn test_moved_booking_keeps_its_length() {
        let settings = CalendarSettings {
            slot_length: chrono::Duration::minutes(90),
            ..CalendarSettings::default()
        };
        let mut long = CalendarController::new(
            InMemoryIdentityProvider::new([("anne@example.com", "pw")]),
            InMemoryDocumentStore::new(),
            settings,
        );
        let id = with_booking(&mut long, "03/06/2024 10:00").await;

        long.move_booking(&id, slot("04/06/2024 14:00"), &prompt_answering(true))
            .await;

        let moved = long.state().bookings.get(&id).unwrap();
        assert_eq!(moved.end_time.to_wire(), "04/06/2024 15:30");
    }

    #[tokio::test]
    async fn test_sign_out_returns_to_login() {
        let mut calendar = controller();
        with_booking(&mut calendar, "03/06/2024 10:00").await;

        assert!(calendar.sign_out().await);

        assert_eq!(calendar.state().view, View::Login);
        assert!(calendar.state().bookings.is_empty());
        assert!(!calendar.refresh().await);
    }
}
