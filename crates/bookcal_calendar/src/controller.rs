//! Calendar commands.
//!
//! Each command is an `async fn` taking `&mut self`, so commands never
//! interleave. A command performs its remote calls, logs any failure and
//! dispatches [`Action`]s into the reducer; nothing is returned as an error
//! to the caller.

use crate::booking::{Booking, BookingIdGenerator};
use crate::prompt::{ConfirmPrompt, MOVE_CONFIRMATION};
use crate::repository::BookingRepository;
use crate::settings::CalendarSettings;
use crate::slot_time::SlotTime;
use crate::state::{reduce, Action, AppState, View};
use crate::view::WeekView;
use bookcal_common::{log_result, DocumentStore, FederatedCredential, IdentityProvider};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Result of confirming the booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Booking),
    /// The form was not open.
    NoDraft,
    Failed,
}

/// Result of dropping a booking on a new slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The user declined; the event goes back where it was.
    Reverted,
    /// Logged and left as is.
    Failed,
}

pub struct CalendarController<I, S> {
    identity: I,
    repository: BookingRepository<S>,
    settings: CalendarSettings,
    ids: BookingIdGenerator,
    state: AppState,
}

impl<I, S> CalendarController<I, S>
where
    I: IdentityProvider,
    S: DocumentStore,
{
    pub fn new(identity: I, store: S, settings: CalendarSettings) -> Self {
        let today = Utc::now().with_timezone(&settings.time_zone).date_naive();
        Self {
            identity,
            repository: BookingRepository::new(store, settings.collection.clone()),
            state: AppState::new(today),
            settings,
            ids: BookingIdGenerator::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    pub fn repository(&self) -> &BookingRepository<S> {
        &self.repository
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Pick the initial view from an existing session and load bookings if
    /// there is one.
    pub async fn initialize(&mut self) {
        match self.identity.current_session() {
            Some(session) => {
                info!("Resuming session of {}", session.user_id);
                self.dispatch(Action::SessionRestored(session));
                self.refresh().await;
            }
            None => debug!("No session, showing login"),
        }
    }

    pub async fn sign_in_with_password(&mut self, email: &str, password: &str) -> bool {
        match self.identity.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.dispatch(Action::SignedIn(session));
                self.refresh().await;
                true
            }
            Err(e) => {
                error!("Error signing in with email: {}", e);
                self.dispatch(Action::SignInFailed);
                false
            }
        }
    }

    pub async fn sign_in_federated(&mut self, credential: &FederatedCredential) -> bool {
        match self.identity.sign_in_federated(credential).await {
            Ok(session) => {
                info!("User signed in: {}", session.user_id);
                self.dispatch(Action::SignedIn(session));
                self.refresh().await;
                true
            }
            Err(e) => {
                error!("Error with {} sign-in: {}", credential.provider_id, e);
                false
            }
        }
    }

    pub async fn sign_out(&mut self) -> bool {
        let signed_out = log_result(
            self.identity.sign_out().await,
            "User signed out",
            "Error signing out",
        );
        if signed_out.is_ok() {
            self.dispatch(Action::SignedOut);
        }
        signed_out.is_ok()
    }

    /// Fetch the whole collection into the cache. On failure the cache keeps
    /// its previous content.
    pub async fn refresh(&mut self) -> bool {
        if !self.state.is_signed_in() {
            debug!("Not signed in, skipping booking fetch");
            return false;
        }
        match self.repository.load_all().await {
            Ok(bookings) => {
                let distinct: HashSet<&str> = bookings.iter().map(|b| b.id.as_str()).collect();
                if distinct.len() < bookings.len() {
                    warn!(
                        "{} stored records share a booking id with another record",
                        bookings.len() - distinct.len()
                    );
                }
                self.dispatch(Action::BookingsLoaded(bookings));
                true
            }
            Err(e) => {
                error!("Error fetching events: {}", e);
                false
            }
        }
    }

    /// Open the booking form for the slot starting at `start`, which must lie
    /// within the visible hours.
    pub fn select_slot(&mut self, start: SlotTime) -> Option<&Booking> {
        if self.state.view != View::Calendar {
            warn!("Slot selected outside the calendar view, ignored");
            return None;
        }
        if !self.settings.visible_hours.contains(start.time()) {
            warn!("Slot {} is outside the visible hours, ignored", start);
            return None;
        }
        let draft = match Booking::draft(self.ids.next_id(), start, self.settings.slot_length) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("Slot {} refused: {}", start, e);
                return None;
            }
        };
        debug!("Draft {} for {} - {}", draft.id, draft.start_time, draft.end_time);
        self.dispatch(Action::SlotSelected(draft));
        self.state.draft.as_ref()
    }

    pub fn set_first_name(&mut self, name: impl Into<String>) {
        self.dispatch(Action::FirstNameEdited(name.into()));
    }

    pub fn set_last_name(&mut self, name: impl Into<String>) {
        self.dispatch(Action::LastNameEdited(name.into()));
    }

    pub fn cancel_draft(&mut self) {
        self.dispatch(Action::FormClosed);
    }

    /// Save the open form as a reserved booking. The form closes whatever
    /// happens.
    pub async fn confirm_draft(&mut self) -> CreateOutcome {
        let Some(draft) = self.state.draft.clone() else {
            warn!("No booking form open");
            return CreateOutcome::NoDraft;
        };
        let booking = draft.reserved();
        let outcome = match self.repository.create(&booking).await {
            Ok(_) => {
                self.dispatch(Action::BookingsInvalidated);
                CreateOutcome::Created(booking)
            }
            Err(e) => {
                error!("Error adding event to the store: {}", e);
                CreateOutcome::Failed
            }
        };
        self.dispatch(Action::FormClosed);
        if self.state.bookings.is_stale() {
            self.refresh().await;
        }
        outcome
    }

    /// Drop the booking `booking_id` on the slot starting at `new_start`,
    /// keeping its length.
    pub async fn move_booking(
        &mut self,
        booking_id: &str,
        new_start: SlotTime,
        prompt: &dyn ConfirmPrompt,
    ) -> MoveOutcome {
        let Some(booking) = self.state.bookings.get(booking_id).cloned() else {
            warn!("Booking {} is not on the calendar", booking_id);
            return MoveOutcome::Failed;
        };
        let new_end = match new_start.plus(booking.duration()) {
            Ok(end) => end,
            Err(e) => {
                error!("Cannot move booking {} to {}: {}", booking_id, new_start, e);
                return MoveOutcome::Failed;
            }
        };
        if !prompt.confirm(MOVE_CONFIRMATION) {
            debug!("Move of {} declined", booking_id);
            return MoveOutcome::Reverted;
        }
        let moved = booking.moved_to(new_start, new_end);
        match self
            .repository
            .relocate(&moved, self.settings.move_strategy)
            .await
        {
            Ok(()) => {
                self.dispatch(Action::BookingsInvalidated);
                self.refresh().await;
                MoveOutcome::Moved
            }
            Err(e) => {
                error!("Error moving booking {}: {}", booking_id, e);
                MoveOutcome::Failed
            }
        }
    }

    pub fn previous_week(&mut self) {
        self.dispatch(Action::WeekShifted(-1));
    }

    pub fn next_week(&mut self) {
        self.dispatch(Action::WeekShifted(1));
    }

    pub fn today(&mut self) {
        let today = Utc::now()
            .with_timezone(&self.settings.time_zone)
            .date_naive();
        self.show_week_of(today);
    }

    pub fn show_week_of(&mut self, date: NaiveDate) {
        self.dispatch(Action::WeekShown(date));
    }

    pub fn week_view(&self) -> WeekView {
        WeekView::build(
            self.state.week_start,
            self.settings.visible_hours,
            self.settings.slot_length,
            self.state.bookings.iter(),
        )
    }
}
