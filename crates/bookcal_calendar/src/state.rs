//! Application state and the reducer that evolves it.
//!
//! [`reduce`] is a pure function: the controller runs the remote calls and
//! turns their outcome into an [`Action`], so every state change can be
//! tested without a backend.

use crate::booking::Booking;
use crate::view::week_start_of;
use bookcal_common::Session;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// The only error text the user ever sees.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Calendar,
}

/// Local copy of the booking collection, keyed by booking id.
///
/// It is only ever filled from a full fetch. Mutations mark it stale and the
/// controller fetches again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingCache {
    entries: BTreeMap<String, Booking>,
    stale: bool,
    loaded: bool,
}

impl BookingCache {
    /// Replace everything with a fresh fetch. With duplicate ids the last
    /// record wins.
    pub fn replace(&mut self, bookings: Vec<Booking>) {
        self.entries = bookings
            .into_iter()
            .map(|booking| (booking.id.clone(), booking))
            .collect();
        self.stale = false;
        self.loaded = true;
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True after an invalidation until the next fetch lands.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// True once a fetch has landed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: &str) -> Option<&Booking> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub view: View,
    pub session: Option<Session>,
    pub login_error: Option<String>,
    pub bookings: BookingCache,
    /// The open booking form; `None` when the modal is closed.
    pub draft: Option<Booking>,
    /// First day of the displayed week.
    pub week_start: NaiveDate,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            week_start: week_start_of(today),
            ..Self::default()
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_form_open(&self) -> bool {
        self.draft.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A session already existed at start-up.
    SessionRestored(Session),
    SignedIn(Session),
    SignInFailed,
    SignedOut,
    BookingsLoaded(Vec<Booking>),
    BookingsInvalidated,
    SlotSelected(Booking),
    FirstNameEdited(String),
    LastNameEdited(String),
    FormClosed,
    /// Move the displayed week by this many weeks.
    WeekShifted(i64),
    /// Show the week containing this date.
    WeekShown(NaiveDate),
}

pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SessionRestored(session) | Action::SignedIn(session) => {
            state.session = Some(session);
            state.view = View::Calendar;
            state.login_error = None;
            state.bookings.invalidate();
        }
        Action::SignInFailed => {
            state.login_error = Some(INVALID_CREDENTIALS_MESSAGE.to_string());
        }
        Action::SignedOut => {
            state.session = None;
            state.view = View::Login;
            state.login_error = None;
            state.bookings.clear();
            state.draft = None;
        }
        Action::BookingsLoaded(bookings) => state.bookings.replace(bookings),
        Action::BookingsInvalidated => state.bookings.invalidate(),
        Action::SlotSelected(draft) => state.draft = Some(draft),
        Action::FirstNameEdited(name) => {
            if let Some(draft) = state.draft.as_mut() {
                draft.first_name = name;
            }
        }
        Action::LastNameEdited(name) => {
            if let Some(draft) = state.draft.as_mut() {
                draft.last_name = name;
            }
        }
        Action::FormClosed => state.draft = None,
        Action::WeekShifted(weeks) => {
            state.week_start = week_start_of(state.week_start + Duration::weeks(weeks));
        }
        Action::WeekShown(date) => state.week_start = week_start_of(date),
    }
    state
}
