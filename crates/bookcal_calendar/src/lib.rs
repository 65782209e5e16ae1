//! # bookcal-calendar
//!
//! The booking calendar itself: the booking record and its `dd/MM/yyyy HH:mm`
//! wire format, the application state with its reducer, the week view model
//! and the [`CalendarController`] that runs user commands against an
//! [`IdentityProvider`](bookcal_common::IdentityProvider) and a
//! [`DocumentStore`](bookcal_common::DocumentStore).
//!
//! ```no_run
//! use bookcal_calendar::{CalendarController, CalendarSettings, SlotTime};
//! use bookcal_common::{InMemoryDocumentStore, InMemoryIdentityProvider};
//!
//! # async fn demo() {
//! let identity = InMemoryIdentityProvider::new([("anne@example.com", "pw")]);
//! let mut calendar = CalendarController::new(
//!     identity,
//!     InMemoryDocumentStore::new(),
//!     CalendarSettings::default(),
//! );
//! calendar.sign_in_with_password("anne@example.com", "pw").await;
//! calendar.select_slot(SlotTime::parse("03/06/2024 10:00").unwrap());
//! calendar.set_first_name("Anne");
//! calendar.confirm_draft().await;
//! # }
//! ```

pub mod booking;
pub mod controller;
pub mod error;
pub mod prompt;
pub mod repository;
pub mod settings;
pub mod slot_time;
#[cfg(test)]
mod slot_time_proptest;
pub mod state;
pub mod view;
#[cfg(test)]
mod controller_test;

pub use booking::{Booking, BookingIdGenerator, BookingStatus};
pub use controller::{CalendarController, CreateOutcome, MoveOutcome};
pub use error::CalendarError;
pub use prompt::{AutoAnswer, ConfirmPrompt, MOVE_CONFIRMATION};
pub use repository::BookingRepository;
pub use settings::{CalendarSettings, VisibleHours};
pub use slot_time::{SlotTime, SLOT_FORMAT};
pub use state::{reduce, Action, AppState, BookingCache, View, INVALID_CREDENTIALS_MESSAGE};
pub use view::{week_start_of, CalendarEvent, EventColor, WeekView, RESERVED_TITLE};
