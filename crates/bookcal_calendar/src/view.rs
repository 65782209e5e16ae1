//! Week grid view model.
//!
//! Presentation-free: colors are plain names, a front end decides how to
//! draw them.

use crate::booking::{Booking, BookingStatus};
use crate::settings::VisibleHours;
use crate::slot_time::SlotTime;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

/// Title shown on a reserved booking.
pub const RESERVED_TITLE: &str = "Réservé";

/// Weeks start on Sunday.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventColor {
    Red,
    Green,
}

impl EventColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventColor::Red => "red",
            EventColor::Green => "green",
        }
    }
}

/// A booking as the grid shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub booking_id: String,
    pub title: &'static str,
    pub start: SlotTime,
    pub end: SlotTime,
    pub color: EventColor,
}

impl From<&Booking> for CalendarEvent {
    fn from(booking: &Booking) -> Self {
        let (title, color) = match booking.status {
            BookingStatus::Unavailable => (RESERVED_TITLE, EventColor::Red),
            BookingStatus::Available => ("", EventColor::Green),
        };
        Self {
            booking_id: booking.id.clone(),
            title,
            start: booking.start_time,
            end: booking.end_time,
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekView {
    pub first_day: NaiveDate,
    pub hours: VisibleHours,
    pub slot_length: Duration,
    /// Events starting inside the week, ordered by start.
    pub events: Vec<CalendarEvent>,
}

impl WeekView {
    pub fn build<'a>(
        first_day: NaiveDate,
        hours: VisibleHours,
        slot_length: Duration,
        bookings: impl IntoIterator<Item = &'a Booking>,
    ) -> Self {
        let end = first_day
            .checked_add_signed(Duration::days(7))
            .unwrap_or(NaiveDate::MAX);
        let mut events: Vec<CalendarEvent> = bookings
            .into_iter()
            .filter(|b| b.start_time.date() >= first_day && b.start_time.date() < end)
            .map(CalendarEvent::from)
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.booking_id.cmp(&b.booking_id)));
        Self {
            first_day,
            hours,
            slot_length,
            events,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..7).filter_map(move |offset| self.first_day.checked_add_signed(Duration::days(offset)))
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_signed(Duration::days(6))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Header line, e.g. `02/06/2024 - 08/06/2024`.
    pub fn title(&self) -> String {
        format!(
            "{} - {}",
            self.first_day.format("%d/%m/%Y"),
            self.last_day().format("%d/%m/%Y")
        )
    }

    /// Start time of every grid row.
    pub fn rows(&self) -> Vec<NaiveTime> {
        let mut rows = Vec::new();
        let mut at = self.hours.min;
        while at < self.hours.max {
            rows.push(at);
            let (next, wrapped) = at.overflowing_add_signed(self.slot_length);
            if wrapped != 0 || next <= at {
                break;
            }
            at = next;
        }
        rows
    }

    pub fn events_on(&self, day: NaiveDate) -> impl Iterator<Item = &CalendarEvent> {
        self.events.iter().filter(move |e| e.start.date() == day)
    }

    /// Events covering the grid cell starting at `day`/`row`.
    pub fn events_at(&self, day: NaiveDate, row: NaiveTime) -> impl Iterator<Item = &CalendarEvent> {
        let cell_start = SlotTime::from_parts(day, row);
        let cell_end = cell_start.plus(self.slot_length).ok();
        self.events.iter().filter(move |e| {
            e.end > cell_start && cell_end.map_or(true, |end| e.start < end)
        })
    }

    /// Whether any part of `event` falls inside the visible hours.
    pub fn is_visible(&self, event: &CalendarEvent) -> bool {
        let day = event.start.date();
        let shown_from = SlotTime::from_parts(day, self.hours.min);
        let shown_until = SlotTime::from_parts(day, self.hours.max);
        event.start < shown_until && event.end > shown_from
    }
}
