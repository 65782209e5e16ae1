//! Plain-text rendering of the calendar view model.

use bookcal_calendar::{Booking, EventColor, WeekView};
use std::fmt::Write;

/// Cell marks: reserved, available, free.
const RESERVED_CELL: &str = "  ####  ";
const AVAILABLE_CELL: &str = "  ----  ";
const FREE_CELL: &str = "   .    ";

/// Week grid followed by the booking list.
pub fn render_week(week: &WeekView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Week {}", week.title());

    let _ = write!(out, "       ");
    for day in week.days() {
        let _ = write!(out, "{:^8}", day.format("%a %d"));
    }
    out.push('\n');

    for row in week.rows() {
        let _ = write!(out, "{}  ", row.format("%H:%M"));
        for day in week.days() {
            let cell = match week.events_at(day, row).map(|e| e.color).next() {
                Some(EventColor::Red) => RESERVED_CELL,
                Some(EventColor::Green) => AVAILABLE_CELL,
                None => FREE_CELL,
            };
            out.push_str(cell);
        }
        out.push('\n');
    }
    out.push_str(&render_bookings(week));
    out
}

/// Numbered list of the week's events; the numbers are what `drag #n` takes.
pub fn render_bookings(week: &WeekView) -> String {
    if week.events.is_empty() {
        return "No bookings this week.\n".to_string();
    }
    let mut out = String::new();
    for (n, event) in week.events.iter().enumerate() {
        let hidden = if week.is_visible(event) { "" } else { " (outside visible hours)" };
        let _ = writeln!(
            out,
            "#{} {} - {} {} [{}] id {}{}",
            n + 1,
            event.start,
            event.end.time().format("%H:%M"),
            event.title,
            event.color.as_str(),
            event.booking_id,
            hidden
        );
    }
    out
}

/// The booking form.
pub fn render_form(draft: &Booking) -> String {
    format!(
        "New booking {} - {}\n  first name: {}\n  last name:  {}\n`first <name>`, `last <name>`, then `save` or `cancel`\n",
        draft.start_time, draft.end_time, draft.first_name, draft.last_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcal_calendar::{BookingStatus, SlotTime, VisibleHours};
    use chrono::{Duration, NaiveDate};

    fn week_with(bookings: &[Booking]) -> WeekView {
        WeekView::build(
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            VisibleHours::default(),
            Duration::minutes(30),
            bookings,
        )
    }

    fn reserved(id: &str, start: &str) -> Booking {
        Booking::draft(
            id.to_string(),
            SlotTime::parse(start).unwrap(),
            Duration::minutes(30),
        )
        .unwrap()
        .reserved()
    }

    #[test]
    fn test_grid_marks_reserved_cells() {
        let text = render_week(&week_with(&[reserved("1", "03/06/2024 10:00")]));

        let row = text
            .lines()
            .find(|line| line.starts_with("10:00"))
            .unwrap();
        assert!(row.contains("####"));
        assert_eq!(text.lines().filter(|l| l.contains("####")).count(), 1);
        assert!(text.contains("#1 03/06/2024 10:00 - 10:30 Réservé [red] id 1"));
    }

    #[test]
    fn test_empty_week_and_form() {
        assert_eq!(render_bookings(&week_with(&[])), "No bookings this week.\n");

        let mut draft = reserved("7", "03/06/2024 10:00");
        draft.status = BookingStatus::Available;
        draft.first_name = "Anne".to_string();
        let form = render_form(&draft);
        assert!(form.contains("03/06/2024 10:00 - 03/06/2024 10:30"));
        assert!(form.contains("first name: Anne"));
    }
}
