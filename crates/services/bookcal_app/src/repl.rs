//! Line-driven front end.
//!
//! One command per line; the drag confirmation reads its answer from the
//! next line of the same input.

use crate::render::{render_bookings, render_form, render_week};
use bookcal_calendar::{
    CalendarController, ConfirmPrompt, CreateOutcome, MoveOutcome, SlotTime, View,
};
use bookcal_common::{DocumentStore, FederatedCredential, IdentityProvider};
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

pub const HELP: &str = "\
Commands:
  login <email> <password>      sign in with email and password
  google <id-token>             sign in with a Google id token
  logout                        sign out
  week                          show the current week
  prev | next | today           change week
  list                          list the bookings of the week
  click <dd/mm/yyyy> <hh:mm>    open the booking form for a slot
  first <name>                  set the first name on the form
  last <name>                   set the last name on the form
  save | cancel                 confirm or discard the form
  drag <id|#n> <dd/mm/yyyy> <hh:mm>
                                move a booking (asks for confirmation)
  refresh                       reload bookings
  help | quit";

/// A booking reference on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingRef {
    Id(String),
    /// 1-based position in the `list` output
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Google { id_token: String },
    Logout,
    Week,
    Prev,
    Next,
    Today,
    List,
    Click(SlotTime),
    FirstName(String),
    LastName(String),
    Save,
    Cancel,
    Drag { booking: BookingRef, start: SlotTime },
    Refresh,
    Help,
    Quit,
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (word.to_lowercase().as_str(), args.as_slice()) {
            ("", _) => return Ok(None),
            ("login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("google", [token]) => Command::Google {
                id_token: token.to_string(),
            },
            ("logout", []) => Command::Logout,
            ("week", []) => Command::Week,
            ("prev", []) => Command::Prev,
            ("next", []) => Command::Next,
            ("today", []) => Command::Today,
            ("list", []) => Command::List,
            ("click", [date, time]) => Command::Click(parse_slot(date, time)?),
            ("first", _) => Command::FirstName(rest.to_string()),
            ("last", _) => Command::LastName(rest.to_string()),
            ("save", []) => Command::Save,
            ("cancel", []) => Command::Cancel,
            ("drag", [booking, date, time]) => Command::Drag {
                booking: parse_booking_ref(booking)?,
                start: parse_slot(date, time)?,
            },
            ("refresh", []) => Command::Refresh,
            ("help", _) | ("?", _) => Command::Help,
            ("quit", []) | ("exit", []) => Command::Quit,
            (other, _) => return Err(format!("Unknown or incomplete command: {other}")),
        };
        Ok(Some(command))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Google { .. } => "google",
            Command::Logout => "logout",
            Command::Week => "week",
            Command::Prev => "prev",
            Command::Next => "next",
            Command::Today => "today",
            Command::List => "list",
            Command::Click(_) => "click",
            Command::FirstName(_) => "first",
            Command::LastName(_) => "last",
            Command::Save => "save",
            Command::Cancel => "cancel",
            Command::Drag { .. } => "drag",
            Command::Refresh => "refresh",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }

    fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Login { .. } | Command::Google { .. } | Command::Help | Command::Quit
        )
    }
}

fn parse_slot(date: &str, time: &str) -> Result<SlotTime, String> {
    SlotTime::parse(&format!("{date} {time}")).map_err(|e| e.to_string())
}

fn parse_booking_ref(value: &str) -> Result<BookingRef, String> {
    match value.strip_prefix('#') {
        Some(position) => position
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(BookingRef::Position)
            .ok_or_else(|| format!("Invalid position {value}")),
        None => Ok(BookingRef::Id(value.to_string())),
    }
}

/// Reads the answer to a confirmation from the command input.
struct LinePrompt<'a, R, W> {
    input: RefCell<&'a mut R>,
    output: RefCell<&'a mut W>,
}

impl<R: BufRead, W: Write> ConfirmPrompt for LinePrompt<'_, R, W> {
    /// Any terminal error counts as a decline.
    fn confirm(&self, message: &str) -> bool {
        let mut output = self.output.borrow_mut();
        if let Err(e) = write!(output, "{message} [o/N] ").and_then(|()| output.flush()) {
            warn!("Cannot show the confirmation prompt: {}", e);
            return false;
        }
        let mut answer = String::new();
        if let Err(e) = self.input.borrow_mut().read_line(&mut answer) {
            warn!("Cannot read the confirmation answer: {}", e);
            return false;
        }
        matches!(
            answer.trim().to_lowercase().as_str(),
            "o" | "oui" | "y" | "yes"
        )
    }
}

/// Runs commands from `input` until it ends or `quit`.
pub struct Repl<I, S, R, W> {
    calendar: CalendarController<I, S>,
    input: R,
    output: W,
}

impl<I, S, R, W> Repl<I, S, R, W>
where
    I: IdentityProvider,
    S: DocumentStore,
    R: BufRead,
    W: Write,
{
    pub fn new(calendar: CalendarController<I, S>, input: R, output: W) -> Self {
        Self {
            calendar,
            input,
            output,
        }
    }

    pub fn calendar(&self) -> &CalendarController<I, S> {
        &self.calendar
    }

    pub async fn run(&mut self) -> io::Result<()> {
        self.calendar.initialize().await;
        self.show_current_view()?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await?,
                Err(message) => writeln!(self.output, "{message} (try `help`)")?,
            }
        }
        Ok(())
    }

    fn show_current_view(&mut self) -> io::Result<()> {
        match self.calendar.state().view {
            View::Login => writeln!(
                self.output,
                "Log in to calendar: `login <email> <password>` or `google <id-token>`"
            ),
            View::Calendar => {
                let week = self.calendar.week_view();
                write!(self.output, "{}", render_week(&week))
            }
        }
    }

    pub async fn execute(&mut self, command: Command) -> io::Result<()> {
        debug!("command {}", command.name());
        if command.needs_session() && self.calendar.state().view != View::Calendar {
            return writeln!(self.output, "Please log in first.");
        }
        match command {
            Command::Login { email, password } => {
                if self.calendar.sign_in_with_password(&email, &password).await {
                    self.show_current_view()?;
                } else if let Some(message) = &self.calendar.state().login_error {
                    writeln!(self.output, "{message}")?;
                }
            }
            Command::Google { id_token } => {
                if self
                    .calendar
                    .sign_in_federated(&FederatedCredential::google(id_token))
                    .await
                {
                    self.show_current_view()?;
                }
            }
            Command::Logout => {
                if self.calendar.sign_out().await {
                    self.show_current_view()?;
                }
            }
            Command::Week => self.show_current_view()?,
            Command::Prev => {
                self.calendar.previous_week();
                self.show_current_view()?;
            }
            Command::Next => {
                self.calendar.next_week();
                self.show_current_view()?;
            }
            Command::Today => {
                self.calendar.today();
                self.show_current_view()?;
            }
            Command::List => {
                let week = self.calendar.week_view();
                write!(self.output, "{}", render_bookings(&week))?;
            }
            Command::Click(start) => {
                if let Some(draft) = self.calendar.select_slot(start) {
                    let form = render_form(draft);
                    write!(self.output, "{form}")?;
                }
            }
            Command::FirstName(name) => {
                self.calendar.set_first_name(name);
                self.show_form()?;
            }
            Command::LastName(name) => {
                self.calendar.set_last_name(name);
                self.show_form()?;
            }
            Command::Save => match self.calendar.confirm_draft().await {
                CreateOutcome::Created(booking) => {
                    writeln!(self.output, "Booked {} - {}.", booking.start_time, booking.end_time)?;
                }
                CreateOutcome::NoDraft => writeln!(self.output, "No booking form open.")?,
                CreateOutcome::Failed => writeln!(self.output, "The booking could not be saved.")?,
            },
            Command::Cancel => self.calendar.cancel_draft(),
            Command::Drag { booking, start } => {
                let Some(id) = self.resolve(&booking) else {
                    return writeln!(self.output, "No such booking.");
                };
                let outcome = {
                    let prompt = LinePrompt {
                        input: RefCell::new(&mut self.input),
                        output: RefCell::new(&mut self.output),
                    };
                    self.calendar.move_booking(&id, start, &prompt).await
                };
                match outcome {
                    MoveOutcome::Moved => self.show_current_view()?,
                    MoveOutcome::Reverted => writeln!(self.output, "Move cancelled.")?,
                    MoveOutcome::Failed => writeln!(self.output, "The booking could not be moved.")?,
                }
            }
            Command::Refresh => {
                self.calendar.refresh().await;
                self.show_current_view()?;
            }
            Command::Help => writeln!(self.output, "{HELP}")?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn show_form(&mut self) -> io::Result<()> {
        match &self.calendar.state().draft {
            Some(draft) => write!(self.output, "{}", render_form(draft)),
            None => writeln!(self.output, "No booking form open."),
        }
    }

    fn resolve(&self, booking: &BookingRef) -> Option<String> {
        match booking {
            BookingRef::Id(id) => Some(id.clone()),
            BookingRef::Position(n) => self
                .calendar
                .week_view()
                .events
                .get(n - 1)
                .map(|event| event.booking_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcal_calendar::CalendarSettings;
    use bookcal_common::{InMemoryDocumentStore, InMemoryIdentityProvider};
    use std::io::Cursor;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(
            Command::parse("login anne@example.com pw"),
            Ok(Some(Command::Login {
                email: "anne@example.com".to_string(),
                password: "pw".to_string()
            }))
        );
        assert_eq!(
            Command::parse("click 03/06/2024 10:00"),
            Ok(Some(Command::Click(SlotTime::parse("03/06/2024 10:00").unwrap())))
        );
        assert_eq!(
            Command::parse("first Anne Marie"),
            Ok(Some(Command::FirstName("Anne Marie".to_string())))
        );
        assert_eq!(
            Command::parse("drag #2 04/06/2024 09:00"),
            Ok(Some(Command::Drag {
                booking: BookingRef::Position(2),
                start: SlotTime::parse("04/06/2024 09:00").unwrap()
            }))
        );
        assert_eq!(Command::parse("QUIT"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("click 2024-06-03 10:00").is_err());
        assert!(Command::parse("drag #0 04/06/2024 09:00").is_err());
        assert!(Command::parse("login only-email").is_err());
        assert!(Command::parse("dance").is_err());
        assert!(Command::parse("click 31/12/+262142 23:45").is_err());
    }

    struct BrokenOutput;

    impl Write for BrokenOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_prompt_declines_when_terminal_fails() {
        let mut input = Cursor::new("o\n");
        let mut output = BrokenOutput;
        let prompt = LinePrompt {
            input: RefCell::new(&mut input),
            output: RefCell::new(&mut output),
        };

        assert!(!prompt.confirm(bookcal_calendar::MOVE_CONFIRMATION));
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn test_prompt_reads_answer() {
        let mut input = Cursor::new("oui\n");
        let mut output = Vec::new();
        let prompt = LinePrompt {
            input: RefCell::new(&mut input),
            output: RefCell::new(&mut output),
        };

        assert!(prompt.confirm("Sure?"));
        drop(prompt);
        assert_eq!(String::from_utf8(output).unwrap(), "Sure? [o/N] ");
    }

    #[tokio::test]
    async fn test_scripted_session_books_and_moves() {
        let script = "\
week
login anne@example.com wrong
login anne@example.com pw
click 03/06/2024 10:00
first Anne
last Martin
save
drag #1 03/06/2024 11:00
o
quit
";
        let calendar = CalendarController::new(
            InMemoryIdentityProvider::new([("anne@example.com", "pw")]),
            InMemoryDocumentStore::new(),
            CalendarSettings::default(),
        );
        let mut output = Vec::new();
        let mut repl = Repl::new(calendar, Cursor::new(script), &mut output);

        repl.calendar.show_week_of(chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        repl.run().await.unwrap();

        let store = repl.calendar().repository().store();
        let stored = store.snapshot("bookings");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].fields["startTime"], "03/06/2024 11:00");
        assert_eq!(stored[0].fields["firstName"], "Anne");
        drop(repl);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Please log in first."));
        assert!(text.contains("Invalid email or password."));
        assert!(text.contains("Voulez-vous vraiment déplacer ce rendez-vous ?"));
    }
}
