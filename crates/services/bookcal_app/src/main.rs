// File: services/bookcal_app/src/main.rs
mod render;
mod repl;
mod service_factory;

use bookcal_calendar::{CalendarController, CalendarSettings};
use bookcal_common::{logging, BookcalError, Context, DocumentStore, IdentityProvider};
use bookcal_config::{load_config, BackendKind};
use repl::{Repl, HELP};
use std::io;
use tracing::{error, info};

async fn run_calendar<I, S>(calendar: CalendarController<I, S>) -> Result<(), BookcalError>
where
    I: IdentityProvider,
    S: DocumentStore,
{
    println!("{HELP}\n");
    let stdin = io::stdin();
    let mut repl = Repl::new(calendar, stdin.lock(), io::stdout());
    repl.run().await.context("terminal I/O")?;
    info!("Input closed, bye");
    Ok(())
}

async fn run() -> Result<(), BookcalError> {
    let config = load_config()?;
    let _log_guard = logging::init(&config.logging);
    info!("Starting bookcal with the {:?} backend", config.backend);

    let settings = CalendarSettings::from_config(&config.calendar)?;
    match config.backend {
        BackendKind::Memory => {
            let (identity, store) = service_factory::memory_backend(&config.memory);
            run_calendar(CalendarController::new(identity, store, settings)).await
        }
        BackendKind::Firebase => {
            let clients = service_factory::firebase_backend(&config)?;
            run_calendar(CalendarController::new(clients.auth, clients.firestore, settings)).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        logging::init_with_level(tracing::Level::ERROR);
        error!(kind = e.kind(), "bookcal stopped: {}", e);
        eprintln!("bookcal: {e}");
        std::process::exit(1);
    }
}
