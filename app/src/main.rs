//! Vitrina - console host for the product inventory and featured carousel.
//!
//! Reads one command per line from stdin and prints results to stdout.
//! Autoplay ticks arrive on a channel and are handled in the same loop as
//! input, so the engine is only ever touched from one task.

mod config;
mod console;
mod error;
mod scheduler;
mod session;

use crate::config::Config;
use crate::console::parse_line;
use crate::scheduler::TokioScheduler;
use crate::session::{Flow, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrina_engine::{CarouselController, FileStore, Inventory, ViewportClass};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing on stderr so stdout stays the console
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrina_app=info,vitrina_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    run().await?;
    Ok(())
}

/// Open the inventory, then serve console input and autoplay ticks until
/// quit or end of input.
async fn run() -> error::Result<()> {
    let config = Config::from_env()?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        auto_play = config.auto_play,
        auto_play_ms = config.auto_play_ms,
        "Starting Vitrina"
    );

    let inventory = Inventory::open(FileStore::new(&config.data_dir))
        .with_policy(config.duplicate_policy());

    let (scheduler, mut ticks) = TokioScheduler::channel();
    let carousel = CarouselController::new(
        config.carousel(inventory.len()),
        ViewportClass::from_width(config.viewport_width),
        scheduler,
    );
    let mut session = Session::new(inventory, carousel);

    tracing::info!(
        products = session.inventory().len(),
        visible_items = session.carousel().visible_items(),
        "Session ready"
    );

    println!("Vitrina {} - type 'help' for commands", env!("CARGO_PKG_VERSION"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = String::new();

    loop {
        out.clear();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("End of input");
                    break;
                };

                let flow = match parse_line(&line) {
                    Ok(Some(command)) => session.execute(command, &mut out),
                    Ok(None) => Ok(Flow::Continue),
                    Err(e) => Err(e),
                };

                match flow {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "Command rejected");
                        out.push_str(&format!("error: {e}\n"));
                    }
                }
            }

            Some(token) = ticks.recv() => {
                session.on_timer(token, &mut out);
            }
        }

        print!("{out}");
    }

    session.teardown();
    tracing::info!("Vitrina stopped");
    Ok(())
}
