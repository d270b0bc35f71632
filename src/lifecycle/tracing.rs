//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide `tracing` subscriber. Call it once, from
//! `main`.
//!
//! ## What Gets Traced
//!
//! - **Operator log**: every [`EventLog`](crate::events::EventLog) line is mirrored under
//!   the `sniper` target (`success = true` marks success lines).
//! - **API calls**: one span per order-API request with method and path; credentials
//!   are never recorded.
//! - **Controller**: run start, stop requests, run outcome, actor shutdown.
//!
//! ## Usage
//!
//! ```bash
//! # Operator log plus run lifecycle
//! RUST_LOG=info ovh-sniper run --config sniper.json
//!
//! # Pipeline transitions, raw cart summary and checkout info
//! RUST_LOG=debug ovh-sniper run --config sniper.json
//!
//! # Only the operator log
//! RUST_LOG=sniper=info ovh-sniper run --config sniper.json
//! ```
//!
//! Without `RUST_LOG` the filter defaults to `info`.
//!
//! Diagnostics go to stderr. Stdout belongs to the CLI, which prints the operator log
//! itself from the run's event stream.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    subscriber(filter, std::io::stderr).init();
}

fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .compact()
        .finish()
}
