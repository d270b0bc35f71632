//! # OVH Sniper
//!
//! > **Watch a dedicated-server plan and buy the first unit that comes into stock.**
//!
//! A task run makes one inventory query for a plan code. If any datacenter reports a
//! unit, it walks OVH's cart flow to checkout and reports the order over Telegram.
//! Runs can be stopped at any point, including mid-request.
//!
//! ## 🏗️ Design
//!
//! ### Controller as an Actor
//! The [`controller`] is a Tokio task that owns the only mutable state that matters
//! across runs: whether a run is active and the token that stops it. Callers talk to it
//! through the cloneable [`TaskController`](controller::TaskController) handle. Each
//! run is spawned in its own task so `stop()` is served while a run waits on the network.
//!
//! ### One Token, Checked Everywhere
//! A fresh [`CancellationToken`](cancel::CancellationToken) is created per run. It is
//! checked between every pipeline step and passed into every network call, which
//! races the request against it. Cancellation is an outcome, not an error.
//!
//! ### Seams for Testing
//! The order API and the chat notifier are traits ([`OrderApi`](api::OrderApi),
//! [`Notifier`](notify::Notifier)). Tests drive the whole flow with
//! [`MockOrderApi`](api::mock::MockOrderApi) and
//! [`RecordingNotifier`](notify::mock::RecordingNotifier).
//!
//! ### Observability
//! Every operator-facing line goes through an [`EventLog`](events::EventLog), which
//! keeps it for the run report, streams it to an optional subscriber and mirrors it to
//! `tracing`. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! | Module | Role |
//! |---|---|
//! | [`model`] | plain data: credentials, task spec, availability, cart, log events |
//! | [`api`] | `OrderApi` trait, HTTP client, public catalog, mock |
//! | [`scanner`] | inventory query and first-available selection |
//! | [`pipeline`] | cart → configure → checkout state machine |
//! | [`notify`] | Telegram delivery behind a best-effort sink |
//! | [`controller`] | run lifecycle actor: `start`, `stop`, `status` |
//! | [`config`] | saved JSON bundle |
//! | [`lifecycle`] | tracing setup and system wiring |
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- run --config sniper.json
//! cargo run -- catalog --endpoint eu.api.ovh.com --zone IE
//! ```

pub mod api;
pub mod cancel;
pub mod config;
pub mod controller;
pub mod events;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod scanner;
