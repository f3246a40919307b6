//! Core domain + application logic for the CRM bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the HTTP API
//! live behind ports (traits) implemented in adapter crates: the client
//! registry, subscriber set, operator sessions and the conversational
//! protocols are all testable here with a mock messenger.

pub mod broadcast;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod panel;
pub mod registry;
pub mod session;
pub mod store;
pub mod subscribers;
#[cfg(test)]
pub(crate) mod testing;
pub mod views;
pub mod welcome;

pub use errors::{Error, Result};
