//! # lifelined
//!
//! The Lifeline daemon: configuration, logging, the HTTP configuration API
//! and the wiring between the monitor and the stores.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod logging;

pub use config::{Args, LogFormat};
