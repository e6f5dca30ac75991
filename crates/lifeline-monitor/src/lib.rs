//! # lifeline-monitor
//!
//! Turns raw container runtime events into audit records and alerts.
//!
//! ## Pipeline
//!
//! - [`EventSource`] subscribes to the runtime feed and forwards container events
//! - [`Monitor`] is the single consumer, multiplexing events, stream errors
//!   and cancellation
//! - [`Classifier`] applies the lifecycle rules: settle-delay confirmation of
//!   starts, exit-code disambiguation of deaths, registry updates, audit
//!   appends and conditional dispatch
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use lifeline_common::LifelinePaths;
//! use lifeline_monitor::{Classifier, DockerRuntime, Monitor, MonitorConfig};
//! use lifeline_notify::{Dispatcher, TransportRegistry};
//! use lifeline_store::FileStore;
//!
//! # async fn example() -> lifeline_common::LifelineResult<()> {
//! let store = Arc::new(FileStore::open(LifelinePaths::with_root("./data"))?);
//! let runtime = Arc::new(DockerRuntime::connect_with_defaults(120)?);
//! let dispatcher = Arc::new(Dispatcher::new(
//!     store.clone(),
//!     TransportRegistry::with_defaults(lifeline_notify::http_client()?),
//! ));
//!
//! let classifier = Classifier::new(
//!     runtime.clone(),
//!     store.clone(),
//!     store.clone(),
//!     dispatcher,
//!     MonitorConfig::default(),
//! );
//! let monitor = Monitor::new(runtime, classifier);
//! monitor.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod classifier;
mod config;
pub mod docker;
mod monitor;
pub mod runtime;
pub mod source;

pub use classifier::{Classifier, Outcome};
pub use config::MonitorConfig;
pub use docker::DockerRuntime;
pub use monitor::Monitor;
pub use runtime::{ContainerRuntime, ContainerSnapshot, ContainerSummary, RawEvent};
pub use source::EventSource;
