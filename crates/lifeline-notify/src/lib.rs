//! # lifeline-notify
//!
//! Delivers alert messages to configured notification channels.
//!
//! A channel's target is a URL whose scheme selects a [`Transport`]
//! (`https://…`, `slack://…`, `discord://…`, …). The [`TransportRegistry`]
//! maps schemes to transports; new transports register under a scheme
//! without touching the [`Dispatcher`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use lifeline_common::LifelinePaths;
//! use lifeline_notify::{Dispatcher, TransportRegistry};
//! use lifeline_store::FileStore;
//!
//! # async fn example() -> lifeline_common::LifelineResult<()> {
//! let store = Arc::new(FileStore::open(LifelinePaths::with_root("./data"))?);
//! let transports = TransportRegistry::with_defaults(lifeline_notify::http_client()?);
//! let dispatcher = Dispatcher::new(store, transports);
//!
//! let report = dispatcher.send("Container 'web-1' failed. Exit code: 1").await;
//! println!("delivered to {} channel(s)", report.delivered.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod dispatcher;
pub mod transport;

pub use dispatcher::{ChannelFailure, DispatchReport, Dispatcher, Notifier, TEST_MESSAGE};
pub use transport::{Transport, TransportRegistry, http_client};
