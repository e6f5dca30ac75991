//! # lifeline-store
//!
//! Storage capabilities used by the Lifeline pipeline and its configuration API.
//!
//! Each store is a trait so components receive exactly the capability they
//! need at construction time:
//! - [`EntityRegistry`]: known containers and their notification preferences
//! - [`AuditStore`]: append-only log of classified events
//! - [`ChannelStore`]: configured notification channels
//!
//! [`FileStore`] implements all three on top of a data directory. The audit
//! log lives in a SQLite database ([`SqliteAuditLog`]) so recent-event
//! queries stay bounded however long the log grows.

#![warn(missing_docs)]

pub mod audit;
pub mod channel;
pub mod file;
pub mod registry;
pub mod sqlite;

pub use audit::{AuditQuery, AuditStore, MAX_QUERY_LIMIT};
pub use channel::{ChannelStore, ChannelUpdate};
pub use file::FileStore;
pub use registry::EntityRegistry;
pub use sqlite::SqliteAuditLog;
