//! HTTP configuration API.

mod containers;
mod error;
mod events;
mod notifications;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{AppState, app, serve};
