//! skein-core library.
//!
//! # Conventions
//!
//! - **Errors**: typed enums with machine codes in the core; `anyhow::Result`
//!   with `.context(...)` at I/O edges.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`,
//!   `trace!`).
//! - **Clocks**: the engine never reads a clock; callers stamp events with
//!   [`time::wall_now_us`] and pass the value down.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod lock;
pub mod model;
pub mod nav;
pub mod time;

pub use engine::{Applied, NavEvent, Visitor, apply};
pub use error::{ErrorCode, NavError, StoreError};
pub use model::{History, Page, PageId, PageLink, Story, StoryDoc, StoryDocError, StoryId, UserId};
pub use nav::{PageTarget, VisitOutcome, VisitRequest, handle_visit};
