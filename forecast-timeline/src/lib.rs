//! forecast-timeline library
//!
//! Derives calendar-anchored staffing schedules for sales opportunities and
//! keeps them consistent under manual edits.

pub mod config;
pub mod engine;
pub mod error;
pub mod import;
pub mod service;

pub use error::{ErrorKind, Result, TimelineError};
