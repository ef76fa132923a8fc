//! Shared data layer for opportunity resource forecasting
//!
//! This crate provides the data model exchanged between the timeline
//! engine and its collaborators, plus the SQLite store that keeps one
//! resource timeline document per opportunity.

pub mod db;
pub mod error;
pub mod types;

pub use error::DataError;
pub use types::{
    Category, DerivationStrategy, Effort, EffortTemplate, Opportunity, ResourceTimeline,
    ReviewStatus, ServiceLineSchedule, Snapshot, StagePosition, StageTimelineEntry,
    TemplateWarning, UNCATEGORIZED,
};

// Re-export rusqlite Connection for consumers
pub use rusqlite::Connection;
