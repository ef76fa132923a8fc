//! The resource timeline engine: classification, template lookup,
//! backward date sequencing, generation and edit cascades.

pub mod cascade;
pub mod category;
pub mod generator;
pub mod lifecycle;
pub mod sequencer;
pub mod status;
pub mod summary;
pub mod templates;

pub use cascade::{bulk_set_status, on_stage_edit, BulkOutcome, BulkScope, StageEdit};
pub use category::{resolve_category, validate_categories};
pub use generator::{generate, CategoryTables, GeneratorSettings};
pub use lifecycle::Lifecycle;
pub use status::TransitionPolicy;
pub use summary::{summarize, TimelineSummary};
pub use templates::{EffortTemplates, TemplateTable};
