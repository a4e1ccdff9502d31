//! Resource and data source models
//!
//! Models mirror what a user writes in configuration. Unset attributes are
//! `None` until `apply_defaults` runs, so validation and the requests built
//! from a model never see a half-defaulted value.

mod namespace;
mod schedule;

pub use namespace::{NamespaceModel, DEFAULT_RETENTION_HOURS, MIN_RETENTION_HOURS};
pub use schedule::{
    CalendarModel, IntervalModel, RangeModel, ScheduleModel, ScheduleSpecModel,
    StartWorkflowModel, DEFAULT_CATCHUP_WINDOW, DEFAULT_JITTER, DEFAULT_TASK_TIMEOUT,
};
