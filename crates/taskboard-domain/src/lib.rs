pub mod api;
pub mod board;
pub mod column;
pub mod commands;
pub mod deadline;
pub mod field_update;
pub mod filter;
pub mod metrics;
pub mod project;
pub mod store;
pub mod task;

pub use api::{BoardApi, Identity};
pub use board::BoardState;
pub use column::{Column, ColumnDraft, ColumnId};
pub use deadline::{DeadlineRules, DeadlineStatus};
pub use field_update::FieldUpdate;
pub use filter::{CompletionFilter, DeadlineFilter, TaskFilter, TaskFilters};
pub use metrics::{activity_by_day, activity_intensity, member_metrics, MemberMetrics};
pub use project::{Project, ProjectId, ProjectUpdate};
pub use store::{BoardStore, StoreOptions, SyncOutcome, TaskMove};
pub use task::{Task, TaskDraft, TaskId, TaskUpdate};
