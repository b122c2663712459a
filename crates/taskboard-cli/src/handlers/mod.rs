pub mod column;
pub mod metrics;
pub mod project;
pub mod task;
