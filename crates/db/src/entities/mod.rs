pub mod position;
pub mod tag;
pub mod task;
pub mod task_assignee;
pub mod task_tag;
pub mod task_type;
pub mod worker;
