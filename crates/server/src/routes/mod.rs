pub mod auth;
pub mod dashboard;
pub mod health;
pub mod positions;
pub mod tags;
pub mod task_types;
pub mod tasks;
pub mod workers;
