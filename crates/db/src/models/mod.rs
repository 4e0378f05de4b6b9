use serde::{Deserialize, Deserializer};

pub mod ids;
pub mod integrity;
pub mod position;
pub mod tag;
pub mod task;
pub mod task_type;
pub mod worker;

/// Distinguishes "field absent" (None) from "field explicitly null"
/// (Some(None)) on update payloads.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}
