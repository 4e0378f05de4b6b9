use sea_orm::DbErr;
use strum_macros::Display;
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum EntityKind {
    #[strum(serialize = "Task type")]
    TaskType,
    #[strum(serialize = "Position")]
    Position,
    #[strum(serialize = "Tag")]
    Tag,
}

/// Restrict-delete violation: the entity still has rows pointing at it, so
/// the delete was rejected and nothing changed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind} {id} cannot be deleted: {dependents} dependent row(s) still reference it")]
pub struct ReferencedEntityError {
    pub kind: EntityKind,
    pub id: Uuid,
    pub dependents: u64,
}

impl ReferencedEntityError {
    /// A violation that slips past the pre-check (a row inserted between
    /// count and delete) surfaces as a raw execution error from the RESTRICT
    /// foreign key; fold it into the typed form. The constraint only fires
    /// with at least one dependent.
    pub(crate) fn from_constraint(err: &DbErr, kind: EntityKind, id: Uuid) -> Option<Self> {
        err.to_string()
            .contains("FOREIGN KEY constraint failed")
            .then_some(Self {
                kind,
                id,
                dependents: 1,
            })
    }
}
