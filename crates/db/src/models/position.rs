use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entities::{position, worker},
    models::{
        ids,
        integrity::{EntityKind, ReferencedEntityError},
    },
};

#[derive(Debug, Error)]
pub enum PositionError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Position not found")]
    NotFound,
    #[error(transparent)]
    InUse(#[from] ReferencedEntityError),
    #[error("{0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePosition {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePosition {
    pub name: Option<String>,
}

fn validate_name(name: &str) -> Result<String, PositionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PositionError::ValidationError(
            "Name must not be blank".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl Position {
    pub(crate) fn from_model(model: position::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = position::Entity::find()
            .order_by_asc(position::Column::Name)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = position::Entity::find()
            .filter(position::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreatePosition,
        id: Uuid,
    ) -> Result<Self, PositionError> {
        let name = validate_name(&data.name)?;
        let now = Utc::now();
        let active = position::ActiveModel {
            uuid: Set(id),
            name: Set(name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdatePosition,
    ) -> Result<Self, PositionError> {
        let record = position::Entity::find()
            .filter(position::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(PositionError::NotFound)?;

        let mut active: position::ActiveModel = record.into();
        if let Some(name) = data.name.as_deref() {
            active.name = Set(validate_name(name)?);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Restrict delete: fails while any worker still holds this position.
    pub async fn delete<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<(), PositionError> {
        let txn = db.begin().await?;

        let row_id = ids::position_id_by_uuid(&txn, id)
            .await?
            .ok_or(PositionError::NotFound)?;

        let dependents = worker::Entity::find()
            .filter(worker::Column::PositionId.eq(row_id))
            .count(&txn)
            .await?;
        if dependents > 0 {
            return Err(ReferencedEntityError {
                kind: EntityKind::Position,
                id,
                dependents,
            }
            .into());
        }

        let result = position::Entity::delete_many()
            .filter(position::Column::Id.eq(row_id))
            .exec(&txn)
            .await;
        if let Err(err) = result {
            return Err(
                match ReferencedEntityError::from_constraint(&err, EntityKind::Position, id) {
                    Some(referenced) => referenced.into(),
                    None => err.into(),
                },
            );
        }
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::models::worker::{CreateWorker, Worker};

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn delete_blocked_while_workers_hold_position() {
        let db = setup_db().await;

        let position = Position::create(
            &db,
            &CreatePosition {
                name: "QA engineer".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        Worker::create(
            &db,
            &CreateWorker {
                username: "bob".to_string(),
                first_name: "Bob".to_string(),
                last_name: "Stone".to_string(),
                email: "bob@example.com".to_string(),
                password: "s3cret-pass".to_string(),
                position_id: Some(position.id),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let err = Position::delete(&db, position.id).await.unwrap_err();
        match err {
            PositionError::InUse(referenced) => {
                assert_eq!(referenced.kind, EntityKind::Position);
                assert_eq!(referenced.id, position.id);
                assert_eq!(referenced.dependents, 1);
            }
            other => panic!("expected InUse, got {other:?}"),
        }

        // Nothing changed.
        assert!(Position::find_by_id(&db, position.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn delete_succeeds_once_unreferenced() {
        let db = setup_db().await;

        let position = Position::create(
            &db,
            &CreatePosition {
                name: "Developer".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        Position::delete(&db, position.id).await.unwrap();
        assert!(Position::find_by_id(&db, position.id)
            .await
            .unwrap()
            .is_none());
    }
}
