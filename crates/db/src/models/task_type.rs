use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entities::{task, task_type},
    models::{
        ids,
        integrity::{EntityKind, ReferencedEntityError},
    },
};

#[derive(Debug, Error)]
pub enum TaskTypeError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Task type not found")]
    NotFound,
    #[error(transparent)]
    InUse(#[from] ReferencedEntityError),
    #[error("{0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskType {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskType {
    pub name: Option<String>,
}

fn validate_name(name: &str) -> Result<String, TaskTypeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TaskTypeError::ValidationError(
            "Name must not be blank".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl TaskType {
    pub(crate) fn from_model(model: task_type::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<i64, DbErr> {
        let count = task_type::Entity::find().count(db).await?;
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = task_type::Entity::find()
            .order_by_asc(task_type::Column::Name)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = task_type::Entity::find()
            .filter(task_type::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTaskType,
        id: Uuid,
    ) -> Result<Self, TaskTypeError> {
        let name = validate_name(&data.name)?;
        let now = Utc::now();
        let active = task_type::ActiveModel {
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
        data: &UpdateTaskType,
    ) -> Result<Self, TaskTypeError> {
        let record = task_type::Entity::find()
            .filter(task_type::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TaskTypeError::NotFound)?;

        let mut active: task_type::ActiveModel = record.into();
        if let Some(name) = data.name.as_deref() {
            active.name = Set(validate_name(name)?);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Restrict delete: fails while any task still references this type.
    /// Check and delete run in one transaction; the RESTRICT foreign key
    /// catches anything that slips in between.
    pub async fn delete<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<(), TaskTypeError> {
        let txn = db.begin().await?;

        let row_id = ids::task_type_id_by_uuid(&txn, id)
            .await?
            .ok_or(TaskTypeError::NotFound)?;

        let dependents = task::Entity::find()
            .filter(task::Column::TaskTypeId.eq(row_id))
            .count(&txn)
            .await?;
        if dependents > 0 {
            return Err(ReferencedEntityError {
                kind: EntityKind::TaskType,
                id,
                dependents,
            }
            .into());
        }

        let result = task_type::Entity::delete_many()
            .filter(task_type::Column::Id.eq(row_id))
            .exec(&txn)
            .await;
        if let Err(err) = result {
            return Err(
                match ReferencedEntityError::from_constraint(&err, EntityKind::TaskType, id) {
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

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn create_list_update_delete_roundtrip() {
        let db = setup_db().await;

        let bug = TaskType::create(
            &db,
            &CreateTaskType {
                name: "Bug".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        TaskType::create(
            &db,
            &CreateTaskType {
                name: "Refactoring".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let all = TaskType::find_all(&db).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Bug");
        assert_eq!(all[1].name, "Refactoring");
        assert_eq!(TaskType::count(&db).await.unwrap(), 2);

        let updated = TaskType::update(
            &db,
            bug.id,
            &UpdateTaskType {
                name: Some("Defect".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Defect");

        TaskType::delete(&db, bug.id).await.unwrap();
        assert!(TaskType::find_by_id(&db, bug.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let db = setup_db().await;
        let err = TaskType::create(
            &db,
            &CreateTaskType {
                name: "   ".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TaskTypeError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_missing_task_type_is_not_found() {
        let db = setup_db().await;
        let err = TaskType::update(&db, Uuid::new_v4(), &UpdateTaskType { name: None })
            .await
            .unwrap_err();
        assert!(matches!(err, TaskTypeError::NotFound));
    }
}
