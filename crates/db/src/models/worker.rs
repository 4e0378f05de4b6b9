use std::collections::HashMap;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entities::{position, task_assignee, worker},
    models::{double_option, ids, position::Position, task::Task},
};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Worker not found")]
    NotFound,
    #[error("Position not found")]
    PositionNotFound,
    #[error("{0}")]
    ValidationError(String),
    #[error("Password hashing failed")]
    PasswordHash(argon2::password_hash::Error),
}

/// Never carries the password hash; credentials stay inside this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub position_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorker {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub position_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorker {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub position_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerWithTaskCount {
    #[serde(flatten)]
    pub worker: Worker,
    pub num_tasks: i64,
}

#[derive(Debug, Serialize)]
pub struct WorkerWithDetails {
    #[serde(flatten)]
    pub worker: Worker,
    pub position: Option<Position>,
    pub tasks: Vec<Task>,
}

fn validate_username(username: &str) -> Result<String, WorkerError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(WorkerError::ValidationError(
            "Username must not be blank".to_string(),
        ));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> Result<(), WorkerError> {
    if password.len() < 8 {
        return Err(WorkerError::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, WorkerError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(WorkerError::PasswordHash)?;
    Ok(hash.to_string())
}

async fn ensure_username_free<C: ConnectionTrait>(
    db: &C,
    username: &str,
    exclude: Option<Uuid>,
) -> Result<(), WorkerError> {
    let mut query = worker::Entity::find().filter(worker::Column::Username.eq(username));
    if let Some(id) = exclude {
        query = query.filter(worker::Column::Uuid.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(WorkerError::ValidationError(format!(
            "A worker with username '{username}' already exists"
        )));
    }
    Ok(())
}

async fn resolve_position_row_id<C: ConnectionTrait>(
    db: &C,
    position_id: Uuid,
) -> Result<i64, WorkerError> {
    ids::position_id_by_uuid(db, position_id)
        .await?
        .ok_or(WorkerError::PositionNotFound)
}

impl Worker {
    fn from_model(model: worker::Model, position_uuid: Option<Uuid>) -> Self {
        Self {
            id: model.uuid,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            is_active: model.is_active,
            is_staff: model.is_staff,
            position_id: position_uuid,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    async fn position_uuid_of<C: ConnectionTrait>(
        db: &C,
        model: &worker::Model,
    ) -> Result<Option<Uuid>, DbErr> {
        match model.position_id {
            Some(row_id) => ids::position_uuid_by_id(db, row_id).await,
            None => Ok(None),
        }
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<i64, DbErr> {
        let count = worker::Entity::find().count(db).await?;
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = worker::Entity::find()
            .filter(worker::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => {
                let position_uuid = Self::position_uuid_of(db, &model).await?;
                Ok(Some(Self::from_model(model, position_uuid)))
            }
            None => Ok(None),
        }
    }

    pub async fn find_by_username<C: ConnectionTrait>(
        db: &C,
        username: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = worker::Entity::find()
            .filter(worker::Column::Username.eq(username))
            .one(db)
            .await?;
        match record {
            Some(model) => {
                let position_uuid = Self::position_uuid_of(db, &model).await?;
                Ok(Some(Self::from_model(model, position_uuid)))
            }
            None => Ok(None),
        }
    }

    /// Worker list with assigned-task counts, ordered by username.
    pub async fn find_all_with_task_counts<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<WorkerWithTaskCount>, DbErr> {
        let records = worker::Entity::find()
            .order_by_asc(worker::Column::Username)
            .all(db)
            .await?;

        let positions: HashMap<i64, Uuid> = position::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.uuid))
            .collect();

        let counts: Vec<(i64, i64)> = task_assignee::Entity::find()
            .select_only()
            .column(task_assignee::Column::WorkerId)
            .column_as(task_assignee::Column::Id.count(), "num_tasks")
            .group_by(task_assignee::Column::WorkerId)
            .into_tuple()
            .all(db)
            .await?;
        let counts: HashMap<i64, i64> = counts.into_iter().collect();

        Ok(records
            .into_iter()
            .map(|model| {
                let num_tasks = counts.get(&model.id).copied().unwrap_or(0);
                let position_uuid = model.position_id.and_then(|id| positions.get(&id).copied());
                WorkerWithTaskCount {
                    worker: Self::from_model(model, position_uuid),
                    num_tasks,
                }
            })
            .collect())
    }

    /// Detail view: worker plus position and assigned tasks.
    pub async fn find_with_details<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<WorkerWithDetails>, DbErr> {
        let record = worker::Entity::find()
            .filter(worker::Column::Uuid.eq(id))
            .one(db)
            .await?;
        let Some(model) = record else {
            return Ok(None);
        };

        let position = match model.position_id {
            Some(row_id) => position::Entity::find_by_id(row_id)
                .one(db)
                .await?
                .map(Position::from_model),
            None => None,
        };

        let tasks = Task::find_assigned_to_worker(db, model.id).await?;
        let position_uuid = position.as_ref().map(|p| p.id);

        Ok(Some(WorkerWithDetails {
            worker: Self::from_model(model, position_uuid),
            position,
            tasks,
        }))
    }

    /// Check credentials; returns the worker only for an active account with
    /// a matching password.
    pub async fn authenticate<C: ConnectionTrait>(
        db: &C,
        username: &str,
        password: &str,
    ) -> Result<Option<Self>, WorkerError> {
        let record = worker::Entity::find()
            .filter(worker::Column::Username.eq(username))
            .one(db)
            .await?;
        let Some(model) = record else {
            return Ok(None);
        };

        let parsed = PasswordHash::new(&model.password_hash).map_err(WorkerError::PasswordHash)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(None);
        }
        if !model.is_active {
            return Ok(None);
        }

        let position_uuid = Self::position_uuid_of(db, &model).await?;
        Ok(Some(Self::from_model(model, position_uuid)))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateWorker,
        id: Uuid,
    ) -> Result<Self, WorkerError> {
        let username = validate_username(&data.username)?;
        ensure_username_free(db, &username, None).await?;
        validate_password(&data.password)?;

        let position_row_id = match data.position_id {
            Some(position_id) => Some(resolve_position_row_id(db, position_id).await?),
            None => None,
        };

        let now = Utc::now();
        let active = worker::ActiveModel {
            uuid: Set(id),
            username: Set(username),
            first_name: Set(data.first_name.trim().to_string()),
            last_name: Set(data.last_name.trim().to_string()),
            email: Set(data.email.trim().to_string()),
            password_hash: Set(hash_password(&data.password)?),
            is_active: Set(true),
            is_staff: Set(false),
            position_id: Set(position_row_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model, data.position_id))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateWorker,
    ) -> Result<Self, WorkerError> {
        let record = worker::Entity::find()
            .filter(worker::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(WorkerError::NotFound)?;

        let mut active: worker::ActiveModel = record.into();
        if let Some(username) = data.username.as_deref() {
            let username = validate_username(username)?;
            ensure_username_free(db, &username, Some(id)).await?;
            active.username = Set(username);
        }
        if let Some(first_name) = data.first_name.as_deref() {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = data.last_name.as_deref() {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(email) = data.email.as_deref() {
            active.email = Set(email.trim().to_string());
        }
        if let Some(password) = data.password.as_deref() {
            validate_password(password)?;
            active.password_hash = Set(hash_password(password)?);
        }
        match data.position_id {
            Some(Some(position_id)) => {
                let row_id = resolve_position_row_id(db, position_id).await?;
                active.position_id = Set(Some(row_id));
            }
            Some(None) => {
                active.position_id = Set(None);
            }
            None => {}
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        let position_uuid = Self::position_uuid_of(db, &updated).await?;
        Ok(Self::from_model(updated, position_uuid))
    }

    /// Deleting a worker detaches it from every task (the join rows cascade)
    /// but never deletes a task.
    pub async fn delete<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<(), WorkerError> {
        let txn = db.begin().await?;

        let row_id = ids::worker_id_by_uuid(&txn, id)
            .await?
            .ok_or(WorkerError::NotFound)?;

        task_assignee::Entity::delete_many()
            .filter(task_assignee::Column::WorkerId.eq(row_id))
            .exec(&txn)
            .await?;
        worker::Entity::delete_many()
            .filter(worker::Column::Id.eq(row_id))
            .exec(&txn)
            .await?;

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

    fn alice() -> CreateWorker {
        CreateWorker {
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Reed".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
            position_id: None,
        }
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_active_flag() {
        let db = setup_db().await;
        let created = Worker::create(&db, &alice(), Uuid::new_v4()).await.unwrap();

        let found = Worker::authenticate(&db, "alice", "correct-horse")
            .await
            .unwrap()
            .expect("valid credentials");
        assert_eq!(found.id, created.id);

        assert!(Worker::authenticate(&db, "alice", "wrong-password")
            .await
            .unwrap()
            .is_none());
        assert!(Worker::authenticate(&db, "nobody", "correct-horse")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = setup_db().await;
        Worker::create(&db, &alice(), Uuid::new_v4()).await.unwrap();

        let err = Worker::create(&db, &alice(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::ValidationError(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let db = setup_db().await;
        let mut data = alice();
        data.password = "short".to_string();
        let err = Worker::create(&db, &data, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkerError::ValidationError(_)));
    }

    #[tokio::test]
    async fn position_can_be_set_and_cleared() {
        let db = setup_db().await;
        let position = crate::models::position::Position::create(
            &db,
            &crate::models::position::CreatePosition {
                name: "DevOps".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let mut data = alice();
        data.position_id = Some(position.id);
        let worker = Worker::create(&db, &data, Uuid::new_v4()).await.unwrap();
        assert_eq!(worker.position_id, Some(position.id));

        let updated = Worker::update(
            &db,
            worker.id,
            &UpdateWorker {
                username: None,
                first_name: None,
                last_name: None,
                email: None,
                password: None,
                position_id: Some(None),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.position_id, None);

        // Now unreferenced, the position may go.
        crate::models::position::Position::delete(&db, position.id)
            .await
            .unwrap();
    }
}
