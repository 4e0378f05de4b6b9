use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entities::{position, tag, task, task_assignee, task_tag, task_type, worker},
    models::{double_option, ids, tag::Tag, task_type::TaskType, worker::Worker},
    types::TaskPriority,
};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Task not found")]
    NotFound,
    #[error("Task type not found")]
    TaskTypeNotFound,
    #[error("Worker not found")]
    WorkerNotFound,
    #[error("Tag not found")]
    TagNotFound,
    #[error("{0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub priority: TaskPriority,
    pub task_type_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TaskWithDetails {
    #[serde(flatten)]
    pub task: Task,
    pub task_type: TaskType,
    pub assignees: Vec<Worker>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub task_type_id: Uuid,
    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub is_completed: Option<bool>,
    pub priority: Option<TaskPriority>,
    pub task_type_id: Option<Uuid>,
    pub assignee_ids: Option<Vec<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub search: Option<String>,
    pub completed: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssignmentChange {
    Joined,
    Left,
}

const DEFAULT_PER_PAGE: u64 = 10;
const MAX_PER_PAGE: u64 = 100;

fn validate_name(name: &str) -> Result<String, TaskError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TaskError::ValidationError(
            "Name must not be blank".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Deadline ascending (no-deadline tasks first), then priority rank.
fn ordered() -> Select<task::Entity> {
    task::Entity::find()
        .order_by_asc(task::Column::Deadline)
        .order_by_asc(task::Column::Priority)
}

async fn resolve_task_type_row_id<C: ConnectionTrait>(
    db: &C,
    task_type_id: Uuid,
) -> Result<i64, TaskError> {
    ids::task_type_id_by_uuid(db, task_type_id)
        .await?
        .ok_or(TaskError::TaskTypeNotFound)
}

async fn set_assignees<C: ConnectionTrait>(
    db: &C,
    task_row_id: i64,
    assignee_ids: &[Uuid],
) -> Result<(), TaskError> {
    task_assignee::Entity::delete_many()
        .filter(task_assignee::Column::TaskId.eq(task_row_id))
        .exec(db)
        .await?;
    for worker_id in assignee_ids.iter().collect::<BTreeSet<_>>() {
        let worker_row_id = ids::worker_id_by_uuid(db, *worker_id)
            .await?
            .ok_or(TaskError::WorkerNotFound)?;
        task_assignee::ActiveModel {
            task_id: Set(task_row_id),
            worker_id: Set(worker_row_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn set_tags<C: ConnectionTrait>(
    db: &C,
    task_row_id: i64,
    tag_ids: &[Uuid],
) -> Result<(), TaskError> {
    task_tag::Entity::delete_many()
        .filter(task_tag::Column::TaskId.eq(task_row_id))
        .exec(db)
        .await?;
    for tag_id in tag_ids.iter().collect::<BTreeSet<_>>() {
        let tag_row_id = ids::tag_id_by_uuid(db, *tag_id)
            .await?
            .ok_or(TaskError::TagNotFound)?;
        task_tag::ActiveModel {
            task_id: Set(task_row_id),
            tag_id: Set(tag_row_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

impl Task {
    fn from_model(model: task::Model, task_type_uuid: Uuid) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            description: model.description,
            deadline: model.deadline.map(Into::into),
            is_completed: model.is_completed,
            priority: model.priority,
            task_type_id: task_type_uuid,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    /// Maps rows to models, resolving task type uuids in one query.
    async fn from_models<C: ConnectionTrait>(
        db: &C,
        records: Vec<task::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        let type_uuids: HashMap<i64, Uuid> = task_type::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.uuid))
            .collect();

        records
            .into_iter()
            .map(|model| {
                let task_type_uuid = type_uuids
                    .get(&model.task_type_id)
                    .copied()
                    .ok_or_else(|| DbErr::RecordNotFound("Task type not found".to_string()))?;
                Ok(Self::from_model(model, task_type_uuid))
            })
            .collect()
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<i64, DbErr> {
        let count = task::Entity::find().count(db).await?;
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => {
                let task_type_uuid = task_type::Entity::find_by_id(model.task_type_id)
                    .one(db)
                    .await?
                    .map(|t| t.uuid)
                    .ok_or_else(|| DbErr::RecordNotFound("Task type not found".to_string()))?;
                Ok(Some(Self::from_model(model, task_type_uuid)))
            }
            None => Ok(None),
        }
    }

    /// Paged listing, always ordered by (deadline, priority).
    pub async fn find_page<C: ConnectionTrait>(
        db: &C,
        query: &TaskListQuery,
    ) -> Result<TaskPage, DbErr> {
        let mut select = ordered();
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(task::Column::Name.contains(search));
        }
        if let Some(completed) = query.completed {
            select = select.filter(task::Column::IsCompleted.eq(completed));
        }

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);

        let paginator = select.paginate(db, per_page);
        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(page - 1).await?;

        Ok(TaskPage {
            tasks: Self::from_models(db, records).await?,
            total,
            page,
            per_page,
        })
    }

    /// Detail view: task plus its type, assignees, and tags.
    pub async fn find_with_details<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<TaskWithDetails>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        let Some(model) = record else {
            return Ok(None);
        };

        let task_type = task_type::Entity::find_by_id(model.task_type_id)
            .one(db)
            .await?
            .map(TaskType::from_model)
            .ok_or_else(|| DbErr::RecordNotFound("Task type not found".to_string()))?;

        let assignees = Self::assignees_of(db, model.id).await?;
        let tags = Self::tags_of(db, model.id).await?;
        let task_type_uuid = task_type.id;

        Ok(Some(TaskWithDetails {
            task: Self::from_model(model, task_type_uuid),
            task_type,
            assignees,
            tags,
        }))
    }

    async fn assignees_of<C: ConnectionTrait>(
        db: &C,
        task_row_id: i64,
    ) -> Result<Vec<Worker>, DbErr> {
        let worker_row_ids: Vec<i64> = task_assignee::Entity::find()
            .filter(task_assignee::Column::TaskId.eq(task_row_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.worker_id)
            .collect();
        if worker_row_ids.is_empty() {
            return Ok(Vec::new());
        }

        let positions: HashMap<i64, Uuid> = position::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.uuid))
            .collect();

        let records = worker::Entity::find()
            .filter(worker::Column::Id.is_in(worker_row_ids))
            .order_by_asc(worker::Column::Username)
            .all(db)
            .await?;
        Ok(records
            .into_iter()
            .map(|model| {
                let position_uuid = model.position_id.and_then(|id| positions.get(&id).copied());
                Worker {
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
            })
            .collect())
    }

    async fn tags_of<C: ConnectionTrait>(db: &C, task_row_id: i64) -> Result<Vec<Tag>, DbErr> {
        let tag_row_ids: Vec<i64> = task_tag::Entity::find()
            .filter(task_tag::Column::TaskId.eq(task_row_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.tag_id)
            .collect();
        if tag_row_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_row_ids))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Tag::from_model).collect())
    }

    /// Current assignees of a task, by surface id.
    pub async fn assignees<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Vec<Worker>, TaskError> {
        let task_row_id = ids::task_id_by_uuid(db, id)
            .await?
            .ok_or(TaskError::NotFound)?;
        Ok(Self::assignees_of(db, task_row_id).await?)
    }

    /// Tasks assigned to a worker, ordered like the task list.
    pub(crate) async fn find_assigned_to_worker<C: ConnectionTrait>(
        db: &C,
        worker_row_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let task_row_ids: Vec<i64> = task_assignee::Entity::find()
            .filter(task_assignee::Column::WorkerId.eq(worker_row_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.task_id)
            .collect();
        if task_row_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = ordered()
            .filter(task::Column::Id.is_in(task_row_ids))
            .all(db)
            .await?;
        Self::from_models(db, records).await
    }

    pub async fn create<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        data: &CreateTask,
        id: Uuid,
    ) -> Result<Self, TaskError> {
        let name = validate_name(&data.name)?;

        let txn = db.begin().await?;
        let task_type_row_id = resolve_task_type_row_id(&txn, data.task_type_id).await?;

        let now = Utc::now();
        let active = task::ActiveModel {
            uuid: Set(id),
            name: Set(name),
            description: Set(data.description.clone()),
            deadline: Set(data.deadline.map(Into::into)),
            is_completed: Set(false),
            priority: Set(data.priority.unwrap_or_default()),
            task_type_id: Set(task_type_row_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(&txn).await?;

        set_assignees(&txn, model.id, &data.assignee_ids).await?;
        set_tags(&txn, model.id, &data.tag_ids).await?;

        txn.commit().await?;
        Ok(Self::from_model(model, data.task_type_id))
    }

    pub async fn update<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Self, TaskError> {
        let txn = db.begin().await?;

        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(&txn)
            .await?
            .ok_or(TaskError::NotFound)?;
        let row_id = record.id;

        let mut active: task::ActiveModel = record.into();
        if let Some(name) = data.name.as_deref() {
            active.name = Set(validate_name(name)?);
        }
        if let Some(description) = data.description.as_deref() {
            active.description = Set(description.to_string());
        }
        if let Some(deadline) = data.deadline {
            active.deadline = Set(deadline.map(Into::into));
        }
        if let Some(is_completed) = data.is_completed {
            active.is_completed = Set(is_completed);
        }
        if let Some(priority) = data.priority {
            active.priority = Set(priority);
        }
        if let Some(task_type_id) = data.task_type_id {
            active.task_type_id = Set(resolve_task_type_row_id(&txn, task_type_id).await?);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        if let Some(assignee_ids) = data.assignee_ids.as_deref() {
            set_assignees(&txn, row_id, assignee_ids).await?;
        }
        if let Some(tag_ids) = data.tag_ids.as_deref() {
            set_tags(&txn, row_id, tag_ids).await?;
        }

        let task_type_uuid = task_type::Entity::find_by_id(updated.task_type_id)
            .one(&txn)
            .await?
            .map(|t| t.uuid)
            .ok_or_else(|| DbErr::RecordNotFound("Task type not found".to_string()))?;

        txn.commit().await?;
        Ok(Self::from_model(updated, task_type_uuid))
    }

    /// Tasks delete freely; only their own join rows go with them.
    pub async fn delete<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<(), TaskError> {
        let txn = db.begin().await?;

        let row_id = ids::task_id_by_uuid(&txn, id)
            .await?
            .ok_or(TaskError::NotFound)?;

        task_assignee::Entity::delete_many()
            .filter(task_assignee::Column::TaskId.eq(row_id))
            .exec(&txn)
            .await?;
        task_tag::Entity::delete_many()
            .filter(task_tag::Column::TaskId.eq(row_id))
            .exec(&txn)
            .await?;
        task::Entity::delete_many()
            .filter(task::Column::Id.eq(row_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Flip a worker's membership in the task's assignee set. Runs as one
    /// transaction so the membership check and the mutation cannot be
    /// observed separately.
    pub async fn toggle_assignment<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        task_id: Uuid,
        worker_id: Uuid,
    ) -> Result<AssignmentChange, TaskError> {
        let txn = db.begin().await?;

        let task_row_id = ids::task_id_by_uuid(&txn, task_id)
            .await?
            .ok_or(TaskError::NotFound)?;
        let worker_row_id = ids::worker_id_by_uuid(&txn, worker_id)
            .await?
            .ok_or(TaskError::WorkerNotFound)?;

        let existing = task_assignee::Entity::find()
            .filter(task_assignee::Column::TaskId.eq(task_row_id))
            .filter(task_assignee::Column::WorkerId.eq(worker_row_id))
            .one(&txn)
            .await?;

        let change = match existing {
            Some(row) => {
                task_assignee::Entity::delete_by_id(row.id).exec(&txn).await?;
                AssignmentChange::Left
            }
            None => {
                task_assignee::ActiveModel {
                    task_id: Set(task_row_id),
                    worker_id: Set(worker_row_id),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                AssignmentChange::Joined
            }
        };

        txn.commit().await?;
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::models::{
        integrity::EntityKind,
        tag::{CreateTag, TagError},
        task_type::{CreateTaskType, TaskTypeError},
        worker::CreateWorker,
    };

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn create_task_type(db: &sea_orm::DatabaseConnection, name: &str) -> TaskType {
        TaskType::create(
            db,
            &CreateTaskType {
                name: name.to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    async fn create_worker(db: &sea_orm::DatabaseConnection, username: &str) -> Worker {
        Worker::create(
            db,
            &CreateWorker {
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                password: "long-enough-password".to_string(),
                position_id: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    fn new_task(name: &str, task_type_id: Uuid) -> CreateTask {
        CreateTask {
            name: name.to_string(),
            description: String::new(),
            deadline: None,
            priority: None,
            task_type_id,
            assignee_ids: Vec::new(),
            tag_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn referenced_task_type_cannot_be_deleted_until_task_goes() {
        let db = setup_db().await;
        let bug = create_task_type(&db, "Bug").await;

        let mut data = new_task("Fix crash", bug.id);
        data.priority = Some(TaskPriority::High);
        data.deadline = Some("2025-01-01T00:00:00Z".parse().unwrap());
        let task = Task::create(&db, &data, Uuid::new_v4()).await.unwrap();

        let err = TaskType::delete(&db, bug.id).await.unwrap_err();
        match err {
            TaskTypeError::InUse(referenced) => {
                assert_eq!(referenced.kind, EntityKind::TaskType);
                assert_eq!(referenced.id, bug.id);
                assert_eq!(referenced.dependents, 1);
            }
            other => panic!("expected InUse, got {other:?}"),
        }

        // Both rows untouched.
        assert!(TaskType::find_by_id(&db, bug.id).await.unwrap().is_some());
        assert!(Task::find_by_id(&db, task.id).await.unwrap().is_some());

        // Delete the task first, then the type goes through.
        Task::delete(&db, task.id).await.unwrap();
        TaskType::delete(&db, bug.id).await.unwrap();
        assert!(TaskType::find_by_id(&db, bug.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn toggle_twice_restores_assignee_set() {
        let db = setup_db().await;
        let docs = create_task_type(&db, "Documentation").await;
        let alice = create_worker(&db, "alice").await;
        let task = Task::create(&db, &new_task("Write docs", docs.id), Uuid::new_v4())
            .await
            .unwrap();

        let change = Task::toggle_assignment(&db, task.id, alice.id).await.unwrap();
        assert_eq!(change, AssignmentChange::Joined);
        let assignees = Task::assignees(&db, task.id).await.unwrap();
        assert_eq!(assignees.len(), 1);
        assert_eq!(assignees[0].id, alice.id);

        let change = Task::toggle_assignment(&db, task.id, alice.id).await.unwrap();
        assert_eq!(change, AssignmentChange::Left);
        assert!(Task::assignees(&db, task.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_on_missing_task_is_not_found() {
        let db = setup_db().await;
        let alice = create_worker(&db, "alice").await;
        let err = Task::toggle_assignment(&db, Uuid::new_v4(), alice.id)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound));
    }

    #[tokio::test]
    async fn deleting_worker_detaches_but_keeps_tasks() {
        let db = setup_db().await;
        let chore = create_task_type(&db, "Chore").await;
        let bob = create_worker(&db, "bob").await;

        let mut data = new_task("Rotate keys", chore.id);
        data.assignee_ids = vec![bob.id];
        let task = Task::create(&db, &data, Uuid::new_v4()).await.unwrap();
        assert_eq!(Task::assignees(&db, task.id).await.unwrap().len(), 1);

        Worker::delete(&db, bob.id).await.unwrap();

        assert!(Task::find_by_id(&db, task.id).await.unwrap().is_some());
        assert!(Task::assignees(&db, task.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_ordered_by_deadline_then_priority() {
        let db = setup_db().await;
        let bug = create_task_type(&db, "Bug").await;

        let jan: DateTime<Utc> = "2025-01-10T00:00:00Z".parse().unwrap();
        let feb: DateTime<Utc> = "2025-02-10T00:00:00Z".parse().unwrap();

        let mut low_jan = new_task("low january", bug.id);
        low_jan.deadline = Some(jan);
        low_jan.priority = Some(TaskPriority::Low);
        Task::create(&db, &low_jan, Uuid::new_v4()).await.unwrap();

        let mut urgent_feb = new_task("urgent february", bug.id);
        urgent_feb.deadline = Some(feb);
        urgent_feb.priority = Some(TaskPriority::Urgent);
        Task::create(&db, &urgent_feb, Uuid::new_v4()).await.unwrap();

        let mut urgent_jan = new_task("urgent january", bug.id);
        urgent_jan.deadline = Some(jan);
        urgent_jan.priority = Some(TaskPriority::Urgent);
        Task::create(&db, &urgent_jan, Uuid::new_v4()).await.unwrap();

        let page = Task::find_page(&db, &TaskListQuery::default()).await.unwrap();
        let names: Vec<&str> = page.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["urgent january", "low january", "urgent february"]
        );
    }

    #[tokio::test]
    async fn pagination_defaults_to_ten_per_page() {
        let db = setup_db().await;
        let chore = create_task_type(&db, "Chore").await;

        for i in 0..12 {
            Task::create(&db, &new_task(&format!("task {i:02}"), chore.id), Uuid::new_v4())
                .await
                .unwrap();
        }

        let first = Task::find_page(&db, &TaskListQuery::default()).await.unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.tasks.len(), 10);

        let second = Task::find_page(
            &db,
            &TaskListQuery {
                page: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(second.tasks.len(), 2);
    }

    #[tokio::test]
    async fn tag_in_use_blocks_deletion_until_detached() {
        let db = setup_db().await;
        let bug = create_task_type(&db, "Bug").await;
        let tag = Tag::create(
            &db,
            &CreateTag {
                name: "hotfix".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let mut data = new_task("Patch prod", bug.id);
        data.tag_ids = vec![tag.id];
        let task = Task::create(&db, &data, Uuid::new_v4()).await.unwrap();

        let err = Tag::delete(&db, tag.id).await.unwrap_err();
        assert!(matches!(err, TagError::InUse(_)));

        Task::delete(&db, task.id).await.unwrap();
        Tag::delete(&db, tag.id).await.unwrap();
    }

    #[tokio::test]
    async fn update_replaces_associations_and_clears_deadline() {
        let db = setup_db().await;
        let bug = create_task_type(&db, "Bug").await;
        let feature = create_task_type(&db, "Feature").await;
        let alice = create_worker(&db, "alice").await;
        let bob = create_worker(&db, "bob").await;

        let mut data = new_task("Ship it", bug.id);
        data.deadline = Some("2025-03-01T00:00:00Z".parse().unwrap());
        data.assignee_ids = vec![alice.id];
        let task = Task::create(&db, &data, Uuid::new_v4()).await.unwrap();

        let updated = Task::update(
            &db,
            task.id,
            &UpdateTask {
                name: None,
                description: None,
                deadline: Some(None),
                is_completed: Some(true),
                priority: Some(TaskPriority::Urgent),
                task_type_id: Some(feature.id),
                assignee_ids: Some(vec![bob.id]),
                tag_ids: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.deadline, None);
        assert!(updated.is_completed);
        assert_eq!(updated.priority, TaskPriority::Urgent);
        assert_eq!(updated.task_type_id, feature.id);

        let assignees = Task::assignees(&db, task.id).await.unwrap();
        assert_eq!(assignees.len(), 1);
        assert_eq!(assignees[0].id, bob.id);
    }

    #[tokio::test]
    async fn create_with_unknown_task_type_fails() {
        let db = setup_db().await;
        let err = Task::create(&db, &new_task("Orphan", Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::TaskTypeNotFound));
    }
}
