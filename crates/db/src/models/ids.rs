use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{position, tag, task, task_type, worker};

pub async fn task_type_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    task_type::Entity::find()
        .select_only()
        .column(task_type::Column::Id)
        .filter(task_type::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn position_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    position::Entity::find()
        .select_only()
        .column(position::Column::Id)
        .filter(position::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn position_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    position::Entity::find()
        .select_only()
        .column(position::Column::Uuid)
        .filter(position::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn tag_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    tag::Entity::find()
        .select_only()
        .column(tag::Column::Id)
        .filter(tag::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn worker_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    worker::Entity::find()
        .select_only()
        .column(worker::Column::Id)
        .filter(worker::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn task_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Id)
        .filter(task::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}
