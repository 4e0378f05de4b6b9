use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entities::{tag, task_tag},
    models::{
        ids,
        integrity::{EntityKind, ReferencedEntityError},
    },
};

#[derive(Debug, Error)]
pub enum TagError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Tag not found")]
    NotFound,
    #[error(transparent)]
    InUse(#[from] ReferencedEntityError),
    #[error("{0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTag {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
}

fn validate_name(name: &str) -> Result<String, TagError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TagError::ValidationError(
            "Name must not be blank".to_string(),
        ));
    }
    Ok(name.to_string())
}

async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<(), TagError> {
    let mut query = tag::Entity::find().filter(tag::Column::Name.eq(name));
    if let Some(id) = exclude {
        query = query.filter(tag::Column::Uuid.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(TagError::ValidationError(format!(
            "A tag named '{name}' already exists"
        )));
    }
    Ok(())
}

impl Tag {
    pub(crate) fn from_model(model: tag::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = tag::Entity::find()
            .filter(tag::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTag,
        id: Uuid,
    ) -> Result<Self, TagError> {
        let name = validate_name(&data.name)?;
        ensure_name_free(db, &name, None).await?;
        let now = Utc::now();
        let active = tag::ActiveModel {
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
        data: &UpdateTag,
    ) -> Result<Self, TagError> {
        let record = tag::Entity::find()
            .filter(tag::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TagError::NotFound)?;

        let mut active: tag::ActiveModel = record.into();
        if let Some(name) = data.name.as_deref() {
            let name = validate_name(name)?;
            ensure_name_free(db, &name, Some(id)).await?;
            active.name = Set(name);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Restrict delete: blocked while any task carries this tag. Unused tags
    /// delete immediately.
    pub async fn delete<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<(), TagError> {
        let txn = db.begin().await?;

        let row_id = ids::tag_id_by_uuid(&txn, id)
            .await?
            .ok_or(TagError::NotFound)?;

        let dependents = task_tag::Entity::find()
            .filter(task_tag::Column::TagId.eq(row_id))
            .count(&txn)
            .await?;
        if dependents > 0 {
            return Err(ReferencedEntityError {
                kind: EntityKind::Tag,
                id,
                dependents,
            }
            .into());
        }

        let result = tag::Entity::delete_many()
            .filter(tag::Column::Id.eq(row_id))
            .exec(&txn)
            .await;
        if let Err(err) = result {
            return Err(
                match ReferencedEntityError::from_constraint(&err, EntityKind::Tag, id) {
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
    async fn unused_tag_deletes_immediately() {
        let db = setup_db().await;

        let tag = Tag::create(
            &db,
            &CreateTag {
                name: "urgent-fix".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        Tag::delete(&db, tag.id).await.unwrap();
        assert!(Tag::find_by_id(&db, tag.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_tag_name_is_rejected() {
        let db = setup_db().await;

        Tag::create(
            &db,
            &CreateTag {
                name: "backend".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let err = Tag::create(
            &db,
            &CreateTag {
                name: "backend".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TagError::ValidationError(_)));
    }

    #[tokio::test]
    async fn rename_keeps_own_name_available() {
        let db = setup_db().await;

        let tag = Tag::create(
            &db,
            &CreateTag {
                name: "frontend".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        // Updating without changing the name must not collide with itself.
        let updated = Tag::update(
            &db,
            tag.id,
            &UpdateTag {
                name: Some("frontend".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "frontend");
    }
}
