//! Stored object metadata repository.

use std::sync::Arc;

use audiobooks_core::objects::{
    NewObject, ObjectError, ObjectKind, ObjectRepository, StoredObject,
};
use audiobooks_shared::types::ObjectId;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::stored_objects;

/// Stored object repository implementation.
#[derive(Debug, Clone)]
pub struct StoredObjectRepository {
    db: Arc<DatabaseConnection>,
}

impl StoredObjectRepository {
    /// Create a new stored object repository.
    #[must_use]
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }
}

impl ObjectRepository for StoredObjectRepository {
    async fn create(&self, input: NewObject) -> Result<StoredObject, ObjectError> {
        let length = i64::try_from(input.length)
            .map_err(|_| ObjectError::repository("object length out of range"))?;

        let active_model = stored_objects::ActiveModel {
            id: Set(input.id.into_inner()),
            filename: Set(input.filename),
            content_type: Set(input.content_type),
            length: Set(length),
            kind: Set(input.kind.as_str().to_string()),
            chapter: Set(input.chapter),
            created_at: Set(Utc::now().into()),
        };

        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ObjectError::repository(e.to_string()))?;

        to_domain(model)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<StoredObject>, ObjectError> {
        let model = stored_objects::Entity::find_by_id(id.into_inner())
            .one(self.db.as_ref())
            .await
            .map_err(|e| ObjectError::repository(e.to_string()))?;

        model.map(to_domain).transpose()
    }
}

/// Convert database model to domain model.
fn to_domain(model: stored_objects::Model) -> Result<StoredObject, ObjectError> {
    let kind = ObjectKind::parse(&model.kind)
        .ok_or_else(|| ObjectError::repository(format!("unknown object kind: {}", model.kind)))?;
    let length = u64::try_from(model.length)
        .map_err(|_| ObjectError::repository(format!("negative length for {}", model.id)))?;

    Ok(StoredObject {
        id: ObjectId::from_uuid(model.id),
        filename: model.filename,
        content_type: model.content_type,
        length,
        kind,
        chapter: model.chapter,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
