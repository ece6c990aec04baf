//! Book repository for database operations.
//!
//! Cover and playlist are stored as JSONB documents on the book row.

use std::sync::Arc;

use audiobooks_core::books::{
    Book, BookError, BookPatch, BookRepository as BookRepoTrait, Chapter, CoverRef,
    CreateBookInput,
};
use audiobooks_shared::types::BookId;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set,
};

use crate::entities::books;

/// Book repository implementation.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: Arc<DatabaseConnection>,
}

impl BookRepository {
    /// Create a new book repository.
    #[must_use]
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }
}

impl BookRepoTrait for BookRepository {
    async fn insert(&self, input: CreateBookInput) -> Result<Book, BookError> {
        let active_model = books::ActiveModel {
            id: Set(input.id.into_inner()),
            title: Set(input.title),
            author: Set(input.author),
            summary: Set(input.summary),
            cover: Set(cover_to_json(input.cover.as_ref())?),
            playlist: Set(playlist_to_json(&input.playlist)?),
            created_at: Set(Utc::now().into()),
        };

        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| BookError::repository(e.to_string()))?;

        to_domain(model)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookError> {
        let model = books::Entity::find_by_id(id.into_inner())
            .one(self.db.as_ref())
            .await
            .map_err(|e| BookError::repository(e.to_string()))?;

        model.map(to_domain).transpose()
    }

    async fn list(&self) -> Result<Vec<Book>, BookError> {
        let models = books::Entity::find()
            .order_by_desc(books::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| BookError::repository(e.to_string()))?;

        models.into_iter().map(to_domain).collect()
    }

    async fn update(&self, id: BookId, patch: BookPatch) -> Result<Option<Book>, BookError> {
        let Some(model) = books::Entity::find_by_id(id.into_inner())
            .one(self.db.as_ref())
            .await
            .map_err(|e| BookError::repository(e.to_string()))?
        else {
            return Ok(None);
        };

        if patch.is_empty() {
            return to_domain(model).map(Some);
        }

        let mut book = to_domain(model.clone())?;
        patch.apply_to(&mut book);

        let mut active_model = model.into_active_model();
        active_model.title = Set(book.title);
        active_model.author = Set(book.author);
        active_model.summary = Set(book.summary);
        active_model.cover = Set(cover_to_json(book.cover.as_ref())?);
        active_model.playlist = Set(playlist_to_json(&book.playlist)?);

        let updated = active_model
            .update(self.db.as_ref())
            .await
            .map_err(|e| BookError::repository(e.to_string()))?;

        to_domain(updated).map(Some)
    }

    async fn delete(&self, id: BookId) -> Result<bool, BookError> {
        let result = books::Entity::delete_by_id(id.into_inner())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| BookError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

fn cover_to_json(cover: Option<&CoverRef>) -> Result<Option<serde_json::Value>, BookError> {
    cover
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| BookError::repository(format!("encode cover: {e}")))
}

fn playlist_to_json(playlist: &[Chapter]) -> Result<serde_json::Value, BookError> {
    serde_json::to_value(playlist).map_err(|e| BookError::repository(format!("encode playlist: {e}")))
}

/// Convert database model to domain model.
fn to_domain(model: books::Model) -> Result<Book, BookError> {
    let cover = model
        .cover
        .filter(|v| !v.is_null())
        .map(serde_json::from_value::<CoverRef>)
        .transpose()
        .map_err(|e| BookError::repository(format!("decode cover of {}: {e}", model.id)))?;

    let playlist: Vec<Chapter> = serde_json::from_value(model.playlist)
        .map_err(|e| BookError::repository(format!("decode playlist of {}: {e}", model.id)))?;

    Ok(Book {
        id: BookId::from_uuid(model.id),
        title: model.title,
        author: model.author,
        summary: model.summary,
        cover,
        playlist,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
