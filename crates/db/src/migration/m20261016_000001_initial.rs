//! Initial schema: stored object metadata and books.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS books CASCADE; DROP TABLE IF EXISTS stored_objects CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Metadata for immutable blobs; bytes live in object storage under {prefix}/{id}
CREATE TABLE stored_objects (
    id UUID PRIMARY KEY,
    filename TEXT NOT NULL,
    content_type TEXT NOT NULL DEFAULT 'application/octet-stream',
    length BIGINT NOT NULL,
    kind VARCHAR(16) NOT NULL,
    chapter INTEGER,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_stored_objects_length CHECK (length >= 0),
    CONSTRAINT chk_stored_objects_kind CHECK (kind IN ('cover', 'audio', 'file')),
    CONSTRAINT chk_stored_objects_chapter CHECK (chapter IS NULL OR chapter > 0)
);

-- Books reference stored objects by id inside the cover and playlist documents
CREATE TABLE books (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    author TEXT,
    summary TEXT,
    cover JSONB,
    playlist JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_books_title CHECK (btrim(title) <> ''),
    CONSTRAINT chk_books_playlist CHECK (jsonb_typeof(playlist) = 'array')
);

-- Catalogue listing is newest first
CREATE INDEX idx_books_created_at ON books(created_at DESC);
";
