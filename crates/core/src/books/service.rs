//! Book service implementation.

use std::sync::Arc;

use audiobooks_shared::types::BookId;

use super::error::BookError;
use super::types::{Book, BookPatch, Chapter, CoverRef, CreateBookInput, NewBook};
use super::upload::BookUpload;
use crate::objects::{ObjectKind, ObjectRepository, ObjectService};

/// Repository trait for book persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait BookRepository: Send + Sync {
    /// Insert a new book record.
    fn insert(
        &self,
        input: CreateBookInput,
    ) -> impl std::future::Future<Output = Result<Book, BookError>> + Send;

    /// Find book by ID.
    fn find_by_id(
        &self,
        id: BookId,
    ) -> impl std::future::Future<Output = Result<Option<Book>, BookError>> + Send;

    /// List all books, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Book>, BookError>> + Send;

    /// Apply a patch, returning the updated book or `None` if it does not exist.
    fn update(
        &self,
        id: BookId,
        patch: BookPatch,
    ) -> impl std::future::Future<Output = Result<Option<Book>, BookError>> + Send;

    /// Delete book by ID, returning whether it existed.
    fn delete(&self, id: BookId) -> impl std::future::Future<Output = Result<bool, BookError>> + Send;
}

/// Book service for the catalogue and the integrated upload.
pub struct BookService<B: BookRepository, O: ObjectRepository> {
    repo: Arc<B>,
    objects: ObjectService<O>,
}

impl<B: BookRepository, O: ObjectRepository> BookService<B, O> {
    /// Create a new book service.
    #[must_use]
    pub fn new(repo: Arc<B>, objects: ObjectService<O>) -> Self {
        Self { repo, objects }
    }

    /// List all books, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails.
    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        self.repo.list().await
    }

    /// Get book by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if book not found or database operation fails.
    pub async fn get(&self, id: BookId) -> Result<Book, BookError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookError::not_found(id))
    }

    /// Create a book from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the title is missing or blank.
    pub async fn create(&self, input: NewBook) -> Result<Book, BookError> {
        let title = required_title(input.title)?;

        let mut playlist = input.playlist;
        playlist.sort_by_key(|c| c.order);

        let book = self
            .repo
            .insert(CreateBookInput {
                id: BookId::new(),
                title,
                author: input.author,
                summary: input.summary,
                cover: input.cover,
                playlist,
            })
            .await?;

        tracing::info!(book_id = %book.id, "Book created");
        Ok(book)
    }

    /// Update a book with the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the book does not exist, or `Validation` if the
    /// patch carries a blank title.
    pub async fn update(&self, id: BookId, patch: BookPatch) -> Result<Book, BookError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(BookError::validation("title must not be blank"));
        }

        self.repo
            .update(id, patch)
            .await?
            .ok_or_else(|| BookError::not_found(id))
    }

    /// Delete a book. Its stored objects are left in place.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the book does not exist.
    pub async fn delete(&self, id: BookId) -> Result<(), BookError> {
        if self.repo.delete(id).await? {
            tracing::info!(book_id = %id, "Book deleted");
            Ok(())
        } else {
            Err(BookError::not_found(id))
        }
    }

    /// Store a validated upload and create its book.
    ///
    /// Writes the cover, then each chapter in field-index order, and finally
    /// the book record with its playlist sorted by `order` (ties keep upload
    /// order).
    ///
    /// # Errors
    ///
    /// Returns an error if any object cannot be stored or the book record
    /// cannot be created. Objects stored before the failure remain.
    pub async fn upload(&self, upload: BookUpload) -> Result<Book, BookError> {
        let cover_filename = upload.cover.filename.clone();
        let cover = self
            .objects
            .store(upload.cover, ObjectKind::Cover, None)
            .await?;

        let mut playlist = Vec::with_capacity(upload.chapters.len());
        for chapter in upload.chapters {
            let filename = chapter.audio.filename.clone();
            let object = self
                .objects
                .store(chapter.audio, ObjectKind::Audio, Some(chapter.number))
                .await?;

            playlist.push(Chapter {
                file_id: object.id,
                filename,
                title: chapter.title,
                order: chapter.order,
            });
        }
        playlist.sort_by_key(|c| c.order);

        let book = self
            .repo
            .insert(CreateBookInput {
                id: BookId::new(),
                title: upload.title,
                author: upload.author,
                summary: upload.summary,
                cover: Some(CoverRef {
                    file_id: cover.id,
                    filename: cover_filename,
                }),
                playlist,
            })
            .await?;

        tracing::info!(
            book_id = %book.id,
            chapters = book.playlist.len(),
            "Book uploaded"
        );
        Ok(book)
    }
}

fn required_title(title: Option<String>) -> Result<String, BookError> {
    title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| BookError::validation("title is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::BookUploadForm;
    use crate::objects::{NewObject, ObjectError, StoredObject, UploadedFile};
    use crate::storage::StorageService;
    use audiobooks_shared::types::ObjectId;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock book repository for testing.
    #[derive(Default)]
    struct MockBookRepository {
        books: Mutex<Vec<Book>>,
    }

    impl BookRepository for MockBookRepository {
        async fn insert(&self, input: CreateBookInput) -> Result<Book, BookError> {
            let book = Book {
                id: input.id,
                title: input.title,
                author: input.author,
                summary: input.summary,
                cover: input.cover,
                playlist: input.playlist,
                created_at: chrono::Utc::now(),
            };
            self.books.lock().unwrap().push(book.clone());
            Ok(book)
        }

        async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookError> {
            Ok(self.books.lock().unwrap().iter().find(|b| b.id == id).cloned())
        }

        async fn list(&self) -> Result<Vec<Book>, BookError> {
            Ok(self.books.lock().unwrap().iter().rev().cloned().collect())
        }

        async fn update(&self, id: BookId, patch: BookPatch) -> Result<Option<Book>, BookError> {
            let mut books = self.books.lock().unwrap();
            let Some(book) = books.iter_mut().find(|b| b.id == id) else {
                return Ok(None);
            };
            patch.apply_to(book);
            Ok(Some(book.clone()))
        }

        async fn delete(&self, id: BookId) -> Result<bool, BookError> {
            let mut books = self.books.lock().unwrap();
            let before = books.len();
            books.retain(|b| b.id != id);
            Ok(books.len() != before)
        }
    }

    /// Mock object repository for testing.
    #[derive(Default)]
    struct MockObjectRepository {
        objects: Mutex<HashMap<ObjectId, StoredObject>>,
    }

    impl ObjectRepository for MockObjectRepository {
        async fn create(&self, input: NewObject) -> Result<StoredObject, ObjectError> {
            let object = StoredObject {
                id: input.id,
                filename: input.filename,
                content_type: input.content_type,
                length: input.length,
                kind: input.kind,
                chapter: input.chapter,
                created_at: chrono::Utc::now(),
            };
            self.objects
                .lock()
                .unwrap()
                .insert(object.id, object.clone());
            Ok(object)
        }

        async fn find_by_id(&self, id: ObjectId) -> Result<Option<StoredObject>, ObjectError> {
            Ok(self.objects.lock().unwrap().get(&id).cloned())
        }
    }

    fn service() -> (
        BookService<MockBookRepository, MockObjectRepository>,
        Arc<MockObjectRepository>,
    ) {
        let storage = Arc::new(StorageService::in_memory().unwrap());
        let objects_repo = Arc::new(MockObjectRepository::default());
        let objects = ObjectService::new(storage, Arc::clone(&objects_repo));
        (
            BookService::new(Arc::new(MockBookRepository::default()), objects),
            objects_repo,
        )
    }

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: Some(title.to_string()),
            author: Some("Clarice Lispector".to_string()),
            ..NewBook::default()
        }
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile::new(name, Some("audio/mpeg".to_string()), Bytes::from_static(b"0123456789"))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, _) = service();
        let book = service.create(new_book("A Hora da Estrela")).await.unwrap();

        let found = service.get(book.id).await.unwrap();
        assert_eq!(found.title, "A Hora da Estrela");
        assert_eq!(found.author.as_deref(), Some("Clarice Lispector"));
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let (service, _) = service();
        let result = service.create(NewBook::default()).await;
        assert!(matches!(result, Err(BookError::Validation(_))));

        let result = service.create(new_book("  ")).await;
        assert!(matches!(result, Err(BookError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (service, _) = service();
        service.create(new_book("First")).await.unwrap();
        service.create(new_book("Second")).await.unwrap();

        let titles: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_get_missing_book() {
        let (service, _) = service();
        assert!(matches!(
            service.get(BookId::new()).await,
            Err(BookError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let (service, _) = service();
        let book = service.create(new_book("Draft")).await.unwrap();

        let patch = BookPatch {
            title: Some("Final".to_string()),
            ..BookPatch::default()
        };
        let updated = service.update(book.id, patch).await.unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.author, book.author);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() {
        let (service, _) = service();
        let book = service.create(new_book("Draft")).await.unwrap();

        let patch = BookPatch {
            title: Some(String::new()),
            ..BookPatch::default()
        };
        assert!(matches!(
            service.update(book.id, patch).await,
            Err(BookError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_book() {
        let (service, _) = service();
        assert!(matches!(
            service.update(BookId::new(), BookPatch::default()).await,
            Err(BookError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, _) = service();
        let book = service.create(new_book("Gone")).await.unwrap();

        service.delete(book.id).await.unwrap();
        assert!(matches!(
            service.delete(book.id).await,
            Err(BookError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_stores_objects_and_sorts_playlist() {
        let (service, objects) = service();

        let mut form = BookUploadForm::new();
        form.push_file("cover", file("cover.jpg")).unwrap();
        form.push_text("metadata", r#"{"title":"Vidas Secas","author":"Graciliano Ramos"}"#.to_string());
        form.push_file("chapters[0][audio]", file("a.mp3")).unwrap();
        form.push_text("chapters[0][order]", "2".to_string());
        form.push_file("chapters[1][audio]", file("b.mp3")).unwrap();
        form.push_text("chapters[1][order]", "1".to_string());
        form.push_file("chapters[2][audio]", file("c.mp3")).unwrap();
        form.push_text("chapters[2][order]", "2".to_string());

        let book = service.upload(form.validate().unwrap()).await.unwrap();

        assert_eq!(book.title, "Vidas Secas");
        let filenames: Vec<&str> = book.playlist.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(filenames, vec!["b.mp3", "a.mp3", "c.mp3"]);

        let stored = objects.objects.lock().unwrap();
        assert_eq!(stored.len(), 4);

        let cover = book.cover.as_ref().unwrap();
        assert_eq!(cover.filename, "cover.jpg");
        assert_eq!(stored[&cover.file_id].kind, ObjectKind::Cover);

        let first = &stored[&book.playlist[0].file_id];
        assert_eq!(first.kind, ObjectKind::Audio);
        assert_eq!(first.chapter, Some(2));
        assert_eq!(first.length, 10);
    }
}
