//! Book routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use super::parse_id;
use crate::{AppState, error::ApiError, multipart};
use audiobooks_core::books::{Book, BookPatch, NewBook};
use audiobooks_shared::types::BookId;

/// Creates the book routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/upload", post(upload_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
}

/// Response for a deletion.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `true` when returned.
    pub success: bool,
}

/// GET `/books` - List books, newest first.
async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.books().list().await?))
}

/// POST `/books` - Create a book from a JSON document.
async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let book = state.books().create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// POST `/books/upload` - Create a book with its cover and chapter audio.
async fn upload_book(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let form = multipart::read_book_form(multipart::accept(multipart)?).await?;
    let upload = form.validate()?;
    let book = state.books().upload(upload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET `/books/{id}` - Fetch one book.
async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let id: BookId = parse_id(&id)?;
    Ok(Json(state.books().get(id).await?))
}

/// PUT `/books/{id}` - Partially update a book.
async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let id: BookId = parse_id(&id)?;
    let Json(patch) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(Json(state.books().update(id, patch).await?))
}

/// DELETE `/books/{id}` - Delete a book record.
async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id: BookId = parse_id(&id)?;
    state.books().delete(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{
        FormPart, app, body_json, empty_db, multipart_body, multipart_content_type, state,
    };
    use audiobooks_db::entities::{books, stored_objects};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use rstest::rstest;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn book_row(title: &str) -> books::Model {
        books::Model {
            id: Uuid::now_v7(),
            title: title.to_string(),
            author: Some("Machado de Assis".to_string()),
            summary: None,
            cover: None,
            playlist: json!([]),
            created_at: Utc::now().into(),
        }
    }

    fn object_row(filename: &str, kind: &str, chapter: Option<i32>) -> stored_objects::Model {
        stored_objects::Model {
            id: Uuid::now_v7(),
            filename: filename.to_string(),
            content_type: "application/octet-stream".to_string(),
            length: 4,
            kind: kind.to_string(),
            chapter,
            created_at: Utc::now().into(),
        }
    }

    fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(parts: &[FormPart<'_>]) -> Request<Body> {
        Request::post("/api/books/upload")
            .header(header::CONTENT_TYPE, multipart_content_type())
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_books() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![book_row("Dom Casmurro"), book_row("Helena")]])
            .into_connection();

        let response = app(state(db))
            .oneshot(Request::get("/api/books").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["title"], "Dom Casmurro");
        assert!(json[0]["_id"].is_string());
    }

    #[rstest]
    #[case("GET")]
    #[case("DELETE")]
    #[tokio::test]
    async fn test_invalid_book_id_returns_400(#[case] method: &str) {
        let response = app(state(empty_db()))
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/api/books/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid ID");
    }

    #[tokio::test]
    async fn test_missing_book_returns_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<books::Model>::new()])
            .into_connection();

        let response = app(state(db))
            .oneshot(
                Request::get(format!("/api/books/{}", Uuid::now_v7()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Book not found");
    }

    #[tokio::test]
    async fn test_create_book_returns_201() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![book_row("Quincas Borba")]])
            .into_connection();

        let response = app(state(db))
            .oneshot(json_request(
                "POST",
                "/api/books",
                &json!({ "title": "Quincas Borba", "author": "Machado de Assis" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["title"], "Quincas Borba");
    }

    #[rstest]
    #[case(json!({ "author": "Anonymous" }))]
    #[case(json!({ "title": "   " }))]
    #[tokio::test]
    async fn test_create_book_without_title_returns_400(#[case] body: serde_json::Value) {
        let response = app(state(empty_db()))
            .oneshot(json_request("POST", "/api/books", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_book_with_malformed_json_returns_400() {
        let response = app(state(empty_db()))
            .oneshot(
                Request::post("/api/books")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_update_blank_title_returns_400() {
        let response = app(state(empty_db()))
            .oneshot(json_request(
                "PUT",
                &format!("/api/books/{}", Uuid::now_v7()),
                &json!({ "title": "" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_book() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let response = app(state(db))
            .oneshot(
                Request::delete(format!("/api/books/{}", Uuid::now_v7()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_upload_without_cover_returns_400() {
        let response = app(state(empty_db()))
            .oneshot(upload_request(&[
                FormPart {
                    name: "metadata",
                    filename: None,
                    data: br#"{"title":"Iracema"}"#,
                },
                FormPart {
                    name: "chapters[0][audio]",
                    filename: Some("01.mp3"),
                    data: b"ID3\x03",
                },
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Cover image is required");
    }

    #[tokio::test]
    async fn test_upload_with_bad_metadata_returns_400() {
        let response = app(state(empty_db()))
            .oneshot(upload_request(&[
                FormPart {
                    name: "cover",
                    filename: Some("cover.jpg"),
                    data: b"jpeg",
                },
                FormPart {
                    name: "metadata",
                    filename: None,
                    data: b"{title:",
                },
                FormPart {
                    name: "chapters[0][audio]",
                    filename: Some("01.mp3"),
                    data: b"mp3!",
                },
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Invalid metadata. Send valid JSON in the \"metadata\" field."
        );
    }

    #[tokio::test]
    async fn test_upload_without_multipart_body_returns_400() {
        let response = app(state(empty_db()))
            .oneshot(json_request("POST", "/api/books/upload", &json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_creates_book() {
        let mut book = book_row("O Guarani");
        book.playlist = json!([
            { "fileId": Uuid::now_v7(), "filename": "b.mp3", "title": "Intro", "order": 1 },
            { "fileId": Uuid::now_v7(), "filename": "a.mp3", "title": "Chapter 1", "order": 2 }
        ]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![object_row("cover.jpg", "cover", None)]])
            .append_query_results([vec![object_row("a.mp3", "audio", Some(1))]])
            .append_query_results([vec![object_row("b.mp3", "audio", Some(2))]])
            .append_query_results([vec![book]])
            .into_connection();

        let response = app(state(db))
            .oneshot(upload_request(&[
                FormPart {
                    name: "cover",
                    filename: Some("cover.jpg"),
                    data: b"jpeg",
                },
                FormPart {
                    name: "metadata",
                    filename: None,
                    data: br#"{"title":"O Guarani"}"#,
                },
                FormPart {
                    name: "chapters[0][audio]",
                    filename: Some("a.mp3"),
                    data: b"mp3a",
                },
                FormPart {
                    name: "chapters[0][order]",
                    filename: None,
                    data: b"2",
                },
                FormPart {
                    name: "chapters[1][audio]",
                    filename: Some("b.mp3"),
                    data: b"mp3b",
                },
                FormPart {
                    name: "chapters[1][title]",
                    filename: None,
                    data: b"Intro",
                },
                FormPart {
                    name: "chapters[1][order]",
                    filename: None,
                    data: b"1",
                },
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["title"], "O Guarani");
        assert_eq!(json["playlist"][0]["title"], "Intro");
        assert_eq!(json["playlist"][1]["order"], 2);
    }
}
