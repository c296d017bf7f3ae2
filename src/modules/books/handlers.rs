//! HTTP handlers for the books module.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bookshelf_http::{
    error::{AppError, ErrorBody, ProblemDetails},
    extract::RequestOrigin,
};
use utoipa::OpenApi;

use super::command::{CreateBookCommand, ValidationError};
use super::models::BookError;
use super::response::{BookResponse, BooksResponse};
use super::service::BookService;

pub const BOOKS_PATH: &str = "/books";
const BOOK_PATH: &str = "/books/{id}";

const VALIDATION_TITLE: &str = "request validation error is occurred.";
const INVALID_BOOK_ID: &str = "Invalid book ID";

/// Shared state for the books handlers.
#[derive(Clone)]
pub struct BooksState {
    pub service: Arc<dyn BookService>,
    /// Upper bound on each downstream call made while serving a request.
    pub deadline: Duration,
}

impl BooksState {
    pub fn new(service: Arc<dyn BookService>, deadline: Duration) -> Self {
        Self { service, deadline }
    }

    /// Await a service call within the request deadline. Dropping the future
    /// on expiry cancels the in-flight storage call.
    async fn call<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, BookError>>,
    {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => result
                .map_err(|e| AppError::Internal(anyhow::Error::new(e).context(operation))),
            Err(_) => Err(AppError::Internal(anyhow!(
                "{} exceeded deadline of {:?}",
                operation,
                self.deadline
            ))),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(
            err.kind.problem_type(),
            VALIDATION_TITLE,
            err.to_string(),
            BOOKS_PATH,
        )
    }
}

pub fn routes(state: BooksState) -> Router {
    Router::new()
        .route(BOOKS_PATH, get(list_books).post(create_book))
        .route(BOOK_PATH, get(get_book))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(list_books, create_book, get_book),
    components(schemas(BookResponse, BooksResponse, CreateBookCommand, ProblemDetails, ErrorBody)),
    tags((name = "Books", description = "Book catalogue"))
)]
pub struct BooksApi;

/// List every stored book
#[utoipa::path(
    get,
    path = "/books",
    tag = "Books",
    responses(
        (status = 200, description = "List of books", body = BooksResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_books(State(state): State<BooksState>) -> Result<Json<BooksResponse>, AppError> {
    let books = state.call("fetch books", state.service.fetch_all()).await?;
    Ok(Json(BooksResponse::from(books)))
}

/// Create a book; the new resource URL is returned in `Location`
#[utoipa::path(
    post,
    path = "/books",
    tag = "Books",
    request_body = CreateBookCommand,
    responses(
        (status = 201, description = "Book created",
            headers(("Location" = String, description = "Absolute URL of the new book"))),
        (status = 400, description = "Request validation error", body = ProblemDetails),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_book(
    State(state): State<BooksState>,
    origin: RequestOrigin,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map_err(|rejection| {
        anyhow!("unable to read create book request: {}", rejection.body_text())
    })?;
    let command = decode_command(&headers, &body)?;

    let new_book = command.validate()?;
    let book = state.call("create book", state.service.create(new_book)).await?;

    let location = origin.url(&format!("{}/{}", BOOKS_PATH, book.id));
    let location = HeaderValue::from_str(&location)
        .with_context(|| format!("invalid Location header value '{}'", location))?;

    tracing::info!(id = book.id, "book created");
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

/// Decode a create request body. An empty body or a JSON `null` is a command
/// with every field absent, so validation reports the first missing field.
fn decode_command(headers: &HeaderMap, body: &[u8]) -> anyhow::Result<CreateBookCommand> {
    if body.is_empty() {
        return Ok(CreateBookCommand::default());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("application/json") {
        return Err(anyhow!(
            "unsupported content type '{}' for create book request",
            content_type
        ));
    }

    let command: Option<CreateBookCommand> =
        serde_json::from_slice(body).context("unable to decode create book request")?;
    Ok(command.unwrap_or_default())
}

/// Fetch one book by id
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 400, description = "Identifier is not an integer", body = ErrorBody),
        (status = 500, description = "Internal server error, including unknown ids", body = ErrorBody)
    )
)]
pub async fn get_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::bad_request(INVALID_BOOK_ID))?;
    // Ids are INTEGER in storage; a wider value can never match a stored book.
    let id = i32::try_from(id).map_err(|_| anyhow!("book {} not found", id))?;

    let book = state.call("find book", state.service.find_by_id(id)).await?;
    Ok(Json(BookResponse::from(book)))
}
