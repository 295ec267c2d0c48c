//! A small book catalog served two ways over one document store.
//!
//! - **HTML pages** ([`web`]) - list, view, add, edit and delete books in a browser, with
//!   flash messages carried in a cookie session ([`session`])
//! - **JSON API** ([`api`]) - the same operations under `/api/books`, answered with a
//!   uniform [`api::Envelope`]
//!
//! Both surfaces run the same workflow ([`workflow`]): payload validation
//! ([`validation`]), then a single call into the [`repository::BookRepository`]. The store
//! behind it is connected lazily on first use ([`connection`]) and may be the in-memory
//! backend or MongoDB.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookshelf::{create_app, connection::{StoreConnection, StoreSettings}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let connection = Arc::new(StoreConnection::new(StoreSettings::Memory));
//!     let app = create_app(connection)?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode, Uri, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use minijinja::context;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod connection;
pub mod logging;
pub mod model;
pub mod negotiate;
pub mod repository;
pub mod session;
pub mod templates;
pub mod validation;
pub mod web;
pub mod workflow;

use crate::{
    connection::StoreConnection,
    repository::BookRepository,
    session::FlashStore,
    templates::{TemplateError, Templates},
};

/// Largest request body accepted, in bytes.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repository: BookRepository,
    pub templates: Arc<Templates>,
    pub flash: FlashStore,
}

impl AppState {
    pub fn new(connection: Arc<StoreConnection>) -> Result<Self, TemplateError> {
        Ok(Self {
            repository: BookRepository::new(connection),
            templates: Arc::new(Templates::new()?),
            flash: FlashStore::new(),
        })
    }
}

/// Builds the application router over the given store connection.
pub fn create_app(connection: Arc<StoreConnection>) -> Result<Router, TemplateError> {
    Ok(router(AppState::new(connection)?))
}

pub fn router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(web::list_books))
        .route("/books", get(web::list_books))
        .route("/books/add", get(web::add_form))
        .route("/books/save-book", post(web::save_book))
        .route(
            "/books/{id}",
            get(web::show_book)
                .post(web::update_book)
                .delete(web::delete_book),
        )
        .route("/books/{id}/edit", get(web::edit_form))
        .route_layer(middleware::from_fn_with_state(
            state.flash.clone(),
            session::session_layer,
        ));

    let api = Router::new()
        .route("/api/books", get(api::list_books))
        .route("/api/books/save", post(api::save_book))
        .route(
            "/api/books/{id}",
            get(api::get_book)
                .post(api::update_book)
                .delete(api::delete_book),
        );

    pages
        .merge(api)
        .method_not_allowed_fallback(not_found)
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn not_found(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    if path.starts_with("/api/") {
        return api::endpoint_not_found().into_response();
    }

    match state.templates.render(templates::NOT_FOUND, context! { path }) {
        Ok(page) => (StatusCode::NOT_FOUND, page).into_response(),
        Err(e) => e.into_response(),
    }
}
