#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use bookshelf::{connection::StoreConnection, create_app};
use bookshelf_core::{
    backend::StoreBackend,
    error::{DocumentStoreError, DocumentStoreResult},
    store::{DocumentStore, IntoDynDocumentStore},
};
use bookshelf_memory::InMemoryStore;
use bson::Bson;
use serde_json::Value;
use tower::ServiceExt;

/// Backend that refuses every operation.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl StoreBackend for FailingStore {
    async fn list_documents(&self, _collection: &str) -> DocumentStoreResult<Vec<(String, Bson)>> {
        Err(DocumentStoreError::Backend("unavailable".into()))
    }

    async fn get_document(&self, _id: &str, _collection: &str) -> DocumentStoreResult<Option<Bson>> {
        Err(DocumentStoreError::Backend("unavailable".into()))
    }

    async fn add_document(&self, _document: Bson, _collection: &str) -> DocumentStoreResult<String> {
        Err(DocumentStoreError::Backend("unavailable".into()))
    }

    async fn update_document(&self, _id: &str, _fields: Bson, _collection: &str) -> DocumentStoreResult<()> {
        Err(DocumentStoreError::Backend("unavailable".into()))
    }

    async fn delete_document(&self, _id: &str, _collection: &str) -> DocumentStoreResult<()> {
        Err(DocumentStoreError::Backend("unavailable".into()))
    }
}

pub fn memory_app() -> Router {
    let store = DocumentStore::new(InMemoryStore::new()).into_dyn();
    create_app(Arc::new(StoreConnection::established(store))).unwrap()
}

pub fn failing_app() -> Router {
    let store = DocumentStore::new(FailingStore).into_dyn();
    create_app(Arc::new(StoreConnection::established(store))).unwrap()
}

/// An app whose store connection has been closed and cannot come back.
pub async fn disconnected_app() -> Router {
    let store = DocumentStore::new(InMemoryStore::new()).into_dyn();
    let connection = StoreConnection::established(store);
    connection.close().await.unwrap();

    create_app(Arc::new(connection)).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn page_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "text/html,application/xhtml+xml");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::empty()).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// The `name=value` pair of the session cookie the response set.
pub fn session_cookie(response: &Response<Body>) -> String {
    response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}
