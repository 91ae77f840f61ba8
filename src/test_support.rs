//! Shared fixtures for unit tests: an in-process mock backend and sample data.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::api::ApiClient;
use crate::session::SessionContext;
use crate::token::MemoryTokenStore;

/// Serve `router` on an ephemeral local port and return its origin.
pub async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("listener should have an address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock backend failed");
    });
    format!("http://{addr}")
}

/// Session backed by an in-memory store, optionally holding `token`.
#[must_use]
pub fn test_session(token: Option<&str>) -> (SessionContext, Arc<MemoryTokenStore>) {
    let store = Arc::new(token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token));
    (SessionContext::new(store.clone()), store)
}

/// API client pointed at `base_url` sharing `session`.
#[must_use]
pub fn test_client(base_url: &str, session: SessionContext) -> ApiClient {
    ApiClient::with_http(reqwest::Client::new(), base_url, session)
}

#[must_use]
pub fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "nickname": format!("traveler-{id}"),
        "email": "traveler@example.com",
        "birthYear": 1994,
        "gender": "female",
        "address": "경상북도 경주시",
        "badges": [],
    })
}

/// Wrap `data` in the backend's response envelope.
#[must_use]
pub fn envelope(data: Value) -> Value {
    json!({ "data": data, "message": "ok" })
}

#[must_use]
pub fn feed_item_json(id: i64, like_count: u32, is_liked: bool) -> Value {
    json!({
        "id": id,
        "user": { "id": 7, "nickname": "hiker" },
        "mission": { "id": 3, "name": "텀블러 사용하기", "tag": "생활", "icon": "cup" },
        "createdAt": "2024-05-01T09:00:00Z",
        "likeCount": like_count,
        "isLiked": is_liked,
    })
}
