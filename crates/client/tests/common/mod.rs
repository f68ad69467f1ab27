//! In-process stub of the recipe backend for client integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

/// Shared state of the stub server.
#[derive(Clone, Default)]
pub struct StubState {
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Dish ids whose toggle answers 500.
    pub failing_toggles: Arc<Mutex<HashSet<String>>>,
    /// Dish ids the signed-in user has favorited.
    pub favorites: Arc<Mutex<HashSet<String>>>,
}

impl StubState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn record(&self, path: String, headers: &HeaderMap, query: HashMap<String, String>, body: Option<Value>) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(RecordedRequest {
            path,
            authorization,
            query,
            body,
        });
    }
}

/// A running stub server.
pub struct StubBackend {
    pub addr: SocketAddr,
    pub state: StubState,
}

impl StubBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Bind the stub on an ephemeral port and serve it in the background.
pub async fn spawn_stub() -> StubBackend {
    let state = StubState::default();
    let app = Router::new()
        .route("/dishes/check-favorites", post(check_favorites))
        .route("/dishes/{id}/toggle-favorite", post(toggle_favorite))
        .route("/users/me/favorites", get(my_favorites))
        .route("/api/recommendations/trending", get(trending))
        .route("/dishes/suggest/today", get(today))
        .route("/search/all", get(search_all))
        .route("/search/dishes-by-ingredients", get(search_by_ingredients))
        .route("/dishes/user/{user_id}", get(user_dishes))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend crashed");
    });

    StubBackend { addr, state }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn check_favorites(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/dishes/check-favorites".into(), &headers, HashMap::new(), Some(body.clone()));
    let favorites = state.favorites.lock().unwrap().clone();
    let map: serde_json::Map<String, Value> = body["dish_ids"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|id| id.as_str())
        .map(|id| (id.to_string(), Value::Bool(favorites.contains(id))))
        .collect();
    Json(Value::Object(map)).into_response()
}

async fn toggle_favorite(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(format!("/dishes/{id}/toggle-favorite"), &headers, HashMap::new(), None);
    if headers.get("authorization").is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.failing_toggles.lock().unwrap().contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "toggle failed").into_response();
    }
    let mut favorites = state.favorites.lock().unwrap();
    if !favorites.remove(&id) {
        favorites.insert(id);
    }
    StatusCode::OK.into_response()
}

async fn my_favorites(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.record("/users/me/favorites".into(), &headers, HashMap::new(), None);
    if headers.get("authorization").is_none() {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }
    let mut ids: Vec<String> = state.favorites.lock().unwrap().iter().cloned().collect();
    ids.sort();
    let records: Vec<Value> = ids
        .into_iter()
        .map(|id| json!({"id": id, "name": format!("dish {id}"), "cooking_time": 30}))
        .collect();
    Json(Value::Array(records)).into_response()
}

async fn trending(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let offset: usize = query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    state.record("/api/recommendations/trending".into(), &headers, query, None);
    let recommendations: Vec<Value> = (offset..offset + 2)
        .map(|i| json!({"dish_id": i + 1, "name": format!("trending {}", i + 1), "difficulty": "hard"}))
        .collect();
    Json(json!({
        "recommendations": recommendations,
        "metadata": {"has_more": offset == 0}
    }))
    .into_response()
}

async fn today(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/dishes/suggest/today".into(), &headers, query, None);
    Json(json!([{"id": 11, "name": "Cơm tấm", "isFavorite": true}])).into_response()
}

async fn search_all(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/search/all".into(), &headers, query, None);
    Json(json!({
        "total_results": 1,
        "dishes": [{"id": "s1", "name": "Phở", "cooking_time": 45}],
        "users": [],
        "ingredients": []
    }))
    .into_response()
}

async fn search_by_ingredients(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/search/dishes-by-ingredients".into(), &headers, query, None);
    Json(json!([{"id": "s2", "name": "Trứng chiên cà chua"}])).into_response()
}

async fn user_dishes(
    State(state): State<StubState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(format!("/dishes/user/{user_id}"), &headers, HashMap::new(), None);
    Json(json!([{"id": 21, "title": "Bánh xèo", "level": "2"}])).into_response()
}
