use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

/// Body served by `/malformed`: a 200 whose JSON does not parse.
pub const MALFORMED_BODY: &str = "{id:}";

/// Body of every 404 produced by the item routes.
pub const NOT_FOUND_BODY: &str = "not found";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewItem {
    pub name: String,
}

/// The same item rendered with PascalCase keys, as some upstream services do.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyItem<'a> {
    id: u64,
    name: &'a str,
}

#[derive(Default)]
pub struct Store {
    items: RwLock<BTreeMap<u64, Item>>,
    next_id: AtomicU64,
}

impl Store {
    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    let db: Db = Arc::new(Store::default());
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/legacy/items/{id}", get(get_legacy_item))
        .route("/malformed", get(malformed))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let items = db.items.read().await;
    Json(items.values().cloned().collect())
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<NewItem>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: db.allocate_id(),
        name: input.name,
    };
    db.items.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Item>, (StatusCode, &'static str)> {
    let items = db.items.read().await;
    items.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn get_legacy_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    let items = db.items.read().await;
    let item = items.get(&id).ok_or_else(not_found)?;
    let body = serde_json::to_string(&LegacyItem {
        id: item.id,
        name: &item.name,
    })
    .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "encoding failed"))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NewItem>,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let mut items = db.items.write().await;
    let item = items.get_mut(&id).ok_or_else(not_found)?;
    item.name = input.name;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let mut items = db.items.write().await;
    items
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

async fn malformed() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        MALFORMED_BODY,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_to_json() {
        let item = Item {
            id: 1,
            name: "a".to_string(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"a"}"#);
    }

    #[test]
    fn legacy_item_uses_pascal_case() {
        let json = serde_json::to_string(&LegacyItem { id: 1, name: "a" }).unwrap();
        assert_eq!(json, r#"{"Id":1,"Name":"a"}"#);
    }

    #[test]
    fn new_item_rejects_missing_name() {
        let result: Result<NewItem, _> = serde_json::from_str(r#"{"id":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let store = Store::default();
        assert_eq!(store.allocate_id(), 1);
        assert_eq!(store.allocate_id(), 2);
    }
}
