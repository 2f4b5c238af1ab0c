use std::{collections::HashMap, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use cloud::{MemoryDatabase, PostgrestClient, RemoteDatabase, RemoteError};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const API_KEY: &str = "anon-key";
const TOKEN: &str = "owner-token";

/// Server-side row cap, like PostgREST's `db-max-rows`.
const MAX_ROWS: usize = 1000;

type Params = HashMap<String, String>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message, "code": "PGRST000" }))).into_response()
}

fn remote_error(err: RemoteError) -> Response {
    match err {
        RemoteError::Server { status, message } => error(status, &message),
        other => error(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
    }
}

fn owner(params: &Params) -> Option<&str> {
    params.get("user_id")?.strip_prefix("eq.")
}

/// Apply `offset` and `limit`, never returning more than [`MAX_ROWS`].
fn page<T>(rows: Vec<T>, params: &Params) -> Vec<T> {
    let number = |key: &str| params.get(key).and_then(|v| v.parse::<usize>().ok());
    let limit = number("limit").unwrap_or(MAX_ROWS).min(MAX_ROWS);
    rows.into_iter()
        .skip(number("offset").unwrap_or(0))
        .take(limit)
        .collect()
}

async fn auth(headers: HeaderMap, request: Request, next: Next) -> Result<Response, Response> {
    let api_key = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if api_key != Some(API_KEY) || bearer != Some(format!("Bearer {TOKEN}").as_str()) {
        return Err(error(StatusCode::UNAUTHORIZED, "JWT expired"));
    }
    Ok(next.run(request).await)
}

async fn select(
    State(db): State<MemoryDatabase>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
) -> Response {
    if table == "explode" {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "relation is broken");
    }
    let Some(owner) = owner(&params) else {
        return error(StatusCode::BAD_REQUEST, "missing owner filter");
    };

    let counting = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("count=exact"));
    if counting {
        return match db.count(&table, owner).await {
            Ok(total) => {
                let range = if total == 0 {
                    "*/0".to_string()
                } else {
                    format!("0-0/{total}")
                };
                ([(header::CONTENT_RANGE, range)], Json(json!([]))).into_response()
            }
            Err(err) => remote_error(err),
        };
    }

    match params.get("select").map(String::as_str) {
        Some("id") => match db.select_ids(&table, owner).await {
            Ok(ids) => {
                let rows: Vec<Value> = page(ids, &params)
                    .into_iter()
                    .map(|id| json!({ "id": id }))
                    .collect();
                Json(rows).into_response()
            }
            Err(err) => remote_error(err),
        },
        _ => match db.select(&table, owner).await {
            Ok(rows) => Json(page(rows, &params)).into_response(),
            Err(err) => remote_error(err),
        },
    }
}

async fn upsert(
    State(db): State<MemoryDatabase>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    let merging = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("resolution=merge-duplicates"));
    if params.get("on_conflict").map(String::as_str) != Some("id") || !merging {
        return error(StatusCode::CONFLICT, "duplicate key value");
    }
    match db.upsert(&table, rows).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => remote_error(err),
    }
}

async fn delete(
    State(db): State<MemoryDatabase>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    let Some(owner) = owner(&params) else {
        return error(StatusCode::BAD_REQUEST, "missing owner filter");
    };
    let Some(list) = params
        .get("id")
        .and_then(|v| v.strip_prefix("in.("))
        .and_then(|v| v.strip_suffix(')'))
    else {
        return error(StatusCode::BAD_REQUEST, "missing id filter");
    };
    let ids: Vec<String> = list
        .split(',')
        .map(|id| id.trim_matches('"').to_string())
        .collect();
    match db.delete(&table, owner, &ids).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => remote_error(err),
    }
}

/// Serve a PostgREST look-alike backed by `db` and return its base url.
async fn spawn_server(db: MemoryDatabase) -> String {
    let app = Router::new()
        .route("/rest/v1/{table}", get(select).post(upsert).delete(delete))
        .layer(middleware::from_fn(auth))
        .with_state(db);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(url: &str) -> PostgrestClient {
    PostgrestClient::builder()
        .url(url)
        .api_key(API_KEY)
        .access_token(Some(TOKEN))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn category(id: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "user_id": owner,
        "name": "Food",
        "icon": "Utensils",
        "color": "#ef4444",
        "type": "expense",
        "is_default": true,
    })
}

#[tokio::test]
async fn upsert_select_and_count() {
    let db = MemoryDatabase::new();
    let client = client(&spawn_server(db.clone()).await);

    assert_eq!(client.count("categories", "u1").await.unwrap(), 0);

    client
        .upsert(
            "categories",
            vec![category("c1", "u1"), category("c2", "u1"), category("c3", "u2")],
        )
        .await
        .unwrap();
    client
        .upsert("categories", vec![category("c1", "u1")])
        .await
        .unwrap();

    assert_eq!(client.count("categories", "u1").await.unwrap(), 2);
    assert_eq!(client.count("categories", "u2").await.unwrap(), 1);

    let rows = client.select("categories", "u1").await.unwrap();
    assert_eq!(rows, vec![category("c1", "u1"), category("c2", "u1")]);
    assert_eq!(
        client.select_ids("categories", "u2").await.unwrap(),
        vec!["c3".to_string()]
    );
    assert_eq!(db.count("categories", "u1").await.unwrap(), 2);
}

#[tokio::test]
async fn delete_is_scoped_to_owner() {
    let db = MemoryDatabase::new();
    let client = client(&spawn_server(db.clone()).await);
    client
        .upsert(
            "categories",
            vec![category("c1", "u1"), category("c2", "u1"), category("c3", "u2")],
        )
        .await
        .unwrap();

    client
        .delete(
            "categories",
            "u1",
            &["c1".to_string(), "c3".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(
        db.select_ids("categories", "u1").await.unwrap(),
        vec!["c2".to_string()]
    );
    assert_eq!(
        db.select_ids("categories", "u2").await.unwrap(),
        vec!["c3".to_string()]
    );
}

#[tokio::test]
async fn large_deletes_are_split() {
    let db = MemoryDatabase::new();
    let client = client(&spawn_server(db.clone()).await);
    let rows: Vec<Value> = (0..250)
        .map(|i| category(&format!("c{i:03}"), "u1"))
        .collect();
    client.upsert("categories", rows).await.unwrap();

    let ids = client.select_ids("categories", "u1").await.unwrap();
    client.delete("categories", "u1", &ids).await.unwrap();

    assert_eq!(client.count("categories", "u1").await.unwrap(), 0);
}

#[tokio::test]
async fn selects_read_past_the_server_row_cap() {
    let db = MemoryDatabase::new();
    let rows: Vec<Value> = (0..1500)
        .map(|i| category(&format!("c{i:04}"), "u1"))
        .collect();
    db.upsert("categories", rows).await.unwrap();
    db.upsert("categories", vec![category("other", "u2")])
        .await
        .unwrap();
    let client = client(&spawn_server(db.clone()).await);

    let rows = client.select("categories", "u1").await.unwrap();
    assert_eq!(rows.len(), 1500);
    assert_eq!(rows[0], category("c0000", "u1"));
    assert_eq!(rows[1499], category("c1499", "u1"));

    let ids = client.select_ids("categories", "u1").await.unwrap();
    assert_eq!(ids, db.select_ids("categories", "u1").await.unwrap());
    assert_eq!(ids.len(), 1500);
}

#[tokio::test]
async fn error_body_message_is_kept() {
    let client = client(&spawn_server(MemoryDatabase::new()).await);

    let err = client.select("explode", "u1").await.unwrap_err();
    let RemoteError::Server { status, message } = err else {
        panic!("expected server error, got {err:?}");
    };
    assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message, "relation is broken");
}

#[tokio::test]
async fn credentials_are_sent_on_every_request() {
    let url = spawn_server(MemoryDatabase::new()).await;

    let anonymous = PostgrestClient::builder()
        .url(&url)
        .api_key(API_KEY)
        .build()
        .unwrap();
    let err = anonymous.count("categories", "u1").await.unwrap_err();
    assert!(matches!(
        err,
        RemoteError::Server { status, .. } if status == reqwest::StatusCode::UNAUTHORIZED
    ));

    assert_eq!(client(&url).count("categories", "u1").await.unwrap(), 0);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url).select("goals", "u1").await.unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}
