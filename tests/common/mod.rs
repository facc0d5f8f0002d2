//! Shared utilities for integration testing.
//!
//! All four microservices are mocked by one axum app since their paths never overlap.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use jsonwebtoken::{EncodingKey, Header};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use movie_gateway::cache::MovieCache;
use movie_gateway::config::GatewayConfig;
use movie_gateway::lifecycle::Shutdown;
use movie_gateway::HttpServer;

pub const SECRET: &str = "integration-secret";
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "hunter2";

/// Canned data plus a log of the calls the gateway made.
#[derive(Clone)]
pub struct Mock {
    pub movies: Vec<Value>,
    pub users: Vec<Value>,
    pub reviews: Vec<Value>,
    pub relationships: Vec<Value>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub bodies: Arc<Mutex<Vec<Value>>>,
    /// Users whose lookup answers 500.
    pub failing_users: Arc<Mutex<Vec<Uuid>>>,
}

impl Mock {
    pub fn new() -> Self {
        let movies: Vec<Value> = [
            ("The Matrix", 1999),
            ("Blade Runner", 1982),
            ("Amélie", 2001),
        ]
        .iter()
        .map(|(title, year)| {
            json!({
                "id": Uuid::new_v4(),
                "title": title,
                "director": "Someone",
                "year": year,
                "country": "USA",
                "category": "Drama",
                "poster_url": "https://img.example/poster.jpg"
            })
        })
        .collect();

        let users: Vec<Value> = ["Ada", "Grace", "Linus"]
            .iter()
            .map(|name| json!({ "id": Uuid::new_v4(), "name": name }))
            .collect();

        let reviews = vec![
            review(&users[0], &movies[0], 9, Some("Loved it")),
            review(&users[1], &movies[0], 7, None),
            review(&users[1], &movies[2], 8, Some("Charming")),
        ];

        let relationships = vec![
            json!({ "user_id": users[1]["id"], "followed_user_id": users[0]["id"] }),
            json!({ "user_id": users[2]["id"], "followed_user_id": users[0]["id"] }),
        ];

        Self {
            movies,
            users,
            reviews,
            relationships,
            calls: Arc::new(Mutex::new(Vec::new())),
            bodies: Arc::new(Mutex::new(Vec::new())),
            failing_users: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn user_id(&self, i: usize) -> Uuid {
        id_of(&self.users[i])
    }

    pub fn movie_id(&self, i: usize) -> Uuid {
        id_of(&self.movies[i])
    }

    pub fn review_id(&self, i: usize) -> Uuid {
        id_of(&self.reviews[i])
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.bodies.lock().unwrap().last().cloned()
    }

    pub fn fail_user(&self, id: Uuid) {
        self.failing_users.lock().unwrap().push(id);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn find(list: &[Value], id: Uuid) -> Option<Value> {
        list.iter().find(|v| id_of(v) == id).cloned()
    }
}

fn review(user: &Value, movie: &Value, rating: i32, comment: Option<&str>) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": user["id"],
        "movie_id": movie["id"],
        "rating": rating,
        "comment": comment,
        "created": "2021-05-01T12:00:00"
    })
}

fn id_of(v: &Value) -> Uuid {
    v["id"].as_str().and_then(|s| s.parse().ok()).unwrap()
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": format!("{what} not found") }))).into_response()
}

#[derive(Deserialize, Default)]
struct Page {
    skip: Option<usize>,
    limit: Option<usize>,
    sort: Option<String>,
    sort_dir: Option<String>,
}

impl Page {
    fn slice(&self, list: &[Value]) -> Vec<Value> {
        list.iter()
            .skip(self.skip.unwrap_or(0))
            .take(self.limit.unwrap_or(100))
            .cloned()
            .collect()
    }

    fn describe(&self) -> String {
        format!(
            "skip={:?} limit={:?} sort={:?} sort_dir={:?}",
            self.skip, self.limit, self.sort, self.sort_dir
        )
    }
}

fn envelope(key: &str, items: Vec<Value>, total: usize) -> Json<Value> {
    Json(json!({ key: items, "info": { "count": items.len(), "totalCount": total } }))
}

async fn list_movies(State(m): State<Mock>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/movies/ {}", p.describe()));
    envelope("movies", p.slice(&m.movies), m.movies.len())
}

async fn get_movie(State(m): State<Mock>, Path(id): Path<Uuid>) -> Response {
    m.record(format!("GET /api/movies/{id}"));
    match Mock::find(&m.movies, id) {
        Some(movie) => Json(movie).into_response(),
        None => not_found("Movie"),
    }
}

async fn add_movie(State(m): State<Mock>, Json(mut body): Json<Value>) -> Json<Value> {
    m.record("POST /api/movies/add".to_string());
    m.bodies.lock().unwrap().push(body.clone());
    body["id"] = json!(Uuid::new_v4());
    Json(body)
}

async fn list_reviews(State(m): State<Mock>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/reviews/ {}", p.describe()));
    envelope("reviews", p.slice(&m.reviews), m.reviews.len())
}

/// Movie IDs ranked by rating: the reverse of the catalogue order.
async fn ranked_movies(State(m): State<Mock>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/reviews/movies {}", p.describe()));
    let ids: Vec<Value> = m.movies.iter().rev().map(|v| v["id"].clone()).collect();
    Json(Value::Array(p.slice(&ids)))
}

async fn reviews_of_movie(State(m): State<Mock>, Path(id): Path<Uuid>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/reviews/movie/{id}/reviews"));
    let matching: Vec<Value> = m.reviews.iter().filter(|r| r["movie_id"] == json!(id)).cloned().collect();
    envelope("reviews", p.slice(&matching), matching.len())
}

async fn reviews_of_user(State(m): State<Mock>, Path(id): Path<Uuid>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/reviews/user/{id}/reviews"));
    let matching: Vec<Value> = m.reviews.iter().filter(|r| r["user_id"] == json!(id)).cloned().collect();
    envelope("reviews", p.slice(&matching), matching.len())
}

async fn review_of_movie_by_user(State(m): State<Mock>, Path((movie, user)): Path<(Uuid, Uuid)>) -> Response {
    m.record(format!("GET /api/reviews/movie/{movie}/user/{user}"));
    m.reviews
        .iter()
        .find(|r| r["movie_id"] == json!(movie) && r["user_id"] == json!(user))
        .map(|r| Json(r.clone()).into_response())
        .unwrap_or_else(|| not_found("Review"))
}

async fn get_review(State(m): State<Mock>, Path(id): Path<Uuid>) -> Response {
    m.record(format!("GET /api/reviews/review/{id}"));
    match Mock::find(&m.reviews, id) {
        Some(review) => Json(review).into_response(),
        None => not_found("Review"),
    }
}

async fn delete_review(State(m): State<Mock>, Path(id): Path<Uuid>) -> Response {
    m.record(format!("DELETE /api/reviews/review/{id}"));
    match Mock::find(&m.reviews, id) {
        Some(review) => Json(review).into_response(),
        None => not_found("Review"),
    }
}

async fn new_review(State(m): State<Mock>, Json(mut body): Json<Value>) -> Json<Value> {
    m.record("POST /api/reviews/new".to_string());
    m.bodies.lock().unwrap().push(body.clone());
    body["id"] = json!(Uuid::new_v4());
    body["created"] = json!("2021-06-01T08:00:00");
    Json(body)
}

async fn list_users(State(m): State<Mock>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/users/ {}", p.describe()));
    Json(Value::Array(p.slice(&m.users)))
}

async fn get_user(State(m): State<Mock>, Path(id): Path<Uuid>) -> Response {
    m.record(format!("GET /api/users/{id}"));
    if m.failing_users.lock().unwrap().contains(&id) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match Mock::find(&m.users, id) {
        Some(user) => Json(user).into_response(),
        None => not_found("User"),
    }
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn access_token(State(m): State<Mock>, Form(form): Form<LoginForm>) -> Response {
    m.record("POST /api/users/login/access-token".to_string());
    if form.username != EMAIL || form.password != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Incorrect email or password" })),
        )
            .into_response();
    }
    let token = mint_token(m.user_id(0));
    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

async fn followers_of(State(m): State<Mock>, Path(id): Path<Uuid>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/relationships/following/{id} {}", p.describe()));
    let rels: Vec<Value> = m
        .relationships
        .iter()
        .filter(|r| r["followed_user_id"] == json!(id))
        .cloned()
        .collect();
    envelope("relationships", p.slice(&rels), rels.len())
}

async fn followed_by(State(m): State<Mock>, Path(id): Path<Uuid>, Query(p): Query<Page>) -> Json<Value> {
    m.record(format!("GET /api/relationships/followed-by/{id}"));
    let rels: Vec<Value> = m.relationships.iter().filter(|r| r["user_id"] == json!(id)).cloned().collect();
    envelope("relationships", p.slice(&rels), rels.len())
}

async fn is_follower(State(m): State<Mock>, Path((user, followed)): Path<(Uuid, Uuid)>) -> Json<bool> {
    m.record(format!("GET /api/relationships/users/{user}/followers/{followed}"));
    Json(
        m.relationships
            .iter()
            .any(|r| r["user_id"] == json!(user) && r["followed_user_id"] == json!(followed)),
    )
}

async fn follow(State(m): State<Mock>, Json(body): Json<Value>) -> Json<Value> {
    m.record("POST /api/relationships/follow".to_string());
    m.bodies.lock().unwrap().push(body.clone());
    Json(body)
}

async fn unfollow(State(m): State<Mock>, Json(body): Json<Value>) -> Json<Value> {
    m.record("DELETE /api/relationships/unfollow".to_string());
    m.bodies.lock().unwrap().push(body.clone());
    Json(body)
}

fn mock_router(mock: Mock) -> Router {
    Router::new()
        .route("/api/movies/", get(list_movies))
        .route("/api/movies/add", post(add_movie))
        .route("/api/movies/{id}", get(get_movie))
        .route("/api/reviews/", get(list_reviews))
        .route("/api/reviews/movies", get(ranked_movies))
        .route("/api/reviews/new", post(new_review))
        .route("/api/reviews/movie/{id}/reviews", get(reviews_of_movie))
        .route("/api/reviews/movie/{movie}/user/{user}", get(review_of_movie_by_user))
        .route("/api/reviews/user/{id}/reviews", get(reviews_of_user))
        .route("/api/reviews/review/{id}", get(get_review).delete(delete_review))
        .route("/api/users/", get(list_users))
        .route("/api/users/login/access-token", post(access_token))
        .route("/api/users/{id}", get(get_user))
        .route("/api/relationships/following/{id}", get(followers_of))
        .route("/api/relationships/followed-by/{id}", get(followed_by))
        .route("/api/relationships/users/{user}/followers/{followed}", get(is_follower))
        .route("/api/relationships/follow", post(follow))
        .route("/api/relationships/unfollow", axum::routing::delete(unfollow))
        .with_state(mock)
}

/// Serve `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

pub async fn start_mock_services(mock: Mock) -> SocketAddr {
    serve(mock_router(mock)).await
}

/// Gateway config pointing every upstream at `services`.
pub fn test_config(services: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    let base = format!("http://{services}");
    config.upstreams.movies_url = base.clone();
    config.upstreams.reviews_url = base.clone();
    config.upstreams.users_url = base.clone();
    config.upstreams.relationships_url = base;
    config.auth.secret_key = SECRET.to_string();
    config.retries.base_delay_ms = 10;
    config.retries.budget_ratio = 1.0;
    config
}

pub struct Gateway {
    pub url: String,
    pub shutdown: Shutdown,
}

pub async fn start_gateway(config: GatewayConfig, cache: MovieCache) -> Gateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, cache).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    Gateway { url, shutdown }
}

/// Mock services plus a gateway in front of them.
pub async fn setup() -> (Mock, Gateway) {
    let mock = Mock::new();
    let services = start_mock_services(mock.clone()).await;
    let gateway = start_gateway(test_config(services), MovieCache::memory()).await;
    (mock, gateway)
}

pub fn mint_token(sub: Uuid) -> String {
    let exp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600;
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "sub": sub, "exp": exp }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
