//! API documentation and liveness.

use std::sync::OnceLock;

use axum::{
    response::{Html, Redirect},
    Json,
};
use serde_json::{json, Value};

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Movie Reviews API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({
      url: "/openapi.json",
      dom_id: "#swagger-ui",
      displayOperationId: true,
      displayRequestDuration: true,
      operationsSorter: "alpha",
      tagsSorter: "alpha"
    });
  </script>
</body>
</html>
"##;

/// `GET /`
pub async fn redirect_to_docs() -> Redirect {
    Redirect::temporary("/docs")
}

/// `GET /docs`
pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

/// `GET /openapi.json`
pub async fn openapi() -> Json<Value> {
    static DOCUMENT: OnceLock<Value> = OnceLock::new();
    Json(DOCUMENT.get_or_init(document).clone())
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn list_params(sorts: &[&str]) -> Value {
    let mut params = vec![
        json!({ "$ref": "#/components/parameters/limit" }),
        json!({ "$ref": "#/components/parameters/skip" }),
    ];
    if !sorts.is_empty() {
        params.push(json!({
            "in": "query", "name": "sort", "required": false,
            "schema": { "type": "string", "enum": sorts },
            "description": "Sorting criteria."
        }));
        params.push(json!({ "$ref": "#/components/parameters/sort_dir" }));
    }
    Value::Array(params)
}

fn ok(description: &str, schema: Value) -> Value {
    json!({ "description": description, "content": { "application/json": { "schema": schema } } })
}

fn list_of(key: &str, item: &str) -> Value {
    json!({
        "type": "object",
        "required": [key, "info"],
        "properties": {
            key: { "type": "array", "items": { "$ref": format!("#/components/schemas/{item}") } },
            "info": { "$ref": "#/components/schemas/ListInfo" }
        }
    })
}

fn schema(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "Movie Reviews API", "version": "1.0.0" },
        "servers": [{ "url": "/v1" }],
        "paths": paths(),
        "components": components()
    })
}

fn paths() -> Value {
    let secured = json!([{ "JwtBearerAuth": [] }, { "JwtCookieAuth": [] }]);
    let id = json!({ "$ref": "#/components/parameters/id" });
    let follower_id = json!({
        "in": "path", "name": "follower_id", "required": true,
        "schema": { "type": "string", "format": "uuid" }, "description": "Follower ID as UUID v4"
    });
    let validation = json!({ "$ref": "#/components/responses/ValidationError" });
    let no_content = json!({ "description": "Done." });

    let mut movie_review_params = vec![id.clone()];
    if let Value::Array(params) = list_params(&["created", "rating"]) {
        movie_review_params.extend(params);
    }

    json!({
        "/auth/authorize": { "post": {
            "operationId": "authorize", "tags": ["auth"], "summary": "Obtain JWT token",
            "requestBody": { "content": { "application/x-www-form-urlencoded": { "schema": schema("LogInCredentials") } } },
            "responses": { "200": ok("JWT token.", schema("Token")), "422": validation }
        }},
        "/auth/log-in": { "post": {
            "operationId": "logIn", "tags": ["auth"], "summary": "Obtain JWT token in session cookie",
            "requestBody": { "content": { "application/json": { "schema": schema("LogInCredentials") } } },
            "responses": { "200": ok("User details.", schema("User")), "400": { "description": "Already logged in." }, "422": validation }
        }},
        "/auth/log-out": { "get": {
            "operationId": "logOut", "tags": ["auth"], "summary": "Drop JWT token session cookie",
            "responses": { "200": { "description": "Logged out successfully." } }
        }},
        "/movies": {
            "get": {
                "operationId": "getMovies", "tags": ["movies"], "summary": "Retrieve a list of movies",
                "parameters": list_params(&["year", "title", "avg_rating", "rating_count"]),
                "responses": { "200": ok("List of movies.", list_of("movies", "Movie")), "422": validation }
            },
            "post": {
                "operationId": "addMovie", "tags": ["movies"], "summary": "Add movie", "security": secured,
                "requestBody": { "content": { "application/json": { "schema": schema("CreateMovie") } } },
                "responses": { "200": ok("Movie created successfully.", schema("Movie")), "422": validation }
            }
        },
        "/movies/{id}": { "get": {
            "operationId": "getMovieById", "tags": ["movies"], "summary": "Get movie by ID",
            "parameters": [id],
            "responses": { "200": ok("Movie details.", schema("Movie")), "422": validation }
        }},
        "/movies/{id}/reviews": { "get": {
            "operationId": "getMovieReviews", "tags": ["reviews"], "summary": "Retrieve reviews of a movie",
            "parameters": movie_review_params,
            "responses": { "200": ok("List of reviews.", list_of("reviews", "Review")), "422": validation }
        }},
        "/reviews": {
            "get": {
                "operationId": "getReviews", "tags": ["reviews"], "summary": "Retrieve a list of reviews",
                "parameters": list_params(&["created", "rating"]),
                "responses": { "200": ok("List of reviews.", list_of("reviews", "Review")), "422": validation }
            },
            "post": {
                "operationId": "addReview", "tags": ["reviews"], "summary": "Add review", "security": secured,
                "requestBody": { "content": { "application/json": { "schema": schema("CreateReview") } } },
                "responses": { "200": ok("Review created successfully.", schema("Review")), "401": { "description": "Not the author." }, "422": validation }
            }
        },
        "/reviews/{id}": { "delete": {
            "operationId": "deleteReview", "tags": ["reviews"], "summary": "Delete review", "security": secured,
            "parameters": [id],
            "responses": { "204": no_content, "401": { "description": "Not the author." }, "422": validation }
        }},
        "/users": { "get": {
            "operationId": "getUsers", "tags": ["users"], "summary": "Retrieve a list of users",
            "parameters": list_params(&[]),
            "responses": { "200": ok("List of users.", list_of("users", "User")) }
        }},
        "/users/me": { "get": {
            "operationId": "getCurrentUser", "tags": ["users"], "summary": "Get the logged-in user", "security": secured,
            "responses": { "200": ok("User details.", schema("User")), "401": { "description": "Missing or invalid token." } }
        }},
        "/users/{id}": { "get": {
            "operationId": "getUserById", "tags": ["users"], "summary": "Get user by ID",
            "parameters": [id],
            "responses": { "200": ok("User details.", schema("User")), "422": validation }
        }},
        "/users/{id}/reviews": { "get": {
            "operationId": "getUserReviews", "tags": ["reviews"], "summary": "Retrieve reviews by a user",
            "parameters": [id],
            "responses": { "200": ok("List of reviews.", list_of("reviews", "Review")), "422": validation }
        }},
        "/users/{id}/followers": { "get": {
            "operationId": "getFollowers", "tags": ["relations"], "summary": "Retrieve followers of a user",
            "parameters": [id],
            "responses": { "200": ok("List of users.", list_of("users", "User")), "422": validation }
        }},
        "/users/{id}/follows": { "get": {
            "operationId": "getFollowed", "tags": ["relations"], "summary": "Retrieve users followed by a user",
            "parameters": [id],
            "responses": { "200": ok("List of users.", list_of("users", "User")), "422": validation }
        }},
        "/users/{id}/followers/{follower_id}": {
            "post": {
                "operationId": "follow", "tags": ["relations"], "summary": "Follow a user", "security": secured,
                "parameters": [id, follower_id],
                "responses": { "204": no_content, "401": { "description": "Not the follower." }, "422": validation }
            },
            "delete": {
                "operationId": "unfollow", "tags": ["relations"], "summary": "Unfollow a user", "security": secured,
                "parameters": [id, follower_id],
                "responses": { "204": no_content, "401": { "description": "Not the follower." }, "422": validation }
            }
        }
    })
}

fn components() -> Value {
    json!({
        "securitySchemes": {
            "JwtBearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" },
            "JwtCookieAuth": { "type": "apiKey", "in": "cookie", "name": "token" }
        },
        "parameters": {
            "id": { "in": "path", "name": "id", "required": true, "schema": { "type": "string", "format": "uuid" }, "description": "Object ID as UUID v4" },
            "limit": { "in": "query", "name": "limit", "required": false, "schema": { "type": "integer", "minimum": 1, "default": 100 }, "description": "Maximum number of elements to fetch." },
            "skip": { "in": "query", "name": "skip", "required": false, "schema": { "type": "integer", "minimum": 0, "default": 0 }, "description": "Offset for selecting sorted items." },
            "sort_dir": { "in": "query", "name": "sort_dir", "required": false, "schema": { "$ref": "#/components/schemas/SortDir" }, "description": "Sorting direction. Used only when \"sort\" is defined." }
        },
        "responses": {
            "ValidationError": ok("Validation error.", schema("HTTPValidationError"))
        },
        "schemas": schemas()
    })
}

fn schemas() -> Value {
    json!({
        "SortDir": { "type": "string", "enum": ["asc", "desc"], "default": "asc" },
        "ListInfo": {
            "type": "object", "required": ["count", "totalCount"],
            "properties": { "count": { "type": "integer" }, "totalCount": { "type": "integer" } }
        },
        "LogInCredentials": {
            "type": "object", "required": ["username", "password"],
            "properties": { "username": { "type": "string", "format": "email" }, "password": { "type": "string" } }
        },
        "Token": {
            "type": "object", "required": ["access_token", "token_type"],
            "properties": { "access_token": { "type": "string" }, "token_type": { "type": "string", "enum": ["bearer"] } }
        },
        "Movie": {
            "type": "object",
            "required": ["id", "slug", "title", "director", "year", "country", "category", "poster_url"],
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "slug": { "type": "string" },
                "title": { "type": "string" },
                "director": { "type": "string" },
                "year": { "type": "integer" },
                "country": { "type": "string" },
                "category": { "type": "string" },
                "poster_url": { "type": "string", "format": "uri" },
                "background_url": { "type": "string", "format": "uri" },
                "review": schema("Review")
            }
        },
        "CreateMovie": {
            "type": "object",
            "required": ["title", "director", "year", "country", "category", "poster_url"],
            "properties": {
                "title": { "type": "string" },
                "director": { "type": "string" },
                "year": { "type": "integer", "minimum": 1000 },
                "country": { "type": "string" },
                "category": { "type": "string" },
                "poster_url": { "type": "string", "format": "uri" },
                "background_url": { "type": "string", "format": "uri" }
            }
        },
        "Review": {
            "type": "object",
            "required": ["id", "user_id", "movie_id", "rating", "created"],
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "user_id": { "type": "string", "format": "uuid" },
                "movie_id": { "type": "string", "format": "uuid" },
                "rating": { "type": "integer", "minimum": 1, "maximum": 10 },
                "comment": { "type": "string" },
                "created": { "type": "string", "format": "date-time" },
                "movie": schema("Movie"),
                "user": schema("User")
            }
        },
        "CreateReview": {
            "type": "object",
            "required": ["user_id", "movie_id", "rating"],
            "properties": {
                "user_id": { "type": "string", "format": "uuid" },
                "movie_id": { "type": "string", "format": "uuid" },
                "rating": { "type": "integer", "minimum": 1, "maximum": 10 },
                "comment": { "type": "string" }
            }
        },
        "User": {
            "type": "object",
            "required": ["id", "login", "name", "avatar_url"],
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "login": { "type": "string" },
                "name": { "type": "string" },
                "avatar_url": { "type": "string", "format": "uri" },
                "following": { "type": "boolean" }
            }
        },
        "HTTPValidationError": {
            "type": "object",
            "properties": {
                "detail": {
                    "type": "array",
                    "items": {
                        "type": "object", "required": ["loc", "msg", "type"],
                        "properties": {
                            "loc": { "type": "array", "items": { "type": "string" } },
                            "msg": { "type": "string" },
                            "type": { "type": "string" }
                        }
                    }
                }
            }
        }
    })
}
