//! End-to-end tests of the public API against mocked microservices.

use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

mod common;

use common::{client, mint_token, setup, EMAIL, PASSWORD};

#[tokio::test]
async fn test_movies_list_passes_info_through() {
    let (mock, gw) = setup().await;

    let res = client()
        .get(format!("{}/v1/movies?limit=2&skip=0&sort=year&sort_dir=desc", gw.url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["movies"].as_array().unwrap().len(), 2);
    assert_eq!(body["info"], json!({"count": 2, "totalCount": 3}));
    assert_eq!(body["movies"][0]["slug"], "the-matrix");
    assert_eq!(mock.calls_to("GET /api/movies/ skip=Some(0) limit=Some(2) sort=Some(\"year\") sort_dir=Some(\"desc\")"), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_rating_sort_preserves_ranked_order() {
    let (mock, gw) = setup().await;

    let body: Value = client()
        .get(format!("{}/v1/movies?sort=avg_rating&skip=0", gw.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids: Vec<Uuid> = body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(ids, vec![mock.movie_id(2), mock.movie_id(1), mock.movie_id(0)]);
    assert_eq!(body["info"], json!({"count": 3, "totalCount": 3}));
    assert_eq!(mock.calls_to("GET /api/reviews/movies"), 1);
    assert_eq!(mock.calls_to("GET /api/movies/ "), 0);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_repeated_query_key_keeps_other_params() {
    let (mock, gw) = setup().await;

    let res = client()
        .get(format!("{}/v1/movies?limit=5&limit=6&sort=avg_rating", gw.url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["movies"][0]["id"], json!(mock.movie_id(2)));
    assert_eq!(mock.calls_to("GET /api/reviews/movies skip=Some(0) limit=Some(100)"), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_listed_movies_are_served_from_cache() {
    let (mock, gw) = setup().await;
    let c = client();

    c.get(format!("{}/v1/movies", gw.url)).send().await.unwrap();
    let id = mock.movie_id(1);
    let res = c.get(format!("{}/v1/movies/{id}", gw.url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let movie: Value = res.json().await.unwrap();
    assert_eq!(movie["title"], "Blade Runner");
    assert_eq!(mock.calls_to(&format!("GET /api/movies/{id}")), 0);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_movie_by_id_validation_and_not_found() {
    let (_mock, gw) = setup().await;
    let c = client();

    let res = c.get(format!("{}/v1/movies/abc", gw.url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"detail": [{
            "loc": ["path", "id"],
            "msg": "Parameter {id} is not a valid UUID.",
            "type": "type_error.uuid"
        }]})
    );

    let res = c
        .get(format!("{}/v1/movies/{}", gw.url, Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Movie not found");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_movie_with_callers_review() {
    let (mock, gw) = setup().await;
    let token = mint_token(mock.user_id(0));

    let movie: Value = client()
        .get(format!("{}/v1/movies/{}", gw.url, mock.movie_id(0)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(movie["review"]["rating"], 9);

    let movie: Value = client()
        .get(format!("{}/v1/movies/{}", gw.url, mock.movie_id(1)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(movie.get("review").is_none());

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_token_is_bare_401() {
    let (mock, gw) = setup().await;

    let res = client()
        .get(format!("{}/v1/movies/{}", gw.url, mock.movie_id(0)))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.bytes().await.unwrap().is_empty());

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_create_movie() {
    let (mock, gw) = setup().await;
    let c = client();
    let movie = json!({
        "title": "Alien",
        "director": "Ridley Scott",
        "year": 1979,
        "country": "UK",
        "category": "Horror",
        "poster_url": "https://img.example/alien.jpg"
    });

    let res = c.post(format!("{}/v1/movies", gw.url)).json(&movie).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = mint_token(mock.user_id(0));
    let mut bad = movie.clone();
    bad["year"] = json!(999);
    let res = c
        .post(format!("{}/v1/movies", gw.url))
        .bearer_auth(&token)
        .json(&bad)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"][0]["msg"], "Parameter year not valid.");

    let res = c
        .post(format!("{}/v1/movies", gw.url))
        .bearer_auth(&token)
        .json(&movie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["slug"], "alien");
    assert_eq!(mock.last_body().unwrap()["year"], 1979);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_reviews_list_enriched() {
    let (mock, gw) = setup().await;

    let body: Value = client()
        .get(format!("{}/v1/reviews?sort=rating", gw.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[0]["movie"]["title"], "The Matrix");
    assert_eq!(reviews[1]["user"]["name"], "Grace");
    assert!(reviews[1].get("comment").is_none());
    assert_eq!(body["info"]["totalCount"], 3);
    assert_eq!(mock.calls_to("GET /api/reviews/ skip=Some(0) limit=Some(100) sort=Some(\"rating\")"), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_reviews_list_survives_failed_user_lookup() {
    let (mock, gw) = setup().await;
    mock.fail_user(mock.user_id(1));

    let res = client().get(format!("{}/v1/reviews", gw.url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 3);
    assert!(reviews.iter().all(|r| r.get("user").is_none()));
    assert!(reviews.iter().all(|r| r["movie"]["title"].is_string()));

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_movie_and_user_review_listings() {
    let (mock, gw) = setup().await;
    let c = client();

    let body: Value = c
        .get(format!("{}/v1/movies/{}/reviews", gw.url, mock.movie_id(0)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["reviews"].as_array().unwrap().len(), 2);
    assert_eq!(body["reviews"][0]["user"]["name"], "Ada");

    let body: Value = c
        .get(format!("{}/v1/users/{}/reviews", gw.url, mock.user_id(1)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[1]["movie"]["title"], "Amélie");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_create_review_rules() {
    let (mock, gw) = setup().await;
    let c = client();
    let token = mint_token(mock.user_id(2));

    // Posting as somebody else.
    let res = c
        .post(format!("{}/v1/reviews", gw.url))
        .bearer_auth(&token)
        .json(&json!({"user_id": mock.user_id(0), "movie_id": mock.movie_id(1), "rating": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = c
        .post(format!("{}/v1/reviews", gw.url))
        .bearer_auth(&token)
        .json(&json!({"user_id": mock.user_id(2), "movie_id": Uuid::new_v4(), "rating": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = c
        .post(format!("{}/v1/reviews", gw.url))
        .bearer_auth(&token)
        .json(&json!({"user_id": mock.user_id(2), "movie_id": mock.movie_id(1), "rating": 11}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = c
        .post(format!("{}/v1/reviews", gw.url))
        .bearer_auth(&token)
        .json(&json!({"user_id": mock.user_id(2), "movie_id": mock.movie_id(1), "rating": 6, "comment": "Fine"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["rating"], 6);
    assert_eq!(mock.calls_to("POST /api/reviews/new"), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_delete_review_requires_author() {
    let (mock, gw) = setup().await;
    let c = client();
    let review = mock.review_id(0);

    let res = c
        .delete(format!("{}/v1/reviews/{review}", gw.url))
        .bearer_auth(mint_token(mock.user_id(1)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(mock.calls_to("DELETE"), 0);

    let res = c
        .delete(format!("{}/v1/reviews/{review}", gw.url))
        .bearer_auth(mint_token(mock.user_id(0)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(mock.calls_to(&format!("DELETE /api/reviews/review/{review}")), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_users_list_and_me() {
    let (mock, gw) = setup().await;
    let c = client();

    let body: Value = c
        .get(format!("{}/v1/users?skip=1&limit=5", gw.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    assert_eq!(body["info"], json!({"count": 2, "totalCount": 3}));
    let grace = &body["users"][0];
    assert_eq!(grace["login"], grace["id"]);
    assert!(grace["avatar_url"].as_str().unwrap().ends_with("?d=identicon&s=128&r=g"));

    let me: Value = c
        .get(format!("{}/v1/users/me", gw.url))
        .header("cookie", format!("token={}", mint_token(mock.user_id(2))))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["name"], "Linus");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_user_following_flag() {
    let (mock, gw) = setup().await;
    let c = client();
    let ada = mock.user_id(0);

    let anonymous: Value = c
        .get(format!("{}/v1/users/{ada}", gw.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(anonymous.get("following").is_none());

    let as_grace: Value = c
        .get(format!("{}/v1/users/{ada}", gw.url))
        .bearer_auth(mint_token(mock.user_id(1)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(as_grace["following"], true);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_followers_and_follows() {
    let (mock, gw) = setup().await;
    let c = client();

    let body: Value = c
        .get(format!("{}/v1/users/{}/followers?sort=created", gw.url, mock.user_id(0)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Grace", "Linus"]);
    assert_eq!(body["info"]["totalCount"], 2);

    let body: Value = c
        .get(format!("{}/v1/users/{}/follows", gw.url, mock.user_id(1)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["users"][0]["name"], "Ada");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_follow_and_unfollow() {
    let (mock, gw) = setup().await;
    let c = client();
    let (ada, linus) = (mock.user_id(0), mock.user_id(2));
    let url = format!("{}/v1/users/{linus}/followers/{ada}", gw.url);

    let res = c.post(&url).bearer_auth(mint_token(linus)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = c
        .post(format!("{}/v1/users/{linus}/followers/nope", gw.url))
        .bearer_auth(mint_token(ada))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"][0]["loc"], json!(["path", "follower_id"]));

    let res = c.post(&url).bearer_auth(mint_token(ada)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        mock.last_body().unwrap(),
        json!({"user_id": ada, "followed_user_id": linus})
    );

    let res = c.delete(&url).bearer_auth(mint_token(ada)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(mock.calls_to("DELETE /api/relationships/unfollow"), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_authorize_and_log_in() {
    let (mock, gw) = setup().await;
    let c = client();

    let res = c
        .post(format!("{}/v1/auth/authorize", gw.url))
        .form(&[("username", EMAIL)])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"][0]["msg"], "Missing required parameters.");

    let res = c
        .post(format!("{}/v1/auth/authorize", gw.url))
        .form(&[("username", EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let token: Value = c
        .post(format!("{}/v1/auth/authorize", gw.url))
        .form(&[("username", EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(token["token_type"], "bearer");

    let res = c
        .post(format!("{}/v1/auth/log-in", gw.url))
        .json(&json!({"username": EMAIL, "password": PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    let user: Value = res.json().await.unwrap();
    assert_eq!(user["id"], json!(mock.user_id(0)));
    assert!(user["avatar_url"].as_str().unwrap().contains("s=512"));

    let session = cookie.split(';').next().unwrap().to_string();
    let res = c
        .post(format!("{}/v1/auth/log-in", gw.url))
        .header("cookie", &session)
        .json(&json!({"username": EMAIL, "password": PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Already logged in.");

    let res = c.get(format!("{}/v1/auth/log-out", gw.url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["set-cookie"].to_str().unwrap().contains("Max-Age=0"));

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_docs_routes() {
    let (_mock, gw) = setup().await;
    let c = client();

    let res = c.get(format!("{}/", gw.url)).send().await.unwrap();
    assert!(res.status().is_redirection());

    let doc: Value = c
        .get(format!("{}/openapi.json", gw.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["openapi"], "3.0.3");

    let html = c.get(format!("{}/docs", gw.url)).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("/openapi.json"));

    gw.shutdown.trigger();
}
