//! End-to-end tests for the GraphQL API
//!
//! These run real queries against the schema backed by the in-memory store
//! and the JWT/Argon2 auth adapter:
//! - registration and login
//! - the `me` guard
//! - saving and removing books, including the dangling-reference case
//! - the HTTP layer's bearer token handling

use std::collections::HashMap;
use std::sync::Arc;

use api_lib::adapters::{JwtAuthAdapter, MemoryStore};
use api_lib::config::Config;
use api_lib::graphql::ReadingListSchema;
use api_lib::web::{router, state::AppState};
use async_graphql::{Request, Variables};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request as HttpRequest, StatusCode};
use pretty_assertions::assert_eq;
use reading_list_core::{ReadingListService, RequestContext};
use serde_json::{json, Value};
use tower::ServiceExt;

// ============================================================================
// Harness
// ============================================================================

const REGISTER: &str = r#"
    mutation Register($input: AddUserInput!) {
        addUser(input: $input) {
            token
            user { _id username email bookCount savedBookIds }
        }
    }
"#;

const LOGIN: &str = r#"
    mutation Login($email: String!, $password: String!) {
        login(email: $email, password: $password) {
            token
            user { username }
        }
    }
"#;

const ME: &str = r#"
    query {
        me { username bookCount savedBookIds savedBooks { bookId title } }
    }
"#;

const SAVE_BOOK: &str = r#"
    mutation Save($input: BookInput!) {
        saveBook(input: $input) { bookId title authors }
    }
"#;

const REMOVE_BOOK: &str = r#"
    mutation Remove($bookId: ID!) {
        removeBook(bookId: $bookId) { username bookCount savedBookIds savedBooks { bookId } }
    }
"#;

fn test_config() -> Arc<Config> {
    let vars: HashMap<String, String> = [
        ("STORAGE_BACKEND", "memory"),
        ("JWT_SECRET", "integration-secret"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Arc::new(Config::from_vars(vars).unwrap())
}

fn app_state() -> Arc<AppState> {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(JwtAuthAdapter::new("integration-secret", 3600));
    Arc::new(AppState::new(test_config(), store.clone(), store, auth))
}

struct Harness {
    schema: ReadingListSchema,
    service: ReadingListService,
}

impl Harness {
    fn new() -> Self {
        let state = app_state();
        Self {
            schema: state.schema.clone(),
            service: state.service.clone(),
        }
    }

    async fn run(&self, query: &str, variables: Value, ctx: RequestContext) -> Value {
        let request = Request::new(query)
            .variables(Variables::from_json(variables))
            .data(ctx);
        let response = self.schema.execute(request).await;
        serde_json::to_value(&response).unwrap()
    }

    async fn anonymous(&self, query: &str, variables: Value) -> Value {
        self.run(query, variables, RequestContext::anonymous()).await
    }

    async fn as_user(&self, token: &str, query: &str, variables: Value) -> Value {
        let ctx = self.service.authenticate(Some(token));
        self.run(query, variables, ctx).await
    }

    /// Registers `name` and returns the issued token.
    async fn register(&self, name: &str) -> String {
        let response = self
            .anonymous(
                REGISTER,
                json!({ "input": {
                    "username": name,
                    "email": format!("{}@example.com", name),
                    "password": "pa55word",
                }}),
            )
            .await;
        assert!(response.get("errors").is_none(), "{}", response);
        response["data"]["addUser"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn save(&self, token: &str, book_id: &str) -> Value {
        self.as_user(
            token,
            SAVE_BOOK,
            json!({ "input": {
                "bookId": book_id,
                "title": format!("Title {}", book_id),
                "authors": ["Octavia E. Butler"],
            }}),
        )
        .await
    }
}

fn error_message(response: &Value) -> &str {
    response["errors"][0]["message"].as_str().unwrap()
}

fn error_code(response: &Value) -> &str {
    response["errors"][0]["extensions"]["code"].as_str().unwrap()
}

// ============================================================================
// Registration and Login
// ============================================================================

#[tokio::test]
async fn add_user_returns_a_token_and_no_password() {
    let harness = Harness::new();

    let response = harness
        .anonymous(
            REGISTER,
            json!({ "input": {
                "username": "lauren",
                "email": "lauren@example.com",
                "password": "earthseed",
            }}),
        )
        .await;

    let payload = &response["data"]["addUser"];
    assert!(!payload["token"].as_str().unwrap().is_empty());
    assert_eq!(payload["user"]["username"], json!("lauren"));
    assert_eq!(payload["user"]["email"], json!("lauren@example.com"));
    assert_eq!(payload["user"]["bookCount"], json!(0));
    assert!(!response.to_string().contains("earthseed"));
}

#[tokio::test]
async fn user_type_has_no_password_field() {
    let harness = Harness::new();

    let response = harness
        .anonymous(r#"{ __type(name: "User") { fields { name } } }"#, json!({}))
        .await;
    let fields: Vec<&str> = response["data"]["__type"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();

    assert_eq!(
        fields,
        vec!["_id", "username", "email", "bookCount", "savedBookIds", "savedBooks"]
    );

    let selecting_password = harness.anonymous("{ users { password } }", json!({})).await;
    assert!(selecting_password.get("errors").is_some());
}

#[tokio::test]
async fn duplicate_registration_is_a_store_conflict() {
    let harness = Harness::new();
    harness.register("anyanwu").await;

    let response = harness
        .anonymous(
            REGISTER,
            json!({ "input": {
                "username": "anyanwu",
                "email": "other@example.com",
                "password": "whatever",
            }}),
        )
        .await;

    assert_eq!(error_code(&response), "CONFLICT");
}

#[tokio::test]
async fn login_does_not_reveal_which_credential_was_wrong() {
    let harness = Harness::new();
    harness.register("doro").await;

    let unknown_email = harness
        .anonymous(LOGIN, json!({ "email": "nobody@example.com", "password": "pa55word" }))
        .await;
    let wrong_password = harness
        .anonymous(LOGIN, json!({ "email": "doro@example.com", "password": "nope" }))
        .await;

    assert_eq!(error_message(&unknown_email), "Could not authenticate user.");
    assert_eq!(unknown_email["errors"], wrong_password["errors"]);
    assert_eq!(error_code(&wrong_password), "UNAUTHENTICATED");

    let ok = harness
        .anonymous(LOGIN, json!({ "email": "doro@example.com", "password": "pa55word" }))
        .await;
    let token = ok["data"]["login"]["token"].as_str().unwrap();
    let me = harness.as_user(token, ME, json!({})).await;
    assert_eq!(me["data"]["me"]["username"], json!("doro"));
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn me_without_identity_fails_with_no_data() {
    let harness = Harness::new();
    harness.register("shori").await;

    let response = harness.anonymous(ME, json!({})).await;

    assert_eq!(error_message(&response), "Could not authenticate user.");
    assert_eq!(error_code(&response), "UNAUTHENTICATED");
    assert!(response["data"].is_null());
}

#[tokio::test]
async fn books_are_listed_newest_first() {
    let harness = Harness::new();
    let token = harness.register("lilith").await;
    for id in ["b1", "b2", "b3"] {
        harness.save(&token, id).await;
    }

    let response = harness.anonymous("{ books { bookId } }", json!({})).await;

    assert_eq!(
        response["data"]["books"],
        json!([{ "bookId": "b3" }, { "bookId": "b2" }, { "bookId": "b1" }])
    );
}

#[tokio::test]
async fn public_lookups_by_username_and_book_id() {
    let harness = Harness::new();
    let token = harness.register("Akin").await;
    harness.save(&token, "dawn").await;

    let found = harness
        .anonymous(
            r#"{ user(username: "Akin") { username savedBooks { title } } }"#,
            json!({}),
        )
        .await;
    assert_eq!(
        found["data"]["user"],
        json!({ "username": "Akin", "savedBooks": [{ "title": "Title dawn" }] })
    );

    let wrong_case = harness
        .anonymous(r#"{ user(username: "akin") { username } }"#, json!({}))
        .await;
    assert!(wrong_case["data"]["user"].is_null());

    let book = harness
        .anonymous(r#"{ book(bookId: "dawn") { title authors } }"#, json!({}))
        .await;
    assert_eq!(
        book["data"]["book"],
        json!({ "title": "Title dawn", "authors": ["Octavia E. Butler"] })
    );

    let users = harness.anonymous("{ users { username bookCount } }", json!({})).await;
    assert_eq!(
        users["data"]["users"],
        json!([{ "username": "Akin", "bookCount": 1 }])
    );
}

// ============================================================================
// Saving and Removing Books
// ============================================================================

#[tokio::test]
async fn guarded_mutations_without_identity_change_nothing() {
    let harness = Harness::new();

    let save = harness
        .anonymous(
            SAVE_BOOK,
            json!({ "input": { "bookId": "b1", "title": "Kindred", "authors": [] } }),
        )
        .await;
    let remove = harness.anonymous(REMOVE_BOOK, json!({ "bookId": "b1" })).await;

    assert_eq!(error_message(&save), "You need to be logged in!");
    assert_eq!(error_message(&remove), "You need to be logged in!");
    assert_eq!(error_code(&save), "UNAUTHENTICATED");

    let books = harness.anonymous("{ books { bookId } }", json!({})).await;
    assert_eq!(books["data"]["books"], json!([]));
}

#[tokio::test]
async fn saving_the_same_book_twice_keeps_one_reference() {
    let harness = Harness::new();
    let token = harness.register("mary").await;

    let first = harness.save(&token, "b1").await;
    harness.save(&token, "b1").await;

    assert_eq!(first["data"]["saveBook"]["bookId"], json!("b1"));
    let me = harness.as_user(&token, ME, json!({})).await;
    assert_eq!(me["data"]["me"]["savedBookIds"], json!(["b1"]));
    assert_eq!(me["data"]["me"]["bookCount"], json!(1));

    let books = harness.anonymous("{ books { bookId } }", json!({})).await;
    assert_eq!(books["data"]["books"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn remove_book_returns_the_updated_user() {
    let harness = Harness::new();
    let token = harness.register("alanna").await;
    harness.save(&token, "b1").await;
    harness.save(&token, "b2").await;

    let response = harness
        .as_user(&token, REMOVE_BOOK, json!({ "bookId": "b1" }))
        .await;

    assert_eq!(
        response["data"]["removeBook"],
        json!({
            "username": "alanna",
            "bookCount": 1,
            "savedBookIds": ["b2"],
            "savedBooks": [{ "bookId": "b2" }],
        })
    );
}

#[tokio::test]
async fn removing_someone_elses_book_leaves_their_reference_dangling() {
    let harness = Harness::new();
    let alice = harness.register("alice").await;
    let bob = harness.register("bob").await;
    harness.save(&alice, "b1").await;

    let removed = harness
        .as_user(&bob, REMOVE_BOOK, json!({ "bookId": "b1" }))
        .await;
    assert_eq!(removed["data"]["removeBook"]["savedBookIds"], json!([]));

    let book = harness
        .anonymous(r#"{ book(bookId: "b1") { bookId } }"#, json!({}))
        .await;
    assert!(book["data"]["book"].is_null());

    let me = harness.as_user(&alice, ME, json!({})).await;
    assert_eq!(me["data"]["me"]["savedBookIds"], json!(["b1"]));
    assert_eq!(me["data"]["me"]["bookCount"], json!(1));
    assert_eq!(me["data"]["me"]["savedBooks"], json!([]));
}

#[tokio::test]
async fn removing_a_missing_book_is_not_found() {
    let harness = Harness::new();
    let token = harness.register("tino").await;
    harness.save(&token, "b1").await;

    let response = harness
        .as_user(&token, REMOVE_BOOK, json!({ "bookId": "nope" }))
        .await;

    assert_eq!(error_code(&response), "NOT_FOUND");
    let me = harness.as_user(&token, ME, json!({})).await;
    assert_eq!(me["data"]["me"]["savedBookIds"], json!(["b1"]));
}

// ============================================================================
// HTTP Layer
// ============================================================================

async fn post_graphql(state: Arc<AppState>, token: Option<&str>, query: &str) -> Value {
    let mut builder = HttpRequest::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = Body::from(json!({ "query": query }).to_string());

    let response = router(state)
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn bearer_tokens_are_verified_over_http() {
    let state = app_state();
    let token = state
        .service
        .add_user(reading_list_core::Registration {
            username: "zahir".to_string(),
            email: "zahir@example.com".to_string(),
            password: "pa55word".to_string(),
        })
        .await
        .unwrap()
        .token;

    let with_token = post_graphql(state.clone(), Some(&token), "{ me { username } }").await;
    assert_eq!(with_token["data"]["me"]["username"], json!("zahir"));

    let forged = post_graphql(state.clone(), Some("not.a.jwt"), "{ me { username } }").await;
    assert_eq!(error_message(&forged), "Could not authenticate user.");

    let without = post_graphql(state, None, "{ me { username } }").await;
    assert_eq!(error_code(&without), "UNAUTHENTICATED");
}

#[tokio::test]
async fn health_check_reports_the_storage_backend() {
    let response = router(app_state())
        .oneshot(
            HttpRequest::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "status": "ok", "storage": "memory" }));
}
