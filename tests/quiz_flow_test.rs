//! End-to-end tests against a real Postgres, driving the full router.
//! They need `DATABASE_URL` (a `.env` works) and skip when it is absent.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use quiz_backend::config::{Config, DbConfig, LogConfig, CONFIG};
use quiz_backend::{routes, AppState};
use serde_json::{json, Value as JsonValue};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> Option<(Router, PgPool)> {
    dotenvy::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping DB-backed test");
        return None;
    };

    let _ = CONFIG.set(Config {
        debug: false,
        port: 0,
        entry: "/".into(),
        password_salt: "test-salt".into(),
        db: DbConfig {
            host: "unused".into(),
            port: 5432,
            user: "unused".into(),
            password: "unused".into(),
            database: "unused".into(),
        },
        log: LogConfig {
            http_log_path: "logs/http.log".into(),
            db_log_path: "logs/db.log".into(),
            quiz_log_path: "logs/quiz.log".into(),
        },
    });

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    Some((routes::router(AppState::new(pool.clone())), pool))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("request build"))
        .await
        .expect("router should respond");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.expect("body");
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json envelope")
    };
    (status, json)
}

fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn register_user(app: &Router, tag: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/register",
        Some(json!({"login": format!("user-{tag}"), "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["authorized"], true);
    body["data"]["uuid"].as_str().expect("uuid").to_string()
}

async fn add_variant(app: &Router, user: &str, name: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        &format!("/{user}/variant/add"),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn question_body(question: &str, answer: &str, options: [&str; 3]) -> JsonValue {
    json!({
        "question": question,
        "answer": answer,
        "answers": options.map(|a| json!({"answer": a})),
    })
}

async fn add_question(app: &Router, user: &str, variant: &str, body: JsonValue) -> StatusCode {
    let (status, _) = send(
        app,
        Method::POST,
        &format!("/{user}/variant/{variant}/question/add"),
        Some(body),
    )
    .await;
    status
}

async fn question_id(app: &Router, user: &str, variant: &str, question: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::GET,
        &format!("/{user}/variant/{variant}/get"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .find(|q| q["question"] == question)
        .and_then(|q| q["id"].as_i64())
        .expect("question id")
}

async fn audit_rows(pool: &PgPool, user_uuid: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM user_answers ua
            JOIN testing t ON t.id = ua.test_id
            JOIN auth a ON a.id = t.user_id
        WHERE a.uuid = $1::uuid
        "#,
    )
    .bind(user_uuid)
    .fetch_one(pool)
    .await
    .expect("audit count")
}

#[tokio::test]
async fn math_scenario_scores_exactly_one_correct_answer() {
    let Some((app, pool)) = setup().await else { return };
    let tag = tag();
    let variant = format!("m-{tag}");

    let user = register_user(&app, &tag).await;
    add_variant(&app, &user, &variant).await;
    assert_eq!(
        add_question(&app, &user, &variant, question_body("2+2", "4", ["4", "3", "5"])).await,
        StatusCode::OK
    );
    let qid = question_id(&app, &user, &variant, "2+2").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/{user}/variant/{variant}/start"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A wrong answer leaves the counter alone but is still audited.
    let accept_uri = format!("/{user}/variant/{variant}/question/{qid}/accept");
    let (status, _) = send(&app, Method::POST, &accept_uri, Some(json!({"answer": "5"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::POST, &accept_uri, Some(json!({"answer": "4"}))).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(audit_rows(&pool, &user).await, 2);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/{user}/variant/{variant}/results"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["correct_answers"], 1);
    assert!(body["data"]["finish_at"].is_string());
}

#[tokio::test]
async fn registering_the_same_login_twice_conflicts() {
    let Some((app, _pool)) = setup().await else { return };
    let tag = tag();

    register_user(&app, &tag).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        Some(json!({"login": format!("user-{tag}"), "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "user already exists");
}

#[tokio::test]
async fn wrong_password_and_unknown_login_are_indistinguishable() {
    let Some((app, _pool)) = setup().await else { return };
    let tag = tag();

    register_user(&app, &tag).await;

    let (wrong_pw_status, wrong_pw_body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({"login": format!("user-{tag}"), "password": "not-the-password"})),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({"login": format!("ghost-{tag}"), "password": "pw"})),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body["message"], unknown_body["message"]);
}

#[tokio::test]
async fn restart_never_resets_the_counter_and_finished_variant_conflicts() {
    let Some((app, _pool)) = setup().await else { return };
    let tag = tag();
    let variant = format!("r-{tag}");

    let user = register_user(&app, &tag).await;
    add_variant(&app, &user, &variant).await;
    add_question(&app, &user, &variant, question_body("3*3", "9", ["9", "6", "12"])).await;
    let qid = question_id(&app, &user, &variant, "3*3").await;

    let start_uri = format!("/{user}/variant/{variant}/start");
    let (status, _) = send(&app, Method::POST, &start_uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let accept_uri = format!("/{user}/variant/{variant}/question/{qid}/accept");
    let (status, _) = send(&app, Method::POST, &accept_uri, Some(json!({"answer": "9"}))).await;
    assert_eq!(status, StatusCode::OK);

    // Second start of an unfinished attempt is a clean no-op.
    let (status, _) = send(&app, Method::POST, &start_uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/{user}/variant/{variant}/results"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["correct_answers"], 1);

    // Starting again after finishing is a conflict.
    let (status, body) = send(&app, Method::POST, &start_uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "variant completed");
}

#[tokio::test]
async fn question_removal_sweeps_only_orphaned_answers() {
    let Some((app, pool)) = setup().await else { return };
    let tag = tag();
    let variant = format!("s-{tag}");

    let user = register_user(&app, &tag).await;
    add_variant(&app, &user, &variant).await;

    let kept = [
        format!("kept-a-{tag}"),
        format!("kept-b-{tag}"),
        format!("kept-c-{tag}"),
    ];
    let doomed = [
        format!("gone-a-{tag}"),
        format!("gone-b-{tag}"),
        format!("gone-c-{tag}"),
    ];
    add_question(
        &app,
        &user,
        &variant,
        question_body(
            "keep",
            &kept[0],
            [kept[0].as_str(), kept[1].as_str(), kept[2].as_str()],
        ),
    )
    .await;
    add_question(
        &app,
        &user,
        &variant,
        question_body(
            "drop",
            &doomed[0],
            [doomed[0].as_str(), doomed[1].as_str(), doomed[2].as_str()],
        ),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/{user}/variant/{variant}/question/remove"),
        Some(json!({"question": "drop"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let count_like = |pattern: String| {
        let pool = pool.clone();
        async move {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM answers WHERE answer LIKE $1")
                .bind(pattern)
                .fetch_one(&pool)
                .await
                .expect("answer count")
        }
    };

    assert_eq!(count_like(format!("gone-%-{tag}")).await, 0);
    assert_eq!(count_like(format!("kept-%-{tag}")).await, 3);

    // Removing a variant that does not exist must not touch answers.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/{user}/variant/no-such-{tag}/remove"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(count_like(format!("kept-%-{tag}")).await, 3);
}

#[tokio::test]
async fn sixth_question_hits_the_limit_before_storage() {
    let Some((app, pool)) = setup().await else { return };
    let tag = tag();
    let variant = format!("l-{tag}");

    let user = register_user(&app, &tag).await;
    add_variant(&app, &user, &variant).await;

    for i in 0..5 {
        let status = add_question(
            &app,
            &user,
            &variant,
            question_body(&format!("q{i}"), "a", ["a", "b", "c"]),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "question {i} should be accepted");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/{user}/variant/{variant}/question/add"),
        Some(question_body("q5", "a", ["a", "b", "c"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "question limit exceeded");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM questions WHERE variant_id = (SELECT id FROM variants WHERE name = $1)",
    )
    .bind(&variant)
    .fetch_one(&pool)
    .await
    .expect("question count");
    assert_eq!(count, 5);
}
