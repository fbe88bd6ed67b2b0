#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use utbk_backend::db::Database;
use utbk_backend::state::AppState;
use utbk_burnout::BurnoutCalculator;

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    _dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = Database::connect(&url).await.unwrap();
    let state = AppState::new(db.clone(), BurnoutCalculator::default());

    TestApp {
        app: utbk_backend::create_app(state),
        db,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn start_session(&self, user_id: &str) -> String {
        let (status, body) = self
            .post("/api/sessions", serde_json::json!({ "userId": user_id, "subtest": "PU" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Submits one answer per entry, a minute apart.
    pub async fn answer_all(&self, session_id: &str, times: &[f64], correct: &[bool]) {
        for (i, (time, ok)) in times.iter().zip(correct).enumerate() {
            let (status, body) = self
                .post(
                    &format!("/api/sessions/{session_id}/answers"),
                    serde_json::json!({
                        "questionId": format!("q{i}"),
                        "selectedAnswer": "C",
                        "isCorrect": ok,
                        "timeSpent": time,
                        "answeredAt": format!("2024-06-03T09:{:02}:00.000Z", i),
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
        }
    }

    pub async fn end_session(&self, session_id: &str) {
        let (status, body) = self
            .request("POST", &format!("/api/sessions/{session_id}/end"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}
