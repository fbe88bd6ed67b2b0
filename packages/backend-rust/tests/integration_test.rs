use axum::http::StatusCode;
use serde_json::json;

mod common;

const STEADY: [f64; 12] = [20.0; 12];
const SLOWING: [f64; 12] = [15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 30.0, 30.0, 30.0, 45.0, 45.0, 45.0];
const FADING: [bool; 12] = [true, true, true, true, true, true, true, false, true, false, false, false];

#[tokio::test]
async fn test_health_root() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_health_live() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_info() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/health/info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "utbk-backend");
    assert!(body["startTime"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/api/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_session_requires_user() {
    let app = common::create_test_app().await;
    let (status, body) = app.post("/api/sessions", json!({ "userId": "  " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;

    app.answer_all(&session_id, &STEADY[..3], &[true; 3]).await;

    let (status, body) = app.get(&format!("/api/sessions/{session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ACTIVE");
    assert_eq!(body["data"]["answerCount"], 3);
    assert!(body["data"]["burnout"].is_null());

    let (status, body) = app.get("/api/sessions?userId=student-7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["limit"], 20);

    app.end_session(&session_id).await;
    let (_, body) = app.get(&format!("/api/sessions/{session_id}")).await;
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert!(body["data"]["endedAt"].is_string());
}

#[tokio::test]
async fn test_answer_validation() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;
    let uri = format!("/api/sessions/{session_id}/answers");

    let (status, _) = app
        .post(&uri, json!({ "questionId": "q1", "isCorrect": true, "timeSpent": -1.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&uri, json!({ "questionId": "", "isCorrect": true, "timeSpent": 12.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &uri,
            json!({ "questionId": "q1", "isCorrect": true, "timeSpent": 12.0, "answeredAt": "soon" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/sessions/missing/answers",
            json!({ "questionId": "q1", "isCorrect": true, "timeSpent": 12.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_answers_rejected_after_end() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;
    app.end_session(&session_id).await;

    let (status, body) = app
        .post(
            &format!("/api/sessions/{session_id}/answers"),
            json!({ "questionId": "q1", "isCorrect": true, "timeSpent": 12.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SESSION_NOT_ACTIVE");
}

#[tokio::test]
async fn test_reanswer_replaces_previous() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;
    let uri = format!("/api/sessions/{session_id}/answers");

    app.post(&uri, json!({ "questionId": "q1", "isCorrect": false, "timeSpent": 30.0 }))
        .await;
    app.post(&uri, json!({ "questionId": "q1", "isCorrect": true, "timeSpent": 40.0 }))
        .await;

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    let answers = body["data"].as_array().unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0]["isCorrect"], true);
    assert_eq!(answers[0]["timeSpent"], 40.0);
}

#[tokio::test]
async fn test_calculate_steady_session() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;
    app.answer_all(&session_id, &STEADY, &[true; 12]).await;

    let (status, body) = app
        .request("POST", &format!("/api/burnout/sessions/{session_id}/calculate"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["burnoutLevel"], "NONE");
    assert_eq!(data["fatigueIndex"], 0.0);
    assert_eq!(data["recommendations"]["nextAction"], "CONTINUE");
    assert_eq!(data["recommendations"]["shouldRest"], false);
    assert_eq!(data["sessionStats"]["totalQuestions"], 12);
    assert_eq!(data["sessionStats"]["quartiles"].as_array().unwrap().len(), 4);
    for name in ["cognitiveLoad", "decisionQuality", "engagement", "consistency"] {
        assert!(data["components"][name]["interpretation"].is_string(), "{name}");
    }
}

#[tokio::test]
async fn test_calculate_fatigued_session_and_read_back() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;
    app.answer_all(&session_id, &SLOWING, &FADING).await;

    let (status, body) = app
        .request("POST", &format!("/api/burnout/sessions/{session_id}/calculate"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["burnoutLevel"], "SEVERE");
    assert_eq!(body["data"]["fatigueIndex"], 79.74);
    assert_eq!(body["data"]["recommendations"]["nextAction"], "STOP_SESSION");
    assert_eq!(body["data"]["recommendations"]["restDuration"], 30);

    let (status, stored) = app.get(&format!("/api/burnout/sessions/{session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["data"]["sessionId"], session_id.as_str());
    assert_eq!(stored["data"]["userId"], "student-7");
    assert_eq!(stored["data"]["fatigueIndex"], 79.74);

    let (_, detail) = app.get(&format!("/api/sessions/{session_id}")).await;
    assert_eq!(detail["data"]["burnout"]["burnoutLevel"], "SEVERE");
}

#[tokio::test]
async fn test_calculate_insufficient_data() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;
    app.answer_all(&session_id, &STEADY[..9], &[true; 9]).await;

    let (status, body) = app
        .request("POST", &format!("/api/burnout/sessions/{session_id}/calculate"), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["canCalculate"], false);
    assert_eq!(body["code"], "INSUFFICIENT_DATA");
    assert_eq!(body["answeredCount"], 9);
    assert_eq!(body["requiredCount"], 10);
    assert!(body["reason"].is_string());

    let (status, _) = app.get(&format!("/api/burnout/sessions/{session_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_skipped_answers_do_not_count_toward_minimum() {
    let app = common::create_test_app().await;
    let session_id = app.start_session("student-7").await;
    app.answer_all(&session_id, &STEADY[..9], &[true; 9]).await;
    app.post(
        &format!("/api/sessions/{session_id}/answers"),
        json!({ "questionId": "q-skip", "isCorrect": false, "isSkipped": true, "timeSpent": 4.0 }),
    )
    .await;

    let (status, body) = app
        .request("POST", &format!("/api/burnout/sessions/{session_id}/calculate"), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["answeredCount"], 9);
}

#[tokio::test]
async fn test_calculate_unknown_session() {
    let app = common::create_test_app().await;
    let (status, body) = app
        .request("POST", "/api/burnout/sessions/ghost/calculate", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
