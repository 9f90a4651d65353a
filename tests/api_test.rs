use actix_web::{http::StatusCode, test, web, App};
use jee_prep_tracker::timer::{tick_session, Countdown};
use jee_prep_tracker::{configure, AppState, Config};
use serde_json::{json, Value};
use uuid::Uuid;

fn demo_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(Config::default()).unwrap())
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(configure)).await
    };
}

macro_rules! login_id {
    ($app:expr, $email:expr, $role:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": $email, "password": "demo123", "role": $role }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        assert_eq!(body["success"], true);
        body["user"]["id"].as_i64().unwrap()
    }};
}

#[actix_web::test]
async fn health_and_schema_are_served() {
    let state = demo_state();
    let app = app!(state);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["demo_mode"], true);

    let sql = test::call_and_read_body(&app, test::TestRequest::get().uri("/schema.sql").to_request()).await;
    let sql = String::from_utf8(sql.to_vec()).unwrap();
    assert!(sql.contains("CREATE TABLE IF NOT EXISTS topic_progress"));
}

#[actix_web::test]
async fn login_requires_matching_role_and_password() {
    let state = demo_state();
    let app = app!(state);

    login_id!(app, "student@jeeprep.dev", "student");

    for (email, password, role) in [
        ("student@jeeprep.dev", "wrong", "student"),
        ("student@jeeprep.dev", "demo123", "parent"),
        ("nobody@jeeprep.dev", "demo123", "student"),
    ] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": password, "role": role }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }
}

#[actix_web::test]
async fn register_rejects_duplicate_email() {
    let state = demo_state();
    let app = app!(state);

    let new_student = json!({
        "name": "Riya",
        "email": "riya@example.com",
        "role": "student",
        "password": "secret1",
        "target_year": 2027
    });
    let req = test::TestRequest::post().uri("/auth/register").set_json(&new_student).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post().uri("/auth/register").set_json(&new_student).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn exercise_counters_never_go_negative() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");

    let req = test::TestRequest::put()
        .uri(&format!("/students/{}/progress/phy-01-a/exercises/exercise_1", student))
        .set_json(json!({ "solved": -5, "total": -3 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["exercises"]["exercise_1"], json!({ "solved": 0, "total": 0 }));

    let req = test::TestRequest::put()
        .uri(&format!("/students/{}/progress/phy-01-a/exercises/exercise_2", student))
        .set_json(json!({ "solved": 3, "total": 10 }))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri(&format!("/students/{}/progress/phy-01-a/exercises/exercise_2/adjust", student))
        .set_json(json!({ "delta": -7 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["exercises"]["exercise_2"]["solved"], 0);

    let req = test::TestRequest::put()
        .uri(&format!("/students/{}/progress/no-such-topic/status", student))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn completing_a_topic_raises_progress() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");
    let uri = format!("/students/{}/progress", student);

    let before: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let req = test::TestRequest::put()
        .uri(&format!("/students/{}/progress/phy-01-a/status", student))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    test::call_service(&app, req).await;
    let after: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;

    assert!(after["overall_percent"].as_f64().unwrap() > before["overall_percent"].as_f64().unwrap());
    assert_eq!(
        after["completed_topics"].as_u64().unwrap(),
        before["completed_topics"].as_u64().unwrap() + 1
    );
}

#[actix_web::test]
async fn mock_test_session_scores_and_submits_once() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");

    let tests: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/tests").to_request()).await;
    let mock = tests
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "JEE Main Mock Test 1")
        .unwrap();
    assert_eq!(mock["question_count"], 12);

    let req = test::TestRequest::post()
        .uri(&format!("/students/{}/sessions", student))
        .set_json(json!({ "test_id": mock["id"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["status"], "in_progress");
    assert!(view["current_question"].get("correct_option").is_none());
    let sid = view["id"].as_str().unwrap().to_string();

    // look up the answer key through the admin bank
    let bank: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/admin/questions").to_request()).await;
    let key = |id: &Value| {
        bank.as_array()
            .unwrap()
            .iter()
            .find(|q| &q["id"] == id)
            .unwrap()["correct_option"]
            .as_u64()
            .unwrap()
    };

    // first question right, second wrong
    let first = view["current_question"]["id"].clone();
    let req = test::TestRequest::post()
        .uri(&format!("/sessions/{}/answer", sid))
        .set_json(json!({ "question_id": first, "option": key(&first) }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/sessions/{}/navigate", sid))
        .set_json(json!({ "direction": "next" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["current_index"], 1);
    let second = view["current_question"]["id"].clone();
    let wrong = (key(&second) + 1) % 4;
    let req = test::TestRequest::post()
        .uri(&format!("/sessions/{}/answer", sid))
        .set_json(json!({ "question_id": second, "option": wrong }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri(&format!("/sessions/{}/submit", sid)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let attempt = &body["attempt"];
    assert_eq!(attempt["score"], 3);
    assert_eq!(attempt["max_score"], 48);
    assert_eq!(attempt["correct"], 1);
    assert_eq!(attempt["incorrect"], 1);
    assert_eq!(attempt["unattempted"], 10);
    assert_eq!(attempt["accuracy"], 50);
    assert_eq!(attempt["submission"], "manual");
    assert_eq!(body["review"].as_array().unwrap().len(), 12);

    let req = test::TestRequest::post().uri(&format!("/sessions/{}/submit", sid)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let attempts: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/students/{}/attempts", student)).to_request(),
    )
    .await;
    assert_eq!(attempts.as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn unanswered_submission_scores_zero() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");
    let tests: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/tests").to_request()).await;

    let req = test::TestRequest::post()
        .uri(&format!("/students/{}/sessions", student))
        .set_json(json!({ "test_id": tests[0]["id"] }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    let sid = view["id"].as_str().unwrap();

    let req = test::TestRequest::post().uri(&format!("/sessions/{}/submit", sid)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["attempt"]["score"], 0);
    assert_eq!(body["attempt"]["accuracy"], 0);
}

#[actix_web::test]
async fn expired_test_is_auto_submitted_once() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");

    let req = test::TestRequest::post()
        .uri("/admin/questions")
        .set_json(json!({
            "subject": "physics",
            "text": "g near the surface of the Earth?",
            "options": ["9.8 m/s^2", "1.6 m/s^2"],
            "correct_option": 0
        }))
        .to_request();
    let question: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/admin/tests")
        .set_json(json!({ "name": "Sprint", "question_ids": [question["id"]], "duration_minutes": 1 }))
        .to_request();
    let sprint: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/students/{}/sessions", student))
        .set_json(json!({ "test_id": sprint["id"] }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    let sid: Uuid = view["id"].as_str().unwrap().parse().unwrap();

    let finished = (0..120)
        .filter(|_| matches!(tick_session(&state, sid), Countdown::Finished(_)))
        .count();
    assert_eq!(finished, 1);

    let req = test::TestRequest::post().uri(&format!("/sessions/{}/submit", sid)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let attempts: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/students/{}/attempts", student)).to_request(),
    )
    .await;
    let autos: Vec<&Value> = attempts
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["submission"] == "auto")
        .collect();
    assert_eq!(autos.len(), 1);
    assert_eq!(autos[0]["test_id"], sprint["id"]);
    assert_eq!(autos[0]["unattempted"], 1);
}

#[actix_web::test]
async fn analytics_reflect_seeded_history() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/students/{}/analytics", student)).to_request(),
    )
    .await;
    assert_eq!(body["total_attempts"], 3);
    assert_eq!(body["trend"], "Improving");
    assert_eq!(body["chart_data"]["labels"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn parent_sees_linked_student() {
    let state = demo_state();
    let app = app!(state);
    let parent = login_id!(app, "parent@jeeprep.dev", "parent");

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/parents/{}/dashboard", parent)).to_request(),
    )
    .await;
    assert_eq!(body["student"]["name"], "Aarav Sharma");
    assert_eq!(body["recent_attempts"].as_array().unwrap().len(), 3);
    assert!(body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["target"] != "student"));
}

#[actix_web::test]
async fn timetable_round_trip() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");
    let uri = format!("/students/{}/timetable", student);

    let body: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert!(body["schedule"]["total_study_minutes"].as_i64().unwrap() > 0);

    let config = json!({
        "wake_time": "07:00:00",
        "sleep_time": "22:00:00",
        "school": null,
        "coaching": { "start": "09:00:00", "end": "12:00:00" },
        "study_block_minutes": 45,
        "break_minutes": 15,
        "subjects": ["mathematics", "physics"]
    });
    let req = test::TestRequest::put().uri(&uri).set_json(&config).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let blocks = body["schedule"]["blocks"].as_array().unwrap();
    assert!(blocks.iter().any(|b| b["kind"] == "coaching"));
    assert!(blocks.iter().all(|b| b["subject"] != "chemistry"));

    let saved: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(saved["config"]["study_block_minutes"], 45);

    let bad = json!({
        "wake_time": "22:00:00",
        "sleep_time": "06:00:00",
        "study_block_minutes": 60,
        "break_minutes": 10,
        "subjects": ["physics"]
    });
    let req = test::TestRequest::put().uri(&uri).set_json(&bad).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn focus_session_lifecycle() {
    let state = demo_state();
    let app = app!(state);
    let student = login_id!(app, "student@jeeprep.dev", "student");
    let base = format!("/students/{}/focus", student);

    let req = test::TestRequest::post().uri(&base).set_json(json!({ "subject": "chemistry" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let timer: Value = test::read_body_json(resp).await;
    assert_eq!(timer["phase"], "focus");
    assert_eq!(timer["remaining_secs"], 1500);

    let req = test::TestRequest::post().uri(&base).set_json(json!({ "subject": "physics" })).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post().uri(&format!("{}/pause", base)).to_request();
    let timer: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(timer["running"], false);

    let req = test::TestRequest::post().uri(&format!("{}/dance", base)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post().uri(&format!("{}/skip", base)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["change"]["to"], "short_break");
    assert!(body["change"]["recall_prompt"].is_null());
    assert_eq!(body["timer"]["cycles_completed"], 0);

    let req = test::TestRequest::post().uri(&format!("{}/finish", base)).to_request();
    let session: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(session["cycles_completed"], 0);

    let history: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/students/{}/study-sessions", student)).to_request(),
    )
    .await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let req = test::TestRequest::post().uri(&format!("{}/pause", base)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn notifications_filter_by_role() {
    let state = demo_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/admin/notifications")
        .set_json(json!({ "title": "JEE Main dates", "message": "Session 1 in January", "kind": "exam" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let students: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/notifications?role=student").to_request(),
    )
    .await;
    let titles: Vec<&str> = students
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"JEE Main dates"));
    assert!(titles.contains(&"Mock Test 1 is live"));
    assert!(!titles.contains(&"Parent-teacher meeting"));
}

#[actix_web::test]
async fn admin_builds_tests_from_imported_questions() {
    let state = demo_state();
    let app = app!(state);

    let csv_body = "subject,text,option_a,option_b,option_c,option_d,correct,explanation\n\
                    physics,Unit of charge?,Coulomb,Ampere,Volt,Ohm,A,\n\
                    chemistry,pH of pure water at 25C?,7,1,14,0,A,Neutral\n";
    let req = test::TestRequest::post()
        .uri("/admin/questions/import")
        .insert_header(("Content-Type", "text/csv"))
        .set_payload(csv_body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let imported: Value = test::read_body_json(resp).await;
    assert_eq!(imported["imported"], 2);
    let ids: Vec<Value> = imported["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].clone())
        .collect();

    let req = test::TestRequest::post()
        .uri("/admin/tests")
        .set_json(json!({ "name": "Quick Check", "question_ids": ids, "duration_minutes": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["marks_correct"], 4);

    let tests: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/tests").to_request()).await;
    assert_eq!(tests.as_array().unwrap().len(), 3);

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/tests/{}", created["id"]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::post()
        .uri("/admin/tests")
        .set_json(json!({ "name": "Broken", "question_ids": [9999], "duration_minutes": 5 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_exports_attempts_as_csv() {
    let state = demo_state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/attempts/export").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "text/csv");
    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("attempt_id,"));

    let overview: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/admin/overview").to_request()).await;
    assert_eq!(overview["total_attempts"], 3);
    assert_eq!(overview["users_by_role"]["student"], 1);
}

#[actix_web::test]
async fn assistant_falls_back_without_a_key() {
    let state = demo_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/assistant/tip")
        .set_json(json!({ "subject": "mathematics" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "fallback");
    assert!(!body["text"].as_str().unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri("/assistant/ask")
        .set_json(json!({ "question": "   " }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}
