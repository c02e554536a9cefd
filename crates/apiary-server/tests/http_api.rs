//! End-to-end HTTP tests over the full route table.

mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use apiary_auth::INVALID_LOGIN_MESSAGE;
use apiary_auth::service::password::hash_password;
use apiary_auth::service::token::{decode_jwt_token, encode_jwt_token};
use apiary_bus::queue::{HIVE_QUEUE, INCIDENT_QUEUE, SENSOR_DELETE_QUEUE};
use apiary_persistence::sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use apiary_persistence::{
    AllowedRegion, Apiary, ExternalDbPersistService, Incident, MaintenancePlan, Sensor, User,
};
use apiary_server::middleware::{RateLimitConfig, RateLimiter};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use common::{RecordingPublisher, SECRET, app_state, bearer, shared_state, statements};

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn user(id: i32, username: &str, role: &str, password: &str) -> User {
    User {
        user_id: id,
        username: username.to_string(),
        full_name: "Alice Apis".to_string(),
        role: role.to_string(),
        email: format!("{}@example.com", username),
        password: password.to_string(),
        last_login: None,
    }
}

fn sensor(id: i32, hive_id: i32) -> Sensor {
    Sensor {
        sensor_id: id,
        hive_id,
        sensor_type: "temperature".to_string(),
        last_reading: None,
        last_reading_time: None,
    }
}

#[actix_web::test]
async fn test_register_then_login() {
    let hash = hash_password("s3cret-pass").unwrap();
    let db = empty_db()
        .append_query_results([vec![user(5, "alice", "WORKER", &hash)]])
        .append_query_results([vec![user(5, "alice", "WORKER", &hash)]])
        .append_exec_results([exec(1)])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "alice@example.com",
            "password": "s3cret-pass",
            "full_name": "Alice Apis",
            "username": "alice"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User with id 5 created successfully");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email_or_username": "alice", "password": "s3cret-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let token = body["token"].as_str().unwrap();
    let claims = decode_jwt_token(token, SECRET).unwrap().claims;
    assert_eq!(claims.user_id, 5);
    assert_eq!(claims.role, "WORKER");
}

#[actix_web::test]
async fn test_login_failures_share_one_message() {
    let hash = hash_password("right-pass").unwrap();
    let db = empty_db()
        .append_query_results([Vec::<User>::new()])
        .append_query_results([vec![user(5, "alice", "WORKER", &hash)]])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let mut bodies = Vec::new();
    for (identifier, password) in [("nobody", "right-pass"), ("alice@example.com", "wrong-pass")] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email_or_username": identifier, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["error"], INVALID_LOGIN_MESSAGE);
}

#[actix_web::test]
async fn test_register_requires_every_field() {
    let state = app_state(
        empty_db().into_connection(),
        Arc::new(RecordingPublisher::default()),
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "alice@example.com",
            "password": "",
            "full_name": "Alice Apis",
            "username": "alice"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_manager_creates_and_reads_apiary() {
    let created = Apiary {
        apiary_id: 1,
        location: "North meadow".to_string(),
        manager_id: 2,
        establishment_date: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
    };
    let db = empty_db()
        .append_query_results([vec![created.clone()]])
        .append_query_results([vec![created.clone()]])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/apiary")
        .insert_header((header::AUTHORIZATION, bearer(2, "MANAGER")))
        .set_json(json!({
            "location": "North meadow",
            "manager_id": 2,
            "establishment_date": "2024-04-01T00:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Apiary = test::read_body_json(resp).await;
    assert_eq!(body, created);

    let req = test::TestRequest::get()
        .uri("/api/apiary/1")
        .insert_header((header::AUTHORIZATION, bearer(2, "MANAGER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Apiary = test::read_body_json(resp).await;
    assert_eq!(body.location, "North meadow");
}

#[actix_web::test]
async fn test_missing_apiary_is_not_found() {
    let db = empty_db()
        .append_query_results([Vec::<Apiary>::new()])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/apiary/42")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Failed to get apiary: apiary 42 not found");
}

#[actix_web::test]
async fn test_malformed_body_and_path_are_bad_requests() {
    let state = app_state(
        empty_db().into_connection(),
        Arc::new(RecordingPublisher::default()),
    );
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/apiary/not-a-number")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/apiary")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"location\": 5}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input: "));
}

#[actix_web::test]
async fn test_role_gate_on_staff_routes() {
    let db = empty_db()
        .append_query_results([vec![user(1, "boss", "ADMIN", "")]])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/user")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/user")
        .insert_header((header::AUTHORIZATION, bearer(1, "ADMIN")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["username"], "boss");
    assert!(body[0].get("password").is_none());
}

#[actix_web::test]
async fn test_requests_without_valid_token_are_rejected() {
    let state = app_state(
        empty_db().into_connection(),
        Arc::new(RecordingPublisher::default()),
    );
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/apiary").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/apiary")
        .insert_header((header::AUTHORIZATION, "Token abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let expired = encode_jwt_token(3, "WORKER", SECRET, -60).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/apiary")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", expired)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], apiary_auth::INVALID_TOKEN_MESSAGE);
}

#[actix_web::test]
async fn test_sensor_create_is_published_to_hive_queue() {
    let db = empty_db()
        .append_query_results([vec![sensor(9, 4)]])
        .into_connection();
    let publisher = Arc::new(RecordingPublisher::default());
    let state = app_state(db, publisher.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/sensor")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .set_json(json!({ "hive_id": 4, "sensor_type": "temperature" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let messages = publisher.messages();
    assert_eq!(messages.len(), 1);
    let (queue, message) = &messages[0];
    assert_eq!(queue, HIVE_QUEUE);
    assert_eq!(message["HiveID"], 4);
    assert_eq!(message["Sensors"][0]["sensor_id"], 9);
}

#[actix_web::test]
async fn test_publish_failure_does_not_fail_request() {
    let db = empty_db()
        .append_query_results([vec![sensor(9, 4)]])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::failing()));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/sensor")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .set_json(json!({ "hive_id": 4, "sensor_type": "temperature" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_hive_delete_announces_each_sensor() {
    let db = empty_db()
        .append_query_results([vec![sensor(11, 7), sensor(12, 7)]])
        .append_exec_results([exec(1)])
        .into_connection();
    let publisher = Arc::new(RecordingPublisher::default());
    let state = app_state(db, publisher.clone());
    let app = init_app!(state);

    let req = test::TestRequest::delete()
        .uri("/api/hive/7")
        .insert_header((header::AUTHORIZATION, bearer(2, "MANAGER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let messages = publisher.messages();
    assert_eq!(
        messages,
        vec![
            (
                SENSOR_DELETE_QUEUE.to_string(),
                json!({ "hive_id": 7, "sensor_id": 11 })
            ),
            (
                SENSOR_DELETE_QUEUE.to_string(),
                json!({ "hive_id": 7, "sensor_id": 12 })
            ),
        ]
    );
}

#[actix_web::test]
async fn test_incident_create_is_published() {
    let incident = Incident {
        incident_id: 3,
        hive_id: 7,
        incident_date: Some(Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap()),
        description: "Wasp attack".to_string(),
        severity: "HIGH".to_string(),
        actions_taken: String::new(),
    };
    let db = empty_db()
        .append_query_results([vec![incident.clone()]])
        .into_connection();
    let publisher = Arc::new(RecordingPublisher::default());
    let state = app_state(db, publisher.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/incident")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .set_json(json!({
            "hive_id": 7,
            "incident_date": "2024-06-02T09:00:00Z",
            "description": "Wasp attack",
            "severity": "HIGH",
            "actions_taken": ""
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let messages = publisher.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, INCIDENT_QUEUE);
    assert_eq!(messages[0].1["incident_id"], 3);
}

#[actix_web::test]
async fn test_health_endpoints_are_public() {
    let state = app_state(
        empty_db().into_connection(),
        Arc::new(RecordingPublisher::default()),
    );
    let app = init_app!(state);

    for uri in ["/livez", "/readyz"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_rate_limiter_answers_429() {
    let state = app_state(
        empty_db().into_connection(),
        Arc::new(RecordingPublisher::default()),
    );
    let limiter = RateLimiter::new(RateLimitConfig {
        max_requests: 2,
        window_duration: Duration::from_secs(60),
        enabled: true,
    });
    let app = init_app!(state, limiter);

    for remaining in ["1", "0"] {
        let req = test::TestRequest::get().uri("/livez").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), remaining);
    }

    let req = test::TestRequest::get().uri("/livez").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Too many requests");
}

#[actix_web::test]
async fn test_free_users_route_wins_over_id() {
    let db = empty_db()
        .append_query_results([vec![user(2, "bob", "WORKER", "hash")]])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/user/free")
        .insert_header((header::AUTHORIZATION, bearer(1, "MANAGER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["user_id"], 2);
    assert_eq!(body[0]["role"], "WORKER");
}

#[actix_web::test]
async fn test_replace_allowed_regions_returns_new_set() {
    let link = |id, region_id| AllowedRegion {
        id,
        user_id: 5,
        region_id,
    };
    let db = empty_db()
        .append_exec_results([exec(3)])
        .append_query_results([vec![link(21, 10)]])
        .append_query_results([vec![link(22, 11)]])
        .append_query_results([vec![link(21, 10), link(22, 11)]])
        .into_connection();
    let store = Arc::new(ExternalDbPersistService::new(db));
    let state = shared_state(store.clone(), Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/user/allowed-regions")
        .insert_header((header::AUTHORIZATION, bearer(1, "ADMIN")))
        .set_json(json!({ "user_id": 5, "region_ids": [10, 11] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!([
            { "id": 21, "user_id": 5, "region_id": 10 },
            { "id": 22, "user_id": 5, "region_id": 11 }
        ])
    );

    drop(app);
    let log = statements(store);
    let delete = log.find("DELETE FROM").unwrap();
    let insert = log.find("INSERT INTO").unwrap();
    assert!(delete < insert, "{}", log);
}

#[actix_web::test]
async fn test_incident_status_keeps_other_fields() {
    let existing = Incident {
        incident_id: 4,
        hive_id: 7,
        incident_date: None,
        description: "Wax moth".to_string(),
        severity: "LOW".to_string(),
        actions_taken: "Frames replaced".to_string(),
    };
    let updated = Incident {
        severity: "HIGH".to_string(),
        ..existing.clone()
    };
    let db = empty_db()
        .append_query_results([vec![existing], vec![updated]])
        .into_connection();
    let store = Arc::new(ExternalDbPersistService::new(db));
    let state = shared_state(store.clone(), Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/incident/4/status")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .set_json(json!({ "severity": "HIGH" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["severity"], "HIGH");
    assert_eq!(body["actions_taken"], "Frames replaced");

    drop(app);
    let log = statements(store);
    let select = log.find("SELECT").unwrap();
    let update = log.find("UPDATE").unwrap();
    assert!(select < update, "{}", log);
    assert!(log[update..].contains("Frames replaced"), "{}", log);
}

#[actix_web::test]
async fn test_maintenance_status_update() {
    let existing = MaintenancePlan {
        plan_id: 8,
        apiary_id: 1,
        planned_date: None,
        work_type: "Varroa treatment".to_string(),
        assigned_to: 3,
        status: "PLANNED".to_string(),
    };
    let updated = MaintenancePlan {
        status: "DONE".to_string(),
        ..existing.clone()
    };
    let db = empty_db()
        .append_query_results([vec![existing], vec![updated]])
        .append_query_results([Vec::<MaintenancePlan>::new()])
        .into_connection();
    let state = app_state(db, Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/maintenance/8/status")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .set_json(json!({ "status": "DONE" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "DONE");
    assert_eq!(body["work_type"], "Varroa treatment");

    let req = test::TestRequest::put()
        .uri("/api/maintenance/9/status")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .set_json(json!({ "status": "DONE" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_sensor_delete_is_published() {
    let db = empty_db()
        .append_query_results([vec![sensor(9, 4)]])
        .append_exec_results([exec(1)])
        .into_connection();
    let publisher = Arc::new(RecordingPublisher::default());
    let state = app_state(db, publisher.clone());
    let app = init_app!(state);

    let req = test::TestRequest::delete()
        .uri("/api/sensor/9")
        .insert_header((header::AUTHORIZATION, bearer(3, "WORKER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        publisher.messages(),
        vec![(
            SENSOR_DELETE_QUEUE.to_string(),
            json!({ "hive_id": 4, "sensor_id": 9 })
        )]
    );
}

#[actix_web::test]
async fn test_worker_group_delete_removes_members_first() {
    let db = empty_db()
        .append_exec_results([exec(3), exec(1)])
        .into_connection();
    let store = Arc::new(ExternalDbPersistService::new(db));
    let state = shared_state(store.clone(), Arc::new(RecordingPublisher::default()));
    let app = init_app!(state);

    let req = test::TestRequest::delete()
        .uri("/api/worker-group/6")
        .insert_header((header::AUTHORIZATION, bearer(2, "MANAGER")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    drop(resp);
    drop(app);
    let log = statements(store);
    let members = log.find(r#"DELETE FROM \"worker_group_member\""#).unwrap();
    let group = log.find(r#"DELETE FROM \"worker_group\""#).unwrap();
    assert!(members < group, "{}", log);
}
