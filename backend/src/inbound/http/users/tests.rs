//! Tests for user resource handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockUsersCommand, MockUsersQuery};
use crate::domain::{EmailAddress, Error, UserDraft, UserId, UserName};
use crate::inbound::http::validation::json_config;

fn sample_user(id: i32, email: &str, name: Option<&str>) -> User {
    let at = Utc
        .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    User::new(UserDraft {
        id: UserId::new(id).expect("valid id"),
        email: EmailAddress::new(email).expect("valid email"),
        name: name.map(|n| UserName::new(n).expect("valid name")),
        created_at: at,
        updated_at: at,
    })
}

fn test_app(
    query: MockUsersQuery,
    command: MockUsersCommand,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(Arc::new(query), Arc::new(command));
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .configure(configure)
}

async fn call(
    query: MockUsersQuery,
    command: MockUsersCommand,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(query, command)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

#[actix_web::test]
async fn list_users_returns_camel_case_records() {
    let mut query = MockUsersQuery::new();
    query.expect_list_users().times(1).return_once(|| {
        Ok(vec![
            sample_user(1, "ada@example.com", Some("Ada Lovelace")),
            sample_user(2, "grace@example.com", None),
        ])
    });

    let (status, body) = call(
        query,
        MockUsersCommand::new(),
        actix_test::TestRequest::get().uri("/user"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("array body");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], json!(1));
    assert_eq!(users[0]["name"], json!("Ada Lovelace"));
    assert_eq!(users[1]["name"], Value::Null);
    assert!(users[0].get("createdAt").is_some());
}

#[actix_web::test]
async fn create_user_returns_created() {
    let mut command = MockUsersCommand::new();
    command
        .expect_create_user()
        .withf(|user| user.email().as_ref() == "ada@example.com")
        .times(1)
        .return_once(|user| {
            Ok(sample_user(
                7,
                user.email().as_ref(),
                user.name().map(AsRef::as_ref),
            ))
        });

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        actix_test::TestRequest::post()
            .uri("/user")
            .set_json(json!({"email": "  ada@example.com ", "name": "Ada Lovelace"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], json!(7));
    assert_eq!(body["email"], json!("ada@example.com"));
}

#[rstest]
#[case(json!({"email": "nope"}), "email", "invalid_email")]
#[case(json!({"email": "ada@example.com", "name": "   "}), "name", "empty_name")]
#[actix_web::test]
async fn create_user_rejects_invalid_fields(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut command = MockUsersCommand::new();
    command.expect_create_user().times(0);

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        actix_test::TestRequest::post().uri("/user").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_request"));
    assert_eq!(body["details"]["field"], json!(field));
    assert_eq!(body["details"]["code"], json!(code));
}

#[rstest]
#[case(json!({"name": "Ada"}))]
#[case(json!({"email": "ada@example.com", "role": "admin"}))]
#[actix_web::test]
async fn create_user_rejects_malformed_bodies(#[case] payload: Value) {
    let (status, body) = call(
        MockUsersQuery::new(),
        MockUsersCommand::new(),
        actix_test::TestRequest::post().uri("/user").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], json!("invalid_json"));
}

#[actix_web::test]
async fn create_user_surfaces_conflict() {
    let mut command = MockUsersCommand::new();
    command
        .expect_create_user()
        .times(1)
        .return_once(|_| Err(Error::conflict("email ada@example.com is already registered")));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        actix_test::TestRequest::post()
            .uri("/user")
            .set_json(json!({"email": "ada@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("conflict"));
}

#[actix_web::test]
async fn get_user_returns_not_found() {
    let mut query = MockUsersQuery::new();
    query
        .expect_get_user()
        .withf(|id| id.value() == 42)
        .times(1)
        .return_once(|id| Err(Error::not_found(format!("user {id} not found"))));

    let (status, body) = call(
        query,
        MockUsersCommand::new(),
        actix_test::TestRequest::get().uri("/user/42"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("user 42 not found"));
}

#[rstest]
#[case("abc", "invalid_id")]
#[case("0", "non_positive_id")]
#[actix_web::test]
async fn get_user_rejects_bad_identifiers(#[case] raw: &str, #[case] code: &str) {
    let mut query = MockUsersQuery::new();
    query.expect_get_user().times(0);

    let (status, body) = call(
        query,
        MockUsersCommand::new(),
        actix_test::TestRequest::get().uri(&format!("/user/{raw}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], json!("id"));
    assert_eq!(body["details"]["code"], json!(code));
}

#[actix_web::test]
async fn update_user_passes_only_submitted_fields() {
    let mut command = MockUsersCommand::new();
    command
        .expect_update_user()
        .withf(|id, changes| {
            id.value() == 3
                && changes.email().is_none()
                && changes.name().map(|name| name.map(AsRef::as_ref)) == Some(Some("Ada King"))
        })
        .times(1)
        .return_once(|_, _| Ok(sample_user(3, "ada@example.com", Some("Ada King"))));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        actix_test::TestRequest::patch()
            .uri("/user/3")
            .set_json(json!({"name": "Ada King", "email": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Ada King"));
}

#[actix_web::test]
async fn update_user_forwards_null_name_as_clear() {
    let mut command = MockUsersCommand::new();
    command
        .expect_update_user()
        .withf(|id, changes| {
            id.value() == 3 && changes.email().is_none() && changes.name() == Some(None)
        })
        .times(1)
        .return_once(|_, _| Ok(sample_user(3, "ada@example.com", None)));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        actix_test::TestRequest::patch()
            .uri("/user/3")
            .set_json(json!({"name": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], Value::Null);
}

#[rstest]
#[case(json!({}), None)]
#[case(json!({"name": null}), Some(None))]
#[case(json!({"name": "Ada King"}), Some(Some("Ada King")))]
fn update_request_distinguishes_absent_from_null_name(
    #[case] body: Value,
    #[case] expected: Option<Option<&str>>,
) {
    let request: UpdateUserRequest = serde_json::from_value(body).expect("valid body");
    assert_eq!(request.name.as_ref().map(|name| name.as_deref()), expected);
}

#[actix_web::test]
async fn delete_user_returns_removed_record() {
    let mut command = MockUsersCommand::new();
    command
        .expect_delete_user()
        .times(1)
        .return_once(|_| Ok(sample_user(9, "gone@example.com", None)));

    let (status, body) = call(
        MockUsersQuery::new(),
        command,
        actix_test::TestRequest::delete().uri("/user/9"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(9));
    assert_eq!(body["email"], json!("gone@example.com"));
}

#[actix_web::test]
async fn unavailable_database_maps_to_503() {
    let mut query = MockUsersQuery::new();
    query
        .expect_list_users()
        .times(1)
        .return_once(|| Err(Error::service_unavailable("user repository unavailable")));

    let (status, body) = call(
        query,
        MockUsersCommand::new(),
        actix_test::TestRequest::get().uri("/user"),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], json!("service_unavailable"));
}
