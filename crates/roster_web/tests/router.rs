use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use roster_core::db::open_db_in_memory;
use roster_core::{
    Auditing, CrudRepository, FixedAuditor, FixedClock, Member, SqliteMemberRepository,
    SqliteTeamRepository, Team,
};
use roster_web::{create_router, AppState};
use serde_json::Value;
use tower::ServiceExt;

fn seeded_router() -> Router {
    let conn = open_db_in_memory().unwrap();
    let mut team_a = Team::new("teamA");
    SqliteTeamRepository::new(&conn).save(&mut team_a).unwrap();
    let members = SqliteMemberRepository::new(&conn);
    members
        .save(&mut Member::with_team("member1", 10, &team_a))
        .unwrap();
    for index in 2..=7 {
        members
            .save(&mut Member::with_age(format!("member{index}"), index))
            .unwrap();
    }

    let auditing = Auditing::new(FixedAuditor::new("test"), FixedClock(0));
    create_router(AppState::new(conn, auditing))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(router, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn member_username_as_plain_text() {
    let (status, content_type, body) = get(seeded_router(), "/members/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, "member1");
}

#[tokio::test]
async fn unknown_member_is_not_found() {
    let (status, json) = get_json(seeded_router(), "/members/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["type"], "not_found_error");
}

#[tokio::test]
async fn path_extractor_resolves_member() {
    let (status, _, body) = get(seeded_router(), "/members2/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "member3");

    let (status, json) = get_json(seeded_router(), "/members2/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["message"], "member not found: 999");

    let (status, _, _) = get(seeded_router(), "/members2/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_uses_default_page_size() {
    let (status, json) = get_json(seeded_router(), "/members").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["size"], 5);
    assert_eq!(json["number"], 0);
    assert_eq!(json["totalElements"], 7);
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["first"], true);
    assert_eq!(json["content"].as_array().unwrap().len(), 5);
    assert_eq!(json["content"][0]["username"], "member1");
    assert_eq!(json["content"][0]["teamName"], "teamA");
    assert_eq!(json["content"][1]["teamName"], Value::Null);
}

#[tokio::test]
async fn list_honours_page_size_and_sort() {
    let (status, json) =
        get_json(seeded_router(), "/members?page=1&size=2&sort=username,desc").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|dto| dto["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["member5", "member4"]);
    assert_eq!(json["sort"][0]["direction"], "DESC");
}

#[tokio::test]
async fn list_rejects_unknown_sort_property() {
    let (status, json) = get_json(seeded_router(), "/members?sort=password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn health_reports_member_count() {
    let (status, json) = get_json(seeded_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["members"], 7);
}
