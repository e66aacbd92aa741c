//! Integration tests for the maze lifecycle routes.

mod common;

use http::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, connected_identifiers};

#[tokio::test]
async fn get_maze_without_a_session_is_204() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/maze", None, None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.raw.is_empty());
}

#[tokio::test]
async fn root_sets_the_session_cookie() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.cookie.expect("No cookie set");
    assert!(cookie.starts_with("burrow_session="));
}

#[tokio::test]
async fn created_maze_has_the_wire_shape() {
    let app = TestApp::new().await;
    let (_, maze) = app
        .start_game(json!({"width": 8, "height": 6, "seed": 99}))
        .await;

    assert_eq!(maze["width"], json!(8));
    assert_eq!(maze["height"], json!(6));
    assert_eq!(maze["walls"], json!(4));
    assert_eq!(maze["plugins"], json!(["static", "trail", "minimap"]));

    let current = &maze["current_room"];
    assert_eq!(maze["start_room"], current["identifier"]);
    assert_eq!(current["position"], json!({"x": 0, "y": 0}));
    assert_eq!(current["center"], json!({"x": 0.5, "y": 0.5}));
    // A corner room serializes its two interior walls only.
    assert_eq!(current["walls"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_creation_parameters_are_400() {
    let app = TestApp::new().await;
    for body in [
        json!({"width": 0}),
        json!({"height": -2}),
        json!({"walls": 6}),
        json!({"seed": 0}),
        json!([1, 2, 3]),
    ] {
        let response = app.request("POST", "/maze", Some(body.clone()), None).await;
        assert_eq!(
            response.status,
            StatusCode::BAD_REQUEST,
            "expected 400 for {body}"
        );
        assert_eq!(response.body["error"], json!("VALIDATION"));
    }
}

#[tokio::test]
async fn unknown_creation_keys_are_ignored() {
    let app = TestApp::new().await;
    let (_, maze) = app.start_game(json!({"width": 4, "depth": 9})).await;
    assert_eq!(maze["width"], json!(4));
    assert_eq!(maze["height"], json!(20));
}

#[tokio::test]
async fn session_cookie_round_trips() {
    let app = TestApp::new().await;
    let (cookie, created) = app.start_game(json!({"width": 5, "height": 5})).await;

    let with_cookie = app.request("GET", "/maze", None, Some(&cookie)).await;
    assert_eq!(with_cookie.status, StatusCode::OK);
    assert_eq!(with_cookie.body["start_room"], created["start_room"]);

    // A request without the cookie is a different session with no maze.
    let without = app.request("GET", "/maze", None, None).await;
    assert_eq!(without.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn recreating_replaces_the_session_maze() {
    let app = TestApp::new().await;
    let (cookie, first) = app.start_game(json!({"width": 5, "height": 5})).await;

    let second = app
        .request(
            "POST",
            "/maze",
            Some(json!({"width": 9, "height": 7})),
            Some(&cookie),
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["width"], json!(9));
    assert_ne!(second.body["width"], first["width"]);

    let current = app.request("GET", "/maze", None, Some(&cookie)).await;
    assert_eq!(current.body["width"], json!(9));
}

#[tokio::test]
async fn delete_drops_the_session() {
    let app = TestApp::new().await;
    let (cookie, _) = app.start_game(json!({})).await;

    let deleted = app.request("DELETE", "/maze", None, Some(&cookie)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let after = app.request("GET", "/maze", None, Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn put_without_a_maze_is_400() {
    let app = TestApp::new().await;
    let response = app
        .request("PUT", "/maze", Some(json!({"current_room": 1})), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_requires_a_json_object_body() {
    let app = TestApp::new().await;
    let (cookie, _) = app.start_game(json!({})).await;
    let response = app
        .request("PUT", "/maze", Some(json!([1])), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn moving_to_a_connected_room_updates_current() {
    let app = TestApp::new().await;
    let (cookie, maze) = app.start_game(json!({"width": 8, "height": 6})).await;

    let neighbors = connected_identifiers(&maze["current_room"]);
    assert!(!neighbors.is_empty(), "start room has no open walls");
    let target = neighbors[0];

    let moved = app
        .request(
            "PUT",
            "/maze",
            Some(json!({"current_room": target})),
            Some(&cookie),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.body["current_room"]["identifier"], json!(target));
    // start_room is stable across moves.
    assert_eq!(moved.body["start_room"], maze["start_room"]);
}

#[tokio::test]
async fn moving_to_an_unknown_room_is_404() {
    let app = TestApp::new().await;
    let (cookie, _) = app.start_game(json!({})).await;
    // The identifier sequence never produces zero.
    let response = app
        .request("PUT", "/maze", Some(json!({"current_room": 0})), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn moving_to_an_unreachable_room_is_403() {
    let app = TestApp::new().await;
    let (cookie, maze) = app.start_game(json!({"width": 10, "height": 8})).await;

    let target = unreachable_identifier(&maze);
    let response = app
        .request(
            "PUT",
            "/maze",
            Some(json!({"current_room": target})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn put_with_no_move_returns_the_maze_value() {
    let app = TestApp::new().await;
    let (cookie, maze) = app.start_game(json!({})).await;
    let response = app
        .request("PUT", "/maze", Some(json!({})), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["current_room"]["identifier"], maze["start_room"]);
}

/// A room two steps from the start that is not directly connected to it.
fn unreachable_identifier(maze: &Value) -> u64 {
    let current = &maze["current_room"];
    let start = current["identifier"].as_u64().unwrap();
    let first_degree = connected_identifiers(current);
    for wall in current["walls"].as_array().unwrap() {
        let Some(neighbor) = wall["target"].as_object() else {
            continue;
        };
        for nwall in neighbor["walls"].as_array().unwrap() {
            if let Some(id) = nwall["target"].as_u64() {
                if id != start && !first_degree.contains(&id) {
                    return id;
                }
            }
        }
    }
    panic!("maze too small to contain a second-degree room");
}
