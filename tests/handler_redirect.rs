mod common;

#[tokio::test]
async fn test_redirect_success() {
    let (server, _state) = common::create_test_server();

    let created = server.post("/").text("https://example.com/target").await;
    let code = common::code_of(&created.text());

    let response = server.get(&format!("/{code}")).await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (server, _state) = common::create_test_server();

    let response = server.get("/nothere").await;

    assert_eq!(response.status_code(), 404);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_deleted_is_gone() {
    let (server, state) = common::create_test_server();
    let cookie = common::cookie_for("alice");

    let created = server
        .post("/")
        .add_header("Cookie", cookie.clone())
        .text("https://example.com/soon-gone")
        .await;
    let code = common::code_of(&created.text());

    let response = server
        .delete("/api/user/urls")
        .add_header("Cookie", cookie)
        .json(&serde_json::json!([code]))
        .await;
    assert_eq!(response.status_code(), 202);

    let deleted = common::eventually(|| {
        let state = state.clone();
        let code = code.clone();
        async move {
            state
                .url_service
                .resolve(&code)
                .await
                .map(|record| record.deleted)
                .unwrap_or(false)
        }
    })
    .await;
    assert!(deleted);

    let response = server.get(&format!("/{code}")).await;
    assert_eq!(response.status_code(), 410);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "gone");
}
