//! Ingress-level tests: statistics page, delivery errors, duplicate policy.

use futures_util::StreamExt;
use tokio_tungstenite::connect_async;

mod common;

#[tokio::test]
async fn root_serves_sorted_statistics() {
    let backend = common::start_lock_step_backend().await;
    let bridge = common::start_bridge(&backend.url).await;

    let page = reqwest::get(&bridge.url).await.unwrap().text().await.unwrap();
    let names: Vec<&str> = page
        .lines()
        .map(|line| line.split_whitespace().next().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    for name in [
        "connections_opened",
        "connections_closed",
        "requests_started",
        "requests_succeeded",
        "requests_failed",
        "messages_started",
        "messages_finished",
    ] {
        assert!(page.contains(&format!("{name} 0\n")), "missing {name}: {page}");
    }
}

#[tokio::test]
async fn push_to_unknown_address_is_not_found() {
    let backend = common::start_lock_step_backend().await;
    let bridge = common::start_bridge(&backend.url).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/ghost", bridge.url))
        .body(r#"[2,"1","ping",{}]"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert!(response.text().await.unwrap().contains("could not find address"));
}

#[tokio::test]
async fn plain_get_without_upgrade_is_rejected_after_authorization() {
    let mut backend = common::start_lock_step_backend().await;
    let bridge = common::start_bridge(&backend.url).await;

    backend.respond(200, "ok").await;
    let response = reqwest::get(format!("{}/cp-1", bridge.url)).await.unwrap();
    assert_eq!(backend.request().await, "GET /cp-1");
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "no upgrade requested");
}

#[tokio::test]
async fn second_connection_for_an_address_is_rejected() {
    let mut backend = common::start_lock_step_backend().await;
    let bridge = common::start_bridge(&backend.url).await;

    backend.respond(200, "ok").await;
    let (mut ws, _) = connect_async(format!("{}/test", bridge.ws_url))
        .await
        .unwrap();
    backend.request().await;
    common::wait_for_counter(&bridge.url, "connections_opened", 1).await;

    // The duplicate is turned away before the backend is consulted.
    let response = reqwest::get(format!("{}/test", bridge.url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 409);
    assert_eq!(response.text().await.unwrap(), "address in use");

    // The registered session is unaffected.
    backend.respond(200, "ok").await;
    ws.close(None).await.unwrap();
    while ws.next().await.is_some() {}
    assert_eq!(backend.request().await, "DELETE /test EOF");
}

#[tokio::test]
async fn address_is_reusable_after_disconnect() {
    let mut backend = common::start_lock_step_backend().await;
    let bridge = common::start_bridge(&backend.url).await;

    backend.respond(200, "ok").await;
    let (mut ws, _) = connect_async(format!("{}/test", bridge.ws_url))
        .await
        .unwrap();
    backend.request().await;

    backend.respond(200, "ok").await;
    ws.close(None).await.unwrap();
    while ws.next().await.is_some() {}
    backend.request().await;

    backend.respond(200, "ok").await;
    let (_ws2, response) = connect_async(format!("{}/test", bridge.ws_url))
        .await
        .expect("address should be free again");
    assert_eq!(response.status().as_u16(), 101);
    assert_eq!(backend.request().await, "GET /test");
}
