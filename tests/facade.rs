//! Client facade over the in-memory transport.

mod common;

use hifi_link::protocol::{Command, PlaybackCommand};
use hifi_link::{Error, ParsedEvent, PlaybackState};
use serde_json::{Value, json};

use common::{memory_client, next_request, reply};

#[tokio::test]
async fn play_uri_resolves_with_null_result() -> anyhow::Result<()> {
    let (client, mut listener) = memory_client();
    client.connect();
    let mut peer = listener.accept().await.expect("peer");
    client.wait_connected().await?;

    let caller = client.clone();
    let task = tokio::spawn(async move {
        caller
            .execute(Command::Playback(PlaybackCommand::Play {
                uri: Some("local:1".to_string()),
                tlid: None,
            }))
            .await
    });

    let (id, request) = next_request(&mut peer).await;
    assert_eq!(
        request,
        json!({"jsonrpc": "2.0", "method": "playback.play", "params": {"uri": "local:1"}, "id": 1})
    );

    reply(&peer, id, Value::Null);
    assert_eq!(task.await??, Some(Value::Null));
    Ok(())
}

#[tokio::test]
async fn requests_short_circuit_while_disconnected() {
    let (client, _listener) = memory_client();

    assert_eq!(client.request("playback.play", None).await.expect("skipped"), None);
    assert_eq!(client.volume().await.expect("skipped"), None);
    client.set_volume(40).await.expect("skipped");
    assert_eq!(client.connection().pending_count(), 0);
}

#[tokio::test]
async fn typed_helpers_build_expected_calls() -> anyhow::Result<()> {
    let (client, mut listener) = memory_client();
    client.connect();
    let mut peer = listener.accept().await.expect("peer");
    client.wait_connected().await?;

    let caller = client.clone();
    let task = tokio::spawn(async move { caller.set_volume(150).await });
    let (id, request) = next_request(&mut peer).await;
    assert_eq!(request["method"], "mixer.set_volume");
    assert_eq!(request["params"], json!({"volume": 100}), "volume is clamped");
    reply(&peer, id, json!(true));
    task.await??;

    let caller = client.clone();
    let task = tokio::spawn(async move { caller.playback_state().await });
    let (id, request) = next_request(&mut peer).await;
    assert_eq!(request["method"], "playback.get_state");
    assert!(request.get("params").is_none());
    reply(&peer, id, json!("playing"));
    assert_eq!(task.await??, Some(PlaybackState::Playing));

    let caller = client.clone();
    let task = tokio::spawn(async move { caller.set_source("bluetooth").await });
    let (id, request) = next_request(&mut peer).await;
    assert_eq!(request["method"], "source.set");
    assert_eq!(request["params"], json!({"type": "bluetooth"}));
    reply(&peer, id, Value::Null);
    task.await??;

    let caller = client.clone();
    let task = tokio::spawn(async move { caller.add_tracks(["local:a", "local:b"]).await });
    let (id, request) = next_request(&mut peer).await;
    assert_eq!(request["method"], "tracklist.add");
    assert_eq!(request["params"], json!({"uris": ["local:a", "local:b"]}));
    reply(&peer, id, json!([]));
    task.await??;

    let caller = client.clone();
    let task = tokio::spawn(async move { caller.current_tl_track().await });
    let (id, _) = next_request(&mut peer).await;
    reply(&peer, id, Value::Null);
    assert_eq!(task.await??, None, "nothing loaded");

    Ok(())
}

#[tokio::test]
async fn typed_decode_failure_names_the_method() {
    let (client, mut listener) = memory_client();
    client.connect();
    let mut peer = listener.accept().await.expect("peer");
    client.wait_connected().await.expect("connected");

    let caller = client.clone();
    let task = tokio::spawn(async move { caller.volume().await });
    let (id, _) = next_request(&mut peer).await;
    reply(&peer, id, json!("very loud"));

    match task.await.expect("task") {
        Err(Error::Decode { method, .. }) => assert_eq!(method, "mixer.get_volume"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn remote_failure_propagates_without_retry() {
    let (client, mut listener) = memory_client();
    client.connect();
    let mut peer = listener.accept().await.expect("peer");
    client.wait_connected().await.expect("connected");

    let caller = client.clone();
    let task = tokio::spawn(async move { caller.next_track().await });
    let (id, _) = next_request(&mut peer).await;
    peer.send_json(&json!({"id": id, "error": {"message": "end of tracklist"}}));

    let err = task.await.expect("task").expect_err("remote error");
    assert!(err.is_remote());
    assert!(!err.is_recoverable());

    // Nothing was re-sent.
    let caller = client.clone();
    let task = tokio::spawn(async move { caller.request("core.get_version", None).await });
    let (next_id, request) = next_request(&mut peer).await;
    assert_eq!(request["method"], "core.get_version");
    assert_eq!(next_id, id + 1);
    reply(&peer, next_id, json!("3.4"));
    assert_eq!(task.await.expect("task").expect("reply"), Some(json!("3.4")));
}

#[tokio::test]
async fn pushed_events_reach_the_store() {
    let (client, mut listener) = memory_client();
    let mut volume = client.store().subscribe_to("player/volume");
    client.connect();
    let peer = listener.accept().await.expect("peer");
    client.wait_connected().await.expect("connected");
    assert!(client.is_connected());

    peer.send_json(&json!({"event": "player/volume", "volume": 42}));

    let action = volume.recv().await.expect("event");
    assert_eq!(action.payload, json!({"event": "player/volume", "volume": 42}));
    assert_eq!(client.connection().pending_count(), 0);

    let event: hifi_link::Event = serde_json::from_value(action.payload).expect("event shape");
    assert_eq!(event.parse(), ParsedEvent::VolumeChanged { volume: 42 });
}

#[tokio::test]
async fn disconnect_flips_store_flag_and_short_circuits() {
    let (client, mut listener) = memory_client();
    client.connect();
    let mut peer = listener.accept().await.expect("peer");
    client.wait_connected().await.expect("connected");

    let mut states = client.subscribe_state();
    client.disconnect();
    states
        .wait_for(|s| !s.is_connected())
        .await
        .expect("event loop alive");
    assert!(peer.recv().await.is_none());

    assert!(!client.is_connected());
    assert_eq!(client.request("playback.play", None).await.expect("skipped"), None);
}
