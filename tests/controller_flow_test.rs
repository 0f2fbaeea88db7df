//! User-level flows through `ChatController` over the mock transport.

mod common;

use std::time::Duration;

use adk_chat::error::{ChatError, PreconditionError, TransportError};
use adk_chat::preferences::PreferencesStore;
use adk_chat::state::ChatAction;
use common::{
    sse_body, sse_record, session_json, text_event, transcript_texts, HttpError, MockHttpConfig,
    MockResponse, TestControllerBuilder,
};
use serde_json::json;
use tempfile::TempDir;

const RUN_SSE: &str = "http://agent.test/run_sse";
const SESSIONS: &str = "http://agent.test/apps/weather/users/user/sessions";

#[tokio::test]
async fn test_send_without_app_makes_no_request() {
    let (controller, http) = TestControllerBuilder::new().with_session("s1").build();
    let before = controller.snapshot();

    let err = controller.send_message("hello").await.unwrap_err();

    assert!(matches!(
        err,
        ChatError::Precondition(PreconditionError::NoAppSelected)
    ));
    assert!(http.get_requests().is_empty());
    assert_eq!(controller.snapshot(), before);
}

#[tokio::test]
async fn test_send_without_user_makes_no_request() {
    let (controller, http) = TestControllerBuilder::new()
        .with_app("weather")
        .with_user("")
        .with_session("s1")
        .build();

    let err = controller.send_message("hello").await.unwrap_err();

    assert!(matches!(err, ChatError::Precondition(PreconditionError::NoUserId)));
    assert!(http.get_requests().is_empty());
    assert!(controller.snapshot().transcript.is_empty());
}

#[tokio::test]
async fn test_send_streams_reply_into_transcript() {
    let http = MockHttpConfig::new()
        .with_sse_chunks(
            RUN_SSE,
            [sse_body(&[
                text_event("t1", "Sunny", true),
                text_event("t1", " and warm", true),
                text_event("t1", "Sunny and warm, 24°C", false),
            ])],
        )
        .build();
    let (controller, http) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();

    let summary = controller.send_message("weather in Paris?").await.unwrap();

    let state = controller.snapshot();
    assert_eq!(
        transcript_texts(state.events()),
        vec!["weather in Paris?", "Sunny and warm, 24°C"]
    );
    assert!(state.events()[0].is_user());
    assert!(state.events()[0].invocation_id.starts_with("manual-"));
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(summary.done_received);

    let request = &http.get_requests()[0];
    let body = request.json_body().unwrap();
    assert_eq!(body["appName"], "weather");
    assert_eq!(body["userId"], "user");
    assert_eq!(body["sessionId"], "s1");
    assert_eq!(body["newMessage"]["role"], "user");
}

#[tokio::test]
async fn test_stream_failure_after_zero_records_keeps_user_message() {
    let http = MockHttpConfig::new()
        .with_sse_failure(RUN_SSE, &[], HttpError::Io("connection reset".to_string()))
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();

    let err = controller.send_message("hello").await.unwrap_err();

    assert!(matches!(
        err.inner(),
        ChatError::Transport(TransportError::StreamInterrupted { .. })
    ));
    let state = controller.snapshot();
    assert_eq!(state.transcript.len(), 1);
    assert!(state.events()[0].is_user());
    assert_eq!(state.events()[0].text(), "hello");
    assert!(state
        .error
        .as_deref()
        .unwrap()
        .starts_with("Failed to send message: "));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_run_sse_rejected_by_server() {
    let http = MockHttpConfig::new()
        .with_json_response(RUN_SSE, 500, r#"{"detail":"agent crashed"}"#)
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();

    let err = controller.send_message("hello").await.unwrap_err();

    assert!(err.is_retryable());
    let state = controller.snapshot();
    assert_eq!(transcript_texts(state.events()), vec!["hello"]);
    assert!(state.error.unwrap().starts_with("Failed to send message: "));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_cancel_handle_stops_stalled_turn() {
    let http = MockHttpConfig::new()
        .with_sse_hang(RUN_SSE, &[&sse_record(&text_event("t1", "Thinking", true))])
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();

    let handle = controller.cancel_handle();
    let mut rx = controller.subscribe();
    let canceller = tokio::spawn(async move {
        // Wait until the partial reply is visible, then interrupt.
        rx.wait_for(|s| s.transcript.len() == 2).await.unwrap();
        assert!(handle.cancel());
    });

    let summary = tokio::time::timeout(Duration::from_secs(5), controller.send_message("hi"))
        .await
        .expect("cancel should end the turn")
        .unwrap();
    canceller.await.unwrap();

    assert!(summary.cancelled);
    let state = controller.snapshot();
    assert_eq!(transcript_texts(state.events()), vec!["hi", "Thinking"]);
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_opening_another_session_cancels_streaming_turn() {
    let http = MockHttpConfig::new()
        .with_sse_hang(RUN_SSE, &[&sse_record(&text_event("t1", "Thinking", true))])
        .with_method_json(
            "GET",
            &format!("{}/s2", SESSIONS),
            session_json("s2", &[text_event("old", "stored reply", false)]),
        )
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();

    let mut rx = controller.subscribe();
    let switch = async {
        rx.wait_for(|s| s.transcript.len() == 2).await.unwrap();
        controller.select_session("s2").await
    };
    let (turn, switched) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(controller.send_message("hi"), switch)
    })
    .await
    .expect("opening a session should end the turn");

    assert!(turn.unwrap().cancelled);
    switched.unwrap();
    let state = controller.snapshot();
    assert_eq!(state.current_session_id(), Some("s2"));
    assert_eq!(transcript_texts(state.events()), vec!["stored reply"]);
    assert!(state.events().iter().all(|e| e.invocation_id != "t1"));
    assert_eq!(controller.store().pending_turns(), 0);
    assert!(!state.is_loading);
    assert!(!controller.cancel_handle().is_streaming());
}

#[tokio::test]
async fn test_new_message_cancels_streaming_turn() {
    let http = MockHttpConfig::new()
        .with_sse_hang(RUN_SSE, &[&sse_record(&text_event("t1", "Thinking", true))])
        .build();
    let (controller, http) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();

    let mut rx = controller.subscribe();
    let second = async {
        rx.wait_for(|s| s.transcript.len() == 2).await.unwrap();
        http.set_response(
            RUN_SSE,
            MockResponse::sse([sse_body(&[text_event("t2", "Second answer", false)])]),
        );
        controller.send_message("again").await
    };
    let (first, second) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(controller.send_message("hi"), second)
    })
    .await
    .expect("a new message should end the stalled turn");

    assert!(first.unwrap().cancelled);
    let second = second.unwrap();
    assert!(!second.cancelled);
    assert!(second.done_received);
    let state = controller.snapshot();
    assert_eq!(
        transcript_texts(state.events()),
        vec!["hi", "Thinking", "again", "Second answer"]
    );
    // The stalled turn's accumulator is gone; its last fragment stays shown.
    assert!(!controller.store().is_pending("t1"));
    assert_eq!(controller.store().pending_turns(), 0);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_select_session_seeds_transcript_and_clears_tracker() {
    let http = MockHttpConfig::new()
        .with_method_json(
            "GET",
            &format!("{}/s2", SESSIONS),
            session_json("s2", &[text_event("old", "stored reply", false)]),
        )
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();
    controller
        .store()
        .ingest(common::agent_event("dangling", "half", true));
    assert_eq!(controller.store().pending_turns(), 1);

    controller.select_session("s2").await.unwrap();

    let state = controller.snapshot();
    assert_eq!(state.current_session_id(), Some("s2"));
    assert_eq!(transcript_texts(state.events()), vec!["stored reply"]);
    assert_eq!(controller.store().pending_turns(), 0);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_select_missing_session_sets_prefixed_error() {
    let http = MockHttpConfig::new()
        .with_json_response(
            &format!("{}/nope", SESSIONS),
            404,
            r#"{"detail":"Session not found"}"#,
        )
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_http(http)
        .build();

    assert!(controller.select_session("nope").await.is_err());

    let state = controller.snapshot();
    assert!(state.error.unwrap().starts_with("Failed to load session: "));
    assert!(state.current_session.is_none());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_create_session_becomes_current_and_listed_first() {
    let http = MockHttpConfig::new()
        .with_method_json(
            "GET",
            SESSIONS,
            json!([{"id": "old", "lastUpdateTime": 1.0}]),
        )
        .with_method_json("POST", SESSIONS, session_json("fresh", &[]))
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_http(http)
        .build();
    controller.load_sessions().await.unwrap();
    controller
        .store()
        .dispatch(ChatAction::SetMessages(vec![common::agent_event(
            "x", "stale", false,
        )]));

    let id = controller.create_session().await.unwrap();

    assert_eq!(id, "fresh");
    let state = controller.snapshot();
    assert_eq!(state.current_session_id(), Some("fresh"));
    let ids: Vec<_> = state.sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["fresh", "old"]);
    assert!(state.transcript.is_empty());
}

#[tokio::test]
async fn test_delete_current_session_leaves_it() {
    let http = MockHttpConfig::new()
        .with_method_json(
            "GET",
            SESSIONS,
            json!([
                {"id": "s1", "lastUpdateTime": 2.0},
                {"id": "s2", "lastUpdateTime": 1.0}
            ]),
        )
        .with_method_json("DELETE", &format!("{}/s1", SESSIONS), json!(null))
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();
    controller.load_sessions().await.unwrap();

    controller.delete_session("s1").await.unwrap();

    let state = controller.snapshot();
    assert!(state.current_session.is_none());
    let ids: Vec<_> = state.sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s2"]);
}

#[tokio::test]
async fn test_delete_other_session_keeps_current() {
    let http = MockHttpConfig::new()
        .with_method_json("DELETE", &format!("{}/s2", SESSIONS), json!(null))
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .with_http(http)
        .build();

    controller.delete_session("s2").await.unwrap();

    assert_eq!(controller.snapshot().current_session_id(), Some("s1"));
}

#[tokio::test]
async fn test_load_sessions_failure_sets_prefixed_error() {
    let http = MockHttpConfig::new()
        .with_error_response(SESSIONS, HttpError::Timeout("30s".to_string()))
        .build();
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_http(http)
        .build();

    let err = controller.load_sessions().await.unwrap_err();

    assert!(err.is_retryable());
    let state = controller.snapshot();
    assert!(state.error.unwrap().starts_with("Failed to load sessions: "));
    assert!(!state.is_loading);

    controller.clear_error();
    assert!(controller.snapshot().error.is_none());
}

#[tokio::test]
async fn test_new_chat_clears_session_and_transcript() {
    let (controller, _) = TestControllerBuilder::new()
        .with_app("weather")
        .with_session("s1")
        .build();
    controller
        .store()
        .ingest(common::agent_event("t1", "half", true));

    controller.new_chat();

    let state = controller.snapshot();
    assert!(state.current_session.is_none());
    assert!(state.transcript.is_empty());
    assert_eq!(controller.store().pending_turns(), 0);
}

#[tokio::test]
async fn test_selection_is_persisted_and_restored() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("preferences.json");

    let (controller, _) = TestControllerBuilder::new().build();
    let controller = controller.with_preferences(PreferencesStore::with_path(&path));
    controller.set_selected_app("weather");
    controller.set_user_id("alice");

    let (restored, _) = TestControllerBuilder::new().build();
    let restored = restored.with_preferences(PreferencesStore::with_path(&path));
    restored.restore_preferences();

    let state = restored.snapshot();
    assert_eq!(state.selected_app.as_deref(), Some("weather"));
    assert_eq!(state.user_id, "alice");
}
