//! End-to-end ask orchestration against a scripted in-memory backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use goblin_chat::ask::{ERROR_MESSAGE, TIMEOUT_MESSAGE};
use goblin_chat::{AskError, Asker, ChatClient, ChatCursor, ChatError, ChatReply};
use goblin_sessions::SessionStore;

struct Step {
    delay: Duration,
    result: Result<ChatReply, ChatError>,
}

fn answer(text: &str, conversation_id: &str, message_id: &str) -> Step {
    answer_after(Duration::ZERO, text, conversation_id, message_id)
}

fn answer_after(delay: Duration, text: &str, conversation_id: &str, message_id: &str) -> Step {
    Step {
        delay,
        result: Ok(ChatReply {
            text: text.to_string(),
            conversation_id: conversation_id.to_string(),
            message_id: message_id.to_string(),
        }),
    }
}

fn failure(status: u16, message: &str) -> Step {
    Step {
        delay: Duration::ZERO,
        result: Err(ChatError::Api {
            status,
            message: message.to_string(),
        }),
    }
}

/// Scripted backend: records every call, plays replies front to back, and
/// tracks how many calls ran to completion versus being dropped mid-flight.
struct ScriptedClient {
    calls: Mutex<Vec<(String, ChatCursor)>>,
    script: Mutex<Vec<Step>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl ScriptedClient {
    fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(script),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    async fn calls(&self) -> Vec<(String, ChatCursor)> {
        self.calls.lock().await.clone()
    }

    fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send_message(&self, text: &str, cursor: &ChatCursor) -> Result<ChatReply, ChatError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.calls.lock().await.push((text.to_string(), cursor.clone()));

        let step = {
            let mut script = self.script.lock().await;
            assert!(!script.is_empty(), "backend called more times than scripted");
            script.remove(0)
        };
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }

        self.completed.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        step.result
    }
}

#[tokio::test]
async fn new_session_is_primed_before_the_question() {
    let client = ScriptedClient::new(vec![
        answer("I am awake.", "conv-1", "msg-1"),
        answer("4", "conv-1", "msg-2"),
    ]);
    let asker = Asker::new(client.clone(), Some("Hello".to_string()));
    let store = SessionStore::new();
    let session = store.get("u1");

    let text = asker.ask("What is 2+2?", Some(&session)).await.unwrap();
    assert_eq!(text, "4");

    let calls = client.calls().await;
    assert_eq!(calls.len(), 2);
    // Priming goes out first and unchained.
    assert_eq!(calls[0].0, "Hello");
    assert_eq!(calls[0].1, ChatCursor::default());
    // The question chains onto the identifiers priming returned.
    assert_eq!(calls[1].0, "What is 2+2?");
    assert_eq!(calls[1].1.conversation_id.as_deref(), Some("conv-1"));
    assert_eq!(calls[1].1.parent_message_id.as_deref(), Some("msg-1"));

    let session = session.lock().await;
    assert!(!session.is_new);
    assert_eq!(session.conversation_id.as_deref(), Some("conv-1"));
    assert_eq!(session.parent_message_id.as_deref(), Some("msg-2"));
}

#[tokio::test]
async fn priming_failure_stops_the_turn() {
    let client = ScriptedClient::new(vec![failure(500, "overloaded")]);
    let asker = Asker::new(client.clone(), Some("Hello".to_string()));
    let store = SessionStore::new();
    let session = store.get("u1");

    let err = asker.ask("real question", Some(&session)).await.unwrap_err();
    assert_eq!(err.user_message(), ERROR_MESSAGE);

    // The question itself was never sent.
    let calls = client.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Hello");

    let session = session.lock().await;
    assert!(session.is_new);
    assert!(session.conversation_id.is_none());
}

#[tokio::test]
async fn established_session_skips_priming() {
    let client = ScriptedClient::new(vec![answer("again", "conv-1", "msg-5")]);
    let asker = Asker::new(client.clone(), Some("Hello".to_string()));
    let store = SessionStore::new();
    let session = store.get("u1");
    session
        .lock()
        .await
        .record_exchange("conv-1".to_string(), "msg-4".to_string());

    let text = asker.ask("follow-up", Some(&session)).await.unwrap();
    assert_eq!(text, "again");

    let calls = client.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "follow-up");
    assert_eq!(calls[0].1.parent_message_id.as_deref(), Some("msg-4"));

    let session = session.lock().await;
    assert_eq!(session.parent_message_id.as_deref(), Some("msg-5"));
}

#[tokio::test]
async fn no_start_prompt_means_no_priming() {
    let client = ScriptedClient::new(vec![answer("hi", "conv-1", "msg-1")]);
    let asker = Asker::new(client.clone(), None);
    let store = SessionStore::new();
    let session = store.get("u1");

    asker.ask("first", Some(&session)).await.unwrap();

    let calls = client.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, ChatCursor::default());
    assert!(!session.lock().await.is_new);
}

#[tokio::test]
async fn stateless_ask_never_primes_or_chains() {
    let client = ScriptedClient::new(vec![answer("out of thin air", "conv-1", "msg-1")]);
    let asker = Asker::new(client.clone(), Some("Hello".to_string()));

    let text = asker.ask("question", None).await.unwrap();
    assert_eq!(text, "out of thin air");

    let calls = client.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "question");
    assert_eq!(calls[0].1, ChatCursor::default());
}

#[tokio::test(start_paused = true)]
async fn timeout_resolves_once_and_discards_the_late_reply() {
    let client = ScriptedClient::new(vec![answer_after(
        Duration::from_secs(200),
        "slow answer",
        "conv-1",
        "msg-1",
    )]);
    let asker = Asker::new(client.clone(), None);
    let store = SessionStore::new();
    let session = store.get("u1");

    let err = asker.ask("anyone there?", Some(&session)).await.unwrap_err();
    assert!(matches!(err, AskError::Timeout(_)));
    assert_eq!(err.user_message(), TIMEOUT_MESSAGE);

    // Run virtual time well past the scripted delay: the dropped call must
    // never complete or touch the session.
    tokio::time::sleep(Duration::from_secs(1000)).await;
    assert_eq!(client.calls().await.len(), 1);
    assert_eq!(client.completed(), 0);

    let session = session.lock().await;
    assert!(session.is_new);
    assert!(session.conversation_id.is_none());
}

#[tokio::test(start_paused = true)]
async fn unprimed_question_gets_the_full_window() {
    let client = ScriptedClient::new(vec![answer_after(
        Duration::from_secs(60),
        "slow but fine",
        "conv-1",
        "msg-1",
    )]);
    let asker = Asker::new(client.clone(), None);
    let store = SessionStore::new();
    let session = store.get("u1");

    let text = asker.ask("question", Some(&session)).await.unwrap();
    assert_eq!(text, "slow but fine");
}

#[tokio::test(start_paused = true)]
async fn primed_question_gets_the_shorter_window() {
    // 60s fits the 120s default window but not the 45s post-priming one.
    let client = ScriptedClient::new(vec![
        answer("ready", "conv-1", "msg-1"),
        answer_after(Duration::from_secs(60), "too slow", "conv-1", "msg-2"),
    ]);
    let asker = Asker::new(client.clone(), Some("Hello".to_string()));
    let store = SessionStore::new();
    let session = store.get("u1");

    let err = asker.ask("question", Some(&session)).await.unwrap_err();
    assert!(matches!(err, AskError::Timeout(_)));
}

#[tokio::test]
async fn question_failure_after_priming_keeps_primed_identifiers() {
    let client = ScriptedClient::new(vec![
        answer("ready", "conv-1", "msg-1"),
        failure(502, "bad gateway"),
    ]);
    let asker = Asker::new(client.clone(), Some("Hello".to_string()));
    let store = SessionStore::new();
    let session = store.get("u1");

    let err = asker.ask("question", Some(&session)).await.unwrap_err();
    assert_eq!(err.user_message(), ERROR_MESSAGE);

    // Priming landed, so the session is established and a retry will chain
    // from msg-1 instead of priming again.
    let session = session.lock().await;
    assert!(!session.is_new);
    assert_eq!(session.parent_message_id.as_deref(), Some("msg-1"));
}

#[tokio::test(start_paused = true)]
async fn overlapping_asks_for_one_user_serialize() {
    let client = ScriptedClient::new(vec![
        answer_after(Duration::from_secs(1), "first", "conv-1", "msg-1"),
        answer_after(Duration::from_secs(1), "second", "conv-1", "msg-2"),
    ]);
    let asker = Asker::new(client.clone(), None);
    let store = SessionStore::new();
    let session = store.get("u1");

    let (a, b) = tokio::join!(
        asker.ask("one", Some(&session)),
        asker.ask("two", Some(&session)),
    );
    assert_eq!(a.unwrap(), "first");
    assert_eq!(b.unwrap(), "second");

    // The session lock keeps the turns single-flight.
    assert_eq!(client.max_in_flight(), 1);

    // The second turn chained onto what the first recorded.
    let calls = client.calls().await;
    assert_eq!(calls[1].1.parent_message_id.as_deref(), Some("msg-1"));
}
