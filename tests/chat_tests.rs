//! Integration tests for the chat flow
//!
//! Runs the thread controller against stubbed fragment streams using the
//! same consume loop the chat view uses.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use decora::ai::{CHAT_APOLOGY, ChatSession, ClientError, ClientResult, FragmentStream, GREETING};
use decora::chat::ChatThread;
use decora::types::Role;
use futures::StreamExt;
use futures::stream;

/// Replays one scripted fragment sequence per send.
struct ScriptedSession {
    sends: AtomicUsize,
    scripts: Mutex<Vec<Vec<ClientResult<String>>>>,
}

impl ScriptedSession {
    fn new(scripts: Vec<Vec<ClientResult<String>>>) -> Self {
        Self {
            sends: AtomicUsize::new(0),
            scripts: Mutex::new(scripts),
        }
    }

    fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_streaming(&self, _text: &str) -> ClientResult<FragmentStream> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.is_empty() {
            return Err(ClientError::Malformed("no script left".into()));
        }
        Ok(stream::iter(scripts.remove(0)).boxed())
    }
}

fn ok(piece: &str) -> ClientResult<String> {
    Ok(piece.to_string())
}

fn remote_failure() -> ClientResult<String> {
    Err(ClientError::Api {
        status: 500,
        body: "internal".into(),
    })
}

/// The view's send loop: feed each fragment into the thread as it arrives,
/// reporting intermediate states through `observe`.
async fn pump(
    thread: &mut ChatThread,
    session: &dyn ChatSession,
    text: &str,
    mut observe: impl FnMut(&ChatThread),
) {
    let Some(outbound) = thread.begin_send(text) else {
        return;
    };
    match session.send_streaming(&outbound).await {
        Ok(mut fragments) => {
            let mut failed = false;
            while let Some(piece) = fragments.next().await {
                match piece {
                    Ok(piece) => {
                        thread.append_fragment(&piece);
                        observe(thread);
                    }
                    Err(_) => {
                        thread.fail();
                        failed = true;
                        break;
                    }
                }
            }
            if !failed {
                thread.complete();
            }
        }
        Err(_) => thread.fail(),
    }
}

mod sending {
    use super::*;

    #[tokio::test]
    async fn whitespace_only_send_is_a_noop_with_no_remote_call() {
        let session = ScriptedSession::new(vec![vec![ok("unused")]]);
        let mut thread = ChatThread::new();

        pump(&mut thread, &session, "   \n ", |_| {}).await;

        assert_eq!(thread.messages().len(), 1);
        assert_eq!(thread.messages()[0].text, GREETING);
        assert_eq!(session.sends(), 0);
        assert!(!thread.is_pending());
    }

    #[tokio::test]
    async fn messages_stay_append_ordered_across_turns() {
        let session = ScriptedSession::new(vec![vec![ok("First reply.")], vec![ok("Second.")]]);
        let mut thread = ChatThread::new();

        pump(&mut thread, &session, "one", |_| {}).await;
        pump(&mut thread, &session, "two", |_| {}).await;

        let roles: Vec<Role> = thread.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant, // greeting
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );
        assert_eq!(thread.messages()[2].text, "First reply.");
        assert_eq!(thread.messages()[4].text, "Second.");
    }
}

mod streaming {
    use super::*;

    #[tokio::test]
    async fn fragments_are_visible_before_the_reply_completes() {
        let session = ScriptedSession::new(vec![vec![ok("Hel"), ok("lo!")]]);
        let mut thread = ChatThread::new();

        let mut partials = Vec::new();
        pump(&mut thread, &session, "hi", |t| {
            partials.push(t.messages().last().unwrap().text.clone());
        })
        .await;

        assert_eq!(partials, vec!["Hel".to_string(), "Hello!".to_string()]);
        assert_eq!(thread.messages().last().unwrap().text, "Hello!");
        assert!(!thread.is_pending());
    }

    #[tokio::test]
    async fn mid_stream_failure_replaces_the_reply_with_the_apology() {
        let session = ScriptedSession::new(vec![vec![ok("Hel"), remote_failure(), ok("never")]]);
        let mut thread = ChatThread::new();

        pump(&mut thread, &session, "hi", |_| {}).await;

        let last = thread.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text, CHAT_APOLOGY);
        assert!(!thread.is_pending());
    }

    #[tokio::test]
    async fn failure_to_open_the_stream_also_surfaces_the_apology() {
        // Empty script list: send_streaming itself errors.
        let session = ScriptedSession::new(vec![]);
        let mut thread = ChatThread::new();

        pump(&mut thread, &session, "hi", |_| {}).await;

        assert_eq!(thread.messages().last().unwrap().text, CHAT_APOLOGY);
        assert!(!thread.is_pending());

        // And input is usable again for the next turn.
        assert!(thread.begin_send("retry").is_some());
    }
}
