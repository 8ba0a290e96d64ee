//! Integration tests for the handler chain: /start, /help, /reset, /ask, and the
//! fallback replies. Uses MockBot and MockAssistant; no Telegram or OpenAI calls.

use abot::handlers::{AskHandler, CommandHandler, FallbackHandler};
use abot::threads::ThreadRegistry;
use abot_core::{
    Bot as CoreBot, Chat, HandlerChain, HandlerResponse, Message, MessageDirection, MessageKind,
    Result as AbotResult, User,
};
use assistant_client::{AssistantService, RunState};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock Bot for tests: records every outgoing message, no network.
#[derive(Default)]
struct MockBot {
    /// (kind, chat_id, text) for each send; kind is "text", "html", or "typing".
    sent: Mutex<Vec<(&'static str, i64, String)>>,
}

impl MockBot {
    fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _, _)| *kind != "typing")
            .map(|(_, _, text)| text.clone())
            .collect()
    }

    fn typing_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _, _)| *kind == "typing")
            .count()
    }
}

#[async_trait]
impl CoreBot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> AbotResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push(("text", chat.id, text.to_string()));
        Ok(())
    }

    async fn send_html(&self, chat: &Chat, text: &str) -> AbotResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push(("html", chat.id, text.to_string()));
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> AbotResult<()> {
        self.send_message(&message.chat, text).await
    }

    async fn send_typing(&self, chat: &Chat) -> AbotResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push(("typing", chat.id, String::new()));
        Ok(())
    }
}

/// Mock assistant: scripted thread ids, run states, and reply text.
struct MockAssistant {
    threads_created: AtomicUsize,
    posted: Mutex<Vec<(String, String)>>,
    runs_started: AtomicUsize,
    polls: AtomicUsize,
    /// Polls that report Pending before the run completes.
    pending_polls: usize,
    /// None simulates a run whose reply never becomes visible.
    reply: Option<String>,
    fail_runs: bool,
}

impl MockAssistant {
    fn with_reply(reply: &str) -> Self {
        Self {
            threads_created: AtomicUsize::new(0),
            posted: Mutex::new(Vec::new()),
            runs_started: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            pending_polls: 0,
            reply: Some(reply.to_string()),
            fail_runs: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail_runs: true,
            ..Self::with_reply("")
        }
    }

    fn never_replies() -> Self {
        Self {
            reply: None,
            ..Self::with_reply("")
        }
    }

    fn slow(pending_polls: usize, reply: &str) -> Self {
        Self {
            pending_polls,
            ..Self::with_reply(reply)
        }
    }
}

#[async_trait]
impl AssistantService for MockAssistant {
    async fn create_thread(&self) -> anyhow::Result<String> {
        let n = self.threads_created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("thread-{}", n))
    }

    async fn post_user_message(&self, thread_id: &str, text: &str) -> anyhow::Result<()> {
        self.posted
            .lock()
            .unwrap()
            .push((thread_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn start_run(&self, _thread_id: &str) -> anyhow::Result<String> {
        let n = self.runs_started.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("run-{}", n))
    }

    async fn run_state(&self, _thread_id: &str, _run_id: &str) -> anyhow::Result<RunState> {
        if self.fail_runs {
            return Ok(RunState::Failed("Failed".to_string()));
        }
        let poll = self.polls.fetch_add(1, Ordering::SeqCst);
        if poll < self.pending_polls {
            Ok(RunState::Pending)
        } else {
            Ok(RunState::Completed)
        }
    }

    async fn latest_assistant_reply(&self, _thread_id: &str) -> anyhow::Result<Option<String>> {
        Ok(self.reply.clone())
    }
}

fn make_message(content: &str, kind: MessageKind) -> Message {
    Message {
        id: "msg_1".to_string(),
        user: User {
            id: 123,
            username: Some("user".to_string()),
            first_name: Some("User".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        kind,
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
    }
}

fn text_message(content: &str) -> Message {
    make_message(content, MessageKind::Text)
}

/// Builds the production chain shape (commands → ask → fallback) over the mocks.
fn build_chain(
    assistant: Arc<MockAssistant>,
    bot: Arc<MockBot>,
    threads: Arc<ThreadRegistry>,
    poll_max_attempts: u32,
) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(CommandHandler::new(
            assistant.clone(),
            bot.clone(),
            threads.clone(),
        )))
        .add_handler(Arc::new(AskHandler::new(
            assistant,
            bot.clone(),
            threads,
            "Thinking...".to_string(),
            poll_max_attempts,
            Duration::ZERO,
        )))
        .add_handler(Arc::new(FallbackHandler::new(bot)))
}

// --- /start ---

/// **Test: /start creates a thread, registers it, and greets with the id in `<code>`.**
#[tokio::test]
async fn test_start_registers_thread_and_greets() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant.clone(), bot.clone(), threads.clone(), 3);

    let response = chain.handle(&text_message("/start")).await.unwrap();

    assert!(matches!(response, HandlerResponse::Reply(_)));
    assert_eq!(threads.get(123), Some("thread-1".to_string()));
    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("<code>thread-1</code>"));
    assert!(sent[0].contains("/ask"));
}

/// **Test: a second /start reuses the existing thread; no new thread is created.**
#[tokio::test]
async fn test_start_twice_keeps_thread() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant.clone(), bot.clone(), threads.clone(), 3);

    chain.handle(&text_message("/start")).await.unwrap();
    chain.handle(&text_message("/start")).await.unwrap();

    assert_eq!(assistant.threads_created.load(Ordering::SeqCst), 1);
    assert_eq!(threads.get(123), Some("thread-1".to_string()));
}

// --- /help ---

/// **Test: /help lists the commands.**
#[tokio::test]
async fn test_help_lists_commands() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant, bot.clone(), threads, 3);

    chain.handle(&text_message("/help")).await.unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("/start"));
    assert!(sent[0].contains("/ask"));
    assert!(sent[0].contains("/reset"));
}

// --- /reset ---

/// **Test: /reset replaces the registered thread with a fresh one.**
#[tokio::test]
async fn test_reset_replaces_thread() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant.clone(), bot.clone(), threads.clone(), 3);

    chain.handle(&text_message("/start")).await.unwrap();
    chain.handle(&text_message("/reset")).await.unwrap();

    assert_eq!(assistant.threads_created.load(Ordering::SeqCst), 2);
    assert_eq!(threads.get(123), Some("thread-2".to_string()));
}

// --- /ask ---

/// **Test: /ask before /start instructs the user to /start; the assistant is untouched.**
#[tokio::test]
async fn test_ask_without_start() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant.clone(), bot.clone(), threads, 3);

    chain.handle(&text_message("/ask hello")).await.unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("/start"));
    assert!(assistant.posted.lock().unwrap().is_empty());
    assert_eq!(assistant.runs_started.load(Ordering::SeqCst), 0);
}

/// **Test: /ask with no question prompts for one; no run is started.**
#[tokio::test]
async fn test_ask_empty_question() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    threads.insert(123, "thread-1".to_string());
    let chain = build_chain(assistant.clone(), bot.clone(), threads, 3);

    chain.handle(&text_message("/ask")).await.unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("/ask"));
    assert_eq!(assistant.runs_started.load(Ordering::SeqCst), 0);
}

/// **Test: /ask happy path — thinking message, question posted to the user's thread,
/// run polled with typing actions, reply sent with break tags stripped.**
#[tokio::test]
async fn test_ask_happy_path() {
    let assistant = Arc::new(MockAssistant::slow(2, "line one<br/>line two"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    threads.insert(123, "thread-9".to_string());
    let chain = build_chain(assistant.clone(), bot.clone(), threads, 10);

    let response = chain.handle(&text_message("/ask what now?")).await.unwrap();

    let posted = assistant.posted.lock().unwrap().clone();
    assert_eq!(posted, vec![("thread-9".to_string(), "what now?".to_string())]);
    assert_eq!(assistant.runs_started.load(Ordering::SeqCst), 1);
    assert!(bot.typing_count() >= 1);

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], "Thinking...");
    assert!(sent[1].contains("Assistant reply:"));
    assert!(sent[1].contains("line one\nline two"));
    assert!(sent[1].contains("/reset"));
    assert!(matches!(response, HandlerResponse::Reply(_)));
}

/// **Test: a failed run becomes a friendly error reply, not a handler error.**
#[tokio::test]
async fn test_ask_run_failure() {
    let assistant = Arc::new(MockAssistant::failing());
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    threads.insert(123, "thread-1".to_string());
    let chain = build_chain(assistant, bot.clone(), threads, 3);

    let response = chain.handle(&text_message("/ask boom")).await.unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("went wrong"));
    assert!(matches!(response, HandlerResponse::Reply(_)));
}

/// **Test: when the reply never appears, the attempt budget runs out and the timeout
/// message is sent.**
#[tokio::test]
async fn test_ask_times_out() {
    let assistant = Arc::new(MockAssistant::never_replies());
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    threads.insert(123, "thread-1".to_string());
    let chain = build_chain(assistant, bot.clone(), threads, 2);

    chain.handle(&text_message("/ask anyone?")).await.unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("did not reply in time"));
    assert_eq!(bot.typing_count(), 2);
}

// --- fallback ---

/// **Test: plain text without a command gets the /ask guidance.**
#[tokio::test]
async fn test_plain_text_guidance() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant, bot.clone(), threads, 3);

    chain.handle(&text_message("hello bot")).await.unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("without a command"));
}

/// **Test: an unknown command gets the unknown-command reply.**
#[tokio::test]
async fn test_unknown_command() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant, bot.clone(), threads, 3);

    chain.handle(&text_message("/frobnicate")).await.unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Unknown command"));
}

/// **Test: photos get the unsupported-content reply; other kinds are ignored.**
#[tokio::test]
async fn test_photo_and_other_kinds() {
    let assistant = Arc::new(MockAssistant::with_reply("hi"));
    let bot = Arc::new(MockBot::default());
    let threads = Arc::new(ThreadRegistry::new());
    let chain = build_chain(assistant, bot.clone(), threads, 3);

    chain
        .handle(&make_message("", MessageKind::Photo))
        .await
        .unwrap();
    let response = chain
        .handle(&make_message("", MessageKind::Other))
        .await
        .unwrap();

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("photo"));
    assert_eq!(response, HandlerResponse::Stop);
}
