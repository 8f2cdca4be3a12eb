//! End-to-end tests for a Rayo session.
//!
//! These drive a full session (prompt, interpreter, gate, real tools on a
//! temp directory) with a scripted model and a scripted operator.

use std::sync::{Arc, Mutex};

use rayo_agent::{DispatchGate, Notice, Operator, Preview, Session, SessionSettings};
use rayo_core::error::ProviderError;
use rayo_core::message::Role;
use rayo_core::provider::{Provider, ProviderRequest, ProviderResponse};
use rayo_tools::default_registry;
use serde_json::json;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted replies in sequence.
struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> ProviderRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 500,
                message: "script exhausted".into(),
            })?;
        Ok(ProviderResponse {
            content,
            usage: None,
            model,
        })
    }
}

// ── Mock Operator ────────────────────────────────────────────────────────

struct ScriptedOperator {
    answer: bool,
    previews: Mutex<Vec<Preview>>,
    notices: Mutex<Vec<Notice>>,
}

impl ScriptedOperator {
    fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            previews: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl Operator for ScriptedOperator {
    async fn confirm(&self, preview: &Preview) -> bool {
        self.previews.lock().unwrap().push(preview.clone());
        self.answer
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn action(tool: &str, parameters: serde_json::Value) -> String {
    let body = json!({"tool": tool, "parameters": parameters, "reasoning": "e2e"});
    format!("I'll do that.\n\n```json\n{}\n```", serde_json::to_string_pretty(&body).unwrap())
}

fn session(provider: Arc<ScriptedProvider>, operator: Arc<ScriptedOperator>) -> Session {
    let gate = DispatchGate::new(Arc::new(default_registry()), operator);
    Session::new(provider, gate, SessionSettings::default().with_model("e2e-model"))
}

fn tool_turn(session: &Session) -> String {
    session
        .conversation()
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == Role::User && m.content.starts_with("Tool execution result: "))
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_plain_question() {
    let provider = Arc::new(ScriptedProvider::new(vec!["Rust is a systems language.".into()]));
    let mut session = session(provider.clone(), ScriptedOperator::answering(false));

    let reply = session.chat("What is Rust?").await;

    assert_eq!(reply, "Rust is a systems language.");
    assert_eq!(provider.calls(), 1);
    assert_eq!(session.message_count(), 1);
    assert!(session.conversation().system_prompt().contains("Rayo"));
}

#[tokio::test]
async fn e2e_read_file_then_answer() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("add.py");
    std::fs::write(&file, "def add(a, b):\n    return a + b\n").unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        action("read_file", json!({"path": file.to_str().unwrap()})),
        "`add` returns the sum of its arguments.".into(),
    ]));
    let operator = ScriptedOperator::answering(false);
    let mut session = session(provider.clone(), operator.clone());

    let reply = session.chat("What does add.py do?").await;

    assert_eq!(reply, "`add` returns the sum of its arguments.");
    assert_eq!(provider.calls(), 2);
    assert!(operator.previews.lock().unwrap().is_empty());

    let turn = tool_turn(&session);
    assert!(turn.contains("   1 | def add(a, b):"), "{turn}");
    assert!(turn.contains("\"success\": true"), "{turn}");

    // The follow-up goes out with the tool-use prompt in place
    let follow_up = provider.last_request();
    assert_eq!(follow_up.model, "e2e-model");
    assert_eq!(follow_up.messages[0].role, Role::System);
}

#[tokio::test]
async fn e2e_approved_patch_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.py");
    std::fs::write(&file, "DEBUG = False\nPORT = 80\n").unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        action(
            "apply_patch",
            json!({
                "path": file.to_str().unwrap(),
                "original_snippet": "DEBUG = False",
                "new_snippet": "DEBUG = True",
            }),
        ),
        "Debug mode is now on.".into(),
    ]));
    let operator = ScriptedOperator::answering(true);
    let mut session = session(provider, operator.clone());

    let reply = session.chat("Turn on debug mode").await;

    assert_eq!(reply, "Debug mode is now on.");
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "DEBUG = True\nPORT = 80\n"
    );

    let previews = operator.previews.lock().unwrap().clone();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].title(), "File Modification");
    assert!(previews[0].body().contains("- Original:\nDEBUG = False"));

    let notices = operator.notices.lock().unwrap().clone();
    assert!(notices.iter().any(|n| matches!(n, Notice::FileUpdated(_))));
}

#[tokio::test]
async fn e2e_declined_patch_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.py");
    std::fs::write(&file, "print('hi')\n").unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        action(
            "apply_patch",
            json!({
                "path": file.to_str().unwrap(),
                "original_snippet": "print('hi')",
                "new_snippet": "print('bye')",
            }),
        ),
        "Okay, I left it alone.".into(),
    ]));
    let operator = ScriptedOperator::answering(false);
    let mut session = session(provider.clone(), operator.clone());

    let reply = session.chat("Change the greeting").await;

    assert_eq!(reply, "Okay, I left it alone.");
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "print('hi')\n");
    assert_eq!(provider.calls(), 2);

    let turn = tool_turn(&session);
    assert!(turn.contains("Operation cancelled by user"), "{turn}");
    assert!(turn.contains("\"success\": false"), "{turn}");
    assert!(operator.notices.lock().unwrap().contains(&Notice::Cancelled));
}

#[tokio::test]
async fn e2e_approved_command_runs() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        action("run_bash", json!({"command": "echo rayo-e2e"})),
        "The command printed rayo-e2e.".into(),
    ]));
    let operator = ScriptedOperator::answering(true);
    let mut session = session(provider, operator.clone());

    let reply = session.chat("Say something in the shell").await;

    assert_eq!(reply, "The command printed rayo-e2e.");
    let previews = operator.previews.lock().unwrap().clone();
    assert_eq!(
        previews,
        vec![Preview::Command {
            command: "echo rayo-e2e".into()
        }]
    );

    let turn = tool_turn(&session);
    assert!(turn.contains("rayo-e2e"), "{turn}");
    assert!(turn.contains("\"return_code\": 0"), "{turn}");
}

#[tokio::test]
async fn e2e_declined_command_never_runs() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");

    let provider = Arc::new(ScriptedProvider::new(vec![
        action(
            "run_bash",
            json!({"command": format!("touch {}", marker.display())}),
        ),
        "Understood.".into(),
    ]));
    let mut session = session(provider, ScriptedOperator::answering(false));

    session.chat("Create a marker file").await;

    assert!(!marker.exists());
}

#[tokio::test]
async fn e2e_list_files_sees_the_project() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src").join("lib.rs"), "").unwrap();
    std::fs::create_dir(dir.path().join("node_modules")).unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        action("list_files", json!({"path": dir.path().to_str().unwrap()})),
        "There is one source file.".into(),
    ]));
    let mut session = session(provider, ScriptedOperator::answering(false));

    session.chat("What's in this project?").await;

    let turn = tool_turn(&session);
    assert!(turn.contains("src/"), "{turn}");
    assert!(turn.contains("lib.rs"), "{turn}");
    assert!(!turn.contains("node_modules"), "{turn}");
}

#[tokio::test]
async fn e2e_multi_turn_conversation_keeps_history() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        "Hello!".into(),
        action("no_such_tool", json!({})),
        "That capability does not exist.".into(),
    ]));
    let mut session = session(provider.clone(), ScriptedOperator::answering(true));

    assert_eq!(session.chat("Hi").await, "Hello!");
    assert_eq!(session.chat("Use a weird tool").await, "That capability does not exist.");

    assert_eq!(session.message_count(), 2);
    assert_eq!(provider.calls(), 3);
    assert_eq!(tool_turn(&session), "Tool execution result: Unknown tool: no_such_tool");

    // system, user, assistant, user, assistant(action), user(tool), assistant
    let roles: Vec<Role> = session.conversation().messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
        ]
    );
}
