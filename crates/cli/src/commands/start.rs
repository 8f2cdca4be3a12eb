//! `rayo start` — Interactive coding session.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use rayo_agent::{DispatchGate, Notice, Operator, Preview, Session, SessionSettings};
use rayo_config::RayoConfig;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

pub async fn run(model: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = RayoConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  No API keys configured.");
        eprintln!("  Please run `rayo config` to set up your API keys.");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let model = model.unwrap_or_else(|| config.default_model.clone());
    let router = rayo_providers::build_from_config(&config);
    let (provider, bare_model) = router.resolve(&model).map_err(|e| {
        format!(
            "{e}. Configured providers: {}",
            router.list().join(", ")
        )
    })?;

    let registry = Arc::new(rayo_tools::default_registry());
    let gate = DispatchGate::new(registry, Arc::new(ConsoleOperator));
    let settings = SessionSettings::from_config(&config).with_model(bare_model);
    let mut session = Session::new(provider, gate, settings);

    print_banner(&model);
    let interrupt = || async {
        let _ = tokio::signal::ctrl_c().await;
    };
    repl(&mut session, BufReader::new(io::stdin()), interrupt).await?;

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

fn print_banner(model: &str) {
    println!();
    println!("  ╔══════════════════════════════════════════════════════╗");
    println!("  ║              Rayo AI Coding Assistant                ║");
    println!("  ╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  I'm here to help with your coding tasks!");
    println!("  Type your requests, and I'll assist with reading files,");
    println!("  modifying code, running commands, and more.");
    println!();
    println!("  Model:  {model}");
    println!("  Type 'exit' or press Ctrl+C to quit.");
}

/// Read lines until an exit word, EOF, or `interrupt` fires.
///
/// `interrupt` is only raced against reading input. Once a message is
/// handed to the session, its action runs to completion, error, or its own
/// timeout.
async fn repl<R, F, Fut>(
    session: &mut Session,
    input: R,
    interrupt: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut lines = input.lines();

    loop {
        print!("\n  You: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = interrupt() => return Ok(()),
        };

        let Some(line) = line else {
            return Ok(());
        };
        let input = line.trim();
        if EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
            return Ok(());
        }
        if input.is_empty() {
            continue;
        }

        let reply = session.chat(input).await;
        println!("\n  Rayo: {reply}");
    }
}

/// Terminal operator: progress goes to stderr, previews are framed, and
/// approval is a `dialoguer` yes/no prompt that defaults to no.
struct ConsoleOperator;

#[async_trait]
impl Operator for ConsoleOperator {
    async fn confirm(&self, preview: &Preview) -> bool {
        eprintln!();
        eprintln!("{}", frame(preview.title(), &preview.body()));

        tokio::task::spawn_blocking(|| {
            dialoguer::Confirm::new()
                .with_prompt("Proceed with this operation?")
                .default(false)
                .interact()
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }

    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Reasoning(text) => eprintln!("\n  🤖 {text}\n"),
            Notice::Executing(name) => eprintln!("  Executing {name}..."),
            Notice::Finished {
                capability,
                success: true,
            } => eprintln!("  ✓ {capability} completed"),
            Notice::Finished {
                capability,
                success: false,
            } => eprintln!("  ⚠ {capability} completed with warnings"),
            Notice::Cancelled => eprintln!("  ✗ Operation cancelled by user"),
            Notice::FileUpdated(path) => eprintln!("  ✓ File updated: {path}"),
            Notice::Failed(message) => eprintln!("  ✗ {message}"),
            Notice::Warning(message) => eprintln!("  ⚠ Warning: {message}"),
        }
    }
}

/// Draw `body` inside a box with `title` in the top border.
fn frame(title: &str, body: &str) -> String {
    let heading = format!(" ⚠ {title} ");
    let width = body
        .lines()
        .map(|l| l.chars().count())
        .chain(std::iter::once(heading.chars().count()))
        .max()
        .unwrap_or(0)
        + 2;

    let mut out = String::new();
    let pad = width.saturating_sub(heading.chars().count());
    out.push_str(&format!("╭{heading}{}╮\n", "─".repeat(pad)));
    for line in body.lines() {
        let fill = width - 2 - line.chars().count();
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(fill)));
    }
    out.push_str(&format!("╰{}╯", "─".repeat(width)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayo_core::error::ProviderError;
    use rayo_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedProvider {
        replies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            let content = self.replies.lock().unwrap().remove(0);
            Ok(ProviderResponse {
                content,
                usage: None,
                model: request.model,
            })
        }
    }

    struct Approve;

    #[async_trait]
    impl Operator for Approve {
        async fn confirm(&self, _preview: &Preview) -> bool {
            true
        }
    }

    fn session_with(replies: Vec<String>) -> Session {
        let provider = Arc::new(ScriptedProvider {
            replies: Mutex::new(replies),
        });
        let gate = DispatchGate::new(Arc::new(rayo_tools::default_registry()), Arc::new(Approve));
        Session::new(provider, gate, SessionSettings::default())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interrupt_does_not_cut_short_a_running_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let command = format!("sleep 1 && touch {}", marker.display());
        let action = serde_json::json!({"tool": "run_bash", "parameters": {"command": command}});
        let mut session = session_with(vec![action.to_string(), "Done.".into()]);

        // Fires well before the command finishes.
        let interrupt = || tokio::time::sleep(Duration::from_millis(100));
        repl(&mut session, "run it\n".as_bytes(), interrupt).await.unwrap();

        assert!(marker.exists(), "command was interrupted");
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn interrupt_while_waiting_for_input_ends_the_session() {
        let mut session = session_with(Vec::new());
        let (_writer, reader) = tokio::io::duplex(64);

        let interrupt = || async {};
        repl(&mut session, BufReader::new(reader), interrupt).await.unwrap();

        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test]
    async fn exit_words_and_blank_lines() {
        let mut session = session_with(Vec::new());
        let interrupt = || std::future::pending::<()>();

        repl(&mut session, "\n   \nQuit\nhello\n".as_bytes(), interrupt)
            .await
            .unwrap();

        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn frame_lines_share_a_width() {
        let framed = frame("Shell Command", "ls -la\necho a much longer line than the title");
        let widths: Vec<usize> = framed.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{framed}");
        assert!(framed.starts_with("╭ ⚠ Shell Command "));
    }

    #[test]
    fn frame_fits_a_long_title() {
        let framed = frame("File Modification", "x");
        let widths: Vec<usize> = framed.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{framed}");
    }

    #[test]
    fn frame_handles_blank_lines() {
        let preview = Preview::Patch {
            path: "a.py".into(),
            original: "x = 1".into(),
            new: "x = 2".into(),
        };
        let framed = frame(preview.title(), &preview.body());
        assert!(framed.contains("│ File: a.py"));
        assert!(framed.contains("│ + New:"));
    }
}
