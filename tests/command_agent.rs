//! Turns through a real child process speaking the agent protocol.
#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use tokio::time::timeout;

use agentzero::agent::AgentBackend;
use agentzero::config::{ConsoleConfig, Credentials, Provider};
use agentzero::console::{Console, Submission};
use agentzero::session::Role;
use agentzero::turn::{Notice, TurnHandler};

fn write_script(dir: &Path, body: &str) -> String {
    let path = dir.join("agent.sh");
    std::fs::write(&path, body).unwrap();
    path.display().to_string()
}

fn console_for(dir: &Path, script: &str) -> Console {
    let config_path = dir.join("config.yaml");
    std::fs::write(
        &config_path,
        format!("backend:\n  command: [\"sh\", \"{script}\"]\nplaceholder_delay_ms: 0\n"),
    )
    .unwrap();
    let loaded = ConsoleConfig::load_file(&config_path).unwrap();
    let backend = AgentBackend::select(&loaded.backend, Duration::ZERO);
    assert!(backend.is_available());
    Console::new(TurnHandler::new(backend), loaded.agent, Credentials::default())
}

#[tokio::test]
async fn reply_comes_from_program() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "cat > \"$(dirname \"$0\")/request.json\"\nprintf '{\"reply\": \"key=%s\"}' \"$OPENAI_API_KEY\"\n",
    );
    let mut console = console_for(dir.path(), &script);
    console.set_credential(Provider::OpenAi, "sk-child");

    let Submission::Turn(outcome) = console.submit("What is 2+2?").await else {
        panic!("expected a turn");
    };
    assert_eq!(outcome.reply, "key=sk-child");
    assert!(outcome.notice.is_none());

    let request = std::fs::read_to_string(dir.path().join("request.json")).unwrap();
    let request: serde_json::Value = serde_json::from_str(&request).unwrap();
    assert_eq!(request["prompt"], "What is 2+2?");
    assert_eq!(request["config"]["chat_model"], "gpt-3.5-turbo");

    let turns = console.session().transcript.turns();
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].text, "key=sk-child");
}

#[tokio::test]
async fn program_failure_becomes_error_turn() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "cat > /dev/null\necho 'boom' >&2\nexit 3\n");
    let mut console = console_for(dir.path(), &script);

    let Submission::Turn(outcome) = console.submit("Hello").await else {
        panic!("expected a turn");
    };
    assert!(outcome.reply.starts_with("Error: "));
    assert!(outcome.reply.contains("boom"));
    assert!(matches!(outcome.notice, Some(Notice::Error(_))));
    assert_eq!(console.session().transcript.len(), 2);

    // Still usable afterwards.
    console.submit("again").await;
    assert_eq!(console.session().transcript.len(), 4);
}

#[tokio::test]
async fn reported_error_is_shown() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "cat > /dev/null\necho '{\"error\": \"quota exceeded\"}'\n");
    let mut console = console_for(dir.path(), &script);

    let Submission::Turn(outcome) = console.submit("Hello").await else {
        panic!("expected a turn");
    };
    assert_eq!(outcome.reply, "Error: quota exceeded");
    assert_eq!(
        outcome.notice,
        Some(Notice::Error("An error occurred: quota exceeded".into()))
    );
}

#[tokio::test]
async fn program_ignoring_stdin_still_answers() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "echo '{\"reply\": \"ok\"}'\n");
    let mut console = console_for(dir.path(), &script);

    let prompt = "x".repeat(200_000);
    let Submission::Turn(outcome) = console.submit(&prompt).await else {
        panic!("expected a turn");
    };
    assert_eq!(outcome.reply, "ok");
    assert!(outcome.notice.is_none());
}

#[tokio::test]
async fn large_output_before_reading_input_does_not_stall() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "head -c 200000 /dev/zero | tr '\\0' 'y' >&2\ncat > /dev/null\necho '{\"reply\": \"done\"}'\n",
    );
    let mut console = console_for(dir.path(), &script);

    let prompt = "x".repeat(200_000);
    let result = timeout(Duration::from_secs(10), console.submit(&prompt))
        .await
        .expect("turn should finish while the program writes before reading");
    let Submission::Turn(outcome) = result else {
        panic!("expected a turn");
    };
    assert_eq!(outcome.reply, "done");
}
