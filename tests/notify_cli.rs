use std::process::Command;

fn notify() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_agent-notify"));
    cmd.env_remove("TELEGRAM_BOT_TOKEN")
        .env_remove("TELEGRAM_CHAT_ID")
        .env_remove("TELEGRAM_API_BASE")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn no_message_and_no_replies_prints_usage_and_fails() {
    let output = notify().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "stdout was: {stdout}");
}

#[test]
fn empty_message_prints_usage_without_sending() {
    let output = notify()
        .env("TELEGRAM_BOT_TOKEN", "123:abc")
        .env("TELEGRAM_CHAT_ID", "42")
        .env("TELEGRAM_API_BASE", "http://127.0.0.1:9")
        .arg("")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "stdout was: {stdout}");
    assert!(String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn missing_token_is_reported_on_stderr() {
    let output = notify().arg("Build complete!").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: TELEGRAM_BOT_TOKEN not set"), "stderr was: {stderr}");
}

#[test]
fn missing_chat_id_fails_at_send_time() {
    let output = notify()
        .env("TELEGRAM_BOT_TOKEN", "123:abc")
        .env("TELEGRAM_API_BASE", "http://127.0.0.1:9")
        .arg("hi")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: No chat_id specified"), "stderr was: {stderr}");
}

#[test]
fn unreachable_api_is_a_transport_error() {
    let output = notify()
        .env("TELEGRAM_BOT_TOKEN", "123:abc")
        .env("TELEGRAM_CHAT_ID", "42")
        .env("TELEGRAM_API_BASE", "http://127.0.0.1:9")
        .args(["hi", "--quiet"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: Connection error"), "stderr was: {stderr}");
}
