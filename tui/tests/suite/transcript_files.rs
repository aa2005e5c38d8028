use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use transcript_protocol::Role;
use transcript_protocol::SessionId;
use transcript_tui::Transcript;

#[test]
fn loads_a_saved_session_from_disk() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("session.json");
    fs::write(
        &path,
        r#"{
            "sessionId": "0192a4c6-0000-7000-8000-000000000000",
            "history": [
                {"role": "user", "content": "Summarize this"},
                {"role": "assistant", "content": "Sure 👍", "promptLogs": null}
            ]
        }"#,
    )
    .expect("write transcript");

    let transcript = Transcript::load(&path).expect("load transcript");
    assert_eq!(
        transcript.session_id,
        Some(SessionId::from("0192a4c6-0000-7000-8000-000000000000"))
    );
    let roles: Vec<Role> = transcript.history.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
    assert!(transcript.history[1].prompt_logs.is_empty());
}
