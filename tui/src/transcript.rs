//! Loading a recorded chat transcript from disk.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use transcript_protocol::ChatTurn;
use transcript_protocol::SessionId;

#[derive(Debug, Error)]
pub enum TranscriptLoadError {
    #[error("failed to read transcript {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse transcript {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub session_id: Option<SessionId>,
    pub history: Vec<ChatTurn>,
}

/// Accepted file shapes: a bare array of turns, or a saved session object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    History(Vec<ChatTurn>),
    Session {
        #[serde(default, rename = "sessionId", alias = "session_id")]
        session_id: Option<SessionId>,
        history: Vec<ChatTurn>,
    },
}

impl Transcript {
    pub fn load(path: &Path) -> Result<Self, TranscriptLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TranscriptLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let transcript = Self::parse(&contents).map_err(|source| TranscriptLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            turns = transcript.history.len(),
            "loaded transcript"
        );
        Ok(transcript)
    }

    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str::<TranscriptFile>(contents)? {
            TranscriptFile::History(history) => Self {
                session_id: None,
                history,
            },
            TranscriptFile::Session {
                session_id,
                history,
            } => Self {
                session_id,
                history,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use transcript_protocol::Role;

    #[test]
    fn parses_a_bare_history_array() {
        let transcript = Transcript::parse(
            r#"[{"role": "user", "content": "hi"}, {"role": "assistant", "content": "Hello."}]"#,
        )
        .unwrap();
        assert_eq!(transcript.session_id, None);
        assert_eq!(
            transcript.history,
            vec![
                ChatTurn::new(Role::User, "hi"),
                ChatTurn::new(Role::Assistant, "Hello."),
            ]
        );
    }

    #[test]
    fn parses_a_session_object() {
        let transcript = Transcript::parse(
            r#"{"sessionId": "abc", "history": [{"role": "assistant", "content": "Hi.", "promptLogs": [{"model": "m"}]}]}"#,
        )
        .unwrap();
        assert_eq!(transcript.session_id, Some(SessionId::from("abc")));
        assert_eq!(transcript.history[0].prompt_logs.len(), 1);
    }

    #[test]
    fn load_reports_the_path_on_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Transcript::load(file.path()).unwrap_err();
        assert_matches!(err, TranscriptLoadError::Parse { .. });
        assert!(err.to_string().contains(&file.path().display().to_string()));

        let missing = file.path().with_extension("missing");
        assert_matches!(
            Transcript::load(&missing),
            Err(TranscriptLoadError::Read { .. })
        );
    }
}
