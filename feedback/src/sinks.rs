use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::TelemetrySink;

/// Target used by [`TracingSink`] so the records can be filtered with
/// `RUST_LOG=dev_data=info`.
const DEV_DATA_TARGET: &str = "dev_data";

#[derive(Debug)]
struct DevDataRecord {
    table_name: String,
    payload: Value,
}

/// Appends records to `<dir>/<table>.jsonl` from a background task.
///
/// `log` only pushes onto an unbounded channel. The writer task exits once
/// every clone of the sink has been dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct DevDataSink {
    tx: mpsc::UnboundedSender<DevDataRecord>,
}

impl DevDataSink {
    /// Spawns the writer on the current tokio runtime.
    pub fn spawn(dir: PathBuf) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_records(dir, rx));
        (Self { tx }, handle)
    }
}

impl TelemetrySink for DevDataSink {
    fn log(&self, table_name: &str, payload: Value) {
        let record = DevDataRecord {
            table_name: table_name.to_string(),
            payload,
        };
        if self.tx.send(record).is_err() {
            tracing::warn!(table_name, "dev data writer has stopped; dropping record");
        }
    }
}

async fn write_records(dir: PathBuf, mut rx: mpsc::UnboundedReceiver<DevDataRecord>) {
    while let Some(record) = rx.recv().await {
        if let Err(err) = append_record(&dir, &record).await {
            tracing::warn!(
                table_name = %record.table_name,
                "failed to write dev data record: {err}"
            );
        }
    }
}

async fn append_record(dir: &std::path::Path, record: &DevDataRecord) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.jsonl", table_file_stem(&record.table_name)));
    let mut line = serde_json::to_vec(&record.payload)?;
    line.push(b'\n');
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(&line).await?;
    file.flush().await
}

/// Table names become file names, so anything outside `[A-Za-z0-9_-]` is
/// replaced.
fn table_file_stem(table_name: &str) -> String {
    let stem: String = table_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}

/// Emits each record as a tracing event instead of writing it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn log(&self, table_name: &str, payload: Value) {
        tracing::info!(target: DEV_DATA_TARGET, table_name, %payload, "dev data");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub table_name: String,
    pub payload: Value,
}

/// Keeps records in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn log(&self, table_name: &str, payload: Value) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(RecordedEvent {
                table_name: table_name.to_string(),
                payload,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn dev_data_sink_appends_json_lines_per_table() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("dev_data");
        let (sink, writer) = DevDataSink::spawn(dir.clone());

        sink.log("chat", json!({ "feedback": true }));
        sink.log("chat", json!({ "feedback": false }));
        sink.log("tokens", json!({ "n": 3 }));
        drop(sink);
        writer.await.expect("writer task");

        let chat = std::fs::read_to_string(dir.join("chat.jsonl")).expect("chat table");
        assert_eq!(chat, "{\"feedback\":true}\n{\"feedback\":false}\n");
        let tokens = std::fs::read_to_string(dir.join("tokens.jsonl")).expect("tokens table");
        assert_eq!(tokens, "{\"n\":3}\n");
    }

    #[tokio::test]
    async fn dev_data_sink_survives_unwritable_dir() {
        let temp = TempDir::new().expect("temp dir");
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "not a dir").expect("write");
        let (sink, writer) = DevDataSink::spawn(blocker.join("dev_data"));

        sink.log("chat", json!({}));
        drop(sink);

        writer.await.expect("writer task should finish cleanly");
    }

    #[test]
    fn table_names_are_sanitized() {
        assert_eq!(table_file_stem("chat"), "chat");
        assert_eq!(table_file_stem("../etc/passwd"), "___etc_passwd");
        assert_eq!(table_file_stem(""), "unnamed");
    }

    #[test]
    fn recording_sink_clones_share_events() {
        let sink = RecordingSink::default();
        let clone = sink.clone();

        clone.log("chat", json!(1));

        assert_eq!(
            sink.events(),
            vec![RecordedEvent {
                table_name: "chat".to_string(),
                payload: json!(1),
            }]
        );
    }
}
