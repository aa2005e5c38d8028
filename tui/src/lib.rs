// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
// The standalone `transcript-tui` binary reports startup errors itself; the
// library only logs.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::fs::OpenOptions;
use std::sync::Arc;

use app::App;
use step_container::StepContext;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use transcript_config::find_transcript_home;
use transcript_config::load_config;
use transcript_config::parse_overrides;
use transcript_feedback::DevDataSink;
use transcript_feedback::TelemetrySink;
use transcript_feedback::TracingSink;
use transcript_protocol::ChatTurn;
use transcript_protocol::SessionId;

mod app;
mod app_event;
mod app_event_sender;
mod cli;
mod clipboard_text;
mod markdown_render;
mod render;
pub mod step;
pub mod step_container;
mod style;
mod transcript;
mod tui;
mod wrapping;

pub use app_event::StepAction;
pub use cli::Cli;
pub use transcript::Transcript;
pub use transcript::TranscriptLoadError;

const LOG_FILE_NAME: &str = "transcript-tui.log";
const DEFAULT_LOG_FILTER: &str = "transcript_tui=info,transcript_feedback=info,transcript_config=info";

pub async fn run_main(cli: Cli) -> std::io::Result<()> {
    let transcript_home = find_transcript_home().map_err(std::io::Error::other)?;
    let cli_kv_overrides = parse_overrides(&cli.raw_overrides).map_err(std::io::Error::other)?;
    let mut config =
        load_config(&transcript_home, cli_kv_overrides).map_err(std::io::Error::other)?;
    if cli.raw_markdown {
        config.ui.display_raw_markdown = true;
    }

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    // Open (or create) the log file, appending to it.
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Ensure the file is only readable and writable by the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join(LOG_FILE_NAME))?;

    // Wrap file in non‑blocking writer.
    let (non_blocking, _guard) = non_blocking(log_file);

    // use RUST_LOG env var, default to info for the transcript crates.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        // Keep targets so dev-data records (`target: dev_data`) can be
        // filtered and grepped separately.
        .with_target(true)
        .with_ansi(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    let transcript = Transcript::load(&cli.transcript).map_err(std::io::Error::other)?;
    let session_id = cli
        .session_id
        .map(SessionId::from)
        .or(transcript.session_id)
        .unwrap_or_default();
    tracing::info!(
        session_id = %session_id,
        home = %config.transcript_home.display(),
        "starting transcript viewer"
    );

    let (sink, writer): (Arc<dyn TelemetrySink>, Option<JoinHandle<()>>) =
        match config.dev_data_dir.clone() {
            Some(dir) => {
                let (sink, writer) = DevDataSink::spawn(dir);
                (Arc::new(sink), Some(writer))
            }
            None => (Arc::new(TracingSink), None),
        };

    let context = StepContext {
        active: cli.active,
        session_id,
        ui: config.ui,
    };
    let result = run_ratatui_app(transcript.history, context, sink).await;

    // Every sink clone is gone once the app has returned; wait for the
    // writer to flush what is queued.
    if let Some(writer) = writer
        && let Err(err) = writer.await
    {
        tracing::warn!("dev data writer failed: {err}");
    }

    result.map_err(|err| std::io::Error::other(err.to_string()))
}

async fn run_ratatui_app(
    history: Vec<ChatTurn>,
    context: StepContext,
    sink: Arc<dyn TelemetrySink>,
) -> color_eyre::Result<()> {
    color_eyre::install()?;

    let terminal = tui::init()?;
    let mut tui = tui::Tui::new(terminal);
    let result = App::run(&mut tui, history, context, sink).await;

    tui::restore()?;
    if let Err(err) = &result {
        tracing::error!("transcript viewer exited with an error: {err}");
    }
    result
}
