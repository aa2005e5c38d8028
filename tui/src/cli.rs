use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(version, about = "Browse and rate a recorded chat transcript")]
pub struct Cli {
    /// Transcript JSON: an array of turns or `{ "sessionId", "history" }`.
    #[arg(value_name = "TRANSCRIPT")]
    pub transcript: PathBuf,

    /// Override a config.toml value, e.g. `-c display_raw_markdown=true`.
    /// Dotted keys address nested tables. Values parse as TOML, falling back
    /// to a plain string.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "key=value",
        action = clap::ArgAction::Append
    )]
    pub raw_overrides: Vec<String>,

    /// Show message bodies as literal markdown source.
    #[arg(long = "raw-markdown", default_value_t = false)]
    pub raw_markdown: bool,

    /// Session id attached to feedback records. Defaults to the transcript's
    /// own id, or a fresh one.
    #[arg(long = "session-id", value_name = "ID")]
    pub session_id: Option<String>,

    /// Start with a response marked as generating.
    #[arg(long = "active", default_value_t = false)]
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_repeated_overrides_and_flags() {
        let cli = Cli::parse_from([
            "transcript-tui",
            "-c",
            "display_raw_markdown=true",
            "--config",
            "dev_data.enabled=false",
            "--session-id",
            "s-1",
            "chat.json",
        ]);
        assert_eq!(cli.transcript, PathBuf::from("chat.json"));
        assert_eq!(
            cli.raw_overrides,
            vec!["display_raw_markdown=true", "dev_data.enabled=false"]
        );
        assert_eq!(cli.session_id.as_deref(), Some("s-1"));
        assert!(!cli.active);
        assert!(!cli.raw_markdown);
    }
}
