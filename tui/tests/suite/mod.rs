// Aggregates all former standalone integration tests as modules.
mod step_logic;
mod transcript_files;
