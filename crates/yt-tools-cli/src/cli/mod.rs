//! CLI subcommand implementations for the `yt-tools` binary.

pub mod doctor;
pub mod download_cmd;
pub mod output;
pub mod settings_cmd;
pub mod transcript_cmd;
pub mod update_cmd;
