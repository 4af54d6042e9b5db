//! YouTube Tools command-line front end: a Chromium-backed page adapter,
//! configuration resolution and the subcommand implementations.

pub mod browser_page;
pub mod cli;
pub mod config;
pub mod renderer;
