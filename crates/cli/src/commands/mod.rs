//! Subcommand implementations. Each module owns one `clap::Args` struct
//! and a `run` method, following this workspace's own
//! `commands::install`/`commands::validate` split.

pub mod down;
pub mod init;
pub mod list;
pub mod start;
pub mod stop;
pub mod tools;
pub mod up;
