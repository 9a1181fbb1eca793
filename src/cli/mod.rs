//! Command-line interface components
//!
//! This module contains CLI-specific code for the nflverse fetcher binary:
//! argument parsing and the command handlers built on the library API.

pub mod args;
pub mod commands;

pub use args::{
    CacheAction, CacheArgs, Cli, Commands, GlobalArgs, LoadArgs, RawArgs, UrlArgs,
};
pub use commands::{handle_cache, handle_load, handle_raw, handle_url, write_json_lines};
