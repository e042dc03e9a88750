//! Command-line interface for servicemap
//!
//! - Argument parsing (`args`)
//! - Runtime setup: worker pool and logging (`setup`)

pub mod args;
pub mod setup;

pub use args::{parse_args, Cli, Commands, RunArgs};
pub use setup::{configure_thread_pool, get_worker_count, init_logging, log_filter};
