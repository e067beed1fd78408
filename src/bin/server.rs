//! Travel-plan agent server binary.
//! Run with: cargo run --bin tourplan-server

use std::process::ExitCode;

use tourplan_agent::startup;

fn main() -> ExitCode {
    startup::run()
}
