//! Demonstration host for the Rail command dispatcher.
//!
//! The binary delegates to [`rail_demo::run`], which bootstraps a host over
//! the sample objects and answers JSONL commands read from stdin.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdin: StdinLock<'static> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    rail_demo::run(std::env::args_os(), stdin, &mut stdout, &mut stderr)
}
