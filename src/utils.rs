//! # Utils Module
//!
//! Utility functions to run external commands. Every subprocess invocation
//! in this crate — compose runtime, `docker inspect`, resolver-file
//! elevation, cache flush, git — goes through `run_command` so it is logged
//! uniformly.

use log::{debug, error};
use std::io::{self, ErrorKind};
use std::process::{Command, Output};

/// Run an external command and capture its output.
/// Logs the command, its output, and any potential errors.
///
/// # Arguments
///
/// * `cmd` - A string slice that holds the name of the command.
/// * `args` - A slice of string slices that contain the arguments to the command.
///
/// # Returns
///
/// * `io::Result<Output>` - The output from the command execution.
pub fn run_command(cmd: &str, args: &[&str]) -> io::Result<Output> {
    debug!("Running command: {cmd} {}", args.join(" "));

    match Command::new(cmd).args(args).output() {
        Ok(output) => {
            debug!("status: {}", output.status);
            debug!("stdout: {}", String::from_utf8_lossy(&output.stdout));
            debug!("stderr: {}", String::from_utf8_lossy(&output.stderr));
            Ok(output)
        }
        Err(e) => {
            error!("Failed to run command '{cmd}': {e}");
            Err(io::Error::new(ErrorKind::Other, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let output = run_command("echo", &["hello", "world"]).unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hello world\n");
    }

    #[test]
    fn test_run_command_missing_binary() {
        let result = run_command("definitely-not-a-real-binary-xyz-12345", &[]);
        assert!(result.is_err());
    }
}
