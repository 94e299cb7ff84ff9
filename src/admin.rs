//! Admin actions: the CPU stress trigger used to exercise autoscaling.

use std::process::{Child, Command};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("stress duration must be positive")]
    ZeroDuration,
    #[error("failed to start `stress`: {0}")]
    Spawn(#[from] std::io::Error),
}

/// `stress --cpu {cpus} --timeout {seconds}`
pub fn stress_command(cpus: u32, seconds: u64) -> Command {
    let mut command = Command::new("stress");
    command
        .arg("--cpu")
        .arg(cpus.to_string())
        .arg("--timeout")
        .arg(seconds.to_string());
    command
}

/// Start `stress` in the background and return without waiting for it.
pub fn spawn_stress(cpus: u32, seconds: u64) -> Result<Child, AdminError> {
    if seconds == 0 {
        return Err(AdminError::ZeroDuration);
    }
    let child = stress_command(cpus, seconds).spawn()?;
    log::info!(
        "started stress (pid {}) on {} cpus for {}s",
        child.id(),
        cpus,
        seconds
    );
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn stress_command_arguments() {
        let command = stress_command(8, 60);
        assert_eq!(command.get_program(), "stress");
        let args: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(args, ["--cpu", "8", "--timeout", "60"]);
    }

    #[test]
    fn zero_duration_is_rejected_before_spawning() {
        assert!(matches!(spawn_stress(1, 0), Err(AdminError::ZeroDuration)));
    }
}
