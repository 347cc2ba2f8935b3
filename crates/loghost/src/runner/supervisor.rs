//! Launching and waiting on child processes: an application command run in
//! the foreground under the logger, or a logger instance spawned into the
//! background.

use std::process::{ExitStatus, Stdio};

use loghost_core::{ControlError, InstanceId};
use loghost_core::naming::INSTANCE_ID_ENV;
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Launch `argv` in the foreground, with the instance identifier in its
/// environment, and wait for its exit status. Stdio is inherited so the
/// command runs visibly under the logger.
pub async fn launch_and_wait(
    argv: &[String],
    instance_id: &InstanceId,
) -> Result<ExitStatus, ControlError> {
    let (program, args) = split_argv(argv)?;
    info!(command = %program, "launching supervised command");
    debug!(?argv, "supervised command line");

    let mut child = Command::new(program)
        .args(args)
        .env(INSTANCE_ID_ENV, instance_id.as_str())
        .spawn()
        .map_err(|source| ControlError::LaunchFailed {
            command: program.clone(),
            source,
        })?;

    child.wait().await.map_err(ControlError::ExitCodeUnavailable)
}

/// Launch `argv` detached: its own process group, no inherited stdio. The
/// caller keeps the handle only to observe an early exit.
pub fn launch_detached(argv: &[String], instance_id: &InstanceId) -> Result<Child, ControlError> {
    let (program, args) = split_argv(argv)?;
    info!(command = %program, "launching detached process");

    let mut command = std::process::Command::new(program);
    command
        .args(args)
        .env(INSTANCE_ID_ENV, instance_id.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut command = Command::from(command);
    command.kill_on_drop(false);
    command.spawn().map_err(|source| ControlError::LaunchFailed {
        command: program.clone(),
        source,
    })
}

fn split_argv(argv: &[String]) -> Result<(&String, &[String]), ControlError> {
    match argv.split_first() {
        Some((program, args)) => Ok((program, args)),
        None => Err(ControlError::Usage("empty child command line".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn id(raw: &str) -> InstanceId {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn successful_command_reports_success() {
        let status = launch_and_wait(&argv(&["true"]), &id("")).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn failing_command_reports_its_exit_status() {
        let status = launch_and_wait(&argv(&["false"]), &id("")).await.unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_failure() {
        let result = launch_and_wait(&argv(&["loghost-no-such-binary"]), &id("")).await;
        assert!(matches!(result, Err(ControlError::LaunchFailed { .. })));
    }

    #[tokio::test]
    async fn instance_id_is_propagated_to_the_child() {
        let script = format!("test \"${INSTANCE_ID_ENV}\" = t1");
        let status = launch_and_wait(&argv(&["sh", "-c", &script]), &id("t1"))
            .await
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn detached_launch_yields_a_live_handle() {
        let mut child = launch_detached(&argv(&["sleep", "5"]), &id("")).unwrap();
        assert!(child.id().is_some());
        child.kill().await.unwrap();
    }
}
