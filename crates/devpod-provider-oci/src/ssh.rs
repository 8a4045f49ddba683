use std::path::Path;
use std::process::{ExitCode, Stdio};

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::debug;

const SSH_USER: &str = "devpod";

/// Run `$COMMAND` on `ip` as the `devpod` user, streaming stdio through.
///
/// The remote exit code becomes ours.
pub async fn run_remote(ip: &str, private_key: &Path) -> Result<ExitCode> {
    let command = match std::env::var("COMMAND") {
        Ok(command) if !command.is_empty() => command,
        _ => bail!("COMMAND environment variable is not set"),
    };

    let args = ssh_args(ip, private_key, &command);
    debug!(ip, "running remote command");

    let status = Command::new("ssh")
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .context("run ssh")?;

    Ok(match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}

fn ssh_args(ip: &str, private_key: &Path, command: &str) -> Vec<String> {
    vec![
        "-o".into(),
        "StrictHostKeyChecking=no".into(),
        "-o".into(),
        "UserKnownHostsFile=/dev/null".into(),
        "-i".into(),
        private_key.display().to_string(),
        format!("{SSH_USER}@{ip}"),
        command.into(),
    ]
}
