//! Runs `kubectl` with the session's kubeconfig and namespace, attached to the
//! operator's terminal.
//!
//! The child process is raced against an interrupt signal. On interrupt the
//! child gets a SIGINT, is killed if that cannot be delivered or it does not
//! exit in time, and the run is reported as interrupted.

use std::{
    future::Future,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use colored::Colorize;
use thiserror::Error;
use tokio::process::{Child, Command};

const KUBECTL: &str = "kubectl";
const STOP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command interrupted")]
    Interrupted,
    #[error("command exited with {0}")]
    Exited(ExitStatus),
    #[error("failed waiting for command: {0}")]
    Wait(#[source] std::io::Error),
}

/// Something that can run an external command to completion.
pub trait CommandRelay {
    async fn run(&self, args: &[String]) -> Result<(), RelayError>;
}

pub struct Kubectl {
    program: String,
    kubeconfig: PathBuf,
    namespace: String,
}

impl Kubectl {
    pub fn new(kubeconfig: &Path, namespace: &str) -> Self {
        Kubectl {
            program: KUBECTL.to_owned(),
            kubeconfig: kubeconfig.to_owned(),
            namespace: namespace.to_owned(),
        }
    }

    /// Full argument list, with the session flags in front of `args`.
    pub fn command_args(&self, args: &[String]) -> Vec<String> {
        let mut full = vec![
            "--kubeconfig".to_owned(),
            self.kubeconfig.display().to_string(),
            "-n".to_owned(),
            self.namespace.clone(),
        ];
        full.extend(args.iter().cloned());
        full
    }

    /// Convenience wrapper for call sites holding string literals.
    pub async fn exec(&self, args: &[&str]) -> Result<(), RelayError> {
        let args: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        self.run(&args).await
    }
}

impl CommandRelay for Kubectl {
    async fn run(&self, args: &[String]) -> Result<(), RelayError> {
        let full = self.command_args(args);
        println!(
            "exec command: {}",
            format!("{} {}", self.program, full.join(" ")).red()
        );

        let child = Command::new(&self.program)
            .args(&full)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| RelayError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        supervise(child, interrupted()).await
    }
}

/// Waits for `child`, unless `interrupt` resolves first.
pub async fn supervise(
    mut child: Child,
    interrupt: impl Future<Output = &'static str>,
) -> Result<(), RelayError> {
    let status = tokio::select! {
        status = child.wait() => Some(status),
        signal = interrupt => {
            println!("\nReceived signal: {}", signal);
            None
        }
    };

    match status {
        Some(status) => {
            let status = status.map_err(RelayError::Wait)?;
            if status.success() {
                Ok(())
            } else {
                Err(RelayError::Exited(status))
            }
        }
        None => {
            stop(&mut child).await;
            Err(RelayError::Interrupted)
        }
    }
}

async fn stop(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: `pid` is our own child and has not been reaped yet.
            let sent = unsafe { libc::kill(pid as libc::pid_t, libc::SIGINT) } == 0;
            if sent {
                match tokio::time::timeout(STOP_GRACE, child.wait()).await {
                    Ok(_) => return,
                    Err(_) => log::warn!("pid {} ignored interrupt, killing", pid),
                }
            } else {
                println!("Failed to send interrupt signal to pid {}", pid);
            }
        }
    }

    if let Err(err) = child.kill().await {
        log::warn!("failed to kill child process: {}", err);
    }
}

/// Resolves with the signal name once the operator interrupts (Ctrl-C) or
/// the process is asked to terminate.
pub async fn interrupted() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        if let Ok(mut terminate) = signal(SignalKind::terminate()) {
            return tokio::select! {
                _ = ctrl_c() => "interrupt",
                _ = terminate.recv() => "terminated",
            };
        }
    }

    ctrl_c().await;
    "interrupt"
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("unable to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
}
