//! Ad-hoc tunnel pods.
//!
//! A tunnel cycle creates a single-container socat pod in the session
//! namespace, waits for it to run, forwards a local port into it with
//! `kubectl port-forward`, and deletes it again. Once the pod has been
//! created it is deleted exactly once, however the cycle ends.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use colored::Colorize;
use k8s_openapi::api::core::v1::{Event, Pod};
use k8s_util::{
    apis::Apis,
    config_dir::TunnelImageConfig,
    kube_types::{container_conditions, event_line, pod_is_running, pod_phase, PodName},
};
use thiserror::Error;

use crate::relay::{self, CommandRelay, RelayError};

mod pod;
mod prompt;

pub use pod::{generate_pod_name, tunnel_pod, TunnelRequest};
pub use prompt::{tunnel_session, DialoguerPrompt, TunnelPrompt};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("invalid address {0:?}, expected host:port")]
    InvalidAddress(String),
    #[error("local port is required")]
    MissingLocalPort,
    #[error("error creating tunnel pod: {0}")]
    PodCreateFailed(#[source] kube::Error),
    #[error("error getting status of tunnel pod {pod}: {source}")]
    PodFetchFailed {
        pod: String,
        #[source]
        source: kube::Error,
    },
    #[error("tunnel pod {pod} was not running after {waited:?}")]
    ReadyTimeout { pod: String, waited: Duration },
    #[error("interrupted while waiting for tunnel pod {0}")]
    Interrupted(String),
    #[error("port forward through tunnel pod failed: {0}")]
    ForwardFailed(#[source] RelayError),
    #[error("error deleting tunnel pod {pod}: {source}")]
    PodDeleteFailed {
        pod: String,
        #[source]
        source: kube::Error,
    },
}

/// Pod operations a tunnel cycle needs from the cluster.
pub trait TunnelBackend {
    fn namespace(&self) -> &str;
    async fn create_pod(&self, pod: &Pod) -> kube::Result<Pod>;
    async fn get_pod(&self, name: &str) -> kube::Result<Pod>;
    async fn delete_pod(&self, name: &str) -> kube::Result<()>;
    async fn pod_events(&self, name: &str) -> kube::Result<Vec<Event>>;
}

impl TunnelBackend for Apis {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn create_pod(&self, pod: &Pod) -> kube::Result<Pod> {
        Apis::create_pod(self, pod).await
    }

    async fn get_pod(&self, name: &str) -> kube::Result<Pod> {
        Apis::get_pod(self, name).await
    }

    async fn delete_pod(&self, name: &str) -> kube::Result<()> {
        Apis::delete_pod(self, name).await
    }

    async fn pod_events(&self, name: &str) -> kube::Result<Vec<Event>> {
        Apis::pod_events(self, name).await
    }
}

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    /// Client-side bound on waiting for the pod. `None` leaves it to the
    /// pod's active deadline.
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        PollOptions {
            interval: POLL_INTERVAL,
            timeout: None,
        }
    }
}

pub struct Tunnel<'a, B, R> {
    backend: &'a B,
    relay: &'a R,
    poll: PollOptions,
}

impl<'a, B: TunnelBackend, R: CommandRelay> Tunnel<'a, B, R> {
    pub fn new(backend: &'a B, relay: &'a R, poll: PollOptions) -> Self {
        Tunnel {
            backend,
            relay,
            poll,
        }
    }

    /// Runs one full cycle, interruptible with Ctrl-C while waiting for the
    /// pod.
    pub async fn run_cycle(
        &self,
        request: &TunnelRequest,
        image: &TunnelImageConfig,
    ) -> Result<(), TunnelError> {
        self.run_cycle_until(request, image, relay::interrupted())
            .await
    }

    pub async fn run_cycle_until(
        &self,
        request: &TunnelRequest,
        image: &TunnelImageConfig,
        interrupt: impl Future<Output = &'static str>,
    ) -> Result<(), TunnelError> {
        let spec = tunnel_pod(
            &generate_pod_name(),
            self.backend.namespace(),
            request,
            image,
        );

        println!("Creating tunnel pod for {}...", request.target());
        let created = self
            .backend
            .create_pod(&spec)
            .await
            .map_err(TunnelError::PodCreateFailed)?;
        let pod = PodName {
            namespace: self.backend.namespace().to_owned(),
            name: created.metadata.name.or(spec.metadata.name).unwrap_or_default(),
        };
        log::info!("created tunnel pod {}", pod);

        let result = self.wait_and_forward(&pod, request, interrupt).await;
        self.teardown(&pod).await;
        result
    }

    async fn wait_and_forward(
        &self,
        pod: &PodName,
        request: &TunnelRequest,
        interrupt: impl Future<Output = &'static str>,
    ) -> Result<(), TunnelError> {
        println!("Waiting for tunnel pod to be ready...");
        tokio::select! {
            ready = self.wait_running(&pod.name) => ready?,
            signal = interrupt => {
                println!("\nReceived signal: {}", signal);
                return Err(TunnelError::Interrupted(pod.name.clone()));
            }
        }

        println!(
            "Tunneling {} to localhost:{}",
            request.target(),
            request.local_port()
        );
        self.relay
            .run(&request.port_forward_args(&pod.name))
            .await
            .map_err(TunnelError::ForwardFailed)
    }

    /// Polls the pod until its phase is `Running`. Container states and pod
    /// events are printed on every round; they never end the wait.
    async fn wait_running(&self, name: &str) -> Result<(), TunnelError> {
        let start = Instant::now();
        loop {
            let pod = self
                .backend
                .get_pod(name)
                .await
                .map_err(|source| TunnelError::PodFetchFailed {
                    pod: name.to_owned(),
                    source,
                })?;
            if pod_is_running(&pod) {
                return Ok(());
            }

            tokio::time::sleep(self.poll.interval).await;
            let waited = start.elapsed();
            if let Some(timeout) = self.poll.timeout {
                if waited >= timeout {
                    return Err(TunnelError::ReadyTimeout {
                        pod: name.to_owned(),
                        waited,
                    });
                }
            }

            println!("Waiting for tunnel pod. Total time cost: {:?}", waited);
            println!("Pod status: {}", pod_phase(&pod));
            for condition in container_conditions(&pod) {
                println!("{}", condition);
            }
            match self.backend.pod_events(name).await {
                Ok(events) => {
                    for event in &events {
                        println!("{}", event_line(event));
                    }
                }
                Err(err) => log::debug!("could not list events for {}: {}", name, err),
            }
        }
    }

    async fn teardown(&self, pod: &PodName) {
        println!("Cleaning up tunnel pod...");
        match self.backend.delete_pod(&pod.name).await {
            Ok(()) => log::info!("deleted tunnel pod {}", pod),
            Err(source) => {
                let err = TunnelError::PodDeleteFailed {
                    pod: pod.name.clone(),
                    source,
                };
                println!("{}", err.to_string().red());
                log::warn!("{:?}", err);
            }
        }
    }
}

#[cfg(all(test, unix))]
pub(crate) mod fake;
