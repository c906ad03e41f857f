//! In-memory stand-ins for the cluster, kubectl and the operator.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    os::unix::process::ExitStatusExt,
    process::ExitStatus,
};

use k8s_openapi::api::core::v1::{
    ContainerState, ContainerStateTerminated, ContainerStatus, Event, Pod, PodStatus,
};
use kube::error::ErrorResponse;
use serde_json::json;

use super::{TunnelBackend, TunnelPrompt};
use crate::relay::{CommandRelay, RelayError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Get(String),
    Delete(String),
    Events(String),
}

/// What a `get_pod` call observes.
#[derive(Debug, Clone, Copy)]
pub enum Observed {
    Pending,
    Crashed,
    Running,
    FetchError,
}

pub fn api_error(code: u16, reason: &str) -> kube::Error {
    let response: ErrorResponse = serde_json::from_value(json!({
        "status": "Failure",
        "message": format!("simulated {}", reason),
        "reason": reason,
        "code": code,
    }))
    .unwrap();
    kube::Error::Api(response)
}

pub struct FakeBackend {
    pub calls: RefCell<Vec<Call>>,
    observed: RefCell<VecDeque<Observed>>,
    last: Cell<Observed>,
    pub fail_create: bool,
    pub fail_delete: bool,
    pub fail_events: bool,
}

impl FakeBackend {
    /// Answers `get_pod` with `observed` in order, repeating the last entry.
    pub fn new(observed: &[Observed]) -> Self {
        FakeBackend {
            calls: RefCell::new(Vec::new()),
            observed: RefCell::new(observed.iter().copied().collect()),
            last: Cell::new(Observed::Running),
            fail_create: false,
            fail_delete: false,
            fail_events: false,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn created_name(&self) -> Option<String> {
        self.calls.borrow().iter().find_map(|call| match call {
            Call::Create(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Delete(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn next_observed(&self) -> Observed {
        if let Some(next) = self.observed.borrow_mut().pop_front() {
            self.last.set(next);
        }
        self.last.get()
    }
}

fn pod_in_phase(name: &str, phase: &str, crashed: bool) -> Pod {
    let mut pod = Pod::default();
    pod.metadata.name = Some(name.to_owned());
    let container_statuses = crashed.then(|| {
        vec![ContainerStatus {
            name: "tunnel".into(),
            state: Some(ContainerState {
                terminated: Some(ContainerStateTerminated {
                    reason: Some("Error".into()),
                    exit_code: 1,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]
    });
    pod.status = Some(PodStatus {
        phase: Some(phase.to_owned()),
        container_statuses,
        ..Default::default()
    });
    pod
}

impl TunnelBackend for FakeBackend {
    fn namespace(&self) -> &str {
        "tools"
    }

    async fn create_pod(&self, pod: &Pod) -> kube::Result<Pod> {
        let name = pod.metadata.name.clone().unwrap_or_default();
        if self.fail_create {
            return Err(api_error(403, "Forbidden"));
        }
        self.calls.borrow_mut().push(Call::Create(name));
        Ok(pod.clone())
    }

    async fn get_pod(&self, name: &str) -> kube::Result<Pod> {
        self.calls.borrow_mut().push(Call::Get(name.to_owned()));
        match self.next_observed() {
            Observed::Pending => Ok(pod_in_phase(name, "Pending", false)),
            Observed::Crashed => Ok(pod_in_phase(name, "Failed", true)),
            Observed::Running => Ok(pod_in_phase(name, "Running", false)),
            Observed::FetchError => Err(api_error(500, "InternalError")),
        }
    }

    async fn delete_pod(&self, name: &str) -> kube::Result<()> {
        self.calls.borrow_mut().push(Call::Delete(name.to_owned()));
        if self.fail_delete {
            return Err(api_error(404, "NotFound"));
        }
        Ok(())
    }

    async fn pod_events(&self, name: &str) -> kube::Result<Vec<Event>> {
        self.calls.borrow_mut().push(Call::Events(name.to_owned()));
        if self.fail_events {
            return Err(api_error(403, "Forbidden"));
        }
        Ok(vec![Event {
            type_: Some("Warning".into()),
            reason: Some("BackOff".into()),
            message: Some("Back-off restarting failed container".into()),
            ..Default::default()
        }])
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RelayOutcome {
    Success,
    ExitFailure,
    Interrupted,
}

pub struct FakeRelay {
    outcome: RelayOutcome,
    pub runs: RefCell<Vec<Vec<String>>>,
}

impl FakeRelay {
    pub fn new(outcome: RelayOutcome) -> Self {
        FakeRelay {
            outcome,
            runs: RefCell::new(Vec::new()),
        }
    }
}

impl CommandRelay for FakeRelay {
    async fn run(&self, args: &[String]) -> Result<(), RelayError> {
        self.runs.borrow_mut().push(args.to_vec());
        match self.outcome {
            RelayOutcome::Success => Ok(()),
            RelayOutcome::ExitFailure => Err(RelayError::Exited(ExitStatus::from_raw(1 << 8))),
            RelayOutcome::Interrupted => Err(RelayError::Interrupted),
        }
    }
}

/// Answers prompts from a fixed script; running out ends the session with
/// an error, like a closed terminal.
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompt {
            answers: answers.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn next(&mut self) -> anyhow::Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("prompt script exhausted"))
    }
}

impl TunnelPrompt for ScriptedPrompt {
    fn target_address(&mut self) -> anyhow::Result<String> {
        self.next()
    }

    fn local_port(&mut self) -> anyhow::Result<String> {
        self.next()
    }
}
