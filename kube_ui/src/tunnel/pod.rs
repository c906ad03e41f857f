use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, LocalObjectReference, Pod, PodSpec};
use k8s_util::config_dir::TunnelImageConfig;
use kube::api::ObjectMeta;
use rand::{thread_rng, Rng};

use super::TunnelError;

pub const POD_NAME_PREFIX: &str = "tunnel-pod-";
pub const CONTAINER_NAME: &str = "tunnel";
pub const ACTIVE_DEADLINE_SECONDS: i64 = 3600;
const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Where a tunnel should lead, and which local port exposes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelRequest {
    target_host: String,
    target_port: String,
    local_port: String,
}

impl TunnelRequest {
    /// Builds a request from the operator's `host:port` and local port input.
    pub fn parse(address: &str, local_port: &str) -> Result<Self, TunnelError> {
        let (target_host, target_port) = parse_address(address)?;
        let local_port = local_port.trim();
        if local_port.is_empty() {
            return Err(TunnelError::MissingLocalPort);
        }
        Ok(TunnelRequest {
            target_host,
            target_port,
            local_port: local_port.to_owned(),
        })
    }

    pub fn local_port(&self) -> &str {
        &self.local_port
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.target_host, self.target_port)
    }

    /// socat invocation listening on the target port, re-accepting after each
    /// client disconnects and forwarding every connection to the target.
    pub fn relay_command(&self) -> Vec<String> {
        vec![
            "socat".to_owned(),
            format!("TCP-LISTEN:{},fork,reuseaddr", self.target_port),
            format!("TCP:{}:{}", self.target_host, self.target_port),
        ]
    }

    /// `kubectl` arguments forwarding the local port into `pod_name`.
    pub fn port_forward_args(&self, pod_name: &str) -> Vec<String> {
        vec![
            "port-forward".to_owned(),
            format!("pod/{}", pod_name),
            format!("{}:{}", self.local_port, self.target_port),
        ]
    }
}

/// Splits `host:port`. Anything but exactly one colon with text on both
/// sides is rejected.
pub fn parse_address(address: &str) -> Result<(String, String), TunnelError> {
    let address = address.trim();
    let parts: Vec<&str> = address.split(':').collect();
    match parts.as_slice() {
        [host, port] if !host.is_empty() && !port.is_empty() => {
            Ok((host.to_string(), port.to_string()))
        }
        _ => Err(TunnelError::InvalidAddress(address.to_owned())),
    }
}

pub fn generate_pod_name() -> String {
    let mut rng = thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    format!("{}{}", POD_NAME_PREFIX, suffix)
}

/// The ephemeral relay pod for one tunnel cycle.
pub fn tunnel_pod(
    name: &str,
    namespace: &str,
    request: &TunnelRequest,
    image: &TunnelImageConfig,
) -> Pod {
    let image_pull_secrets = image.image_pull_secret.as_ref().map(|secret| {
        vec![LocalObjectReference {
            name: secret.clone(),
        }]
    });

    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            labels: Some(BTreeMap::from([(
                "app.kubernetes.io/managed-by".to_owned(),
                "kube-ui".to_owned(),
            )])),
            ..Default::default()
        },
        spec: Some(PodSpec {
            image_pull_secrets,
            containers: vec![Container {
                name: CONTAINER_NAME.to_owned(),
                image: Some(image.image.clone()),
                image_pull_policy: Some("IfNotPresent".to_owned()),
                command: Some(request.relay_command()),
                ..Default::default()
            }],
            restart_policy: Some("Never".to_owned()),
            active_deadline_seconds: Some(ACTIVE_DEADLINE_SECONDS),
            ..Default::default()
        }),
        ..Default::default()
    }
}
