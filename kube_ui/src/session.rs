use std::{path::PathBuf, sync::Arc};

use k8s_util::{
    apis::{Apis, Cluster},
    config_dir::TunnelImageConfig,
};

use crate::{relay::Kubectl, tunnel::PollOptions};

/// Everything an operation needs to know about where it runs. Owned by the
/// top-level menu loop and passed down by reference.
pub struct Session {
    pub kubeconfig: PathBuf,
    pub namespace: String,
    pub apis: Arc<Apis>,
    pub kubectl: Kubectl,
    pub tunnel_image: TunnelImageConfig,
    pub tunnel_poll: PollOptions,
}

impl Session {
    pub fn new(
        kubeconfig: PathBuf,
        namespace: String,
        cluster: &Cluster,
        tunnel_image: TunnelImageConfig,
        tunnel_poll: PollOptions,
    ) -> Self {
        let apis = cluster.get_namespace(&namespace);
        let kubectl = Kubectl::new(&kubeconfig, &namespace);
        Session {
            kubeconfig,
            namespace,
            apis,
            kubectl,
            tunnel_image,
            tunnel_poll,
        }
    }
}
