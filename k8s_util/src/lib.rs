//! Shared Kubernetes plumbing for kube-ui: client construction from a
//! kubeconfig file, the namespaced API facade and the persisted profile
//! configuration.

use std::path::Path;

use kube::Client;

pub mod apis;
pub mod client;
pub mod config_dir;
pub mod kube_types;

pub async fn create_client(kubeconfig: &Path) -> anyhow::Result<Client> {
    let (client, context) = client::create_client(kubeconfig).await?;
    log::debug!(
        "connected using context {:?} from {}",
        context,
        kubeconfig.display()
    );
    Ok(client)
}
