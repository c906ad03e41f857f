use std::path::Path;

use anyhow::Context;
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};

/// Builds a client from an explicit kubeconfig file, using its
/// `current-context`.
///
/// Returns the client together with the name of that context.
pub async fn create_client(kubeconfig_path: &Path) -> anyhow::Result<(Client, Option<String>)> {
    let kubeconfig = Kubeconfig::read_from(kubeconfig_path)
        .with_context(|| format!("when reading kubeconfig {}", kubeconfig_path.display()))?;
    let current_context = kubeconfig.current_context.clone();

    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .context("when building client config from kubeconfig")?;

    let client = Client::try_from(config).context("when creating kubernetes client")?;
    Ok((client, current_context))
}
