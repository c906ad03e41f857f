//! Persisted cluster profiles, stored as JSON in `~/.kube-ui`.
//!
//! ```json
//! {
//!   "configs": [
//!     {
//!       "name": "prod",
//!       "path": "/home/me/.kube/prod.yaml",
//!       "namespace": "default",
//!       "comment": "production cluster",
//!       "imagePullSecret": "registry-creds",
//!       "tunnelImage": "registry.example.com/socat:1.7"
//!     }
//!   ]
//! }
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = ".kube-ui";
pub const DEFAULT_TUNNEL_IMAGE: &str = "alpine/socat";

pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(CONFIG_FILE_NAME))
}

#[derive(Debug, Default, Deserialize)]
pub struct KubeUiConfig {
    #[serde(default)]
    pub configs: Vec<Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    /// Path to the kubeconfig file of this cluster
    pub path: PathBuf,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub image_pull_secret: Option<String>,
    #[serde(default)]
    pub tunnel_image: Option<String>,
}

impl Profile {
    /// Label shown in the profile selection prompt.
    pub fn display_name(&self) -> String {
        if self.comment.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.comment)
        }
    }

    pub fn tunnel_image_config(&self) -> TunnelImageConfig {
        let mut config = TunnelImageConfig::default();
        if let Some(image) = self.tunnel_image.as_deref().filter(|v| !v.is_empty()) {
            config.image = image.to_owned();
        }
        config.image_pull_secret = self
            .image_pull_secret
            .clone()
            .filter(|v| !v.is_empty());
        config
    }
}

/// Image used for the tunnel relay container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelImageConfig {
    pub image: String,
    pub image_pull_secret: Option<String>,
}

impl Default for TunnelImageConfig {
    fn default() -> Self {
        TunnelImageConfig {
            image: DEFAULT_TUNNEL_IMAGE.to_owned(),
            image_pull_secret: None,
        }
    }
}

impl KubeUiConfig {
    /// Loads the config file if it exists. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("error reading {}", path.display()))?;
        let config = Self::parse(&data)
            .with_context(|| format!("error parsing {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn parse(data: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Tunnel image settings keyed by kubeconfig path. The first profile
    /// wins when several share a path.
    pub fn tunnel_settings(&self) -> TunnelSettings {
        let mut by_path = HashMap::new();
        for profile in &self.configs {
            by_path
                .entry(profile.path.clone())
                .or_insert_with(|| profile.tunnel_image_config());
        }
        TunnelSettings { by_path }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TunnelSettings {
    by_path: HashMap<PathBuf, TunnelImageConfig>,
}

impl TunnelSettings {
    pub fn for_kubeconfig(&self, kubeconfig: &Path) -> TunnelImageConfig {
        self.by_path.get(kubeconfig).cloned().unwrap_or_default()
    }
}
