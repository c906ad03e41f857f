use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

mod events;

use anyhow::Context;
use k8s_openapi::api::core::v1::{
    ConfigMap, Event, Namespace, PersistentVolumeClaim, Pod, Service,
};
use kube::{
    api::{DeleteParams, ListParams, PostParams},
    Api, Client,
};
use log::debug;

pub struct Cluster {
    pub client: Client,
    pub namespaces: Mutex<BTreeMap<String, Arc<Apis>>>,
}

impl Cluster {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(Cluster {
            client,
            namespaces: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn get_namespace(&self, ns: &str) -> Arc<Apis> {
        let mut nss = self.namespaces.lock().unwrap();
        if let Some(apis) = nss.get(ns).cloned() {
            apis
        } else {
            let apis = Arc::new(Apis::namespaced(&self.client, ns));
            nss.insert(ns.to_string(), apis.clone());
            apis
        }
    }

    /// Names of all namespaces visible to the current credentials.
    pub async fn list_namespace_names(&self) -> anyhow::Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api
            .list(&ListParams::default())
            .await
            .context("when listing namespaces")?;
        Ok(namespaces
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }
}

pub struct Apis {
    pub namespace: String,
    pub pod: Api<Pod>,
    pub service: Api<Service>,
    pub pvc: Api<PersistentVolumeClaim>,
    pub config_map: Api<ConfigMap>,
    pub event: Api<Event>,
}

impl Apis {
    pub fn namespaced(client: &Client, namespace: &str) -> Self {
        Apis {
            namespace: namespace.to_string(),
            pod: Api::namespaced(client.clone(), namespace),
            service: Api::namespaced(client.clone(), namespace),
            pvc: Api::namespaced(client.clone(), namespace),
            config_map: Api::namespaced(client.clone(), namespace),
            event: Api::namespaced(client.clone(), namespace),
        }
    }
}

/// Listing
impl Apis {
    pub async fn list_pods(&self) -> anyhow::Result<Vec<Pod>> {
        let pods = self
            .pod
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list pods in namespace {}", self.namespace))?;
        Ok(pods.items)
    }

    pub async fn list_services(&self) -> anyhow::Result<Vec<Service>> {
        let services = self
            .service
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list services in namespace {}", self.namespace))?;
        Ok(services.items)
    }

    pub async fn list_pvcs(&self) -> anyhow::Result<Vec<PersistentVolumeClaim>> {
        let pvcs = self
            .pvc
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list pvcs in namespace {}", self.namespace))?;
        Ok(pvcs.items)
    }

    pub async fn list_config_maps(&self) -> anyhow::Result<Vec<ConfigMap>> {
        let config_maps = self
            .config_map
            .list(&ListParams::default())
            .await
            .with_context(|| {
                format!("failed to list configmaps in namespace {}", self.namespace)
            })?;
        Ok(config_maps.items)
    }
}

/// Single pod lifecycle
impl Apis {
    pub async fn create_pod(&self, pod: &Pod) -> kube::Result<Pod> {
        debug!(
            "creating pod {:?} in {}",
            pod.metadata.name, self.namespace
        );
        self.pod.create(&PostParams::default(), pod).await
    }

    pub async fn get_pod(&self, name: &str) -> kube::Result<Pod> {
        self.pod.get(name).await
    }

    pub async fn delete_pod(&self, name: &str) -> kube::Result<()> {
        debug!("deleting pod {} in {}", name, self.namespace);
        self.pod
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod mock;
