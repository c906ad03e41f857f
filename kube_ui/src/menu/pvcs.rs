use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use k8s_util::apis::Apis;

use super::{ask_action, report, resource_name, Resource, EXIT};
use crate::session::Session;

impl Resource for PersistentVolumeClaim {
    const KIND: &'static str = "pvc";
    const HEADER: &'static [&'static str] = &[
        "Name",
        "Status",
        "StorageClass",
        "Capacity",
        "AccessModes",
    ];

    fn name(&self) -> &str {
        resource_name(self)
    }

    fn row(&self) -> Vec<String> {
        let spec = self.spec.as_ref();
        let status = self.status.as_ref();
        vec![
            self.name().to_owned(),
            status
                .and_then(|status| status.phase.clone())
                .unwrap_or_default(),
            spec.and_then(|spec| spec.storage_class_name.clone())
                .unwrap_or_default(),
            status
                .and_then(|status| status.capacity.as_ref())
                .and_then(|capacity| capacity.get("storage"))
                .map(|quantity| quantity.0.clone())
                .unwrap_or_default(),
            spec.and_then(|spec| spec.access_modes.as_ref())
                .map(|modes| modes.join(","))
                .unwrap_or_default(),
        ]
    }

    async fn list(apis: &Apis) -> anyhow::Result<Vec<Self>> {
        apis.list_pvcs().await
    }

    async fn act(&self, session: &Session) -> anyhow::Result<()> {
        let name = self.name();
        loop {
            let action = ask_action("Pvc", name, &[("p", "print Pvc info")])?;
            match action.as_str() {
                "p" => report(
                    session
                        .kubectl
                        .exec(&["get", "pvc", name, "-o", "yaml"])
                        .await,
                ),
                EXIT => return Ok(()),
                _ => println!("Invalid action"),
            }
        }
    }
}
