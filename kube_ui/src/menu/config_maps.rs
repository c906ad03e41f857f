use k8s_openapi::api::core::v1::ConfigMap;
use k8s_util::apis::Apis;

use super::{ask_action, report, resource_name, Resource, EXIT};
use crate::session::Session;

impl Resource for ConfigMap {
    const KIND: &'static str = "configmap";
    const HEADER: &'static [&'static str] = &["Name", "Data"];

    fn name(&self) -> &str {
        resource_name(self)
    }

    fn row(&self) -> Vec<String> {
        let entries = self.data.as_ref().map_or(0, |data| data.len())
            + self.binary_data.as_ref().map_or(0, |data| data.len());
        vec![self.name().to_owned(), entries.to_string()]
    }

    async fn list(apis: &Apis) -> anyhow::Result<Vec<Self>> {
        apis.list_config_maps().await
    }

    async fn act(&self, session: &Session) -> anyhow::Result<()> {
        let name = self.name();
        loop {
            let action = ask_action("ConfigMap", name, &[("p", "print ConfigMap info")])?;
            match action.as_str() {
                "p" => report(
                    session
                        .kubectl
                        .exec(&["get", "configmap", name, "-o", "yaml"])
                        .await,
                ),
                EXIT => return Ok(()),
                _ => println!("Invalid action"),
            }
        }
    }
}
