use k8s_openapi::api::core::v1::Service;
use k8s_util::apis::Apis;

use super::{ask, ask_action, report, resource_name, Resource, EXIT};
use crate::{relay::CommandRelay, session::Session};

impl Resource for Service {
    const KIND: &'static str = "svc";
    const HEADER: &'static [&'static str] =
        &["Name", "Type", "Cluster-IP", "External-IP", "Port(s)"];

    fn name(&self) -> &str {
        resource_name(self)
    }

    fn row(&self) -> Vec<String> {
        let spec = self.spec.clone().unwrap_or_default();
        let ports = spec
            .ports
            .iter()
            .flatten()
            .map(|port| {
                format!(
                    "{}/{}",
                    port.port,
                    port.protocol.as_deref().unwrap_or("TCP")
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        vec![
            self.name().to_owned(),
            spec.type_.unwrap_or_default(),
            spec.cluster_ip.unwrap_or_default(),
            spec.external_ips.unwrap_or_default().join(","),
            ports,
        ]
    }

    async fn list(apis: &Apis) -> anyhow::Result<Vec<Self>> {
        apis.list_services().await
    }

    async fn act(&self, session: &Session) -> anyhow::Result<()> {
        let name = self.name();
        loop {
            let action = ask_action(
                "svc",
                name,
                &[("p", "print svc info"), ("fw", "forward svc port")],
            )?;
            match action.as_str() {
                "p" => report(
                    session
                        .kubectl
                        .exec(&["get", "svc", name, "-o", "yaml"])
                        .await,
                ),
                "fw" => {
                    let ports = ask(
                        "please enter forward ports, example: \"localPort1:svcPort1 localPort2:svcPort2\", so you can input \"8080:80 9090:90\"",
                    )?;
                    match port_forward_args(&format!("svc/{}", name), &ports) {
                        Some(args) => report(session.kubectl.run(&args).await),
                        None => println!("No ports given"),
                    }
                }
                EXIT => return Ok(()),
                _ => println!("Invalid action"),
            }
        }
    }
}

/// `port-forward <target> <pair>...` from space-separated `local:remote`
/// pairs, `None` without any pair.
pub fn port_forward_args(target: &str, ports: &str) -> Option<Vec<String>> {
    let pairs: Vec<String> = ports.split_whitespace().map(str::to_owned).collect();
    if pairs.is_empty() {
        return None;
    }
    let mut args = vec!["port-forward".to_owned(), target.to_owned()];
    args.extend(pairs);
    Some(args)
}
