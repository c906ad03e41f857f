use k8s_openapi::api::core::v1::{Event, Pod};
use k8s_util::{
    apis::Apis,
    kube_types::{age, pod_phase, pod_restart_count},
};

use super::{ask, ask_action, report, resource_name, services::port_forward_args, Resource, EXIT};
use crate::{
    relay::{CommandRelay, RelayError},
    session::Session,
    table,
};

const POD_ACTIONS: &[(&str, &str)] = &[
    ("p", "print pod info"),
    ("l", "view all logs"),
    ("lf", "view rolling logs"),
    ("s", "enter shell"),
    ("e", "view pod events"),
    ("fw", "port forward remote port to local"),
    (
        "cp",
        "copy remote file to current path, download file name is remote file name",
    ),
    ("u", "upload local file to remote pod"),
];

impl Resource for Pod {
    const KIND: &'static str = "pod";
    const HEADER: &'static [&'static str] = &["Name", "Status", "Restarts", "Age"];

    fn name(&self) -> &str {
        resource_name(self)
    }

    fn row(&self) -> Vec<String> {
        let started = self
            .status
            .as_ref()
            .and_then(|status| status.start_time.as_ref());
        vec![
            self.name().to_owned(),
            pod_phase(self).to_owned(),
            pod_restart_count(self).to_string(),
            age(started),
        ]
    }

    async fn list(apis: &Apis) -> anyhow::Result<Vec<Self>> {
        apis.list_pods().await
    }

    async fn act(&self, session: &Session) -> anyhow::Result<()> {
        let name = self.name();
        let kubectl = &session.kubectl;
        loop {
            let action = ask_action("pod", name, POD_ACTIONS)?;
            match action.as_str() {
                "p" => report(kubectl.exec(&["get", "pod", name, "-o", "yaml"]).await),
                "l" => report(kubectl.exec(&["logs", name]).await),
                "lf" => report(kubectl.exec(&["logs", "-f", "--tail=1000", name]).await),
                "s" => shell(session, self).await?,
                "e" => print_events(session, name).await,
                "fw" => {
                    let ports = ask(
                        "please enter forward ports, example: \"localPort1:podPort1 localPort2:podPort2\", so you can input \"8080:80 9090:90\"",
                    )?;
                    match port_forward_args(&format!("pod/{}", name), &ports) {
                        Some(args) => report(kubectl.run(&args).await),
                        None => println!("No ports given"),
                    }
                }
                "cp" => {
                    let src = ask("Enter remote file path")?;
                    match download_args(name, &src) {
                        Some(args) => report(kubectl.run(&args).await),
                        None => println!("Remote file path is required"),
                    }
                }
                "u" => {
                    let src = ask("Enter local file path")?;
                    let dst = ask("Enter remote file path")?;
                    if src.is_empty() || dst.is_empty() {
                        println!("Both file paths are required");
                        continue;
                    }
                    let remote = format!("{}:{}", name, dst);
                    report(kubectl.exec(&["cp", &src, &remote]).await);
                }
                EXIT => return Ok(()),
                _ => println!("Invalid action"),
            }
        }
    }
}

/// `cp <pod>:<src> <basename of src>`.
fn download_args(pod: &str, src: &str) -> Option<Vec<String>> {
    let file_name = src.rsplit('/').next().filter(|v| !v.is_empty())?;
    Some(vec![
        "cp".to_owned(),
        format!("{}:{}", pod, src),
        file_name.to_owned(),
    ])
}

fn container_names(pod: &Pod) -> Vec<&str> {
    pod.spec
        .iter()
        .flat_map(|spec| spec.containers.iter())
        .map(|container| container.name.as_str())
        .collect()
}

fn shell_args(pod: &str, container: Option<&str>, shell: &str) -> Vec<String> {
    let mut args = vec!["exec".to_owned(), "-it".to_owned(), pod.to_owned()];
    if let Some(container) = container {
        args.extend(["-c".to_owned(), container.to_owned()]);
    }
    args.extend(["--".to_owned(), shell.to_owned()]);
    args
}

/// Opens bash in the pod, or sh when bash exits with failure. Asks for a
/// container first when the pod has several.
async fn shell(session: &Session, pod: &Pod) -> anyhow::Result<()> {
    let containers = container_names(pod);
    let container = if containers.len() > 1 {
        let mut listing = table::table(&["Number", "Container Name"]);
        for (index, name) in containers.iter().enumerate() {
            listing.add_row(vec![index.to_string(), name.to_string()]);
        }
        println!("{}", listing);

        let input = ask("Enter container number to exec into")?;
        match input.parse::<usize>().ok().and_then(|i| containers.get(i)) {
            Some(name) => Some(*name),
            None => {
                println!("Invalid container number");
                return Ok(());
            }
        }
    } else {
        None
    };

    let name = pod.name();
    match session
        .kubectl
        .run(&shell_args(name, container, "/bin/bash"))
        .await
    {
        Err(RelayError::Exited(_)) => {
            report(
                session
                    .kubectl
                    .run(&shell_args(name, container, "/bin/sh"))
                    .await,
            );
        }
        other => report(other),
    }
    Ok(())
}

fn events_table(events: &[Event]) -> comfy_table::Table {
    let mut listing = table::table(&["Type", "Reason", "Age", "From", "Message"]);
    for event in events {
        listing.add_row(vec![
            event.type_.clone().unwrap_or_default(),
            event.reason.clone().unwrap_or_default(),
            age(event.first_timestamp.as_ref()),
            event
                .source
                .as_ref()
                .and_then(|source| source.component.clone())
                .unwrap_or_default(),
            event.message.clone().unwrap_or_default(),
        ]);
    }
    listing
}

async fn print_events(session: &Session, pod: &str) {
    match session.apis.pod_events(pod).await {
        Ok(events) => println!("{}", events_table(&events)),
        Err(err) => println!("Error getting pod events: {}", err),
    }
}
