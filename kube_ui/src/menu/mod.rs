//! Interactive menus: profile and namespace selection, the main action menu,
//! and the per-resource browsers.

use anyhow::{bail, Context as _};
use colored::Colorize;
use dialoguer::{Input, Select};
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Pod, Service};
use k8s_util::{apis::Apis, apis::Cluster, config_dir::Profile};

use crate::{
    relay::RelayError,
    session::Session,
    table,
    tunnel::{tunnel_session, DialoguerPrompt, Tunnel},
};

mod config_maps;
mod pods;
mod pvcs;
mod services;

pub const EXIT: &str = "exit";

/// A namespaced resource kind that can be listed, shown as a numbered table
/// and acted upon.
pub trait Resource: Sized {
    const KIND: &'static str;
    const HEADER: &'static [&'static str];

    fn name(&self) -> &str;
    fn row(&self) -> Vec<String>;
    async fn list(apis: &Apis) -> anyhow::Result<Vec<Self>>;
    async fn act(&self, session: &Session) -> anyhow::Result<()>;
}

fn resource_name<K: kube::Resource>(item: &K) -> &str {
    item.meta().name.as_deref().unwrap_or_default()
}

pub fn render<K: Resource>(items: &[K], filter: &str) -> comfy_table::Table {
    table::numbered(
        K::HEADER,
        items
            .iter()
            .enumerate()
            .map(|(index, item)| (index, item.name(), item.row())),
        filter,
    )
}

/// Lists `K`, then lets the operator pick items by number or narrow the
/// table by name until they enter `exit`.
pub async fn browse<K: Resource>(session: &Session) -> anyhow::Result<()> {
    let mut items = K::list(&session.apis).await?;
    println!("{} in namespace {}", K::KIND, session.namespace);
    println!("{}", render(&items, ""));

    loop {
        let input = ask(&format!(
            "Enter {} number or search, exit to quit",
            K::KIND
        ))?;

        match input.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items[index].act(session).await?;
                items = K::list(&session.apis).await?;
                println!("{}", render(&items, ""));
            }
            _ if input == EXIT => return Ok(()),
            _ => println!("{}", render(&items, &input)),
        }
    }
}

/// Single line of operator input, trimmed.
pub fn ask(prompt: &str) -> anyhow::Result<String> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(input.trim().to_owned())
}

/// Shows the selected item and its actions, returns the chosen action.
pub fn ask_action(kind: &str, name: &str, actions: &[(&str, &str)]) -> anyhow::Result<String> {
    let keys: Vec<&str> = actions
        .iter()
        .map(|(key, _)| *key)
        .chain([EXIT])
        .collect();

    println!("====================================");
    println!("Selected {}: {}", kind, name.yellow().bold());
    println!("====================================");
    println!("command action [{}]: ", keys.join(", "));
    for (key, description) in actions {
        println!(" {} : {}", key.red(), description);
    }
    println!(" {} : quit current action", EXIT.red());

    ask("Enter action")
}

/// Prints a failed kubectl run; the menu carries on either way.
pub fn report(result: Result<(), RelayError>) {
    if let Err(err) = result {
        println!("{}", err.to_string().red());
    }
}

#[derive(Debug, Clone, Copy)]
enum MainAction {
    Pods,
    Services,
    Pvcs,
    ConfigMaps,
    Tunnel,
    Exit,
}

const MAIN_ACTIONS: [(&str, MainAction); 6] = [
    ("pods", MainAction::Pods),
    ("svc", MainAction::Services),
    ("pvc", MainAction::Pvcs),
    ("configmap", MainAction::ConfigMaps),
    ("tunnel", MainAction::Tunnel),
    ("exit", MainAction::Exit),
];

/// Top-level loop. Failures inside an action are reported and the menu is
/// shown again; only `exit` or a broken terminal ends it.
pub async fn main_menu(session: &Session) -> anyhow::Result<()> {
    log::info!(
        "using {} in namespace {}",
        session.kubeconfig.display(),
        session.namespace
    );
    let labels: Vec<&str> = MAIN_ACTIONS.iter().map(|(label, _)| *label).collect();

    loop {
        let choice = Select::new()
            .with_prompt(format!("choose action in namespace {}", session.namespace))
            .items(&labels)
            .default(0)
            .interact()
            .context("error selecting action")?;

        let result = match MAIN_ACTIONS[choice].1 {
            MainAction::Pods => browse::<Pod>(session).await,
            MainAction::Services => browse::<Service>(session).await,
            MainAction::Pvcs => browse::<PersistentVolumeClaim>(session).await,
            MainAction::ConfigMaps => browse::<ConfigMap>(session).await,
            MainAction::Tunnel => tunnel(session).await,
            MainAction::Exit => {
                println!("bye!!!");
                return Ok(());
            }
        };

        if let Err(err) = result {
            println!("{}", format!("{:#}", err).red());
        }
    }
}

async fn tunnel(session: &Session) -> anyhow::Result<()> {
    let tunnel = Tunnel::new(
        session.apis.as_ref(),
        &session.kubectl,
        session.tunnel_poll.clone(),
    );
    tunnel_session(&mut DialoguerPrompt, &tunnel, &session.tunnel_image).await
}

/// Lets the operator pick a profile. `None` when they chose to exit.
pub fn select_profile(profiles: &[Profile]) -> anyhow::Result<Option<&Profile>> {
    let mut labels: Vec<String> = profiles.iter().map(Profile::display_name).collect();
    labels.push(EXIT.to_owned());

    let choice = Select::new()
        .with_prompt("Choose kubernetes config")
        .items(&labels)
        .default(0)
        .interact()
        .context("error selecting kubernetes config")?;
    Ok(profiles.get(choice))
}

pub async fn select_namespace(cluster: &Cluster) -> anyhow::Result<String> {
    let namespaces = cluster.list_namespace_names().await.context(
        "failed to get namespace list, check your permissions or pass the namespace with -n",
    )?;
    if namespaces.is_empty() {
        bail!("no namespaces visible, pass the namespace with -n");
    }

    let choice = Select::new()
        .with_prompt("choose k8s namespace")
        .items(&namespaces)
        .default(0)
        .interact()
        .context("error selecting namespace")?;
    Ok(namespaces[choice].clone())
}
