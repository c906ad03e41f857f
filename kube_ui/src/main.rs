use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use colored::Colorize;
use k8s_util::{
    apis::Cluster,
    config_dir::{self, KubeUiConfig},
};

mod menu;
mod relay;
mod session;
mod table;
mod tunnel;

use session::Session;
use tunnel::PollOptions;

const BUILD_TIME: Option<&str> = option_env!("KUBE_UI_BUILD_TIME");

/// Interactive browser for pods, services, PVCs and config maps, with
/// shortcuts for the kubectl commands used on them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: Verbosity,
    /// Path to the kubeconfig file. Without it, a profile is chosen from
    /// ~/.kube-ui
    #[arg(short = 'f', long, global = true)]
    kubeconfig: Option<PathBuf>,
    /// Namespace to use. Without it, one is chosen from the cluster
    #[arg(short, long, global = true)]
    namespace: Option<String>,
    /// Give up waiting for a tunnel pod after this many seconds
    #[arg(long, value_name = "SECS")]
    tunnel_timeout: Option<u64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the version number
    Version,
    /// Display kube-ui configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Some(Commands::Version) => {
            println!("kube-ui version {}", env!("CARGO_PKG_VERSION"));
            println!("Build Time: {}", BUILD_TIME.unwrap_or("unknown"));
            Ok(())
        }
        Some(Commands::Config) => print_config(),
        None => run(args).await,
    }
}

fn print_config() -> anyhow::Result<()> {
    let path = config_dir::config_path()?;
    if !path.exists() {
        println!("No configuration file found at {}", path.display());
        return Ok(());
    }

    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("error reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&data).context("error formatting configuration")?;

    println!("Configuration file: {}\n", path.display());
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config_path = config_dir::config_path()?;
    let config = match KubeUiConfig::load(&config_path) {
        Ok(config) => config.unwrap_or_default(),
        Err(err) if args.kubeconfig.is_some() => {
            log::warn!("ignoring unreadable profiles: {:#}", err);
            KubeUiConfig::default()
        }
        Err(err) => return Err(err.context("error loading kube-ui config")),
    };

    let (kubeconfig, namespace) = match args.kubeconfig {
        Some(kubeconfig) => (kubeconfig, args.namespace),
        None => {
            if config.configs.is_empty() {
                bail!("Kubeconfig file is required");
            }
            let Some(profile) = menu::select_profile(&config.configs)? else {
                println!("bye!!!");
                return Ok(());
            };
            let profile_ns = Some(profile.namespace.clone()).filter(|ns| !ns.is_empty());
            (profile.path.clone(), args.namespace.or(profile_ns))
        }
    };

    let client = k8s_util::create_client(&kubeconfig).await?;
    let cluster = Cluster::new(client);

    let namespace = match namespace {
        Some(namespace) => namespace,
        None => menu::select_namespace(&cluster).await?,
    };
    println!("{}", format!("! using namespace {}", namespace).blue());

    let tunnel_image = config.tunnel_settings().for_kubeconfig(&kubeconfig);
    log::debug!("tunnel image for this session: {:?}", tunnel_image);

    let poll = PollOptions {
        timeout: args.tunnel_timeout.map(Duration::from_secs),
        ..Default::default()
    };
    let session = Session::new(kubeconfig, namespace, &cluster, tunnel_image, poll);
    menu::main_menu(&session).await
}
