use colored::Colorize;
use dialoguer::Input;
use k8s_util::config_dir::TunnelImageConfig;

use super::{pod::parse_address, Tunnel, TunnelBackend, TunnelError, TunnelRequest};
use crate::relay::CommandRelay;

pub const EXIT: &str = "exit";

/// Source of the operator's answers for a tunnel cycle.
pub trait TunnelPrompt {
    fn target_address(&mut self) -> anyhow::Result<String>;
    fn local_port(&mut self) -> anyhow::Result<String>;
}

pub struct DialoguerPrompt;

impl TunnelPrompt for DialoguerPrompt {
    fn target_address(&mut self) -> anyhow::Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(
                "Enter target address (e.g. 10.0.0.1:8080 or my-svc.ns:8080), or 'exit' to quit",
            )
            .allow_empty(true)
            .interact_text()?)
    }

    fn local_port(&mut self) -> anyhow::Result<String> {
        Ok(Input::<String>::new()
            .with_prompt("Enter local port to forward to")
            .allow_empty(true)
            .interact_text()?)
    }
}

/// Prompts for tunnel targets and runs one cycle per target until the
/// operator enters `exit`. Failed cycles are reported and re-prompted.
pub async fn tunnel_session<P, B, R>(
    prompt: &mut P,
    tunnel: &Tunnel<'_, B, R>,
    image: &TunnelImageConfig,
) -> anyhow::Result<()>
where
    P: TunnelPrompt,
    B: TunnelBackend,
    R: CommandRelay,
{
    loop {
        let address = prompt.target_address()?;
        let address = address.trim();
        if address == EXIT {
            return Ok(());
        }
        if parse_address(address).is_err() {
            println!("Invalid format. Please use host:port");
            continue;
        }

        let local_port = prompt.local_port()?;
        let request = match TunnelRequest::parse(address, &local_port) {
            Ok(request) => request,
            Err(TunnelError::MissingLocalPort) => {
                println!("Local port is required");
                continue;
            }
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        if let Err(err) = tunnel.run_cycle(&request, image).await {
            println!("{}", err.to_string().red());
            log::debug!("tunnel cycle for {} failed: {:?}", request.target(), err);
        }
    }
}
