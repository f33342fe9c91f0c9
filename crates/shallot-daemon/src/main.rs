//! shallot-daemon: bootstraps a simulated onion-routing overlay.
//!
//! Single OS process running a Tokio async runtime. Spins up the registry,
//! an in-process loopback network, the configured number of relays and
//! users, then routes one demonstration message through a fresh circuit.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use shallot_onion::relay::RelayNode;
use shallot_onion::user::UserNode;
use shallot_registry::Registry;
use shallot_transport::LoopbackNetwork;
use shallot_types::wire::{ErrorBody, SendRequest};

use crate::config::SimConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = SimConfig::load()?;

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("shallot={}", config.advanced.log_level).parse()?),
        )
        .init();

    info!(
        relays = config.overlay.relay_count,
        users = config.overlay.user_count,
        "shallot overlay starting"
    );

    // 3. Registry and in-process network
    let registry = Arc::new(Registry::new());
    let network = Arc::new(LoopbackNetwork::with_hop_timeout(Duration::from_millis(
        config.overlay.hop_timeout_ms,
    )));

    // 4. Bootstrap relays (keypair generation + registration)
    for node_id in 0..config.overlay.relay_count {
        let relay = RelayNode::bootstrap(node_id, &registry, network.clone());
        network.attach_relay(node_id, relay);
    }
    info!(registered = registry.len(), "relay directory populated");

    // 5. Bootstrap users
    let mut users = Vec::new();
    for user_id in 0..config.overlay.user_count {
        let user = UserNode::new(user_id, registry.clone(), network.clone());
        network.attach_inbox(user_id, user.clone());
        users.push(user);
    }

    // 6. Route one demonstration message through the overlay
    let (Some(sender), Some(receiver)) = (users.first(), users.get(1)) else {
        info!("fewer than two users configured, nothing to send");
        return Ok(());
    };

    let request = SendRequest {
        message: "hello through the onion".to_string(),
        destination_user_id: receiver.user_id(),
    };
    match sender.send_message(request).await {
        Ok(response) => {
            info!(circuit = ?response.circuit, "demo message delivered");
            info!(
                received = receiver.last_received_message().as_deref().unwrap_or(""),
                "destination inbox"
            );
        }
        Err(err) => {
            let body = ErrorBody::from(&err);
            error!(kind = body.kind, message = body.message, "demo send failed");
        }
    }

    info!("shallot overlay shutting down");
    Ok(())
}
