use crate::{config::RelayConfig, error, server};

pub async fn relay(config: RelayConfig) {
    if let Err(e) = server::start_relay_server(config).await {
        error!("Relay stopped. Err: {}", e);
    }
}
