//! Relay health probe (`GET <endpoint>/health`).

use reqwest::Client;

use crate::config::Config;
use crate::constants::HEALTH_PATH;
use crate::dispatch::describe_transport_error;
use crate::types::HealthResult;

/// Probe the relay. Never fails; problems come back as `success: false`
/// with a description in `message`.
pub async fn check_health(client: &Client, config: &Config) -> HealthResult {
    let url = config.url_for(HEALTH_PATH);
    log::debug!("[Health] GET {url}");

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            let message = describe_transport_error(&e);
            log::warn!("[Health] Probe failed: {message}");
            return HealthResult::failure(message);
        }
    };

    let status = response.status();
    if !status.is_success() {
        log::warn!("[Health] Relay returned HTTP {}", status.as_u16());
        return HealthResult::failure(format!("HTTP {}", status.as_u16()));
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return HealthResult::failure(describe_transport_error(&e)),
    };

    match serde_json::from_str::<HealthResult>(&text) {
        Ok(health) => {
            log::info!(
                "[Health] Relay success={} message={:?}",
                health.success,
                health.message
            );
            health
        }
        Err(e) => {
            log::warn!("[Health] Unparseable health body: {e}");
            HealthResult::failure(format!("Invalid response body: {e}"))
        }
    }
}
