pub mod deliver;
pub mod present;
pub mod probe;
pub mod retry;
pub mod status;

use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

/// Turn a non-success node response into an error.
pub(crate) async fn fail(action: &str, resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(err) => anyhow::anyhow!("{} failed (HTTP {}): {}", action, status, err.error),
        Err(_) => anyhow::anyhow!("{} failed (HTTP {})", action, status),
    }
}

pub(crate) fn unreachable_node(endpoint: &str, e: reqwest::Error) {
    println!("Could not reach node at {}", endpoint);
    println!("  Error: {}", e);
    println!();
    println!("Is the node running? Start it with: passgate-node");
}
