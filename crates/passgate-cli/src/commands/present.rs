//! `passgate present`: Print the request to hand to the wallet.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct PresentArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9001")]
    pub endpoint: String,

    /// Also print the descriptor JSON used for QR rendering.
    #[arg(long)]
    pub qr: bool,
}

#[derive(Deserialize)]
struct PresentableRequest {
    session_id: String,
    universal_link: String,
    qr_payload: String,
}

pub async fn run(args: &PresentArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/session/present", args.endpoint);
    let resp = reqwest::Client::new().post(&url).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: PresentableRequest = r.json().await?;
            println!("Open this link in the wallet:");
            println!("  {}", data.universal_link);
            println!("  Session:  {}", data.session_id);
            if args.qr {
                println!();
                println!("{}", data.qr_payload);
            }
        }
        Ok(r) => return Err(super::fail("present", r).await),
        Err(e) => super::unreachable_node(&args.endpoint, e),
    }

    Ok(())
}
