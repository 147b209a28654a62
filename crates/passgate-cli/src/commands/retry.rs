//! `passgate retry`: Start a fresh session after a failure.

use clap::Args;

use super::status::SessionStatusResponse;

#[derive(Args, Debug)]
pub struct RetryArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9001")]
    pub endpoint: String,
}

pub async fn run(args: &RetryArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/session/retry", args.endpoint);
    let resp = reqwest::Client::new().post(&url).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: SessionStatusResponse = r.json().await?;
            println!("Retry started.");
            data.print();
        }
        Ok(r) => return Err(super::fail("retry", r).await),
        Err(e) => super::unreachable_node(&args.endpoint, e),
    }

    Ok(())
}
