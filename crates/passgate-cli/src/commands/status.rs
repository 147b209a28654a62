//! `passgate status`: Show the current verification session.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9001")]
    pub endpoint: String,

    /// Print the raw JSON snapshot.
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
pub(crate) struct SessionStatusResponse {
    pub session_id: String,
    pub attempt: u32,
    pub state: String,
    pub reason: Option<String>,
    pub detail: Option<String>,
    pub backend_reachable: bool,
    pub presented: bool,
    pub outcome: Option<serde_json::Value>,
}

impl SessionStatusResponse {
    pub(crate) fn print(&self) {
        println!("Verification Session:");
        println!("  Session:    {}", self.session_id);
        println!("  Attempt:    {}", self.attempt);
        match (&self.reason, &self.detail) {
            (Some(reason), Some(detail)) => {
                println!("  State:      {} ({}): {}", self.state, reason, detail)
            }
            _ => println!("  State:      {}", self.state),
        }
        println!(
            "  Backend:    {}",
            if self.backend_reachable {
                "reachable"
            } else {
                "unreachable"
            }
        );
        println!("  Presented:  {}", self.presented);
        if let Some(outcome) = &self.outcome {
            println!("  Outcome:    {}", outcome);
        }
    }
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/session", args.endpoint);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            if args.json {
                let data: serde_json::Value = r.json().await?;
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                let data: SessionStatusResponse = r.json().await?;
                data.print();
            }
        }
        Ok(r) => return Err(super::fail("status", r).await),
        Err(e) => super::unreachable_node(&args.endpoint, e),
    }

    Ok(())
}
