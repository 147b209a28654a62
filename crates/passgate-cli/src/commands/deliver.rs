//! `passgate deliver`: Deliver a prover result to the node.

use clap::Args;
use passgate_core::{ProofEvent, SessionId};
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct DeliverArgs {
    /// Session the result belongs to.
    #[arg(short, long)]
    pub session: String,

    /// Report a failed proof with this error instead of a success.
    #[arg(long)]
    pub fail: Option<String>,

    /// Disclosed claims as JSON string (successful proofs only).
    #[arg(short, long)]
    pub claims: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9001")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct CallbackResponse {
    accepted: bool,
    outcome: Option<Outcome>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Outcome {
    verified: bool,
    source: String,
    persistence_error: Option<String>,
}

fn build_event(args: &DeliverArgs) -> anyhow::Result<ProofEvent> {
    let session_id = SessionId::new(args.session.as_str())?;
    match (&args.fail, &args.claims) {
        (Some(_), Some(_)) => anyhow::bail!("--claims cannot be combined with --fail"),
        (Some(error), None) => Ok(ProofEvent::failed(session_id, error.as_str())),
        (None, claims) => {
            let claims = match claims {
                Some(c) => serde_json::from_str(c)
                    .map_err(|e| anyhow::anyhow!("invalid claims JSON: {}", e))?,
                None => serde_json::Value::Null,
            };
            Ok(ProofEvent::succeeded(session_id, claims))
        }
    }
}

pub async fn run(args: &DeliverArgs) -> anyhow::Result<()> {
    let event = build_event(args)?;
    let url = format!("{}/api/v1/callback", args.endpoint);
    let resp = reqwest::Client::new().post(&url).json(&event).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: CallbackResponse = r.json().await?;
            match data.outcome {
                Some(outcome) if data.accepted => {
                    println!("Result accepted.");
                    println!("  Verified:   {}", outcome.verified);
                    println!("  Source:     {}", outcome.source);
                    if let Some(err) = outcome.persistence_error {
                        println!("  Not recorded by backend: {}", err);
                    }
                }
                _ => println!("Result ignored: session {} is not awaiting a proof.", args.session),
            }
        }
        Ok(r) => return Err(super::fail("deliver", r).await),
        Err(e) => super::unreachable_node(&args.endpoint, e),
    }

    Ok(())
}
