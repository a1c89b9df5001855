use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::{output_success, server_url};
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(help = "Username")]
    pub user: String,

    #[arg(help = "Password")]
    pub password: String,

    #[arg(long, help = "Server base URL (defaults to AGILA_SERVER or the local port)")]
    pub server: Option<String>,
}

pub async fn handle(args: LoginArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = server_url(args.server);
    let endpoint = format!("{}/api/auth/login", base);

    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&json!({ "user": args.user, "pass": args.password }))
        .send()
        .await
        .with_context(|| format!("Could not reach {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.context("Server returned a non-JSON response")?;
    if !status.is_success() {
        let message = body.get("message").and_then(Value::as_str).unwrap_or("login failed");
        anyhow::bail!("{} ({})", message, status);
    }

    let data = body.get("data").cloned().unwrap_or(Value::Null);
    let token = data
        .get("token")
        .and_then(Value::as_str)
        .context("Login response carried no token")?;

    match output_format {
        OutputFormat::Text => {
            let name = data.pointer("/user/name").and_then(Value::as_str).unwrap_or(&args.user);
            println!("✓ Signed in as {} at {}", name, base);
            println!("{}", token);
            Ok(())
        }
        OutputFormat::Json => output_success(output_format, "Signed in", Some(data)),
    }
}
