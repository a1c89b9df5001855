use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Split `COL=VALUE` arguments
pub fn parse_pair(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((col, value)) if !col.trim().is_empty() => Ok((col.trim().to_string(), value.to_string())),
        _ => Err(anyhow::anyhow!("Expected COL=VALUE, got '{}'", raw)),
    }
}

/// Server base URL: explicit flag, then AGILA_SERVER, then the local default port
pub fn server_url(explicit: Option<String>) -> String {
    explicit
        .or_else(|| std::env::var("AGILA_SERVER").ok())
        .unwrap_or_else(|| format!("http://localhost:{}", crate::config::config().server.port))
        .trim_end_matches('/')
        .to_string()
}
