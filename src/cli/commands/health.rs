use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::types::ServiceKind;

pub async fn handle(service: Option<&str>, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env_unchecked()?;
    let targets: Vec<ServiceKind> = match service {
        Some(name) => vec![name.parse()?],
        None => ServiceKind::ALL.to_vec(),
    };

    let http = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
    let mut report = Map::new();
    let mut down = Vec::new();

    for target in targets {
        let url = format!("{}/health", config.upstream.base_url(target).trim_end_matches('/'));
        let up = matches!(http.get(&url).send().await, Ok(response) if response.status().is_success());

        if let OutputFormat::Text = output_format {
            println!("{:<26} {:<5} {}", target.as_str(), if up { "up" } else { "down" }, url);
        }
        report.insert(target.as_str().to_string(), json!({ "url": url, "up": up }));
        if !up {
            down.push(target.as_str());
        }
    }

    if down.is_empty() {
        output_success(&output_format, "All checked services are up", Some(json!({ "services": Value::Object(report) })))
    } else {
        output_error(&output_format, &format!("Unreachable: {}", down.join(", ")), Some("SERVICE_DOWN"))?;
        anyhow::bail!("{} service(s) down", down.len())
    }
}
