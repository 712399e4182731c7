use anyhow::{bail, Context};
use serde_json::Value;

use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::client::ServiceClient;
use crate::config::AppConfig;
use crate::types::ServiceKind;

pub async fn handle(
    service: &str,
    path: &str,
    data: Option<&str>,
    token: Option<&str>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let config = AppConfig::from_env_unchecked()?;
    let target: ServiceKind = service.parse()?;

    let key = &config.security.internal_service_key;
    if key.trim().is_empty() {
        bail!("INTERNAL_SERVICE_KEY is not set");
    }

    let client = ServiceClient::new(target, &config.upstream, key)?;
    let value: Value = match data {
        Some(body) => {
            let body: Value = serde_json::from_str(body).context("--data is not valid JSON")?;
            client.post(path, &body, token).await?
        }
        None => client.get(path, token).await?,
    };

    output_value(&output_format, &value)
}
