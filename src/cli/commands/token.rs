use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::auth::{Principal, Role, ServiceTokenIssuer, SessionSigner, TokenVerifier};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::types::ServiceKind;

#[derive(Args)]
pub struct IdentityArgs {
    #[arg(long, help = "User id to embed")]
    pub user_id: i32,
    #[arg(long, help = "Email to embed")]
    pub email: String,
    #[arg(long = "role", help = "Role to grant; repeat for several")]
    pub roles: Vec<Role>,
}

impl IdentityArgs {
    fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.email.clone(), self.roles.iter().copied())
    }
}

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a session token as the credential layer would (development only)")]
    Session {
        #[command(flatten)]
        identity: IdentityArgs,
        #[arg(long, default_value_t = 3600, help = "Lifetime in seconds")]
        ttl: i64,
    },

    #[command(about = "Mint a 15 minute service token for a target service")]
    Service {
        #[arg(help = "Target service")]
        service: String,
        #[command(flatten)]
        identity: IdentityArgs,
    },

    #[command(about = "Verify a token and print its claims")]
    Inspect {
        #[arg(help = "Compact JWT")]
        token: String,
        #[arg(long, help = "Verify as a service token for this service instead of a session token")]
        service: Option<String>,
    },
}

fn jwt_secret() -> anyhow::Result<String> {
    let config = AppConfig::from_env_unchecked()?;
    if config.security.jwt_secret.trim().is_empty() {
        bail!("JWT_SECRET is not set");
    }
    Ok(config.security.jwt_secret)
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let secret = jwt_secret()?;

    match cmd {
        TokenCommands::Session { identity, ttl } => {
            let token = SessionSigner::new(&secret)?.sign(&identity.principal(), ttl)?;
            print_token(&output_format, "Signed session token", &token, json!({ "ttl": ttl }))
        }
        TokenCommands::Service { service, identity } => {
            let service: ServiceKind = service.parse()?;
            let issued = ServiceTokenIssuer::new(&secret)?.issue(&identity.principal(), service.as_str())?;
            print_token(
                &output_format,
                &format!("Minted service token for {}", service),
                &issued.token,
                json!({ "claims": issued.claims }),
            )
        }
        TokenCommands::Inspect { token, service } => {
            let verifier = TokenVerifier::new(&secret, 0)?;
            let claims = match service {
                Some(service) => {
                    let service: ServiceKind = service.parse()?;
                    let claims = verifier
                        .verify_service_token(&token, service.as_str())
                        .context("service token rejected")?;
                    serde_json::to_value(claims)?
                }
                None => serde_json::to_value(verifier.verify_session(&token).context("session token rejected")?)?,
            };

            match output_format {
                OutputFormat::Json => output_success(&output_format, "Token is valid", Some(json!({ "claims": claims }))),
                OutputFormat::Text => {
                    println!("{}", serde_json::to_string_pretty(&claims)?);
                    Ok(())
                }
            }
        }
    }
}

/// Text mode prints only the token so it can be captured in a shell variable
fn print_token(
    output_format: &OutputFormat,
    message: &str,
    token: &str,
    extra: serde_json::Value,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut data = json!({ "token": token });
            if let (Some(target), serde_json::Value::Object(fields)) = (data.as_object_mut(), extra) {
                target.extend(fields);
            }
            output_success(output_format, message, Some(data))
        }
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
