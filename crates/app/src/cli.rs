//! Command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lyceum_application::{
    ApiGateway, CredentialStore, NotificationHandler, NotificationSink, SessionService,
};
use lyceum_domain::{HttpMethod, Notification, RequestSpec};
use lyceum_infrastructure::{FileSessionRepository, ReqwestHttpClient, load_config};

#[derive(Parser)]
#[command(name = "lyceum")]
#[command(about = "Authenticated client for the school administration API")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "LYCEUM_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Where the signed-in session is kept
    #[arg(long, global = true, env = "LYCEUM_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in and store the session")]
    Login {
        username: String,
        #[arg(long, env = "LYCEUM_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, help = "Tenant to sign in to")]
        tenant: Option<String>,
    },

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Switch the active tenant")]
    Tenant { tenant: String },

    #[command(about = "Show the stored session")]
    Status,

    #[command(about = "Send an authenticated request")]
    Request {
        #[arg(help = "GET, POST, PUT, PATCH or DELETE")]
        method: HttpMethod,
        #[arg(help = "Path relative to the base URL, or an absolute URL")]
        path: String,
        #[arg(long, help = "JSON request body")]
        data: Option<String>,
        #[arg(short, long = "query", value_parser = parse_pair, help = "Query parameter as key=value")]
        query: Vec<(String, String)>,
        #[arg(long, help = "Send this one request to another tenant")]
        tenant: Option<String>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn print_toast(notification: Notification) {
    eprintln!("[{}] {}", notification.severity, notification.message);
}

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let session_path = cli
        .session_file
        .or_else(FileSessionRepository::default_path)
        .context("no config directory; pass --session-file")?;

    let transport = Arc::new(ReqwestHttpClient::new(&config)?);
    let notifications = Arc::new(NotificationSink::new());
    let handler: NotificationHandler = Arc::new(print_toast);
    notifications.register(handler);

    let tenant_header = config.tenant_header.clone();
    let gateway = Arc::new(ApiGateway::new(
        transport,
        CredentialStore::new(),
        notifications,
        config,
    ));
    let session = SessionService::new(
        Arc::clone(&gateway),
        Arc::new(FileSessionRepository::new(session_path)),
    );
    session.restore().await?;

    match cli.command {
        Commands::Login {
            username,
            password,
            tenant,
        } => {
            let credential = session
                .sign_in(&username, &password, tenant.as_deref())
                .await?;
            match credential.active_tenant_id {
                Some(tenant) => println!("Signed in as {username} (tenant {tenant})"),
                None => println!("Signed in as {username}"),
            }
        }
        Commands::Logout => {
            session.sign_out().await?;
            println!("Signed out");
        }
        Commands::Tenant { tenant } => {
            if !gateway.credentials().is_authenticated() {
                anyhow::bail!("not signed in");
            }
            session.switch_tenant(&tenant).await?;
            println!("Active tenant: {tenant}");
        }
        Commands::Status => {
            let credential = gateway.credentials().snapshot();
            match credential.token_preview() {
                Some(preview) => println!("Signed in (token {preview})"),
                None => println!("Signed out"),
            }
            if let Some(tenant) = credential.active_tenant_id {
                println!("Tenant: {tenant}");
            }
        }
        Commands::Request {
            method,
            path,
            data,
            query,
            tenant,
        } => {
            let mut request = RequestSpec::new(method, path);
            if let Some(data) = data {
                let body = serde_json::from_str(&data).context("--data is not valid JSON")?;
                request = request.with_json(body);
            }
            for (key, value) in query {
                request = request.with_param(key, value);
            }
            if let Some(tenant) = tenant {
                request = request.with_header(tenant_header, tenant);
            }

            let outcome = gateway.execute(request).await;
            session.persist().await?;

            match outcome {
                Ok(response) => match response.payload() {
                    Some(payload) if !payload.is_string() => {
                        println!("{}", serde_json::to_string_pretty(&payload)?);
                    }
                    _ => println!("{}", response.body),
                },
                Err(error) => {
                    tracing::debug!(%error, "request failed");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
