//! Command line driver for the push client.
//!
//! Runs the registration and notification flows against a live or local
//! push wrapper, printing alerts and dialogs to the terminal.

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;

use egoi_push::logging::init_tracing;
use egoi_push::{
    AlertPresenter, AppConfig, DeviceToken, DialogChoice, Endpoints, Os, PermissionStatus,
    PlatformEvent, PushApiClient, PushDialog, PushError, PushPlatform, PushService,
    RegistrationAlert, SystemBrowser,
};

#[derive(Parser)]
#[command(name = "egoi-push", about = "E-goi push notification client")]
struct Cli {
    /// API key of the E-goi account (falls back to EGOI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// E-goi app id (falls back to EGOI_APP_ID)
    #[arg(long, global = true)]
    app_id: Option<u64>,

    /// Device platform (falls back to EGOI_OS)
    #[arg(long, global = true)]
    os: Option<String>,

    /// Push wrapper base URL
    #[arg(long, global = true, env = "EGOI_PUSH_API_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a device token on the E-goi API
    Register {
        #[arg(long)]
        token: String,
        #[arg(long)]
        two_steps_field: Option<String>,
        #[arg(long)]
        two_steps_value: Option<String>,
    },
    /// Feed a notification payload through the display and event flow
    Simulate {
        /// JSON file with the notification as delivered by the push plugin
        #[arg(long)]
        payload: PathBuf,
        #[arg(long, default_value = "")]
        token: String,
        /// Button the simulated user presses
        #[arg(long, value_enum, default_value_t = Choice::Open)]
        choice: Choice,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Choice {
    Open,
    Close,
}

impl From<Choice> for DialogChoice {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Open => DialogChoice::Open,
            Choice::Close => DialogChoice::Close,
        }
    }
}

/// Prints alerts and answers dialogs with a fixed choice
struct ConsolePresenter {
    choice: DialogChoice,
}

#[async_trait]
impl AlertPresenter for ConsolePresenter {
    async fn present_registration_alert(&self, alert: &RegistrationAlert) -> egoi_push::Result<()> {
        println!("[{}] {}: {}", alert.header(), alert.sub_header(), alert.message());
        Ok(())
    }

    async fn present_push(&self, dialog: &PushDialog) -> egoi_push::Result<DialogChoice> {
        println!(
            "{}\n{}\n[{}] [{}]",
            dialog.title.as_deref().unwrap_or_default(),
            dialog.message.as_deref().unwrap_or_default(),
            dialog.close_text,
            dialog.ok_text,
        );
        Ok(self.choice)
    }
}

/// Permission is implied on the command line; tokens come from flags
struct CliPlatform;

#[async_trait]
impl PushPlatform for CliPlatform {
    async fn request_permission(&self) -> egoi_push::Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    async fn register(&self) -> egoi_push::Result<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("egoi_push=info");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, PushError> {
    let mut config = AppConfig::from_env()?;
    if let Some(api_key) = &cli.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(app_id) = cli.app_id {
        config.app_id = app_id;
    }
    if let Some(os) = &cli.os {
        config.os = Some(os.parse::<Os>()?);
    }
    Ok(config.with_deep_link_handler(|url| println!("Deep link: {}", url)))
}

async fn run(cli: Cli) -> Result<(), PushError> {
    let config = load_config(&cli)?;
    let endpoints = match &cli.endpoint {
        Some(url) => Endpoints::new(url.as_str()),
        None => Endpoints::from_env(),
    };
    let http = reqwest::Client::builder()
        .user_agent(concat!("egoi-push/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let api = PushApiClient::new(endpoints).with_http_client(http);
    tracing::info!("Using push wrapper at {}", api.endpoints().base_url);

    let choice = match &cli.command {
        Command::Simulate { choice, .. } => (*choice).into(),
        Command::Register { .. } => DialogChoice::Close,
    };
    let service = PushService::new(
        api,
        Arc::new(ConsolePresenter { choice }),
        Arc::new(SystemBrowser),
        Arc::new(CliPlatform),
    );
    service.register(config).await?;

    match cli.command {
        Command::Register {
            token,
            two_steps_field,
            two_steps_value,
        } => {
            service.save_token(DeviceToken::new(token)).await;
            let body = service
                .register_device(two_steps_field.as_deref(), two_steps_value.as_deref())
                .await?;
            println!("{}", body);
        }
        Command::Simulate { payload, token, .. } => {
            let raw = tokio::fs::read_to_string(&payload)
                .await
                .map_err(|e| PushError::InvalidConfig(format!("{}: {}", payload.display(), e)))?;
            let notification: serde_json::Value = serde_json::from_str(&raw)?;

            let (tx, rx) = mpsc::channel(4);
            if !token.is_empty() {
                tx.send(PlatformEvent::Registration(DeviceToken::new(token)))
                    .await
                    .map_err(|e| PushError::Platform(e.to_string()))?;
            }
            tx.send(PlatformEvent::NotificationReceived(notification))
                .await
                .map_err(|e| PushError::Platform(e.to_string()))?;
            drop(tx);

            service.run(rx).await;
        }
    }

    Ok(())
}
