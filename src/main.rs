use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use mailer::{EmailConfig, Mail, new_engine};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mailer configuration file
    #[arg(short, long, default_value = "mail.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a single message
    Send {
        /// Sender address
        #[arg(long)]
        from_address: String,

        /// Sender display name
        #[arg(long, default_value = "")]
        from_name: String,

        /// Recipient, may be repeated
        #[arg(long, required = true)]
        to: Vec<String>,

        /// Carbon-copy recipient, may be repeated
        #[arg(long)]
        cc: Vec<String>,

        #[arg(long, default_value = "")]
        subject: String,

        /// HTML body
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the HTML body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
    },

    /// Validate the configuration without sending anything
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = if cli.config.exists() {
        EmailConfig::load_from_file(&cli.config).await?
    } else {
        info!("Config file not found at {:?}, using defaults", cli.config);
        EmailConfig::default()
    };

    let engine = new_engine(&config).await?;

    match cli.command {
        Commands::Check => {
            println!("Configuration OK, using {}", engine.name());
        }
        Commands::Send {
            from_address,
            from_name,
            to,
            cc,
            subject,
            body,
            body_file,
        } => {
            let body = match (body, body_file) {
                (Some(body), _) => body,
                (None, Some(path)) => tokio::fs::read_to_string(path).await?,
                (None, None) => String::new(),
            };

            let response = engine
                .from(&from_name, &from_address)
                .to(to)
                .cc(cc)
                .subject(&subject)
                .body(&body)
                .send()
                .await?;

            match response.message_id() {
                Some(id) => println!("Sent, message id {}", id),
                None => println!("Sent"),
            }
        }
    }

    Ok(())
}
