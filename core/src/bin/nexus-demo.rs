use clap::{Parser, Subcommand};
use nexus_client::config::DEFAULT_BASE_URL;
use nexus_client::{Email, NexusClient, ServiceData, UserData};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nexus-demo")]
#[command(about = "Query the Nexus vendor API from the command line", long_about = None)]
struct Cli {
    #[arg(long, env = "NEXUS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "NEXUS_TOKEN", hide_env_values = true)]
    token: String,

    #[arg(long, env = "NEXUS_VENDOR_ID")]
    vendor_id: String,

    #[arg(long, default_value_t = 5)]
    verify_attempts: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all users
    Users,
    /// Show a single user
    User { id: String },
    /// List all services
    Services,
    /// Show a single service
    Service { id: String },
    /// Send an email to a user
    SendEmail {
        id: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
        /// Send the body as HTML
        #[arg(long)]
        html: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = NexusClient::with_token(cli.token)
        .with_vendor_id(cli.vendor_id)
        .with_base_url(cli.base_url)
        .with_verify_attempts(cli.verify_attempts)
        .build()?;

    match cli.command {
        Commands::Users => {
            let users: Vec<UserData> = client
                .users()
                .get_users()?
                .into_iter()
                .map(|u| u.into_data())
                .collect();
            print_json(&users)?;
        }
        Commands::User { id } => {
            print_json(client.users().get_user(&id)?.data())?;
        }
        Commands::Services => {
            let services: Vec<ServiceData> = client
                .services()
                .get_services()?
                .into_iter()
                .map(|s| s.into_data())
                .collect();
            print_json(&services)?;
        }
        Commands::Service { id } => {
            print_json(client.services().get_service(&id)?.data())?;
        }
        Commands::SendEmail {
            id,
            subject,
            body,
            html,
        } => {
            let email = if html {
                Email::html(subject, body)
            } else {
                Email::new(subject, body)
            };
            let accepted = client.users().send_email(&id, Some(&email))?;
            print_json(&accepted)?;
        }
    }

    eprintln!("{}", client.metrics());
    client.close();
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
