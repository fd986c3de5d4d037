#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use session_client::net::http::HttpTransport;
use session_client::storage::FileStorage;
use session_client::{
    AuthError, ConfigError, IdentityPatch, Navigator, Provider, SessionClient, SessionConfig, TickQueue,
    TransportError,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("nothing to update; pass at least one field")]
    EmptyPatch,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "session-cli", about = "Sign in to the auth API and manage users from the terminal")]
struct Cli {
    #[arg(long, env = "SESSION_API_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SESSION_STATE_FILE", default_value = ".session.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SESSION_PASSWORD")]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SESSION_PASSWORD")]
        password: String,
    },
    ProviderLogin {
        #[arg(long, value_parser = parse_provider)]
        provider: Provider,
        #[arg(long, help = "Token issued by the provider's sign-in flow")]
        token: String,
    },
    /// Fetch the identity behind the stored credential.
    Me,
    Logout,
    /// Show the stored session without contacting the server.
    Status,
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    Update(UpdateArgs),
    Delete { id: String },
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long = "role", help = "Replace the role set; repeat for several roles")]
    roles: Vec<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    avatar: Option<String>,
}

impl UpdateArgs {
    fn into_patch(self) -> Result<(String, IdentityPatch), CliError> {
        let roles = (!self.roles.is_empty()).then(|| self.roles.into_iter().collect::<BTreeSet<_>>());
        let patch = IdentityPatch { name: self.name, email: self.email, roles, phone: self.phone, avatar: self.avatar };
        if patch == IdentityPatch::default() {
            return Err(CliError::EmptyPatch);
        }
        Ok((self.id, patch))
    }
}

/// Terminal hosts have no router; navigation decisions are just reported.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!("navigate -> {path}");
    }
}

fn load_config(base_url: Option<&str>) -> Result<SessionConfig, CliError> {
    let config = SessionConfig::from_env()?;
    Ok(match base_url {
        Some(url) => config.with_api_base_url(url)?,
        None => config,
    })
}

fn parse_provider(raw: &str) -> Result<Provider, String> {
    raw.parse()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = load_config(cli.base_url.as_deref())?;
    let ticks = Rc::new(TickQueue::new());
    let transport = HttpTransport::new(&config)?;
    let client = SessionClient::new(
        config,
        transport,
        Rc::new(FileStorage::new(&cli.state_file)),
        Rc::new(TerminalNavigator),
        ticks.clone(),
    );

    let result = run(&client, cli.command, &cli.state_file).await;
    ticks.run_until_idle();
    print_json(&result?)
}

async fn run(client: &SessionClient, command: Command, state_file: &std::path::Path) -> Result<Value, CliError> {
    let gateway = client.gateway();
    let value = match command {
        Command::Login { email, password } => serde_json::to_value(gateway.login(&email, &password).await?)?,
        Command::Register { name, email, password } => {
            serde_json::to_value(gateway.register(&name, &email, &password).await?)?
        }
        Command::ProviderLogin { provider, token } => {
            serde_json::to_value(gateway.login_with_provider(provider, &token).await?)?
        }
        Command::Me => serde_json::to_value(gateway.fetch_identity().await?)?,
        Command::Logout => {
            gateway.logout();
            json!({ "signedIn": false })
        }
        Command::Status => status(client, state_file),
        Command::Users(users) => match users.command {
            UsersSubcommand::List => serde_json::to_value(gateway.list_identities().await?)?,
            UsersSubcommand::Update(args) => {
                let (id, patch) = args.into_patch()?;
                serde_json::to_value(gateway.update_identity(&id, &patch).await?)?
            }
            UsersSubcommand::Delete { id } => {
                gateway.delete_identity(&id).await?;
                json!({ "deleted": id })
            }
        },
    };
    Ok(value)
}

fn status(client: &SessionClient, state_file: &std::path::Path) -> Value {
    let persistence = client.persistence();
    json!({
        "apiBaseUrl": client.config().api_base_url,
        "stateFile": state_file.display().to_string(),
        "signedIn": persistence.get().is_some(),
        "identity": persistence.cached_identity(),
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
