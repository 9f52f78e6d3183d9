//! # XMPP API CLI
//!
//! Command-line definition and dispatch. `token` obtains a token and saves it
//! to the token file; every other subcommand reads that file and calls the
//! server the token was issued by.

use crate::{logging::init_logging, output::render};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};
use xmpp_api_client::{Client, ClientConfig, GrantFlow, OAuthToken, TokenRequest};

const DEFAULT_TOKEN_FILE: &str = ".xmpp-api-oauth.json";

/// Command-line front-end for an XMPP server's HTTP API.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Command-line front-end for an XMPP server's HTTP API.

Start by requesting a token, which is saved to the token file:
   xmpp-api token -j admin@localhost -p passw0rd -s ejabberd:admin

Later commands use the saved token:
   xmpp-api stats registeredusers
   xmpp-api offline count -j alice@localhost"
)]
pub struct Cli {
    /// OAuth token JSON file.
    #[arg(short, long, global = true, default_value = DEFAULT_TOKEN_FILE)]
    pub file: PathBuf,

    /// JSON formatted output.
    #[arg(long, global = true)]
    pub json: bool,

    /// Connection and TLS handshake timeout in seconds.
    #[arg(long, global = true, default_value_t = 15)]
    pub timeout: u64,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log to a rolling file in the cache directory instead of stderr.
    #[arg(long, global = true)]
    pub log_to_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request an OAuth token and save it to the token file.
    Token(TokenArgs),
    /// Get server statistics.
    Stats {
        /// Name of the statistic: registeredusers, onlineusers, onlineusersnode,
        /// uptimeseconds or processes.
        name: String,
    },
    /// Create a new user.
    Register {
        /// JID of the user to create.
        #[arg(short, long)]
        jid: String,
        /// Password to set for the created user.
        #[arg(short, long)]
        password: String,
    },
    /// Operations to perform on users.
    User {
        #[arg(value_enum)]
        operation: UserOperation,
        /// JID of the user to perform the operation on, if different from the token owner.
        #[arg(short, long)]
        jid: Option<String>,
    },
    /// Operations to perform on the offline store.
    Offline {
        #[arg(value_enum)]
        operation: OfflineOperation,
        /// JID of the user to perform the operation on, if different from the token owner.
        #[arg(short, long)]
        jid: Option<String>,
    },
    /// Call a command on the server, using your token credentials.
    Command(CommandArgs),
}

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// JID of the user to generate the token for.
    #[arg(short, long)]
    pub jid: String,

    /// Password used to retrieve the token.
    #[arg(short, long, env = "XMPP_API_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Comma separated list of scopes to associate with the token.
    #[arg(short, long, default_value = "sasl_auth")]
    pub scope: String,

    /// Time before token expiration, e.g. 3600, 90s, 30m, 8760h, 1h30m.
    #[arg(short, long, default_value = "8760h", value_parser = parse_duration)]
    pub ttl: Duration,

    /// Server base URL.
    #[arg(short, long, default_value = "http://localhost:5281/")]
    pub endpoint: String,

    /// Path of the OAuth handler below the endpoint.
    #[arg(long, default_value = "oauth")]
    pub oauth_path: String,

    /// Grant flow used to obtain the token.
    #[arg(long, value_enum, default_value_t = Flow::Password)]
    pub flow: Flow,

    /// OAuth client id, required by the implicit flow.
    #[arg(long, required_if_eq("flow", "implicit"))]
    pub client_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Name of the command on the server.
    #[arg(short, long)]
    pub name: String,

    /// JSON data to send.
    #[arg(long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// File with JSON data to send; `-` or /dev/stdin reads standard input.
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Call as admin.
    #[arg(short, long)]
    pub admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Flow {
    Password,
    Implicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UserOperation {
    Resources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OfflineOperation {
    Count,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    init_logging(log_level, cli.log_to_file)?;

    let rendered = match &cli.command {
        Commands::Token(args) => return get_token(&cli, args).await,
        Commands::Stats { name } => {
            let resp = connect(&cli)?
                .stats(name)
                .await
                .with_context(|| format!("stats error {name:?}"))?;
            render(&resp, cli.json)?
        }
        Commands::Register { jid, password } => {
            let resp = connect(&cli)?
                .register_user(jid, password)
                .await
                .with_context(|| format!("user registration error for {jid}"))?;
            render(&resp, cli.json)?
        }
        Commands::User {
            operation: UserOperation::Resources,
            jid,
        } => {
            let client = connect(&cli)?;
            let jid = jid.clone().unwrap_or_else(|| client.token().jid.clone());
            let resp = client
                .user_resources(&jid)
                .await
                .with_context(|| format!("user resources error for {jid}"))?;
            render(&resp, cli.json)?
        }
        Commands::Offline {
            operation: OfflineOperation::Count,
            jid,
        } => {
            let client = connect(&cli)?;
            let jid = jid.clone().unwrap_or_else(|| client.token().jid.clone());
            let resp = client
                .offline_count(&jid)
                .await
                .with_context(|| format!("offline count error for {jid}"))?;
            render(&resp, cli.json)?
        }
        Commands::Command(args) => {
            let data = read_payload(args.data.as_deref(), args.data_file.as_deref())?;
            let raw = connect(&cli)?.command(&args.name, data, args.admin).await?;
            if !raw.is_success() {
                println!("Response: {}", raw.status);
                bail!("{}", raw.text());
            }
            info!(command = %args.name, "command succeeded");
            if cli.json {
                render(&raw, true)?
            } else {
                raw.text()
            }
        }
    };

    println!("{rendered}");
    Ok(())
}

async fn get_token(cli: &Cli, args: &TokenArgs) -> Result<()> {
    let config = ClientConfig::new(&args.endpoint)
        .with_oauth_path(&args.oauth_path)
        .with_connect_timeout(Duration::from_secs(cli.timeout));
    let client = Client::new(config)?;

    let flow = match args.flow {
        Flow::Password => GrantFlow::Password,
        Flow::Implicit => GrantFlow::Implicit {
            client_id: args.client_id.clone().unwrap_or_default(),
        },
    };
    let request = TokenRequest::new(&args.jid, &args.password, &args.scope, args.ttl);

    let token = client
        .get_token_with(&request, &flow)
        .await
        .context("could not retrieve token")?;
    token
        .save(&cli.file)
        .with_context(|| format!("could not save token to file {:?}", cli.file))?;

    println!("Successfully saved token in file {}", cli.file.display());
    Ok(())
}

fn load_token(file: &Path) -> Result<OAuthToken> {
    let token = OAuthToken::load(file)
        .with_context(|| format!("could not load token file {:?}", file))?;
    if token.access_token.is_empty() {
        bail!("could not find access token in file {:?}", file);
    }
    if token.is_expired() {
        warn!(expiration = %token.expiration, "token has expired, request a new one with `token`");
    }
    Ok(token)
}

/// Client bound to the server and credentials stored in the token file.
fn connect(cli: &Cli) -> Result<Client> {
    let token = load_token(&cli.file)?;
    let config = ClientConfig::new(&token.endpoint)
        .with_connect_timeout(Duration::from_secs(cli.timeout));
    Ok(Client::new(config)?.with_token(token))
}

/// Request body for `command`: inline data, a file, stdin, or nothing.
fn read_payload(data: Option<&str>, data_file: Option<&Path>) -> Result<Vec<u8>> {
    match (data, data_file) {
        (Some(_), Some(_)) => Err(anyhow!(
            "use either --data or --data-file to pass input to the server"
        )),
        (Some(data), None) => Ok(data.as_bytes().to_vec()),
        (None, Some(path)) if path == Path::new("-") || path == Path::new("/dev/stdin") => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("could not read standard input")?;
            Ok(buf)
        }
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("could not read data file {:?}", path))
        }
        // Some server commands take no arguments.
        (None, None) => Ok(Vec::new()),
    }
}

/// Parses `3600`, `90s`, `30m`, `8760h`, `2d` or compounds such as `1h30m`.
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86_400,
            other => return Err(format!("invalid duration unit {other:?} in {s:?}")),
        };
        let value: u64 = digits
            .parse()
            .map_err(|_| format!("missing number before {c:?} in {s:?}"))?;
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| format!("duration {s:?} is too large"))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(format!("missing unit after {digits} in {s:?}"));
    }
    Ok(Duration::from_secs(total))
}
