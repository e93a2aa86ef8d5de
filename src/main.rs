use std::io;
use std::path::PathBuf;

use clap::Parser;

mod client;
mod cmd;
mod config;
mod errors;
mod utils;

use client::HttpClient;
use cmd::format::StyleOptions;
use cmd::prompt::TerminalPrompt;
use cmd::{CommandTable, Invocation, Session};
use config::Settings;
use errors::{RemoteContext, ShellResult};

/// keystone - command line client for the OpenStack Identity v2.0 API
///
/// Layout:
///   keystone [global options] <command> [command arguments]
///
/// Global options go before the command word; everything after it belongs
/// to the command. See `keystone help` for the command list and
/// `keystone help <command>` (or `<command> --help`) for one command.
///
/// Authentication (flag / env):
///   --os-username / OS_USERNAME       --os-password / OS_PASSWORD
///   --os-tenant-name / OS_TENANT_NAME --os-tenant-id / OS_TENANT_ID
///   --os-auth-url / OS_AUTH_URL       --os-region-name / OS_REGION_NAME
/// or, bypassing authentication with an admin token:
///   --os-token / SERVICE_TOKEN        --os-endpoint / SERVICE_ENDPOINT
///
/// Examples:
///   keystone user-list
///   keystone user-create --name alice --pass secret --email alice@example.com
///   keystone --json tenant-get 3f2c...
///   keystone endpoint-get --service compute --endpoint-type adminURL
#[derive(Parser, Debug)]
#[command(
    name = "keystone",
    version,
    about = "Command line client for the OpenStack Identity v2.0 API",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Name used for authentication
    #[arg(long = "os-username", env = "OS_USERNAME", value_name = "NAME")]
    username: Option<String>,

    /// Password used for authentication
    #[arg(long = "os-password", env = "OS_PASSWORD", value_name = "PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Tenant to request authorization on
    #[arg(long = "os-tenant-name", env = "OS_TENANT_NAME", value_name = "NAME")]
    tenant_name: Option<String>,

    /// Tenant id to request authorization on
    #[arg(long = "os-tenant-id", env = "OS_TENANT_ID", value_name = "ID")]
    tenant_id: Option<String>,

    /// Identity endpoint to use for authentication
    #[arg(long = "os-auth-url", env = "OS_AUTH_URL", value_name = "URL")]
    auth_url: Option<String>,

    /// Region used to select the admin endpoint
    #[arg(long = "os-region-name", env = "OS_REGION_NAME", value_name = "REGION")]
    region_name: Option<String>,

    /// Admin token (skips authentication; requires --os-endpoint)
    #[arg(long = "os-token", env = "SERVICE_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Admin endpoint used with --os-token
    #[arg(long = "os-endpoint", env = "SERVICE_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,

    /// YAML or JSON file with any of the connection settings above
    #[arg(long = "os-config-file", env = "OS_CONFIG_FILE", value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Command word followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl Cli {
    fn settings(&self) -> ShellResult<Settings> {
        let given = Settings {
            username: self.username.clone(),
            password: self.password.clone(),
            tenant_name: self.tenant_name.clone(),
            tenant_id: self.tenant_id.clone(),
            auth_url: self.auth_url.clone(),
            region_name: self.region_name.clone(),
            token: self.token.clone(),
            endpoint: self.endpoint.clone(),
        };
        Ok(match &self.config_file {
            Some(path) => given.or(Settings::load_file(path)?),
            None => given,
        })
    }
}

fn main() {
    let cli = Cli::parse();

    utils::init_logging(utils::derive_level(cli.verbose, cli.quiet));

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> ShellResult<()> {
    let table = CommandTable::builtin()?;
    let invocation = table.prepare(&cli.command)?;

    if let Invocation::Help(text) = &invocation {
        println!("{text}");
        return Ok(());
    }

    let auth = cli.settings()?.into_auth()?;
    let client = HttpClient::connect(auth).remote("Unable to authenticate")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut session = Session {
        client: &client,
        prompt: &TerminalPrompt,
        out: &mut out,
        style: StyleOptions::detect(),
        json: cli.json,
    };
    invocation.run(&mut session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_before_command_words() {
        let cli = Cli::try_parse_from([
            "keystone",
            "--json",
            "--os-token",
            "t",
            "--os-endpoint",
            "http://k:35357/v2.0",
            "user-create",
            "--name",
            "alice",
            "--enabled",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert_eq!(cli.command, vec!["user-create", "--name", "alice", "--enabled"]);
    }

    #[test]
    fn command_help_flag_is_passed_through() {
        let cli = Cli::try_parse_from(["keystone", "tenant-get", "--help"]).unwrap();
        assert_eq!(cli.command, vec!["tenant-get", "--help"]);
        let table = CommandTable::builtin().unwrap();
        assert!(matches!(
            table.prepare(&cli.command).unwrap(),
            Invocation::Help(_)
        ));
    }

    #[test]
    fn missing_credentials_is_config_error() {
        let cli = Cli::try_parse_from(["keystone", "--os-username", "u", "user-list"]).unwrap();
        // env may carry real credentials on a developer machine
        if std::env::var_os("OS_PASSWORD").is_some() || std::env::var_os("SERVICE_TOKEN").is_some() {
            return;
        }
        let err = cli.settings().unwrap().into_auth().unwrap_err();
        assert!(matches!(err, errors::ShellError::Config(_)));
    }
}
