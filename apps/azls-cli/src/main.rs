//! azls - list and cache Azure directory and RBAC objects
//!
//! Keeps per-tenant caches of Microsoft Graph and Azure Resource Manager
//! objects under ~/.azls and lists them tersely from there.

use azls_cli::commands::{self, Globals};
use azls_cli::error::CliResult;
use azls_cli::logging::{self, LogLevel};
use clap::{Parser, Subcommand};

/// azls - Azure directory and RBAC inventory
#[derive(Parser)]
#[command(name = "azls")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Show progress details and info-level logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show debug logs, including every API call
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress progress lines and warnings
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List objects of one type, tersely or as JSON
    #[command(alias = "ls")]
    List(commands::list::ListArgs),

    /// Show every cached object with the given UUID as YAML
    Show(commands::show::ShowArgs),

    /// Delete cache files for one type or all types
    Clear(commands::clear::ClearArgs),

    /// Compare local cache counts with remote counts
    Status,

    /// Print the management group and subscription tree
    Tree,

    /// Print role assignments with resolved names as CSV
    Report,

    /// Save service principal credentials for a tenant
    Login(commands::login::LoginArgs),

    /// Show the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let level = LogLevel::from_flags(cli.verbose, cli.debug, cli.quiet);
    logging::init(level);

    if let Err(e) = run(cli, level).await {
        e.print();
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, level: LogLevel) -> CliResult<()> {
    let globals = Globals::new(level);
    match cli.command {
        Commands::List(args) => commands::list::execute(args, &globals).await,
        Commands::Show(args) => commands::show::execute(args).await,
        Commands::Clear(args) => commands::clear::execute(args).await,
        Commands::Status => commands::status::execute(&globals).await,
        Commands::Tree => commands::tree::execute(&globals).await,
        Commands::Report => commands::report::execute(&globals).await,
        Commands::Login(args) => commands::login::execute(args).await,
        Commands::Config => commands::config::execute().await,
    }
}
