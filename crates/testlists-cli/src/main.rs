use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use testlists_core::{Config, OutputFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "testlists")]
#[command(about = "Resolve e2e test profiles into ordered test lists", long_about = None)]
struct Cli {
    /// Config file (default: ./testlists.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Alternate list definition file
    #[arg(long, global = true)]
    lists: Option<PathBuf>,

    /// Alternate e2e source tree
    #[arg(long, global = true)]
    source_tree: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the test list of a profile
    Get {
        /// Profile name
        profile: String,

        /// Start the list with install
        #[arg(long)]
        install: bool,

        /// End the list with uninstall
        #[arg(long)]
        uninstall: bool,

        /// Put every test between its own install and uninstall
        #[arg(long)]
        wrap: bool,

        /// Separator for plain output
        #[arg(long)]
        separator: Option<String>,

        /// Longest recorded tests first
        #[arg(long)]
        sort_by_duration: bool,

        /// Write the list to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// plain, json or yaml
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// List resolved profile names
    Profiles,
    /// Print scraped test identifiers and their declaring files
    Scrape {
        /// Print a JSON object instead of tab separated lines
        #[arg(long)]
        json: bool,
    },
    /// Print the testcases of a plan, includes merged
    Plan {
        /// Plan name
        name: String,
    },
    /// Work out the runs needed for a test list, including upgrade installs
    InstallTag {
        /// Profile to run
        #[arg(long, conflicts_with = "tests")]
        profile: Option<String>,

        /// Whitespace separated tests to run
        #[arg(long)]
        tests: Option<String>,

        /// Plan providing upgrade-from-version
        #[arg(long)]
        testplan: Option<String>,

        /// Explicit install tag
        #[arg(long)]
        installtag: Option<String>,
    },
    /// Print the default configuration as a starting testlists.toml
    DefaultConfig,
}

fn init_tracing(verbose: u8, log_json: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if let Some(tree) = &cli.source_tree {
        config.paths.source_tree = tree.clone();
    }
    if let Some(lists) = &cli.lists {
        // Given on the command line, so relative to the working directory.
        let cwd = std::env::current_dir().wrap_err("cannot determine working directory")?;
        config.paths.lists = cwd.join(lists);
    }

    Ok(config)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    if let Commands::DefaultConfig = cli.command {
        print!("{}", Config::default_config_string());
        return Ok(());
    }
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Get {
            profile,
            install,
            uninstall,
            wrap,
            separator,
            sort_by_duration,
            output,
            format,
        } => {
            let options = testlists_core::ListOptions {
                install,
                uninstall,
                wrap_each: wrap,
                separator: separator.unwrap_or_else(|| config.output.separator.clone()),
                format: format.unwrap_or(config.output.format),
            };
            commands::get(&config, &profile, &options, sort_by_duration, output.as_deref())
        }
        Commands::Profiles => commands::profiles(&config),
        Commands::Scrape { json } => commands::scrape(&config, json),
        Commands::Plan { name } => commands::plan(&config, &name),
        Commands::InstallTag {
            profile,
            tests,
            testplan,
            installtag,
        } => commands::install_tag(
            &config,
            profile.as_deref(),
            tests.as_deref(),
            testplan.as_deref(),
            installtag.as_deref(),
        ),
        Commands::DefaultConfig => Ok(()),
    }
}
