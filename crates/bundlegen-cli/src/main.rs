use bundlegen::{
    commands::{
        config::{self, ConfigAction},
        generate::{self, GenerateCommand},
        scan::{self, ScanCommand},
    },
    GlobalOpts,
};
use bundlegen_logger as logger;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bundlegen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Plugin bundle discovery",
    long_about = "bundlegen finds plugin manifests, asks an interpreter to describe their frontend bundles and prints the bundler configuration for each one."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bundle configurations for every discovered plugin
    Generate(GenerateCommand),
    /// List the plugin manifests under the given roots
    Scan(ScanCommand),
    /// Configure bundlegen
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing(opts: &GlobalOpts) {
    let filter = EnvFilter::try_from_env("BUNDLEGEN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(logger::verbosity_to_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Ignore the error: a subscriber may already be installed
    let _ = if opts.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), false) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(&cli.global);

    let result = match cli.command {
        Commands::Generate(cmd) => generate::handle_generate(cmd, &cli.global),
        Commands::Scan(cmd) => scan::handle_scan(cmd, &cli.global),
        Commands::Config { action } => {
            config::handle_config(action.unwrap_or(ConfigAction::Show), &cli.global)
        }
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
