use jobgraph::config::Config;
use jobgraph::{commands, logging};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Logging level (error, warn, info, debug, trace),
    /// overrides the JOBGRAPH_LOG environment variable.
    #[clap(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Web Server
    RunServer,
    /// Register a new node, prints its id
    CreateNode { name: String },
    /// Validate a JSON job request, without storing it
    CheckJob { path: PathBuf },
}

#[rocket::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());

    if let Err(err) = run(cli).await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        // validate a job file, no database involved
        Commands::CheckJob { path } => {
            commands::check_job(&path)?;
            println!("ok");
        }
        // store a new node into the database
        Commands::CreateNode { name } => {
            let config = read_config(&rocket::build())?;
            let node_id = commands::create_node(name, config).await?;
            println!("{}", node_id);
        }
        // starts the web server
        Commands::RunServer => {
            let rocket = rocket::build();
            let config = read_config(&rocket)?;
            commands::run_server(rocket, config).await?;
        }
    }
    Ok(())
}

fn read_config(rocket: &rocket::Rocket<rocket::Build>) -> anyhow::Result<Config> {
    rocket
        .figment()
        .extract()
        .map_err(|e| anyhow::anyhow!("failed to read config: {}", e))
}
