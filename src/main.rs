//! mp-project - authenticate against an analytics project and print its
//! metadata, or one asset collection, as JSON.

use clap::Parser;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mp_project::config::{Args, Config};
use mp_project::error::Result;
use mp_project::{Project, ProjectOptions, VERSION};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --debug
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config: Config = args.into();

    if let Err(e) = run(&config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> Result<()> {
    info!("mp-project v{}", VERSION);
    config.validate()?;

    let mut project = Project::new(ProjectOptions::from(config))?;
    let metadata = project.auth().await?;

    let output = match config.fetch {
        Some(kind) => {
            info!("Fetching {:?}", kind);
            project.get_kind(kind).await?
        }
        None => {
            let session = project.session();
            json!({
                "project_id": session.project_id(),
                "org_id": session.org_id(),
                "workspace_id": session.workspace_id(),
                "metadata": &*metadata,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    info!("Done: {:?}", project.metrics());
    Ok(())
}
