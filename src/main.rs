use dbdeploy::{
    cli::{Cli, Commands},
    commands::{
        execute_create, execute_drop, execute_plan, print_create_summary, print_drop_summary,
        print_plan_summary,
    },
    config::DeployConfig,
    error::{DeployError, Result},
    logging,
    report::CliReporter,
};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Parse CLI args first to get verbosity level
    let cli = Cli::parse_args();

    // Verbosity: 0 = warn, 1 = info, 2 = debug, 3+ = trace
    logging::init(cli.verbose).map_err(|e| color_eyre::eyre::eyre!(e))?;

    info!("Starting dbdeploy v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command: {:?}", cli.command);

    if let Err(e) = run(cli).await {
        dbdeploy::log_error!(e);
        logging::output::error(dbdeploy::error::format_error_chain(&e));

        if let Some(suggestion) = dbdeploy::error::suggest_fix(&e) {
            logging::output::step(suggestion);
        }

        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config_file = match DeployConfig::load_from_file() {
        Ok(config) => {
            if config.is_some() {
                info!("Loaded configuration from {}", dbdeploy::config::CONFIG_FILE);
            }
            config
        }
        Err(e) => {
            debug!("Configuration file not usable: {}", e);
            None
        }
    };

    match cli.command {
        Commands::Init => {
            logging::output::step("Generating sample configuration file...");

            DeployConfig::write_sample_config()?;

            logging::output::success(format!(
                "Created {0}.example - rename to {0} to use",
                dbdeploy::config::CONFIG_FILE
            ));
            Ok(())
        }

        Commands::Create {
            objects_dir,
            connection_string,
            dialect,
        } => {
            logging::output::header("Creating Objects");

            let conn_str = resolve_connection_string(
                connection_string.clone(),
                config_file
                    .as_ref()
                    .and_then(|c| c.connection_string.clone()),
            )?;
            let merged_config = DeployConfig::merge_with_cli(
                config_file,
                objects_dir,
                connection_string,
                dialect,
            );

            let start = std::time::Instant::now();
            let result = execute_create(
                &merged_config.objects_dir(),
                &conn_str,
                &merged_config,
                &CliReporter,
            )
            .await?;

            info!(
                "Create completed in {}",
                logging::format_duration(start.elapsed())
            );
            print_create_summary(&result);
            Ok(())
        }

        Commands::Drop {
            objects_dir,
            connection_string,
            dialect,
        } => {
            logging::output::header("Dropping Objects");

            let conn_str = resolve_connection_string(
                connection_string.clone(),
                config_file
                    .as_ref()
                    .and_then(|c| c.connection_string.clone()),
            )?;
            let merged_config = DeployConfig::merge_with_cli(
                config_file,
                objects_dir,
                connection_string,
                dialect,
            );

            let start = std::time::Instant::now();
            let result = execute_drop(
                &merged_config.objects_dir(),
                &conn_str,
                &merged_config,
                &CliReporter,
            )
            .await?;

            info!(
                "Drop completed in {}",
                logging::format_duration(start.elapsed())
            );
            print_drop_summary(&result);
            Ok(())
        }

        Commands::Plan {
            objects_dir,
            output_graph,
        } => {
            logging::output::header("Planning");

            let merged_config =
                DeployConfig::merge_with_cli(config_file, objects_dir, None, None);

            let result = execute_plan(&merged_config.objects_dir(), output_graph)?;
            print_plan_summary(&result);
            Ok(())
        }
    }
}

/// Connection resolution order: --connection-string, then DATABASE_URL,
/// then the config file. The flag and file values stay separate here so
/// the env var can sit between them.
fn resolve_connection_string(
    flag: Option<String>,
    config_file: Option<String>,
) -> Result<String> {
    let conn_str = flag
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .or(config_file)
        .ok_or_else(|| {
            DeployError::Configuration(format!(
                "No connection string provided. Use --connection-string, DATABASE_URL env var, or {}",
                dbdeploy::config::CONFIG_FILE
            ))
        })?;

    if !conn_str.starts_with("postgres://") && !conn_str.starts_with("postgresql://") {
        return Err(DeployError::InvalidConnectionString(conn_str));
    }

    Ok(conn_str)
}
