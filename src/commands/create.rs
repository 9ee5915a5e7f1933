use std::path::Path;

use crate::config::DeployConfig;
use crate::db::PgDatabase;
use crate::deploy::Deployer;
use crate::error::Result;
use crate::registry::Registry;
use crate::report::Reporter;
use crate::scanner::scan_into_registry;

#[derive(Debug)]
pub struct CreateResult {
    pub objects_registered: usize,
}

/// Scan the objects directory and create everything in dependency order.
/// Per-object outcomes stream through `reporter`.
pub async fn execute_create(
    objects_dir: &Path,
    connection_string: &str,
    config: &DeployConfig,
    reporter: &dyn Reporter,
) -> Result<CreateResult> {
    let mut registry = Registry::new();
    let objects_registered = scan_into_registry(objects_dir, &mut registry)?;
    tracing::info!(
        "registered {} objects from {}",
        objects_registered,
        objects_dir.display()
    );

    let db = PgDatabase::connect(connection_string).await?;
    let mut deployer = Deployer::new(
        &mut registry,
        &db,
        reporter,
        config.default_schema(),
        config.dialect(),
    );
    deployer.create_all().await?;

    Ok(CreateResult { objects_registered })
}

#[cfg(feature = "cli")]
pub fn print_create_summary(result: &CreateResult) {
    use owo_colors::OwoColorize;
    println!(
        "\n{} {} {}",
        "Processed".blue().bold(),
        result.objects_registered.to_string().yellow(),
        "registered objects".blue().bold()
    );
}
