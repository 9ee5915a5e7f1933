use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use dbdeploy::db::test_utils::MockDatabase;
use dbdeploy::registry::Registry;
use dbdeploy::render::SqlDialect;
use dbdeploy::report::CollectingReporter;
use dbdeploy::scanner::scan_into_registry;
use dbdeploy::Deployer;

/// Isolated objects directory backed by a tempdir.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub objects_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("tempdir");
        let objects_dir = temp_dir.path().join("objects");
        fs::create_dir(&objects_dir).expect("objects dir");
        Self {
            temp_dir,
            objects_dir,
        }
    }

    /// Write one object file under `<objects_dir>/<type_dir>/<name>.sql`.
    pub fn write_object(&self, type_dir: &str, name: &str, content: &str) {
        let dir = self.objects_dir.join(type_dir);
        fs::create_dir_all(&dir).expect("type dir");
        fs::write(dir.join(format!("{}.sql", name)), content).expect("object file");
    }

    /// Scan the objects directory into a fresh registry.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new();
        scan_into_registry(&self.objects_dir, &mut registry).expect("scan");
        registry
    }
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Deployer over the mock database with the stock `dbo` default schema.
pub fn deployer<'a>(
    registry: &'a mut Registry,
    db: &'a MockDatabase,
    reporter: &'a CollectingReporter,
) -> Deployer<'a, MockDatabase> {
    Deployer::new(
        registry,
        db,
        reporter,
        vec!["dbo".to_string()],
        SqlDialect::Postgres,
    )
}
