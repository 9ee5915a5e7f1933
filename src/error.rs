use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dbdeploy
#[derive(Error, Debug)]
pub enum DeployError {
    // Dependency resolution errors
    #[error("Circular object reference: {object_type} {name}")]
    CircularReference { object_type: String, name: String },

    #[error("Missing dependency: {object} requires {dependency} which is not registered")]
    MissingDependency { object: String, dependency: String },

    // Execution errors
    #[error("Statement execution failed for {object}: {message}")]
    Statement { object: String, message: String },

    #[error("Failed to evaluate condition for {object}: {message}")]
    ConditionEvaluation { object: String, message: String },

    #[error("Invalid condition expression `{expr}`: {message}")]
    ConditionSyntax { expr: String, message: String },

    // Database errors
    #[error("Failed to connect to database: {message}")]
    DatabaseConnection {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<tokio_postgres::Error>,
    },

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    // File system errors
    #[error("Failed to read {path}: {message}")]
    FileRead {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {message}")]
    FileWrite {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Objects directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for DeployError {
    fn from(err: std::io::Error) -> Self {
        DeployError::Other(err.to_string())
    }
}

impl From<tokio_postgres::Error> for DeployError {
    fn from(err: tokio_postgres::Error) -> Self {
        // Connection setup failures surface differently from statement failures
        if err.to_string().contains("connect") {
            DeployError::DatabaseConnection {
                message: err.to_string(),
                source: err,
            }
        } else {
            DeployError::Database {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

/// Result type alias for dbdeploy operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Helper function to format an error with all its causes
pub fn format_error_chain(err: &DeployError) -> String {
    use std::error::Error;

    let mut output = format!("Error: {}", err);

    let mut current_err: &dyn Error = err;
    while let Some(source) = current_err.source() {
        output.push_str(&format!("\n  Caused by: {}", source));
        current_err = source;
    }

    output
}

/// Helper function to suggest fixes for common errors
pub fn suggest_fix(err: &DeployError) -> Option<String> {
    match err {
        DeployError::DatabaseConnection { .. } => Some(
            "Suggestions:\n\
             - Check if the database server is running\n\
             - Verify the connection string is correct\n\
             - Ensure the database exists and you have permission to access it"
                .to_string(),
        ),
        DeployError::InvalidConnectionString(_) => Some(
            "Connection string should be in format:\n\
             postgres://[user[:password]@][host][:port][/dbname]"
                .to_string(),
        ),
        DeployError::CircularReference { object_type, name } => Some(format!(
            "Circular !require chain passing through {} {}.\n\
             - Review the !require directives of the objects involved\n\
             - Consider breaking the circular reference",
            object_type, name
        )),
        DeployError::MissingDependency { object, dependency } => Some(format!(
            "Object '{}' requires '{}' which was not found.\n\
             - Ensure a source file for '{}' exists under the objects directory\n\
             - Check for typos in the !require token",
            object, dependency, dependency
        )),
        DeployError::DirectoryNotFound(path) => Some(format!(
            "Objects directory not found: {}\n\
             - Check the objects_dir setting in dbdeploy.toml\n\
             - Ensure you're running dbdeploy from the right directory",
            path.display()
        )),
        DeployError::ConditionSyntax { .. } => Some(
            "Condition expressions support `lhs == rhs`, `lhs != rhs`, `true`, `false`,\n\
             combined with `&&`, `||` and parentheses. Values may be quoted."
                .to_string(),
        ),
        _ => None,
    }
}
