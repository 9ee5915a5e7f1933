//! In-memory database stand-in used by unit and integration tests.

use std::sync::Mutex;

use crate::db::Database;
use crate::error::{DeployError, Result};

/// Records every executed statement and answers condition queries from a
/// scripted table. Statements containing a registered failure pattern
/// return an error without being recorded as successful.
#[derive(Default)]
pub struct MockDatabase {
    executed: Mutex<Vec<String>>,
    row_counts: Mutex<Vec<(String, u64)>>,
    fail_patterns: Mutex<Vec<String>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any condition query containing `pattern` answers with `rows`.
    /// Later registrations win when several patterns match.
    pub fn script_row_count(&self, pattern: &str, rows: u64) {
        self.row_counts
            .lock()
            .unwrap()
            .push((pattern.to_string(), rows));
    }

    /// Any statement containing `pattern` fails with a statement error.
    pub fn fail_on(&self, pattern: &str) {
        self.fail_patterns.lock().unwrap().push(pattern.to_string());
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn executed_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }
}

impl Database for MockDatabase {
    async fn execute(&self, sql: &str) -> Result<()> {
        for pattern in self.fail_patterns.lock().unwrap().iter() {
            if sql.contains(pattern.as_str()) {
                return Err(DeployError::Database {
                    message: format!("scripted failure on '{}'", pattern),
                    source: None,
                });
            }
        }
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn query_row_count(&self, sql: &str) -> Result<u64> {
        let counts = self.row_counts.lock().unwrap();
        for (pattern, rows) in counts.iter().rev() {
            if sql.contains(pattern.as_str()) {
                return Ok(*rows);
            }
        }
        Ok(0)
    }
}
