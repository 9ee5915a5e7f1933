//! The create/drop executor.
//!
//! Each pass resets every record to `Unvisited` and walks the registry in
//! order, recursing through `!require` references depth-first. The status
//! field is the classic white/gray/black DFS coloring: re-entering a record
//! that is `InProgress` means the `requires` graph has a cycle.
//!
//! Two early returns deliberately leave a record `InProgress` instead of
//! `Done`: an unmet condition and (create only) a blank body. A dependent
//! that requires such a record later in the same pass trips the cycle
//! detector, since re-entry cannot tell a skip from a genuine cycle.

use crate::condition::eval_predicate;
use crate::db::Database;
use crate::error::{DeployError, Result};
use crate::registry::{ObjectKey, ObjectRecord, Registry, Status};
use crate::render::{
    expand, qualified_name, synthesize_create, synthesize_drop, SqlDialect, TemplateContext,
};
use crate::report::Reporter;

/// Which way a pass applies each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Create,
    Drop,
}

impl Direction {
    pub fn verb(&self) -> &'static str {
        match self {
            Direction::Create => "CREATE",
            Direction::Drop => "DROP",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Direction::Create => "created",
            Direction::Drop => "dropped",
        }
    }
}

/// Drives create/drop passes over a registry against one database.
pub struct Deployer<'a, D: Database> {
    registry: &'a mut Registry,
    db: &'a D,
    reporter: &'a dyn Reporter,
    default_schema: Vec<String>,
    dialect: SqlDialect,
}

impl<'a, D: Database> Deployer<'a, D> {
    pub fn new(
        registry: &'a mut Registry,
        db: &'a D,
        reporter: &'a dyn Reporter,
        default_schema: Vec<String>,
        dialect: SqlDialect,
    ) -> Self {
        Self {
            registry,
            db,
            reporter,
            default_schema,
            dialect,
        }
    }

    /// Create every eligible record once, dependencies first.
    pub async fn create_all(&mut self) -> Result<()> {
        self.run_pass(Direction::Create).await
    }

    /// Drop every eligible record once. Traversal still resolves
    /// `requires` before acting on the dependent, same as create.
    pub async fn drop_all(&mut self) -> Result<()> {
        self.run_pass(Direction::Drop).await
    }

    async fn run_pass(&mut self, direction: Direction) -> Result<()> {
        self.registry.reset_statuses();
        for key in self.registry.keys() {
            self.apply(direction, &key, None).await?;
        }
        Ok(())
    }

    /// Apply one record in `direction`, recursing into its requirements
    /// first. `required_by` names the dependent for error attribution when
    /// `key` is not registered.
    async fn apply(
        &mut self,
        direction: Direction,
        key: &ObjectKey,
        required_by: Option<&ObjectKey>,
    ) -> Result<()> {
        let record = match self.registry.get(key) {
            Some(record) => record.clone(),
            None => {
                return Err(DeployError::MissingDependency {
                    object: required_by
                        .map(|k| k.to_string())
                        .unwrap_or_else(|| "registry".to_string()),
                    dependency: key.to_string(),
                })
            }
        };

        let gated = match direction {
            Direction::Create => record.nocreate,
            Direction::Drop => record.nodrop,
        };
        if gated {
            return Ok(());
        }

        match record.status {
            Status::Done => return Ok(()),
            Status::InProgress => {
                return Err(DeployError::CircularReference {
                    object_type: record.object_type.clone(),
                    name: record.name.clone(),
                })
            }
            Status::Unvisited => {}
        }
        self.registry.set_status(key, Status::InProgress);

        // Schema is a per-call computation, never shared across the
        // recursion.
        let schema = record
            .schema
            .clone()
            .unwrap_or_else(|| self.default_schema.clone());
        let qualified = qualified_name(self.dialect, &schema, &record.name);
        let ctx = TemplateContext {
            name: &record.name,
            object_type: &record.object_type,
            schema: &schema,
            path: &record.path,
            qualified: &qualified,
        };

        if !self.condition_met(direction, &record, &ctx).await? {
            self.reporter.condition_not_met(direction, key, &qualified);
            return Ok(());
        }

        if direction == Direction::Create && record.body.trim().is_empty() {
            self.reporter.skipped_empty(direction, key);
            return Ok(());
        }

        for token in &record.requires {
            let dep_key = resolve_reference(token, &record.object_type);
            Box::pin(self.apply(direction, &dep_key, Some(key))).await?;
        }

        let statement = render_statement(direction, &record, &qualified, &ctx);
        if record.debug {
            tracing::info!(object = %key, "{}", statement);
        } else {
            tracing::debug!(object = %key, "{}", statement);
        }

        let (before, after) = match direction {
            Direction::Create => (&record.before_create_sql, &record.after_create_sql),
            Direction::Drop => (&record.before_drop_sql, &record.after_drop_sql),
        };
        let mut sequence: Vec<String> = Vec::with_capacity(before.len() + after.len() + 1);
        sequence.extend(before.iter().map(|s| expand(s, &ctx)));
        sequence.push(statement);
        sequence.extend(after.iter().map(|s| expand(s, &ctx)));

        let mut failed = false;
        for sql in &sequence {
            if let Err(e) = self.db.execute(sql).await {
                failed = true;
                let err = DeployError::Statement {
                    object: key.to_string(),
                    message: e.to_string(),
                };
                if !record.silent {
                    self.reporter.statement_failed(direction, key, &err);
                }
                tracing::warn!(object = %key, "statement failed: {}", e);
            }
        }
        if !failed {
            self.reporter.applied(direction, key, &qualified);
        }

        self.registry.set_status(key, Status::Done);
        Ok(())
    }

    /// Predicate conditions take precedence over the query-based kind.
    /// Query polarity inverts between directions: create proceeds when the
    /// query returns no rows, drop proceeds when it returns at least one.
    async fn condition_met(
        &self,
        direction: Direction,
        record: &ObjectRecord,
        ctx: &TemplateContext<'_>,
    ) -> Result<bool> {
        let predicates = match direction {
            Direction::Create => &record.create_condition_expr,
            Direction::Drop => &record.drop_condition_expr,
        };
        if !predicates.is_empty() {
            for expr in predicates {
                if !eval_predicate(&expand(expr, ctx))? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }

        if !record.condition.is_empty() {
            let query = expand(&record.condition.join("\n"), ctx);
            let rows = self.db.query_row_count(&query).await.map_err(|e| {
                DeployError::ConditionEvaluation {
                    object: record.key().to_string(),
                    message: e.to_string(),
                }
            })?;
            return Ok(match direction {
                Direction::Create => rows == 0,
                Direction::Drop => rows > 0,
            });
        }

        Ok(true)
    }
}

/// Split a `!require` token into a key: an optional type prefix before the
/// first `/`, otherwise the requiring record's own type.
pub(crate) fn resolve_reference(token: &str, current_type: &str) -> ObjectKey {
    match token.split_once('/') {
        Some((object_type, name)) => ObjectKey::new(object_type, name),
        None => ObjectKey::new(current_type, token),
    }
}

fn render_statement(
    direction: Direction,
    record: &ObjectRecord,
    qualified: &str,
    ctx: &TemplateContext<'_>,
) -> String {
    if record.vanilla {
        return expand(&record.body, ctx);
    }
    let overrides = match direction {
        Direction::Create => &record.create_sql,
        Direction::Drop => &record.drop_sql,
    };
    if !overrides.is_empty() {
        return overrides
            .iter()
            .map(|s| expand(s, ctx))
            .collect::<Vec<_>>()
            .join("\n");
    }
    match direction {
        Direction::Create => synthesize_create(&record.object_type, qualified, &record.body),
        Direction::Drop => synthesize_drop(&record.object_type, qualified),
    }
}
