mod common;

use common::{deployer, init_test_tracing, TestEnvironment};
use dbdeploy::db::test_utils::MockDatabase;
use dbdeploy::error::{format_error_chain, suggest_fix, DeployError};
use dbdeploy::report::CollectingReporter;
use dbdeploy::scanner::scan_objects;
use indoc::indoc;
use std::path::Path;

#[tokio::test]
async fn test_missing_requirement_names_both_sides() {
    init_test_tracing();
    let env = TestEnvironment::new();

    env.write_object(
        "view",
        "orphan",
        indoc! {"
            --!require function/no_such_fn
            AS SELECT 1
        "},
    );

    let mut registry = env.registry();
    let db = MockDatabase::new();
    let reporter = CollectingReporter::new();
    let err = deployer(&mut registry, &db, &reporter)
        .create_all()
        .await
        .unwrap_err();

    match &err {
        DeployError::MissingDependency { object, dependency } => {
            assert_eq!(object, "VIEW orphan");
            assert_eq!(dependency, "FUNCTION no_such_fn");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let suggestion = suggest_fix(&err).unwrap();
    assert!(suggestion.contains("FUNCTION no_such_fn"));
    assert_eq!(db.executed_count(), 0);
}

#[tokio::test]
async fn test_require_cycle_across_files_is_fatal() {
    init_test_tracing();
    let env = TestEnvironment::new();

    env.write_object(
        "view",
        "alpha",
        indoc! {"
            --!require beta
            AS SELECT * FROM beta_v
        "},
    );
    env.write_object(
        "view",
        "beta",
        indoc! {"
            --!require alpha
            AS SELECT * FROM alpha_v
        "},
    );

    let mut registry = env.registry();
    let db = MockDatabase::new();
    let reporter = CollectingReporter::new();
    let err = deployer(&mut registry, &db, &reporter)
        .create_all()
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::CircularReference { .. }));
    // Nothing in the cycle's subtree executed.
    assert_eq!(db.executed_count(), 0);
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn test_malformed_predicate_is_fatal() {
    init_test_tracing();
    let env = TestEnvironment::new();

    env.write_object(
        "view",
        "broken_gate",
        indoc! {"
            --!createcondition == dangling
            AS SELECT 1
        "},
    );

    let mut registry = env.registry();
    let db = MockDatabase::new();
    let reporter = CollectingReporter::new();
    let err = deployer(&mut registry, &db, &reporter)
        .create_all()
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::ConditionSyntax { .. }));
    assert!(suggest_fix(&err).unwrap().contains("=="));
    assert_eq!(db.executed_count(), 0);
}

#[test]
fn test_scan_of_missing_directory() {
    init_test_tracing();

    let err = scan_objects(Path::new("/nonexistent/db/objects")).unwrap_err();
    assert!(matches!(err, DeployError::DirectoryNotFound(_)));

    let chain = format_error_chain(&err);
    assert!(chain.starts_with("Error: "));
    assert!(chain.contains("/nonexistent/db/objects"));
    assert!(suggest_fix(&err).unwrap().contains("objects_dir"));
}

#[tokio::test]
async fn test_statement_failure_does_not_abort_run() {
    init_test_tracing();
    let env = TestEnvironment::new();

    env.write_object(
        "trigger",
        "audit_rows",
        "AFTER INSERT ON missing_table EXECUTE FUNCTION audit()",
    );
    env.write_object("view", "ok", "AS SELECT 1");

    let mut registry = env.registry();
    let db = MockDatabase::new();
    db.fail_on("missing_table");
    let reporter = CollectingReporter::new();

    // The failing trigger is reported, the run still returns Ok.
    deployer(&mut registry, &db, &reporter)
        .create_all()
        .await
        .unwrap();
    assert_eq!(db.executed_count(), 1);
}
