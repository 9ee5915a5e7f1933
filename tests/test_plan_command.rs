mod common;

use common::{init_test_tracing, TestEnvironment};
use dbdeploy::commands::execute_plan;
use indoc::indoc;
use std::fs;

#[test]
fn test_plan_across_object_types() {
    init_test_tracing();
    let env = TestEnvironment::new();

    env.write_object(
        "view",
        "order_totals",
        indoc! {"
            --!require function/order_sum table/orders
            AS SELECT order_sum(id) FROM orders
        "},
    );
    env.write_object(
        "function",
        "order_sum",
        indoc! {"
            --!require table/orders
            RETURNS int AS $$ SELECT 1 $$ LANGUAGE sql
        "},
    );
    env.write_object("table", "orders", "(id int PRIMARY KEY)");

    let result = execute_plan(&env.objects_dir, None).unwrap();
    assert_eq!(result.objects_registered, 3);
    assert_eq!(result.edges, 3);

    let order: Vec<String> = result
        .creation_order
        .iter()
        .map(|k| k.to_string())
        .collect();
    let pos = |k: &str| order.iter().position(|x| x == k).unwrap();
    assert!(pos("TABLE orders") < pos("FUNCTION order_sum"));
    assert!(pos("TABLE orders") < pos("VIEW order_totals"));
    assert!(pos("FUNCTION order_sum") < pos("VIEW order_totals"));
}

#[test]
fn test_plan_dot_output_lists_edges() {
    init_test_tracing();
    let env = TestEnvironment::new();

    env.write_object(
        "view",
        "child",
        indoc! {"
            --!require parent
            AS SELECT * FROM parent_v
        "},
    );
    env.write_object("view", "parent", "AS SELECT 1");

    let dot_path = env.temp_dir.path().join("requires.dot");
    let result = execute_plan(&env.objects_dir, Some(dot_path.clone())).unwrap();
    assert_eq!(result.graph_written, Some(dot_path.clone()));

    let dot = fs::read_to_string(&dot_path).unwrap();
    assert!(dot.contains("digraph requires"));
    assert!(dot.contains("VIEW parent"));
    assert!(dot.contains("VIEW child"));
    // The edge points from the requirement to its dependent.
    assert!(dot.contains("->"));
}
