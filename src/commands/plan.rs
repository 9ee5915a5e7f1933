use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeployError, Result};
use crate::graph::RequiresGraph;
use crate::registry::{ObjectKey, Registry};
use crate::scanner::scan_into_registry;

#[derive(Debug)]
pub struct PlanResult {
    pub objects_registered: usize,
    pub edges: usize,
    /// Topological apply order, requirements first.
    pub creation_order: Vec<ObjectKey>,
    pub graph_written: Option<PathBuf>,
}

/// Build the `!require` graph from the objects directory without touching
/// a database. Optionally writes the graph in DOT format.
pub fn execute_plan(objects_dir: &Path, output_graph: Option<PathBuf>) -> Result<PlanResult> {
    let mut registry = Registry::new();
    let objects_registered = scan_into_registry(objects_dir, &mut registry)?;

    let graph = RequiresGraph::from_registry(&registry)?;
    let creation_order = graph.creation_order()?;

    let graph_written = match output_graph {
        Some(path) => {
            fs::write(&path, graph.to_dot()).map_err(|e| DeployError::FileWrite {
                path: path.clone(),
                message: e.to_string(),
                source: e,
            })?;
            tracing::info!("wrote dependency graph to {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(PlanResult {
        objects_registered,
        edges: graph.edge_count(),
        creation_order,
        graph_written,
    })
}

#[cfg(feature = "cli")]
pub fn print_plan_summary(result: &PlanResult) {
    use owo_colors::OwoColorize;

    println!(
        "\n{} {} {} ({} dependency edges)",
        "Planned".blue().bold(),
        result.objects_registered.to_string().yellow(),
        "objects".blue().bold(),
        result.edges
    );
    for (i, key) in result.creation_order.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, key.to_string().cyan());
    }
    if let Some(path) = &result.graph_written {
        println!("  graph written to {}", path.display().to_string().cyan());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_plan_orders_requirements_first() {
        let temp_dir = tempdir().unwrap();
        let views = temp_dir.path().join("views");
        fs::create_dir(&views).unwrap();
        fs::write(
            views.join("orders.sql"),
            "--!require customers\nAS SELECT * FROM customers",
        )
        .unwrap();
        fs::write(views.join("customers.sql"), "AS SELECT 1").unwrap();

        let result = execute_plan(temp_dir.path(), None).unwrap();
        assert_eq!(result.objects_registered, 2);
        assert_eq!(result.edges, 1);

        let names: Vec<&str> = result
            .creation_order
            .iter()
            .map(|k| k.name.as_str())
            .collect();
        let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
        assert!(pos("customers") < pos("orders"));
    }

    #[test]
    fn test_plan_writes_dot_file() {
        let temp_dir = tempdir().unwrap();
        let views = temp_dir.path().join("views");
        fs::create_dir(&views).unwrap();
        fs::write(views.join("v.sql"), "AS SELECT 1").unwrap();

        let dot_path = temp_dir.path().join("graph.dot");
        let result = execute_plan(temp_dir.path(), Some(dot_path.clone())).unwrap();
        assert_eq!(result.graph_written, Some(dot_path.clone()));

        let dot = fs::read_to_string(&dot_path).unwrap();
        assert!(dot.contains("digraph requires"));
        assert!(dot.contains("VIEWS v"));
    }

    #[test]
    fn test_plan_rejects_cycles() {
        let temp_dir = tempdir().unwrap();
        let views = temp_dir.path().join("views");
        fs::create_dir(&views).unwrap();
        fs::write(views.join("a.sql"), "--!require b\nAS SELECT 1").unwrap();
        fs::write(views.join("b.sql"), "--!require a\nAS SELECT 1").unwrap();

        assert!(matches!(
            execute_plan(temp_dir.path(), None),
            Err(DeployError::CircularReference { .. })
        ));
    }
}
