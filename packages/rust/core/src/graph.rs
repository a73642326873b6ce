//! The fixed workflow topology and its Mermaid rendering.

use std::fmt::Write as _;
use std::path::Path;

use cityscout_shared::{CityScoutError, Result, Step};

/// Default location of the exported diagram, relative to the working directory.
pub const DEFAULT_DIAGRAM_PATH: &str = "graph_visualization/graph.mmd";

/// A directed edge. `condition` labels the branch edges out of the route check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: Step,
    pub to: Step,
    pub condition: Option<&'static str>,
}

const fn edge(from: Step, to: Step) -> Edge {
    Edge {
        from,
        to,
        condition: None,
    }
}

/// Every edge of the workflow graph.
pub static EDGES: [Edge; 7] = [
    edge(Step::Start, Step::RouteCheck),
    Edge {
        from: Step::RouteCheck,
        to: Step::KnowledgeLocal,
        condition: Some("in knowledge base"),
    },
    Edge {
        from: Step::RouteCheck,
        to: Step::KnowledgeRemote,
        condition: Some("not in knowledge base"),
    },
    edge(Step::KnowledgeLocal, Step::Weather),
    edge(Step::KnowledgeRemote, Step::Weather),
    edge(Step::Weather, Step::Images),
    edge(Step::Images, Step::End),
];

/// Successors of `step`.
pub fn successors(step: Step) -> impl Iterator<Item = Step> {
    EDGES.iter().filter(move |e| e.from == step).map(|e| e.to)
}

/// Mermaid node id. Upper-cased since a lowercase `end` is a Mermaid keyword.
fn node_id(step: Step) -> String {
    step.as_str().to_uppercase()
}

/// Render the topology as a Mermaid flowchart.
pub fn to_mermaid() -> String {
    let mut out = String::from("flowchart TD\n");
    for step in Step::ALL {
        let id = node_id(step);
        let line = match step {
            Step::Start | Step::End => format!("    {id}([{}])\n", step.label()),
            Step::RouteCheck => format!("    {id}{{{}}}\n", step.label()),
            _ => format!("    {id}[{}]\n", step.label()),
        };
        out.push_str(&line);
    }
    for e in &EDGES {
        let (from, to) = (node_id(e.from), node_id(e.to));
        // Writing into a String cannot fail.
        let _ = match e.condition {
            Some(label) => writeln!(out, "    {from} -->|{label}| {to}"),
            None => writeln!(out, "    {from} --> {to}"),
        };
    }
    out
}

/// Write the Mermaid diagram to `path`, creating parent directories.
pub fn export_diagram(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CityScoutError::io(parent, e))?;
    }
    std::fs::write(path, to_mermaid()).map_err(|e| CityScoutError::io(path, e))?;
    tracing::info!(?path, "workflow diagram written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_check_is_the_only_branch() {
        for step in Step::ALL {
            let out: Vec<_> = successors(step).collect();
            match step {
                Step::RouteCheck => {
                    assert_eq!(out, [Step::KnowledgeLocal, Step::KnowledgeRemote])
                }
                Step::End => assert!(out.is_empty()),
                _ => assert_eq!(out.len(), 1, "{step} should have one successor"),
            }
        }
    }

    #[test]
    fn both_knowledge_steps_merge_into_weather() {
        assert_eq!(successors(Step::KnowledgeLocal).collect::<Vec<_>>(), [Step::Weather]);
        assert_eq!(successors(Step::KnowledgeRemote).collect::<Vec<_>>(), [Step::Weather]);
    }

    #[test]
    fn mermaid_contains_every_node_and_edge() {
        let diagram = to_mermaid();
        assert!(diagram.starts_with("flowchart TD"));
        for step in Step::ALL {
            assert!(diagram.contains(&node_id(step)));
        }
        assert!(diagram.contains("ROUTE_CHECK -->|in knowledge base| KNOWLEDGE_LOCAL"));
        assert!(diagram.contains("IMAGES --> END"));
        assert!(diagram.contains("ROUTE_CHECK{Checking knowledge base}"));
    }

    #[test]
    fn export_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph_visualization").join("graph.mmd");
        export_diagram(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, to_mermaid());
    }
}
