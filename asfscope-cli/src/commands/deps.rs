use std::{collections::HashSet, path::Path};

use asfscope::tracker::{DependencyGraph, DirectorySource, NodeStatus};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{print_list, print_output},
};

#[derive(Debug, Serialize)]
struct NodeOutput {
    name: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
    code_size: u32,
    dependencies: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DepsOutput {
    root: String,
    modules: Vec<NodeOutput>,
    cycles: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_order: Option<Vec<String>>,
}

impl DepsOutput {
    fn problems(&self) -> usize {
        self.cycles.len() + self.modules.iter().filter(|m| m.problem.is_some()).count()
    }
}

pub fn run(root: &Path, module: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let graph = DependencyGraph::discover(&DirectorySource::new(root), module);

    let modules = graph
        .nodes()
        .iter()
        .map(|node| {
            let (status, problem) = match &node.status {
                NodeStatus::Parsed => ("parsed", None),
                NodeStatus::Missing(reason) => ("missing", Some(reason.clone())),
                NodeStatus::Malformed(reason) => ("malformed", Some(reason.clone())),
            };
            NodeOutput {
                name: node.name.clone(),
                status,
                problem,
                code_size: node.code_size,
                dependencies: node.dependencies.clone(),
            }
        })
        .collect();

    let output = DepsOutput {
        root: module.to_string(),
        modules,
        cycles: graph.find_cycles(),
        load_order: graph
            .load_order()
            .map(|order| order.into_iter().map(str::to_string).collect()),
    };

    print_output(&output, opts, |out| {
        println!("Dependency tree:");
        print_tree(&graph, module, 1, &mut HashSet::new());
        println!();

        print_list(
            "Problems",
            out.modules.iter().filter_map(|m| {
                m.problem
                    .as_ref()
                    .map(|p| format!("{} ({}): {}", m.name, m.status, p))
            }),
        );
        print_list("Cycles", out.cycles.iter().map(|c| c.join(" -> ")));
        match &out.load_order {
            Some(order) => print_list("Load order", order),
            None => println!("Load order: unavailable"),
        }
    })?;

    match output.problems() {
        0 => Ok(()),
        count => anyhow::bail!("{count} problem(s) in the dependency tree of {module}"),
    }
}

fn print_tree<'a>(
    graph: &'a DependencyGraph,
    name: &'a str,
    depth: usize,
    path: &mut HashSet<&'a str>,
) {
    let indent = "  ".repeat(depth);
    let Some(node) = graph.node(name) else {
        return;
    };

    let marker = match &node.status {
        NodeStatus::Parsed => String::new(),
        NodeStatus::Missing(_) => " [missing]".to_string(),
        NodeStatus::Malformed(_) => " [malformed]".to_string(),
    };
    if !path.insert(name) {
        println!("{indent}{name} [cycle]");
        return;
    }
    println!("{indent}{name}{marker}");

    for dependency in &node.dependencies {
        print_tree(graph, dependency, depth + 1, path);
    }
    path.remove(name);
}
