use std::path::Path;

use anyhow::Context;
use asfscope::container::ContainerBuilder;
use log::warn;
use serde::Serialize;

use crate::{app::GlobalOptions, output::print_output};

#[derive(Debug, Serialize)]
struct PackOutput {
    output: String,
    code_size: usize,
    container_size: usize,
    dependencies: Vec<String>,
}

pub fn run(
    code: &Path,
    dependencies: &[String],
    output: &Path,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let segment = std::fs::read(code)
        .with_context(|| format!("failed to read code segment: {}", code.display()))?;

    for name in dependencies {
        if ContainerBuilder::truncate_name(name).len() != name.len() {
            warn!(
                "Dependency name '{}' exceeds {} bytes and will be truncated",
                name,
                ContainerBuilder::MAX_NAME_LEN
            );
        }
    }

    let code_size = segment.len();
    let bytes = ContainerBuilder::new()
        .dependencies(dependencies.iter().cloned())
        .code(segment)
        .build()
        .context("failed to build container")?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("failed to write container: {}", output.display()))?;

    let result = PackOutput {
        output: output.display().to_string(),
        code_size,
        container_size: bytes.len(),
        dependencies: dependencies
            .iter()
            .map(|n| ContainerBuilder::truncate_name(n).to_string())
            .collect(),
    };

    print_output(&result, opts, |out| {
        println!(
            "Wrote {} ({} bytes, {} bytes of code, {} dependencies)",
            out.output,
            out.container_size,
            out.code_size,
            out.dependencies.len()
        );
    })
}
