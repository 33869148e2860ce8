use std::path::Path;

use anyhow::Context;
use asfscope::{container::ContainerHeader, File};

/// Map a container and parse its header.
pub fn load_container(path: &Path) -> anyhow::Result<(File, ContainerHeader)> {
    let file = File::from_file(path)
        .with_context(|| format!("failed to open container: {}", path.display()))?;
    let header = ContainerHeader::parse(file.data())
        .with_context(|| format!("failed to parse container: {}", path.display()))?;
    Ok((file, header))
}
