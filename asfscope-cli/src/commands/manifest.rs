use std::path::Path;

use anyhow::Context;
use asfscope::{bytecode::PointerWidth, engine::MemoryEngine, host::HostManifest};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct ManifestOutput {
    path: String,
    sections: Vec<(&'static str, usize)>,
    registrations: usize,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let manifest = HostManifest::from_file(path)
        .with_context(|| format!("failed to load manifest: {}", path.display()))?;

    // Registering into a scratch engine catches duplicate declarations.
    let mut engine = MemoryEngine::new(PointerWidth::Bits64);
    let registrations = manifest
        .apply(&mut engine)
        .with_context(|| format!("manifest does not register cleanly: {}", path.display()))?;

    let output = ManifestOutput {
        path: path.display().to_string(),
        sections: vec![
            ("namespaces", manifest.namespaces.len()),
            ("enums", manifest.enums.len()),
            ("object_types", manifest.object_types.len()),
            ("object_properties", manifest.object_properties.len()),
            ("object_behaviours", manifest.object_behaviours.len()),
            ("object_methods", manifest.object_methods.len()),
            ("global_functions", manifest.global_functions.len()),
            ("global_properties", manifest.global_properties.len()),
        ],
        registrations,
    };

    print_output(&output, opts, |out| {
        println!("Manifest:      {}", out.path);
        println!("Registrations: {}", out.registrations);
        println!();
        let mut tw = TabWriter::new(&[("Section", Align::Left), ("Entries", Align::Right)]);
        for (section, count) in &out.sections {
            tw.row(vec![(*section).to_string(), count.to_string()]);
        }
        tw.print();
    })
}
