use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_container,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct HeaderOutput {
    path: String,
    file_size: usize,
    code_offset: u32,
    code_size: u32,
    table_end: usize,
    dependencies: Vec<String>,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let (file, header) = load_container(path)?;

    let output = HeaderOutput {
        path: path.display().to_string(),
        file_size: file.len(),
        code_offset: header.code_offset,
        code_size: header.code_size,
        table_end: header.table_end(),
        dependencies: header.dependencies.clone(),
    };

    print_output(&output, opts, |out| {
        println!("Container:    {}", out.path);
        println!("File size:    {} bytes", out.file_size);
        println!("Code offset:  0x{:08x}", out.code_offset);
        println!("Code size:    {} bytes", out.code_size);
        println!("Table end:    0x{:08x}", out.table_end);

        if out.dependencies.is_empty() {
            println!("Dependencies: none");
            return;
        }
        println!("\nDependencies ({}):", out.dependencies.len());
        let mut tw = TabWriter::new(&[("#", Align::Right), ("Name", Align::Left)]).indent("  ");
        for (index, name) in out.dependencies.iter().enumerate() {
            tw.row(vec![index.to_string(), name.clone()]);
        }
        tw.print();
    })
}
