//! Module disassembly.
//!
//! [`Disassembler`] turns a module the engine has loaded into a [`DisassemblyReport`]. The report
//! lists, in this order and each behind a count header that is always present:
//!
//! ```text
//! enums: N
//! typedefs: N
//! object_types: N
//! global_variables: N
//! imported_functions: N
//! functions: N
//! ```
//!
//! Each function is followed by its decoded instructions as `\t\tHHHH: text`, where `HHHH` is
//! the word position inside the function.
//!
//! # Example
//! ```rust
//! use asfscope::bytecode::{Opcode, PointerWidth};
//! use asfscope::disassembler::Disassembler;
//! use asfscope::engine::{FunctionInfo, MemoryEngine, ModuleInfo, ScriptEngine};
//!
//! let code = vec![u32::from(Opcode::RET.value())];
//! let mut engine = MemoryEngine::new(PointerWidth::Bits32).with_image(
//!     "main",
//!     ModuleInfo {
//!         functions: vec![FunctionInfo::new("void main()", code)],
//!         ..Default::default()
//!     },
//! );
//! let handle = engine.load_precompiled("main", &[])?;
//!
//! let report = Disassembler::new(&engine)?.render(handle)?;
//! assert_eq!(report.lines().last().unwrap(), "\t\t0000: RET 0");
//! # Ok::<(), asfscope::Error>(())
//! ```

mod report;

pub use report::DisassemblyReport;

use crate::{
    bytecode::{decode_function, DecodeOptions},
    engine::{ModuleHandle, ModuleInfo, ScriptEngine},
    Error, Result,
};

/// Renders loaded modules through an engine.
pub struct Disassembler<'a, E: ScriptEngine> {
    engine: &'a E,
    options: DecodeOptions,
}

impl<'a, E: ScriptEngine> Disassembler<'a, E> {
    /// Prepare a disassembler for modules loaded by `engine`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OpcodeTable`] if the engine's opcode table is incomplete or
    /// contradicts the reinterpretation rules.
    pub fn new(engine: &'a E) -> Result<Self> {
        engine.opcode_table().validate()?;
        Ok(Disassembler {
            engine,
            options: DecodeOptions::default(),
        })
    }

    /// Replace the decode options.
    #[must_use]
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Dump the module behind `handle`.
    ///
    /// # Errors
    /// - [`crate::Error::UnknownModule`] if the engine does not own `handle`
    /// - [`crate::Error::UnknownInstructionShape`] or [`crate::Error::Malformed`] if a function
    ///   body cannot be decoded; the whole dump is abandoned
    pub fn render(&self, handle: ModuleHandle) -> Result<DisassemblyReport> {
        let info = self
            .engine
            .module_info(handle)
            .ok_or(Error::UnknownModule(handle))?;

        let mut report = DisassemblyReport::default();
        Self::declarations(info, &mut report);

        report.push(format!("functions: {}", info.functions.len()));
        for function in &info.functions {
            report.push(format!("\t{}", function.declaration));
            let lines = decode_function(
                &function.bytecode,
                self.engine.opcode_table(),
                self.engine,
                &self.options,
            )?;
            for (position, text) in lines {
                report.push(format!("\t\t{position:04x}: {text}"));
            }
        }

        Ok(report)
    }

    fn declarations(info: &ModuleInfo, report: &mut DisassemblyReport) {
        report.push(format!("enums: {}", info.enums.len()));
        for entry in &info.enums {
            report.push(match &entry.type_name {
                Some(type_name) => format!("\t{} : {type_name}", entry.name),
                None => format!("\t{}", entry.name),
            });
            for value in &entry.values {
                report.push(format!("\t\t{} = {},", value.name, value.value));
            }
        }

        report.push(format!("typedefs: {}", info.typedefs.len()));
        for typedef in &info.typedefs {
            report.push(format!("\t{} {}", typedef.name, typedef.type_id));
        }

        report.push(format!("object_types: {}", info.object_types.len()));
        for object in &info.object_types {
            report.push(format!(
                "\t{} {} {:08x}",
                object.name,
                object.size,
                object.flags.bits()
            ));
            report.push(format!("\t\tproperties: {}", object.properties.len()));
            for property in &object.properties {
                report.push(format!("\t\t\t{property}"));
            }
        }

        report.push(format!("global_variables: {}", info.globals.len()));
        for global in &info.globals {
            report.push(format!("\t{global}"));
        }

        report.push(format!("imported_functions: {}", info.imports.len()));
        for import in &info.imports {
            report.push(format!("\t{} {}", import.declaration, import.source_module));
        }
    }
}
