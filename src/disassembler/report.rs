use std::{fmt, io::Write};

use crate::Result;

/// The text dump of one module, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisassemblyReport {
    lines: Vec<String>,
}

impl DisassemblyReport {
    pub(crate) fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// The report lines, without terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the report has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write every line, each followed by `\n`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for DisassemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
