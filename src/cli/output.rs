use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use super::OutputOptions;

impl OutputOptions {
    /// Open the output file, or stdout when none was given
    pub fn writer(&self) -> Result<Box<dyn Write>> {
        match &self.path {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(io::stdout().lock())),
        }
    }

    /// Write `value` as pretty JSON
    pub fn write_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let mut writer = self.writer()?;
        serde_json::to_writer_pretty(&mut writer, value).context("Failed to write JSON")?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write CSV through one of the library's export functions
    pub fn write_csv<F>(&self, export: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Write) -> Result<(), mzxtract::export::ExportError>,
    {
        let mut writer = self.writer()?;
        export(&mut *writer).context("Failed to write CSV")?;
        writer.flush()?;
        Ok(())
    }
}
