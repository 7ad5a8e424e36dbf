//! Writers for extracted window slots.

use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::WindowSlot;

/// Columns written before the corpus columns, in order.
pub const FIXED_COLUMNS: [&str; 10] = [
    "target_lemma",
    "token_id",
    "distance",
    "side",
    "position",
    "cw",
    "same_sentence",
    "steps",
    "path",
    "rep_path",
];

/// Output format for window slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One JSON object per line.
    JsonLines,
    /// Tab-separated values with a header row.
    Tsv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "json_lines" | "json-lines" | "ndjson" => Ok(Self::JsonLines),
            "tsv" => Ok(Self::Tsv),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Streams window slots to any writer.
pub struct SlotWriter<W: Write> {
    inner: W,
    format: OutputFormat,
    columns: Vec<String>,
    header_written: bool,
}

impl<W: Write> SlotWriter<W> {
    /// Create a writer; `columns` are the corpus columns, in output order.
    pub fn new(inner: W, format: OutputFormat, columns: Vec<String>) -> Self {
        Self {
            inner,
            format,
            columns,
            header_written: false,
        }
    }

    /// Write one slot.
    pub fn write_slot(&mut self, slot: &WindowSlot) -> io::Result<()> {
        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.inner, slot)?;
                self.inner.write_all(b"\n")
            }
            OutputFormat::Tsv => {
                if !self.header_written {
                    self.write_header()?;
                }
                let row = self.tsv_row(slot);
                writeln!(self.inner, "{}", row.join("\t"))
            }
        }
    }

    /// Write every slot, returning how many were written.
    pub fn write_all<'a>(
        &mut self,
        slots: impl IntoIterator<Item = &'a WindowSlot>,
    ) -> io::Result<usize> {
        let mut count = 0;
        for slot in slots {
            self.write_slot(slot)?;
            count += 1;
        }
        if count == 0 && self.format == OutputFormat::Tsv && !self.header_written {
            self.write_header()?;
        }
        Ok(count)
    }

    /// Flush and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_header(&mut self) -> io::Result<()> {
        let header: Vec<&str> = FIXED_COLUMNS
            .iter()
            .copied()
            .chain(self.columns.iter().map(String::as_str))
            .collect();
        writeln!(self.inner, "{}", header.join("\t"))?;
        self.header_written = true;
        Ok(())
    }

    fn tsv_row(&self, slot: &WindowSlot) -> Vec<String> {
        let dependency = slot.dependency.as_ref();
        let mut row = vec![
            slot.target_lemma.clone(),
            slot.token_id.clone(),
            slot.distance.to_string(),
            slot.side.to_string(),
            slot.position.clone(),
            slot.cw.clone().unwrap_or_default(),
            slot.same_sentence.to_string(),
            dependency.map(|d| d.steps.to_string()).unwrap_or_default(),
            dependency.map(|d| d.path.clone()).unwrap_or_default(),
            dependency.map(|d| d.rep_path.clone()).unwrap_or_default(),
        ];
        row.extend(
            self.columns
                .iter()
                .map(|c| slot.fields.get(c).cloned().unwrap_or_default()),
        );
        row.into_iter().map(|cell| escape_cell(&cell)).collect()
    }
}

/// Tabs and line breaks would break the row structure.
fn escape_cell(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}
