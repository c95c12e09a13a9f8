use std::fmt::{self, Write};

const INDENT: usize = 4;

/// Line-oriented source buffer that tracks block indentation.
#[derive(Debug, Default)]
pub(crate) struct CodeWriter {
    buf: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current depth.
    pub fn line(&mut self, text: impl fmt::Display) -> fmt::Result {
        writeln!(self.buf, "{:width$}{text}", "", width = self.depth * INDENT)
    }

    pub fn blank(&mut self) -> fmt::Result {
        writeln!(self.buf)
    }

    /// Write `text` as `///` doc lines. Nothing for `None`.
    pub fn doc(&mut self, text: Option<&str>) -> fmt::Result {
        let Some(text) = text else {
            return Ok(());
        };
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.line("///")?;
            } else {
                self.line(format_args!("/// {line}"))?;
            }
        }
        Ok(())
    }

    /// Write `header {` and indent the following lines.
    pub fn open(&mut self, header: impl fmt::Display) -> fmt::Result {
        self.line(format_args!("{header} {{"))?;
        self.depth += 1;
        Ok(())
    }

    pub fn close(&mut self) -> fmt::Result {
        self.depth = self.depth.saturating_sub(1);
        self.line("}")
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
