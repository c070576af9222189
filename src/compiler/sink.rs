//! Append-only destinations for emitted assembly.
use std::io::{self, Write};

/// Anything that accepts assembly one line at a time.
/// Lines must appear in the order `emit` was called.
pub trait AsmSink {
    fn emit(&mut self, line: &str) -> io::Result<()>;
}

/// Collects lines in memory.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Listing {
    lines: Vec<String>,
}

impl Listing {
    pub fn new() -> Self {
        Listing::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Joins every line, each terminated by a newline.
    pub fn into_string(self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in self.lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

impl AsmSink for Listing {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_owned());
        Ok(())
    }
}

/// Writes each line straight through to an `io::Write`.
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        WriterSink { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> AsmSink for WriterSink<W> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.inner, "{}", line)
    }
}

/// Copies every line into `listing` on its way to `inner`.
pub struct Tee<'a, S: AsmSink + ?Sized> {
    inner: &'a mut S,
    listing: &'a mut Listing,
}

impl<'a, S: AsmSink + ?Sized> Tee<'a, S> {
    pub fn new(inner: &'a mut S, listing: &'a mut Listing) -> Self {
        Tee { inner, listing }
    }
}

impl<'a, S: AsmSink + ?Sized> AsmSink for Tee<'a, S> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        self.inner.emit(line)?;
        self.listing.emit(line)
    }
}
