//! Errors shared by every stage of the compiler.
//!
//! Syntax errors carry a 1-based line and column so they can be reported
//! the way an assembler would: `line:column: message`.
use snafu::Snafu;
use std::io;
use std::path::PathBuf;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CompileError {
    #[snafu(display("unable to read input file `{}`: {}", path.display(), source))]
    ReadSource { path: PathBuf, source: io::Error },

    #[snafu(display("input too large: `{}` exceeds the {} byte limit", path.display(), limit))]
    SourceTooLarge { path: PathBuf, limit: usize },

    #[snafu(display("unable to write output file `{}`: {}", path.display(), source))]
    WriteOutput { path: PathBuf, source: io::Error },

    #[snafu(display("unable to emit assembly: {}", source))]
    Emit { source: io::Error },

    #[snafu(display("unable to run `{}`: {}", program, source))]
    SpawnTool { program: String, source: io::Error },

    #[snafu(display("`{}` exited with {}", program, status))]
    ToolFailed { program: String, status: std::process::ExitStatus },

    #[snafu(display("{}: unexpected `{}`", at, found))]
    UnexpectedToken { at: Location, found: String },

    #[snafu(display("{}: unknown identifier `{}`", at, name))]
    UnknownIdentifier { at: Location, name: String },

    #[snafu(display("{}: `{}` expects at least one numeric literal", at, operator))]
    MissingOperand { at: Location, operator: String },

    #[snafu(display("{}: unmatched `)`", at))]
    UnmatchedClose { at: Location },

    #[snafu(display("{}: unclosed `(`", at))]
    UnclosedGroup { at: Location },

    #[snafu(display("{}: literal `{}` does not fit in 64 bits", at, text))]
    LiteralOutOfRange { at: Location, text: String },

    #[snafu(display("{}: forms nested deeper than {} levels", at, limit))]
    NestingTooDeep { at: Location, limit: usize },
}

impl CompileError {
    /// Source position of a syntax error, if this is one.
    pub fn position(&self) -> Option<Location> {
        use CompileError::*;
        match self {
            UnexpectedToken { at, .. }
            | UnknownIdentifier { at, .. }
            | MissingOperand { at, .. }
            | UnmatchedClose { at }
            | UnclosedGroup { at }
            | LiteralOutOfRange { at, .. }
            | NestingTooDeep { at, .. } => Some(*at),
            _ => None,
        }
    }
}

/// A human readable position in the source, both fields 1-based.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Resolves a byte offset into a line and column.
    /// Offsets past the end clamp to the end of the source.
    pub fn of(source: &[u8], offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match before.iter().rposition(|&b| b == b'\n') {
            Some(newline) => offset - newline,
            None => offset + 1,
        };
        Location { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
