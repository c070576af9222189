//! Reads source files into an owned, size-checked buffer.
//!
//! Input larger than the limit is rejected outright, never truncated.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use snafu::{ensure, ResultExt};

use crate::compiler::error::{CompileResult, ReadSourceSnafu, SourceTooLargeSnafu};

/// Default cap on source size, in bytes.
pub const DEFAULT_MAX_SOURCE_LEN: usize = 4095;

pub fn read_source<P: AsRef<Path>>(path: P, limit: usize) -> CompileResult<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path).context(ReadSourceSnafu { path })?;
    read_bounded(file, path, limit)
}

/// Reads all of `reader`, failing if it yields more than `limit` bytes.
/// `path` is only used for error reporting.
pub fn read_bounded<R: Read>(reader: R, path: &Path, limit: usize) -> CompileResult<Vec<u8>> {
    let mut buffer = Vec::new();
    // One byte past the limit is enough to tell an oversized input apart.
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut buffer)
        .context(ReadSourceSnafu { path })?;

    ensure!(buffer.len() <= limit, SourceTooLargeSnafu { path, limit });

    debug!("read {} byte(s) from `{}`", buffer.len(), path.display());
    Ok(buffer)
}
