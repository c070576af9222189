//! The Compiler module is in charge of taking krisp
//! source and producing NASM x86-64 assembly.
//!
//! It does this with a lazy scanner, a recursive descent parser
//! that builds a small form tree, and an emitter that walks that
//! tree against a single accumulator register.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod sink;

pub use error::{CompileError, CompileResult};

use snafu::ResultExt;

use codegen::Emitter;
use error::EmitSnafu;
use sink::{AsmSink, Listing, Tee};

/// Compiles `source` into a complete program written to `sink`:
/// prologue, the program's own instructions, then the epilogue.
///
/// Parsing finishes before anything is written, so a malformed program
/// leaves `sink` untouched. Returns a copy of just the program's own
/// instructions.
pub fn compile<S: AsmSink + ?Sized>(source: &[u8], sink: &mut S) -> CompileResult<Listing> {
    let program = parser::parse(source)?;

    let mut core = Listing::new();
    Emitter::new(&mut *sink).emit_prologue().context(EmitSnafu)?;
    {
        let mut tee = Tee::new(&mut *sink, &mut core);
        Emitter::new(&mut tee).emit_program(&program).context(EmitSnafu)?;
    }
    Emitter::new(sink).emit_epilogue().context(EmitSnafu)?;

    info!("emitted {} instruction line(s)", core.len());
    Ok(core)
}
