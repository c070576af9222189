//! krisp compiles parenthesized arithmetic forms to x86-64 NASM assembly.
//!
//! - `compiler` holds the scanner, parser, emitter and assembly sinks.
//! - `source` reads input files under a hard size limit.
//! - `toolchain` hands emitted assembly to `nasm` and `ld`.
//! - `simulator` is the quick diagnostic mode that bypasses the compiler.

#[macro_use] extern crate log;
extern crate regex;
extern crate snafu;

pub mod compiler;
pub mod simulator;
pub mod source;
pub mod toolchain;

pub use compiler::{compile, CompileError, CompileResult};
