//! Code generation: lower parsed forms into NASM x86-64 assembly.
//!
//! There is exactly one live value at any time, held in the accumulator
//! register. Literals overwrite it, operators accumulate into it and `dump`
//! prints it. No value stack exists.

use super::ast::{Form, Literal, Program};
use super::sink::AsmSink;
use std::io;

/// Prints `rdi` as an unsigned decimal followed by a newline through
/// `write(1, ..)`. Preserves `rdi`; clobbers `rax`, `rcx`, `rdx`, `rsi`,
/// `r8`, `r11` and `xmm0`. Expects the stack 16-byte aligned before `call`.
pub const DUMP_ROUTINE: &[&str] = &[
    ";; dump: print rdi as unsigned decimal",
    "dump:",
    "\tpush    rdi",
    "\tsub     rsp, 32",
    "\tpxor    xmm0, xmm0",
    "\tmov     r8, -3689348814741910323",
    "\tmovaps  [rsp+16], xmm0",
    "\tlea     rcx, [rsp+30]",
    "\tmov     BYTE [rsp+31], 10",
    "\tmovaps  [rsp], xmm0",
    ".L2:",
    "\tmov     rax, rdi",
    "\tmul     r8",
    "\tmov     rax, rdi",
    "\tshr     rdx, 3",
    "\tlea     rsi, [rdx+rdx*4]",
    "\tadd     rsi, rsi",
    "\tsub     rax, rsi",
    "\tmov     rsi, rcx",
    "\tsub     rcx, 1",
    "\tadd     eax, 48",
    "\tmov     [rcx+1], al",
    "\tmov     rax, rdi",
    "\tmov     rdi, rdx",
    "\tcmp     rax, 9",
    "\tja      .L2",
    "\tmov     rax, 1",
    "\tlea     rdx, [rsp+32]",
    "\tmov     edi, 1",
    "\tsub     rdx, rsi",
    "\tsyscall",
    "\tadd     rsp, 32",
    "\tpop     rdi",
    "\tret",
];

pub const ENTRY_LABEL: &str = "_start:";

pub const EPILOGUE: &[&str] = &["\t;; Exit", "\tmov rax, 60", "\txor rdi, rdi", "\tsyscall"];

/// Where the live value is kept.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Accumulator {
    /// Holds the current value; also the dump routine's argument.
    pub register: &'static str,
    /// Staging register for immediates too wide for `add`/`sub`.
    pub scratch: &'static str,
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator { register: "rdi", scratch: "rax" }
    }
}

/// `add`/`sub` only take sign-extended 32-bit immediates.
fn fits_imm32(value: u64) -> bool {
    value <= i32::MAX as u64
}

pub struct Emitter<'s, S: AsmSink + ?Sized> {
    sink: &'s mut S,
    acc: Accumulator,
}

impl<'s, S: AsmSink + ?Sized> Emitter<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        Emitter { sink, acc: Accumulator::default() }
    }

    pub fn accumulator(&self) -> Accumulator {
        self.acc
    }

    /// Section header, the dump routine and the entry label.
    /// The accumulator starts out at zero.
    pub fn emit_prologue(&mut self) -> io::Result<()> {
        self.line("section .text")?;
        self.line("global _start")?;
        for line in DUMP_ROUTINE {
            self.line(line)?;
        }
        self.line(ENTRY_LABEL)?;
        let zero = format!("\txor {}, {}", self.acc.register, self.acc.register);
        self.line(&zero)
    }

    /// Exits the process with status zero.
    pub fn emit_epilogue(&mut self) -> io::Result<()> {
        for line in EPILOGUE {
            self.line(line)?;
        }
        Ok(())
    }

    pub fn emit_program(&mut self, program: &Program) -> io::Result<()> {
        for form in &program.forms {
            self.emit_form(form)?;
        }
        Ok(())
    }

    pub fn emit_form(&mut self, form: &Form) -> io::Result<()> {
        match form {
            Form::Literal(lit) => self.load(lit),
            Form::Group(group) => {
                for form in &group.forms {
                    self.emit_form(form)?;
                }
                Ok(())
            }
            Form::Dump(arg) => {
                // The argument must be resident in the accumulator first.
                self.emit_form(arg)?;
                self.line("\t;; CALL DUMP")?;
                self.line("\tcall dump")
            }
            Form::Add(lits) => {
                self.line("\t;; ADDITION")?;
                for lit in lits {
                    self.accumulate("add", lit)?;
                }
                Ok(())
            }
            Form::Sub { seed, rest } => {
                self.line("\t;; SUBTRACTION")?;
                self.load(seed)?;
                for lit in rest {
                    self.accumulate("sub", lit)?;
                }
                Ok(())
            }
        }
    }

    fn load(&mut self, lit: &Literal) -> io::Result<()> {
        let line = format!("\tmov {}, {}", self.acc.register, lit.value);
        self.line(&line)
    }

    fn accumulate(&mut self, op: &str, lit: &Literal) -> io::Result<()> {
        if fits_imm32(lit.value) {
            let line = format!("\t{} {}, {}", op, self.acc.register, lit.value);
            return self.line(&line);
        }

        trace!("staging wide immediate {} through {}", lit.value, self.acc.scratch);
        let stage = format!("\tmov {}, {}", self.acc.scratch, lit.value);
        self.line(&stage)?;
        let line = format!("\t{} {}, {}", op, self.acc.register, self.acc.scratch);
        self.line(&line)
    }

    #[inline]
    fn line(&mut self, line: &str) -> io::Result<()> {
        self.sink.emit(line)
    }
}
