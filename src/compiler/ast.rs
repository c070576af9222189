//! This tree describes a parsed krisp program.
//!
//! A program is a sequence of forms, evaluated left to right against a
//! single accumulator. Whitespace and any byte that is not part of a
//! token are ignored.
//!
//! Supported forms:
//!
//! ```lisp
//! 42              ; load 42 into the accumulator
//! (+ 1 2 3)       ; add 1, 2 and 3 to the accumulator
//! (- 10 3 2)      ; load 10, then subtract 3 and 2
//! (dump 5)        ; load 5, then print the accumulator
//! (dump (+ 1 2))  ; the argument is evaluated before printing
//! ```
//!
//! Groups may nest freely and a group may hold any number of forms:
//!
//! ```lisp
//! (dump (- 100 1) (+ 1))   ; prints 99; the accumulator ends at 100
//! ```
//!
//! Keywords are case-sensitive. `dump` is the only one.

use super::scanner::Span;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Literal {
    pub value: u64,
    pub span: Span,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A parenthesized run of forms. The span covers both parentheses.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Group {
    pub forms: Vec<Form>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Form {
    Literal(Literal),
    Group(Group),
    Dump(Box<Form>),
    Add(Vec<Literal>),
    Sub { seed: Literal, rest: Vec<Literal> },
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Form::Literal(lit) => write!(f, "{}", lit),
            Form::Group(group) => {
                write!(f, "(")?;
                for (idx, form) in group.forms.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", form)?;
                }
                write!(f, ")")
            }
            Form::Dump(arg) => write!(f, "dump {}", arg),
            Form::Add(lits) => {
                write!(f, "+")?;
                for lit in lits {
                    write!(f, " {}", lit)?;
                }
                Ok(())
            }
            Form::Sub { seed, rest } => {
                write!(f, "- {}", seed)?;
                for lit in rest {
                    write!(f, " {}", lit)?;
                }
                Ok(())
            }
        }
    }
}

/// A whole source file.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Program {
    pub forms: Vec<Form>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, form) in self.forms.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", form)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Keyword {
    Dump,
}

impl Keyword {
    /// Looks up the keyword spelled by an identifier.
    pub fn from_ident(text: &str) -> Option<Keyword> {
        match text {
            "dump" => Some(Keyword::Dump),
            _ => None,
        }
    }
}
