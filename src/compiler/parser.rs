//! The Parser module pulls tokens from the Scanner on demand
//! and converts them into a tree of forms.
//!
//! Every token is consumed exactly once. The token that ends an
//! operator's literal run is left in place and parsed as the next form.
use super::ast::*;
use super::error::*;
use super::scanner::{Scanner, Span, Token, TokenKind};

/// Forms may not nest deeper than this many levels.
pub const MAX_NESTING: usize = 256;

pub struct Parser<'a> {
    source: &'a [u8],
    scanner: Scanner<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Parser { source, scanner, current, depth: 0 }
    }

    /// Run the parser, consuming itself and returning the whole program.
    pub fn run(mut self) -> CompileResult<Program> {
        let mut forms = Vec::new();

        loop {
            match self.current.kind {
                TokenKind::EndOfInput => break,
                TokenKind::CloseGroup => {
                    return UnmatchedCloseSnafu { at: self.locate(self.current.span.start) }.fail();
                }
                _ => forms.push(self.form()?),
            }
        }

        debug!("parsed {} top-level form(s)", forms.len());
        Ok(Program { forms })
    }

    /// Parses a single form starting at the current token.
    fn form(&mut self) -> CompileResult<Form> {
        if self.depth >= MAX_NESTING {
            return NestingTooDeepSnafu {
                at: self.locate(self.current.span.start),
                limit: MAX_NESTING,
            }
            .fail();
        }

        self.depth += 1;
        let form = self.dispatch();
        self.depth -= 1;
        form
    }

    fn dispatch(&mut self) -> CompileResult<Form> {
        let tok = self.consume();

        match tok.kind {
            TokenKind::OpenGroup => self.group(tok),
            TokenKind::NumericLiteral => Ok(Form::Literal(self.literal(tok)?)),
            TokenKind::Plus => {
                let lits = self.literal_run()?;
                if lits.is_empty() {
                    return self.missing_operand(tok);
                }
                Ok(Form::Add(lits))
            }
            TokenKind::Minus => {
                if self.current.kind != TokenKind::NumericLiteral {
                    return self.missing_operand(tok);
                }
                let seed_tok = self.consume();
                let seed = self.literal(seed_tok)?;
                let rest = self.literal_run()?;
                Ok(Form::Sub { seed, rest })
            }
            TokenKind::Identifier => {
                let name = tok.text(self.source);
                match Keyword::from_ident(name) {
                    Some(Keyword::Dump) => {
                        trace!("dump at offset {}", tok.span.start);
                        Ok(Form::Dump(Box::new(self.form()?)))
                    }
                    None => UnknownIdentifierSnafu {
                        at: self.locate(tok.span.start),
                        name: name.to_owned(),
                    }
                    .fail(),
                }
            }
            // Only reachable when a form was required, e.g. `(dump)`.
            TokenKind::CloseGroup | TokenKind::EndOfInput => UnexpectedTokenSnafu {
                at: self.locate(tok.span.start),
                found: self.describe(tok),
            }
            .fail(),
        }
    }

    /// Parses the rest of a group whose `(` has already been consumed.
    fn group(&mut self, open: Token) -> CompileResult<Form> {
        let mut forms = Vec::new();

        loop {
            match self.current.kind {
                TokenKind::CloseGroup => {
                    let close = self.consume();
                    return Ok(Form::Group(Group {
                        forms,
                        span: Span::new(open.span.start, close.span.end),
                    }));
                }
                TokenKind::EndOfInput => {
                    return UnclosedGroupSnafu { at: self.locate(open.span.start) }.fail();
                }
                _ => forms.push(self.form()?),
            }
        }
    }

    /// Consumes every numeric literal immediately following the cursor.
    fn literal_run(&mut self) -> CompileResult<Vec<Literal>> {
        let mut lits = Vec::new();
        while self.current.kind == TokenKind::NumericLiteral {
            let tok = self.consume();
            lits.push(self.literal(tok)?);
        }
        Ok(lits)
    }

    fn literal(&self, tok: Token) -> CompileResult<Literal> {
        let text = tok.text(self.source);
        match text.parse::<u64>() {
            Ok(value) => Ok(Literal { value, span: tok.span }),
            Err(_) => LiteralOutOfRangeSnafu {
                at: self.locate(tok.span.start),
                text: text.to_owned(),
            }
            .fail(),
        }
    }

    fn missing_operand<T>(&self, operator: Token) -> CompileResult<T> {
        MissingOperandSnafu {
            at: self.locate(operator.span.start),
            operator: operator.text(self.source).to_owned(),
        }
        .fail()
    }

    fn describe(&self, tok: Token) -> String {
        match tok.kind {
            TokenKind::EndOfInput => "end of input".to_owned(),
            _ => tok.text(self.source).to_owned(),
        }
    }

    fn locate(&self, offset: usize) -> Location {
        Location::of(self.source, offset)
    }

    /// Returns the current token and pulls the next one from the scanner.
    #[inline]
    fn consume(&mut self) -> Token {
        std::mem::replace(&mut self.current, self.scanner.next_token())
    }
}

/// Parses a complete source buffer.
pub fn parse(source: &[u8]) -> CompileResult<Program> {
    Parser::new(source).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: u64, start: usize, end: usize) -> Literal {
        Literal { value, span: Span::new(start, end) }
    }

    fn values(lits: &[Literal]) -> Vec<u64> {
        lits.iter().map(|l| l.value).collect()
    }

    /// Strips spans so trees can be compared by shape.
    fn shape(form: &Form) -> String {
        form.to_string()
    }

    #[test]
    fn test_literal() {
        let program = parse(b"  42").unwrap();
        assert_eq!(program.forms, vec![Form::Literal(lit(42, 2, 4))]);

        let program = parse(b"18446744073709551615").unwrap();
        assert_eq!(program.forms, vec![Form::Literal(lit(u64::MAX, 0, 20))]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse(b"").unwrap(), Program::default());
        assert_eq!(parse(b" \n\t ").unwrap(), Program::default());
        assert_eq!(parse(b"()").unwrap().forms.len(), 1);
    }

    #[test]
    fn test_add() {
        let program = parse(b"(+ 1 2 3)").unwrap();
        match &program.forms[..] {
            [Form::Group(group)] => {
                assert_eq!(group.span, Span::new(0, 9));
                match &group.forms[..] {
                    [Form::Add(lits)] => assert_eq!(values(lits), vec![1, 2, 3]),
                    other => panic!("unexpected forms {:?}", other),
                }
            }
            other => panic!("unexpected forms {:?}", other),
        }
    }

    #[test]
    fn test_sub() {
        let program = parse(b"(- 10 3 2)").unwrap();
        match &program.forms[..] {
            [Form::Group(group)] => match &group.forms[..] {
                [Form::Sub { seed, rest }] => {
                    assert_eq!(seed.value, 10);
                    assert_eq!(values(rest), vec![3, 2]);
                }
                other => panic!("unexpected forms {:?}", other),
            },
            other => panic!("unexpected forms {:?}", other),
        }

        let program = parse(b"(- 7)").unwrap();
        assert_eq!(shape(&program.forms[0]), "(- 7)");
    }

    #[test]
    fn test_dump() {
        let program = parse(b"dump 5").unwrap();
        assert_eq!(program.forms, vec![Form::Dump(Box::new(Form::Literal(lit(5, 5, 6))))]);

        let program = parse(b"(dump (+ 1 2))").unwrap();
        assert_eq!(shape(&program.forms[0]), "(dump (+ 1 2))");
    }

    #[test]
    fn test_operator_run_stops_at_non_literal() {
        // The `(` ending the run is parsed as a sibling form, not skipped.
        let program = parse(b"(+ 1 2 (dump 3) 4)").unwrap();
        assert_eq!(shape(&program.forms[0]), "(+ 1 2 (dump 3) 4)");
        match &program.forms[0] {
            Form::Group(group) => assert_eq!(group.forms.len(), 3),
            other => panic!("unexpected form {:?}", other),
        }

        // Closing parens after a run are not swallowed.
        let program = parse(b"((+ 1) (- 2 1)) 9").unwrap();
        assert_eq!(program.to_string(), "((+ 1) (- 2 1))\n9");
    }

    #[test]
    fn test_consecutive_literals() {
        let program = parse(b"1 2 (3 4)").unwrap();
        assert_eq!(program.to_string(), "1\n2\n(3 4)");
    }

    #[test]
    fn test_nesting() {
        let program = parse(b"(((dump 1)))").unwrap();
        assert_eq!(program.to_string(), "(((dump 1)))");

        let src = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(parse(src.as_bytes()).is_ok());

        let src = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        match parse(src.as_bytes()) {
            Err(CompileError::NestingTooDeep { limit, .. }) => assert_eq!(limit, MAX_NESTING),
            other => panic!("expected NestingTooDeep, got {:?}", other),
        }

        let src = format!("{}1", "dump ".repeat(1000));
        assert!(matches!(parse(src.as_bytes()), Err(CompileError::NestingTooDeep { .. })));
    }

    #[test]
    fn test_unknown_identifier() {
        match parse(b"(print 5)") {
            Err(CompileError::UnknownIdentifier { at, name }) => {
                assert_eq!(name, "print");
                assert_eq!(at, Location { line: 1, column: 2 });
            }
            other => panic!("expected UnknownIdentifier, got {:?}", other),
        }
        assert!(matches!(parse(b"Dump 5"), Err(CompileError::UnknownIdentifier { .. })));
    }

    #[test]
    fn test_missing_operand() {
        match parse(b"(+)") {
            Err(CompileError::MissingOperand { at, operator }) => {
                assert_eq!(operator, "+");
                assert_eq!(at, Location { line: 1, column: 2 });
            }
            other => panic!("expected MissingOperand, got {:?}", other),
        }
        assert!(matches!(parse(b"(+ (dump 1))"), Err(CompileError::MissingOperand { .. })));
        assert!(matches!(parse(b"(- )"), Err(CompileError::MissingOperand { .. })));
        assert!(matches!(parse(b"\n  -"), Err(CompileError::MissingOperand { .. })));
        assert!(matches!(parse(b"(- (+ 1))"), Err(CompileError::MissingOperand { .. })));
    }

    #[test]
    fn test_unbalanced_groups() {
        match parse(b"(+ 1 2))") {
            Err(CompileError::UnmatchedClose { at }) => {
                assert_eq!(at, Location { line: 1, column: 8 });
            }
            other => panic!("expected UnmatchedClose, got {:?}", other),
        }

        match parse(b"1\n(dump (+ 1 2)") {
            Err(CompileError::UnclosedGroup { at }) => {
                assert_eq!(at, Location { line: 2, column: 1 });
            }
            other => panic!("expected UnclosedGroup, got {:?}", other),
        }
    }

    #[test]
    fn test_dump_without_argument() {
        match parse(b"(dump)") {
            Err(CompileError::UnexpectedToken { found, .. }) => assert_eq!(found, ")"),
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
        match parse(b"dump") {
            Err(CompileError::UnexpectedToken { found, .. }) => assert_eq!(found, "end of input"),
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_out_of_range() {
        match parse(b"(+ 1 18446744073709551616)") {
            Err(CompileError::LiteralOutOfRange { text, at }) => {
                assert_eq!(text, "18446744073709551616");
                assert_eq!(at.column, 6);
            }
            other => panic!("expected LiteralOutOfRange, got {:?}", other),
        }
    }
}
