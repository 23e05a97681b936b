use std::collections::VecDeque;

use logos::{Logos, Span};

use crate::{
    ast::Term,
    error::{Error, ErrorKind, Location},
    lexer::Token,
};

pub struct Parser {
    source_name: String,
    tokens: VecDeque<(Token, Span)>,
    // Stack of bound names, innermost binding last
    scope: Vec<String>,
    eof: usize,
}

impl Parser {
    pub fn new(source_name: &str, input: &str) -> Result<Parser, Error> {
        let mut tokens = VecDeque::new();

        for (result, span) in Token::lexer(input).spanned() {
            match result {
                Ok(token) => tokens.push_back((token, span)),
                Err(()) => {
                    return Err(Error::new(
                        ErrorKind::UnexpectedToken(input[span.clone()].to_owned()),
                        Location::new(source_name, span),
                    ))
                }
            }
        }

        Ok(Parser {
            source_name: source_name.to_owned(),
            tokens,
            scope: Vec::new(),
            eof: input.len(),
        })
    }

    // Parse the single top-level expression, requiring the token stream to
    // be fully consumed.
    pub fn parse(&mut self) -> Result<Term, Error> {
        let term = self.parse_expr()?;

        if let Some((token, span)) = self.tokens.front().cloned() {
            return Err(self.unexpected(&token, span));
        }
        Ok(term)
    }

    // Advance token stream
    fn next(&mut self) -> Result<(Token, Span), Error> {
        self.tokens.pop_front().ok_or_else(|| self.end_of_input())
    }

    // Peek current token
    fn peek(&self) -> Result<&Token, Error> {
        match self.tokens.front() {
            Some((token, _)) => Ok(token),
            None => Err(self.end_of_input()),
        }
    }

    // Consume a specific token variant
    fn expect(&mut self, expected: Token) -> Result<(), Error> {
        let (token, span) = self.next()?;

        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.unexpected(&token, span))
        }
    }

    fn end_of_input(&self) -> Error {
        Error::new(
            ErrorKind::ReachedEnd,
            Location::new(&self.source_name, self.eof..self.eof),
        )
    }

    fn unexpected(&self, token: &Token, span: Span) -> Error {
        Error::new(
            ErrorKind::UnexpectedToken(token.to_string()),
            Location::new(&self.source_name, span),
        )
    }

    fn parse_expr(&mut self) -> Result<Term, Error> {
        let (token, span) = self.next()?;

        match token {
            Token::Identifier(name) => self.resolve_variable(&name, span),
            Token::LitDecimal(value) => Ok(Term::Quote(value)),
            Token::LBrack => self.parse_form(),
            token => Err(self.unexpected(&token, span)),
        }
    }

    // A reference to a bound name compiles to the projections selecting it
    // from the environment: one Fst per enclosing binding skipped, then Snd.
    fn resolve_variable(&self, name: &str, span: Span) -> Result<Term, Error> {
        let depth = self
            .scope
            .iter()
            .rev()
            .position(|bound| bound == name)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::UnboundVariable(name.to_owned()),
                    Location::new(&self.source_name, span),
                )
            })?;

        let mut path = vec![Term::Fst; depth];
        path.push(Term::Snd);
        Ok(Term::Comp(path))
    }

    // A parenthesized form is either a sum or the application of an
    // abstraction; the opening bracket has already been consumed.
    fn parse_form(&mut self) -> Result<Term, Error> {
        match self.peek()?.clone() {
            Token::Plus => {
                self.next()?;
                self.parse_sum()
            }
            Token::LBrack => self.parse_application(),
            _ => {
                let (token, span) = self.next()?;
                Err(self.unexpected(&token, span))
            }
        }
    }

    // (+ e1 .. en) with n >= 2, folded left into binary additions. Each step
    // applies an addition abstraction to the pair of accumulator and operand;
    // the optimizer reduces these applications away.
    fn parse_sum(&mut self) -> Result<Term, Error> {
        let mut sum = self.parse_expr()?;
        let mut operands = 1;

        while !matches!(self.peek()?, Token::RBrack) {
            let operand = self.parse_expr()?;
            sum = Term::Comp(vec![
                Term::Pair(
                    Box::new(Term::Cur(Box::new(Term::Comp(vec![Term::Snd, Term::Plus])))),
                    Box::new(Term::Pair(Box::new(sum), Box::new(operand))),
                ),
                Term::App,
            ]);
            operands += 1;
        }

        let (close, span) = self.next()?;
        if operands < 2 {
            return Err(self.unexpected(&close, span));
        }
        Ok(sum)
    }

    // The operator must syntactically be an abstraction; its arity fixes the
    // number of operands, each consumed by one application step.
    fn parse_application(&mut self) -> Result<Term, Error> {
        let (mut term, arity) = self.parse_abstraction()?;

        for _ in 0..arity {
            let operand = self.parse_expr()?;
            term = Term::Comp(vec![
                Term::Pair(Box::new(term), Box::new(operand)),
                Term::App,
            ]);
        }

        self.expect(Token::RBrack)?;
        Ok(term)
    }

    // (lambda (x1 .. xn) body) with n >= 1 compiles to n nested Cur nodes.
    // The binders extend the scope for the body only, innermost last.
    fn parse_abstraction(&mut self) -> Result<(Term, usize), Error> {
        self.expect(Token::LBrack)?;
        self.expect(Token::Lambda)?;
        self.expect(Token::LBrack)?;

        let mut arity = 0;
        loop {
            let (token, span) = self.next()?;
            match token {
                Token::Identifier(name) => {
                    self.scope.push(name);
                    arity += 1;
                }
                Token::RBrack if arity > 0 => break,
                token => return Err(self.unexpected(&token, span)),
            }
        }

        let mut term = self.parse_expr()?;
        self.scope.truncate(self.scope.len() - arity);
        self.expect(Token::RBrack)?;

        for _ in 0..arity {
            term = Term::Cur(Box::new(term));
        }

        Ok((term, arity))
    }
}
