use std::fmt::Display;

use logos::Logos;

#[derive(Clone, Debug, Logos, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("(")]
    LBrack,
    #[token(")")]
    RBrack,

    #[token("lambda")]
    Lambda,

    #[token("+")]
    Plus,

    // Literals that overflow u64 are rejected here rather than truncated.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    LitDecimal(u64),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_owned())]
    Identifier(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LBrack => write!(f, "("),
            Token::RBrack => write!(f, ")"),
            Token::Lambda => write!(f, "lambda"),
            Token::Plus => write!(f, "+"),
            Token::LitDecimal(value) => write!(f, "{}", value),
            Token::Identifier(name) => write!(f, "{}", name),
        }
    }
}
