//! Line lexer
//!
//! Prog source is line-oriented, so each line is tokenized on its own.
//! Keywords are case-insensitive; identifiers keep their spelling and are
//! folded to lower case by the compiler when they name variables.

use std::fmt;
use std::ops::Range;

use logos::Logos;

/// Prog source token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // === Statement keywords ===
    #[token("var", ignore(ascii_case))]
    Var,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("elseif", ignore(ascii_case))]
    ElseIf,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("foreach", ignore(ascii_case))]
    Foreach,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("switch", ignore(ascii_case))]
    Switch,
    #[token("case", ignore(ascii_case))]
    Case,
    #[token("default", ignore(ascii_case))]
    Default,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("break", ignore(ascii_case))]
    Break,
    #[token("continue", ignore(ascii_case))]
    Continue,

    // === Word operators and literals ===
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("plus", ignore(ascii_case))]
    PlusWord,
    #[token("minus", ignore(ascii_case))]
    MinusWord,
    #[token("times", ignore(ascii_case))]
    Times,
    #[token("mod", ignore(ascii_case))]
    Mod,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("null", ignore(ascii_case))]
    Null,

    // === Symbols ===
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token("@")]
    At,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    Text(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                _ => return None,
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

/// A token paired with its byte range in the line.
pub type Spanned = (Token, Range<usize>);

/// Tokenize one line. On failure returns the byte offset of the offending text.
pub fn tokenize(line: &str) -> Result<Vec<Spanned>, usize> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(tokens)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Var => "var",
            Token::As => "as",
            Token::If => "if",
            Token::ElseIf => "elseif",
            Token::Else => "else",
            Token::End => "end",
            Token::While => "while",
            Token::For => "for",
            Token::To => "to",
            Token::Foreach => "foreach",
            Token::In => "in",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Return => "return",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::PlusWord => "plus",
            Token::MinusWord => "minus",
            Token::Times => "times",
            Token::Mod => "mod",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::EqEq => "==",
            Token::BangEq => "!=",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Eq => "=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::At => "@",
            Token::Number(n) => return write!(f, "{}", n),
            Token::Text(s) => return write!(f, "\"{}\"", s),
            Token::Ident(s) => return write!(f, "{}", s),
        };
        f.write_str(text)
    }
}
