//! Tokens of the r0 source language.
use smol_str::SmolStr;
use std::{fmt, str::FromStr};

/// Line and column of a token's first character, both 1-based.
///
/// Used only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. Filled for identifiers, keywords and
    /// literals; empty for punctuation.
    pub lexeme: SmolStr,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<SmolStr>, pos: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }

    /// End-of-input sentinel.
    pub fn eof(pos: Position) -> Self {
        Self::new(TokenKind::Eof, "", pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Plus,       // `+`
    Minus,      // `-`
    Star,       // `*`
    Slash,      // `/`
    Assign,     // `=`
    Eq,         // `==`
    NotEq,      // `!=`
    Lt,         // `<`
    Gt,         // `>`
    LtEq,       // `<=`
    GtEq,       // `>=`
    LeftParen,  // `(`
    RightParen, // `)`
    LeftBrace,  // `{`
    RightBrace, // `}`
    Arrow,      // `->`
    Comma,      // `,`
    Colon,      // `:`
    Semicolon,  // `;`

    /// Integer literal
    Int,
    /// Floating literal
    Double,

    Ident,

    /// Identifier in the set of reserved words.
    Keyword(KeywordKind),

    /// End-of-input sentinel.
    Eof,
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;
        match self {
            T::Plus       => write!(f, "+"),
            T::Minus      => write!(f, "-"),
            T::Star       => write!(f, "*"),
            T::Slash      => write!(f, "/"),
            T::Assign     => write!(f, "="),
            T::Eq         => write!(f, "=="),
            T::NotEq      => write!(f, "!="),
            T::Lt         => write!(f, "<"),
            T::Gt         => write!(f, ">"),
            T::LtEq       => write!(f, "<="),
            T::GtEq       => write!(f, ">="),
            T::LeftParen  => write!(f, "("),
            T::RightParen => write!(f, ")"),
            T::LeftBrace  => write!(f, "{{"),
            T::RightBrace => write!(f, "}}"),
            T::Arrow      => write!(f, "->"),
            T::Comma      => write!(f, ","),
            T::Colon      => write!(f, ":"),
            T::Semicolon  => write!(f, ";"),
            T::Int        => write!(f, "integer literal"),
            T::Double     => write!(f, "float literal"),
            T::Ident      => write!(f, "identifier"),
            T::Keyword(k) => write!(f, "{}", k),
            T::Eof        => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Fn,
    Let,
    Const,
    As,
    While,
    If,
    Else,
    Return,
}

impl fmt::Display for KeywordKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use KeywordKind as K;
        match self {
            K::Fn     => write!(f, "fn"),
            K::Let    => write!(f, "let"),
            K::Const  => write!(f, "const"),
            K::As     => write!(f, "as"),
            K::While  => write!(f, "while"),
            K::If     => write!(f, "if"),
            K::Else   => write!(f, "else"),
            K::Return => write!(f, "return"),
        }
    }
}

impl FromStr for KeywordKind {
    type Err = ();

    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeywordKind as K;
        match s {
            "fn"     => Ok(K::Fn),
            "let"    => Ok(K::Let),
            "const"  => Ok(K::Const),
            "as"     => Ok(K::As),
            "while"  => Ok(K::While),
            "if"     => Ok(K::If),
            "else"   => Ok(K::Else),
            "return" => Ok(K::Return),
            _        => Err(()),
        }
    }
}
