//! Lexical analysis (tokenizer)
use itertools::{multipeek, MultiPeek};
use std::str::{CharIndices, FromStr};

use crate::{
    error::{CompileError, CompileResult},
    tokens::{KeywordKind, Position, Token, TokenKind},
};

/// Scans source code into a finite token sequence.
///
/// The scanner works line by line, so a comment or a numeric literal
/// cannot span lines. An end-of-input sentinel is appended to the
/// produced sequence.
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Scan the whole source eagerly.
    pub fn scan(self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut end = Position::new(1, 1);

        for (index, raw_line) in self.source.lines().enumerate() {
            let line_no = index as u32 + 1;
            let line = raw_line.trim_end();
            if line.is_empty() {
                // Skip empty line.
                continue;
            }

            let mut scanner = LineScanner::new(line, line_no);
            while let Some(token) = scanner.scan_token()? {
                tokens.push(token);
            }
            end = scanner.pos();
        }

        tokens.push(Token::eof(end));
        Ok(tokens)
    }
}

/// Print the scanned token table. For debugging.
pub fn debug_print_tokens(source: &str) {
    match Lexer::new(source).scan() {
        Ok(tokens) => {
            println!("line:col | token        | lexeme");
            for token in &tokens {
                let kind = format!("{:?}", token.kind);
                println!("{:>4}:{:<3} {:<20} {}", token.pos.line, token.pos.column, kind, token.lexeme);
            }
        }
        Err(err) => println!("{}", err),
    }
}

/// Cursor over a single right-trimmed source line.
///
/// The `MultiPeek` wrapper allows for two-character lookahead without
/// consuming the underlying iterator. Peeking advances an internal peek
/// cursor, so every lookahead helper resets it first.
struct LineScanner<'a> {
    line: &'a str,
    chars: MultiPeek<CharIndices<'a>>,
    line_no: u32,
    /// Column of the next character to be consumed, 1-based.
    column: u32,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str, line_no: u32) -> Self {
        Self {
            line,
            chars: multipeek(line.char_indices()),
            line_no,
            column: 1,
        }
    }

    /// Scan the next token. Returns `None` when the line is exhausted.
    fn scan_token(&mut self) -> CompileResult<Option<Token>> {
        use TokenKind as T;

        self.skip_whitespace();

        let (start, first) = match self.peek() {
            Some(next) => next,
            None => return Ok(None),
        };
        let pos = self.pos();

        let kind = match first {
            '+' => self.single(T::Plus),
            '-' => self.one_or_two(T::Minus, '>', T::Arrow),
            '*' => self.single(T::Star),
            '/' => {
                if self.peek2().1 == Some('/') {
                    // Comment runs to the end of the line.
                    while self.bump().is_some() {}
                    return Ok(None);
                }
                self.single(T::Slash)
            }
            '=' => self.one_or_two(T::Assign, '=', T::Eq),
            '!' => {
                if self.peek2().1 == Some('=') {
                    self.bump();
                    self.bump();
                    T::NotEq
                } else {
                    return Err(CompileError::lexical(pos, "invalid character '!'"));
                }
            }
            '<' => self.one_or_two(T::Lt, '=', T::LtEq),
            '>' => self.one_or_two(T::Gt, '=', T::GtEq),
            '(' => self.single(T::LeftParen),
            ')' => self.single(T::RightParen),
            '{' => self.single(T::LeftBrace),
            '}' => self.single(T::RightBrace),
            ',' => self.single(T::Comma),
            ':' => self.single(T::Colon),
            ';' => self.single(T::Semicolon),
            '0'..='9' => return self.scan_number(start, pos).map(Some),
            c if is_letter(c) => return Ok(Some(self.scan_ident(start, pos))),
            c => {
                return Err(CompileError::lexical(
                    pos,
                    format!("invalid character '{}'", c),
                ))
            }
        };

        Ok(Some(Token::new(kind, "", pos)))
    }

    /// Make a numeric literal token.
    ///
    /// The integer part is one or more digits. A `.` must be followed by
    /// a fractional part, after which an optional exponent may follow,
    /// producing a double literal.
    fn scan_number(&mut self, start: usize, pos: Position) -> CompileResult<Token> {
        self.consume_digits();

        let mut kind = TokenKind::Int;
        if self.peek_is('.') {
            self.bump();
            if !self.peek_is_digit() {
                return Err(CompileError::lexical(self.pos(), "expected a digit after '.'"));
            }
            self.consume_digits();

            if matches!(self.peek(), Some((_, 'e' | 'E'))) {
                self.bump();
                if matches!(self.peek(), Some((_, '+' | '-'))) {
                    self.bump();
                }
                if !self.peek_is_digit() {
                    return Err(CompileError::lexical(
                        self.pos(),
                        "expected a digit in exponent",
                    ));
                }
                self.consume_digits();
            }

            kind = TokenKind::Double;
        }

        let lexeme = &self.line[start..self.offset()];
        Ok(Token::new(kind, lexeme, pos))
    }

    /// Make an identifier or keyword token.
    fn scan_ident(&mut self, start: usize, pos: Position) -> Token {
        while matches!(self.peek(), Some((_, c)) if is_letter(c) || c.is_ascii_digit()) {
            self.bump();
        }

        let lexeme = &self.line[start..self.offset()];
        // A lexeme matching a reserved word becomes a keyword token
        // instead of a user defined identifier.
        let kind = KeywordKind::from_str(lexeme)
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Ident);
        Token::new(kind, lexeme, pos)
    }

    /// Consume a single-character punctuation token.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    /// Two-character lookahead punctuation such as `->` and `<=`.
    ///
    /// Consumes the second character only when it matches.
    fn one_or_two(&mut self, single_kind: TokenKind, next: char, two_kind: TokenKind) -> TokenKind {
        self.bump();
        if self.peek_is(next) {
            self.bump();
            two_kind
        } else {
            single_kind
        }
    }

    /// Position of the next character to be consumed.
    fn pos(&self) -> Position {
        Position::new(self.line_no, self.column)
    }

    /// Look at the next character without consuming it.
    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.reset_peek();
        self.chars.peek().copied()
    }

    /// Two-character lookahead: the next character and the one after it.
    fn peek2(&mut self) -> (Option<char>, Option<char>) {
        self.chars.reset_peek();
        (
            self.chars.peek().map(|&(_, c)| c),
            self.chars.peek().map(|&(_, c)| c),
        )
    }

    fn peek_is(&mut self, expected: char) -> bool {
        matches!(self.peek(), Some((_, c)) if c == expected)
    }

    fn peek_is_digit(&mut self) -> bool {
        matches!(self.peek(), Some((_, c)) if c.is_ascii_digit())
    }

    /// Consume the next character.
    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if next.is_some() {
            self.column += 1;
        }
        next
    }

    /// Byte offset just past the last consumed character.
    fn offset(&mut self) -> usize {
        self.peek().map(|(i, _)| i).unwrap_or(self.line.len())
    }

    fn consume_digits(&mut self) {
        while self.peek_is_digit() {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.bump();
        }
    }
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

#[cfg(test)]
mod test {
    use super::*;
    use TokenKind as T;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .scan()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation_lookahead() {
        assert_eq!(
            kinds("- -> = == < <= > >= !="),
            vec![
                T::Minus,
                T::Arrow,
                T::Assign,
                T::Eq,
                T::Lt,
                T::LtEq,
                T::Gt,
                T::GtEq,
                T::NotEq,
                T::Eof
            ]
        );
    }

    #[test]
    fn test_keywords_and_idents() {
        let tokens = Lexer::new("fn main_2 let letx").scan().unwrap();
        assert_eq!(tokens[0].kind, T::Keyword(KeywordKind::Fn));
        assert_eq!(tokens[1].kind, T::Ident);
        assert_eq!(tokens[1].lexeme, "main_2");
        assert_eq!(tokens[2].kind, T::Keyword(KeywordKind::Let));
        assert_eq!(tokens[3].kind, T::Ident);
        assert_eq!(tokens[3].lexeme, "letx");
    }

    #[test]
    fn test_number_literals() {
        let tokens = Lexer::new("7 3.25 1.0e-3 2.5E+10").scan().unwrap();
        assert_eq!(tokens[0].kind, T::Int);
        assert_eq!(tokens[0].lexeme, "7");
        assert_eq!(tokens[1].kind, T::Double);
        assert_eq!(tokens[1].lexeme, "3.25");
        assert_eq!(tokens[2].kind, T::Double);
        assert_eq!(tokens[2].lexeme, "1.0e-3");
        assert_eq!(tokens[3].kind, T::Double);
        assert_eq!(tokens[3].lexeme, "2.5E+10");
    }

    #[test]
    fn test_integer_exponent_is_not_a_double() {
        // An exponent is only recognized after a fraction.
        let tokens = Lexer::new("1e3").scan().unwrap();
        assert_eq!(tokens[0].kind, T::Int);
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[1].kind, T::Ident);
        assert_eq!(tokens[1].lexeme, "e3");
    }

    #[test]
    fn test_comments_and_positions() {
        let source = "let x // trailing comment\n// whole line\n  + ;";
        let tokens = Lexer::new(source).scan().unwrap();
        assert_eq!(tokens[0].pos, Position::new(1, 1));
        assert_eq!(tokens[1].pos, Position::new(1, 5));
        assert_eq!(tokens[2].kind, T::Plus);
        assert_eq!(tokens[2].pos, Position::new(3, 3));
        assert_eq!(tokens[3].kind, T::Semicolon);
        assert_eq!(tokens[4].kind, T::Eof);
    }

    #[test]
    fn test_lexical_errors() {
        let err = Lexer::new("let a = 1 ! 2;").scan().unwrap_err();
        assert_eq!(err.pos, Position::new(1, 11));
        assert!(err.message.contains('!'));

        let err = Lexer::new("let d = 1.;").scan().unwrap_err();
        assert!(err.message.contains("digit"));

        let err = Lexer::new("let e = 1.5e;").scan().unwrap_err();
        assert!(err.message.contains("exponent"));

        assert!(Lexer::new("let f = @;").scan().is_err());
    }
}
