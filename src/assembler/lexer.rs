//! Lexical analysis for 6502 assembly source
//!
//! This module provides the first phase of assembly: converting source text into
//! a stream of typed tokens. The lexer separates character-level concerns (what is
//! a number? where does a comment start?) from syntactic analysis, which lives in
//! [`parser`](super::parser).
//!
//! Identifiers are normalized to uppercase, so mnemonics, register names and
//! labels are all case-insensitive. Whitespace is dropped; newlines are kept
//! because statements are line-oriented.
//!
//! # Examples
//!
//! ```
//! use emu6502::assembler::lexer::{tokenize, TokenType};
//!
//! let tokens = tokenize("lda #$42 ; load").unwrap();
//!
//! assert_eq!(tokens[0].token_type, TokenType::Identifier("LDA".to_string()));
//! assert_eq!(tokens[1].token_type, TokenType::Hash);
//! assert_eq!(
//!     tokens[2].token_type,
//!     TokenType::Number { value: 0x42, zero_page: true }
//! );
//! assert_eq!(tokens[3].token_type, TokenType::Comment(" load".to_string()));
//! assert_eq!(tokens[4].token_type, TokenType::Eof);
//! ```

use super::parser::parse_number;
use super::{AssemblerError, ErrorType};

/// Classification of lexical tokens in 6502 assembly
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// Mnemonic, label or register name (uppercase normalized)
    Identifier(String),

    /// Directive name after a `.` (uppercase normalized, without the dot)
    Directive(String),

    /// Numeric literal.
    ///
    /// `zero_page` is set when the literal was written short enough to
    /// select a zero-page form: at most two hex digits, or a decimal or
    /// binary value up to 255.
    Number { value: u16, zero_page: bool },

    /// `:` after a label definition
    Colon,
    /// `,` before an index register or between directive arguments
    Comma,
    /// `#` immediate mode prefix
    Hash,
    /// `(` indirect addressing open
    LParen,
    /// `)` indirect addressing close
    RParen,

    /// Comment text after `;` (excluding the `;` itself)
    Comment(String),
    /// Line terminator (CRLF or LF)
    Newline,
    /// End of input
    Eof,
}

/// A single lexical token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,

    /// Source line number (1-indexed)
    pub line: usize,

    /// Column offset within line (0-indexed)
    pub column: usize,
}

/// Lexer state for converting source text into tokens
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: Option<(usize, char)>,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current = chars.next();
        Lexer {
            source,
            chars,
            current,
            line: 1,
            line_start: 0,
        }
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn peek(&self) -> Option<char> {
        self.current.map(|(_, ch)| ch)
    }

    fn offset(&self) -> usize {
        self.current.map(|(pos, _)| pos).unwrap_or(self.source.len())
    }

    fn column(&self) -> usize {
        self.offset() - self.line_start
    }

    fn token(&self, token_type: TokenType, column: usize) -> Token {
        Token {
            token_type,
            line: self.line,
            column,
        }
    }

    fn error(&self, message: String) -> AssemblerError {
        AssemblerError::new(ErrorType::SyntaxError, self.line, message)
    }

    /// Consumes characters while `accept` holds and returns the slice covered.
    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset();
        while let Some(ch) = self.peek() {
            if !accept(ch) {
                break;
            }
            self.advance();
        }
        let source = self.source;
        &source[start..self.offset()]
    }

    /// Scan an identifier: [a-zA-Z_][a-zA-Z0-9_]*
    fn scan_word(&mut self) -> String {
        self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            .to_ascii_uppercase()
    }

    /// Scan a `$hex`, `%binary` or decimal literal.
    fn scan_number(&mut self, start_col: usize) -> Result<Token, AssemblerError> {
        let start = self.offset();
        if matches!(self.peek(), Some('$') | Some('%')) {
            self.advance();
        }
        // Take the whole alphanumeric run so `$ZZ` is reported, not split
        self.take_while(|ch| ch.is_ascii_alphanumeric());
        let source = self.source;
        let literal = &source[start..self.offset()];

        let (value, zero_page) = parse_number(literal).map_err(|message| self.error(message))?;
        Ok(self.token(TokenType::Number { value, zero_page }, start_col))
    }

    /// Get the next token from the source
    fn next_token(&mut self) -> Result<Option<Token>, AssemblerError> {
        self.take_while(|ch| ch == ' ' || ch == '\t');

        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let start_col = self.column();

        let punctuation = match ch {
            ':' => Some(TokenType::Colon),
            ',' => Some(TokenType::Comma),
            '#' => Some(TokenType::Hash),
            '(' => Some(TokenType::LParen),
            ')' => Some(TokenType::RParen),
            _ => None,
        };
        if let Some(token_type) = punctuation {
            self.advance();
            return Ok(Some(self.token(token_type, start_col)));
        }

        match ch {
            '\n' | '\r' => {
                self.advance();
                if ch == '\r' && self.peek() == Some('\n') {
                    self.advance();
                }
                let token = self.token(TokenType::Newline, start_col);
                self.line += 1;
                self.line_start = self.offset();
                Ok(Some(token))
            }
            ';' => {
                self.advance();
                let text = self.take_while(|ch| ch != '\n' && ch != '\r');
                Ok(Some(self.token(TokenType::Comment(text.to_string()), start_col)))
            }
            '.' => {
                self.advance();
                let name = self.scan_word();
                if name.is_empty() {
                    return Err(self.error("expected a directive name after '.'".to_string()));
                }
                Ok(Some(self.token(TokenType::Directive(name), start_col)))
            }
            '$' | '%' | '0'..='9' => Ok(Some(self.scan_number(start_col)?)),
            'a'..='z' | 'A'..='Z' | '_' => {
                let word = self.scan_word();
                Ok(Some(self.token(TokenType::Identifier(word), start_col)))
            }
            _ => {
                self.advance();
                Err(self.error(format!("unexpected character '{}'", ch)))
            }
        }
    }
}

/// Tokenize assembly source text into a vector of tokens ending in `Eof`.
///
/// Lexing continues past an error to the next whitespace or line break, so
/// every bad token in the source is reported at once.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<AssemblerError>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        match lexer.next_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {
                tokens.push(lexer.token(TokenType::Eof, lexer.column()));
                break;
            }
            Err(err) => {
                errors.push(err);
                lexer.take_while(|ch| !matches!(ch, ' ' | '\t' | '\n' | '\r' | ';'));
            }
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

/// Token stream with lookahead for parser consumption
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream {
            tokens,
            position: 0,
        }
    }

    /// Peek at the current token without consuming it
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Peek ahead n tokens without consuming them. `peek_n(0)` is `peek()`.
    #[must_use]
    pub fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    /// Consume and return the current token
    pub fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// True at the `Eof` token or past the end
    #[must_use]
    pub fn is_eof(&self) -> bool {
        match self.peek() {
            Some(token) => token.token_type == TokenType::Eof,
            None => true,
        }
    }

    /// Line number of the current token, or of the last one past the end
    #[must_use]
    pub fn current_line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|token| token.line)
            .unwrap_or(1)
    }
}
