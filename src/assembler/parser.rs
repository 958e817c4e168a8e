//! Assembly source parser
//!
//! Turns the token stream into one [`AssemblyLine`] per source line. Operand
//! syntax is recorded as written; choosing the addressing mode is left to the
//! [`encoder`](super::encoder).

use std::str::FromStr;

use super::lexer::{Token, TokenStream, TokenType};
use super::{AssemblerError, ErrorType};
use crate::opcodes::Mnemonic;

/// A numeric literal or a label reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number { value: u16, zero_page: bool },
    Label(String),
}

impl Value {
    /// Whether the value was written as a zero-page literal.
    pub fn is_zero_page(&self) -> bool {
        matches!(self, Value::Number { zero_page: true, .. })
    }
}

/// Operand as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandSyntax {
    /// Nothing after the mnemonic
    None,
    /// `A`
    Accumulator,
    /// `#value`
    Immediate(Value),
    /// `value`
    Direct(Value),
    /// `value,X`
    IndexedX(Value),
    /// `value,Y`
    IndexedY(Value),
    /// `(value)`
    Indirect(Value),
    /// `(value,X)`
    IndirectX(Value),
    /// `(value),Y`
    IndirectY(Value),
}

/// The statement part of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Instruction {
        mnemonic: Mnemonic,
        operand: OperandSyntax,
    },
    /// `.byte v, v, ...`
    Bytes(Vec<Value>),
    /// `.word v, v, ...`
    Words(Vec<Value>),
}

/// A parsed line of assembly source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyLine {
    /// Line number in source file (1-indexed)
    pub line_number: usize,

    /// Optional label definition (e.g., "START" from "START:")
    pub label: Option<String>,

    pub statement: Option<Statement>,
}

/// Parse a number literal: `$hex`, `%binary` or decimal.
///
/// Returns the value and whether it was written short enough to select a
/// zero-page form.
pub fn parse_number(s: &str) -> Result<(u16, bool), String> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('$') {
        if hex.is_empty() {
            return Err("missing hex digits after '$'".to_string());
        }
        let value =
            u16::from_str_radix(hex, 16).map_err(|e| format!("invalid hex number '{}': {}", s, e))?;
        Ok((value, hex.len() <= 2))
    } else if let Some(bin) = s.strip_prefix('%') {
        if bin.is_empty() {
            return Err("missing binary digits after '%'".to_string());
        }
        let value = u16::from_str_radix(bin, 2)
            .map_err(|e| format!("invalid binary number '{}': {}", s, e))?;
        Ok((value, value <= 0xFF))
    } else {
        let value = s
            .parse::<u16>()
            .map_err(|e| format!("invalid decimal number '{}': {}", s, e))?;
        Ok((value, value <= 0xFF))
    }
}

/// Parse every line of a token stream.
///
/// Parsing continues after a bad line so all syntax errors are reported.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<AssemblyLine>, Vec<AssemblerError>> {
    let mut stream = TokenStream::new(tokens);
    let mut lines = Vec::new();
    let mut errors = Vec::new();

    while !stream.is_eof() {
        match parse_line(&mut stream) {
            Ok(line) => lines.push(line),
            Err(err) => {
                errors.push(err);
                skip_to_line_end(&mut stream);
            }
        }
        // Step over the line terminator
        if matches!(stream.peek().map(|t| &t.token_type), Some(TokenType::Newline)) {
            stream.consume();
        }
    }

    if errors.is_empty() {
        Ok(lines)
    } else {
        Err(errors)
    }
}

fn skip_to_line_end(stream: &mut TokenStream) {
    while let Some(token) = stream.peek() {
        if matches!(token.token_type, TokenType::Newline | TokenType::Eof) {
            break;
        }
        stream.consume();
    }
}

fn syntax_error(line: usize, message: impl Into<String>) -> AssemblerError {
    AssemblerError::new(ErrorType::SyntaxError, line, message)
}

/// True at a comment, newline or end of input.
fn at_line_end(stream: &TokenStream) -> bool {
    match stream.peek() {
        Some(token) => matches!(
            token.token_type,
            TokenType::Comment(_) | TokenType::Newline | TokenType::Eof
        ),
        None => true,
    }
}

fn parse_line(stream: &mut TokenStream) -> Result<AssemblyLine, AssemblerError> {
    let line_number = stream.current_line();

    let label = match (stream.peek(), stream.peek_n(1)) {
        (
            Some(Token {
                token_type: TokenType::Identifier(name),
                ..
            }),
            Some(Token {
                token_type: TokenType::Colon,
                ..
            }),
        ) => {
            let name = name.clone();
            stream.consume();
            stream.consume();
            Some(name)
        }
        _ => None,
    };

    let statement = if at_line_end(stream) {
        None
    } else {
        Some(parse_statement(stream, line_number)?)
    };

    if let Some(TokenType::Comment(_)) = stream.peek().map(|t| &t.token_type) {
        stream.consume();
    }
    if !at_line_end(stream) {
        return Err(syntax_error(line_number, "unexpected tokens at end of line"));
    }

    Ok(AssemblyLine {
        line_number,
        label,
        statement,
    })
}

fn parse_statement(stream: &mut TokenStream, line: usize) -> Result<Statement, AssemblerError> {
    match stream.consume().map(|t| t.token_type) {
        Some(TokenType::Identifier(word)) => {
            let mnemonic = Mnemonic::from_str(&word).map_err(|e| syntax_error(line, e.to_string()))?;
            let operand = parse_operand(stream, line)?;
            Ok(Statement::Instruction { mnemonic, operand })
        }
        Some(TokenType::Directive(name)) => {
            let values = parse_value_list(stream, line)?;
            match name.as_str() {
                "BYTE" => Ok(Statement::Bytes(values)),
                "WORD" => Ok(Statement::Words(values)),
                _ => Err(syntax_error(line, format!("unknown directive '.{}'", name))),
            }
        }
        other => Err(syntax_error(
            line,
            format!("expected a mnemonic or directive, found {:?}", other),
        )),
    }
}

fn parse_value(stream: &mut TokenStream, line: usize) -> Result<Value, AssemblerError> {
    match stream.consume().map(|t| t.token_type) {
        Some(TokenType::Number { value, zero_page }) => Ok(Value::Number { value, zero_page }),
        Some(TokenType::Identifier(name)) => Ok(Value::Label(name)),
        other => Err(syntax_error(
            line,
            format!("expected a number or label, found {:?}", other),
        )),
    }
}

fn parse_value_list(stream: &mut TokenStream, line: usize) -> Result<Vec<Value>, AssemblerError> {
    let mut values = vec![parse_value(stream, line)?];
    while matches!(stream.peek().map(|t| &t.token_type), Some(TokenType::Comma)) {
        stream.consume();
        values.push(parse_value(stream, line)?);
    }
    Ok(values)
}

/// Consumes the token if it is the given punctuation.
fn eat(stream: &mut TokenStream, expected: &TokenType) -> bool {
    if stream.peek().map(|t| &t.token_type) == Some(expected) {
        stream.consume();
        true
    } else {
        false
    }
}

/// Consumes `,X` or `,Y` and returns the register letter.
fn parse_index(stream: &mut TokenStream, line: usize) -> Result<Option<char>, AssemblerError> {
    if !eat(stream, &TokenType::Comma) {
        return Ok(None);
    }
    match stream.consume().map(|t| t.token_type) {
        Some(TokenType::Identifier(reg)) if reg == "X" => Ok(Some('X')),
        Some(TokenType::Identifier(reg)) if reg == "Y" => Ok(Some('Y')),
        _ => Err(syntax_error(line, "expected X or Y after ','")),
    }
}

fn parse_operand(stream: &mut TokenStream, line: usize) -> Result<OperandSyntax, AssemblerError> {
    if at_line_end(stream) {
        return Ok(OperandSyntax::None);
    }

    if eat(stream, &TokenType::Hash) {
        return Ok(OperandSyntax::Immediate(parse_value(stream, line)?));
    }

    if eat(stream, &TokenType::LParen) {
        let value = parse_value(stream, line)?;
        match parse_index(stream, line)? {
            Some('X') => {
                if !eat(stream, &TokenType::RParen) {
                    return Err(syntax_error(line, "expected ')' after ',X'"));
                }
                return Ok(OperandSyntax::IndirectX(value));
            }
            Some(_) => return Err(syntax_error(line, "only ',X' may appear inside parentheses")),
            None => {}
        }
        if !eat(stream, &TokenType::RParen) {
            return Err(syntax_error(line, "expected ')'"));
        }
        return match parse_index(stream, line)? {
            None => Ok(OperandSyntax::Indirect(value)),
            Some('Y') => Ok(OperandSyntax::IndirectY(value)),
            Some(_) => Err(syntax_error(line, "only ',Y' may follow an indirect operand")),
        };
    }

    let value = parse_value(stream, line)?;
    if value == Value::Label("A".to_string()) && at_line_end(stream) {
        return Ok(OperandSyntax::Accumulator);
    }
    match parse_index(stream, line)? {
        None => Ok(OperandSyntax::Direct(value)),
        Some('X') => Ok(OperandSyntax::IndexedX(value)),
        Some(_) => Ok(OperandSyntax::IndexedY(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::lexer::tokenize;

    fn parse_source(source: &str) -> Vec<AssemblyLine> {
        parse(tokenize(source).unwrap()).unwrap()
    }

    fn operand_of(source: &str) -> OperandSyntax {
        match parse_source(source).remove(0).statement {
            Some(Statement::Instruction { operand, .. }) => operand,
            other => panic!("not an instruction: {:?}", other),
        }
    }

    fn zp(value: u16) -> Value {
        Value::Number {
            value,
            zero_page: true,
        }
    }

    #[test]
    fn test_parse_number_hex() {
        assert_eq!(parse_number("$FF").unwrap(), (255, true));
        assert_eq!(parse_number("$42").unwrap(), (66, true));
        assert_eq!(parse_number("$00FF").unwrap(), (255, false));
        assert_eq!(parse_number("$1234").unwrap(), (0x1234, false));
    }

    #[test]
    fn test_parse_number_decimal() {
        assert_eq!(parse_number("255").unwrap(), (255, true));
        assert_eq!(parse_number("1234").unwrap(), (1234, false));
    }

    #[test]
    fn test_parse_number_binary() {
        assert_eq!(parse_number("%11111111").unwrap(), (255, true));
        assert_eq!(parse_number("%00000001").unwrap(), (1, true));
    }

    #[test]
    fn test_parse_number_invalid() {
        assert!(parse_number("$XY").is_err());
        assert!(parse_number("%202").is_err());
        assert!(parse_number("ABC").is_err());
        assert!(parse_number("$").is_err());
        assert!(parse_number("$10000").is_err());
    }

    #[test]
    fn test_operand_syntax() {
        assert_eq!(operand_of("NOP"), OperandSyntax::None);
        assert_eq!(operand_of("ASL A"), OperandSyntax::Accumulator);
        assert_eq!(operand_of("LDA #$10"), OperandSyntax::Immediate(zp(0x10)));
        assert_eq!(operand_of("LDA $10,X"), OperandSyntax::IndexedX(zp(0x10)));
        assert_eq!(operand_of("LDX $10,Y"), OperandSyntax::IndexedY(zp(0x10)));
        assert_eq!(operand_of("LDA ($10,X)"), OperandSyntax::IndirectX(zp(0x10)));
        assert_eq!(operand_of("LDA ($10),Y"), OperandSyntax::IndirectY(zp(0x10)));
        assert_eq!(
            operand_of("JMP (vector)"),
            OperandSyntax::Indirect(Value::Label("VECTOR".to_string()))
        );
    }

    #[test]
    fn test_label_and_comment() {
        let lines = parse_source("start: LDA #1 ; hi\n\n; only a comment\nend:");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].label.as_deref(), Some("START"));
        assert!(lines[0].statement.is_some());
        assert_eq!(lines[1].statement, None);
        assert_eq!(lines[2].line_number, 3);
        assert_eq!(lines[3].label.as_deref(), Some("END"));
    }

    #[test]
    fn test_directives() {
        let lines = parse_source(".byte $01, 2\n.word label");
        assert_eq!(
            lines[0].statement,
            Some(Statement::Bytes(vec![zp(1), zp(2)]))
        );
        assert_eq!(
            lines[1].statement,
            Some(Statement::Words(vec![Value::Label("LABEL".to_string())]))
        );
    }

    #[test]
    fn test_syntax_errors_are_collected() {
        let errors = parse(tokenize("FOO\nLDA ($10,Y)\nLDA #").unwrap()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.iter().map(|e| e.line).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
