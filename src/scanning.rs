use crate::settings::Settings;
use log::trace;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Radix {
    binary,
    octal,
    decimal,
    hexadecimal,
}

impl Radix {
    pub fn base(self) -> u32 {
        use Radix::*;
        match self {
            binary => 2,
            octal => 8,
            decimal => 10,
            hexadecimal => 16,
        }
    }

    fn accepts(self, byte: u8) -> bool {
        char::from(byte).is_digit(self.base())
    }

    /// Length of the literal prefix (`0x`, `0o`, `0b`) in front of the digits.
    pub fn prefix_len(self) -> usize {
        match self {
            Radix::decimal => 0,
            _ => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    number(Radix),
    identifier,
    add,
    sub,
    mul,
    div,
    modulo,
    pow,
    less_than,
    less_equals,
    greater_than,
    greater_equals,
    equals,
    assign,
    comma,
    open_paren,
    close_paren,
    end_of_file,
    error,
}

/// A typed token whose lexeme borrows straight from the scanned text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub offset: usize,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, lexeme: &'src str, offset: usize) -> Self {
        Self{kind, lexeme, offset}
    }

    fn end_of_file(offset: usize) -> Self {
        Self::new(TokenKind::end_of_file, "", offset)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme)
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n')
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_identifier_continue(byte: u8, alphanumeric: bool) -> bool {
    is_identifier_start(byte) || (alphanumeric && byte.is_ascii_digit())
}

fn count<P: Fn(u8) -> bool>(bytes: &[u8], predicate: P) -> usize {
    bytes.iter().take_while(|byte| predicate(**byte)).count()
}

/// Measures the number literal at the front of `bytes`, which starts with a
/// decimal digit. `None` means a base prefix with no digits behind it.
fn scan_number(bytes: &[u8]) -> Option<(Radix, usize)> {
    let prefixed = match (bytes.first(), bytes.get(1)) {
        (Some(b'0'), Some(b'x')) => Some(Radix::hexadecimal),
        (Some(b'0'), Some(b'o')) => Some(Radix::octal),
        (Some(b'0'), Some(b'b')) => Some(Radix::binary),
        _ => None,
    };

    if let Some(radix) = prefixed {
        let digits = count(&bytes[2..], |byte| radix.accepts(byte));
        return (digits > 0).then_some((radix, 2 + digits));
    }

    let mut length = count(bytes, |byte| byte.is_ascii_digit());
    if bytes.get(length) == Some(&b'.') {
        length += 1;
        length += count(&bytes[length..], |byte| byte.is_ascii_digit());
    }
    if bytes.get(length) == Some(&b'e') {
        let sign = usize::from(bytes.get(length + 1) == Some(&b'-'));
        let digits = count(&bytes[length + 1 + sign..], |byte| byte.is_ascii_digit());
        // a bare `e` is left for the identifier that follows
        if digits > 0 {
            length += 1 + sign + digits;
        }
    }
    Some((Radix::decimal, length))
}

/// Scans one token starting at `cursor` and moves `cursor` past it.
///
/// Returns `end_of_file` once the text is exhausted. An unrecognized
/// character yields an `error` token spanning everything left, and the
/// cursor jumps to the end.
pub fn next_token<'src>(source: &'src str, cursor: &mut usize, alphanumeric: bool) -> Token<'src> {
    use TokenKind::*;

    let bytes = source.as_bytes();
    *cursor += count(&bytes[*cursor..], is_whitespace);

    let start = *cursor;
    let Some(&first) = bytes.get(start) else {
        return Token::end_of_file(start);
    };
    let next = bytes.get(start + 1).copied();
    let rest = bytes.len() - start;

    let (kind, length) = match first {
        b'+' => (add, 1),
        b'-' => (sub, 1),
        b'*' if next == Some(b'*') => (pow, 2),
        b'*' => (mul, 1),
        b'/' => (div, 1),
        b'%' => (modulo, 1),
        b'^' => (pow, 1),
        b',' => (comma, 1),
        b'(' => (open_paren, 1),
        b')' => (close_paren, 1),
        b'<' if next == Some(b'=') => (less_equals, 2),
        b'<' => (less_than, 1),
        b'>' if next == Some(b'=') => (greater_equals, 2),
        b'>' => (greater_than, 1),
        b'=' if next == Some(b'=') => (equals, 2),
        b'=' => (assign, 1),
        b'0'..=b'9' => match scan_number(&bytes[start..]) {
            Some((radix, length)) => (number(radix), length),
            None => (error, rest),
        },
        byte if is_identifier_start(byte) => {
            (identifier, count(&bytes[start..], |byte| is_identifier_continue(byte, alphanumeric)))
        },
        _ => (error, rest),
    };

    *cursor = start + length;
    let token = Token::new(kind, &source[start..start + length], start);
    trace!("scanned {:?} '{}' at {}", token.kind, token.lexeme, token.offset);
    token
}

/// Scans the whole text, stopping after the first `error` token.
/// The trailing `end_of_file` is not included.
pub fn tokenize<'src>(source: &'src str, settings: &Settings) -> Vec<Token<'src>> {
    let mut cursor = 0;
    let mut tokens = Vec::new();
    loop {
        let token = next_token(source, &mut cursor, settings.alphanumeric_identifiers);
        match token.kind {
            TokenKind::end_of_file => break,
            TokenKind::error => {
                tokens.push(token);
                break;
            },
            _ => tokens.push(token),
        }
    }
    tokens
}

pub trait Scanner<'src> {
    fn get_current(&self) -> Token<'src>;
    fn peek(&self) -> Token<'src>;
    fn advance(&mut self);
    fn is_valid(&self) -> bool;
}

/// Replays tokens that were scanned up front.
pub struct SimpleScanner<'src> {
    tokens: Vec<Token<'src>>,
    index: usize,
}

impl<'src> SimpleScanner<'src> {
    pub fn new(tokens: Vec<Token<'src>>) -> Self {
        Self{tokens, index: 0}
    }

    fn token_at(&self, index: usize) -> Token<'src> {
        match self.tokens.get(index) {
            Some(token) => *token,
            None => {
                let end = self.tokens.last().map_or(0, |token| token.offset + token.lexeme.len());
                Token::end_of_file(end)
            },
        }
    }
}

impl<'src> Scanner<'src> for SimpleScanner<'src> {
    fn get_current(&self) -> Token<'src> {
        self.token_at(self.index)
    }

    fn peek(&self) -> Token<'src> {
        self.token_at(self.index + 1)
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    fn is_valid(&self) -> bool {
        self.index != self.tokens.len()
    }
}

/// Scans lazily over the source text, one token at a time.
pub struct StringScanner<'src> {
    source: &'src str,
    cursor: usize,
    token: Token<'src>,
    alphanumeric: bool,
}

impl<'src> StringScanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_settings(source, &Settings::default())
    }

    pub fn with_settings(source: &'src str, settings: &Settings) -> Self {
        let mut scanner = Self {
            source,
            cursor: 0,
            token: Token::end_of_file(0),
            alphanumeric: settings.alphanumeric_identifiers,
        };
        scanner.advance();
        scanner
    }

    pub fn is_empty(&self) -> bool {
        self.source.bytes().all(is_whitespace)
    }
}

impl<'src> Scanner<'src> for StringScanner<'src> {
    fn get_current(&self) -> Token<'src> {
        self.token
    }

    fn peek(&self) -> Token<'src> {
        let mut cursor = self.cursor;
        next_token(self.source, &mut cursor, self.alphanumeric)
    }

    fn advance(&mut self) {
        self.token = next_token(self.source, &mut self.cursor, self.alphanumeric);
    }

    fn is_valid(&self) -> bool {
        self.token.kind != TokenKind::end_of_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, &Settings::default()).iter().map(|token| token.kind).collect()
    }

    fn lexemes(source: &str) -> Vec<&str> {
        tokenize(source, &Settings::default()).iter().map(|token| token.lexeme).collect()
    }

    #[test]
    fn scans_operators_with_lookahead() {
        use TokenKind::*;
        assert_eq!(
            kinds("< <= > >= = == * ** ^ % / + - , ( )"),
            vec![
                less_than, less_equals, greater_than, greater_equals, assign, equals,
                mul, pow, pow, modulo, div, add, sub, comma, open_paren, close_paren,
            ]
        );
    }

    #[test]
    fn lookahead_stops_at_the_end() {
        assert_eq!(kinds("<"), vec![TokenKind::less_than]);
        assert_eq!(kinds("*"), vec![TokenKind::mul]);
        assert_eq!(kinds("="), vec![TokenKind::assign]);
    }

    #[test]
    fn scans_numbers_in_every_base() {
        use Radix::*;
        use TokenKind::number;
        assert_eq!(
            kinds("0x1A 0o17 0b101 42 3.25 1e-3 2.5e10"),
            vec![
                number(hexadecimal), number(octal), number(binary),
                number(decimal), number(decimal), number(decimal), number(decimal),
            ]
        );
        assert_eq!(lexemes("0xfF 1.e5 7."), vec!["0xfF", "1.e5", "7."]);
    }

    #[test]
    fn prefixed_numbers_stop_at_foreign_digits() {
        assert_eq!(lexemes("0b102"), vec!["0b10", "2"]);
        assert_eq!(lexemes("0o19"), vec!["0o1", "9"]);
    }

    #[test]
    fn prefixed_numbers_reject_fractions() {
        let tokens = tokenize("0x1.5", &Settings::default());
        assert_eq!(tokens[0].lexeme, "0x1");
        assert_eq!(tokens[1].kind, TokenKind::error);
        assert_eq!(tokens[1].lexeme, ".5");
    }

    #[test]
    fn prefix_without_digits_is_an_error() {
        assert_eq!(kinds("0x + 1"), vec![TokenKind::error]);
    }

    #[test]
    fn bare_exponent_marker_is_left_alone() {
        assert_eq!(lexemes("2e"), vec!["2", "e"]);
        assert_eq!(lexemes("2e-"), vec!["2", "e", "-"]);
    }

    #[test]
    fn identifiers_exclude_digits_by_default() {
        assert_eq!(lexemes("sqrt16 half_pi"), vec!["sqrt", "16", "half_pi"]);

        let settings = Settings{alphanumeric_identifiers: true, ..Settings::default()};
        let tokens = tokenize("log2e sqrt3", &settings);
        assert_eq!(tokens.iter().map(|token| token.lexeme).collect::<Vec<_>>(), vec!["log2e", "sqrt3"]);
    }

    #[test]
    fn error_spans_the_remaining_input() {
        let mut cursor = 0;
        let source = "1 + $x";
        next_token(source, &mut cursor, false);
        next_token(source, &mut cursor, false);
        let error = next_token(source, &mut cursor, false);
        assert_eq!(error, Token::new(TokenKind::error, "$x", 4));
        assert_eq!(cursor, source.len());
        assert_eq!(next_token(source, &mut cursor, false).kind, TokenKind::end_of_file);
    }

    #[test]
    fn whitespace_is_skipped() {
        let mut cursor = 0;
        assert_eq!(next_token(" \t\n ", &mut cursor, false).kind, TokenKind::end_of_file);
        assert_eq!(kinds("\t1\n+ 2 "), vec![TokenKind::number(Radix::decimal), TokenKind::add, TokenKind::number(Radix::decimal)]);
    }

    #[test]
    fn string_scanner_peeks_without_advancing() {
        let mut scanner = StringScanner::new("sin 2");
        assert_eq!(scanner.get_current().lexeme, "sin");
        assert_eq!(scanner.peek().lexeme, "2");
        assert_eq!(scanner.get_current().lexeme, "sin");
        scanner.advance();
        assert_eq!(scanner.get_current().lexeme, "2");
        scanner.advance();
        assert!(!scanner.is_valid());
        assert!(StringScanner::new("  ").is_empty());
    }

    #[test]
    fn simple_scanner_replays_tokens() {
        let mut scanner = SimpleScanner::new(tokenize("(1)", &Settings::default()));
        assert_eq!(scanner.peek().kind, TokenKind::number(Radix::decimal));
        scanner.advance();
        scanner.advance();
        assert_eq!(scanner.get_current().kind, TokenKind::close_paren);
        assert_eq!(scanner.peek(), Token::end_of_file(3));
        scanner.advance();
        assert!(!scanner.is_valid());
    }
}
