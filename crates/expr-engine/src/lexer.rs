use crate::locale::{format_message, resolve_locale, LocaleTable};
use serde::{Serialize, Serializer};

/// Half-open `[start, end)` byte span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {start} after end {end}");
        Self { start, end }
    }
}

impl Serialize for SourceRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub value: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Boolean,
    Null,
    This,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    QuestionDot,
    Question,
    Ellipsis,
    Arrow,
    Assign,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Bang,
    Tilde,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    UShr,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    QuestionQuestion,
    Eof,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LexError {
    #[error("{message}")]
    UnexpectedCharacter { ch: char, pos: usize, message: String },
    #[error("{message}")]
    UnterminatedString { pos: usize, message: String },
    #[error("{message}")]
    InvalidEscape { pos: usize, message: String },
    #[error("{message}")]
    MultipleDecimalPoint { pos: usize, message: String },
}

impl LexError {
    pub fn pos(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { pos, .. }
            | LexError::UnterminatedString { pos, .. }
            | LexError::InvalidEscape { pos, .. }
            | LexError::MultipleDecimalPoint { pos, .. } => *pos,
        }
    }
}

// Longest first, so a linear scan is maximal munch.
const SYMBOLS: &[(&str, TokenKind)] = &[
    (">>>", TokenKind::UShr),
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::NotEqEq),
    ("...", TokenKind::Ellipsis),
    ("**", TokenKind::StarStar),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("??", TokenKind::QuestionQuestion),
    ("?.", TokenKind::QuestionDot),
    ("=>", TokenKind::Arrow),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    (".", TokenKind::Dot),
    ("?", TokenKind::Question),
    ("=", TokenKind::Assign),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("!", TokenKind::Bang),
    ("~", TokenKind::Tilde),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
];

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    tokenize_with_locale(input, resolve_locale(None))
}

pub fn tokenize_with_locale(input: &str, locale: &LocaleTable) -> Result<Vec<Token>, LexError> {
    let mut scanner = Scanner {
        input,
        chars: input.char_indices().collect(),
        index: 0,
        locale,
    };
    let mut tokens = Vec::new();

    while let Some(ch) = scanner.current() {
        if ch.is_whitespace() {
            scanner.index += 1;
            continue;
        }

        if is_identifier_start(ch) {
            tokens.push(scanner.consume_identifier());
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && scanner.peek(1).is_some_and(|next| next.is_ascii_digit())) {
            tokens.push(scanner.consume_number()?);
            continue;
        }

        if ch == '\'' || ch == '"' {
            tokens.push(scanner.consume_string()?);
            continue;
        }

        tokens.push(scanner.consume_symbol()?);
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        value: String::new(),
        range: SourceRange::new(input.len(), input.len()),
    });

    tracing::debug!(tokens = tokens.len(), "tokenized expression");
    Ok(tokens)
}

struct Scanner<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    locale: &'a LocaleTable,
}

impl Scanner<'_> {
    fn current(&self) -> Option<char> {
        self.peek(0)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).map(|(_, ch)| *ch)
    }

    fn offset(&self, index: usize) -> usize {
        self.chars.get(index).map_or(self.input.len(), |(offset, _)| *offset)
    }

    fn token(&self, kind: TokenKind, start: usize, value: String) -> Token {
        Token {
            kind,
            value,
            range: SourceRange::new(self.offset(start), self.offset(self.index)),
        }
    }

    fn consume_digits(&mut self) {
        while self.current().is_some_and(|ch| ch.is_ascii_digit()) {
            self.index += 1;
        }
    }

    fn consume_identifier(&mut self) -> Token {
        let start = self.index;
        self.index += 1;
        while self.current().is_some_and(is_identifier_part) {
            self.index += 1;
        }
        let value = self.input[self.offset(start)..self.offset(self.index)].to_string();
        let kind = match value.as_str() {
            "true" | "false" => TokenKind::Boolean,
            "null" => TokenKind::Null,
            "this" => TokenKind::This,
            _ => TokenKind::Identifier,
        };
        self.token(kind, start, value)
    }

    fn consume_number(&mut self) -> Result<Token, LexError> {
        let start = self.index;
        self.consume_digits();

        if self.current() == Some('.') && self.peek(1).is_some_and(|ch| ch.is_ascii_digit()) {
            self.index += 1;
            self.consume_digits();
            if self.current() == Some('.') && self.peek(1).is_some_and(|ch| ch.is_ascii_digit()) {
                let pos = self.offset(self.index);
                return Err(LexError::MultipleDecimalPoint {
                    pos,
                    message: format_message(self.locale.multiple_decimal_point, &[&pos]),
                });
            }
        }

        if matches!(self.current(), Some('e' | 'E')) {
            let digit_at = if matches!(self.peek(1), Some('+' | '-')) { 2 } else { 1 };
            if self.peek(digit_at).is_some_and(|ch| ch.is_ascii_digit()) {
                self.index += digit_at;
                self.consume_digits();
            }
        }

        let value = self.input[self.offset(start)..self.offset(self.index)].to_string();
        Ok(self.token(TokenKind::Number, start, value))
    }

    fn consume_string(&mut self) -> Result<Token, LexError> {
        let start = self.index;
        let pos = self.offset(start);
        let quote = self.chars[start].1;
        self.index += 1;
        let mut out = String::new();

        loop {
            let Some(current) = self.current() else {
                return Err(LexError::UnterminatedString {
                    pos,
                    message: format_message(self.locale.unterminated_string, &[&pos]),
                });
            };
            self.index += 1;
            if current == quote {
                break;
            }
            if current == '\\' {
                out.push(self.decode_escape(pos)?);
                continue;
            }
            out.push(current);
        }

        Ok(self.token(TokenKind::String, start, out))
    }

    // Called with `index` just past the backslash.
    fn decode_escape(&mut self, string_pos: usize) -> Result<char, LexError> {
        let escape_pos = self.offset(self.index - 1);
        let Some(escaped) = self.current() else {
            return Err(LexError::UnterminatedString {
                pos: string_pos,
                message: format_message(self.locale.unterminated_string, &[&string_pos]),
            });
        };
        self.index += 1;
        let decoded = match escaped {
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'v' => Some('\u{b}'),
            '0' => Some('\0'),
            '\\' | '\'' | '"' => Some(escaped),
            'u' => self.decode_unicode_escape(),
            _ => None,
        };
        decoded.ok_or_else(|| LexError::InvalidEscape {
            pos: escape_pos,
            message: format_message(self.locale.invalid_escape, &[&escape_pos]),
        })
    }

    fn decode_unicode_escape(&mut self) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self.current()?.to_digit(16)?;
            code = code * 16 + digit;
            self.index += 1;
        }
        char::from_u32(code)
    }

    fn consume_symbol(&mut self) -> Result<Token, LexError> {
        let start = self.index;
        let pos = self.offset(start);
        let rest = &self.input[pos..];
        let matched = SYMBOLS.iter().find(|(text, kind)| {
            // `a?.5:1` is a conditional, not optional chaining.
            rest.starts_with(text)
                && !(*kind == TokenKind::QuestionDot
                    && rest[2..].chars().next().is_some_and(|ch| ch.is_ascii_digit()))
        });

        let Some((text, kind)) = matched else {
            let ch = self.chars[start].1;
            return Err(LexError::UnexpectedCharacter {
                ch,
                pos,
                message: format_message(self.locale.unexpected_token, &[&ch, &pos]),
            });
        };
        // Every symbol is ASCII, so its byte length equals its char count.
        self.index += text.len();
        Ok(self.token(*kind, start, (*text).to_string()))
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
#[path = "lexer_test.rs"]
mod tests;
