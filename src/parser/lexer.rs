//! Lexer (tokenizer) for Go source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Go terminates statements with newlines, so the lexer inserts a
//! [`TokenKind::Semicolon`] at a line break (or at end of input) whenever the
//! previous token could end a statement: identifiers, literals, `break`,
//! `continue`, `fallthrough`, `return`, `++`, `--`, `)`, `]` and `}`.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    CharLiteral(char),

    // Identifiers
    Ident(String),

    // Keywords
    Package,
    Import,
    Func,
    Var,
    Const,
    Type,
    Return,
    If,
    Else,
    For,
    Range,
    Break,
    Continue,
    Map,
    Struct,
    Interface,
    Chan,
    Switch,
    Select,
    Case,
    Default,
    Defer,
    Go,
    Goto,
    Fallthrough,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,      // &
    Pipe,     // |
    Caret,    // ^
    AmpCaret, // &^
    LtLt,     // <<
    GtGt,     // >>

    // Assignment
    Eq,               // =
    Define,           // :=
    OpAssign(String), // +=, -=, <<=, &^= ...

    // Increment/Decrement
    PlusPlus,   // ++
    MinusMinus, // --

    // Channels
    Arrow, // <-

    // Punctuation
    Dot,       // .
    Ellipsis,  // ...
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ; (explicit or inserted at a newline)
    Comma,     // ,
    Colon,     // :

    // End of file
    Eof,
}

impl TokenKind {
    /// Whether a newline after this token terminates the statement
    fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral(_)
                | TokenKind::FloatLiteral(_)
                | TokenKind::StringLiteral(_)
                | TokenKind::CharLiteral(_)
                | TokenKind::Ident(_)
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLiteral(n) => write!(f, "int literal {}", n),
            TokenKind::FloatLiteral(n) => write!(f, "float literal {}", n),
            TokenKind::StringLiteral(s) => write!(f, "string literal {:?}", s),
            TokenKind::CharLiteral(c) => write!(f, "rune literal {:?}", c),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Package => write!(f, "'package'"),
            TokenKind::Import => write!(f, "'import'"),
            TokenKind::Func => write!(f, "'func'"),
            TokenKind::Var => write!(f, "'var'"),
            TokenKind::Const => write!(f, "'const'"),
            TokenKind::Type => write!(f, "'type'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::For => write!(f, "'for'"),
            TokenKind::Range => write!(f, "'range'"),
            TokenKind::Break => write!(f, "'break'"),
            TokenKind::Continue => write!(f, "'continue'"),
            TokenKind::Map => write!(f, "'map'"),
            TokenKind::Struct => write!(f, "'struct'"),
            TokenKind::Interface => write!(f, "'interface'"),
            TokenKind::Chan => write!(f, "'chan'"),
            TokenKind::Switch => write!(f, "'switch'"),
            TokenKind::Select => write!(f, "'select'"),
            TokenKind::Case => write!(f, "'case'"),
            TokenKind::Default => write!(f, "'default'"),
            TokenKind::Defer => write!(f, "'defer'"),
            TokenKind::Go => write!(f, "'go'"),
            TokenKind::Goto => write!(f, "'goto'"),
            TokenKind::Fallthrough => write!(f, "'fallthrough'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::AmpCaret => write!(f, "'&^'"),
            TokenKind::LtLt => write!(f, "'<<'"),
            TokenKind::GtGt => write!(f, "'>>'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Define => write!(f, "':='"),
            TokenKind::OpAssign(op) => write!(f, "'{}'", op),
            TokenKind::PlusPlus => write!(f, "'++'"),
            TokenKind::MinusMinus => write!(f, "'--'"),
            TokenKind::Arrow => write!(f, "'<-'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Ellipsis => write!(f, "'...'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A token together with where it starts in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Token { kind, location }
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for Go source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            let before = self.current_location();
            let crossed_newline = self.skip_whitespace_and_comments()?;
            let needs_semicolon = tokens.last().is_some_and(|t| t.kind.ends_statement());

            if self.is_at_end() {
                if needs_semicolon {
                    tokens.push(Token::new(TokenKind::Semicolon, before));
                }
                tokens.push(Token::new(TokenKind::Eof, self.current_location()));
                break;
            }

            if crossed_newline && needs_semicolon {
                tokens.push(Token::new(TokenKind::Semicolon, before));
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        let kind = match ch {
            '"' => TokenKind::StringLiteral(self.string_literal(loc)?),
            '`' => TokenKind::StringLiteral(self.raw_string_literal(loc)?),
            '\'' => TokenKind::CharLiteral(self.char_literal(loc)?),
            '0'..='9' => self.number_literal(ch, loc)?,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)?
            }
            c if c.is_alphabetic() || c == '_' => self.identifier_or_keyword(c),

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::OpAssign("+=".to_string())
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::OpAssign("-=".to_string())
                } else {
                    TokenKind::Minus
                }
            }
            '*' => self.with_assign(TokenKind::Star, "*="),
            '/' => self.with_assign(TokenKind::Slash, "/="),
            '%' => self.with_assign(TokenKind::Percent, "%="),
            '^' => self.with_assign(TokenKind::Caret, "^="),
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Le
                } else if self.eat('<') {
                    self.with_assign(TokenKind::LtLt, "<<=")
                } else if self.eat('-') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Ge
                } else if self.eat('>') {
                    self.with_assign(TokenKind::GtGt, ">>=")
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else if self.eat('^') {
                    self.with_assign(TokenKind::AmpCaret, "&^=")
                } else {
                    self.with_assign(TokenKind::Amp, "&=")
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    self.with_assign(TokenKind::Pipe, "|=")
                }
            }
            ':' => {
                if self.eat('=') {
                    TokenKind::Define
                } else {
                    TokenKind::Colon
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                return Err(LexError {
                    message: format!("Unexpected character: '{}'", ch),
                    location: loc,
                })
            }
        };

        Ok(Token::new(kind, loc))
    }

    /// `op` or its `op=` form
    fn with_assign(&mut self, plain: TokenKind, assign: &str) -> TokenKind {
        if self.eat('=') {
            TokenKind::OpAssign(assign.to_string())
        } else {
            plain
        }
    }

    /// Interpreted string literal; the opening quote is already consumed
    fn string_literal(&mut self, loc: SourceLocation) -> Result<String, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(string);
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    string.push(self.escape_sequence('"')?);
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Raw string literal; carriage returns are discarded like the Go compiler does
    fn raw_string_literal(&mut self, loc: SourceLocation) -> Result<String, LexError> {
        let mut string = String::new();
        while let Some(ch) = self.advance() {
            match ch {
                '`' => return Ok(string),
                '\r' => {}
                _ => string.push(ch),
            }
        }
        Err(LexError {
            message: "Unterminated raw string literal".to_string(),
            location: loc,
        })
    }

    /// Rune literal; the opening quote is already consumed
    fn char_literal(&mut self, loc: SourceLocation) -> Result<char, LexError> {
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in rune literal".to_string(),
            location: loc,
        })?;

        let value = match ch {
            '\\' => self.escape_sequence('\'')?,
            '\'' | '\n' => {
                return Err(LexError {
                    message: "Empty rune literal".to_string(),
                    location: loc,
                })
            }
            c => c,
        };

        if !self.eat('\'') {
            return Err(LexError {
                message: "Expected closing quote in rune literal".to_string(),
                location: self.current_location(),
            });
        }

        Ok(value)
    }

    /// Decode the escape after a backslash. `quote` is the delimiter that may be escaped.
    fn escape_sequence(&mut self, quote: char) -> Result<char, LexError> {
        let loc = self.current_location();
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in escape sequence".to_string(),
            location: loc,
        })?;

        let value = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            '\\' => '\\',
            c if c == quote => c,
            'x' => self.hex_escape(2, loc)?,
            'u' => self.hex_escape(4, loc)?,
            'U' => self.hex_escape(8, loc)?,
            '0'..='7' => {
                let mut digits = String::from(escaped);
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(d);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                u32::from_str_radix(&digits, 8)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| LexError {
                        message: format!("Invalid octal escape: \\{}", digits),
                        location: loc,
                    })?
            }
            _ => {
                return Err(LexError {
                    message: format!("Unknown escape sequence: \\{}", escaped),
                    location: loc,
                });
            }
        };
        Ok(value)
    }

    fn hex_escape(&mut self, len: usize, loc: SourceLocation) -> Result<char, LexError> {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            match self.advance() {
                Some(d) if d.is_ascii_hexdigit() => digits.push(d),
                _ => {
                    return Err(LexError {
                        message: "Incomplete hex escape sequence".to_string(),
                        location: loc,
                    })
                }
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexError {
                message: format!("Invalid escape value: {}", digits),
                location: loc,
            })
    }

    /// Parse numeric literal (ints in any Go base, decimal floats)
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut text = String::new();
        text.push(first);

        let radix = if first == '0' {
            match self.peek() {
                Some('x') | Some('X') => Some(16),
                Some('o') | Some('O') => Some(8),
                Some('b') | Some('B') => Some(2),
                _ => None,
            }
        } else {
            None
        };

        if let Some(radix) = radix {
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.peek() {
                if ch.is_digit(radix) {
                    digits.push(ch);
                } else if ch != '_' {
                    break;
                }
                self.advance();
            }
            return i64::from_str_radix(&digits, radix)
                .map(TokenKind::IntLiteral)
                .map_err(|_| LexError {
                    message: format!("Invalid integer literal: {}{}", text, digits),
                    location: loc,
                });
        }

        let mut is_float = first == '.';
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
            } else if ch == '_' {
                // digit separator
            } else if ch == '.' && !is_float && self.peek_ahead(1) != Some('.') {
                is_float = true;
                text.push(ch);
            } else if ch == 'e' || ch == 'E' {
                is_float = true;
                text.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    text.push(sign);
                    self.advance();
                }
                continue;
            } else {
                break;
            }
            self.advance();
        }

        if is_float {
            return text
                .parse::<f64>()
                .map(TokenKind::FloatLiteral)
                .map_err(|_| LexError {
                    message: format!("Invalid float literal: {}", text),
                    location: loc,
                });
        }

        // A leading zero means octal, as in `0755`
        let parsed = if text.len() > 1 && text.starts_with('0') {
            i64::from_str_radix(&text[1..], 8)
        } else {
            text.parse::<i64>()
        };

        parsed.map(TokenKind::IntLiteral).map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", text),
            location: loc,
        })
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "package" => TokenKind::Package,
            "import" => TokenKind::Import,
            "func" => TokenKind::Func,
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "type" => TokenKind::Type,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "range" => TokenKind::Range,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "map" => TokenKind::Map,
            "struct" => TokenKind::Struct,
            "interface" => TokenKind::Interface,
            "chan" => TokenKind::Chan,
            "switch" => TokenKind::Switch,
            "select" => TokenKind::Select,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "defer" => TokenKind::Defer,
            "go" => TokenKind::Go,
            "goto" => TokenKind::Goto,
            "fallthrough" => TokenKind::Fallthrough,
            _ => TokenKind::Ident(ident),
        }
    }

    /// Skip whitespace and comments. Returns true if a line break was crossed.
    fn skip_whitespace_and_comments(&mut self) -> Result<bool, LexError> {
        let mut crossed_newline = false;
        loop {
            match self.peek() {
                Some('\n') => {
                    crossed_newline = true;
                    self.advance();
                }
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    self.skip_line_comment();
                    crossed_newline = true;
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    if self.skip_block_comment()? {
                        crossed_newline = true;
                    }
                }
                _ => break,
            }
        }
        Ok(crossed_newline)
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */). Returns true if it spans lines.
    fn skip_block_comment(&mut self) -> Result<bool, LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        let mut spans_lines = false;
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(spans_lines);
            }
            if self.advance() == Some('\n') {
                spans_lines = true;
            }
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Consume `expected` if it is next
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
