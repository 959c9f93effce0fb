//! Tokenizer for LM source text

use super::error::{Location, ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain identifier; keywords are identifiers recognised by the parser
    Ident(String),
    /// `$`-prefixed marker such as `$PARENT`
    Marker(String),
    Int(i64),
    Str(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semicolon,
    Comma,
    Dot,
    Tilde,
    Equals,
    /// `->`
    Arrow,
    /// `<-`
    LeftArrow,
    /// `<->`
    BothArrow,
    /// `--`
    DoubleDash,
    Eof,
}

impl TokenKind {
    /// Human-readable form used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("identifier '{s}'"),
            TokenKind::Marker(s) => format!("marker '{s}'"),
            TokenKind::Int(n) => format!("integer {n}"),
            TokenKind::Str(s) => format!("string \"{s}\""),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Tilde => "~",
            TokenKind::Equals => "=",
            TokenKind::Arrow => "->",
            TokenKind::LeftArrow => "<-",
            TokenKind::BothArrow => "<->",
            TokenKind::DoubleDash => "--",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Marker(_) => "$marker",
            TokenKind::Int(_) => "integer",
            TokenKind::Str(_) => "string",
            TokenKind::Eof => "end of input",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

pub struct Lexer<'a> {
    source_name: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source_name: &'a str, text: &str) -> Self {
        Self {
            source_name,
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input; the last token is always `Eof`
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let location = self.location();
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location,
                });
                return Ok(tokens);
            };

            let kind = match c {
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                ';' => self.single(TokenKind::Semicolon),
                ',' => self.single(TokenKind::Comma),
                '.' => self.single(TokenKind::Dot),
                '~' => self.single(TokenKind::Tilde),
                '=' => self.single(TokenKind::Equals),
                '"' => self.string(location)?,
                '$' => self.marker(location)?,
                '<' => self.left_arrow(location)?,
                '-' => self.dash(location)?,
                c if c.is_ascii_digit() => self.integer(location, false)?,
                c if is_ident_start(c) => TokenKind::Ident(self.identifier()),
                other => {
                    return Err(self.error(location, format!("unexpected character '{other}'")));
                }
            };
            tokens.push(Token { kind, location });
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, location: Location, reason: String) -> ParseError {
        ParseError::syntax(self.source_name, location, reason, Vec::new())
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    /// Whitespace, `!! line` comments and `/* block */` comments
    fn skip_trivia(&mut self) -> ParseResult<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('!'), Some('!')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.location();
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(self.error(start, "unterminated comment".to_string()));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    fn marker(&mut self, location: Location) -> ParseResult<TokenKind> {
        self.bump();
        match self.peek() {
            Some(c) if is_ident_start(c) => Ok(TokenKind::Marker(format!("${}", self.identifier()))),
            _ => Err(self.error(location, "expected a name after '$'".to_string())),
        }
    }

    fn string(&mut self, location: Location) -> ParseResult<TokenKind> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(TokenKind::Str(text)),
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => text.push(c),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(other) => {
                        return Err(self.error(location, format!("invalid escape '\\{other}'")));
                    }
                    None => return Err(self.error(location, "unterminated string".to_string())),
                },
                Some('\n') | None => {
                    return Err(self.error(location, "unterminated string".to_string()));
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn left_arrow(&mut self, location: Location) -> ParseResult<TokenKind> {
        self.bump();
        if self.peek() != Some('-') {
            return Err(self.error(location, "expected '<-' or '<->'".to_string()));
        }
        self.bump();
        if self.peek() == Some('>') {
            self.bump();
            Ok(TokenKind::BothArrow)
        } else {
            Ok(TokenKind::LeftArrow)
        }
    }

    fn dash(&mut self, location: Location) -> ParseResult<TokenKind> {
        match self.peek_at(1) {
            Some('>') => {
                self.bump();
                self.bump();
                Ok(TokenKind::Arrow)
            }
            Some('-') => {
                self.bump();
                self.bump();
                Ok(TokenKind::DoubleDash)
            }
            Some(c) if c.is_ascii_digit() => {
                self.bump();
                self.integer(location, true)
            }
            _ => Err(self.error(location, "unexpected character '-'".to_string())),
        }
    }

    fn integer(&mut self, location: Location, negative: bool) -> ParseResult<TokenKind> {
        let mut digits = String::new();
        if negative {
            digits.push('-');
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.bump();
            } else {
                break;
            }
        }
        digits
            .parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|e| self.error(location, format!("invalid integer '{digits}': {e}")))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
