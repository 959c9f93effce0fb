//! Recursive-descent parser for LM documents
//!
//! ```text
//! file        := [ "LM" name ";" ] statement* EOF
//! statement   := "VALUEMAP" name "{" ( int "->" qname ";" )* "}"
//!              | "DATA" name "FROM" object "CLASS" qname "{" clause* "}"
//!              | "INSPECTION" name "FROM" object "CLASS" qname "{" clause* "}"
//! target_path := $MARKER | qname
//! ```
//!
//! Keywords are ordinary identifiers recognised by position, so a column may be
//! called `IDENT` without quoting.

use std::path::Path;

use tracing::debug;

use super::error::{Location, ParseError, ParseResult};
use super::lexer::{Lexer, Token, TokenKind};
use super::model::{
    AliasDeclaration, ColumnMapping, ConversionCall, DataDeclaration, InspectionDeclaration,
    JoinDeclaration, LogicalModel, MappingDirection, NestingDeclaration, ValueMap, WithBlock,
};

const STATEMENT_KEYWORDS: &[&str] = &["VALUEMAP", "DATA", "INSPECTION"];

const DATA_CLAUSES: &[&str] = &[
    "DIRECTION",
    "IDENT",
    "WHERE",
    "CONVERSION",
    "ALIAS",
    "WITH",
    "ANNEXE",
    "ANNEXED",
    "JOIN",
    "NESTING",
    "COLUMN",
];

const INSPECTION_CLAUSES: &[&str] = &[
    "DIRECTION",
    "IDENT",
    "PARENT",
    "STRUCTATTR",
    "CLASSCOL",
    "CONVERSION",
    "ALIAS",
    "WITH",
    "COLUMN",
];

/// One top-level statement
#[derive(Debug)]
enum Statement {
    ValueMap(ValueMap, Location),
    Data(DataDeclaration),
    Inspection(InspectionDeclaration),
}

/// One clause inside a DATA or INSPECTION body
#[derive(Debug)]
enum Clause {
    Direction(MappingDirection),
    Ident(String),
    Where(String, String),
    Conversion(ConversionCall),
    Alias(AliasDeclaration),
    With(WithBlock),
    Annexe(String),
    Annexed(String),
    Join(JoinDeclaration),
    Nesting(NestingDeclaration),
    Parent(String),
    StructAttr { column: String, value_map: String },
    ClassColumn { column: String, value_map: String },
    Column(ColumnMapping),
}

/// LM parser entry points
pub struct LmParser;

impl LmParser {
    /// Parse LM source text. `source_name` is used in diagnostics and as the
    /// model name when the text has no `LM name;` header.
    pub fn parse_str(source_name: &str, text: &str) -> ParseResult<LogicalModel> {
        let tokens = Lexer::new(source_name, text).tokenize()?;
        let model = Parser::new(source_name, tokens).parse_file()?;
        debug!(
            model = %model.name,
            value_maps = model.value_maps.len(),
            data = model.data_declarations.len(),
            inspections = model.inspections.len(),
            "Parsed logical model"
        );
        Ok(model)
    }

    /// Read and parse an LM file; the file stem is the fallback model name
    pub fn parse_path(path: impl AsRef<Path>) -> ParseResult<LogicalModel> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse_str(&name, &text)
    }
}

struct Parser<'a> {
    source_name: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source_name: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source_name,
            tokens,
            pos: 0,
        }
    }

    fn parse_file(&mut self) -> ParseResult<LogicalModel> {
        let mut model = LogicalModel::new(self.source_name);

        if self.at_keyword("LM") {
            self.advance();
            model.name = self.expect_ident("model name")?;
            self.expect(TokenKind::Semicolon)?;
        }

        while !self.at_eof() {
            match self.parse_statement()? {
                Statement::ValueMap(vm, location) => {
                    if model.value_maps.contains_key(&vm.name) {
                        return Err(self.error_at(
                            location,
                            format!("duplicate VALUEMAP '{}'", vm.name),
                            Vec::new(),
                        ));
                    }
                    model.value_maps.insert(vm.name.clone(), vm);
                }
                Statement::Data(decl) => model.data_declarations.push(decl),
                Statement::Inspection(decl) => model.inspections.push(decl),
            }
        }
        Ok(model)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self.peek().clone();
        let TokenKind::Ident(keyword) = &token.kind else {
            return Err(self.unexpected(&token, STATEMENT_KEYWORDS));
        };
        match keyword.as_str() {
            "VALUEMAP" => {
                self.advance();
                let vm = self.parse_value_map()?;
                Ok(Statement::ValueMap(vm, token.location))
            }
            "DATA" => {
                self.advance();
                self.parse_data().map(Statement::Data)
            }
            "INSPECTION" => {
                self.advance();
                self.parse_inspection().map(Statement::Inspection)
            }
            _ => Err(self.unexpected(&token, STATEMENT_KEYWORDS)),
        }
    }

    fn parse_value_map(&mut self) -> ParseResult<ValueMap> {
        let mut vm = ValueMap::new(self.expect_ident("VALUEMAP name")?);
        self.expect(TokenKind::LBrace)?;
        while !self.eat(&TokenKind::RBrace) {
            let token = self.peek().clone();
            let code = match &token.kind {
                TokenKind::Int(code) => *code,
                _ => return Err(self.unexpected(&token, &["integer code", "}"])),
            };
            self.advance();
            self.expect(TokenKind::Arrow)?;
            let path = self.parse_qname("mapped path")?;
            self.expect(TokenKind::Semicolon)?;
            if vm.entries.contains_key(&code) {
                return Err(self.error_at(
                    token.location,
                    format!("duplicate code {code} in VALUEMAP '{}'", vm.name),
                    Vec::new(),
                ));
            }
            vm.entries.insert(code, path);
        }
        self.eat(&TokenKind::Semicolon);
        Ok(vm)
    }

    /// `name FROM object CLASS qname {`
    fn parse_header(&mut self) -> ParseResult<(String, String, String)> {
        let name = self.expect_ident("declaration name")?;
        self.expect_keyword("FROM")?;
        let object = self.expect_ident("source object")?;
        self.expect_keyword("CLASS")?;
        let class_name = self.parse_qname("class name")?;
        self.expect(TokenKind::LBrace)?;
        Ok((name, object, class_name))
    }

    fn parse_data(&mut self) -> ParseResult<DataDeclaration> {
        let (name, object, class_name) = self.parse_header()?;
        let mut decl = DataDeclaration::new(name, object, class_name);

        while !self.eat(&TokenKind::RBrace) {
            let token = self.peek().clone();
            match self.parse_clause(DATA_CLAUSES)? {
                Clause::Direction(d) => decl.direction = d,
                Clause::Ident(col) => decl.ident_column = Some(col),
                Clause::Where(col, literal) => {
                    decl.filter.insert(col, literal);
                }
                Clause::Conversion(c) => decl.conversions.push(c),
                Clause::Alias(a) => decl.aliases.push(a),
                Clause::With(w) => decl.with_blocks.push(w),
                Clause::Annexe(class_name) => decl.annexe_targets.push(class_name),
                Clause::Annexed(source) => decl.annexed_sources.push(source),
                Clause::Join(j) => decl.joins.push(j),
                Clause::Nesting(n) => decl.nestings.push(n),
                Clause::Column(c) => decl.columns.push(c),
                Clause::Parent(_) | Clause::StructAttr { .. } | Clause::ClassColumn { .. } => {
                    return Err(self.unexpected(&token, DATA_CLAUSES));
                }
            }
        }
        self.eat(&TokenKind::Semicolon);
        Ok(decl)
    }

    fn parse_inspection(&mut self) -> ParseResult<InspectionDeclaration> {
        let (name, object, class_name) = self.parse_header()?;
        let mut decl = InspectionDeclaration::new(name, object, class_name);

        loop {
            let token = self.peek().clone();
            if self.eat(&TokenKind::RBrace) {
                if decl.ident_column.is_none() {
                    return Err(self.error_at(
                        token.location,
                        format!("INSPECTION '{}' requires an IDENT clause", decl.name),
                        vec!["IDENT".to_string()],
                    ));
                }
                break;
            }
            match self.parse_clause(INSPECTION_CLAUSES)? {
                Clause::Direction(d) => decl.direction = d,
                Clause::Ident(col) => decl.ident_column = Some(col),
                Clause::Parent(col) => decl.parent_column = Some(col),
                Clause::StructAttr { column, value_map } => {
                    decl.struct_attr_column = Some(column);
                    decl.struct_attr_map = Some(value_map);
                }
                Clause::ClassColumn { column, value_map } => {
                    decl.class_column = Some(column);
                    decl.class_map = Some(value_map);
                }
                Clause::Conversion(c) => decl.conversions.push(c),
                Clause::Alias(a) => decl.aliases.push(a),
                Clause::With(w) => decl.with_blocks.push(w),
                Clause::Column(c) => decl.columns.push(c),
                Clause::Where(..)
                | Clause::Annexe(_)
                | Clause::Annexed(_)
                | Clause::Join(_)
                | Clause::Nesting(_) => {
                    return Err(self.unexpected(&token, INSPECTION_CLAUSES));
                }
            }
        }
        self.eat(&TokenKind::Semicolon);
        Ok(decl)
    }

    fn parse_clause(&mut self, allowed: &[&str]) -> ParseResult<Clause> {
        let token = self.peek().clone();
        let keyword = match &token.kind {
            TokenKind::Ident(k) if allowed.contains(&k.as_str()) => k.clone(),
            _ => {
                let mut expected = allowed.to_vec();
                expected.push("}");
                return Err(self.unexpected(&token, &expected));
            }
        };
        self.advance();

        let clause = match keyword.as_str() {
            "DIRECTION" => {
                let t = self.peek().clone();
                let direction = match &t.kind {
                    TokenKind::BothArrow => MappingDirection::Bidirectional,
                    TokenKind::LeftArrow => MappingDirection::InputOnly,
                    TokenKind::Arrow => MappingDirection::OutputOnly,
                    _ => return Err(self.unexpected(&t, &["<->", "<-", "->"])),
                };
                self.advance();
                Clause::Direction(direction)
            }
            "IDENT" => Clause::Ident(self.expect_ident("ident column")?),
            "WHERE" => {
                let column = self.expect_ident("filter column")?;
                self.eat(&TokenKind::Equals);
                let t = self.peek().clone();
                let literal = match &t.kind {
                    TokenKind::Str(literal) => literal.clone(),
                    _ => return Err(self.unexpected(&t, &["string literal"])),
                };
                self.advance();
                Clause::Where(column, literal)
            }
            "CONVERSION" => {
                let value_map = self.expect_ident("VALUEMAP name")?;
                self.expect(TokenKind::LParen)?;
                let source_column = self.expect_ident("source column")?;
                self.expect(TokenKind::DoubleDash)?;
                let target_alias = self.expect_ident("target alias")?;
                self.expect(TokenKind::RParen)?;
                Clause::Conversion(ConversionCall {
                    value_map,
                    source_column,
                    target_alias,
                })
            }
            "ALIAS" => {
                let alias = self.expect_ident("alias name")?;
                self.expect(TokenKind::Tilde)?;
                let class_name = self.parse_qname("class name")?;
                Clause::Alias(AliasDeclaration { alias, class_name })
            }
            "WITH" => {
                let alias = self.expect_ident("alias name")?;
                self.expect(TokenKind::LBrace)?;
                let mut columns = Vec::new();
                while !self.eat(&TokenKind::RBrace) {
                    let t = self.peek().clone();
                    if !self.at_keyword("COLUMN") {
                        return Err(self.unexpected(&t, &["COLUMN", "}"]));
                    }
                    self.advance();
                    columns.push(self.parse_column()?);
                    self.expect(TokenKind::Semicolon)?;
                }
                // A WITH block is closed by its brace; the semicolon is optional.
                self.eat(&TokenKind::Semicolon);
                return Ok(Clause::With(WithBlock { alias, columns }));
            }
            "ANNEXE" => Clause::Annexe(self.parse_qname("class name")?),
            "ANNEXED" => Clause::Annexed(self.expect_ident("annexed source")?),
            "JOIN" => {
                let join_type = self.expect_ident("join type")?;
                let source = self.expect_ident("join source")?;
                self.expect_keyword("ON")?;
                let left_column = self.expect_ident("join column")?;
                self.expect(TokenKind::Equals)?;
                let right_column = self.expect_ident("join column")?;
                Clause::Join(JoinDeclaration {
                    join_type,
                    source,
                    left_column,
                    right_column,
                })
            }
            "NESTING" => {
                let child = self.expect_ident("nested object")?;
                self.expect_keyword("BY")?;
                let by_column = self.expect_ident("nesting column")?;
                Clause::Nesting(NestingDeclaration { child, by_column })
            }
            "PARENT" => Clause::Parent(self.expect_ident("parent column")?),
            "STRUCTATTR" => Clause::StructAttr {
                column: self.expect_ident("structure attribute column")?,
                value_map: self.expect_ident("VALUEMAP name")?,
            },
            "CLASSCOL" => Clause::ClassColumn {
                column: self.expect_ident("class column")?,
                value_map: self.expect_ident("VALUEMAP name")?,
            },
            "COLUMN" => Clause::Column(self.parse_column()?),
            other => {
                return Err(self.error_at(
                    token.location,
                    format!("unsupported clause '{other}'"),
                    Vec::new(),
                ));
            }
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(clause)
    }

    /// `col -> path [, map]`, also accepting `$MARKER -> col`
    fn parse_column(&mut self) -> ParseResult<ColumnMapping> {
        let t = self.peek().clone();
        let mapping = match &t.kind {
            TokenKind::Marker(marker) => {
                // Marker on the left names the record field feeding `col`.
                self.advance();
                self.expect(TokenKind::Arrow)?;
                let column = self.expect_ident("target column")?;
                ColumnMapping::new(column, marker.clone())
            }
            TokenKind::Ident(column) => {
                self.advance();
                self.expect(TokenKind::Arrow)?;
                let path = self.parse_target_path()?;
                ColumnMapping::new(column.clone(), path)
            }
            _ => return Err(self.unexpected(&t, &["column name", "$marker"])),
        };
        if self.eat(&TokenKind::Comma) {
            let value_map = self.expect_ident("VALUEMAP name")?;
            return Ok(mapping.with_value_map(value_map));
        }
        Ok(mapping)
    }

    fn parse_target_path(&mut self) -> ParseResult<String> {
        let t = self.peek().clone();
        if let TokenKind::Marker(marker) = t.kind {
            self.advance();
            return Ok(marker);
        }
        self.parse_qname("target path")
    }

    fn parse_qname(&mut self, what: &str) -> ParseResult<String> {
        let mut segments = vec![self.expect_ident(what)?];
        while self.eat(&TokenKind::Dot) {
            segments.push(self.expect_ident(what)?);
        }
        Ok(segments.join("."))
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(k) if k == keyword)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.eat(&kind) {
            return Ok(());
        }
        let token = self.peek().clone();
        Err(self.unexpected(&token, &[kind.symbol()]))
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.at_keyword(keyword) {
            self.advance();
            return Ok(());
        }
        let token = self.peek().clone();
        Err(self.unexpected(&token, &[keyword]))
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<String> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name.clone())
            }
            _ => Err(self.unexpected(&token, &[what])),
        }
    }

    fn unexpected(&self, token: &Token, expected: &[&str]) -> ParseError {
        self.error_at(
            token.location,
            format!("unexpected {}", token.kind.describe()),
            expected.iter().map(|e| e.to_string()).collect(),
        )
    }

    fn error_at(&self, location: Location, reason: String, expected: Vec<String>) -> ParseError {
        ParseError::syntax(self.source_name, location, reason, expected)
    }
}
