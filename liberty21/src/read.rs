//!
//! # Liberty Reading Module
//!
//! Facilities for reading Liberty-encoded content from file or string.
//! Includes the core Lexer and Parser classes.
//!

// Standard Lib Imports
use std::path::Path;
use std::str::Chars;

// Crates.io Imports
use serde::{Deserialize, Serialize};

// Local imports
use super::data::*;

/// Parse Liberty content from file `fname`
pub fn parse_file(fname: impl AsRef<Path>) -> LibertyResult<LibertyTree> {
    let src = std::fs::read_to_string(fname)?;
    parse_str(&src)
}
/// Parse Liberty content `src` from string
pub fn parse_str(src: &str) -> LibertyResult<LibertyTree> {
    let mut parser = LibertyParser::new(src)?;
    parser.parse_tree()
}

/// # Liberty Lexer / Tokenizer
///
/// Breaks input string `src` into an iteration of [Token]s,
/// consisting of source-locations and type-annotations.
///
/// Operates in an iterator-style mode, producing a [Token] with
/// each call to `next_token`.
///
pub struct LibertyLexer<'src> {
    /// Source-string character iterator
    chars: Chars<'src>,
    /// Peekable next character
    next_char: Option<char>,
    /// Peekable next Token
    next_tok: Option<Token>,
    /// Active lexeme start-position
    start: usize,
    /// Active character index
    pos: usize,
    /// Active line number
    line: usize,
    /// Character index at the beginning of the current line
    linestart: usize,
}
impl<'src> LibertyLexer<'src> {
    pub(crate) fn new(src: &'src str) -> LibertyResult<Self> {
        // Create our character-iterator
        let mut chars = src.chars();
        // Read the first character into our `next` field
        let next_char = chars.next();
        // Create the Lexer
        let mut lex = Self {
            chars,
            next_char,
            next_tok: None,
            start: 0,
            pos: 0,
            line: 1,
            linestart: 0,
        };
        // Read the first token into our `next_tok` field
        lex.next_tok = lex._next_token()?;
        Ok(lex)
    }
    /// Get and return our next character, updating our position along the way
    fn next_char(&mut self) -> Option<char> {
        if self.next_char.is_none() {
            return None;
        }
        self.pos += 1;
        let mut rv = self.chars.next();
        std::mem::swap(&mut rv, &mut self.next_char);
        rv
    }
    /// Peek at our next character, without advancing.
    /// Returns `None` if no characters remain.
    fn peek_char(&self) -> &Option<char> {
        &self.next_char
    }
    /// Get an immutable reference to our next [Token], without advancing
    #[inline(always)]
    fn peek_token(&self) -> &Option<Token> {
        &self.next_tok
    }
    /// Get and return our next token, updating internal state along the way
    fn next_token(&mut self) -> LibertyResult<Option<Token>> {
        if self.next_tok.is_none() {
            return Ok(None);
        }
        let mut tok = self._next_token()?;
        std::mem::swap(&mut tok, &mut self.next_tok);
        Ok(tok)
    }
    /// Internal implementation of `next_token`.
    /// Pull our next [Token], removing ignored items such as commentary and whitespace.
    ///
    /// While the primary API method is `next_token`, this underscore-version
    /// is also called during startup to evade its usual end-of-stream check.
    fn _next_token(&mut self) -> LibertyResult<Option<Token>> {
        use TokenType::{Comment, NewLine, WhiteSpace};
        loop {
            match self.lex_one()? {
                None => return Ok(None),
                Some(t) => match t.ttype {
                    WhiteSpace | Comment | NewLine => continue, // White-space, newlines, and comments are not emitted
                    _ => return Ok(Some(t)),
                },
            }
        }
    }
    /// Emit a [Token] of [TokenType] `ttype`
    /// Uses the current Lexer location as its span, and updates the Lexer start-position upon creation.
    fn emit(&mut self, ttype: TokenType) -> Token {
        let loc = SourceLocation {
            start: self.start,
            stop: self.pos,
            line: self.line,
        };
        let tok = Token { loc, ttype };
        self.start = self.pos;
        tok
    }
    /// Accept a character if it meets predicate-function `f`
    fn accept(&mut self, f: impl Fn(char) -> bool) -> bool {
        match self.peek_char() {
            Some(ref ch) if f(*ch) => {
                self.next_char();
                true
            }
            _ => false,
        }
    }
    /// Accept a single-character match
    fn accept_char(&mut self, c: char) -> bool {
        self.accept(|a| a == c)
    }
    /// Lex the next [Token]
    fn lex_one(&mut self) -> LibertyResult<Option<Token>> {
        if self.peek_char().is_none() {
            return Ok(None); // All done! End of input. Return `None`.
        }
        if self.accept_char('\n') {
            return self.lex_newline();
        }
        if self.accept(char::is_whitespace) {
            return self.lex_whitespace();
        }
        if self.accept_char('\\') {
            // Line continuation. The backslash-newline pair reads as whitespace.
            if !self.accept_char('\n') {
                return self.fail();
            }
            self.line += 1;
            self.linestart = self.pos;
            return Ok(Some(self.emit(TokenType::WhiteSpace)));
        }
        if self.accept_char(':') {
            return Ok(Some(self.emit(TokenType::Colon)));
        }
        if self.accept_char(';') {
            return Ok(Some(self.emit(TokenType::SemiColon)));
        }
        if self.accept_char(',') {
            return Ok(Some(self.emit(TokenType::Comma)));
        }
        if self.accept_char('(') {
            return Ok(Some(self.emit(TokenType::OpenParen)));
        }
        if self.accept_char(')') {
            return Ok(Some(self.emit(TokenType::CloseParen)));
        }
        if self.accept_char('{') {
            return Ok(Some(self.emit(TokenType::OpenBrace)));
        }
        if self.accept_char('}') {
            return Ok(Some(self.emit(TokenType::CloseBrace)));
        }
        if self.accept_char('"') {
            return self.lex_string_literal();
        }
        if self.accept_char('/') {
            return self.lex_comment();
        }
        if self.accept(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
            return self.lex_number();
        }
        if self.accept(|c| c.is_alphabetic() || c == '_') {
            return self.lex_name();
        }
        self.fail() // Some other, invalid character. Fail.
    }
    /// Lex newlines, incrementing our line-number
    fn lex_newline(&mut self) -> LibertyResult<Option<Token>> {
        let tok = self.emit(TokenType::NewLine);
        self.line += 1;
        self.linestart = self.pos;
        Ok(Some(tok))
    }
    /// Lex whitespace
    fn lex_whitespace(&mut self) -> LibertyResult<Option<Token>> {
        while self.accept(|c| c.is_whitespace() && c != '\n') {
            continue;
        }
        let tok = self.emit(TokenType::WhiteSpace);
        Ok(Some(tok))
    }
    /// Lex a number
    fn lex_number(&mut self) -> LibertyResult<Option<Token>> {
        while self.accept(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
            continue;
        }
        let tok = self.emit(TokenType::Number);
        Ok(Some(tok))
    }
    /// Lex a string literal.
    /// String literals may span lines; the `values` tables of characterization
    /// data commonly do.
    fn lex_string_literal(&mut self) -> LibertyResult<Option<Token>> {
        // First double-quote has been read. Accept everything until a closing double-quote.
        loop {
            match *self.peek_char() {
                Some('"') => break,
                Some('\n') => {
                    self.next_char();
                    self.line += 1;
                    self.linestart = self.pos;
                }
                Some(_) => {
                    self.next_char();
                }
                None => return self.fail(), // Unterminated string
            }
        }
        // And bump over the closing quote
        self.next_char();
        Ok(Some(self.emit(TokenType::StringLiteral)))
    }
    /// Lex a comment, either block (`/* ... */`) or line (`// ...`) form
    fn lex_comment(&mut self) -> LibertyResult<Option<Token>> {
        // First slash has been read
        if self.accept_char('*') {
            // Block comment. Accept everything until the closing star-slash.
            loop {
                match self.next_char() {
                    Some('*') => {
                        if self.accept_char('/') {
                            break;
                        }
                    }
                    Some('\n') => {
                        self.line += 1;
                        self.linestart = self.pos;
                    }
                    Some(_) => continue,
                    None => return self.fail(), // Unterminated comment
                }
            }
            return Ok(Some(self.emit(TokenType::Comment)));
        }
        if self.accept_char('/') {
            // Line comment. Accept everything until a newline.
            while self.accept(|c| c != '\n') {
                continue;
            }
            return Ok(Some(self.emit(TokenType::Comment)));
        }
        self.fail()
    }
    /// Lex a string name.
    /// Names cover identifiers and unquoted values, and accept everything up
    /// to white-space or structural punctuation.
    fn lex_name(&mut self) -> LibertyResult<Option<Token>> {
        while self.accept(|c| {
            !c.is_whitespace() && !matches!(c, '(' | ')' | '{' | '}' | ',' | ':' | ';' | '"' | '\\')
        }) {
            continue;
        }
        Ok(Some(self.emit(TokenType::Name)))
    }
    /// Error-Generation Helper
    /// Collect our current position and content into a [LibertyError::Lex]
    fn fail<T>(&self) -> LibertyResult<T> {
        Err(LibertyError::Lex {
            next_char: *self.peek_char(),
            line: self.line,
            pos: self.pos,
        })
    }
}
/// Iterator protocol for [LibertyLexer]
/// Not used during parsing, but often handy for testing.
/// Panics on Lexer errors.
impl<'s> Iterator for LibertyLexer<'s> {
    type Item = Token;
    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().unwrap()
    }
}
/// Location of a [Token] in the source string
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Start character index (inclusive)
    start: usize,
    /// End character index (exclusive)
    stop: usize,
    /// Line number
    line: usize,
}
/// Lexer Token
/// Provides indices into the source-string for the (character) start and end of the source text,
/// as well as the line number and type-tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Source Location
    loc: SourceLocation,
    /// Token Type
    ttype: TokenType,
}
impl Token {
    /// Return a sub-string of input-string `src` over our locations
    pub(crate) fn substr<'me, 'src>(&'me self, src: &'src str) -> &'src str {
        &src[self.loc.start..self.loc.stop]
    }
}
/// Token Types Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Name,
    Number,
    StringLiteral,
    Colon,
    SemiColon,
    Comma,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    NewLine,
    WhiteSpace,
    Comment,
}
/// Enumerated parsing contexts, largely for capturing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibertyParseContext {
    Top,
    Group,
    Attr,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibertyParseErrorType {
    /// Invalid Token
    InvalidToken { expected: TokenType },
    /// Invalid Value
    InvalidValue,
    /// All other errors
    Other,
}

/// Parsed statement forms: everything in a group body is one of these two.
enum Statement {
    Group(LibertyGroup),
    Attr(LibertyAttr),
}

/// # Liberty Parser
/// Transforms input string of lifetime 'src into a [LibertyTree]
pub struct LibertyParser<'src> {
    /// Source string
    src: &'src str,
    /// Lexer
    lex: LibertyLexer<'src>,
    /// Context Stack
    ctx: Vec<LibertyParseContext>,
}
impl<'src> LibertyParser<'src> {
    /// Construct a [LibertyParser] of input-text `src`
    pub(crate) fn new(src: &'src str) -> LibertyResult<Self> {
        let lex = LibertyLexer::new(src)?;
        Ok(Self {
            src,
            lex,
            ctx: Vec::new(),
        })
    }
    /// Advance the lexer and get its next token
    #[inline(always)]
    fn next_token(&mut self) -> LibertyResult<Option<Token>> {
        self.lex.next_token()
    }
    /// Advance by a [Token] without returning it.
    /// Usually called after matching on "peeked" results.
    #[inline(always)]
    fn advance(&mut self) -> LibertyResult<()> {
        // Advance the lexer, pass along any errors it generates. And otherwise return Ok.
        let _ = self.lex.next_token()?;
        Ok(())
    }
    #[inline(always)]
    fn peek_token(&self) -> &Option<Token> {
        self.lex.peek_token()
    }
    /// Boolean indication of whether our next Token is of [TokenType] `ttype`.
    fn matches(&self, ttype: TokenType) -> bool {
        matches!(self.peek_token(), Some(t) if t.ttype == ttype)
    }
    /// Assert the expectation that the next [Token] is of [TokenType] `ttype`.
    /// Returns the [Token] if so. Returns an [Err] if not.
    fn expect(&mut self, ttype: TokenType) -> LibertyResult<Token> {
        match self.next_token()? {
            Some(t) if t.ttype == ttype => Ok(t),
            _ => self.fail(LibertyParseErrorType::InvalidToken { expected: ttype }),
        }
    }
    /// Assert the expectation that the next [Token] is of [TokenType] `ttype`.
    /// Returns its string value if so. Returns an [Err] if not.
    #[inline(always)]
    fn expect_and_get_str(&mut self, ttype: TokenType) -> LibertyResult<&str> {
        let tok = self.expect(ttype)?;
        Ok(self.txt(&tok))
    }
    /// Parse an identifier name, e.g. a group-type or attribute name
    fn parse_ident(&mut self) -> LibertyResult<String> {
        let txt = self.expect_and_get_str(TokenType::Name)?;
        Ok(String::from(txt))
    }
    /// Retrieve the text-content of lexer [Token] `tok`
    #[inline(always)]
    fn txt(&self, tok: &Token) -> &str {
        tok.substr(self.src)
    }
    /// Parse a full [LibertyTree]: a sequence of top-level groups
    pub(crate) fn parse_tree(&mut self) -> LibertyResult<LibertyTree> {
        self.ctx.push(LibertyParseContext::Top);
        let mut groups = Vec::new();
        while self.peek_token().is_some() {
            match self.parse_statement()? {
                Statement::Group(g) => groups.push(g),
                Statement::Attr(_) => self.fail_msg(
                    LibertyParseErrorType::Other,
                    "Attributes are invalid at top level; expected a group",
                )?,
            }
        }
        self.ctx.pop();
        Ok(LibertyTree { groups })
    }
    /// Parse a single group-body statement: either a sub-group or an attribute.
    ///
    /// Both forms open with a name, and the two attribute forms diverge at the
    /// following token: a colon makes a simple attribute, an open-paren makes
    /// either a complex attribute or (if followed by a braced body) a group.
    fn parse_statement(&mut self) -> LibertyResult<Statement> {
        let name = self.parse_ident()?;
        let ttype = match self.peek_token() {
            Some(t) => t.ttype,
            None => {
                return self.fail(LibertyParseErrorType::InvalidToken {
                    expected: TokenType::Colon,
                })
            }
        };
        match ttype {
            TokenType::Colon => {
                // Simple attribute
                self.ctx.push(LibertyParseContext::Attr);
                self.advance()?; // Eat the colon
                let value = self.parse_value()?;
                self.expect(TokenType::SemiColon)?;
                self.ctx.pop();
                Ok(Statement::Attr(LibertyAttr::Simple { name, value }))
            }
            TokenType::OpenParen => {
                self.advance()?; // Eat the open-paren
                let values = self.parse_value_list()?;
                self.expect(TokenType::CloseParen)?;
                if self.matches(TokenType::OpenBrace) {
                    // Group definition. The parenthesized values were its names.
                    self.parse_group_body(name, values).map(Statement::Group)
                } else {
                    // Complex attribute
                    self.ctx.push(LibertyParseContext::Attr);
                    self.expect(TokenType::SemiColon)?;
                    self.ctx.pop();
                    Ok(Statement::Attr(LibertyAttr::Complex { name, values }))
                }
            }
            _ => self.fail(LibertyParseErrorType::InvalidToken {
                expected: TokenType::Colon,
            }),
        }
    }
    /// Parse a group's braced body, the type-tag and names having been read
    fn parse_group_body(
        &mut self,
        group_type: String,
        names: Vec<LibertyValue>,
    ) -> LibertyResult<LibertyGroup> {
        self.ctx.push(LibertyParseContext::Group);
        self.expect(TokenType::OpenBrace)?;
        let mut group = LibertyGroup::new(group_type);
        group.names = names.iter().map(value_text).collect();
        loop {
            if self.matches(TokenType::CloseBrace) {
                self.advance()?; // Eat the close-brace
                break;
            }
            if self.peek_token().is_none() {
                self.fail(LibertyParseErrorType::InvalidToken {
                    expected: TokenType::CloseBrace,
                })?;
            }
            match self.parse_statement()? {
                Statement::Group(g) => group.groups.push(g),
                Statement::Attr(a) => group.attrs.push(a),
            }
        }
        // Groups may optionally be followed by a semicolon
        if self.matches(TokenType::SemiColon) {
            self.advance()?;
        }
        self.ctx.pop();
        Ok(group)
    }
    /// Parse a comma-separated value list, up to (but not including) a closing paren.
    /// The list may be empty.
    fn parse_value_list(&mut self) -> LibertyResult<Vec<LibertyValue>> {
        let mut values = Vec::new();
        while !self.matches(TokenType::CloseParen) {
            values.push(self.parse_value()?);
            if self.matches(TokenType::Comma) {
                self.advance()?; // Eat the comma
            }
        }
        Ok(values)
    }
    /// Parse a single scalar value
    fn parse_value(&mut self) -> LibertyResult<LibertyValue> {
        let ttype = match self.peek_token() {
            Some(t) => t.ttype,
            None => return self.fail(LibertyParseErrorType::InvalidValue),
        };
        match ttype {
            TokenType::Number => {
                let tok = self.expect(TokenType::Number)?;
                let txt = self.txt(&tok);
                if txt.contains('.') || txt.contains('e') || txt.contains('E') {
                    match txt.parse::<f64>() {
                        Ok(v) => Ok(LibertyValue::Float(v)),
                        Err(_) => self.fail(LibertyParseErrorType::InvalidValue),
                    }
                } else {
                    match txt.parse::<i64>() {
                        Ok(v) => Ok(LibertyValue::Int(v)),
                        Err(_) => self.fail(LibertyParseErrorType::InvalidValue),
                    }
                }
            }
            TokenType::Name => {
                let txt = self.expect_and_get_str(TokenType::Name)?;
                Ok(LibertyValue::String(txt.to_string()))
            }
            TokenType::StringLiteral => {
                let txt = self.expect_and_get_str(TokenType::StringLiteral)?;
                // Strip the enclosing quotes
                Ok(LibertyValue::String(txt[1..txt.len() - 1].to_string()))
            }
            _ => self.fail(LibertyParseErrorType::InvalidValue),
        }
    }
    /// Error-Generation Helper
    fn fail<T>(&self, tp: LibertyParseErrorType) -> LibertyResult<T> {
        let state = self.state();
        Err(LibertyError::Parse {
            tp,
            msg: None,
            state,
        })
    }
    /// Error-Generation Helper
    fn fail_msg<T>(&self, tp: LibertyParseErrorType, msg: impl Into<String>) -> LibertyResult<T> {
        let msg: String = msg.into();
        let state = self.state();
        Err(LibertyError::Parse {
            tp,
            msg: Some(msg),
            state,
        })
    }
    /// Extract the state of the parser. Generally for error reporting.
    fn state(&self) -> ParserState {
        // Create a string repr of the current token
        let token = match self.lex.next_tok {
            Some(t) => self.txt(&t),
            None => "EOF",
        }
        .to_string();
        // Sort out the content on our current line, by finding the next newline
        const MAX_CHARS_IN_LINE: usize = 200;
        let mut chars = self.lex.chars.clone();
        let mut line_end = self.lex.linestart;
        for _ in 0..MAX_CHARS_IN_LINE {
            match chars.next() {
                None => break,
                Some(c) if c == '\n' => break,
                Some(_) => line_end += 1,
            }
        }
        let line_content = self.src[self.lex.linestart..line_end].to_string();
        ParserState {
            ctx: self.ctx.clone(),
            line_content,
            line_num: self.lex.line,
            token,
            pos: self.lex.pos,
        }
    }
}
/// Convert a parsed value to the string form used for group names
fn value_text(value: &LibertyValue) -> String {
    match value {
        LibertyValue::String(s) => s.clone(),
        LibertyValue::Float(v) => v.to_string(),
        LibertyValue::Int(v) => v.to_string(),
    }
}

/// State of the parser, generally exposed when providing error info.
#[allow(dead_code)]
#[derive(Debug)]
pub struct ParserState {
    ctx: Vec<LibertyParseContext>,
    token: String,
    line_content: String,
    line_num: usize,
    pos: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_attrs() -> LibertyResult<()> {
        // Parse simple and complex attributes inside a minimal group
        let src = r#"
        library (attrs) {
            nom_voltage : 1.1;
            nom_temperature : 25;
            direction : input;
            when : "!A & B";
            index_1 ("0.01, 0.02");
            lut_values ( \
                "0.1, 0.2", \
                "0.3, 0.4" \
            );
            empty_list ();
        }
        "#;
        let tree = parse_str(src)?;
        assert_eq!(tree.groups.len(), 1);
        let lib = &tree.groups[0];
        assert_eq!(lib.group_type, "library");
        assert_eq!(lib.name(), Some("attrs"));
        assert_eq!(
            lib.simple_value("nom_voltage"),
            Some(&LibertyValue::Float(1.1))
        );
        assert_eq!(
            lib.simple_value("nom_temperature"),
            Some(&LibertyValue::Int(25))
        );
        assert_eq!(lib.simple_str("direction"), Some("input"));
        assert_eq!(lib.simple_str("when"), Some("!A & B"));
        assert_eq!(
            lib.complex_values("index_1"),
            Some(&[LibertyValue::String("0.01, 0.02".to_string())][..])
        );
        assert_eq!(lib.complex_values("lut_values").unwrap().len(), 2);
        assert_eq!(lib.complex_values("empty_list"), Some(&[][..]));
        Ok(())
    }

    #[test]
    fn it_parses_nested_groups() -> LibertyResult<()> {
        let src = r#"
        /* header commentary */
        library (nested) {
            cell (INV_X1) {
                pin (A) {
                    direction : input;
                }
                pin (Y) {
                    direction : output;
                    timing () {
                        related_pin : "A";
                    }
                }
            }
        }
        "#;
        let tree = parse_str(src)?;
        let lib = &tree.groups[0];
        let cell = lib.sub_groups("cell").next().unwrap();
        assert_eq!(cell.name(), Some("INV_X1"));
        assert_eq!(cell.sub_groups("pin").count(), 2);
        let y = cell.sub_groups("pin").nth(1).unwrap();
        let timing = y.sub_groups("timing").next().unwrap();
        assert_eq!(timing.names.len(), 0);
        assert_eq!(timing.simple_str("related_pin"), Some("A"));
        Ok(())
    }

    #[test]
    fn it_errors_on_top_level_attrs() {
        assert!(parse_str("nom_voltage : 1.1;").is_err());
    }

    #[test]
    fn it_errors_on_unterminated_groups() {
        assert!(parse_str("library (l) { cell (c) {").is_err());
    }
}
