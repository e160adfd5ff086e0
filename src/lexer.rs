use crate::error::ScriptError;
use crate::token::{OPERATOR_CHARS, Operator, TokenType, is_keyword};

/// Streaming tokenizer over one source text.
///
/// The tokenizer is a cursor: it always holds exactly one decoded token in
/// its public fields (`token_type`, `string`, `number`, `operator`) together
/// with the line/column where that token started. `next()` replaces the
/// current token with the following one.
///
/// `new()` loads the first token, so constructing a tokenizer can already
/// fault on malformed input.
pub struct Tokenizer {
    chars: Vec<char>,
    index: usize,
    filename: String,

    // Cursor position (next unread character).
    line: usize,
    col: usize,

    // Position where the current token started.
    pub token_line: usize,
    pub token_col: usize,

    pub token_type: TokenType,
    pub string: String,
    pub number: f64,
    pub operator: Option<Operator>,
}

impl Tokenizer {
    pub fn new(text: &str, filename: &str) -> Result<Tokenizer, ScriptError> {
        let mut tokenizer = Tokenizer {
            chars: text.chars().collect(),
            index: 0,
            filename: filename.to_string(),
            line: 1,
            col: 1,
            token_line: 1,
            token_col: 1,
            token_type: TokenType::Invalid,
            string: String::new(),
            number: 0.0,
            operator: None,
        };

        // Load the first token.
        tokenizer.next()?;

        Ok(tokenizer)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == TokenType::Eof
    }

    pub fn is_operator(&self, operator: Operator) -> bool {
        self.token_type == TokenType::Operator && self.operator == Some(operator)
    }

    pub fn is_identifier(&self, identifier: &str) -> bool {
        self.token_type == TokenType::Identifier && self.string == identifier
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.string == keyword
    }

    /// Human-readable form of the current token for error messages.
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Eof => "end of file".to_string(),
            TokenType::Eol => "new line".to_string(),
            _ => format!("'{}'", self.string),
        }
    }

    /// Advances past the current token, skipping any end-of-line tokens.
    pub fn next_ignore_eol(&mut self) -> Result<TokenType, ScriptError> {
        loop {
            self.next()?;

            if self.token_type != TokenType::Eol {
                return Ok(self.token_type);
            }
        }
    }

    /// Decodes the next token into the cursor fields.
    pub fn next(&mut self) -> Result<TokenType, ScriptError> {
        self.skip_whitespace();

        self.token_line = self.line;
        self.token_col = self.col;

        let ch = match self.current() {
            Some(ch) => ch,
            None => {
                self.token_type = TokenType::Eof;
                self.string.clear();
                return Ok(self.token_type);
            }
        };

        if ch.is_alphabetic() {
            self.read_identifier();
        } else if ch.is_ascii_digit() {
            self.read_number()?;
        } else if ch == '\'' {
            self.read_string()?;
        } else if ch == '\n' {
            self.read_eol();
        } else {
            return self.read_operator();
        }

        Ok(self.token_type)
    }

    pub fn expect_identifier(&mut self) -> Result<String, ScriptError> {
        if self.token_type != TokenType::Identifier {
            return Err(self.parse_error(format!("expected identifier, found {}", self.describe())));
        }

        let value = self.string.clone();
        self.next()?;

        Ok(value)
    }

    pub fn expect_string(&mut self) -> Result<String, ScriptError> {
        if self.token_type != TokenType::Str {
            return Err(self.parse_error(format!("expected string, found {}", self.describe())));
        }

        let value = self.string.clone();
        self.next()?;

        Ok(value)
    }

    pub fn expect_number(&mut self) -> Result<f64, ScriptError> {
        if self.token_type != TokenType::Number {
            return Err(self.parse_error(format!("expected number, found {}", self.describe())));
        }

        let value = self.number;
        self.next()?;

        Ok(value)
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn at_end(&self) -> bool {
        self.index >= self.chars.len()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.index += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_eol(&mut self) {
        self.string = "\\n".to_string();
        self.number = 0.0;
        self.token_type = TokenType::Eol;

        self.advance();
    }

    fn read_identifier(&mut self) {
        self.string.clear();

        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                self.string.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        self.token_type = if is_keyword(&self.string) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
    }

    /// Digits with at most one decimal point. A second point is malformed.
    fn read_number(&mut self) -> Result<(), ScriptError> {
        self.string.clear();
        let mut seen_dot = false;

        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                self.string.push(ch);
                self.advance();
            } else if ch == '.' {
                if seen_dot {
                    // Consume the run so the error names the whole literal.
                    self.string.push(ch);
                    self.advance();
                    while let Some(c) = self.current() {
                        if c.is_ascii_digit() || c == '.' {
                            self.string.push(c);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    return Err(
                        self.token_error(format!("malformed number literal '{}'", self.string))
                    );
                }
                seen_dot = true;
                self.string.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        self.number = self
            .string
            .parse::<f64>()
            .map_err(|_| self.token_error(format!("malformed number literal '{}'", self.string)))?;
        self.token_type = TokenType::Number;

        Ok(())
    }

    /// Single-quoted string with no escape sequences. A newline or end of
    /// file before the closing quote faults at the literal's start position.
    fn read_string(&mut self) -> Result<(), ScriptError> {
        self.string.clear();
        self.advance(); // opening quote

        loop {
            match self.current() {
                Some('\'') => {
                    self.advance();
                    self.token_type = TokenType::Str;
                    return Ok(());
                }
                Some('\n') => {
                    return Err(self.token_error("end of line reached before closing quote"));
                }
                Some(ch) => {
                    self.string.push(ch);
                    self.advance();
                }
                None => {
                    return Err(self.token_error("unterminated string literal"));
                }
            }
        }
    }

    /// Greedy scan over the operator character set. `)`, `]` and `}` always
    /// terminate as single-character tokens. `//` starts a line comment.
    fn read_operator(&mut self) -> Result<TokenType, ScriptError> {
        self.string.clear();

        loop {
            match self.current() {
                Some(ch) => {
                    self.string.push(ch);
                    self.advance();
                }
                None => break,
            }

            if self.string == ")" || self.string == "]" || self.string == "}" {
                break;
            }

            match self.current() {
                Some(ch) if OPERATOR_CHARS.contains(&ch) => {}
                _ => break,
            }
        }

        if self.string == "//" {
            self.skip_line_comment();
            return self.next();
        }

        match Operator::from_str(&self.string) {
            Some(op) => {
                self.operator = Some(op);
                self.token_type = TokenType::Operator;
                Ok(self.token_type)
            }
            None => Err(self.token_error(format!("unrecognized character sequence '{}'", self.string))),
        }
    }

    fn skip_line_comment(&mut self) {
        while !self.at_end() && self.current() != Some('\n') {
            self.advance();
        }
    }

    fn token_error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::tokenizer(message, &self.filename, self.token_line, self.token_col)
    }

    fn parse_error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::parser(message, &self.filename, self.token_line, self.token_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer(source: &str) -> Tokenizer {
        Tokenizer::new(source, "test.cgs").unwrap()
    }

    fn token_types(source: &str) -> Vec<TokenType> {
        let mut t = tokenizer(source);
        let mut types = Vec::new();
        while !t.is_eof() {
            types.push(t.token_type);
            t.next().unwrap();
        }
        types
    }

    #[test]
    fn test_identifier_and_keyword() {
        let mut t = tokenizer("foo return bar_2");

        assert_eq!(t.token_type, TokenType::Identifier);
        assert_eq!(t.string, "foo");

        t.next().unwrap();
        assert_eq!(t.token_type, TokenType::Keyword);
        assert_eq!(t.string, "return");

        t.next().unwrap();
        assert_eq!(t.token_type, TokenType::Identifier);
        assert_eq!(t.string, "bar_2");

        t.next().unwrap();
        assert!(t.is_eof());
    }

    #[test]
    fn test_integer_and_float() {
        let mut t = tokenizer("42 3.25");

        assert_eq!(t.token_type, TokenType::Number);
        assert_eq!(t.number, 42.0);

        t.next().unwrap();
        assert_eq!(t.number, 3.25);
    }

    #[test]
    fn test_second_decimal_point_faults() {
        let err = Tokenizer::new("1.2.3", "test.cgs").map(|_| ()).unwrap_err();

        match err {
            ScriptError::Tokenizer { line, col, .. } => {
                assert_eq!((line, col), (1, 1));
            }
            other => panic!("expected tokenizer fault, got {:?}", other),
        }
    }

    #[test]
    fn test_string_literal() {
        let mut t = tokenizer("'hello world'");

        assert_eq!(t.token_type, TokenType::Str);
        assert_eq!(t.string, "hello world");

        t.next().unwrap();
        assert!(t.is_eof());
    }

    #[test]
    fn test_unterminated_string_reports_start_position() {
        // The literal starts at line 2, column 5.
        let mut t = tokenizer("a = 1\n    'oops");
        let err = loop {
            match t.next() {
                Err(e) => break e,
                Ok(_) => assert!(!t.is_eof(), "expected a tokenizer fault"),
            }
        };

        match err {
            ScriptError::Tokenizer {
                message, line, col, ..
            } => {
                assert!(message.contains("unterminated"));
                assert_eq!((line, col), (2, 5));
            }
            other => panic!("expected tokenizer fault, got {:?}", other),
        }
    }

    #[test]
    fn test_newline_in_string_faults() {
        let err = Tokenizer::new("'oops\n'", "test.cgs").map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("closing quote"));
    }

    #[test]
    fn test_newline_is_a_token() {
        assert_eq!(
            token_types("a\nb"),
            vec![TokenType::Identifier, TokenType::Eol, TokenType::Identifier]
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            token_types("a // everything here is skipped\nb"),
            vec![TokenType::Identifier, TokenType::Eol, TokenType::Identifier]
        );
    }

    #[test]
    fn test_operators() {
        let mut t = tokenizer("+ - * / % == && .");
        let expected = [
            Operator::Plus,
            Operator::Minus,
            Operator::Star,
            Operator::Slash,
            Operator::Percent,
            Operator::Equal,
            Operator::AndAnd,
            Operator::Dot,
        ];

        for op in expected {
            assert!(t.is_operator(op), "expected {:?}", op);
            t.next().unwrap();
        }
        assert!(t.is_eof());
    }

    #[test]
    fn test_close_delimiters_are_single_tokens() {
        // `)*` must not merge into one operator token.
        let mut t = tokenizer("(1))*");
        assert!(t.is_operator(Operator::OpenParen));
        t.next().unwrap();
        t.next().unwrap();
        assert!(t.is_operator(Operator::CloseParen));
        t.next().unwrap();
        assert!(t.is_operator(Operator::CloseParen));
        t.next().unwrap();
        assert!(t.is_operator(Operator::Star));
    }

    #[test]
    fn test_unrecognized_character_faults() {
        let mut t = tokenizer("a ~ b");

        match t.next() {
            Err(ScriptError::Tokenizer { line, col, .. }) => {
                assert_eq!((line, col), (1, 3));
            }
            other => panic!("expected tokenizer fault, got {:?}", other),
        }
    }

    #[test]
    fn test_token_positions() {
        let mut t = tokenizer("ab 12\n 'x'");

        assert_eq!((t.token_line, t.token_col), (1, 1));
        t.next().unwrap();
        assert_eq!((t.token_line, t.token_col), (1, 4));
        t.next().unwrap(); // eol
        t.next().unwrap();
        assert_eq!((t.token_line, t.token_col), (2, 2));
    }

    #[test]
    fn test_next_ignore_eol() {
        let mut t = tokenizer("a\n\n\nb");
        t.next_ignore_eol().unwrap();
        assert_eq!(t.string, "b");
    }
}
