use crate::ast::{Block, Expr, ObjectEntry, Pos, Program, Stmt};
use crate::error::ScriptError;
use crate::lexer::Tokenizer;
use crate::token::{Operator, TokenType};

/// Recursive-descent parser with one-token lookahead.
///
/// The parser borrows the tokenizer cursor and pulls tokens on demand; it
/// never buffers the token stream. Precedence, low to high:
/// assignment, additive (`+ -`), multiplicative (`* / %`), unary (`+ - !`),
/// primary.
///
/// A bare identifier followed by `(` is disambiguated after the closing `)`:
/// a `{` makes it a function declaration (every listed expression must then
/// be a bare parameter name), anything else makes it a call.
pub struct Parser<'a> {
    tokenizer: &'a mut Tokenizer,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: &'a mut Tokenizer) -> Parser<'a> {
        Parser { tokenizer }
    }

    /// Parses a whole module: statements separated by `;` or line breaks.
    pub fn parse_program(&mut self) -> Result<Program, ScriptError> {
        let name = self.tokenizer.filename().to_string();
        let mut statements = Vec::new();

        while !self.tokenizer.is_eof() {
            if self.tokenizer.token_type == TokenType::Eol {
                self.tokenizer.next()?;
                continue;
            }

            // `include` is only recognized at module top level.
            let statement = if self.tokenizer.is_identifier("include") {
                self.parse_include()?
            } else {
                self.parse_statement()?
            };

            statements.push(statement);

            if self.tokenizer.is_eof() {
                break;
            }

            if !self.tokenizer.is_operator(Operator::Semicolon)
                && self.tokenizer.token_type != TokenType::Eol
            {
                return Err(self.error(format!(
                    "expected ';' or new line, found {}",
                    self.tokenizer.describe()
                )));
            }

            self.tokenizer.next_ignore_eol()?;
        }

        Ok(Program { name, statements })
    }

    fn parse_include(&mut self) -> Result<Stmt, ScriptError> {
        let pos = self.pos();
        self.tokenizer.next()?;

        let name = match self.tokenizer.token_type {
            TokenType::Identifier | TokenType::Str => self.tokenizer.string.clone(),
            _ => {
                return Err(self.error(format!(
                    "expected script name after 'include', found {}",
                    self.tokenizer.describe()
                )));
            }
        };
        self.tokenizer.next()?;

        let alias = if self.tokenizer.is_identifier("as") {
            self.tokenizer.next()?;
            self.tokenizer.expect_identifier()?
        } else {
            String::new()
        };

        Ok(Stmt::Include { name, alias, pos })
    }

    pub fn parse_statement(&mut self) -> Result<Stmt, ScriptError> {
        if self.tokenizer.is_keyword("if") {
            self.parse_if()
        } else if self.tokenizer.is_keyword("for") {
            self.parse_for()
        } else if self.tokenizer.is_keyword("return") {
            self.parse_return()
        } else {
            Ok(Stmt::Expression(self.parse_expression()?))
        }
    }

    /// `if <condition> <block> [else <block> | else if ...]`
    ///
    /// The condition is not parenthesized; both branches are braced blocks.
    fn parse_if(&mut self) -> Result<Stmt, ScriptError> {
        let pos = self.pos();
        self.tokenizer.next()?;

        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.tokenizer.is_keyword("else") {
            self.tokenizer.next()?;

            if self.tokenizer.is_keyword("if") {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block()?)))
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_block,
            else_branch,
            pos,
        })
    }

    /// `for <variable> in <collection> <block>` — header placeholder only;
    /// the compiler does not lower loop bodies.
    fn parse_for(&mut self) -> Result<Stmt, ScriptError> {
        let pos = self.pos();
        self.tokenizer.next()?;

        let variable = self.tokenizer.expect_identifier()?;

        if !self.tokenizer.is_keyword("in") {
            return Err(self.error(format!(
                "expected 'in', found {}",
                self.tokenizer.describe()
            )));
        }
        self.tokenizer.next()?;

        let collection = self.parse_expression()?;
        let body = self.parse_block()?;

        Ok(Stmt::For {
            variable,
            collection,
            body,
            pos,
        })
    }

    /// `return <expr>`, or bare `return` which means return null.
    fn parse_return(&mut self) -> Result<Stmt, ScriptError> {
        let pos = self.pos();
        self.tokenizer.next()?;

        let bare = self.tokenizer.is_eof()
            || self.tokenizer.token_type == TokenType::Eol
            || self.tokenizer.is_operator(Operator::Semicolon)
            || self.tokenizer.is_operator(Operator::CloseBrace);

        if bare {
            Ok(Stmt::ReturnNull(pos))
        } else {
            let value = self.parse_expression()?;
            Ok(Stmt::Return { value, pos })
        }
    }

    /// `{ statement* }`. Consumes the closing brace. A `return` statement
    /// must be the last statement of its block.
    pub fn parse_block(&mut self) -> Result<Block, ScriptError> {
        let pos = self.pos();

        if !self.tokenizer.is_operator(Operator::OpenBrace) {
            return Err(self.error(format!(
                "expected '{{', found {}",
                self.tokenizer.describe()
            )));
        }
        self.tokenizer.next_ignore_eol()?;

        let mut statements = Vec::new();

        loop {
            if self.tokenizer.is_operator(Operator::CloseBrace) {
                self.tokenizer.next()?;
                break;
            }
            if self.tokenizer.is_eof() {
                return Err(self.error("end of file encountered before closing block '}'"));
            }

            let was_return = self.tokenizer.is_keyword("return");
            statements.push(self.parse_statement()?);

            if was_return {
                while self.tokenizer.is_operator(Operator::Semicolon)
                    || self.tokenizer.token_type == TokenType::Eol
                {
                    self.tokenizer.next()?;
                }
                if !self.tokenizer.is_operator(Operator::CloseBrace) {
                    return Err(self.error("'return' must be the last statement of a block"));
                }
                self.tokenizer.next()?;
                break;
            }

            if self.tokenizer.is_operator(Operator::CloseBrace) {
                self.tokenizer.next()?;
                break;
            }

            if self.tokenizer.is_operator(Operator::Semicolon)
                || self.tokenizer.token_type == TokenType::Eol
            {
                self.tokenizer.next_ignore_eol()?;
            } else if self.tokenizer.is_eof() {
                return Err(self.error("end of file encountered before closing block '}'"));
            } else {
                return Err(self.error(format!(
                    "expected '}}', ';' or new line, found {}",
                    self.tokenizer.describe()
                )));
            }
        }

        Ok(Block { statements, pos })
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ScriptError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ScriptError> {
        let left = self.parse_term()?;

        if self.tokenizer.is_operator(Operator::Assign) {
            let pos = self.pos();

            if !left.is_lvalue() {
                return Err(self.error("left operand of '=' is not assignable"));
            }

            self.tokenizer.next()?;
            let value = self.parse_expression()?;

            return Ok(Expr::Assign {
                target: Box::new(left),
                value: Box::new(value),
                pos,
            });
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_factor()?;

        loop {
            let op = if self.tokenizer.is_operator(Operator::Plus) {
                Operator::Plus
            } else if self.tokenizer.is_operator(Operator::Minus) {
                Operator::Minus
            } else {
                break;
            };

            let pos = self.pos();
            self.tokenizer.next()?;
            let right = self.parse_factor()?;

            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                pos,
            };
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = if self.tokenizer.is_operator(Operator::Star) {
                Operator::Star
            } else if self.tokenizer.is_operator(Operator::Slash) {
                Operator::Slash
            } else if self.tokenizer.is_operator(Operator::Percent) {
                Operator::Percent
            } else {
                break;
            };

            let pos = self.pos();
            self.tokenizer.next()?;
            let right = self.parse_unary()?;

            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                pos,
            };
        }

        Ok(left)
    }

    /// Unary `+`, `-` and `!` bind tighter than every binary operator.
    fn parse_unary(&mut self) -> Result<Expr, ScriptError> {
        for op in [Operator::Plus, Operator::Minus, Operator::Not] {
            if self.tokenizer.is_operator(op) {
                let pos = self.pos();
                self.tokenizer.next()?;
                let operand = self.parse_unary()?;

                return Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                    pos,
                });
            }
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        if self.tokenizer.is_keyword("null") {
            let pos = self.pos();
            self.tokenizer.next()?;
            return Ok(Expr::Null(pos));
        }

        if self.tokenizer.is_operator(Operator::Dot) {
            return self.parse_this();
        }
        if self.tokenizer.is_operator(Operator::OpenParen) {
            return self.parse_parenthesis();
        }
        if self.tokenizer.is_operator(Operator::OpenBrace) {
            return self.parse_object();
        }
        if self.tokenizer.is_operator(Operator::OpenBracket) {
            return self.parse_array();
        }

        match self.tokenizer.token_type {
            TokenType::Str => {
                let pos = self.pos();
                let value = self.tokenizer.string.clone();
                self.tokenizer.next()?;
                Ok(Expr::Str { value, pos })
            }
            TokenType::Number => {
                let pos = self.pos();
                let value = self.tokenizer.number;
                self.tokenizer.next()?;
                Ok(Expr::Number { value, pos })
            }
            TokenType::Identifier => self.parse_variable(),
            _ => Err(self.error(format!(
                "unexpected token {}",
                self.tokenizer.describe()
            ))),
        }
    }

    /// A leading `.` roots a member chain at `this`.
    fn parse_this(&mut self) -> Result<Expr, ScriptError> {
        let pos = self.pos();
        self.parse_member_access(Expr::This(pos))
    }

    /// Bare identifier: a variable reference, or — when followed by `(` —
    /// a call or a function declaration. Member accesses chain onto the
    /// result in every case.
    fn parse_variable(&mut self) -> Result<Expr, ScriptError> {
        let pos = self.pos();
        let name = self.tokenizer.string.clone();
        self.tokenizer.next()?;

        if self.tokenizer.is_operator(Operator::OpenParen) {
            return self.parse_call_or_function(name, pos);
        }

        self.parse_member_access(Expr::Variable { name, pos })
    }

    fn parse_call_or_function(&mut self, name: String, pos: Pos) -> Result<Expr, ScriptError> {
        self.tokenizer.next()?;

        let mut args = Vec::new();
        loop {
            if self.tokenizer.is_operator(Operator::CloseParen) {
                break;
            }

            args.push(self.parse_expression()?);

            if self.tokenizer.is_operator(Operator::Comma) {
                self.tokenizer.next()?;
            } else if !self.tokenizer.is_operator(Operator::CloseParen) {
                return Err(self.error(format!(
                    "expected ',' or ')', found {}",
                    self.tokenizer.describe()
                )));
            }
        }
        self.tokenizer.next()?;

        let expr = if self.tokenizer.is_operator(Operator::OpenBrace) {
            // Declaration: the listed expressions must all be parameter names.
            let mut params = Vec::new();
            for arg in &args {
                match arg {
                    Expr::Variable { name, .. } => params.push(name.clone()),
                    other => {
                        let at = other.pos();
                        return Err(ScriptError::parser(
                            "expected parameter name",
                            at.file.as_ref(),
                            at.line,
                            at.col,
                        ));
                    }
                }
            }

            let body = self.parse_block()?;
            Expr::Function {
                name,
                params,
                body,
                pos,
            }
        } else {
            Expr::Call {
                callee: Box::new(Expr::Variable {
                    name,
                    pos: pos.clone(),
                }),
                args,
                pos,
            }
        };

        self.parse_member_access(expr)
    }

    fn parse_member_access(&mut self, expr: Expr) -> Result<Expr, ScriptError> {
        let mut result = expr;

        while self.tokenizer.is_operator(Operator::Dot) {
            let pos = self.pos();
            self.tokenizer.next()?;
            let name = self.tokenizer.expect_identifier()?;

            result = Expr::Member {
                object: Box::new(result),
                name,
                pos,
            };
        }

        Ok(result)
    }

    fn parse_parenthesis(&mut self) -> Result<Expr, ScriptError> {
        self.tokenizer.next()?;

        let expr = self.parse_expression()?;

        if !self.tokenizer.is_operator(Operator::CloseParen) {
            return Err(self.error(format!(
                "expected ')', found {}",
                self.tokenizer.describe()
            )));
        }
        self.tokenizer.next()?;

        Ok(expr)
    }

    /// `{ (key ':' expr (','|eol))* }` where a key is a string or identifier.
    fn parse_object(&mut self) -> Result<Expr, ScriptError> {
        let pos = self.pos();
        self.tokenizer.next_ignore_eol()?;

        let mut entries = Vec::new();
        while !self.tokenizer.is_operator(Operator::CloseBrace) {
            if self.tokenizer.is_eof() {
                return Err(self.error("end of file encountered before closing object '}'"));
            }
            entries.push(self.parse_object_entry()?);
        }
        self.tokenizer.next()?;

        Ok(Expr::ObjectLiteral { entries, pos })
    }

    fn parse_object_entry(&mut self) -> Result<ObjectEntry, ScriptError> {
        let key = match self.tokenizer.token_type {
            TokenType::Str | TokenType::Identifier => self.tokenizer.string.clone(),
            _ => {
                return Err(self.error(format!(
                    "expected identifier or string key, found {}",
                    self.tokenizer.describe()
                )));
            }
        };
        self.tokenizer.next_ignore_eol()?;

        if !self.tokenizer.is_operator(Operator::Colon) {
            return Err(self.error(format!(
                "expected ':', found {}",
                self.tokenizer.describe()
            )));
        }
        self.tokenizer.next_ignore_eol()?;

        let value = self.parse_expression()?;

        if self.tokenizer.is_operator(Operator::Comma) || self.tokenizer.token_type == TokenType::Eol
        {
            self.tokenizer.next_ignore_eol()?;
        } else if !self.tokenizer.is_operator(Operator::CloseBrace) {
            return Err(self.error(format!(
                "expected ',', new line or '}}', found {}",
                self.tokenizer.describe()
            )));
        }

        Ok(ObjectEntry { key, value })
    }

    /// `[ expr (','|eol)* ]`
    fn parse_array(&mut self) -> Result<Expr, ScriptError> {
        let pos = self.pos();
        self.tokenizer.next_ignore_eol()?;

        let mut values = Vec::new();
        loop {
            if self.tokenizer.is_operator(Operator::CloseBracket) {
                break;
            }
            if self.tokenizer.is_eof() {
                return Err(self.error("end of file encountered before closing ']'"));
            }

            values.push(self.parse_expression()?);

            if self.tokenizer.is_operator(Operator::Comma)
                || self.tokenizer.token_type == TokenType::Eol
            {
                self.tokenizer.next_ignore_eol()?;
            } else if !self.tokenizer.is_operator(Operator::CloseBracket) {
                return Err(self.error(format!(
                    "expected ',' or ']', found {}",
                    self.tokenizer.describe()
                )));
            }
        }
        self.tokenizer.next()?;

        Ok(Expr::ArrayLiteral { values, pos })
    }

    fn pos(&self) -> Pos {
        Pos::of(self.tokenizer)
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::parser(
            message,
            self.tokenizer.filename(),
            self.tokenizer.token_line,
            self.tokenizer.token_col,
        )
    }
}
