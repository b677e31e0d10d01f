use std::rc::Rc;

use crate::ast::{Expr, ExprKind, InfixOp, PrefixOp, Program, Stmt};
use crate::lexer;
use crate::token::{Token, TokenKind};

/// Binding strength, lowest to highest. `or`/`and` deliberately bind
/// tighter than the comparison operators; this matches the language's
/// historical precedence ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equality,
    Comparison,
    Or,
    And,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equality,
        TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual => Precedence::Comparison,
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash => Precedence::Product,
        TokenKind::LeftParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Pratt parser over a scanned token vector. Errors accumulate as
/// preformatted single-line messages; parsing continues at the next
/// statement boundary so one bad statement does not hide the rest.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<String>,
}

/// Lexes and parses `source`, returning the program or every collected
/// error message.
pub fn parse(source: &str) -> Result<Program, Vec<String>> {
    let mut parser = Parser::new(lexer::tokens(source));
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.into_errors())
    }
}

impl Parser {
    /// `tokens` must end with an `Eof` token, as produced by
    /// [`lexer::tokens`].
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(tokens.last().map_or(false, |t| t.is(TokenKind::Eof)));
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    pub fn from_source(source: &str) -> Self {
        Self::new(lexer::tokens(source))
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn cur(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.current + 1).min(last)]
    }

    // Saturates at the trailing Eof so lookahead stays in bounds.
    fn next(&mut self) {
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur().is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    /// Consumes the next token when it matches; otherwise records an
    /// `Expect <what>.` error naming the offending token.
    fn expect_peek(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.peek_is(kind) {
            self.next();
            true
        } else {
            self.error_at_peek(&format!("Expect {}.", what));
            false
        }
    }

    fn error_at_peek(&mut self, message: &str) {
        let token = self.peek().clone();
        self.errors.push(format!(
            "[line {}] Error at '{}': {}",
            token.line, token.lexeme, message
        ));
    }

    fn error_at_cur(&mut self, message: &str) {
        let token = self.cur().clone();
        self.errors.push(format!(
            "[line {}] Error at '{}': {}",
            token.line, token.lexeme, message
        ));
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.cur_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
            self.next();
        }
        Program { statements }
    }

    // After a bad statement, skip ahead to the next plausible statement
    // boundary so one mistake yields one message.
    fn synchronize(&mut self) {
        while !self.cur_is(TokenKind::Semicolon)
            && !self.cur_is(TokenKind::RightBrace)
            && !self.cur_is(TokenKind::Eof)
        {
            self.next();
        }
    }

    // Every statement parser leaves `current` on the final token of the
    // statement; `parse_program` steps past it.
    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur().kind {
            TokenKind::Semicolon => None,
            TokenKind::Var => self.parse_var_statement(),
            TokenKind::LeftBrace => self.parse_block().map(Stmt::Block),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Fun => self.parse_function_statement(),
            TokenKind::Print => self.parse_print_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next();
        }
        Some(Stmt::Expression(expr))
    }

    fn parse_print_statement(&mut self) -> Option<Stmt> {
        self.next();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next();
        }
        Some(Stmt::Print(expr))
    }

    fn parse_var_statement(&mut self) -> Option<Stmt> {
        let line = self.cur().line;
        if !self.expect_peek(TokenKind::Identifier, "variable name") {
            return None;
        }
        let name: Rc<str> = Rc::from(self.cur().lexeme.as_str());

        // `var x;` declares with an implicit nil initializer.
        if self.peek_is(TokenKind::Semicolon) {
            self.next();
            return Some(Stmt::Var {
                name,
                initializer: Expr::new(ExprKind::Nil, line),
                line,
            });
        }

        if !self.expect_peek(TokenKind::Equal, "'='") {
            return None;
        }
        self.next();
        let initializer = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next();
        }
        Some(Stmt::Var {
            name,
            initializer,
            line,
        })
    }

    fn parse_block(&mut self) -> Option<Vec<Stmt>> {
        let mut statements = Vec::new();
        self.next();
        while !self.cur_is(TokenKind::RightBrace) && !self.cur_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(stmt) => {
                    statements.push(stmt);
                    self.next();
                }
                // Recovery may stop at this block's own closer, which
                // the loop condition then picks up.
                None => {
                    self.synchronize();
                    if self.cur_is(TokenKind::Semicolon) {
                        self.next();
                    }
                }
            }
        }
        if !self.cur_is(TokenKind::RightBrace) {
            self.errors
                .push(format!("[line {}] Expect '}}'.", self.cur().line));
            return None;
        }
        Some(statements)
    }

    fn parse_if_statement(&mut self) -> Option<Stmt> {
        let line = self.cur().line;
        if !self.expect_peek(TokenKind::LeftParen, "'('") {
            return None;
        }
        self.next();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParen, "')'") {
            return None;
        }
        self.next();
        let then_branch = Box::new(self.parse_statement()?);

        // Greedy: an `else` binds to the nearest open `if`.
        let else_branch = if self.peek_is(TokenKind::Else) {
            self.next();
            self.next();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Some(Stmt::If {
            condition,
            then_branch,
            else_branch,
            line,
        })
    }

    fn parse_while_statement(&mut self) -> Option<Stmt> {
        let line = self.cur().line;
        if !self.expect_peek(TokenKind::LeftParen, "'('") {
            return None;
        }
        self.next();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParen, "')'") {
            return None;
        }
        self.next();
        let body = Box::new(self.parse_statement()?);
        Some(Stmt::While {
            condition,
            body,
            line,
        })
    }

    fn parse_for_statement(&mut self) -> Option<Stmt> {
        let line = self.cur().line;
        if !self.expect_peek(TokenKind::LeftParen, "'('") {
            return None;
        }
        self.next();

        // Init clause: a statement, or absent. A present-but-empty
        // block is rejected outright.
        let init = if self.cur_is(TokenKind::Semicolon) {
            None
        } else {
            let stmt = self.parse_statement()?;
            if matches!(&stmt, Stmt::Block(stmts) if stmts.is_empty()) {
                self.errors
                    .push(format!("[line {}] Empty initial condition.", line));
                self.skip_for_header();
                return None;
            }
            Some(Box::new(stmt))
        };
        if !self.cur_is(TokenKind::Semicolon) {
            self.error_at_cur("Expect ';'.");
            self.skip_for_header();
            return None;
        }
        self.next();

        let condition = if self.cur_is(TokenKind::Semicolon) {
            self.next();
            None
        } else {
            let cond = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Semicolon, "';'") {
                self.skip_for_header();
                return None;
            }
            self.next();
            Some(cond)
        };

        let step = if self.cur_is(TokenKind::RightParen) {
            None
        } else {
            let stmt = self.parse_statement()?;
            if matches!(&stmt, Stmt::Block(stmts) if stmts.is_empty()) {
                self.errors
                    .push(format!("[line {}] Empty increment condition.", line));
                self.skip_for_header();
                return None;
            }
            self.next();
            Some(Box::new(stmt))
        };

        if !self.cur_is(TokenKind::RightParen) {
            self.error_at_cur("Expect ')'.");
            self.skip_for_header();
            return None;
        }
        self.next();

        let body = self.parse_statement()?;
        if matches!(body, Stmt::Var { .. }) {
            self.errors.push(format!(
                "[line {}] var statement should be in a block.",
                line
            ));
            return None;
        }

        Some(Stmt::For {
            init,
            condition,
            step,
            body: Box::new(body),
            line,
        })
    }

    // Abandons a malformed loop header: skips to the `)` matching the
    // header's opening paren so recovery resumes after it.
    fn skip_for_header(&mut self) {
        let mut depth = 1usize;
        while depth > 0 && !self.cur_is(TokenKind::Eof) {
            self.next();
            match self.cur().kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
        }
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let line = self.cur().line;
        if self.peek_is(TokenKind::Semicolon) {
            self.next();
            return Some(Stmt::Return { value: None, line });
        }
        if self.peek_is(TokenKind::RightBrace) || self.peek_is(TokenKind::Eof) {
            return Some(Stmt::Return { value: None, line });
        }
        self.next();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next();
        }
        Some(Stmt::Return {
            value: Some(value),
            line,
        })
    }

    fn parse_function_statement(&mut self) -> Option<Stmt> {
        let line = self.cur().line;
        if self.peek_is(TokenKind::Identifier) {
            self.next();
        } else {
            self.errors
                .push(format!("[line {}] Expect function name.", self.cur().line));
            return None;
        }
        let name: Rc<str> = Rc::from(self.cur().lexeme.as_str());

        if !self.expect_peek(TokenKind::LeftParen, "'('") {
            return None;
        }
        let params = self.parse_parameters()?;

        if !self.expect_peek(TokenKind::LeftBrace, "'{'") {
            return None;
        }
        let body = self.parse_block()?;

        Some(Stmt::Function {
            name,
            params,
            body,
            line,
        })
    }

    // Current token is the opening paren; leaves it on the closing one.
    fn parse_parameters(&mut self) -> Option<Vec<Rc<str>>> {
        let mut params = Vec::new();
        if self.peek_is(TokenKind::RightParen) {
            self.next();
            return Some(params);
        }
        loop {
            if !self.expect_peek(TokenKind::Identifier, "parameter name") {
                return None;
            }
            params.push(Rc::from(self.cur().lexeme.as_str()));
            if self.peek_is(TokenKind::Comma) {
                self.next();
            } else {
                break;
            }
        }
        if !self.expect_peek(TokenKind::RightParen, "')'") {
            return None;
        }
        Some(params)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;
        while !self.peek_is(TokenKind::Semicolon) && precedence < precedence_of(self.peek().kind) {
            self.next();
            left = self.parse_infix(left)?;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let line = self.cur().line;
        let expr = match self.cur().kind {
            TokenKind::True => Expr::new(ExprKind::Boolean(true), line),
            TokenKind::False => Expr::new(ExprKind::Boolean(false), line),
            TokenKind::Nil => Expr::new(ExprKind::Nil, line),
            TokenKind::Number => {
                let value = match self.cur().lexeme.parse::<f64>() {
                    Ok(value) => value,
                    Err(_) => {
                        self.error_at_cur("Expect expression.");
                        return None;
                    }
                };
                Expr::new(ExprKind::Number(value), line)
            }
            TokenKind::String => Expr::new(
                ExprKind::String(Rc::from(self.cur().literal.as_str())),
                line,
            ),
            TokenKind::Identifier => return self.parse_identifier(),
            TokenKind::LeftParen => return self.parse_group(),
            TokenKind::Minus => return self.parse_prefix_op(PrefixOp::Neg),
            TokenKind::Bang => return self.parse_prefix_op(PrefixOp::Not),
            _ => {
                self.error_at_cur("Expect expression.");
                return None;
            }
        };
        Some(expr)
    }

    // An identifier followed by `=` is an assignment target; the right
    // side restarts at lowest precedence so chains right-associate.
    fn parse_identifier(&mut self) -> Option<Expr> {
        let line = self.cur().line;
        let name: Rc<str> = Rc::from(self.cur().lexeme.as_str());
        if self.peek_is(TokenKind::Equal) {
            self.next();
            self.next();
            let value = self.parse_expression(Precedence::Lowest)?;
            Some(Expr::new(
                ExprKind::Assign {
                    name,
                    value: Box::new(value),
                },
                line,
            ))
        } else {
            Some(Expr::new(ExprKind::Identifier(name), line))
        }
    }

    fn parse_group(&mut self) -> Option<Expr> {
        let line = self.cur().line;
        self.next();
        let inner = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::RightParen) {
            self.next();
        } else if self.errors.is_empty() {
            self.error_at_peek("Expect ')'.");
            return None;
        }
        Some(Expr::new(ExprKind::Group(Box::new(inner)), line))
    }

    fn parse_prefix_op(&mut self, op: PrefixOp) -> Option<Expr> {
        let line = self.cur().line;
        self.next();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::new(
            ExprKind::Prefix {
                op,
                right: Box::new(right),
            },
            line,
        ))
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        if self.cur_is(TokenKind::LeftParen) {
            return self.parse_call(left);
        }
        let line = self.cur().line;
        let op = InfixOp::from_token(self.cur().kind)?;
        let precedence = precedence_of(self.cur().kind);
        self.next();
        let right = self.parse_expression(precedence)?;
        Some(Expr::new(
            ExprKind::Infix {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            line,
        ))
    }

    // Current token is the opening paren of the argument list.
    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        let line = self.cur().line;
        let mut args = Vec::new();
        if self.peek_is(TokenKind::RightParen) {
            self.next();
        } else {
            loop {
                self.next();
                args.push(self.parse_expression(Precedence::Lowest)?);
                if self.peek_is(TokenKind::Comma) {
                    self.next();
                } else {
                    break;
                }
            }
            if !self.expect_peek(TokenKind::RightParen, "')'") {
                return None;
            }
        }
        Some(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            line,
        ))
    }
}
