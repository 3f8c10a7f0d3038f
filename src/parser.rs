// ABOUTME: Pratt-style expression parser plus statement recogniser

use crate::ast::*;
use crate::error::InterpreterError;
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};
use num_bigint::BigInt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    AndOr,
    Equals,
    Identifier,
    LessGreater,
    Composition,
    Sum,
    Product,
    Call,
    Prefix,
    Index,
}

fn infix_precedence(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::AndAnd | TokenKind::OrOr => Precedence::AndOr,
        TokenKind::Eq | TokenKind::NotEq | TokenKind::Assign => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Precedence::LessGreater,
        TokenKind::RShift | TokenKind::PipeGt | TokenKind::DotDot | TokenKind::DotDotEq => {
            Precedence::Composition
        }
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent | TokenKind::BacktickIdent => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Consumes a pre-tokenized stream and produces a Program or a parse error.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, InterpreterError> {
        let tokens = tokenize(source)?;
        Ok(Parser { tokens, pos: 0 })
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.current().line, self.current().column)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, InterpreterError> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(InterpreterError::parse(
                format!("expected {:?}, found {:?}", kind, self.current().kind),
                self.current().line,
                self.current().column,
            ))
        }
    }

    fn skip_semicolon(&mut self) {
        if self.at(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, InterpreterError> {
        let mut statements = Vec::new();
        while !self.at(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_block(&mut self) -> Result<Block, InterpreterError> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, InterpreterError> {
        let loc = self.loc();
        let kind = match &self.current().kind {
            TokenKind::Let => self.parse_let()?,
            TokenKind::Return => {
                self.advance();
                let value = self.parse_expression(Precedence::Lowest)?;
                self.skip_semicolon();
                StatementKind::Return(value)
            }
            TokenKind::Break => {
                self.advance();
                let value = self.parse_expression(Precedence::Lowest)?;
                self.skip_semicolon();
                StatementKind::Break(value)
            }
            TokenKind::At => {
                self.advance();
                let name_tok = self.expect(TokenKind::Identifier)?;
                let inner = Box::new(self.parse_statement()?);
                StatementKind::Annotated { annotation: name_tok.literal, statement: inner }
            }
            TokenKind::Identifier if self.peek().kind == TokenKind::Colon => {
                let name = self.advance().literal;
                self.advance(); // colon
                let body = if self.at(&TokenKind::LBrace) {
                    self.parse_block()?
                } else {
                    let expr = self.parse_expression(Precedence::Lowest)?;
                    Block { statements: vec![Statement::new(StatementKind::Expression(expr), loc)] }
                };
                self.skip_semicolon();
                StatementKind::Section { name, body }
            }
            _ => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.skip_semicolon();
                StatementKind::Expression(expr)
            }
        };
        Ok(Statement::new(kind, loc))
    }

    fn parse_let(&mut self) -> Result<StatementKind, InterpreterError> {
        self.expect(TokenKind::Let)?;
        let mutable = if self.at(&TokenKind::Mut) {
            self.advance();
            true
        } else {
            false
        };
        let pattern = self.parse_pattern()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(StatementKind::Let { mutable, pattern, value })
    }

    // ---- patterns ----

    fn parse_pattern(&mut self) -> Result<Pattern, InterpreterError> {
        let loc = self.loc();
        let base = match &self.current().kind {
            TokenKind::Underscore => {
                self.advance();
                Pattern::new(PatternKind::Wildcard, loc)
            }
            TokenKind::Identifier => {
                let name = self.advance().literal;
                Pattern::new(PatternKind::Identifier(name), loc)
            }
            TokenKind::Integer | TokenKind::Decimal | TokenKind::String | TokenKind::True
            | TokenKind::False | TokenKind::Nil | TokenKind::Minus => {
                let expr = self.parse_expression(Precedence::Prefix)?;
                Pattern::new(PatternKind::Literal(expr), loc)
            }
            TokenKind::LBracket => self.parse_list_pattern()?,
            TokenKind::HashBrace => self.parse_dict_pattern()?,
            other => {
                return Err(InterpreterError::parse(
                    format!("malformed pattern, found {other:?}"),
                    loc.line,
                    loc.column,
                ));
            }
        };

        if self.at(&TokenKind::If) {
            self.advance();
            let condition = self.parse_expression(Precedence::Lowest)?;
            Ok(Pattern::new(
                PatternKind::Guard { pattern: Box::new(base), condition: Box::new(condition) },
                loc,
            ))
        } else {
            Ok(base)
        }
    }

    fn parse_list_pattern(&mut self) -> Result<Pattern, InterpreterError> {
        let loc = self.loc();
        self.expect(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.at(&TokenKind::RBracket) {
            if self.at(&TokenKind::DotDot) {
                self.advance();
                let name = self.expect(TokenKind::Identifier)?;
                rest = Some(name.literal);
            } else {
                elements.push(self.parse_pattern()?);
            }
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Pattern::new(PatternKind::List { elements, rest }, loc))
    }

    fn parse_dict_pattern(&mut self) -> Result<Pattern, InterpreterError> {
        let loc = self.loc();
        self.expect(TokenKind::HashBrace)?;
        let mut entries = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            let key = self.expect(TokenKind::Identifier)?;
            self.expect(TokenKind::Colon)?;
            let pattern = self.parse_pattern()?;
            entries.push((key.literal, pattern));
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Pattern::new(PatternKind::Dict { entries }, loc))
    }

    // ---- expressions ----

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, InterpreterError> {
        let mut left = self.parse_prefix()?;

        while !self.at(&TokenKind::Semicolon)
            && !self.at(&TokenKind::Eof)
            && precedence < infix_precedence(&self.current().kind)
        {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, InterpreterError> {
        let loc = self.loc();
        match self.current().kind.clone() {
            TokenKind::Integer => {
                let tok = self.advance();
                let value = BigInt::from_str(&tok.literal).map_err(|_| {
                    InterpreterError::parse(format!("invalid integer literal '{}'", tok.literal), loc.line, loc.column)
                })?;
                Ok(Expression::new(ExpressionKind::Integer(value), loc))
            }
            TokenKind::Decimal => {
                let tok = self.advance();
                let value: f64 = tok.literal.parse().map_err(|_| {
                    InterpreterError::parse(format!("invalid decimal literal '{}'", tok.literal), loc.line, loc.column)
                })?;
                Ok(Expression::new(ExpressionKind::Decimal(value), loc))
            }
            TokenKind::String => {
                let tok = self.advance();
                let segments = parse_string_segments(&tok.literal, loc)?;
                Ok(Expression::new(ExpressionKind::StringLiteral(segments), loc))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::new(ExpressionKind::Boolean(true), loc))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::new(ExpressionKind::Boolean(false), loc))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expression::new(ExpressionKind::Nil, loc))
            }
            TokenKind::Underscore => {
                self.advance();
                Ok(Expression::new(ExpressionKind::Placeholder, loc))
            }
            TokenKind::Identifier => {
                let name = self.advance().literal;
                Ok(Expression::new(ExpressionKind::Identifier(name), loc))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_list_literal(loc),
            TokenKind::HashBrace => self.parse_dict_or_set_literal(loc),
            TokenKind::Minus | TokenKind::Bang => {
                let op = self.advance().literal;
                let operand = self.parse_expression(Precedence::Prefix)?;
                Ok(Expression::new(
                    ExpressionKind::Prefix { operator: op, operand: Box::new(operand) },
                    loc,
                ))
            }
            TokenKind::If => self.parse_if(loc),
            TokenKind::Match => self.parse_match(loc),
            TokenKind::Pipe | TokenKind::OrOr => self.parse_function_literal(loc),
            other => Err(InterpreterError::parse(
                format!("unexpected token {other:?} in expression position"),
                loc.line,
                loc.column,
            )),
        }
    }

    fn parse_list_literal(&mut self, loc: SourceLocation) -> Result<Expression, InterpreterError> {
        self.expect(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        while !self.at(&TokenKind::RBracket) {
            elements.push(self.parse_expression(Precedence::Lowest)?);
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Expression::new(ExpressionKind::ListLiteral(elements), loc))
    }

    fn parse_dict_or_set_literal(&mut self, loc: SourceLocation) -> Result<Expression, InterpreterError> {
        self.expect(TokenKind::HashBrace)?;
        let mut pairs: Vec<(Expression, Expression)> = Vec::new();
        let mut set_elements: Vec<Expression> = Vec::new();
        let mut is_dict: Option<bool> = None;

        while !self.at(&TokenKind::RBrace) {
            let key_or_elem = self.parse_expression(Precedence::Lowest)?;
            if self.at(&TokenKind::Colon) {
                self.advance();
                let value = self.parse_expression(Precedence::Lowest)?;
                is_dict.get_or_insert(true);
                pairs.push((key_or_elem, value));
            } else {
                is_dict.get_or_insert(false);
                set_elements.push(key_or_elem);
            }
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        if is_dict.unwrap_or(true) {
            Ok(Expression::new(ExpressionKind::DictLiteral(pairs), loc))
        } else {
            Ok(Expression::new(ExpressionKind::SetLiteral(set_elements), loc))
        }
    }

    fn parse_if(&mut self, loc: SourceLocation) -> Result<Expression, InterpreterError> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_block()?;
        let alternative = if self.at(&TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Expression::new(
            ExpressionKind::If {
                condition: Box::new(condition),
                consequence,
                alternative,
            },
            loc,
        ))
    }

    fn parse_match(&mut self, loc: SourceLocation) -> Result<Expression, InterpreterError> {
        self.expect(TokenKind::Match)?;
        let scrutinee = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::LBrace)?;
        let mut arms = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            let pattern = self.parse_pattern()?;
            self.expect(TokenKind::FatArrow)?;
            let body = if self.at(&TokenKind::LBrace) {
                self.parse_block()?
            } else {
                let expr = self.parse_expression(Precedence::Lowest)?;
                Block { statements: vec![Statement::new(StatementKind::Expression(expr), loc)] }
            };
            arms.push(MatchArm { pattern, body });
            if self.at(&TokenKind::Comma) {
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Expression::new(
            ExpressionKind::Match { scrutinee: Box::new(scrutinee), arms },
            loc,
        ))
    }

    fn parse_function_literal(&mut self, loc: SourceLocation) -> Result<Expression, InterpreterError> {
        let params = if self.at(&TokenKind::OrOr) {
            self.advance();
            Vec::new()
        } else {
            self.expect(TokenKind::Pipe)?;
            let mut params = Vec::new();
            while !self.at(&TokenKind::Pipe) {
                params.push(self.parse_pattern()?);
                if self.at(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect(TokenKind::Pipe)?;
            params
        };

        let body = if self.at(&TokenKind::LBrace) {
            self.parse_block()?
        } else {
            let expr = self.parse_expression(Precedence::Lowest)?;
            Block { statements: vec![Statement::new(StatementKind::Expression(expr), loc)] }
        };

        Ok(Expression::new(ExpressionKind::FunctionLiteral { params, body }, loc))
    }

    fn parse_infix(&mut self, left: Expression) -> Result<Expression, InterpreterError> {
        let loc = self.loc();
        match self.current().kind.clone() {
            TokenKind::LParen => self.parse_call(left, loc),
            TokenKind::LBracket => {
                self.advance();
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RBracket)?;
                Ok(Expression::new(
                    ExpressionKind::Index { object: Box::new(left), index: Box::new(index) },
                    loc,
                ))
            }
            TokenKind::Assign => {
                self.advance();
                let value = self.parse_expression(Precedence::Equals)?;
                Ok(Expression::new(
                    ExpressionKind::Call {
                        callee: Box::new(Expression::new(
                            ExpressionKind::Identifier("=".to_string()),
                            loc,
                        )),
                        args: vec![left, value],
                    },
                    loc,
                ))
            }
            TokenKind::DotDot | TokenKind::DotDotEq => {
                let inclusive = self.current().kind == TokenKind::DotDotEq;
                self.advance();
                let prec = infix_precedence(&TokenKind::DotDot);
                // an absent upper bound (`1..`) is a valid, infinite range
                let end = if self.at(&TokenKind::Semicolon)
                    || self.at(&TokenKind::Eof)
                    || self.at(&TokenKind::RParen)
                    || self.at(&TokenKind::RBracket)
                    || self.at(&TokenKind::RBrace)
                    || self.at(&TokenKind::Comma)
                {
                    None
                } else {
                    Some(Box::new(self.parse_expression(prec)?))
                };
                Ok(Expression::new(
                    ExpressionKind::RangeLiteral { start: Box::new(left), end, inclusive },
                    loc,
                ))
            }
            kind => {
                let operator = self.current().literal.clone();
                let precedence = infix_precedence(&kind);
                self.advance();
                let right = self.parse_expression(precedence)?;
                Ok(Expression::new(
                    ExpressionKind::Call {
                        callee: Box::new(Expression::new(ExpressionKind::Identifier(operator), loc)),
                        args: vec![left, right],
                    },
                    loc,
                ))
            }
        }
    }

    fn parse_call(&mut self, callee: Expression, loc: SourceLocation) -> Result<Expression, InterpreterError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) {
            args.push(self.parse_expression(Precedence::Lowest)?);
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        // trailing-lambda call shorthand: `f(a)|x| { .. }` appends the lambda
        if self.at(&TokenKind::Pipe) || self.at(&TokenKind::OrOr) {
            let lambda_loc = self.loc();
            let lambda = self.parse_function_literal(lambda_loc)?;
            args.push(lambda);
        }

        Ok(Expression::new(
            ExpressionKind::Call { callee: Box::new(callee), args },
            loc,
        ))
    }
}

/// Splits a decoded string literal into text/interpolation segments.
fn parse_string_segments(
    literal: &str,
    loc: SourceLocation,
) -> Result<Vec<StringSegment>, InterpreterError> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let chars: Vec<char> = literal.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' {
            if !text.is_empty() {
                segments.push(StringSegment::Text(std::mem::take(&mut text)));
            }
            let mut depth = 1;
            let start = i + 1;
            i += 1;
            while i < chars.len() && depth > 0 {
                match chars[i] {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                if depth == 0 {
                    break;
                }
                i += 1;
            }
            if depth != 0 {
                return Err(InterpreterError::parse(
                    "unterminated interpolation in string literal",
                    loc.line,
                    loc.column,
                ));
            }
            let inner: String = chars[start..i].iter().collect();
            let mut parser = Parser::from_tokens(tokenize(&inner)?);
            let expr = parser.parse_expression(Precedence::Lowest)?;
            segments.push(StringSegment::Interpolation(expr));
            i += 1; // skip closing brace
        } else {
            text.push(chars[i]);
            i += 1;
        }
    }
    if !text.is_empty() || segments.is_empty() {
        segments.push(StringSegment::Text(text));
    }
    Ok(segments)
}

pub fn parse(source: &str) -> Result<Program, InterpreterError> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_of(program: &Program) -> &Expression {
        match &program.statements[0].kind {
            StatementKind::Expression(e) => e,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn call_name(expr: &Expression) -> &str {
        match &expr.kind {
            ExpressionKind::Call { callee, .. } => match &callee.kind {
                ExpressionKind::Identifier(name) => name,
                _ => panic!("callee is not identifier"),
            },
            _ => panic!("not a call"),
        }
    }

    #[test]
    fn parses_integer_literal() {
        let program = parse("42").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::Integer(n) => assert_eq!(*n, BigInt::from(42)),
            other => panic!("expected integer, got {other:?}"),
        }
    }

    #[test]
    fn precedence_product_binds_tighter_than_sum_left_assoc() {
        let program = parse("a + b * c").unwrap();
        let expr = expr_of(&program);
        assert_eq!(call_name(expr), "+");
        match &expr.kind {
            ExpressionKind::Call { args, .. } => {
                assert_eq!(call_name(&args[1]), "*");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn precedence_sum_over_product_other_order() {
        let program = parse("a * b + c").unwrap();
        let expr = expr_of(&program);
        assert_eq!(call_name(expr), "+");
        match &expr.kind {
            ExpressionKind::Call { args, .. } => assert_eq!(call_name(&args[0]), "*"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn and_or_remain_calls_for_evaluator_to_special_case() {
        let program = parse("true && false").unwrap();
        let expr = expr_of(&program);
        assert_eq!(call_name(expr), "&&");
    }

    #[test]
    fn parses_let_with_mut() {
        let program = parse("let mut x = 5;").unwrap();
        match &program.statements[0].kind {
            StatementKind::Let { mutable, pattern, .. } => {
                assert!(mutable);
                assert!(matches!(pattern.kind, PatternKind::Identifier(_)));
            }
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn parses_section_header() {
        let program = parse("part_one: { 42 }").unwrap();
        match &program.statements[0].kind {
            StatementKind::Section { name, body } => {
                assert_eq!(name, "part_one");
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn parses_an_expression_bodied_section() {
        let program = parse(r#"input: "()())""#).unwrap();
        match &program.statements[0].kind {
            StatementKind::Section { name, body } => {
                assert_eq!(name, "input");
                assert_eq!(body.statements.len(), 1);
                assert!(matches!(body.statements[0].kind, StatementKind::Expression(_)));
            }
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn parses_function_literal_and_call() {
        let program = parse("map(|x| x * 2, [1, 2, 3])").unwrap();
        let expr = expr_of(&program);
        assert_eq!(call_name(expr), "map");
    }

    #[test]
    fn trailing_lambda_is_appended_to_call_args() {
        let program = parse("fold(0)|f, d| { f + d }").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::Call { args, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(args[1].kind, ExpressionKind::FunctionLiteral { .. }));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn backtick_infix_desugars_to_a_call_of_the_named_identifier() {
        let program = parse("a `gcd` b").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::Call { callee, args } => {
                assert!(matches!(&callee.kind, ExpressionKind::Identifier(name) if name == "gcd"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn parses_infinite_range() {
        let program = parse("1..").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::RangeLiteral { end, inclusive, .. } => {
                assert!(end.is_none());
                assert!(!inclusive);
            }
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn parses_inclusive_range() {
        let program = parse("1..=5").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::RangeLiteral { end, inclusive, .. } => {
                assert!(end.is_some());
                assert!(inclusive);
            }
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn parses_placeholder() {
        let program = parse("f(_, 2)").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::Call { args, .. } => {
                assert!(matches!(args[0].kind, ExpressionKind::Placeholder));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn parses_list_pattern_with_rest() {
        let program = parse("let [a, b, ..rest] = [1, 2, 3, 4];").unwrap();
        match &program.statements[0].kind {
            StatementKind::Let { pattern, .. } => match &pattern.kind {
                PatternKind::List { elements, rest } => {
                    assert_eq!(elements.len(), 2);
                    assert_eq!(rest.as_deref(), Some("rest"));
                }
                other => panic!("expected list pattern, got {other:?}"),
            },
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn parses_dict_literal_vs_set_literal() {
        let dict = parse("#{a: 1, b: 2}").unwrap();
        assert!(matches!(expr_of(&dict).kind, ExpressionKind::DictLiteral(_)));

        let set = parse("#{1, 2, 3}").unwrap();
        assert!(matches!(expr_of(&set).kind, ExpressionKind::SetLiteral(_)));
    }

    #[test]
    fn parses_match_expression_with_guard() {
        let program = parse("match x { n if n > 0 => 1, _ => 0 }").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::Match { arms, .. } => {
                assert_eq!(arms.len(), 2);
                assert!(matches!(arms[0].pattern.kind, PatternKind::Guard { .. }));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn parses_string_interpolation() {
        let program = parse(r#""hi {name}!""#).unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::StringLiteral(segments) => {
                assert_eq!(segments.len(), 3);
                assert!(matches!(segments[1], StringSegment::Interpolation(_)));
            }
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn parses_pipeline_and_composition_left_associative() {
        let program = parse("x |> f >> g").unwrap();
        let expr = expr_of(&program);
        assert_eq!(call_name(expr), ">>");
    }

    #[test]
    fn unclosed_list_is_parse_error() {
        let err = parse("[1, 2").unwrap_err();
        assert!(matches!(err, InterpreterError::Parse { .. }));
    }

    #[test]
    fn unexpected_token_in_prefix_position_is_parse_error() {
        let err = parse(")").unwrap_err();
        assert!(matches!(err, InterpreterError::Parse { .. }));
    }

    #[test]
    fn parses_zero_arg_function_literal_from_oror_token() {
        let program = parse("|| 5").unwrap();
        match &expr_of(&program).kind {
            ExpressionKind::FunctionLiteral { params, .. } => assert!(params.is_empty()),
            other => panic!("expected function literal, got {other:?}"),
        }
    }

    #[test]
    fn parses_annotated_statement() {
        let program = parse("@slow test: { 1 }").unwrap();
        match &program.statements[0].kind {
            StatementKind::Annotated { annotation, statement } => {
                assert_eq!(annotation, "slow");
                assert!(matches!(statement.kind, StatementKind::Section { .. }));
            }
            other => panic!("expected annotated, got {other:?}"),
        }
    }

    #[test]
    fn determinism_parsing_twice_yields_equal_ast() {
        let source = "let x = 1 + 2 * 3;";
        assert_eq!(parse(source).unwrap(), parse(source).unwrap());
    }
}
