//! Recursive-descent parser for Mint.
//!
//! Binary operators are parsed with a table of left-associative
//! precedence levels; assignment `=` is right-associative and binds
//! looser than everything in the table. Unary `not` and `-` bind tighter
//! than multiplicative operators. `var` is only legal directly inside a
//! block or at the top level; every other position rejects it.
//!
//! Blocks encode their value position at parse time: when the last
//! statement of a block is followed by a semicolon, or is a `while` or an
//! `if` without `else`, a synthetic `Unit` identifier is appended so the
//! block typechecks to `Unit`.

use crate::ast::{ExprKind, Expression, LiteralValue};
use crate::tokenizer::{Location, Token, TokenKind};

/// Left-associative binary operator levels, loosest binding first.
const BINARY_OPERATOR_LEVELS: &[&[&str]] = &[
    &["or"],
    &["and"],
    &["==", "!="],
    &["<", "<=", ">", ">="],
    &["+", "-"],
    &["*", "/", "%"],
];

/// Parse a token sequence into a single expression. A multi-statement
/// source is wrapped in a block carrying the first statement's location.
pub fn parse(tokens: &[Token]) -> Result<Expression, String> {
    if tokens.is_empty() {
        return Err("Empty input: expected an expression".to_string());
    }
    Parser { tokens, pos: 0 }.parse_top_level()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    /// The token at the cursor, or a synthetic `End` token placed at the
    /// last real token once the input is exhausted.
    fn peek(&self) -> Token {
        match self.tokens.get(self.pos) {
            Some(token) => token.clone(),
            None => Token::new(
                "",
                TokenKind::End,
                self.tokens[self.tokens.len() - 1].loc,
            ),
        }
    }

    fn advance(&mut self) -> Token {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn consume(&mut self, expected: &str) -> Result<Token, String> {
        let token = self.peek();
        if token.text != expected {
            return Err(format!(
                "{}: expected \"{}\", got \"{}\"",
                token.loc, expected, token.text
            ));
        }
        self.pos += 1;
        Ok(token)
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::End
    }

    fn parse_top_level(&mut self) -> Result<Expression, String> {
        let mut statements = Vec::new();
        let mut trailing_semicolon = false;

        while !self.at_end() {
            statements.push(self.parse_assignment()?);

            if self.peek().text == ";" {
                self.advance();
                trailing_semicolon = true;
            } else if !self.at_end() {
                let token = self.peek();
                return Err(format!(
                    "{}: unexpected token \"{}\" after complete expression",
                    token.loc, token.text
                ));
            } else {
                trailing_semicolon = false;
            }
        }

        if trailing_semicolon {
            let loc = self.tokens[self.tokens.len() - 1].loc;
            statements.push(unit_identifier(loc));
        }

        if statements.len() == 1 {
            return Ok(statements.remove(0));
        }
        let loc = statements[0].loc;
        Ok(Expression::new(loc, ExprKind::Block { statements }))
    }

    /// `=` is right-associative and sits above the precedence table.
    fn parse_assignment(&mut self) -> Result<Expression, String> {
        let left = self.parse_binary(0)?;
        if self.peek().text == "=" {
            let token = self.advance();
            let right = self.parse_assignment()?;
            return Ok(Expression::new(
                token.loc,
                ExprKind::Binary {
                    left: Box::new(left),
                    op: token.text,
                    right: Box::new(right),
                },
            ));
        }
        Ok(left)
    }

    fn parse_binary(&mut self, level: usize) -> Result<Expression, String> {
        if level >= BINARY_OPERATOR_LEVELS.len() {
            return self.parse_base();
        }
        let ops = BINARY_OPERATOR_LEVELS[level];
        let mut left = self.parse_binary(level + 1)?;
        while ops.contains(&self.peek().text.as_str()) {
            let token = self.advance();
            let right = self.parse_binary(level + 1)?;
            left = Expression::new(
                token.loc,
                ExprKind::Binary {
                    left: Box::new(left),
                    op: token.text,
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    /// The bottom of the precedence table: control-flow forms, `var`,
    /// unary operators, and factors.
    fn parse_base(&mut self) -> Result<Expression, String> {
        match self.peek().text.as_str() {
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "var" => self.parse_var(),
            "not" | "-" => self.parse_unary(),
            _ => self.parse_factor(),
        }
    }

    fn parse_unary(&mut self) -> Result<Expression, String> {
        let token = self.advance();
        let operand = if self.peek().text == "not" || self.peek().text == "-" {
            self.parse_unary()?
        } else {
            self.parse_factor()?
        };
        Ok(Expression::new(
            token.loc,
            ExprKind::Unary {
                op: token.text,
                operand: Box::new(operand),
            },
        ))
    }

    /// Sub-expression positions reject a leading `var`.
    fn parse_expression_no_var(&mut self) -> Result<Expression, String> {
        if self.peek().text == "var" {
            return Err(format!(
                "{}: unexpected token var, var is only allowed directly inside blocks and at the top level",
                self.peek().loc
            ));
        }
        self.parse_assignment()
    }

    fn parse_if(&mut self) -> Result<Expression, String> {
        let token_if = self.consume("if")?;
        let condition = self.parse_expression_no_var()?;
        self.consume("then")?;
        let then_branch = self.parse_expression_no_var()?;

        let else_branch = if self.peek().text == "else" {
            self.advance();
            Some(Box::new(self.parse_expression_no_var()?))
        } else {
            None
        };

        Ok(Expression::new(
            token_if.loc,
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
        ))
    }

    fn parse_while(&mut self) -> Result<Expression, String> {
        let token_while = self.consume("while")?;
        let condition = self.parse_expression_no_var()?;
        self.consume("do")?;
        let body = self.parse_expression_no_var()?;

        Ok(Expression::new(
            token_while.loc,
            ExprKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
        ))
    }

    fn parse_var(&mut self) -> Result<Expression, String> {
        let token_var = self.consume("var")?;

        let name_token = self.peek();
        if name_token.kind != TokenKind::Identifier {
            return Err(format!(
                "{}: expected an identifier after \"var\", got \"{}\"",
                name_token.loc, name_token.text
            ));
        }
        self.advance();
        let name = name_token.text;

        let mut typed = None;
        if self.peek().text == ":" {
            self.advance();
            if self.peek().text == "(" {
                // Function-type annotation: (T1, T2) => R. An empty
                // parameter list parses to an absent list, not an empty
                // one. The `=>` arrow is two tokens.
                self.advance();
                let param_types = if self.peek().text == ")" {
                    None
                } else {
                    let mut params = vec![self.parse_factor()?];
                    while self.peek().text == "," {
                        self.advance();
                        params.push(self.parse_factor()?);
                    }
                    Some(params)
                };
                self.consume(")")?;
                self.consume("=")?;
                self.consume(">")?;
                let return_type = self.parse_factor()?;
                typed = Some(Box::new(Expression::new(
                    token_var.loc,
                    ExprKind::FunType {
                        param_types,
                        return_type: Box::new(return_type),
                    },
                )));
            } else {
                typed = Some(Box::new(self.parse_factor()?));
            }
        }

        self.consume("=")?;
        let initializer = self.parse_assignment()?;

        Ok(Expression::new(
            token_var.loc,
            ExprKind::Var {
                name,
                typed,
                initializer: Box::new(initializer),
            },
        ))
    }

    fn parse_factor(&mut self) -> Result<Expression, String> {
        let token = self.peek();
        if token.text == "(" {
            return self.parse_parenthesized();
        }
        if token.text == "{" {
            return self.parse_block();
        }
        match token.kind {
            TokenKind::IntLiteral => self.parse_int_literal(),
            TokenKind::Identifier => {
                let identifier = self.parse_identifier()?;
                if self.peek().text == "(" {
                    self.parse_call(identifier)
                } else {
                    Ok(identifier)
                }
            }
            _ => Err(format!(
                "{}: expected \"(\", an integer literal or an identifier, got \"{}\"",
                token.loc, token.text
            )),
        }
    }

    fn parse_int_literal(&mut self) -> Result<Expression, String> {
        let token = self.peek();
        if token.kind != TokenKind::IntLiteral {
            return Err(format!("{}: expected an integer literal", token.loc));
        }
        self.advance();
        let value: i64 = token
            .text
            .parse()
            .map_err(|_| format!("{}: integer literal out of range", token.loc))?;
        Ok(Expression::new(
            token.loc,
            ExprKind::Literal(LiteralValue::Int(value)),
        ))
    }

    fn parse_identifier(&mut self) -> Result<Expression, String> {
        let token = self.peek();
        if token.kind != TokenKind::Identifier {
            return Err(format!("{}: expected an identifier", token.loc));
        }
        self.advance();
        Ok(Expression::new(token.loc, ExprKind::Identifier(token.text)))
    }

    fn parse_parenthesized(&mut self) -> Result<Expression, String> {
        self.consume("(")?;
        let expr = self.parse_assignment()?;
        self.consume(")")?;
        Ok(expr)
    }

    fn parse_call(&mut self, callee: Expression) -> Result<Expression, String> {
        let token_open = self.consume("(")?;

        let mut arguments = Vec::new();
        if self.peek().text != ")" {
            loop {
                arguments.push(self.parse_expression_no_var()?);
                if self.peek().text == "," {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.consume(")")?;

        Ok(Expression::new(
            token_open.loc,
            ExprKind::Call {
                callee: Box::new(callee),
                arguments,
            },
        ))
    }

    fn parse_block(&mut self) -> Result<Expression, String> {
        let open = self.consume("{")?;

        let mut statements = Vec::new();
        let mut trailing_semicolon = false;
        while self.peek().text != "}" {
            if self.at_end() {
                return Err(format!("{}: expected \"}}\"", self.peek().loc));
            }

            let statement = self.parse_assignment()?;

            // A bare identifier or literal statement must be terminated;
            // anything else (blocks, if, while, calls, ...) may stand
            // directly before the next statement.
            let bare = matches!(
                statement.kind,
                ExprKind::Identifier(_) | ExprKind::Literal(_)
            );
            if bare && self.peek().text != "}" && self.peek().text != ";" {
                return Err(format!(
                    "{}: expected token \"}}\" or \";\"",
                    self.peek().loc
                ));
            }

            statements.push(statement);

            if self.peek().text == ";" {
                self.advance();
                trailing_semicolon = true;
            } else {
                trailing_semicolon = false;
            }
        }
        let close = self.consume("}")?;

        let non_producing = statements.last().is_some_and(|last| {
            matches!(
                last.kind,
                ExprKind::While { .. }
                    | ExprKind::If {
                        else_branch: None,
                        ..
                    }
            )
        });
        if trailing_semicolon || non_producing {
            statements.push(unit_identifier(close.loc));
        }

        Ok(Expression::new(open.loc, ExprKind::Block { statements }))
    }
}

fn unit_identifier(loc: Location) -> Expression {
    Expression::new(loc, ExprKind::Identifier("Unit".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    const L: Location = Location::ANY;

    fn parse_source(src: &str) -> Expression {
        parse(&tokenize(src)).expect("parse failed")
    }

    fn parse_error(src: &str) -> String {
        parse(&tokenize(src)).expect_err("parse unexpectedly succeeded")
    }

    fn literal(value: i64) -> Expression {
        Expression::new(L, ExprKind::Literal(LiteralValue::Int(value)))
    }

    fn identifier(name: &str) -> Expression {
        Expression::new(L, ExprKind::Identifier(name.to_string()))
    }

    fn binary(left: Expression, op: &str, right: Expression) -> Expression {
        Expression::new(
            L,
            ExprKind::Binary {
                left: Box::new(left),
                op: op.to_string(),
                right: Box::new(right),
            },
        )
    }

    fn unary(op: &str, operand: Expression) -> Expression {
        Expression::new(
            L,
            ExprKind::Unary {
                op: op.to_string(),
                operand: Box::new(operand),
            },
        )
    }

    fn if_then_else(
        condition: Expression,
        then_branch: Expression,
        else_branch: Option<Expression>,
    ) -> Expression {
        Expression::new(
            L,
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
        )
    }

    fn while_expr(condition: Expression, body: Expression) -> Expression {
        Expression::new(
            L,
            ExprKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
        )
    }

    fn call(name: &str, arguments: Vec<Expression>) -> Expression {
        Expression::new(
            L,
            ExprKind::Call {
                callee: Box::new(identifier(name)),
                arguments,
            },
        )
    }

    fn block(statements: Vec<Expression>) -> Expression {
        Expression::new(L, ExprKind::Block { statements })
    }

    fn var(name: &str, typed: Option<Expression>, initializer: Expression) -> Expression {
        Expression::new(
            L,
            ExprKind::Var {
                name: name.to_string(),
                typed: typed.map(Box::new),
                initializer: Box::new(initializer),
            },
        )
    }

    fn fun_type(param_types: Option<Vec<Expression>>, return_type: Expression) -> Expression {
        Expression::new(
            L,
            ExprKind::FunType {
                param_types,
                return_type: Box::new(return_type),
            },
        )
    }

    #[test]
    fn test_parser_basics() {
        assert_eq!(
            parse_source("a + b"),
            binary(identifier("a"), "+", identifier("b"))
        );
    }

    #[test]
    fn test_parser_associativity() {
        assert_eq!(
            parse_source("1 - 2 + 3"),
            binary(binary(literal(1), "-", literal(2)), "+", literal(3))
        );
    }

    #[test]
    fn test_parser_precedence() {
        assert_eq!(
            parse_source("a + b * c"),
            binary(
                identifier("a"),
                "+",
                binary(identifier("b"), "*", identifier("c"))
            )
        );
    }

    #[test]
    fn test_parser_parentheses() {
        assert_eq!(
            parse_source("(a + b) * c"),
            binary(
                binary(identifier("a"), "+", identifier("b")),
                "*",
                identifier("c")
            )
        );
    }

    #[test]
    fn test_garbage_at_end() {
        for src in ["a + b c", "1 2", "(a + b) x", "a b"] {
            assert!(parse_error(src).contains("unexpected token"), "src: {}", src);
        }
    }

    #[test]
    fn test_empty_input() {
        let err = parse(&[]).expect_err("empty input must fail");
        assert!(err.contains("Empty input"));
    }

    #[test]
    fn test_single_if_expression() {
        assert_eq!(
            parse_source("if a then b + c"),
            if_then_else(
                identifier("a"),
                binary(identifier("b"), "+", identifier("c")),
                None
            )
        );
    }

    #[test]
    fn test_if_as_sub_expression() {
        assert_eq!(
            parse_source("1 + if true then 2 else 3"),
            binary(
                literal(1),
                "+",
                if_then_else(identifier("true"), literal(2), Some(literal(3)))
            )
        );

        assert_eq!(
            parse_source("a + b * if true then 2 else 3"),
            binary(
                identifier("a"),
                "+",
                binary(
                    identifier("b"),
                    "*",
                    if_then_else(identifier("true"), literal(2), Some(literal(3)))
                )
            )
        );
    }

    #[test]
    fn test_nested_if_else_expression() {
        assert_eq!(
            parse_source("if a then b else if c then d else e"),
            if_then_else(
                identifier("a"),
                identifier("b"),
                Some(if_then_else(
                    identifier("c"),
                    identifier("d"),
                    Some(identifier("e"))
                ))
            )
        );
    }

    #[test]
    fn test_parser_function() {
        assert_eq!(
            parse_source("f(x, y + z)"),
            call(
                "f",
                vec![
                    identifier("x"),
                    binary(identifier("y"), "+", identifier("z"))
                ]
            )
        );
    }

    #[test]
    fn test_nested_parser_function() {
        assert_eq!(
            parse_source("f(f(a))"),
            call("f", vec![call("f", vec![identifier("a")])])
        );
    }

    #[test]
    fn test_function_call_in_expression() {
        assert_eq!(
            parse_source("f(a * f(b)) + c"),
            binary(
                call(
                    "f",
                    vec![binary(
                        identifier("a"),
                        "*",
                        call("f", vec![identifier("b")])
                    )]
                ),
                "+",
                identifier("c")
            )
        );
    }

    #[test]
    fn test_assignment_right_associative() {
        assert_eq!(
            parse_source("a = b = c"),
            binary(
                identifier("a"),
                "=",
                binary(identifier("b"), "=", identifier("c"))
            )
        );
    }

    #[test]
    fn test_assignment_looser_than_logical_operators() {
        assert_eq!(
            parse_source("a = b or c and d"),
            binary(
                identifier("a"),
                "=",
                binary(
                    identifier("b"),
                    "or",
                    binary(identifier("c"), "and", identifier("d"))
                )
            )
        );
    }

    #[test]
    fn test_unary_expression() {
        assert_eq!(
            parse_source("not not x"),
            unary("not", unary("not", identifier("x")))
        );

        // Unary binds tighter than additive.
        assert_eq!(
            parse_source("not not x + 3"),
            binary(unary("not", unary("not", identifier("x"))), "+", literal(3))
        );

        assert_eq!(parse_source("-x"), unary("-", identifier("x")));
    }

    #[test]
    fn test_all_operator_precedence() {
        assert_eq!(
            parse_source("not -a * b % 3 + c / 2 >= d - 1 == e != f and g < h or i"),
            binary(
                binary(
                    binary(
                        binary(
                            binary(
                                binary(
                                    binary(
                                        binary(
                                            unary("not", unary("-", identifier("a"))),
                                            "*",
                                            identifier("b")
                                        ),
                                        "%",
                                        literal(3)
                                    ),
                                    "+",
                                    binary(identifier("c"), "/", literal(2))
                                ),
                                ">=",
                                binary(identifier("d"), "-", literal(1))
                            ),
                            "==",
                            identifier("e")
                        ),
                        "!=",
                        identifier("f")
                    ),
                    "and",
                    binary(identifier("g"), "<", identifier("h"))
                ),
                "or",
                identifier("i")
            )
        );
    }

    #[test]
    fn test_block_expression() {
        assert_eq!(
            parse_source("{f(a); x = y; f(x)}"),
            block(vec![
                call("f", vec![identifier("a")]),
                binary(identifier("x"), "=", identifier("y")),
                call("f", vec![identifier("x")]),
            ])
        );
    }

    #[test]
    fn test_block_as_value() {
        assert_eq!(
            parse_source("x = { f(a); b }"),
            binary(
                identifier("x"),
                "=",
                block(vec![call("f", vec![identifier("a")]), identifier("b")])
            )
        );
    }

    #[test]
    fn test_while_condition_is_assignment_level() {
        assert_eq!(
            parse_source("while a + b = c do 1"),
            while_expr(
                binary(
                    binary(identifier("a"), "+", identifier("b")),
                    "=",
                    identifier("c")
                ),
                literal(1)
            )
        );
    }

    #[test]
    fn test_var_expression() {
        assert_eq!(parse_source("var x = 3"), var("x", None, literal(3)));

        assert_eq!(
            parse_source("{var x = 3}"),
            block(vec![var("x", None, literal(3))])
        );

        assert_eq!(
            parse_source("{f(a); var x = 8; f(x)}"),
            block(vec![
                call("f", vec![identifier("a")]),
                var("x", None, literal(8)),
                call("f", vec![identifier("x")]),
            ])
        );

        assert_eq!(
            parse_source("var ID: T = E"),
            var("ID", Some(identifier("T")), identifier("E"))
        );
    }

    #[test]
    fn test_var_rejected_outside_blocks_and_top_level() {
        for src in [
            "f(var = a)",
            "if 8 then var x = 3",
            "if var x = 3 then a",
            "if b = 6 then a else var c = 8",
            "while var b = 3 do c",
            "while true do var a = 9",
        ] {
            assert!(
                parse_error(src).contains("unexpected token var"),
                "src: {}",
                src
            );
        }
    }

    #[test]
    fn test_adjacent_blocks_need_no_separator() {
        assert_eq!(
            parse_source("{ { a } { b } }"),
            block(vec![
                block(vec![identifier("a")]),
                block(vec![identifier("b")]),
            ])
        );
    }

    #[test]
    fn test_bare_statements_need_separator() {
        assert!(parse_error("{ a b }").contains("expected token \"}\" or \";\""));
        assert!(parse_error("{ if true then { a } b c }")
            .contains("expected token \"}\" or \";\""));
    }

    #[test]
    fn test_if_statement_followed_by_bare_identifier() {
        let expected = block(vec![
            if_then_else(identifier("true"), block(vec![identifier("a")]), None),
            identifier("b"),
        ]);
        // With and without a separating semicolon.
        assert_eq!(parse_source("{ if true then { a } b }"), expected);
        assert_eq!(parse_source("{ if true then { a }; b }"), expected);
    }

    #[test]
    fn test_if_else_statement_followed_by_bare_identifier() {
        assert_eq!(
            parse_source("{ if true then { a } else { b } c }"),
            block(vec![
                if_then_else(
                    identifier("true"),
                    block(vec![identifier("a")]),
                    Some(block(vec![identifier("b")]))
                ),
                identifier("c"),
            ])
        );
    }

    #[test]
    fn test_multiple_top_level_expressions() {
        assert_eq!(
            parse_source("a = 1; b = 2; a + b"),
            block(vec![
                binary(identifier("a"), "=", literal(1)),
                binary(identifier("b"), "=", literal(2)),
                binary(identifier("a"), "+", identifier("b")),
            ])
        );
    }

    #[test]
    fn test_trailing_semicolon_appends_unit() {
        assert_eq!(
            parse_source("var x = 3;"),
            block(vec![var("x", None, literal(3)), identifier("Unit")])
        );
    }

    #[test]
    fn test_block_ending_in_while_appends_unit() {
        assert_eq!(
            parse_source("{ while c do f() }"),
            block(vec![
                while_expr(identifier("c"), call("f", vec![])),
                identifier("Unit"),
            ])
        );
    }

    #[test]
    fn test_block_ending_in_if_then_appends_unit() {
        assert_eq!(
            parse_source("{ if c then f() }"),
            block(vec![
                if_then_else(identifier("c"), call("f", vec![]), None),
                identifier("Unit"),
            ])
        );
    }

    #[test]
    fn test_complex_block_expression() {
        let result = parse_source(
            "
            {
                while f() do {
                    x = 10;
                    y = if g(x) then {
                        x = x + 1;
                        x
                    } else {
                        g(x)
                    }
                    g(y);
                }
                123
            }
            ",
        );
        assert_eq!(
            result,
            block(vec![
                while_expr(
                    call("f", vec![]),
                    block(vec![
                        binary(identifier("x"), "=", literal(10)),
                        binary(
                            identifier("y"),
                            "=",
                            if_then_else(
                                call("g", vec![identifier("x")]),
                                block(vec![
                                    binary(
                                        identifier("x"),
                                        "=",
                                        binary(identifier("x"), "+", literal(1))
                                    ),
                                    identifier("x"),
                                ]),
                                Some(block(vec![call("g", vec![identifier("x")])]))
                            )
                        ),
                        call("g", vec![identifier("y")]),
                        identifier("Unit"),
                    ])
                ),
                literal(123),
            ])
        );
    }

    #[test]
    fn test_syntax_example() {
        let result = parse_source(
            "
            var n: Int = read_int();
            print_int(n);
            while n > 1 do {
                if n % 2 == 0 then {
                    n = n / 2;
                } else {
                    n = 3 * n + 1;
                }
                print_int(n);
            }
            ",
        );
        assert_eq!(
            result,
            block(vec![
                var("n", Some(identifier("Int")), call("read_int", vec![])),
                call("print_int", vec![identifier("n")]),
                while_expr(
                    binary(identifier("n"), ">", literal(1)),
                    block(vec![
                        if_then_else(
                            binary(
                                binary(identifier("n"), "%", literal(2)),
                                "==",
                                literal(0)
                            ),
                            block(vec![
                                binary(
                                    identifier("n"),
                                    "=",
                                    binary(identifier("n"), "/", literal(2))
                                ),
                                identifier("Unit"),
                            ]),
                            Some(block(vec![
                                binary(
                                    identifier("n"),
                                    "=",
                                    binary(
                                        binary(literal(3), "*", identifier("n")),
                                        "+",
                                        literal(1)
                                    )
                                ),
                                identifier("Unit"),
                            ]))
                        ),
                        call("print_int", vec![identifier("n")]),
                        identifier("Unit"),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn test_var_function_type_annotation() {
        assert_eq!(
            parse_source("{ var f: (Int) => Unit = print_int; f(123) }"),
            block(vec![
                var(
                    "f",
                    Some(fun_type(
                        Some(vec![identifier("Int")]),
                        identifier("Unit")
                    )),
                    identifier("print_int")
                ),
                call("f", vec![literal(123)]),
            ])
        );
    }

    #[test]
    fn test_var_function_type_annotation_no_params() {
        assert_eq!(
            parse_source("{ var f: () => Unit = print_int; f() }"),
            block(vec![
                var(
                    "f",
                    Some(fun_type(None, identifier("Unit"))),
                    identifier("print_int")
                ),
                call("f", vec![]),
            ])
        );
    }

    #[test]
    fn test_node_locations_come_from_tokens() {
        let result = parse_source("if a then\n  b + c");
        assert_eq!(result.loc, Location::new(1, 1));
        if let ExprKind::If { then_branch, .. } = &result.kind {
            // The `+` token's location.
            assert_eq!(then_branch.loc, Location::new(2, 5));
        } else {
            panic!("expected an if expression");
        }
    }

    #[test]
    fn test_unclosed_block() {
        assert!(parse_error("{ a; b;").contains("expected \"}\""));
    }
}
