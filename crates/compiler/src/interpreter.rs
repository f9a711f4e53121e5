//! Tree-walking evaluator for Mint.
//!
//! The reference semantics the compiled code is checked against. Operand
//! types are verified dynamically, so it can run programs straight from
//! the parser. I/O goes through a caller-supplied reader and writer; the
//! CLI wires the process stdio, tests wire buffers.

use std::io::{BufRead, Write};

use crate::ast::{ExprKind, Expression, LiteralValue};
use crate::symtab::SymTab;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Unit,
    /// A native routine bound in the global frame: an operator or one of
    /// the runtime builtins. Carries its global name; application
    /// dispatches on it.
    Builtin(&'static str),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Unit => write!(f, "unit"),
            Value::Builtin(name) => write!(f, "<builtin {}>", name),
        }
    }
}

const BUILTINS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "unary_-", "unary_not",
    "print_int", "print_bool", "read_int",
];

/// The global frame: every operator and runtime builtin as a `Builtin`
/// value, plus the boolean constants. `and` and `or` are absent on
/// purpose; they short-circuit and never reach ordinary application.
pub fn setup_global_env() -> SymTab<Value> {
    let mut env = SymTab::new();
    for name in BUILTINS {
        env.define(*name, Value::Builtin(*name));
    }
    env.define("true", Value::Bool(true));
    env.define("false", Value::Bool(false));
    env.define("Int", Value::Unit);
    env.define("Bool", Value::Unit);
    env.define("Unit", Value::Unit);
    env
}

pub struct Interpreter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Interpreter { input, output }
    }

    pub fn interpret(
        &mut self,
        expr: &Expression,
        env: &mut SymTab<Value>,
    ) -> Result<Value, String> {
        match &expr.kind {
            ExprKind::Literal(LiteralValue::Int(i)) => Ok(Value::Int(*i)),
            ExprKind::Literal(LiteralValue::Bool(b)) => Ok(Value::Bool(*b)),
            ExprKind::Literal(LiteralValue::Unit) => Ok(Value::Unit),

            ExprKind::Identifier(name) => env
                .lookup(name)
                .cloned()
                .ok_or_else(|| format!("{}: Undefined variable '{}'", expr.loc, name)),

            ExprKind::Unary { op, operand } => {
                let operand = self.interpret(operand, env)?;
                let fun = env
                    .lookup(&format!("unary_{}", op))
                    .cloned()
                    .ok_or_else(|| format!("'{}' is not a unary operator", op))?;
                let Value::Builtin(name) = fun else {
                    return Err(format!("'{}' is not a unary operator", op));
                };
                self.apply_builtin(name, &[operand])
            }

            ExprKind::Binary { left, op, right } if op == "or" => {
                match self.interpret(left, env)? {
                    Value::Bool(true) => Ok(Value::Bool(true)),
                    Value::Bool(false) => self.interpret(right, env),
                    _ => Err("'or' requires boolean operands".to_string()),
                }
            }

            ExprKind::Binary { left, op, right } if op == "and" => {
                match self.interpret(left, env)? {
                    Value::Bool(false) => Ok(Value::Bool(false)),
                    Value::Bool(true) => self.interpret(right, env),
                    _ => Err("'and' requires boolean operands".to_string()),
                }
            }

            ExprKind::Binary { left, op, right } if op == "=" => {
                let ExprKind::Identifier(name) = &left.kind else {
                    return Err(format!(
                        "{}: left-hand side of assignment must be an identifier",
                        expr.loc
                    ));
                };
                let value = self.interpret(right, env)?;
                if !env.assign(name, value.clone()) {
                    return Err(format!("{}: Undefined variable '{}'", expr.loc, name));
                }
                Ok(value)
            }

            ExprKind::Binary { left, op, right } => {
                let left = self.interpret(left, env)?;
                let right = self.interpret(right, env)?;
                let fun = env
                    .lookup(op.as_str())
                    .cloned()
                    .ok_or_else(|| format!("'{}' is not a binary operator", op))?;
                let Value::Builtin(name) = fun else {
                    return Err(format!("'{}' is not a binary operator", op));
                };
                self.apply_builtin(name, &[left, right])
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => match self.interpret(condition, env)? {
                Value::Bool(true) => self.interpret(then_branch, env),
                Value::Bool(false) => match else_branch {
                    Some(else_branch) => self.interpret(else_branch, env),
                    None => Ok(Value::Unit),
                },
                _ => Err("condition of if-then-else must be a boolean".to_string()),
            },

            ExprKind::While { condition, body } => {
                // Yields the value of the last completed iteration.
                let mut result = Value::Unit;
                loop {
                    match self.interpret(condition, env)? {
                        Value::Bool(true) => result = self.interpret(body, env)?,
                        Value::Bool(false) => return Ok(result),
                        _ => return Err("condition of while must be a boolean".to_string()),
                    }
                }
            }

            ExprKind::Call { callee, arguments } => {
                let ExprKind::Identifier(name) = &callee.kind else {
                    return Err(format!("{}: callee must be an identifier", expr.loc));
                };
                let fun = env
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| format!("{}: Undefined variable '{}'", expr.loc, name))?;
                let Value::Builtin(builtin) = fun else {
                    return Err(format!("'{}' is not callable", name));
                };
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.interpret(argument, env)?);
                }
                self.apply_builtin(builtin, &args)
            }

            ExprKind::Block { statements } => {
                env.push_frame();
                let mut result = Value::Unit;
                for statement in statements {
                    match self.interpret(statement, env) {
                        Ok(value) => result = value,
                        Err(e) => {
                            env.pop_frame();
                            return Err(e);
                        }
                    }
                }
                env.pop_frame();
                Ok(result)
            }

            ExprKind::Var {
                name, initializer, ..
            } => {
                let value = self.interpret(initializer, env)?;
                env.define(name.clone(), value.clone());
                Ok(value)
            }

            ExprKind::FunType { .. } => {
                Err(format!("{}: unsupported expression", expr.loc))
            }
        }
    }

    fn apply_builtin(&mut self, name: &'static str, args: &[Value]) -> Result<Value, String> {
        match name {
            "+" | "-" | "*" | "/" | "%" | "<" | "<=" | ">" | ">=" => {
                let [Value::Int(a), Value::Int(b)] = args else {
                    return Err(format!("'{}' requires integer operands", name));
                };
                let (a, b) = (*a, *b);
                match name {
                    "+" => Ok(Value::Int(a.wrapping_add(b))),
                    "-" => Ok(Value::Int(a.wrapping_sub(b))),
                    "*" => Ok(Value::Int(a.wrapping_mul(b))),
                    "/" => {
                        if b == 0 {
                            return Err("division by zero".to_string());
                        }
                        Ok(Value::Int(a.wrapping_div(b)))
                    }
                    "%" => {
                        if b == 0 {
                            return Err("division by zero".to_string());
                        }
                        Ok(Value::Int(a.wrapping_rem(b)))
                    }
                    "<" => Ok(Value::Bool(a < b)),
                    "<=" => Ok(Value::Bool(a <= b)),
                    ">" => Ok(Value::Bool(a > b)),
                    ">=" => Ok(Value::Bool(a >= b)),
                    _ => unreachable!(),
                }
            }

            "==" | "!=" => {
                let same = match args {
                    [Value::Int(a), Value::Int(b)] => a == b,
                    [Value::Bool(a), Value::Bool(b)] => a == b,
                    _ => {
                        return Err(format!(
                            "'{}' requires operands of the same type",
                            name
                        ));
                    }
                };
                Ok(Value::Bool(if name == "==" { same } else { !same }))
            }

            "unary_-" => {
                let [Value::Int(a)] = args else {
                    return Err("unary '-' requires an integer operand".to_string());
                };
                Ok(Value::Int(a.wrapping_neg()))
            }

            "unary_not" => {
                let [Value::Bool(b)] = args else {
                    return Err("unary 'not' requires a boolean operand".to_string());
                };
                Ok(Value::Bool(!b))
            }

            "print_int" => {
                let [Value::Int(a)] = args else {
                    return Err("print_int requires an integer operand".to_string());
                };
                writeln!(self.output, "{}", a).map_err(|e| format!("print_int: {}", e))?;
                Ok(Value::Unit)
            }

            "print_bool" => {
                let [Value::Bool(b)] = args else {
                    return Err("print_bool requires a boolean operand".to_string());
                };
                writeln!(self.output, "{}", if *b { "true" } else { "false" })
                    .map_err(|e| format!("print_bool: {}", e))?;
                Ok(Value::Unit)
            }

            "read_int" => {
                if !args.is_empty() {
                    return Err("read_int takes no arguments".to_string());
                }
                let mut line = String::new();
                let read = self
                    .input
                    .read_line(&mut line)
                    .map_err(|e| format!("read_int: {}", e))?;
                if read == 0 {
                    return Err("read_int: unexpected end of input".to_string());
                }
                line.trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| format!("read_int: expected an integer, got {:?}", line.trim()))
            }

            _ => Err(format!("'{}' is not callable", name)),
        }
    }
}
