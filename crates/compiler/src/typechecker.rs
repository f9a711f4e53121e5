//! Type checking for Mint.
//!
//! A single traversal over the AST resolves identifiers against a
//! parent-linked environment, enforces the typing rules and writes the
//! resulting type into every node's type slot. Operators are ordinary
//! entries in the global frame with function types; only `=`, `==` and
//! `!=` have rules of their own.

use crate::ast::{ExprKind, Expression, LiteralValue};
use crate::symtab::SymTab;
use crate::types::Type;

/// The global frame: operators, runtime builtins, boolean constants and
/// the type names themselves.
pub fn setup_type_env() -> SymTab<Type> {
    let mut env = SymTab::new();

    for op in ["+", "-", "*", "/", "%"] {
        env.define(op, Type::fun([Type::Int, Type::Int], Type::Int));
    }
    for op in ["<", "<=", ">", ">="] {
        env.define(op, Type::fun([Type::Int, Type::Int], Type::Bool));
    }
    for op in ["and", "or"] {
        env.define(op, Type::fun([Type::Bool, Type::Bool], Type::Bool));
    }

    env.define("unary_-", Type::fun([Type::Int], Type::Int));
    env.define("unary_not", Type::fun([Type::Bool], Type::Bool));

    env.define("print_int", Type::fun([Type::Int], Type::Unit));
    env.define("print_bool", Type::fun([Type::Bool], Type::Unit));
    env.define("read_int", Type::fun([], Type::Int));

    env.define("true", Type::Bool);
    env.define("false", Type::Bool);

    env.define("Int", Type::Int);
    env.define("Bool", Type::Bool);
    env.define("Unit", Type::Unit);

    env
}

/// Check `expr` against `env`, writing the resulting type back into every
/// node, and return the expression's type.
pub fn typecheck(expr: &mut Expression, env: &mut SymTab<Type>) -> Result<Type, String> {
    let ty = check(expr, env)?;
    expr.ty = ty.clone();
    Ok(ty)
}

fn check(expr: &mut Expression, env: &mut SymTab<Type>) -> Result<Type, String> {
    let loc = expr.loc;
    match &mut expr.kind {
        ExprKind::Literal(LiteralValue::Bool(_)) => Ok(Type::Bool),
        ExprKind::Literal(LiteralValue::Int(_)) => Ok(Type::Int),
        ExprKind::Literal(LiteralValue::Unit) => {
            Err(format!("{}: unsupported literal", loc))
        }

        ExprKind::Identifier(name) => env
            .lookup(name)
            .cloned()
            .ok_or_else(|| format!("{}: Undefined identifier '{}'", loc, name)),

        ExprKind::Unary { op, operand } => {
            let op_type = env
                .lookup(&format!("unary_{}", op))
                .cloned()
                .ok_or_else(|| format!("{}: '{}' is not a unary operator", loc, op))?;
            let Type::Fun { params, returns } = op_type else {
                return Err(format!("{}: '{}' is not a unary operator", loc, op));
            };
            let operand_type = typecheck(operand, env)?;
            match params.as_slice() {
                [expected] if *expected == operand_type => Ok(*returns),
                [expected] => Err(format!(
                    "{}: unary operator '{}' expects an operand of type {}, got {}",
                    loc, op, expected, operand_type
                )),
                _ => Err(format!("{}: '{}' is not a unary operator", loc, op)),
            }
        }

        ExprKind::Binary { left, op, right } if op == "=" => {
            // The checker only demands that both sides have the same type.
            // A non-identifier left side is the IR generator's problem.
            let left_type = typecheck(left, env)?;
            let right_type = typecheck(right, env)?;
            if left_type != right_type {
                return Err(format!(
                    "{}: assignment expects a value of type {}, got {}",
                    loc, left_type, right_type
                ));
            }
            Ok(right_type)
        }

        ExprKind::Binary { left, op, right } if op == "==" || op == "!=" => {
            let left_type = typecheck(left, env)?;
            let right_type = typecheck(right, env)?;
            if left_type != right_type {
                return Err(format!(
                    "{}: operands of '{}' must have the same type, got {} and {}",
                    loc, op, left_type, right_type
                ));
            }
            Ok(Type::Bool)
        }

        ExprKind::Binary { left, op, right } => {
            let op_type = env
                .lookup(op.as_str())
                .cloned()
                .ok_or_else(|| format!("{}: '{}' is not a binary operator", loc, op))?;
            let Type::Fun { params, returns } = op_type else {
                return Err(format!("{}: '{}' is not a binary operator", loc, op));
            };
            let left_type = typecheck(left, env)?;
            let right_type = typecheck(right, env)?;
            if params != [left_type.clone(), right_type.clone()] {
                return Err(format!(
                    "{}: operator '{}' expects operands of type ({}), got ({}, {})",
                    loc,
                    op,
                    params
                        .iter()
                        .map(|p| format!("{}", p))
                        .collect::<Vec<_>>()
                        .join(", "),
                    left_type,
                    right_type
                ));
            }
            Ok(*returns)
        }

        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let cond_type = typecheck(condition, env)?;
            if cond_type != Type::Bool {
                return Err(format!(
                    "{}: condition of if-then-else must be of type Bool, got {}",
                    loc, cond_type
                ));
            }
            let then_type = typecheck(then_branch, env)?;
            if let Some(else_branch) = else_branch {
                let else_type = typecheck(else_branch, env)?;
                if then_type != else_type {
                    return Err(format!(
                        "{}: then and else branches must have the same type, got {} and {}",
                        loc, then_type, else_type
                    ));
                }
            }
            Ok(then_type)
        }

        ExprKind::While { condition, body } => {
            let cond_type = typecheck(condition, env)?;
            if cond_type != Type::Bool {
                return Err(format!(
                    "{}: condition of while must be of type Bool, got {}",
                    loc, cond_type
                ));
            }
            typecheck(body, env)?;
            Ok(Type::Unit)
        }

        ExprKind::Call { callee, arguments } => {
            if arguments.len() > 6 {
                return Err(format!(
                    "{}: functions with more than 6 arguments are not supported",
                    loc
                ));
            }
            let ExprKind::Identifier(name) = &callee.kind else {
                return Err(format!("{}: callee must be an identifier", loc));
            };
            let name = name.clone();
            let fun_type = env
                .lookup(&name)
                .cloned()
                .ok_or_else(|| format!("{}: Undefined identifier '{}'", loc, name))?;
            let Type::Fun { params, returns } = fun_type else {
                return Err(format!("{}: '{}' is not a function", loc, name));
            };
            if arguments.len() != params.len() {
                return Err(format!(
                    "{}: function '{}' expects {} argument(s), got {}",
                    loc,
                    name,
                    params.len(),
                    arguments.len()
                ));
            }
            for (argument, expected) in arguments.iter_mut().zip(&params) {
                let arg_type = typecheck(argument, env)?;
                if arg_type != *expected {
                    return Err(format!(
                        "{}: function '{}' expects an argument of type {}, got {}",
                        loc, name, expected, arg_type
                    ));
                }
            }
            Ok(*returns)
        }

        ExprKind::Block { statements } => {
            env.push_frame();
            let mut last_type = Type::Unit;
            for statement in statements.iter_mut() {
                match typecheck(statement, env) {
                    Ok(ty) => last_type = ty,
                    Err(e) => {
                        env.pop_frame();
                        return Err(e);
                    }
                }
            }
            env.pop_frame();
            Ok(last_type)
        }

        ExprKind::FunType {
            param_types,
            return_type,
        } => {
            let mut params = Vec::new();
            if let Some(param_exprs) = param_types {
                if param_exprs.len() > 6 {
                    return Err(format!(
                        "{}: functions with more than 6 parameters are not supported",
                        loc
                    ));
                }
                for param in param_exprs.iter_mut() {
                    params.push(typecheck(param, env)?);
                }
            }
            let returns = typecheck(return_type, env)?;
            Ok(Type::Fun {
                params,
                returns: Box::new(returns),
            })
        }

        ExprKind::Var {
            name,
            typed,
            initializer,
        } => {
            let init_type = typecheck(initializer, env)?;
            if let Some(typed) = typed {
                let typed_type = typecheck(typed, env)?;
                if typed_type != init_type {
                    return Err(format!(
                        "{}: variable '{}' declared as type {}, but initialized with type {}",
                        loc, name, typed_type, init_type
                    ));
                }
            }
            let name = name.clone();
            env.define(name, init_type);
            Ok(Type::Unit)
        }
    }
}
