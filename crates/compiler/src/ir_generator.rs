//! Lowering from the typed AST to IR.
//!
//! A single traversal emits instructions into a flat list and returns,
//! per expression, the IR variable holding its value. Short-circuit
//! `and`/`or` and the control-flow forms become labels and jumps here;
//! everything else becomes `Call`s against the reserved operator names
//! that the assembly generator specializes.

use crate::ast::{ExprKind, Expression, LiteralValue};
use crate::ir::{IRVar, Instruction, Label};
use crate::symtab::SymTab;
use crate::types::Type;

/// Global names preinstalled into the root IR environment; the same set
/// the type checker's global frame binds.
pub const RESERVED_NAMES: &[&str] = &[
    "+", "-", "*", "/", "%",
    "<", "<=", ">", ">=",
    "==", "!=", "=",
    "and", "or",
    "unary_-", "unary_not",
    "print_int", "print_bool", "read_int",
    "true", "false",
    "Int", "Bool", "Unit",
];

/// Lower a typechecked expression to a flat IR instruction list. When the
/// program's type is `Int` or `Bool`, a terminal `print_int`/`print_bool`
/// call is appended so the compiled program prints its result.
pub fn generate_ir(root: &Expression) -> Result<Vec<Instruction>, String> {
    let mut generator = IrGenerator::new();

    // The root frame maps every reserved global to an IR variable of the
    // same name; the assembly generator gives them meaning. Their
    // presence also keeps fresh names from clashing with them.
    let mut env: SymTab<IRVar> = SymTab::new();
    for name in RESERVED_NAMES {
        env.define(*name, IRVar::new(*name));
    }

    let final_result = generator.visit(&mut env, root)?;

    match root.ty {
        Type::Int => {
            let dest = generator.new_var();
            generator.ins.push(Instruction::Call {
                fun: IRVar::new("print_int"),
                args: vec![final_result],
                dest,
            });
        }
        Type::Bool => {
            let dest = generator.new_var();
            generator.ins.push(Instruction::Call {
                fun: IRVar::new("print_bool"),
                args: vec![final_result],
                dest,
            });
        }
        _ => {}
    }

    Ok(generator.ins)
}

struct IrGenerator {
    ins: Vec<Instruction>,
    var_counter: usize,
    label_counter: usize,
    labels: Vec<String>,
    /// Shared sentinel for expressions that produce no value.
    unit: IRVar,
}

impl IrGenerator {
    fn new() -> Self {
        IrGenerator {
            ins: Vec::new(),
            var_counter: 1,
            label_counter: 1,
            labels: Vec::new(),
            unit: IRVar::new("unit"),
        }
    }

    fn new_var(&mut self) -> IRVar {
        let name = if self.var_counter == 1 {
            "x".to_string()
        } else {
            format!("x{}", self.var_counter)
        };
        self.var_counter += 1;
        IRVar::new(name)
    }

    /// The first request for a base name yields the bare base; re-requests
    /// suffix a counter shared across bases, so labels stay unique.
    fn new_label(&mut self, base: &str) -> Label {
        let name = if self.labels.iter().any(|l| l == base) {
            self.label_counter += 1;
            format!("{}{}", base, self.label_counter)
        } else {
            base.to_string()
        };
        self.labels.push(name.clone());
        Label::new(name)
    }

    fn visit(&mut self, env: &mut SymTab<IRVar>, expr: &Expression) -> Result<IRVar, String> {
        match &expr.kind {
            ExprKind::Literal(LiteralValue::Int(value)) => {
                let dest = self.new_var();
                self.ins.push(Instruction::LoadIntConst {
                    value: *value,
                    dest: dest.clone(),
                });
                Ok(dest)
            }

            ExprKind::Literal(LiteralValue::Bool(value)) => {
                let dest = self.new_var();
                self.ins.push(Instruction::LoadBoolConst {
                    value: *value,
                    dest: dest.clone(),
                });
                Ok(dest)
            }

            ExprKind::Literal(LiteralValue::Unit) => Ok(self.unit.clone()),

            ExprKind::Identifier(name) => {
                if name == "true" || name == "false" {
                    let dest = self.new_var();
                    self.ins.push(Instruction::LoadBoolConst {
                        value: name == "true",
                        dest: dest.clone(),
                    });
                    return Ok(dest);
                }
                env.lookup(name)
                    .cloned()
                    .ok_or_else(|| format!("{}: Undefined identifier '{}'", expr.loc, name))
            }

            ExprKind::Unary { op, operand } => {
                let fun = env
                    .lookup(&format!("unary_{}", op))
                    .cloned()
                    .ok_or_else(|| format!("{}: '{}' is not a unary operator", expr.loc, op))?;
                let operand = self.visit(env, operand)?;
                let dest = self.new_var();
                self.ins.push(Instruction::Call {
                    fun,
                    args: vec![operand],
                    dest: dest.clone(),
                });
                Ok(dest)
            }

            ExprKind::Binary { left, op, right } if op == "=" => {
                let left_var = self.visit(env, left)?;
                let right_var = self.visit(env, right)?;
                self.ins.push(Instruction::Copy {
                    source: right_var,
                    dest: left_var.clone(),
                });
                Ok(left_var)
            }

            ExprKind::Binary { left, op, right } if op == "or" => {
                let l_right = self.new_label("or_right");
                let l_end = self.new_label("or_end");
                let l_skip = self.new_label("or_skip");

                let left_var = self.visit(env, left)?;
                self.ins.push(Instruction::CondJump {
                    cond: left_var,
                    then_label: l_skip.clone(),
                    else_label: l_right.clone(),
                });

                self.ins.push(Instruction::Label(l_right));
                let right_var = self.visit(env, right)?;
                let result = self.new_var();
                self.ins.push(Instruction::Copy {
                    source: right_var,
                    dest: result.clone(),
                });
                self.ins.push(Instruction::Jump {
                    label: l_end.clone(),
                });

                self.ins.push(Instruction::Label(l_skip));
                self.ins.push(Instruction::LoadBoolConst {
                    value: true,
                    dest: result.clone(),
                });
                self.ins.push(Instruction::Jump {
                    label: l_end.clone(),
                });

                self.ins.push(Instruction::Label(l_end));
                Ok(result)
            }

            ExprKind::Binary { left, op, right } if op == "and" => {
                let l_right = self.new_label("and_right");
                let l_end = self.new_label("and_end");
                let l_skip = self.new_label("and_skip");

                let left_var = self.visit(env, left)?;
                self.ins.push(Instruction::CondJump {
                    cond: left_var,
                    then_label: l_right.clone(),
                    else_label: l_skip.clone(),
                });

                self.ins.push(Instruction::Label(l_right));
                let right_var = self.visit(env, right)?;
                let result = self.new_var();
                self.ins.push(Instruction::Copy {
                    source: right_var,
                    dest: result.clone(),
                });
                self.ins.push(Instruction::Jump {
                    label: l_end.clone(),
                });

                // The skip path falls through into the end label.
                self.ins.push(Instruction::Label(l_skip));
                self.ins.push(Instruction::LoadBoolConst {
                    value: false,
                    dest: result.clone(),
                });
                self.ins.push(Instruction::Label(l_end));
                Ok(result)
            }

            ExprKind::Binary { left, op, right } => {
                let fun = env
                    .lookup(op.as_str())
                    .cloned()
                    .ok_or_else(|| format!("{}: '{}' is not a binary operator", expr.loc, op))?;
                let left_var = self.visit(env, left)?;
                let right_var = self.visit(env, right)?;
                let dest = self.new_var();
                self.ins.push(Instruction::Call {
                    fun,
                    args: vec![left_var, right_var],
                    dest: dest.clone(),
                });
                Ok(dest)
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch: None,
            } => {
                let l_then = self.new_label("then");
                let l_end = self.new_label("if_end");

                let cond = self.visit(env, condition)?;
                self.ins.push(Instruction::CondJump {
                    cond,
                    then_label: l_then.clone(),
                    else_label: l_end.clone(),
                });

                self.ins.push(Instruction::Label(l_then));
                self.visit(env, then_branch)?;

                self.ins.push(Instruction::Label(l_end));
                Ok(self.unit.clone())
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch: Some(else_branch),
            } => {
                let l_then = self.new_label("then");
                let l_else = self.new_label("else");
                let l_end = self.new_label("if_end");

                let cond = self.visit(env, condition)?;
                self.ins.push(Instruction::CondJump {
                    cond,
                    then_label: l_then.clone(),
                    else_label: l_else.clone(),
                });

                let result = self.new_var();

                self.ins.push(Instruction::Label(l_then));
                let then_var = self.visit(env, then_branch)?;
                self.ins.push(Instruction::Copy {
                    source: then_var,
                    dest: result.clone(),
                });
                self.ins.push(Instruction::Jump {
                    label: l_end.clone(),
                });

                self.ins.push(Instruction::Label(l_else));
                let else_var = self.visit(env, else_branch)?;
                self.ins.push(Instruction::Copy {
                    source: else_var,
                    dest: result.clone(),
                });

                self.ins.push(Instruction::Label(l_end));
                Ok(result)
            }

            ExprKind::While { condition, body } => {
                let l_start = self.new_label("while_start");
                self.ins.push(Instruction::Label(l_start.clone()));
                let l_body = self.new_label("while_body");
                let l_end = self.new_label("while_end");

                let cond = self.visit(env, condition)?;
                self.ins.push(Instruction::CondJump {
                    cond,
                    then_label: l_body.clone(),
                    else_label: l_end.clone(),
                });

                self.ins.push(Instruction::Label(l_body));
                self.visit(env, body)?;
                self.ins.push(Instruction::Jump { label: l_start });

                self.ins.push(Instruction::Label(l_end));
                Ok(self.unit.clone())
            }

            ExprKind::Call { callee, arguments } => {
                let fun = self.visit(env, callee)?;
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.visit(env, argument)?);
                }
                let dest = self.new_var();
                self.ins.push(Instruction::Call {
                    fun,
                    args,
                    dest: dest.clone(),
                });
                Ok(dest)
            }

            ExprKind::Block { statements } => {
                env.push_frame();
                let mut last_var = self.unit.clone();
                for statement in statements {
                    match self.visit(env, statement) {
                        Ok(var) => last_var = var,
                        Err(e) => {
                            env.pop_frame();
                            return Err(e);
                        }
                    }
                }
                env.pop_frame();
                Ok(if expr.ty == Type::Unit {
                    self.unit.clone()
                } else {
                    last_var
                })
            }

            ExprKind::Var {
                name, initializer, ..
            } => {
                if env.defined_locally(name) {
                    return Err(format!(
                        "{}: variable '{}' is already declared in this scope",
                        expr.loc, name
                    ));
                }
                let init_var = self.visit(env, initializer)?;
                let dest = self.new_var();
                self.ins.push(Instruction::Copy {
                    source: init_var,
                    dest: dest.clone(),
                });
                env.define(name.clone(), dest);
                Ok(self.unit.clone())
            }

            ExprKind::FunType { .. } => {
                Err(format!("{}: unsupported expression", expr.loc))
            }
        }
    }
}
