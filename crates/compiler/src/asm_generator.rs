//! x86-64 assembly emission (AT&T syntax, System V ABI).
//!
//! Every IR variable gets an 8-byte slot below %rbp, assigned in first
//! appearance order; instructions move operands through %rax. The three
//! runtime routines are external symbols; calling a variable that holds
//! one goes through its materialized address (`call *%rax`).

use std::collections::{HashMap, HashSet};

use crate::ir::{IRVar, Instruction};

/// System V argument registers, in call order.
const ARGUMENT_REGISTERS: &[&str] = &["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];

/// Operators lowered inline instead of through a call.
const BINARY_OPERATORS: &[&str] = &[
    "or", "and", "==", "!=", "<", "<=", ">", ">=", "+", "-", "*", "/", "%",
];

const RUNTIME_FUNCTIONS: &[&str] = &["print_int", "print_bool", "read_int"];

/// Knows the stack slot of every IR variable.
struct Locals {
    var_to_location: HashMap<IRVar, String>,
    stack_used: usize,
}

impl Locals {
    fn new(variables: &[IRVar]) -> Self {
        let mut var_to_location = HashMap::new();
        for (i, var) in variables.iter().enumerate() {
            var_to_location.insert(var.clone(), format!("-{}(%rbp)", (i + 1) * 8));
        }
        Locals {
            var_to_location,
            stack_used: variables.len() * 8,
        }
    }

    /// An assembly reference like `-24(%rbp)` for the slot of `var`.
    fn get_ref(&self, var: &IRVar) -> &str {
        self.var_to_location
            .get(var)
            .expect("IR variable without a stack slot")
    }

    fn stack_used(&self) -> usize {
        self.stack_used
    }
}

/// All IR variables in first-appearance order, walking every operand
/// field of every instruction, argument lists included.
fn collect_ir_variables(instructions: &[Instruction]) -> Vec<IRVar> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();
    let mut add = |var: &IRVar, result: &mut Vec<IRVar>| {
        if seen.insert(var.clone()) {
            result.push(var.clone());
        }
    };

    for insn in instructions {
        match insn {
            Instruction::LoadIntConst { dest, .. } => add(dest, &mut result),
            Instruction::LoadBoolConst { dest, .. } => add(dest, &mut result),
            Instruction::Copy { source, dest } => {
                add(source, &mut result);
                add(dest, &mut result);
            }
            Instruction::Call { fun, args, dest } => {
                add(fun, &mut result);
                for arg in args {
                    add(arg, &mut result);
                }
                add(dest, &mut result);
            }
            Instruction::CondJump { cond, .. } => add(cond, &mut result),
            Instruction::Jump { .. } | Instruction::Label(_) => {}
        }
    }
    result
}

/// Emit a complete assembly listing for `main`. Pure function of the
/// instruction list; never fails at runtime (malformed calls are rejected
/// by the earlier stages).
pub fn generate_assembly(instructions: &[Instruction]) -> String {
    let variables = collect_ir_variables(instructions);
    let locals = Locals::new(&variables);

    let mut out = String::new();
    let mut emit = |line: &str| {
        out.push_str(line);
        out.push('\n');
    };

    emit(".extern print_int");
    emit(".extern print_bool");
    emit(".extern read_int");
    emit("");
    emit(".section .text");
    emit("");
    emit(".global main");
    emit(".type main, @function");
    emit("");
    emit("main:");
    for var in &variables {
        emit(&format!("    # {} in {}", var.name, locals.get_ref(var)));
    }
    emit("");
    emit("    pushq %rbp");
    emit("    movq %rsp, %rbp");
    if locals.stack_used() > 0 {
        emit(&format!("    subq ${}, %rsp", locals.stack_used()));
    }

    for insn in instructions {
        emit(&format!("    # {}", insn));
        match insn {
            Instruction::Label(label) => {
                emit("");
                // The .L prefix keeps the symbol local to the object file.
                emit(&format!(".L{}:", label.name));
            }

            Instruction::LoadIntConst { value, dest } => {
                if i32::try_from(*value).is_ok() {
                    emit(&format!("    movq ${}, {}", value, locals.get_ref(dest)));
                } else {
                    // movabsq is needed for values outside the signed
                    // 32-bit range; it can only target a register.
                    emit(&format!("    movabsq ${}, %rax", value));
                    emit(&format!("    movq %rax, {}", locals.get_ref(dest)));
                }
            }

            Instruction::LoadBoolConst { value, dest } => {
                emit(&format!(
                    "    movq ${}, {}",
                    if *value { 1 } else { 0 },
                    locals.get_ref(dest)
                ));
            }

            Instruction::Jump { label } => {
                emit(&format!("    jmp .L{}", label.name));
            }

            Instruction::Copy { source, dest } => {
                if RUNTIME_FUNCTIONS.contains(&source.name.as_str()) {
                    // Copying a runtime routine materializes its address;
                    // indirect calls rely on this.
                    emit(&format!("    movq ${}, %rax", source.name));
                } else {
                    emit(&format!("    movq {}, %rax", locals.get_ref(source)));
                }
                emit(&format!("    movq %rax, {}", locals.get_ref(dest)));
            }

            Instruction::CondJump {
                cond,
                then_label,
                else_label,
            } => {
                emit(&format!("    cmpq $0, {}", locals.get_ref(cond)));
                emit(&format!("    jne .L{}", then_label.name));
                emit(&format!("    jmp .L{}", else_label.name));
            }

            Instruction::Call { fun, args, dest } => {
                debug_assert!(args.len() <= 6, "more than 6 call arguments");
                for (arg, register) in args.iter().zip(ARGUMENT_REGISTERS) {
                    emit(&format!("    movq {}, {}", locals.get_ref(arg), register));
                }
                emit_call(&mut emit, &locals, fun, args);
                emit(&format!("    movq %rax, {}", locals.get_ref(dest)));
            }
        }
    }

    emit("");
    emit("    movq $0, %rax");
    emit("    movq %rbp, %rsp");
    emit("    popq %rbp");
    emit("    ret");

    out
}

/// The body of a `Call`: dispatch on the callee name and leave the result
/// in %rax.
fn emit_call(emit: &mut impl FnMut(&str), locals: &Locals, fun: &IRVar, args: &[IRVar]) {
    match fun.name.as_str() {
        "unary_-" => {
            emit(&format!("    movq {}, %rax", locals.get_ref(&args[0])));
            emit("    negq %rax");
        }

        "unary_not" => {
            emit(&format!("    movq {}, %rax", locals.get_ref(&args[0])));
            emit("    xorq $1, %rax");
        }

        "print_int" => {
            emit(&format!("    movq {}, %rdi", locals.get_ref(&args[0])));
            emit("    callq print_int");
        }

        "print_bool" => {
            emit("    subq $8, %rsp");
            emit(&format!("    movq {}, %rdi", locals.get_ref(&args[0])));
            emit("    callq print_bool");
            emit("    addq $8, %rsp");
        }

        "read_int" => {
            emit("    subq $8, %rsp");
            emit("    callq read_int");
            emit("    addq $8, %rsp");
        }

        name if BINARY_OPERATORS.contains(&name) => {
            debug_assert!(args.len() == 2, "binary operator with {} args", args.len());
            let left = locals.get_ref(&args[0]);
            let right = locals.get_ref(&args[1]);

            emit(&format!("    movq {}, %rax", left));
            match name {
                "+" => emit(&format!("    addq {}, %rax", right)),
                "-" => emit(&format!("    subq {}, %rax", right)),
                "*" => emit(&format!("    imulq {}, %rax", right)),
                "/" => {
                    // cqto sign-extends %rax into %rdx:%rax.
                    emit("    cqto");
                    emit(&format!("    idivq {}", right));
                }
                "%" => {
                    emit("    cqto");
                    emit(&format!("    idivq {}", right));
                    emit("    movq %rdx, %rax");
                }
                "==" | "!=" | "<" | "<=" | ">" | ">=" => {
                    emit(&format!("    cmpq {}, %rax", right));
                    let set = match name {
                        "==" => "sete",
                        "!=" => "setne",
                        "<" => "setl",
                        "<=" => "setle",
                        ">" => "setg",
                        _ => "setge",
                    };
                    emit(&format!("    {} %al", set));
                    emit("    movzbq %al, %rax");
                }
                // Bitwise is enough: short-circuit lowering keeps 'and'
                // and 'or' calls off this path for booleans.
                "and" => emit(&format!("    andq {}, %rax", right)),
                _ => emit(&format!("    orq {}, %rax", right)),
            }
        }

        _ => {
            // A local variable holding a function address.
            emit(&format!("    movq {}, %rax", locals.get_ref(fun)));
            emit("    call *%rax");
        }
    }
}
