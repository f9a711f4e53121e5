//! End-to-end pipeline tests: source text through tokenizer, parser,
//! type checker, IR generator and assembly generator, plus the
//! interpreter as the semantic reference. No external assembler is
//! invoked here; the emitted text is checked directly.

use std::io::Cursor;

use mintc::{
    Instruction, Type, Value, compile_to_assembly, generate_ir, parse, run_source,
    setup_type_env, tokenize, typecheck,
};

fn typed_ast(src: &str) -> (mintc::Expression, Type) {
    let mut expr = parse(&tokenize(src)).expect("parse failed");
    let mut env = setup_type_env();
    let ty = typecheck(&mut expr, &mut env).expect("typecheck failed");
    (expr, ty)
}

fn ir_from(src: &str) -> Vec<Instruction> {
    let (expr, _) = typed_ast(src);
    generate_ir(&expr).expect("IR generation failed")
}

fn interpret(src: &str, input: &str) -> (Value, String) {
    let mut output = Vec::new();
    let value = run_source(src, Cursor::new(input.to_string()), &mut output)
        .expect("interpretation failed");
    (value, String::from_utf8(output).expect("output not utf-8"))
}

#[test]
fn test_addition_program() {
    let (_, ty) = typed_ast("1 + 2");
    assert_eq!(ty, Type::Int);

    let ins = ir_from("1 + 2");
    let Some(Instruction::Call { fun, .. }) = ins.last() else {
        panic!("expected a trailing call");
    };
    assert_eq!(fun.name, "print_int");

    let (value, _) = interpret("1 + 2", "");
    assert_eq!(value, Value::Int(3));
}

#[test]
fn test_short_circuit_or_program() {
    let (_, ty) = typed_ast("true or false");
    assert_eq!(ty, Type::Bool);

    let ins = ir_from("true or false");
    let labels: Vec<&str> = ins
        .iter()
        .filter_map(|i| match i {
            Instruction::Label(label) => Some(label.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["or_right", "or_skip", "or_end"]);
    let Some(Instruction::Call { fun, .. }) = ins.last() else {
        panic!("expected a trailing call");
    };
    assert_eq!(fun.name, "print_bool");

    let (value, _) = interpret("true or false", "");
    assert_eq!(value, Value::Bool(true));
}

#[test]
fn test_shadowing_program() {
    let src = "{ var x = 1; { var x = 2; x }; x }";
    let (_, ty) = typed_ast(src);
    assert_eq!(ty, Type::Int);

    let (value, _) = interpret(src, "");
    assert_eq!(value, Value::Int(1));
}

#[test]
fn test_collatz_program() {
    let src = "
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
    ";
    let (_, ty) = typed_ast(src);
    assert_eq!(ty, Type::Unit);

    let (_, output) = interpret(src, "6\n");
    assert_eq!(output, "6\n3\n10\n5\n16\n8\n4\n2\n1\n");

    // The compiled form reads, prints and loops through the same labels.
    let asm = compile_to_assembly(src).expect("compile failed");
    assert!(asm.contains("callq read_int"));
    assert!(asm.contains(".Lwhile_start:"));
    assert!(asm.contains("callq print_int"));
}

#[test]
fn test_function_typed_variable_program() {
    let src = "var f: (Int) => Unit = print_int; f(123)";
    let (_, ty) = typed_ast(src);
    assert_eq!(ty, Type::Unit);

    let (_, output) = interpret(src, "");
    assert_eq!(output, "123\n");

    let asm = compile_to_assembly(src).expect("compile failed");
    assert!(asm.contains("movq $print_int, %rax"));
    assert!(asm.contains("call *%rax"));
}

#[test]
fn test_non_bool_condition_is_a_type_error() {
    let mut expr = parse(&tokenize("if 1 then 2 else 3")).expect("parse failed");
    let mut env = setup_type_env();
    assert!(typecheck(&mut expr, &mut env).is_err());
}

#[test]
fn test_unit_program_emits_no_result_print() {
    let ins = ir_from("print_int(1)");
    let prints = ins
        .iter()
        .filter(|i| matches!(i, Instruction::Call { fun, .. } if fun.name == "print_int"))
        .count();
    assert_eq!(prints, 1);
}

#[test]
fn test_compiled_and_interpreted_boolean_output_agree() {
    for src in ["true", "false", "1 < 2", "not (1 < 2)"] {
        let (_, ty) = typed_ast(src);
        assert_eq!(ty, Type::Bool, "src: {}", src);
        let ins = ir_from(src);
        let Some(Instruction::Call { fun, .. }) = ins.last() else {
            panic!("expected a trailing call for {}", src);
        };
        assert_eq!(fun.name, "print_bool");
    }
}

#[test]
fn test_large_literal_end_to_end() {
    let asm = compile_to_assembly("print_int(4294967296)").expect("compile failed");
    assert!(asm.contains("movabsq $4294967296, %rax"));
}

#[test]
fn test_sum_loop_program() {
    let src = "
        var i = 1;
        var s = 0;
        while i <= 5 do {
            s = s + i;
            i = i + 1;
        }
        s
    ";
    let (_, ty) = typed_ast(src);
    assert_eq!(ty, Type::Int);

    let (value, _) = interpret(src, "");
    assert_eq!(value, Value::Int(15));

    let asm = compile_to_assembly(src).expect("compile failed");
    assert!(asm.contains(".Lwhile_body:"));
    assert!(asm.contains(".Lwhile_end:"));
    assert!(asm.contains("jmp .Lwhile_start"));
}
