//! # Tests Module
//!
//! Unit and integration tests for the whole Strand pipeline: lexer, parser,
//! compiler, instruction set, VM execution, metrics, limits, and the
//! runtime facade.

#[cfg(test)]
mod tests {
    use crate::compiler::Compiler;
    use crate::error::ErrorKind;
    use crate::lexer::Lexer;
    use crate::opcode::{Instruction, Opcode};
    use crate::parser::Parser;
    use crate::program::Program;
    use crate::runtime::Runtime;
    use crate::token::TokenKind;
    use crate::value::Value;
    use crate::vm::{Outcome, Vm, VmConfig, VmState};

    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    // =========================================================================
    // HELPERS — Run Strand source through the full pipeline
    // =========================================================================

    /// Compiles source to a program without executing it.
    fn compile(source: &str) -> Result<Program, String> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize().map_err(|e| e.to_string())?;
        let mut parser = Parser::new(tokens);
        let ast = parser.parse().map_err(|e| e.to_string())?;
        Compiler::new().compile(&ast).map_err(|e| e.to_string())
    }

    /// Runs source through lex → parse → compile → execute.
    fn run(source: &str) -> Result<Outcome, String> {
        let program = compile(source)?;
        let mut vm = Vm::new();
        vm.execute(&program).map_err(|e| e.to_string())
    }

    /// Executes a hand-assembled program on a fresh VM.
    fn run_manual(program: &Program) -> Result<Outcome, String> {
        let mut vm = Vm::new();
        vm.execute(program).map_err(|e| e.to_string())
    }

    /// Tokenizes source and returns the token kinds (excluding Eof).
    fn tokenize(source: &str) -> Result<Vec<TokenKind>, String> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize().map_err(|e| e.to_string())?;
        Ok(tokens
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Eof))
            .collect())
    }

    /// Runs source and expects a specific error kind from whichever stage
    /// fails first.
    fn expect_error(source: &str, kind: ErrorKind) {
        let mut lexer = Lexer::new(source);
        let tokens = match lexer.tokenize() {
            Ok(t) => t,
            Err(e) => {
                assert_eq!(e.kind, kind, "expected {:?}, got: {}", kind, e);
                return;
            }
        };

        let mut parser = Parser::new(tokens);
        let ast = match parser.parse() {
            Ok(a) => a,
            Err(e) => {
                assert_eq!(e.kind, kind, "expected {:?}, got: {}", kind, e);
                return;
            }
        };

        let program = match Compiler::new().compile(&ast) {
            Ok(p) => p,
            Err(e) => {
                assert_eq!(e.kind, kind, "expected {:?}, got: {}", kind, e);
                return;
            }
        };

        let mut vm = Vm::new();
        match vm.execute(&program) {
            Ok(_) => panic!("expected {:?} error but program succeeded", kind),
            Err(e) => {
                assert_eq!(e.kind, kind, "expected {:?}, got: {}", kind, e);
            }
        }
    }

    /// Expects a specific error kind from a hand-assembled program.
    fn expect_manual_error(program: &Program, kind: ErrorKind) {
        let mut vm = Vm::new();
        match vm.execute(program) {
            Ok(_) => panic!("expected {:?} error but program succeeded", kind),
            Err(e) => {
                assert_eq!(e.kind, kind, "expected {:?}, got: {}", kind, e);
                assert_eq!(vm.state(), VmState::Faulted);
            }
        }
    }

    // =========================================================================
    // LEXER TESTS
    // =========================================================================

    #[test]
    fn lexer_integer_literals() {
        let kinds = tokenize("42").unwrap();
        assert_eq!(kinds, vec![TokenKind::Number(42.0)]);
    }

    #[test]
    fn lexer_float_literals() {
        let kinds = tokenize("3.14").unwrap();
        assert_eq!(kinds, vec![TokenKind::Number(3.14)]);
    }

    #[test]
    fn lexer_scientific_notation() {
        let kinds = tokenize("1e3 2.5e-1").unwrap();
        assert_eq!(
            kinds,
            vec![TokenKind::Number(1000.0), TokenKind::Number(0.25)]
        );
    }

    #[test]
    fn lexer_underscore_separators() {
        let kinds = tokenize("1_000_000").unwrap();
        assert_eq!(kinds, vec![TokenKind::Number(1_000_000.0)]);
    }

    #[test]
    fn lexer_string_literals() {
        let kinds = tokenize("\"hello\"").unwrap();
        assert_eq!(kinds, vec![TokenKind::Str("hello".to_string())]);
    }

    #[test]
    fn lexer_string_escapes() {
        let kinds = tokenize("\"a\\nb\\t\\\"c\\\"\"").unwrap();
        assert_eq!(kinds, vec![TokenKind::Str("a\nb\t\"c\"".to_string())]);
    }

    #[test]
    fn lexer_keywords_and_identifiers() {
        let kinds = tokenize("fun print return true false foo _bar").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Fun,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Ident("foo".to_string()),
                TokenKind::Ident("_bar".to_string()),
            ]
        );
    }

    #[test]
    fn lexer_operators_and_delimiters() {
        let kinds = tokenize("+ - * / = ( ) { } ;").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eq,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn lexer_skips_comments() {
        let kinds = tokenize("// a comment\n1 // trailing").unwrap();
        assert_eq!(kinds, vec![TokenKind::Number(1.0)]);
    }

    #[test]
    fn lexer_unexpected_character() {
        let mut lexer = Lexer::new("x = @;");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        let span = err.span.unwrap();
        assert_eq!((span.line, span.col), (1, 5));
    }

    #[test]
    fn lexer_unterminated_string() {
        let mut lexer = Lexer::new("s = \"oops");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn lexer_tracks_line_numbers() {
        let mut lexer = Lexer::new("x = 1;\ny = @;");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.span.unwrap().line, 2);
    }

    // =========================================================================
    // PARSER & COMPILER TESTS — instruction shapes
    // =========================================================================

    #[test]
    fn compile_print_string() {
        // Scenario A: two explicit instructions plus the implicit HALT.
        let program = compile("print(\"Hello, World!\");").unwrap();
        let main = program.lookup("main").unwrap();
        assert_eq!(
            main.instructions,
            vec![
                Instruction::push(Value::str("Hello, World!")),
                Instruction::print(),
                Instruction::halt(),
            ]
        );
    }

    #[test]
    fn compile_assignment() {
        let program = compile("x = 1;").unwrap();
        let main = program.lookup("main").unwrap();
        assert_eq!(
            main.instructions,
            vec![
                Instruction::push(Value::Num(1.0)),
                Instruction::store("x"),
                Instruction::halt(),
            ]
        );
    }

    #[test]
    fn compile_postorder_respects_precedence() {
        // 1 + 2 * 3 must multiply before adding.
        let program = compile("x = 1 + 2 * 3;").unwrap();
        let main = program.lookup("main").unwrap();
        assert_eq!(
            main.instructions,
            vec![
                Instruction::push(Value::Num(1.0)),
                Instruction::push(Value::Num(2.0)),
                Instruction::push(Value::Num(3.0)),
                Instruction::mul(),
                Instruction::add(),
                Instruction::store("x"),
                Instruction::halt(),
            ]
        );
    }

    #[test]
    fn compile_parenthesized_subexpression() {
        let program = compile("x = (1 + 2) * 3;").unwrap();
        let main = program.lookup("main").unwrap();
        assert_eq!(
            main.instructions,
            vec![
                Instruction::push(Value::Num(1.0)),
                Instruction::push(Value::Num(2.0)),
                Instruction::add(),
                Instruction::push(Value::Num(3.0)),
                Instruction::mul(),
                Instruction::store("x"),
                Instruction::halt(),
            ]
        );
    }

    #[test]
    fn compile_fun_declaration() {
        let program = compile("fun answer() { return 42; } x = answer();").unwrap();
        let answer = program.lookup("answer").unwrap();
        assert_eq!(
            answer.instructions,
            vec![
                Instruction::push(Value::Num(42.0)),
                Instruction::ret(),
                Instruction::halt(),
            ]
        );
        let main = program.lookup("main").unwrap();
        assert_eq!(
            main.instructions,
            vec![
                Instruction::call("answer"),
                Instruction::store("x"),
                Instruction::halt(),
            ]
        );
    }

    #[test]
    fn parse_missing_semicolon() {
        expect_error("x = 1", ErrorKind::Syntax);
    }

    #[test]
    fn parse_unknown_top_level_construct() {
        // The parser never silently skips input.
        expect_error("42;", ErrorKind::Syntax);
    }

    #[test]
    fn parse_missing_close_paren() {
        expect_error("print(1;", ErrorKind::Syntax);
    }

    #[test]
    fn parse_error_carries_span() {
        let mut lexer = Lexer::new("x = ;");
        let tokens = lexer.tokenize().unwrap();
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.span.unwrap().col, 5);
    }

    #[test]
    fn compile_return_outside_function() {
        expect_error("return 1;", ErrorKind::Syntax);
    }

    #[test]
    fn compile_duplicate_function() {
        expect_error("fun f() { } fun f() { }", ErrorKind::Syntax);
    }

    #[test]
    fn compile_fun_named_main_rejected() {
        expect_error("fun main() { }", ErrorKind::Syntax);
    }

    // =========================================================================
    // EXECUTION TESTS — scenarios
    // =========================================================================

    #[test]
    fn scenario_a_hello_world() {
        let outcome = run("print(\"Hello, World!\");").unwrap();
        assert_eq!(outcome.output, vec!["Hello, World!"]);
        assert_eq!(outcome.instructions, 3); // PUSH, PRINT, HALT
        assert_eq!(outcome.peak_stack, 1);
        assert!(outcome.result.is_none());
    }

    #[test]
    fn scenario_b_variable_arithmetic() {
        let outcome = run("x = 10; y = 20; z = x + y; print(z);").unwrap();
        assert_eq!(outcome.output, vec!["30"]);
    }

    #[test]
    fn scenario_c_manual_bytecode() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![
                Instruction::push(Value::str("ok")),
                Instruction::print(),
                Instruction::halt(),
            ],
        );
        let outcome = run_manual(&program).unwrap();
        assert_eq!(outcome.output, vec!["ok"]);
        assert_eq!(outcome.instructions, 3);
        assert_eq!(outcome.peak_stack, 1);
    }

    #[test]
    fn scenario_d_falling_off_the_end_is_halt() {
        // `leaf` has neither RETURN nor HALT; it still halts cleanly and
        // returns no value, so main's stack stays empty.
        let mut program = Program::new();
        program.define("leaf", vec![Instruction::push(Value::Num(5.0))]);
        program.define(
            "main",
            vec![Instruction::call("leaf"), Instruction::halt()],
        );
        let mut vm = Vm::new();
        let outcome = vm.execute(&program).unwrap();
        assert_eq!(vm.state(), VmState::Halted);
        assert!(outcome.result.is_none());
        assert_eq!(outcome.instructions, 3); // CALL, PUSH, HALT
    }

    // =========================================================================
    // EXECUTION TESTS — arithmetic semantics
    // =========================================================================

    #[test]
    fn arithmetic_mixed_precedence() {
        let outcome = run("x = 2 + 3 * 4 - 6 / 3; print(x);").unwrap();
        assert_eq!(outcome.output, vec!["12"]);
    }

    #[test]
    fn arithmetic_left_associative_sub() {
        let outcome = run("print(10 - 4 - 3);").unwrap();
        assert_eq!(outcome.output, vec!["3"]);
    }

    #[test]
    fn arithmetic_left_associative_div() {
        let outcome = run("print(100 / 10 / 5);").unwrap();
        assert_eq!(outcome.output, vec!["2"]);
    }

    #[test]
    fn arithmetic_fractional_result() {
        let outcome = run("print(7 / 2);").unwrap();
        assert_eq!(outcome.output, vec!["3.5"]);
    }

    #[test]
    fn string_concatenation() {
        let outcome = run("s = \"foo\" + \"bar\"; print(s);").unwrap();
        assert_eq!(outcome.output, vec!["foobar"]);
    }

    #[test]
    fn mixed_string_number_add_is_type_error() {
        // No implicit coercion between strings and numbers.
        expect_error("x = \"a\" + 1;", ErrorKind::Type);
    }

    #[test]
    fn arithmetic_on_bool_is_type_error() {
        expect_error("x = true + 1;", ErrorKind::Type);
    }

    #[test]
    fn division_by_zero() {
        expect_error("x = 1 / 0;", ErrorKind::DivideByZero);
    }

    #[test]
    fn print_bool() {
        let outcome = run("print(true); print(false);").unwrap();
        assert_eq!(outcome.output, vec!["true", "false"]);
    }

    // =========================================================================
    // EXECUTION TESTS — variables, calls, frames
    // =========================================================================

    #[test]
    fn store_overwrites_binding() {
        let outcome = run("x = 1; x = 2; print(x);").unwrap();
        assert_eq!(outcome.output, vec!["2"]);
    }

    #[test]
    fn undefined_variable() {
        expect_error("print(x);", ErrorKind::UndefinedVariable);
    }

    #[test]
    fn undefined_function() {
        expect_error("x = nope();", ErrorKind::UndefinedFunction);
    }

    #[test]
    fn call_and_return() {
        let outcome = run("fun answer() { return 40 + 2; } x = answer(); print(x);").unwrap();
        assert_eq!(outcome.output, vec!["42"]);
    }

    #[test]
    fn nested_calls() {
        let source = "
            fun inner() { return 2; }
            fun outer() { return inner(); }
            print(outer());
        ";
        let outcome = run(source).unwrap();
        assert_eq!(outcome.output, vec!["2"]);
    }

    #[test]
    fn callee_environment_is_fresh() {
        // `x` inside the function is a different binding than main's `x`.
        let source = "
            fun f() { x = 99; return x; }
            x = 1; y = f(); print(x); print(y);
        ";
        let outcome = run(source).unwrap();
        assert_eq!(outcome.output, vec!["1", "99"]);
    }

    #[test]
    fn output_order_across_frames() {
        let mut program = Program::new();
        program.define(
            "shout",
            vec![
                Instruction::push(Value::str("b")),
                Instruction::print(),
                Instruction::halt(),
            ],
        );
        program.define(
            "main",
            vec![
                Instruction::push(Value::str("a")),
                Instruction::print(),
                Instruction::call("shout"),
                Instruction::push(Value::str("c")),
                Instruction::print(),
                Instruction::halt(),
            ],
        );
        let outcome = run_manual(&program).unwrap();
        assert_eq!(outcome.output, vec!["a", "b", "c"]);
    }

    #[test]
    fn return_without_value_then_store_underflows() {
        let mut program = Program::new();
        program.define("void", vec![Instruction::halt()]);
        program.define(
            "main",
            vec![
                Instruction::call("void"),
                Instruction::store("x"),
                Instruction::halt(),
            ],
        );
        expect_manual_error(&program, ErrorKind::StackUnderflow);
    }

    #[test]
    fn instructions_after_halt_are_unreachable_not_an_error() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::halt(), Instruction::pop()],
        );
        let outcome = run_manual(&program).unwrap();
        assert_eq!(outcome.instructions, 1);
    }

    #[test]
    fn root_return_yields_result() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::push(Value::Num(7.0)), Instruction::ret()],
        );
        let outcome = run_manual(&program).unwrap();
        assert_eq!(outcome.result, Some(Value::Num(7.0)));
    }

    #[test]
    fn root_halt_exposes_stack_top() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::push(Value::Num(7.0)), Instruction::halt()],
        );
        let outcome = run_manual(&program).unwrap();
        assert_eq!(outcome.result, Some(Value::Num(7.0)));
    }

    #[test]
    fn empty_function_body() {
        let mut program = Program::new();
        program.define("main", Vec::new());
        let outcome = run_manual(&program).unwrap();
        assert_eq!(outcome.instructions, 0);
        assert!(outcome.result.is_none());
        assert!(outcome.output.is_empty());
    }

    // =========================================================================
    // EXECUTION TESTS — boundary errors
    // =========================================================================

    #[test]
    fn pop_on_empty_stack() {
        let mut program = Program::new();
        program.define("main", vec![Instruction::pop(), Instruction::halt()]);
        expect_manual_error(&program, ErrorKind::StackUnderflow);
    }

    #[test]
    fn binary_op_with_one_operand() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::push(Value::Num(1.0)), Instruction::sub()],
        );
        expect_manual_error(&program, ErrorKind::StackUnderflow);
    }

    #[test]
    fn missing_entry_point() {
        let program = Program::new();
        expect_manual_error(&program, ErrorKind::MissingEntryPoint);
    }

    #[test]
    fn execute_function_unknown_name() {
        let mut program = Program::new();
        program.define("main", vec![Instruction::halt()]);
        let mut vm = Vm::new();
        let err = vm.execute_function(&program, "ghost").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedFunction);
    }

    // =========================================================================
    // OPERAND CONTRACT TESTS — malformed hand-assembled bytecode
    // =========================================================================

    #[test]
    fn push_without_operand() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::new(Opcode::Push, Vec::new())],
        );
        expect_manual_error(&program, ErrorKind::Type);
    }

    #[test]
    fn push_with_name_operand() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::new(
                Opcode::Push,
                vec![crate::opcode::Operand::Name("x".to_string())],
            )],
        );
        expect_manual_error(&program, ErrorKind::Type);
    }

    #[test]
    fn load_with_literal_operand() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::new(
                Opcode::Load,
                vec![crate::opcode::Operand::Literal(Value::Num(1.0))],
            )],
        );
        expect_manual_error(&program, ErrorKind::Type);
    }

    #[test]
    fn halt_with_stray_operand() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![Instruction::new(
                Opcode::Halt,
                vec![crate::opcode::Operand::Literal(Value::Num(1.0))],
            )],
        );
        expect_manual_error(&program, ErrorKind::Type);
    }

    // =========================================================================
    // LIMITS
    // =========================================================================

    #[test]
    fn call_depth_limit() {
        let mut program = Program::new();
        // Unbounded self-recursion must hit the frame ceiling, not host memory.
        program.define("loop", vec![Instruction::call("loop")]);
        program.define("main", vec![Instruction::call("loop")]);

        let mut vm = Vm::with_config(VmConfig {
            max_call_depth: 8,
            max_instructions: None,
        });
        let err = vm.execute(&program).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StackOverflow);
    }

    #[test]
    fn instruction_ceiling() {
        let mut program = Program::new();
        program.define(
            "main",
            vec![
                Instruction::push(Value::Num(1.0)),
                Instruction::push(Value::Num(2.0)),
                Instruction::add(),
                Instruction::halt(),
            ],
        );
        let mut vm = Vm::with_config(VmConfig {
            max_call_depth: 256,
            max_instructions: Some(2),
        });
        let err = vm.execute(&program).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InstructionLimit);
    }

    // =========================================================================
    // METRICS & DETERMINISM
    // =========================================================================

    #[test]
    fn peak_stack_depth_tracks_expression_width() {
        // 1 + 2 * 3 keeps three values live before MUL.
        let outcome = run("x = 1 + 2 * 3;").unwrap();
        assert_eq!(outcome.peak_stack, 3);
    }

    #[test]
    fn deterministic_across_fresh_vms() {
        let program =
            compile("x = 10; y = 20; z = x + y; print(z); print(\"done\");").unwrap();

        let first = Vm::new().execute(&program).unwrap();
        let second = Vm::new().execute(&program).unwrap();

        assert_eq!(first.output, second.output);
        assert_eq!(first.instructions, second.instructions);
        assert_eq!(first.peak_stack, second.peak_stack);
    }

    #[test]
    fn vm_state_transitions() {
        let mut program = Program::new();
        program.define("main", vec![Instruction::halt()]);

        let mut vm = Vm::new();
        assert_eq!(vm.state(), VmState::Ready);
        vm.execute(&program).unwrap();
        assert_eq!(vm.state(), VmState::Halted);

        program.define("main", vec![Instruction::pop()]);
        assert!(vm.execute(&program).is_err());
        assert_eq!(vm.state(), VmState::Faulted);
    }

    // =========================================================================
    // PROGRAM CONTAINER
    // =========================================================================

    #[test]
    fn define_replaces_by_name() {
        let mut program = Program::new();
        program.define("main", vec![Instruction::halt()]);
        program.define(
            "main",
            vec![
                Instruction::push(Value::str("new")),
                Instruction::print(),
                Instruction::halt(),
            ],
        );
        assert_eq!(program.len(), 1);
        let outcome = run_manual(&program).unwrap();
        assert_eq!(outcome.output, vec!["new"]);
    }

    #[test]
    fn lookup_missing_function() {
        let program = Program::new();
        let err = program.lookup("main").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedFunction);
    }

    #[test]
    fn disassembly_lists_instructions() {
        let program = compile("print(\"Hello, World!\"); fun f() { return 1; }").unwrap();
        let listing = program.disassemble();
        assert!(listing.starts_with("fn main"));
        assert!(listing.contains("PUSH \"Hello, World!\""));
        assert!(listing.contains("fn f"));
        assert!(listing.contains("RETURN"));
    }

    // =========================================================================
    // TRACE SINK
    // =========================================================================

    /// A `Write` sink backed by a shared buffer so the test can read what
    /// the VM traced.
    #[derive(Clone)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn trace_sink_receives_records_without_changing_output() {
        let program = compile("print(\"Hello, World!\");").unwrap();

        let buf = SharedBuf(Rc::new(RefCell::new(Vec::new())));
        let mut vm = Vm::new();
        vm.set_trace_sink(Box::new(buf.clone()));
        let traced = vm.execute(&program).unwrap();

        let plain = Vm::new().execute(&program).unwrap();
        assert_eq!(traced.output, plain.output);
        assert_eq!(traced.instructions, plain.instructions);

        let trace = String::from_utf8(buf.0.borrow().clone()).unwrap();
        assert!(trace.contains("PUSH"));
        assert!(trace.contains("PRINT"));
        assert!(trace.contains("stack="));
        assert_eq!(trace.lines().count(), 3);
    }

    // =========================================================================
    // RUNTIME FACADE
    // =========================================================================

    #[test]
    fn facade_run_composes_pipeline() {
        let runtime = Runtime::new();
        let report = runtime.run("x = 10; y = 20; z = x + y; print(z);").unwrap();
        assert_eq!(report.outcome.output, vec!["30"]);
        assert!(report.total_elapsed >= report.outcome.elapsed);
    }

    #[test]
    fn facade_passes_syntax_errors_through() {
        let runtime = Runtime::new();
        let err = runtime.parse("x = ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn facade_passes_runtime_errors_through() {
        let runtime = Runtime::new();
        let err = runtime.run("x = 1 / 0;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivideByZero);
    }

    #[test]
    fn facade_shares_program_across_executions() {
        let runtime = Runtime::new();
        let program = runtime.parse("print(1);").unwrap();
        let first = runtime.execute(&program).unwrap();
        let second = runtime.execute(&program).unwrap();
        assert_eq!(first.output, second.output);
        assert_eq!(first.instructions, second.instructions);
    }

    // =========================================================================
    // DIAGNOSTIC FORMATTING & VALUE DISPLAY
    // =========================================================================

    #[test]
    fn format_error_includes_caret() {
        let source = "x = ;";
        let runtime = Runtime::new();
        let err = runtime.parse(source).unwrap_err();
        let rendered = crate::error::format_error(&err, source, "<test>");
        assert!(rendered.contains("<test>:1:5"));
        assert!(rendered.contains("x = ;"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn value_display_formats() {
        assert_eq!(Value::Num(30.0).to_display_string(), "30");
        assert_eq!(Value::Num(3.5).to_display_string(), "3.5");
        assert_eq!(Value::Bool(true).to_display_string(), "true");
        assert_eq!(Value::str("s").to_display_string(), "s");
    }

    #[test]
    fn instruction_display_is_assembler_style() {
        assert_eq!(Instruction::push(Value::Num(10.0)).to_string(), "PUSH 10");
        assert_eq!(Instruction::load("x").to_string(), "LOAD x");
        assert_eq!(
            Instruction::push(Value::str("hi")).to_string(),
            "PUSH \"hi\""
        );
        assert_eq!(Instruction::halt().to_string(), "HALT");
    }
}
