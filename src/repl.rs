use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use strand::error::format_error;
use strand::runtime::Runtime;

/// Runs the interactive loop: each submitted snippet goes through the full
/// parse + execute pipeline on a fresh VM, so snippets are independent.
pub fn start(runtime: &Runtime) {
    let mut editor = match DefaultEditor::new() {
        Ok(ed) => ed,
        Err(e) => {
            eprintln!("failed to initialize REPL: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        let input = match read_input(&mut editor) {
            Some(line) => line,
            None => break,
        };

        if input.trim().is_empty() {
            continue;
        }

        match runtime.run(&input) {
            Ok(report) => {
                for line in &report.outcome.output {
                    println!("{}", line);
                }
                if let Some(value) = &report.outcome.result {
                    println!("=> {}", value);
                }
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, &input, "<repl>"));
            }
        }
    }
}

fn read_input(editor: &mut DefaultEditor) -> Option<String> {
    let first_line = match editor.readline(">> ") {
        Ok(line) => line,
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => return None,
        Err(e) => {
            eprintln!("readline error: {}", e);
            return None;
        }
    };

    if first_line.trim() == ".exit" {
        return None;
    }

    let mut buffer = first_line;

    while needs_continuation(&buffer) {
        match editor.readline(".. ") {
            Ok(line) => {
                buffer.push('\n');
                buffer.push_str(&line);
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(e) => {
                eprintln!("readline error: {}", e);
                break;
            }
        }
    }

    let _ = editor.add_history_entry(&buffer);
    Some(buffer)
}

/// A snippet continues while it has unbalanced braces or parens outside
/// string literals.
fn needs_continuation(input: &str) -> bool {
    let mut braces: i32 = 0;
    let mut parens: i32 = 0;
    let mut in_string = false;
    let mut prev_byte: u8 = 0;

    for &byte in input.as_bytes() {
        if in_string {
            if byte == b'"' && prev_byte != b'\\' {
                in_string = false;
            }
            prev_byte = byte;
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => braces += 1,
            b'}' => braces -= 1,
            b'(' => parens += 1,
            b')' => parens -= 1,
            _ => {}
        }

        prev_byte = byte;
    }

    braces > 0 || parens > 0
}
