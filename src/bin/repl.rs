use minsc::env::{Environment, create_global_env};
use minsc::eval::evaluate;
use minsc::lexer::lex;
use minsc::parser::{Partial, Step, parse_incremental};
use minsc::value::Value;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;

fn main() {
    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

fn run_repl() {
    println!("minsc - a minimal Scheme-flavoured interpreter");
    println!("Enter S-expressions like: (+ 1 2)");
    println!("Unfinished expressions continue on the next line.");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("Could not initialize REPL");
    let env = create_global_env();

    // A suspended parse from earlier lines, if the expression is not
    // finished yet.
    let mut pending: Option<Partial> = None;

    loop {
        let prompt = if pending.is_some() { "...... " } else { "minsc> " };

        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Commands only apply between expressions, never inside a
                // continuation.
                if pending.is_none() {
                    match line {
                        ":help" => {
                            print_help();
                            continue;
                        }
                        ":env" => {
                            print_environment(&env);
                            continue;
                        }
                        ":quit" | ":exit" => {
                            println!("Bye.");
                            break;
                        }
                        _ => {}
                    }
                }

                let tokens = lex(line);
                let step = match pending.take() {
                    Some(partial) => partial.feed(tokens),
                    None => parse_incremental(tokens),
                };

                match step {
                    Ok(Step::Partial(partial)) => {
                        pending = Some(partial);
                    }
                    Ok(Step::Complete { expr, rest }) => {
                        if let Some(extra) = rest.first() {
                            println!(
                                "Error: {}",
                                minsc::ParseError::RedundantExpression(extra.clone())
                            );
                            continue;
                        }
                        match evaluate(&expr, &env) {
                            Ok(value) => println!("{value}"),
                            Err(err) => println!("Error: {err}"),
                        }
                    }
                    Err(err) => println!("Error: {err}"),
                }
            }

            Err(ReadlineError::Interrupted) => {
                // Ctrl+C discards a half-entered expression before it
                // exits the REPL.
                if pending.take().is_some() {
                    println!("(input discarded)");
                    continue;
                }
                println!("Bye.");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("Bye.");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("minsc REPL:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Discard pending input, or exit");
    println!();
    println!("Supported syntax:");
    println!("  Numbers: 42, -4.5");
    println!("  Booleans: #t / #f");
    println!("  Arithmetic: +, -, *, /");
    println!("  Comparison: =, <, >, <=, >=");
    println!("  Special forms: if, lambda, let, letrec, define");
    println!();
    println!("Examples:");
    println!("  (+ 1 2 3)");
    println!("  (define (square n) (* n n))");
    println!("  (let ((a 2)) (- a))");
    println!("  (letrec ((even? (lambda (n) (if (= n 0) #t (odd? (- n 1))))))");
    println!("          (even? 10))  ; spread over two lines");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.all_bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total):", bindings.len());
    println!();

    // Built-in procedures and user definitions read better apart.
    let mut builtins = Vec::new();
    let mut user_defined = Vec::new();

    for (name, value) in bindings {
        match value {
            Value::BuiltInProc { .. } => builtins.push(name),
            _ => user_defined.push((name, value)),
        }
    }

    if !builtins.is_empty() {
        println!("Built-in procedures ({}):", builtins.len());
        let mut col = 0;
        for name in builtins {
            print!("  {name:<7}");
            col += 1;
            if col % 4 == 0 {
                println!();
            }
        }
        if col % 4 != 0 {
            println!();
        }
        println!();
    }

    if !user_defined.is_empty() {
        println!("User-defined values ({}):", user_defined.len());
        for (name, value) in user_defined {
            println!("  {name} = {value}");
        }
    }
}
