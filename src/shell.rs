use anyhow::Result;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use crate::tools::container::{ContainerExecutor, SANDBOX_DIR};

const PROMPT: &str = ">> ";

#[derive(Debug, Clone, PartialEq)]
enum ShellInput {
    Skip,
    Quit,
    Command(String),
}

fn parse_line(line: &str) -> ShellInput {
    let command = line.trim();
    if command.is_empty() {
        ShellInput::Skip
    } else if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
        ShellInput::Quit
    } else {
        ShellInput::Command(command.to_string())
    }
}

/// Type commands straight into the container, no model involved
pub fn run(executor: &ContainerExecutor) -> Result<()> {
    println!("Connected to container: {}", style(executor.container()).bold());
    println!("Type 'exit' to quit.\n");

    match executor.run(&format!("mkdir -p {}", SANDBOX_DIR), "/") {
        Ok(output) if output.exit_code != 0 => {
            warn!(exit_code = output.exit_code, stderr = %output.stderr.trim(), "could not create sandbox dir")
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "could not create sandbox dir"),
    }

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("\nInterrupted. Type 'exit' to quit.");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_line(&line) {
            ShellInput::Skip => continue,
            ShellInput::Quit => break,
            ShellInput::Command(command) => {
                let _ = editor.add_history_entry(command.as_str());
                match executor.run(&command, "/") {
                    Ok(output) => {
                        if !output.stdout.is_empty() {
                            println!("{}", output.stdout.trim());
                        }
                        if !output.stderr.is_empty() {
                            eprintln!("{}", output.stderr.trim());
                        }
                    }
                    Err(e) => println!("[error: {:#}]", e),
                }
            }
        }
    }

    Ok(())
}
