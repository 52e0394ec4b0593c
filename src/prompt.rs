use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;

use crate::models::message::{Message, Role};

const PROMPT: &str = ">>> ";
const MAX_STRING_LENGTH: usize = 40;
const INDENT: &str = "    ";

pub const FAREWELL: &str = "bye.";

/// The terminal side of a chat session
pub trait Prompt {
    fn render(&mut self, message: &Message);
    fn render_error(&mut self, error: &dyn std::error::Error);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Optional content as sometimes the user may be issuing a command eg. (Exit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

impl Input {
    pub fn ask_again() -> Self {
        Input {
            input_type: InputType::AskAgain,
            content: None,
        }
    }

    pub fn exit() -> Self {
        Input {
            input_type: InputType::Exit,
            content: None,
        }
    }

    pub fn message<S: Into<String>>(text: S) -> Self {
        Input {
            input_type: InputType::Message,
            content: Some(text.into()),
        }
    }
}

/// Classify one line typed at the prompt
pub fn parse_input(line: &str) -> Input {
    let text = line.trim();
    if text.is_empty() {
        return Input::ask_again();
    }

    let command = text.strip_prefix('/').unwrap_or(text);
    if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
        Input::exit()
    } else {
        Input::message(text)
    }
}

pub struct RustylinePrompt {
    editor: DefaultEditor,
    spinner: Option<cliclack::ProgressBar>,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            editor: DefaultEditor::new()?,
            spinner: None,
        })
    }
}

fn print_markdown(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if printed.is_err() {
        println!("{}", content);
    }
}

fn print_tool_request_header(name: &str, id: &str) {
    println!();
    println!(
        "─── {} | {} ──────────────────────────",
        style(name),
        style(id).magenta().dim(),
    );
}

/// Format and print parameters recursively with proper indentation and colors
fn print_params(value: &Value, depth: usize) {
    let indent = INDENT.repeat(depth);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{}{}:", indent, style(key).dim());
                        print_params(val, depth + 1);
                    }
                    Value::String(s) if s.len() > MAX_STRING_LENGTH && key != "command" => {
                        println!("{}{}: {}", indent, style(key).dim(), style("...").dim());
                    }
                    Value::String(s) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(s).green());
                    }
                    other => {
                        println!("{}{}: {}", indent, style(key).dim(), style(other).blue());
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("{}{}.", indent, i + 1);
                print_params(item, depth + 1);
            }
        }
        Value::String(s) => println!("{}{}", indent, style(s).green()),
        other => println!("{}{}", indent, style(other).yellow()),
    }
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: &Message) {
        match message.role {
            Role::Assistant => {
                if !message.text().is_empty() || !message.has_tool_calls() {
                    print_markdown(message.text());
                    println!();
                }
                for call in &message.tool_calls {
                    print_tool_request_header(&call.name, &call.id);
                    match serde_json::from_str::<Value>(&call.arguments) {
                        Ok(arguments) => print_params(&arguments, 0),
                        Err(_) => println!("{}", style(&call.arguments).yellow()),
                    }
                }
            }
            Role::Tool => {
                println!("{}", style(message.text()).dim());
                println!();
            }
            Role::System | Role::User => {}
        }
    }

    fn render_error(&mut self, error: &dyn std::error::Error) {
        eprintln!("{} {}", style("error:").red().bold(), error);
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("awaiting reply");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }

    fn get_input(&mut self) -> Result<Input> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                let input = parse_input(&line);
                if input.input_type == InputType::Message {
                    let _ = self.editor.add_history_entry(line.trim());
                }
                Ok(input)
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!();
                Ok(Input::exit())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) {
        println!("{}", FAREWELL);
    }
}
