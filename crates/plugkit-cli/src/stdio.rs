//! The terminal front-end.

use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use plugkit_core::error::ToolError;
use plugkit_core::humanize::humanize_list;
use plugkit_core::param::Parameter;
use plugkit_core::plugin::FrontEnd;
use serde_json::Value;

/// Prompt-per-parameter front-end on stdin/stdout.
///
/// Prompting loops until the input validates: an invalid value is
/// reported and asked again, an empty line keeps the current value, and
/// end-of-input cancels the run. Cancellation is only recognized as
/// end-of-input (`Ctrl-D`, or `Ctrl-Z` on Windows); an interrupt signal
/// still terminates the process through the default handler.
pub struct StdioFrontEnd {
    input: Box<dyn BufRead>,
}

impl StdioFrontEnd {
    /// Read from an arbitrary source instead of stdin.
    pub fn with_input(input: Box<dyn BufRead>) -> Self {
        Self { input }
    }

    /// `None` on end-of-input.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Default for StdioFrontEnd {
    fn default() -> Self {
        Self::with_input(Box::new(BufReader::new(io::stdin())))
    }
}

fn render_prompt(param: &Parameter) -> String {
    let mut prompt = String::new();
    if !param.description().is_empty() {
        prompt.push_str(&format!("{}\n", param.description()));
    }
    prompt.push_str(param.name());
    if let Some(choices) = param.choices() {
        prompt.push_str(&format!(" ({})", humanize_list(&choices, "or")));
    }
    let current = param.value();
    if !current.is_null() {
        prompt.push_str(&format!(" [{}]", render_value(&current)));
    }
    prompt.push_str(": ");
    prompt
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FrontEnd for StdioFrontEnd {
    fn name() -> String {
        "stdio".to_string()
    }

    fn help() -> String {
        "plain terminal front-end".to_string()
    }

    fn message(&mut self, message: &str) {
        println!("{message}");
    }

    fn warning(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn error(&mut self, message: &str, details: Option<&str>) {
        match details {
            Some(details) => eprintln!("error: {message}: {details}"),
            None => eprintln!("error: {message}"),
        }
    }

    fn ask(&mut self, question: &str) -> bool {
        loop {
            print!("{question} [y/n]: ");
            let _ = io::stdout().flush();
            let Some(answer) = self.read_line() else {
                return false;
            };
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" => return false,
                _ => eprintln!("please answer y or n"),
            }
        }
    }

    fn progress_start(&mut self) {}

    fn progress_update(&mut self, message: &str, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round();
        print!("\r[{percent:3.0}%] {message}");
        let _ = io::stdout().flush();
    }

    fn progress_end(&mut self) {
        println!();
    }

    fn prompt_parameter(&mut self, param: &Rc<Parameter>) -> Result<(), ToolError> {
        loop {
            print!("{}", render_prompt(param));
            let _ = io::stdout().flush();
            let line = self.read_line().ok_or(ToolError::Cancelled)?;

            let candidate = if line.is_empty() {
                param.value()
            } else {
                Value::String(line)
            };
            match param.validate(candidate) {
                Ok(validated) => {
                    param.set_value(validated);
                    return Ok(());
                }
                Err(err) => self.error(&err.to_string(), None),
            }
        }
    }
}
