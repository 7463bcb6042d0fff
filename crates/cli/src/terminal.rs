use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde_json::Value;
use std::io::{self, Write};

use toolgate_tool_runtime::ToolCall;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ASSISTANT_TEXT: Color = Color::Cyan;
    const APPROVAL: Color = Color::Yellow;
    const TOOL_RESULT: Color = Color::DarkGreen;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

const MAX_ARGUMENT_DISPLAY: usize = 200;

/// Manages terminal I/O for the chat REPL.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self, provider: &str, model: &str, conversation: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("toolgate"),
            ResetColor,
            Print(" - tool-calling assistant\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Provider: {} | Model: {}\n", provider, model)),
            Print(format!("Conversation: {}\n", conversation)),
            Print("Type 'exit' or 'quit' to end.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a line of user input with prompt.
    /// Returns None if the user wants to exit.
    pub fn read_input(&self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print("you> "),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let trimmed = input.trim();
        if is_exit_command(trimmed) {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    pub fn print_assistant(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ASSISTANT_TEXT),
            Print(format!("{}\n", text)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Ask the user to approve a sensitive tool call. The answer is read by
    /// the next `read_input`.
    pub fn print_approval_request(&self, call: &ToolCall) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::APPROVAL),
            Print(format!(
                "The assistant wants to run '{}'.\n  Input: {}\n",
                call.name(),
                summarize_arguments(call.arguments())
            )),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print("Do you approve? Answer in your own words.\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_tool_result(&self, tool_name: &str, content: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::TOOL_RESULT),
            Print(format!("  [{} result]: {}\n", tool_name, content)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

fn is_exit_command(input: &str) -> bool {
    matches!(input, "exit" | "quit" | "/exit" | "/quit")
}

/// Compact one-line rendering of tool arguments, truncated for display.
fn summarize_arguments(arguments: &Value) -> String {
    let text = match arguments {
        Value::Object(map) if map.len() == 1 => match map.values().next() {
            Some(Value::String(s)) => s.clone(),
            _ => arguments.to_string(),
        },
        _ => arguments.to_string(),
    };
    if text.chars().count() > MAX_ARGUMENT_DISPLAY {
        let head: String = text.chars().take(MAX_ARGUMENT_DISPLAY).collect();
        format!("{}... ({} chars total)", head, text.chars().count())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("/exit"));
        assert!(!is_exit_command("exit please"));
    }

    #[test]
    fn test_single_string_argument_is_shown_bare() {
        assert_eq!(summarize_arguments(&json!({"prompt": "a red fox"})), "a red fox");
        assert_eq!(
            summarize_arguments(&json!({"a": 1, "b": 2})),
            r#"{"a":1,"b":2}"#
        );
    }

    #[test]
    fn test_long_arguments_are_truncated() {
        let long = "x".repeat(500);
        let shown = summarize_arguments(&json!({ "prompt": long }));
        assert!(shown.ends_with("... (500 chars total)"));
        assert!(shown.len() < 500);
    }
}
