// UI layer: terminal prompts via `dialoguer`, a spinner around blocking
// calls, and the coloured status lines the commands print.

use crate::api::TemplateErrors;
use crate::context::Prompter;
use crossterm::style::Stylize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

/// Prompter backed by the real terminal. Secrets use hidden input;
/// everything else is a plain text line.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        Input::<String>::new().with_prompt(label).interact_text()
    }

    fn prompt_hidden(&mut self, label: &str) -> io::Result<String> {
        Password::new().with_prompt(label).interact()
    }
}

/// Run `f` while a spinner shows `message`, then finish with "Ok" or
/// clear the line on failure.
pub fn with_spinner<T, E>(message: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = f();
    match &result {
        Ok(_) => spinner.finish_with_message(format!("{message}... Ok")),
        Err(_) => spinner.finish_and_clear(),
    }
    result
}

/// Print a `label message` line with a bold green label.
pub fn status(label: &str, message: &str) {
    println!("{} {}", label.bold().green(), message);
}

/// Print a `label message` line with a bold red label.
pub fn failure(label: &str, message: &str) {
    eprintln!("{} {}", label.bold().red(), message);
}

/// One line per validation error, `template L{line}:{column}: description`.
pub fn format_template_errors(errors: &TemplateErrors) -> Vec<String> {
    errors
        .iter()
        .flat_map(|(template, list)| {
            list.iter().map(move |e| {
                format!("{template} L{}:{}: {}", e.line, e.column, e.description)
            })
        })
        .collect()
}

pub fn report_template_errors(errors: &TemplateErrors) {
    for line in format_template_errors(errors) {
        failure("Validation error", &line);
    }
}
