use std::io::{self, Write};

use crate::error::Result;

/// Interactive input for the three credential prompts.
///
/// Split from the workflow so tests can script responses. The values read
/// here live only as long as the field fill they feed; they are never
/// persisted, cached, or written to any log.
pub trait Prompter: Send + Sync {
    /// Prompts with `label` and reads one echoed line.
    fn prompt_line(&self, label: &str) -> Result<String>;

    /// Prompts with `label` and reads one line with terminal echo suppressed.
    fn prompt_secret(&self, label: &str) -> Result<String>;
}

/// Terminal-backed prompter. Secrets go through `rpassword`, which neither
/// echoes nor buffers the input.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn prompt_line(&self, label: &str) -> Result<String> {
        print!("{label}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn prompt_secret(&self, label: &str) -> Result<String> {
        Ok(rpassword::prompt_password(label)?)
    }
}
