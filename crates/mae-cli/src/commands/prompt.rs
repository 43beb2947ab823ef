//! Line-based prompts on stdin.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};

/// Reads one line from stdin after printing `label`.
pub fn read_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Where a password typed by the user comes from.
#[derive(Debug, PartialEq, Eq)]
enum SecretInput {
    /// Interactive terminal, read with echo disabled.
    Hidden,
    /// Piped stdin, read as one plain line.
    Piped,
}

impl SecretInput {
    fn for_stdin(is_terminal: bool) -> Self {
        if is_terminal { Self::Hidden } else { Self::Piped }
    }

    fn read(&self, label: &str) -> Result<String> {
        match self {
            Self::Hidden => rpassword::prompt_password(label).context("Failed to read password"),
            Self::Piped => read_line(""),
        }
    }
}

/// The password given on the command line, else read from stdin.
pub fn password(given: Option<String>) -> Result<String> {
    let password = match given {
        Some(password) => password,
        None => SecretInput::for_stdin(io::stdin().is_terminal()).read("Mot de passe: ")?,
    };
    if password.is_empty() {
        bail!("Mot de passe requis");
    }
    Ok(password)
}

/// Asks a yes/no question; anything but `o`/`oui`/`y`/`yes` is a no.
pub fn confirm(question: &str) -> bool {
    match read_line(&format!("{} [o/N] ", question)) {
        Ok(answer) => is_yes(&answer),
        Err(e) => {
            tracing::warn!("[Cli] Confirmation aborted: {}", e);
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "o" | "oui" | "y" | "yes"
    )
}
