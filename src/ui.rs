// UI layer: status lines printed while importing, the spinner shown during
// setup, and the interactive prompts used to fill in missing credentials.

use anyhow::{bail, Result};
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn colour() -> bool {
    std::io::stdout().is_tty()
}

pub fn success(msg: &str) {
    if colour() {
        println!("{} {}", "✓".green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

pub fn warning(msg: &str) {
    if colour() {
        println!("{} {}", "!".yellow(), msg);
    } else {
        println!("! {}", msg);
    }
}

pub fn failure(msg: &str) {
    if colour() {
        println!("{} {}", "✗".red(), msg);
    } else {
        println!("✗ {}", msg);
    }
}

pub fn heading(msg: &str) {
    if colour() {
        println!("\n{}", msg.bold());
    } else {
        println!("\n{}", msg);
    }
}

/// Spinner shown while a blocking call runs. Hidden when stderr is not a
/// terminal, which indicatif handles on its own.
pub fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct ProvidedCredentials {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fill in whatever is missing by prompting, which is only possible with
/// a terminal on stdin.
pub fn complete_credentials(provided: ProvidedCredentials) -> Result<(String, String, String)> {
    let interactive = std::io::stdin().is_tty();
    let missing = |name: &str| -> Result<()> {
        if !interactive {
            bail!("{} not provided and no terminal is attached to prompt for it", name);
        }
        Ok(())
    };

    let url = match provided.url {
        Some(u) => u,
        None => {
            missing("API URL (--url)")?;
            Input::<String>::new()
                .with_prompt("MIO API URL")
                .interact_text()?
        }
    };
    let username = match provided.username {
        Some(u) => u,
        None => {
            missing("username (--username)")?;
            Input::<String>::new().with_prompt("Username").interact_text()?
        }
    };
    let password = match provided.password {
        Some(p) => p,
        None => {
            missing("password (--password)")?;
            // `Password` hides input in terminal for passwords.
            Password::new().with_prompt("Password").interact()?
        }
    };
    Ok((url, username, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_provided_credentials_need_no_prompt() {
        let provided = ProvidedCredentials {
            url: Some("http://mio".into()),
            username: Some("admin".into()),
            password: Some("pw".into()),
        };
        let (url, user, pass) = complete_credentials(provided).unwrap();
        assert_eq!(url, "http://mio");
        assert_eq!(user, "admin");
        assert_eq!(pass, "pw");
    }
}
