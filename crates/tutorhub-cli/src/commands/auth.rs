//! login, logout and whoami

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use parking_lot::Mutex;
use tracing::info;

use crate::commands::Command;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputStyle};

/// Source of interactive answers
pub trait Prompt: Send + Sync {
    fn ask(&self, question: &str) -> CliResult<String>;

    /// Like [`Prompt::ask`], without echoing the answer
    fn ask_secret(&self, question: &str) -> CliResult<String> {
        self.ask(question)
    }
}

/// Reads answers from the terminal
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&self, question: &str) -> CliResult<String> {
        let style = OutputStyle::default();
        print!("{}", style.prompt(question));
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    fn ask_secret(&self, question: &str) -> CliResult<String> {
        if !io::stdin().is_terminal() {
            return self.ask(question);
        }

        let style = OutputStyle::default();
        print!("{}", style.prompt(question));
        io::stdout().flush()?;

        terminal::enable_raw_mode()?;
        let input = read_hidden_line();
        terminal::disable_raw_mode()?;
        println!();
        Ok(input?.trim().to_string())
    }
}

/// Collect key presses up to Enter; raw mode must already be on
fn read_hidden_line() -> io::Result<String> {
    let mut input = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled")),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }
}

/// Answers given up front, handed out in order
pub struct ScriptedPrompt {
    answers: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut answers: Vec<String> = answers.into_iter().map(Into::into).collect();
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str) -> CliResult<String> {
        self.answers
            .lock()
            .pop()
            .ok_or_else(|| CliError::invalid(format!("no answer for '{}'", question)))
    }
}

/// Password, then one-time code, then store the tokens
pub struct LoginCommand {
    phone: String,
    prompt: Arc<dyn Prompt>,
}

impl LoginCommand {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            prompt: Arc::new(StdinPrompt),
        }
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }

    fn ask_required(&self, question: &str, what: &str) -> CliResult<String> {
        require(self.prompt.ask(question)?, what)
    }
}

fn require(answer: String, what: &str) -> CliResult<String> {
    if answer.is_empty() {
        return Err(CliError::invalid(format!("{} is required", what)));
    }
    Ok(answer)
}

#[async_trait]
impl Command for LoginCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(CliError::invalid("phone number is required"));
        }

        let password = require(self.prompt.ask_secret("Password:")?, "password")?;
        let auth = ctx.session().auth_api();
        let sent = auth.login(phone, &password).await?;
        if !sent.message.is_empty() {
            output::print_info(&sent.message);
        }
        if let Some(code) = &sent.mock {
            output::print_info(&format!("Development code: {}", code));
        }

        let code = self.ask_required("One-time code:", "one-time code")?;
        let tokens = auth.authenticate(phone, &code).await?;
        ctx.session().login(tokens, phone)?;

        info!("Login complete");
        output::print_success(&format!("Signed in as {}", phone));
        Ok(())
    }
}

pub struct LogoutCommand;

#[async_trait]
impl Command for LogoutCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        if !ctx.session().is_authenticated() {
            output::print_info("Already signed out");
            return Ok(());
        }
        ctx.session().logout().await;
        output::print_success("Signed out");
        Ok(())
    }
}

pub struct WhoamiCommand;

#[async_trait]
impl Command for WhoamiCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let user = ctx.current_user().await?;
        let style = OutputStyle::default();
        println!("{}", style.header("Signed in"));
        println!("{}", style.key_value("user id", &style.code(&user.user_id)));
        println!("{}", style.key_value("phone", &user.phone_number));
        println!("{}", style.key_value("email", &user.email));
        if let Some(session) = ctx.session().session() {
            let expires = chrono::DateTime::from_timestamp_millis(session.expiration)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| session.expiration.to_string());
            println!("{}", style.key_value("session expires", &expires));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompt_answers_in_order() {
        let prompt = ScriptedPrompt::new(["secret", "123456"]);
        assert_eq!(prompt.ask("Password:").unwrap(), "secret");
        assert_eq!(prompt.ask("Code:").unwrap(), "123456");
        assert!(prompt.ask("More:").is_err());
    }

    #[test]
    fn test_secret_answers_share_the_script() {
        let prompt = ScriptedPrompt::new(["secret", "123456"]);
        assert_eq!(prompt.ask_secret("Password:").unwrap(), "secret");
        assert_eq!(prompt.ask("Code:").unwrap(), "123456");
    }

    #[test]
    fn test_require_rejects_empty_answer() {
        assert!(matches!(
            require(String::new(), "password"),
            Err(CliError::InvalidArgument { .. })
        ));
        assert_eq!(require("pw".into(), "password").unwrap(), "pw");
    }
}
