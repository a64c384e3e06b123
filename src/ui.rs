//! Line-oriented chat loop.
use std::io::{self, BufRead, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use crate::session::{ChatSession, Message};

pub const TITLE: &str = "Ask MediBot!";
pub const INPUT_PLACEHOLDER: &str = "Enter your prompt here";

/// Print one transcript entry as `role> content`.
pub fn render_message<W: Write>(out: &mut W, message: &Message) -> io::Result<()> {
    writeln!(out, "{}> {}", message.role, message.content)
}

pub struct ChatUi<'a, R, W> {
    session: ChatSession<'a>,
    input: R,
    output: W,
    spinner: bool,
}

impl<'a, R: BufRead, W: Write> ChatUi<'a, R, W> {
    pub fn new(session: ChatSession<'a>, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
            spinner: true,
        }
    }

    /// Disable the stderr spinner shown while a question is answered.
    #[must_use]
    pub fn without_spinner(mut self) -> Self {
        self.spinner = false;
        self
    }

    #[must_use]
    pub fn session(&self) -> &ChatSession<'a> {
        &self.session
    }

    /// Run until the input is exhausted.
    ///
    /// A failed turn is reported and the loop carries on with the next input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "{TITLE}")?;
        for message in self.session.transcript().iter() {
            render_message(&mut self.output, message)?;
        }

        let mut line = String::new();
        loop {
            write!(self.output, "{INPUT_PLACEHOLDER}: ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                debug!("Input closed");
                writeln!(self.output)?;
                return Ok(());
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            self.step(input)?;
        }
    }

    fn step(&mut self, input: &str) -> io::Result<()> {
        let spinner = self.spinner.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Thinking...");
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let result = self.session.turn(input);

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(exchange) => {
                render_message(&mut self.output, exchange.question)?;
                render_message(&mut self.output, exchange.answer)?;
            }
            Err(e) => {
                error!("{e}");
                writeln!(self.output, "error: {e}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_render_message() {
        let mut out = Vec::new();
        let message = Message {
            role: Role::User,
            content: "What is diabetes?".into(),
        };
        render_message(&mut out, &message).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "user> What is diabetes?\n");
    }
}
