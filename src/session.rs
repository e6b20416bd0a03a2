//! The interactive question/answer loop.
//!
//! A session is either running (accepting input) or terminated. It
//! terminates on a quit word or when the input stream ends; nothing else
//! moves it out of the running state.

use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::banner::{BannerInfo, FAREWELL, NOT_FOUND, NOT_FOUND_HINT, PROMPT, print_banner};
use crate::consts::{DEFAULT_CONFIDENCE_THRESHOLD, QUIT_WORDS, format_confidence};
use crate::retriever::{Answer, Retriever};
use crate::spinner::{SpinnerOutput, spin_while};

/// One line of user input, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Quit,
    Empty,
    Question(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Input::Empty
        } else if QUIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
            Input::Quit
        } else {
            Input::Question(line)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated,
}

pub struct SessionOptions {
    pub confidence_threshold: f64,
    /// Print service errors instead of the "no answer" fallback.
    pub strict: bool,
    /// Where to draw a spinner while waiting for the service, if anywhere.
    pub spinner: Option<SpinnerOutput>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            strict: false,
            spinner: None,
        }
    }
}

pub struct Session {
    retriever: Retriever,
    options: SessionOptions,
    state: SessionState,
}

impl Session {
    pub fn new(retriever: Retriever, options: SessionOptions) -> Self {
        Self {
            retriever,
            options,
            state: SessionState::Running,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Print the banner, then answer lines from `input` until a quit word
    /// or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        print_banner(
            out,
            &BannerInfo {
                project: self.retriever.project_name(),
                deployment: self.retriever.deployment_name(),
            },
        )?;

        let mut lines = input.lines();

        while self.state == SessionState::Running {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let Some(line) = lines.next_line().await.context("failed to read input")? else {
                // EOF (Ctrl+D)
                writeln!(out)?;
                self.state = SessionState::Terminated;
                break;
            };

            match Input::parse(&line) {
                Input::Quit => {
                    writeln!(out, "{FAREWELL}")?;
                    self.state = SessionState::Terminated;
                }
                Input::Empty => continue,
                Input::Question(question) => {
                    self.ask(question, out).await?;
                    writeln!(out)?;
                }
            }
        }

        tracing::debug!("session terminated");
        Ok(())
    }

    /// Handle one line outside the loop: a quit word says goodbye, a
    /// blank line does nothing, anything else is asked.
    pub async fn respond<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        match Input::parse(line) {
            Input::Quit => {
                writeln!(out, "{FAREWELL}")?;
                self.state = SessionState::Terminated;
            }
            Input::Empty => {}
            Input::Question(question) => self.ask(question, out).await?,
        }
        Ok(())
    }

    /// Answer a single question and print the result.
    pub async fn ask<W: Write>(&self, question: &str, out: &mut W) -> Result<()> {
        let threshold = self.options.confidence_threshold;

        // Failures are only logged once the spinner has let go of its line
        let result = spin_while(
            "searching knowledge base",
            self.options.spinner.as_ref(),
            self.retriever.try_get_answer(question, threshold),
        )
        .await;

        match result {
            Err(e) if self.options.strict => writeln!(out, "error: {e:#}")?,
            result => print_answer(out, &Retriever::downgrade(result))?,
        }
        Ok(())
    }
}

/// Parse a `--question` value, rejecting blank input.
pub fn parse_question(s: &str) -> Result<String, String> {
    match s.trim() {
        "" => Err("question must not be empty".to_string()),
        question => Ok(question.to_string()),
    }
}

fn print_answer(out: &mut impl Write, answer: &Answer) -> std::io::Result<()> {
    match &answer.text {
        Some(text) => {
            writeln!(out, "Bot: {text}")?;
            writeln!(
                out,
                "     (Confidence: {})",
                format_confidence(answer.confidence)
            )
        }
        None => {
            writeln!(out, "{NOT_FOUND}")?;
            writeln!(out, "{NOT_FOUND_HINT}")
        }
    }
}
