//! Interactive loop: read a line, dispatch it, print what changed.

#[cfg(test)]
#[path = "repl_test.rs"]
mod repl_test;

use chat::{Backend, Cancelled, ChatSession, DispatchError, Dispatcher, DrillDownError, DrillDownScope, SubmitError};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::CliError;
use crate::render::Renderer;

pub const HELP: &str = "\
Type a question and press Enter.
  /suggest     list suggested prompts
  /N           ask suggestion N
  /more N      fetch more information for answer N
  /raw N       show the raw results behind answer N
  /help        show this help
  /quit        exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Suggestion(usize),
    More(usize),
    Raw(usize),
    ListSuggestions,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse one input line.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line.to_owned());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().and_then(|a| a.parse::<usize>().ok());
    match (name, arg) {
        ("quit" | "exit" | "q", _) => Command::Quit,
        ("help" | "h" | "?", _) => Command::Help,
        ("suggest" | "suggestions", _) => Command::ListSuggestions,
        ("more", Some(n)) => Command::More(n),
        ("raw", Some(n)) => Command::Raw(n),
        (n, None) => n
            .parse::<usize>()
            .map_or_else(|_| Command::Unknown(line.to_owned()), Command::Suggestion),
        _ => Command::Unknown(line.to_owned()),
    }
}

/// Numbered suggestion list, 1-based.
pub fn suggestion_list(session: &ChatSession) -> String {
    session
        .config()
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  /{} {s}\n", i + 1))
        .collect()
}

pub struct Repl<B> {
    dispatcher: Dispatcher<B>,
    session: ChatSession,
    renderer: Renderer,
}

impl<B: Backend> Repl<B> {
    pub fn new(dispatcher: Dispatcher<B>, session: ChatSession, renderer: Renderer) -> Self {
        Self { dispatcher, session, renderer }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Ask one question and return the rendered answer.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Dispatch`] when the session refused the query or
    /// the request was cancelled.
    pub async fn ask(&mut self, query: &str) -> Result<String, CliError> {
        let index = self.dispatcher.submit(&mut self.session, query).await?;
        Ok(self.render_at(index))
    }

    /// Fetch more information for answer `index` and return the refreshed
    /// rendering of that answer.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Dispatch`] when the drill-down could not start.
    pub async fn more(&mut self, index: usize) -> Result<String, CliError> {
        let updated = self.dispatcher.request_more_info(&mut self.session, index).await?;
        let mut out = self.render_at(index);
        if updated > 1 {
            out.push_str(&format!("(applied to {updated} answers)\n"));
        }
        Ok(out)
    }

    /// Answers to every eligible message in the transcript, in order.
    pub fn eligible_answers(&self) -> Vec<usize> {
        (0..self.session.store().len()).filter(|&i| self.session.offers_more_info(i)).collect()
    }

    fn render_at(&self, index: usize) -> String {
        self.session
            .view()
            .get(index)
            .map(|view| self.renderer.message(view))
            .unwrap_or_default()
    }

    /// Handle one command. Returns `false` when the loop should stop.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Dispatch`] only for cancellation; refused
    /// requests are reported to the user and the loop continues.
    pub async fn handle(&mut self, command: Command, out: &mut String) -> Result<bool, CliError> {
        let result = match command {
            Command::Quit => return Ok(false),
            Command::Empty => return Ok(true),
            Command::Help => {
                out.push_str(HELP);
                out.push('\n');
                return Ok(true);
            }
            Command::ListSuggestions => {
                out.push_str(&suggestion_list(&self.session));
                return Ok(true);
            }
            Command::Unknown(line) => {
                out.push_str(&self.renderer.error(&format!("unknown command: {line} (try /help)\n")));
                return Ok(true);
            }
            Command::Raw(index) => {
                match self.session.view().get(index) {
                    Some(chat::MessageView::Bot { details: Some(details), .. }) => {
                        out.push_str(&self.renderer.raw(details));
                    }
                    _ => out.push_str(&self.renderer.error(&format!("no results behind message {index}\n"))),
                }
                return Ok(true);
            }
            Command::Suggestion(n) => match n.checked_sub(1).and_then(|i| self.session.config().suggestions.get(i)).cloned() {
                Some(prompt) => {
                    out.push_str(&self.renderer.message(&chat::MessageView::User { index: 0, text: prompt.clone() }));
                    self.ask(&prompt).await
                }
                None => {
                    out.push_str(&self.renderer.error(&format!("no suggestion {n}\n")));
                    return Ok(true);
                }
            },
            Command::Ask(query) => self.ask(&query).await,
            Command::More(index) => self.more(index).await,
        };

        match result {
            Ok(text) => out.push_str(&text),
            Err(e @ CliError::Dispatch(DispatchError::Cancelled(_))) => return Err(e),
            Err(CliError::Dispatch(DispatchError::Submit(SubmitError::EmptyQuery))) => {}
            Err(CliError::Dispatch(DispatchError::DrillDown(e @ (DrillDownError::NotEligible(_) | DrillDownError::NoSuchMessage(_))))) => {
                out.push_str(&self.renderer.error(&format!("{e}\n")));
            }
            Err(e) => {
                warn!(error = %e, "command failed");
                out.push_str(&self.renderer.error(&format!("{e}\n")));
            }
        }
        Ok(true)
    }

    /// Ask `queries` in order, writing each answer to `out`. Blank queries are
    /// skipped. With `more_info`, drill into the eligible answers afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when `out` cannot be written and
    /// [`CliError::Dispatch`] when a request is refused or cancelled.
    pub async fn run_batch<W>(&mut self, queries: &[String], more_info: bool, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        for query in queries {
            let answer = match self.ask(query).await {
                Ok(answer) => answer,
                Err(CliError::Dispatch(DispatchError::Submit(SubmitError::EmptyQuery))) => continue,
                Err(e) => return Err(e),
            };
            let text = format!("you> {}\n{answer}", query.trim());
            out.write_all(text.as_bytes()).await?;
        }
        if more_info {
            // With the default scope one drill-down refreshes every eligible
            // answer, so only the first is needed.
            let targets = self.eligible_answers();
            let targets = match self.session.config().drill_down_scope {
                DrillDownScope::AllEligible => targets.into_iter().take(1).collect::<Vec<_>>(),
                DrillDownScope::Triggering => targets,
            };
            for index in targets {
                let text = self.more(index).await?;
                out.write_all(text.as_bytes()).await?;
            }
        }
        out.flush().await?;
        Ok(())
    }

    /// Run the prompt loop on stdin/stdout until `/quit`, EOF or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when the terminal cannot be read or written.
    pub async fn run(&mut self) -> Result<(), CliError> {
        let cancel = self.dispatcher.cancel_token();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        let mut banner = format!("Warranty Bot. {}\n\n", HELP.lines().next().unwrap_or_default());
        banner.push_str("Suggestions:\n");
        banner.push_str(&suggestion_list(&self.session));
        stdout.write_all(banner.as_bytes()).await?;

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let line = match cancel.run(lines.next_line()).await {
                Ok(line) => line?,
                Err(Cancelled) => break,
            };
            let Some(line) = line else { break };

            let mut out = String::new();
            let keep_going = match self.handle(parse_line(&line), &mut out).await {
                Ok(keep_going) => keep_going,
                Err(CliError::Dispatch(DispatchError::Cancelled(_))) => false,
                Err(e) => return Err(e),
            };
            stdout.write_all(out.as_bytes()).await?;
            if !keep_going {
                break;
            }
        }
        self.session.close();
        stdout.write_all(b"\n").await?;
        Ok(())
    }
}
