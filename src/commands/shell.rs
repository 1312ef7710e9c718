//! The interactive session: reads one command per line and runs it against a long-lived
//! `Tracker`. A failed command prints its error and the session carries on.

use crate::args::{DeleteArgs, ShellCommand, ShellLine};
use crate::commands::{add, delete, list, resolve, summary, Out};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::Transaction;
use crate::tracker::Tracker;
use crate::Result;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, trace};

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  add <type> <category> <amount> [description...]
      Record a transaction. <type> is Income or Expense. Quote categories with spaces,
      e.g. add Income \"Other Income\" 50 birthday money
  delete <row|id> [--yes]
      Delete the transaction in that row of `list`, or with that id
  list       Show all transactions
  summary    Show the balance, income and expenses
  reload     Load the transactions from the remote store again
  help       Show this help
  quit       Leave (also: exit)

Categories: Salary, Freelance, Investment, \"Other Income\", Food, Transport, Bills,
Entertainment, Shopping, Healthcare, \"Other Expense\"";

/// Runs the interactive session on stdin and stdout until `quit` or end of input.
///
/// # Errors
/// - `Io` if the terminal cannot be read or written.
pub async fn shell(tracker: &mut Tracker) -> Result<()> {
    run(tracker, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Deletes the transaction named by `args` from a one-shot command, asking on stdin first unless
/// `--yes` was given.
pub async fn delete_prompted(tracker: &mut Tracker, args: &DeleteArgs) -> Result<Out<Transaction>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut output = tokio::io::stdout();
    confirmed_delete(tracker, args, &mut lines, &mut output).await
}

async fn run<R, W>(tracker: &mut Tracker, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let greeting = format!(
        "{}\n{}\nType 'help' for a list of commands.",
        tracker.status(),
        tracker.summarize()
    );
    emit(&mut output, &greeting).await?;

    loop {
        write(&mut output, PROMPT).await?;
        let Some(line) = next_line(&mut lines).await? else {
            debug!("End of input");
            break;
        };
        trace!("Shell input: {line}");
        let words = match tokenize(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                emit(&mut output, &format!("Error: {e}")).await?;
                continue;
            }
        };
        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command().clone(),
            Err(e) => {
                emit(&mut output, e.render().to_string().trim_end()).await?;
                continue;
            }
        };
        if matches!(command, ShellCommand::Quit) {
            break;
        }
        let message = match execute(tracker, command, &mut lines, &mut output).await {
            Ok(message) => message,
            Err(e) if e.is(ErrorType::Io) => return Err(e),
            Err(e) => format!("Error: {e}"),
        };
        emit(&mut output, &message).await?;
    }
    Ok(())
}

/// Runs one parsed command and returns the text to show.
async fn execute<R, W>(
    tracker: &mut Tracker,
    command: ShellCommand,
    lines: &mut Lines<R>,
    output: &mut W,
) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    Ok(match command {
        ShellCommand::Add(args) => add(tracker, &args).await?.message().to_string(),
        ShellCommand::Delete(args) => confirmed_delete(tracker, &args, lines, output)
            .await?
            .message()
            .to_string(),
        ShellCommand::List => list(tracker).message().to_string(),
        ShellCommand::Summary => summary(tracker).message().to_string(),
        ShellCommand::Reload => {
            let count = tracker.reload().await?;
            format!("Reloaded {count} transactions\n{}", tracker.summarize())
        }
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Quit => String::new(),
    })
}

async fn confirmed_delete<R, W>(
    tracker: &mut Tracker,
    args: &DeleteArgs,
    lines: &mut Lines<R>,
    output: &mut W,
) -> Result<Out<Transaction>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if !args.yes() {
        let t = resolve(tracker, args.target())?;
        let question = format!(
            "Delete {} {} '{}' of {} from {}? [y/N] ",
            t.r#type(),
            t.category(),
            t.description(),
            t.amount(),
            t.format_timestamp(&Local)
        );
        write(output, &question).await?;
        let answer = next_line(lines).await?.unwrap_or_default();
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            return Ok("Nothing was deleted".into());
        }
    }
    delete(tracker, args.target()).await
}

/// Splits a line into words on whitespace. Double quotes group words, and inside quotes a
/// backslash escapes the next character.
///
/// # Errors
/// - `Usage` if a quote is not closed.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            '\\' if quoted => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err(Error::msg(
            ErrorType::Usage,
            "The closing quote is missing",
        ));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

async fn next_line<R>(lines: &mut Lines<R>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    lines
        .next_line()
        .await
        .context("Unable to read input")
        .pub_result(ErrorType::Io)
}

/// Writes `text` followed by a newline.
async fn emit<W>(output: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    write(output, &format!("{text}\n")).await
}

async fn write<W>(output: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output
        .write_all(text.as_bytes())
        .await
        .context("Unable to write output")
        .pub_result(ErrorType::Io)?;
    output
        .flush()
        .await
        .context("Unable to flush output")
        .pub_result(ErrorType::Io)
}
