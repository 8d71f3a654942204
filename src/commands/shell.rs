use crate::*;
use clap::Parser;
use std::io::{BufRead, Write};

const PROMPT: &str = "shopfront> ";

/// Reads commands line by line until `exit` or end of input. A pending
/// restriction is resolved before every prompt, so nothing else runs while
/// the account is flagged. Prompts, the overlay and errors go to `out`;
/// command results are printed to stdout.
pub fn run_shell(cli: &Cli, app: &App) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    run_shell_with(cli.json, app, &mut input, &mut out)
}

pub fn run_shell_with(
    json: bool,
    app: &App,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    loop {
        app.resolve_restriction(input, out)?;
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let words = match split_words(&line) {
            Ok(w) => w,
            Err(e) => {
                report_to(out, json, &anyhow::Error::new(e))?;
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit") | Some("quit") => break,
            Some("shell") => {
                writeln!(out, "already in a shell")?;
                continue;
            }
            _ => {}
        }

        let mut argv = vec!["shopfront".to_string()];
        if json {
            argv.push("--json".to_string());
        }
        argv.extend(words);
        let sub = match Cli::try_parse_from(argv) {
            Ok(c) => c,
            Err(e) => {
                writeln!(out, "{}", e.render())?;
                continue;
            }
        };
        if let Err(e) = dispatch(&sub, app) {
            report_to(out, sub.json, &e)?;
        }
    }
    Ok(())
}

fn report_to(out: &mut impl Write, json: bool, err: &anyhow::Error) -> std::io::Result<()> {
    tracing::debug!(error = ?err, "shell command failed");
    write_err(out, json, error_code(err), &format!("{:#}", err))
}

/// Splits a command line on whitespace, honoring single and double quotes.
pub fn split_words(line: &str) -> Result<Vec<String>, InputError> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => cur.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            None => {
                cur.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err(InputError("unterminated quote".into()));
    }
    if in_word {
        words.push(cur);
    }
    Ok(words)
}
