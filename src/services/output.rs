use crate::domain::models::{ErrorBody, JsonErr, JsonOut};
use serde::Serialize;
use std::io::Write;

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else if data.is_empty() {
        println!("(none)");
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

/// Failure envelope. JSON goes to stdout like any other result; text mode
/// writes to stderr.
pub fn print_err(json: bool, code: &'static str, message: &str) {
    if json {
        let body = JsonErr {
            ok: false,
            error: ErrorBody {
                code,
                message: message.to_string(),
            },
        };
        match serde_json::to_string_pretty(&body) {
            Ok(s) => println!("{}", s),
            Err(_) => println!("{{\"ok\":false}}"),
        }
    } else {
        eprintln!("error[{}]: {}", code, message);
    }
}

/// Same envelope as [`print_err`], written to `out` in both modes.
pub fn write_err(
    out: &mut impl Write,
    json: bool,
    code: &'static str,
    message: &str,
) -> std::io::Result<()> {
    if json {
        let body = JsonErr {
            ok: false,
            error: ErrorBody {
                code,
                message: message.to_string(),
            },
        };
        let text = serde_json::to_string_pretty(&body)
            .unwrap_or_else(|_| "{\"ok\":false}".to_string());
        writeln!(out, "{}", text)
    } else {
        writeln!(out, "error[{}]: {}", code, message)
    }
}

pub fn money(v: Option<f64>) -> String {
    v.map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn opt(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("-")
}
