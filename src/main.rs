use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod domain;
mod services;

pub use app::App;
pub use cli::*;
pub use commands::*;
pub use domain::models::*;
pub use services::account::{self, InputError, ProfileChanges};
pub use services::admin::{self, UserFilter};
pub use services::config::{load_config, Config};
pub use services::http::ApiError;
pub use services::navigation::{nav_links, NavigationError, Route};
pub use services::output::{money, opt, print_err, print_one, print_out, write_err};
pub use services::session::SessionError;
pub use services::storage::StorageError;
pub use services::{catalog, orders};

const LOG_ENV: &str = "SHOPFRONT_LOG";

fn main() {
    let cli = Cli::parse();
    let ok = match run(&cli) {
        Ok(ok) => ok,
        Err(e) => {
            report_error(cli.json, &e);
            false
        }
    };
    if !ok {
        std::process::exit(1);
    }
}

/// Runs one command (or the shell). Command failures are reported here so
/// that the restriction overlay, if raised, comes after the error.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.api.as_deref())?;
    init_tracing(cli.verbose, &config);

    let mut app = App::start(&config)?;
    if let Commands::Shell = cli.command {
        let result = run_shell(cli, &app);
        app.stop();
        return result.map(|()| true);
    }

    let ok = match dispatch(cli, &app) {
        Ok(()) => true,
        Err(e) => {
            report_error(cli.json, &e);
            false
        }
    };
    // stderr keeps `--json` stdout parseable
    app.resolve_restriction(&mut std::io::stdin().lock(), &mut std::io::stderr())?;
    app.stop();
    Ok(ok)
}

fn init_tracing(verbose: bool, config: &Config) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn dispatch(cli: &Cli, app: &App) -> anyhow::Result<()> {
    if handle_admin_commands(cli, app)? {
        return Ok(());
    }
    if handle_shop_commands(cli, app)? {
        return Ok(());
    }
    anyhow::bail!(InputError(format!(
        "command not available here: {:?}",
        cli.command
    )))
}

pub fn report_error(json: bool, err: &anyhow::Error) {
    tracing::debug!(error = ?err, "command failed");
    print_err(json, error_code(err), &format!("{:#}", err));
}

/// Stable machine-readable code for the first typed error in the chain.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ApiError>() {
            return match e {
                ApiError::Status {
                    restricted: true, ..
                } => "RESTRICTED",
                ApiError::Status { .. } => "HTTP_STATUS",
                ApiError::Transport { .. } => "HTTP_TRANSPORT",
                ApiError::InvalidUrl(_) => "INVALID_INPUT",
                ApiError::Decode { .. } | ApiError::InterceptorAlreadyRegistered(_) => "INTERNAL",
            };
        }
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            return match e {
                SessionError::NotAuthenticated => "SIGN_IN_REQUIRED",
                SessionError::Persistence(_) => "PERSISTENCE",
                SessionError::Parse(_) | SessionError::InvalidIdentity(_) => "INTERNAL",
            };
        }
        if let Some(e) = cause.downcast_ref::<NavigationError>() {
            return match e {
                NavigationError::SignInRequired(_) => "SIGN_IN_REQUIRED",
                NavigationError::AdminOnly(_) => "ADMIN_ONLY",
            };
        }
        if cause.is::<StorageError>() {
            return "PERSISTENCE";
        }
        if cause.is::<InputError>() {
            return "INVALID_INPUT";
        }
    }
    "INTERNAL"
}

#[cfg(test)]
mod tests {
    use super::error_code;
    use crate::{ApiError, InputError, NavigationError, SessionError, StorageError};
    use serde_json::Value;

    #[test]
    fn restriction_has_its_own_code() {
        let e = anyhow::Error::new(ApiError::Status {
            status: 403,
            detail: Some("Your account has been locked.".into()),
            body: Value::Null,
            restricted: true,
        });
        assert_eq!(error_code(&e), "RESTRICTED");

        let e = anyhow::Error::new(ApiError::Status {
            status: 403,
            detail: Some("Insufficient permissions".into()),
            body: Value::Null,
            restricted: false,
        });
        assert_eq!(error_code(&e), "HTTP_STATUS");
    }

    #[test]
    fn typed_errors_map_through_context() {
        let e = anyhow::Error::new(NavigationError::AdminOnly("User management"))
            .context("admin users");
        assert_eq!(error_code(&e), "ADMIN_ONLY");

        let e = anyhow::Error::new(SessionError::Persistence(StorageError::Unavailable(
            "disk full".into(),
        )));
        assert_eq!(error_code(&e), "PERSISTENCE");
        assert_eq!(error_code(&anyhow::Error::new(InputError("x".into()))), "INVALID_INPUT");
        assert_eq!(error_code(&anyhow::anyhow!("boom")), "INTERNAL");
    }
}
