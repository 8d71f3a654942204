//! Blocking "Account Restricted" overlay.
//!
//! The overlay has one action. Acknowledging it always ends the session,
//! there is no way to dismiss it and stay signed in.

use crate::domain::constants::RESTRICTION_SUPPORT_HINT;
use crate::domain::models::RestrictionState;
use crate::services::navigation::{Navigator, Route};
use crate::services::restriction::RestrictionGate;
use crate::services::session::{SessionError, SessionStore};
use std::io::{BufRead, Write};

pub const TITLE: &str = "Account Restricted";
pub const ACTION: &str = "[Log Out]";

/// Renders the overlay for `state`. Nothing is written while the gate is
/// clear.
pub fn render(state: &RestrictionState, out: &mut impl Write) -> std::io::Result<()> {
    if !state.is_restricted {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "  {TITLE}")?;
    writeln!(out, "  {}", state.message)?;
    writeln!(out, "  {RESTRICTION_SUPPORT_HINT}")?;
    writeln!(out)?;
    write!(out, "  {ACTION} press Enter to continue ")?;
    out.flush()
}

/// Shows the overlay and blocks until the user acknowledges it. Any line,
/// or end of input, counts as pressing the single action.
pub fn present(
    state: &RestrictionState,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> std::io::Result<()> {
    render(state, out)?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    writeln!(out)?;
    Ok(())
}

/// Runs the acknowledgement sequence: clear the gate, end the session,
/// then land on sign-in. Navigation happens even if the purge failed,
/// since the in-memory session is already gone by then.
pub fn acknowledge(
    gate: &RestrictionGate,
    session: &SessionStore,
    navigator: &Navigator,
) -> Result<(), SessionError> {
    gate.hide_restriction_modal();
    let logout = session.logout();
    if let Err(e) = navigator.navigate(Route::SignIn, &session.snapshot()) {
        tracing::error!(error = %e, "sign-in route unreachable after restriction");
    }
    logout
}
