//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — identity, session/restriction snapshots, REST payloads.
//! - `constants.rs` — storage keys, restriction keywords, defaults.
//!
//! ## Rule of thumb
//! Domain types are data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! These structs mirror the backend's JSON and the `--json` output schema.
//! Keep schema-impacting changes synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;
