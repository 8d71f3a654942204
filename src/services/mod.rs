//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `storage.rs` — origin-scoped durable key/value storage.
//! - `session.rs` — session store (identity, rehydration, logout).
//! - `restriction.rs` — account restriction gate.
//! - `http.rs` — REST client + response interceptor chain.
//! - `watcher.rs` — interceptor that raises the restriction gate.
//! - `overlay.rs` — restriction overlay + acknowledgement flow.
//! - `navigation.rs` — routes, access guards, nav links.
//! - `account.rs` / `catalog.rs` / `cart.rs` / `orders.rs` / `admin.rs` — page services.
//! - `config.rs` — `config.toml` loading.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod http;
pub mod navigation;
pub mod orders;
pub mod output;
pub mod overlay;
pub mod restriction;
pub mod session;
pub mod storage;
pub mod watcher;
