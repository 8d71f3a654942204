//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `shop.rs` — account/catalog/cart/checkout/order commands.
//! - `admin.rs` — back-office command tree.
//! - `shell.rs` — interactive loop.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Check route access through `App::open` before calling a page service.
//! - Keep behavior and output schema stable.

pub mod admin;
pub mod shell;
pub mod shop;

pub use admin::handle_admin_commands;
pub use shell::run_shell;
pub use shop::handle_shop_commands;
