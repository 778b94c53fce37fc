//! # FinConsole Core Library
//!
//! Headless services behind the financial-process debug console: page
//! catalog, execution ports (mock and HTTP), AI auto-fill, execution history
//! and the per-page session that ties them together.
//!

pub mod autofill;
pub mod config;
pub mod environment;
pub mod error;
pub mod execution;
pub mod history;
pub mod pages;
pub mod secrets;
pub mod session;
pub mod view;

pub use environment::Environment;
pub use error::ConsoleError;
pub use finconsole_form as form;
