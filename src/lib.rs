//! Scripted login to Vanguard Personal Investor.
//!
//! A linear workflow over a CDP browser session: load the login page, fill
//! the interactively-collected credentials, submit, answer the security
//! question, decline device memory, continue. Accounts with two-factor
//! authentication enabled are not supported.

pub mod cli;
pub mod driver;
pub mod error;
pub mod logging;
pub mod login;
pub mod prompt;
pub mod session;
pub mod testing;
