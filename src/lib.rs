//! # autotheme
//!
//! Switches the desktop between a day and a night theme at local sunrise and
//! sunset.
//!
//! This library exists to enable testing of the scheduler and the command
//! surface; `main.rs` only parses arguments and dispatches.
//!
//! ## Architecture
//!
//! - **Entry point**: [`app::Autotheme`] runs the daemon and owns its resources
//! - **Core logic**: [`core`] holds the classifier, the scheduler state machine
//!   and the polling loop
//! - **Providers**: [`provider`] fetches day windows (sunrise-sunset.org)
//! - **Themes**: [`theme`] applies a classification (Windows registry, GNOME, dry run)
//! - **Configuration**: [`config`] for TOML settings with hot reload
//! - **Commands**: [`commands`] for the CLI subcommands
//! - **Infrastructure**: [`io`] (signals, lock file, autostart, notifications),
//!   [`ipc`] (daemon socket) and [`time`] (injectable clock)

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod app;
pub mod args;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod ipc;
pub mod provider;
pub mod theme;
pub mod time;

pub use app::Autotheme;
