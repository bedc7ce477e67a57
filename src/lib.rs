//! Embedded web administration console for vehicle telemetry/control units.
//!
//! This crate implements the page-rendering and form-processing framework of a
//! small device-hosted HTTP console: status pages, a command shell, and
//! configuration forms for vehicle identity, modem/APN, server connections,
//! wifi networks and the web server itself.
//!
//! # Overview
//!
//! An inbound HTTP request is matched against a write-once [`PageRegistry`];
//! the matched handler receives a [`PageContext`] wrapping the exchange. The
//! handler reads submitted form variables, optionally updates the external
//! configuration store, and streams an HTML (or plain text) response in
//! chunked transfer encoding, finished by a terminating empty chunk.
//!
//! Configuration pages share one algorithm: on GET the form is rendered
//! pre-filled from the [`ConfigStore`]; on POST the submitted values are
//! validated field by field into an ordered error list, and either persisted
//! (status 200, success summary) or re-rendered with the submitted values and
//! field-tagged errors (status 400). Validation never mutates external state,
//! and persistence of map-valued parameters is a full build-then-swap
//! replacement, never an incremental update.
//!
//! External collaborators (configuration store, command shell, vehicle
//! factory, raw connection) are consumed through traits; reference
//! implementations suitable for tests and bench setups are included.
//!
//! # Examples
//!
//! ```no_run
//! use std::net::TcpListener;
//! use std::sync::Arc;
//! use vtu_console::{MemoryConfigStore, ScriptedShell, StaticVehicleFactory, WebConsole};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let console = Arc::new(WebConsole::new(
//!     Arc::new(MemoryConfigStore::new()),
//!     Arc::new(ScriptedShell::new()),
//!     Arc::new(StaticVehicleFactory::new(vec![])),
//! ));
//! let listener = TcpListener::bind("0.0.0.0:8080")?;
//! console.serve(listener);
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod config;
pub mod context;
pub mod escape;
pub mod forms;
pub mod pages;
pub mod registry;
pub mod server;
pub mod shell;
pub mod transport;
pub mod vehicle;

pub use config::{ConfigError, ConfigStore, MemoryConfigStore};
pub use context::PageContext;
pub use escape::escape_html;
pub use forms::FormValidation;
pub use registry::{PageEntry, PageMenu, PageRegistry};
pub use server::WebConsole;
pub use shell::{ScriptedShell, ShellExecutor};
pub use transport::{Connection, Method, Request, TransportError};
pub use vehicle::{StaticVehicleFactory, VehicleFactory};
