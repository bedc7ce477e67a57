//! Page handlers.
//!
//! Every handler has the same shape: it receives the console, its own
//! registry entry, and the per-request [`PageContext`](crate::PageContext);
//! it emits exactly one header block and finishes with the terminating chunk
//! on every code path. Configuration pages are applications of the shared
//! form-handling pattern in [`crate::forms`].

pub mod cfg;
pub mod home;
pub mod status;
