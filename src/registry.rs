//! Page entry and menu registry.
//!
//! The routing table is a plain write-once list built at startup. After
//! construction it is never mutated, so concurrent readers need no
//! synchronization; navigation menus are reconstructed from it on every
//! request.

use crate::context::PageContext;
use crate::server::WebConsole;

/// Menu placement of a registered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMenu {
    /// Not shown in any menu (assets, API endpoints, login).
    None,
    /// Top-level main menu.
    Main,
    /// "Config" dropdown.
    Config,
    /// Vehicle-specific dropdown, labeled with the active vehicle name.
    Vehicle,
}

/// Handler invoked for a matched page.
pub type PageHandler = fn(&WebConsole, &PageEntry, &mut PageContext<'_>);

/// One registered (URI, label, handler, menu) tuple. Immutable after
/// registration, lives for the process lifetime.
pub struct PageEntry {
    pub uri: &'static str,
    pub label: &'static str,
    pub handler: PageHandler,
    pub menu: PageMenu,
}

/// The static page table.
pub struct PageRegistry {
    entries: Vec<PageEntry>,
}

impl PageRegistry {
    pub fn new(entries: Vec<PageEntry>) -> Self {
        PageRegistry { entries }
    }

    /// Exact-URI lookup; the routing key is unique per entry.
    pub fn find(&self, uri: &str) -> Option<&PageEntry> {
        self.entries.iter().find(|e| e.uri == uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageEntry> {
        self.entries.iter()
    }

    /// Append an entry during startup, before the table goes live. Vehicle
    /// plugins use this to contribute their pages.
    pub fn register(&mut self, entry: PageEntry) {
        self.entries.push(entry);
    }
}
