//! Console assembly and request dispatch.
//!
//! A [`WebConsole`] owns the write-once page registry and the external
//! collaborators (config store, command shell, vehicle factory). Each inbound
//! connection is served by its own thread: one request is parsed, dispatched
//! against the registry, answered, and the connection closed. A hung or slow
//! client blocks only its own thread; handlers have no timeout or
//! cancellation of their own.

use std::io::BufReader;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};

use crate::assets;
use crate::config::ConfigStore;
use crate::context::PageContext;
use crate::pages::{cfg, home, status};
use crate::registry::{PageEntry, PageMenu, PageRegistry};
use crate::shell::ShellExecutor;
use crate::transport::{self, Connection, Request};
use crate::vehicle::VehicleFactory;

/// Cookie carrying the authenticated-session flag.
pub const SESSION_COOKIE: &str = "vtu_session";
/// Cookie value of an authenticated session.
pub const SESSION_AUTHENTICATED: &str = "authenticated";

/// Fallback entry for `/assets/` paths with no exact match; the asset handler
/// answers those with 404.
const ASSET_FALLBACK: PageEntry = PageEntry {
    uri: "/assets/",
    label: "Asset",
    handler: assets::handle_asset,
    menu: PageMenu::None,
};

/// The web console: page registry plus collaborator handles.
pub struct WebConsole {
    pages: PageRegistry,
    pub config: Arc<dyn ConfigStore>,
    pub shell: Arc<dyn ShellExecutor>,
    pub vehicles: Arc<dyn VehicleFactory>,
}

impl WebConsole {
    /// Build a console with the builtin page table.
    pub fn new(
        config: Arc<dyn ConfigStore>,
        shell: Arc<dyn ShellExecutor>,
        vehicles: Arc<dyn VehicleFactory>,
    ) -> Self {
        let pages = PageRegistry::new(vec![
            PageEntry { uri: "/", label: "Console", handler: home::handle_root, menu: PageMenu::None },
            PageEntry { uri: "/home", label: "Home", handler: home::handle_home, menu: PageMenu::Main },
            PageEntry { uri: "/status", label: "Status", handler: status::handle_status, menu: PageMenu::Main },
            PageEntry { uri: "/shell", label: "Shell", handler: status::handle_shell, menu: PageMenu::Main },
            PageEntry { uri: "/cfg/password", label: "Password", handler: cfg::handle_cfg_password, menu: PageMenu::Config },
            PageEntry { uri: "/cfg/vehicle", label: "Vehicle", handler: cfg::handle_cfg_vehicle, menu: PageMenu::Config },
            PageEntry { uri: "/cfg/wifi", label: "Wifi", handler: cfg::handle_cfg_wifi, menu: PageMenu::Config },
            PageEntry { uri: "/cfg/modem", label: "Modem", handler: cfg::handle_cfg_modem, menu: PageMenu::Config },
            PageEntry { uri: "/cfg/server/v2", label: "Server V2 (MP)", handler: cfg::handle_cfg_server_v2, menu: PageMenu::Config },
            PageEntry { uri: "/cfg/server/v3", label: "Server V3 (MQTT)", handler: cfg::handle_cfg_server_v3, menu: PageMenu::Config },
            PageEntry { uri: "/cfg/webserver", label: "Webserver", handler: cfg::handle_cfg_webserver, menu: PageMenu::Config },
            PageEntry { uri: "/menu", label: "Menu", handler: home::handle_menu, menu: PageMenu::None },
            PageEntry { uri: "/login", label: "Login", handler: home::handle_login, menu: PageMenu::None },
            PageEntry { uri: "/logout", label: "Logout", handler: home::handle_logout, menu: PageMenu::None },
            PageEntry { uri: "/api/execute", label: "Execute", handler: status::handle_command, menu: PageMenu::None },
            PageEntry { uri: "/assets/style.css", label: "Stylesheet", handler: assets::handle_asset, menu: PageMenu::None },
            PageEntry { uri: "/assets/script.js", label: "Script", handler: assets::handle_asset, menu: PageMenu::None },
        ]);
        WebConsole {
            pages,
            config,
            shell,
            vehicles,
        }
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    /// Register an additional page during startup, before the console starts
    /// serving. Vehicle plugins contribute their pages here.
    pub fn register_page(&mut self, entry: PageEntry) {
        self.pages.register(entry);
    }

    /// Dispatch one parsed request to its handler and stream the response.
    pub fn handle(&self, req: &Request, conn: &mut dyn Connection) {
        let session = req.cookie(SESSION_COOKIE) == Some(SESSION_AUTHENTICATED);
        debug!(
            "{} {} (session={})",
            if req.method == crate::Method::Get { "GET" } else { "POST" },
            req.uri,
            session
        );

        let mut ctx = PageContext::new(req, session, conn);
        if let Some(entry) = self.pages.find(&req.uri) {
            (entry.handler)(self, entry, &mut ctx);
        } else if req.uri.starts_with("/assets/") {
            (ASSET_FALLBACK.handler)(self, &ASSET_FALLBACK, &mut ctx);
        } else {
            ctx.error(404, "Not found");
        }
    }

    /// Accept loop: one thread per connection, one request per connection.
    pub fn serve(self: &Arc<Self>, listener: TcpListener) {
        info!(
            "web console listening on {}",
            listener
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "?".to_string())
        );
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    continue;
                }
            };
            let console = Arc::clone(self);
            thread::spawn(move || {
                let reader = match stream.try_clone() {
                    Ok(s) => s,
                    Err(e) => {
                        warn!("connection clone failed: {}", e);
                        return;
                    }
                };
                match Request::parse(&mut BufReader::new(reader)) {
                    Ok(req) => console.handle(&req, &mut stream),
                    Err(e) => {
                        debug!("unreadable request: {}", e);
                        transport::send_error(&mut stream, 400, "Bad request");
                    }
                }
                let _ = stream.shutdown(std::net::Shutdown::Both);
            });
        }
    }
}
