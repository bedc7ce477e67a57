//! Standalone console server with scripted command output, for development
//! and demonstration against a plain browser.

use std::env;
use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;
use log::info;

use vtu_console::{MemoryConfigStore, ScriptedShell, StaticVehicleFactory, WebConsole};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let shell = ScriptedShell::new()
        .with_output("stat", "Not charging\nSOC: 73.1%\nIdeal range: 201km\nEst. range: 159km\n")
        .with_output("location status", "Active location: Home\n")
        .with_output(
            "server v2 status",
            "Server v2 connected (last update 12 sec ago)\n",
        )
        .with_output(
            "wifi status",
            "Mode: client\nSSID: Home\nChannel: 6\nRSSI: -58 dBm\n",
        )
        .with_output("modem status", "Network registered\nSignal: -71 dBm\nGPS: fix (9 sats)\n")
        .with_output("ota status", "Running partition: factory\nVersion: 0.2.0\n");

    let vehicles = StaticVehicleFactory::new(vec![
        ("DEMO".to_string(), "Demo Vehicle".to_string()),
        ("RT".to_string(), "Roadster".to_string()),
    ]);

    let console = Arc::new(WebConsole::new(
        Arc::new(MemoryConfigStore::new()),
        Arc::new(shell),
        Arc::new(vehicles),
    ));

    let listener = TcpListener::bind(&addr).with_context(|| format!("cannot bind {}", addr))?;
    info!("serving on http://{}/", addr);
    console.serve(listener);
    Ok(())
}
