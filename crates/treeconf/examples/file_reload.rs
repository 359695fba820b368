//! Hot reload example demonstrating file watching.
//!
//! This example shows how to keep a [`Configuration`] in sync with a TOML
//! file and react to the keys that change.
//!
//! # Running
//!
//! ```bash
//! cargo run --example file_reload --features watch,toml
//!
//! # In another terminal, modify the config
//! echo 'port = 9090' >> /tmp/treeconf_example.toml
//! ```

use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use miette::IntoDiagnostic;
use serde::Deserialize;
use treeconf::{Configuration, DecodeOptions, FileProvider, Format};

#[derive(Debug, Deserialize)]
struct Server {
    port: u16,
    host: String,
    #[serde(default)]
    timeout: Duration,
}

fn main() -> miette::Result<()> {
    let config_path = std::env::temp_dir().join("treeconf_example.toml");

    {
        let mut file = fs::File::create(&config_path).into_diagnostic()?;
        writeln!(file, "[server]").into_diagnostic()?;
        writeln!(file, "port = 8080").into_diagnostic()?;
        writeln!(file, "host = \"localhost\"").into_diagnostic()?;
        writeln!(file, "timeout = \"30s\"").into_diagnostic()?;
    }

    println!("Config file: {}", config_path.display());
    println!("Modify this file to see hot reload in action!\n");

    let config = Configuration::new();

    config.on_change(|change| {
        if change.is_initial() {
            println!("[INIT] {} keys loaded", change.config.all_keys().len());
            return;
        }

        println!("\n[RELOAD] Configuration changed!");
        println!("  Trigger: {}", change.trigger);
        println!("  Changed keys: {:?}", change.changed.iter().collect::<Vec<_>>());
    });

    config.watch("server.", |change| {
        match change.config.unmarshal_key::<Server>("server") {
            Ok(server) => println!("  New server settings: {server:?}"),
            Err(e) => eprintln!("{:?}", miette::Report::from(e)),
        }
    });

    let provider = Arc::new(FileProvider::new(&config_path)?);
    let handle = config.load_from_data_source(provider.clone(), Format::Toml, DecodeOptions::default())?;

    let server: Server = config.unmarshal_key("server")?;
    println!("Initial configuration:");
    println!("  {server:?}");
    println!("\nWatching for changes for 60 seconds...");

    for _ in 0..30 {
        thread::sleep(Duration::from_secs(2));

        if !handle.is_running() {
            println!("Watcher stopped");
            break;
        }
    }

    provider.stop();
    handle.join();

    let _ = fs::remove_file(&config_path);

    Ok(())
}
