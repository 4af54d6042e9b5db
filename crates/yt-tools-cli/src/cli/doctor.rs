//! Environment readiness check.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::Result;

use crate::cli::output;
use crate::config;
use crate::renderer::chromium::find_chromium;

/// Check Chromium availability, clipboard access and the settings path.
pub async fn run(settings_path: &Path) -> Result<()> {
    let chromium = find_chromium();
    let display_available = std::env::var_os("DISPLAY").is_some()
        || std::env::var_os("WAYLAND_DISPLAY").is_some()
        || cfg!(any(target_os = "macos", target_os = "windows"));
    let terminal = std::io::stderr().is_terminal();
    let settings_dir = settings_path.parent().unwrap_or(settings_path);
    let settings_ok = settings_dir.exists() || std::fs::create_dir_all(settings_dir).is_ok();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "chromium": chromium.as_ref().map(|p| p.display().to_string()),
            "system_clipboard": display_available,
            "osc52_terminal": terminal,
            "settings_path": settings_path.display().to_string(),
            "settings_writable": settings_ok,
            "cobalt_api": config::resolve_cobalt_endpoint(None),
            "ready": settings_ok,
        }));
        return Ok(());
    }

    println!("YouTube Tools Doctor");
    println!("====================");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Transcripts will be read from static pages only.\n     Set {} to use a live browser.",
            config::CHROMIUM_ENV
        ),
    }

    if display_available {
        println!("[OK] Desktop clipboard reachable");
    } else {
        println!("[!!] No display; clipboard copies will use OSC 52");
    }
    if terminal {
        println!("[OK] stderr is a terminal (OSC 52 fallback available)");
    } else {
        println!("[??] stderr is not a terminal; OSC 52 fallback disabled");
    }

    if settings_ok {
        println!("[OK] Settings: {}", settings_path.display());
    } else {
        println!("[!!] Settings directory not writable: {}", settings_dir.display());
    }

    println!("     Cobalt API: {}", config::resolve_cobalt_endpoint(None));
    println!();
    if settings_ok {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
