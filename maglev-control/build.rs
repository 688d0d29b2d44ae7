//! Build script for maglev-control
//!
//! Validates maglev.toml at compile time so a broken embedded default is
//! caught before the binary runs.

use std::fs;
use std::path::Path;

/// Sections the embedded configuration must carry
const REQUIRED_SECTIONS: [&str; 4] = ["bring_up", "dispatch", "choreography", "simulator"];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    validate_config();
}

/// Validate maglev.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=maglev.toml");

    let config_path = Path::new("maglev.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("\n  ERROR: failed to read maglev.toml: {e}\n"),
    };

    let config: toml::Table = match toml::from_str(&content) {
        Ok(table) => table,
        Err(e) => panic!("\n  ERROR: invalid TOML syntax in maglev.toml\n\n{e}\n"),
    };

    for section in REQUIRED_SECTIONS {
        if !config.contains_key(section) {
            panic!("\n  ERROR: maglev.toml is missing the [{section}] section\n");
        }
    }

    let routes = config
        .get("choreography")
        .and_then(|c| c.get("routes"))
        .and_then(|r| r.as_array())
        .map(|r| r.len())
        .unwrap_or(0);
    if routes == 0 {
        println!("cargo:warning=maglev.toml defines no choreography routes");
    }
}
