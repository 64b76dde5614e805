// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use ini::Ini;
use log::{debug, info, warn};
use ruzu_common::settings::{parse_bool, Settings};
use ruzu_common::OpcodeWidth;
use std::path::PathBuf;

const CONFIG_FILE: &str = "ruzu-decode.ini";

/// Locate the decoder config file.
pub fn find_config_path() -> Option<PathBuf> {
    // Working directory
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    // XDG_CONFIG_HOME
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(&xdg).join("ruzu").join(CONFIG_FILE);
        if path.exists() {
            return Some(path);
        }
    }

    // Linux: ~/.config/ruzu/ruzu-decode.ini
    if let Ok(home) = std::env::var("HOME") {
        let path = PathBuf::from(&home)
            .join(".config")
            .join("ruzu")
            .join(CONFIG_FILE);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Load settings from the config file, falling back to defaults.
pub fn load_config(path: Option<&PathBuf>) -> Settings {
    let mut settings = Settings::default();

    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                warn!("Config file not found: {}", p.display());
                return settings;
            }
            p.clone()
        }
        None => match find_config_path() {
            Some(p) => p,
            None => {
                info!("No decoder config found, using defaults");
                return settings;
            }
        },
    };

    info!("Loading config from: {}", config_path.display());

    let conf = match Ini::load_from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config: {}", e);
            return settings;
        }
    };

    apply_config(&mut settings, &conf);
    settings
}

/// Copy recognised sections of `conf` into `settings`.
///
/// `;` and `#` start INI comments, so they cannot be used as field symbols
/// in the `[Patterns]` section.
pub fn apply_config(settings: &mut Settings, conf: &Ini) {
    // [Decoder]
    if let Some(section) = conf.section(Some("Decoder")) {
        if let Some(width) = section.get("width") {
            match width.trim().parse().ok().and_then(OpcodeWidth::from_bits) {
                Some(w) => settings.opcode_width = w,
                None => warn!("Unsupported opcode width: {}", width),
            }
            debug!("Opcode width: {:?}", settings.opcode_width);
        }
        if let Some(sort) = section.get("sort_by_specificity") {
            settings.sort_by_specificity = parse_bool(sort).unwrap_or(false);
        }
    }

    // [Patterns]
    if let Some(section) = conf.section(Some("Patterns")) {
        for (name, pattern) in section.iter() {
            settings.set_pattern(name.trim(), pattern.trim());
        }
        debug!("Loaded {} patterns", settings.patterns.len());
    }
}
