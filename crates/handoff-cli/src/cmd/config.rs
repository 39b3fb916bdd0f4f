use crate::menu::Menu;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use handoff_core::config::{Loaded, PreferenceStore, KEY_METHOD, KEY_MODE};
use handoff_core::types::{ConfigScope, ContinuationMethod, HandoffMode};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show both config files and the effective preferences
    Show,

    /// Change preferences without the wizard
    Set {
        /// Continuation method: ask, compact, or handoff
        #[arg(long)]
        method: Option<ContinuationMethod>,

        /// Resume prompt delivery: clipboard or auto-paste
        #[arg(long)]
        mode: Option<HandoffMode>,

        /// Config file to write: project or global (default: existing
        /// project file, else global)
        #[arg(long)]
        scope: Option<ConfigScope>,
    },

    /// Choose preferences from numbered menus
    Wizard,

    /// Delete a config file
    Reset {
        #[arg(long, default_value = "project")]
        scope: ConfigScope,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let store = PreferenceStore::new(root);
    match subcmd {
        ConfigSubcommand::Show => show(&store, json),
        ConfigSubcommand::Set {
            method,
            mode,
            scope,
        } => set(&store, method, mode, scope, json),
        ConfigSubcommand::Wizard => {
            let stdin = std::io::stdin();
            let mut menu = Menu::new(stdin.lock(), std::io::stdout());
            wizard(&store, &mut menu).map(|_| ())
        }
        ConfigSubcommand::Reset { scope } => reset(&store, scope, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn scope_json(store: &PreferenceStore, scope: ConfigScope) -> Value {
    let path = store.path(scope);
    let exists = path.is_some_and(Path::exists);
    let mut value = json!({
        "path": path,
        "exists": exists,
    });
    match store.read_scope(scope) {
        Ok(Some(Loaded {
            preferences,
            warnings,
        })) => {
            value["preferences"] = json!(preferences);
            value["warnings"] = json!(warnings);
        }
        Ok(None) => {}
        Err(e) => value["error"] = json!(e.to_string()),
    }
    value
}

fn show(store: &PreferenceStore, json: bool) -> anyhow::Result<()> {
    let effective = store.load();

    if json {
        let effective = match &effective {
            Ok(loaded) => json!({
                KEY_METHOD: loaded.preferences.method(),
                KEY_MODE: loaded.preferences.mode(),
            }),
            Err(e) => json!({ "error": e.to_string() }),
        };
        return print_json(&json!({
            "project": scope_json(store, ConfigScope::Project),
            "global": scope_json(store, ConfigScope::Global),
            "effective": effective,
        }));
    }

    for scope in [ConfigScope::Project, ConfigScope::Global] {
        let Some(path) = store.path(scope) else {
            println!("✗ {scope}: home directory not found");
            continue;
        };
        match store.read_scope(scope) {
            Ok(Some(loaded)) => {
                println!("✓ {scope}: {}", path.display());
                let p = &loaded.preferences;
                println!(
                    "  {KEY_METHOD}: {}",
                    p.continuation_method
                        .map_or("not set".to_string(), |m| m.to_string())
                );
                println!(
                    "  {KEY_MODE}: {}",
                    p.handoff_mode.map_or("not set".to_string(), |m| m.to_string())
                );
                for w in &loaded.warnings {
                    println!("  warning: {}", w.message);
                }
            }
            Ok(None) => println!("✗ {scope}: {} (not found)", path.display()),
            Err(e) => println!("✗ {scope}: {} ({e})", path.display()),
        }
    }

    println!();
    match effective {
        Ok(loaded) => {
            println!("Effective:");
            println!("  {KEY_METHOD}: {}", loaded.preferences.method());
            println!("  {KEY_MODE}: {}", loaded.preferences.mode());
        }
        Err(e) => println!("Effective: defaults (config unreadable: {e})"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

fn set(
    store: &PreferenceStore,
    method: Option<ContinuationMethod>,
    mode: Option<HandoffMode>,
    scope: Option<ConfigScope>,
    json: bool,
) -> anyhow::Result<()> {
    if method.is_none() && mode.is_none() {
        anyhow::bail!("nothing to set: pass --method and/or --mode");
    }
    let scope = scope.unwrap_or_else(|| store.default_write_scope());

    let mut path = None;
    if let Some(m) = method {
        path = Some(
            store
                .set_method(scope, m)
                .with_context(|| format!("failed to write {scope} config"))?,
        );
    }
    if let Some(m) = mode {
        path = Some(
            store
                .set_mode(scope, m)
                .with_context(|| format!("failed to write {scope} config"))?,
        );
    }

    if json {
        print_json(&json!({
            "scope": scope,
            "path": path,
            KEY_METHOD: method,
            KEY_MODE: mode,
        }))?;
    } else if let Some(path) = path {
        println!("Updated {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// wizard
// ---------------------------------------------------------------------------

const MODE_OPTIONS: &[&str] = &[
    "Clipboard   - copy the resume prompt; you paste it after /clear",
    "Auto-paste  - clear and submit the resume prompt automatically",
];

/// Walk through method, delivery and scope. Returns the written file, or
/// `None` when the user cancelled at any step (nothing is written then).
pub fn wizard<R: BufRead, W: Write>(
    store: &PreferenceStore,
    menu: &mut Menu<R, W>,
) -> anyhow::Result<Option<PathBuf>> {
    menu.say("handoff configuration")?;
    menu.say("=====================")?;

    let existing: Vec<String> = [ConfigScope::Project, ConfigScope::Global]
        .into_iter()
        .filter_map(|s| store.path(s).filter(|p| p.exists()).map(|p| format!("  - {s}: {}", p.display())))
        .collect();
    if !existing.is_empty() {
        menu.say("Existing configuration:")?;
        for line in &existing {
            menu.say(line)?;
        }
        let choice = menu.choose(
            "What would you like to do?",
            &["Update configuration", "Exit without changes"],
        )?;
        if choice != Some(0) {
            menu.say("Exiting without changes.")?;
            return Ok(None);
        }
    }

    let Some(method) = menu.choose("Choose continuation method:", crate::menu::METHOD_OPTIONS)? else {
        menu.say("Configuration cancelled.")?;
        return Ok(None);
    };
    let method = if method == 0 {
        ContinuationMethod::Compact
    } else {
        ContinuationMethod::Handoff
    };

    let mode = if method == ContinuationMethod::Handoff {
        match menu.choose("Choose resume prompt delivery:", MODE_OPTIONS)? {
            Some(0) => HandoffMode::Clipboard,
            Some(_) => HandoffMode::AutoPaste,
            None => {
                menu.say("Configuration cancelled.")?;
                return Ok(None);
            }
        }
    } else {
        HandoffMode::Clipboard
    };

    let mut scopes = vec![ConfigScope::Project];
    let mut labels = vec!["Project  - only this project".to_string()];
    if store.path(ConfigScope::Global).is_some() {
        scopes.push(ConfigScope::Global);
        labels.push("Global   - every project".to_string());
    }
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let Some(scope) = menu.choose("Save configuration where?", &label_refs)? else {
        menu.say("Configuration cancelled.")?;
        return Ok(None);
    };
    let scope = scopes[scope];

    store.set_method(scope, method)?;
    let path = store.set_mode(scope, mode)?;

    menu.say("")?;
    menu.say(&format!("Saved {}", path.display()))?;
    menu.say(&format!("  {KEY_METHOD}: {method}"))?;
    menu.say(&format!("  {KEY_MODE}: {mode}"))?;
    Ok(Some(path))
}

// ---------------------------------------------------------------------------
// reset
// ---------------------------------------------------------------------------

fn reset(store: &PreferenceStore, scope: ConfigScope, json: bool) -> anyhow::Result<()> {
    let removed = store
        .reset(scope)
        .with_context(|| format!("failed to reset {scope} config"))?;
    if json {
        print_json(&json!({ "scope": scope, "removed": removed }))?;
    } else if removed {
        println!("Removed {scope} config.");
    } else {
        println!("No {scope} config to remove.");
    }
    Ok(())
}
