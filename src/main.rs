//! Easy Notes - tab manager command line
//!
//! Entry point for the binary. Handles CLI argument parsing, logging
//! initialization, and runs one tab command against the persisted tab list.

use anyhow::Context;
use easy_notes::config::Config;
use easy_notes::error::TabError;
use easy_notes::notes::now_millis;
use easy_notes::state::{LoadOutcome, TabDescriptor, TabRegistry};
use easy_notes::storage::{JsonFileStore, KeyValueStore};
use easy_notes::utils::path::expand_tilde;
use std::path::PathBuf;

/// Application name for logging
const APP_NAME: &str = "easy-notes";

/// Tab command to run
#[derive(Debug, Clone, PartialEq, Eq)]
enum TabCommand {
    List,
    Add { name: String },
    Rename { id: String, name: String },
    Remove { id: String },
    Reset,
}

/// Parsed command line
#[derive(Debug, Default)]
struct Flags {
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    command: Option<TabCommand>,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let flags = parse_args();
    let command = flags.command.clone().unwrap_or(TabCommand::List);

    let config = match &flags.config {
        Some(path) => Config::load_from(&expand_tilde(path)),
        None => Config::load(),
    }
    .context("loading configuration")?;

    let store_path = match &flags.store {
        Some(path) => expand_tilde(path),
        None => config.store_path().context("locating data directory")?,
    };
    log::debug!("Using tab store {}", store_path.display());

    let mut store = JsonFileStore::new(store_path);
    let mut registry = TabRegistry::with_store_key(config.tabs.store_key.clone());
    if registry.load(&store) == LoadOutcome::Repaired {
        log::info!("Tab list repaired on load");
    }

    let changed = match run(&mut registry, &command) {
        Ok(changed) => changed,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };

    if changed && !save_tabs(&registry, &mut store) {
        log::warn!("Tab list not saved to {}", store.path().display());
    }

    print_tabs(&registry);
    Ok(())
}

/// Save the list, reporting a failure without stopping
fn save_tabs(registry: &TabRegistry, store: &mut impl KeyValueStore) -> bool {
    match registry.save(store) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Warning: {}", e.user_message());
            false
        }
    }
}

/// Apply `command`; returns whether the list needs saving
fn run(registry: &mut TabRegistry, command: &TabCommand) -> Result<bool, TabError> {
    match command {
        TabCommand::List => Ok(false),
        TabCommand::Add { name } => {
            let tab = TabDescriptor::custom(name, now_millis())?;
            log::info!("Adding tab {}", tab.id);
            registry.add_tab(tab);
            Ok(true)
        }
        TabCommand::Rename { id, name } => {
            if registry.get(id).is_none() {
                return Err(TabError::NotFound { id: id.clone() });
            }
            let renamed = registry.rename_tab(id, name)?;
            if !renamed {
                eprintln!("Tab '{}' cannot be renamed", id);
            }
            Ok(renamed)
        }
        TabCommand::Remove { id } => {
            if registry.get(id).is_none() {
                return Err(TabError::NotFound { id: id.clone() });
            }
            let removed = registry.remove_tab(id);
            if !removed {
                eprintln!("Tab '{}' cannot be removed", id);
            }
            Ok(removed)
        }
        TabCommand::Reset => {
            registry.initialize();
            Ok(true)
        }
    }
}

fn print_tabs(registry: &TabRegistry) {
    for (index, tab) in registry.tabs().iter().enumerate() {
        let marker = if tab.is_default() { "*" } else { " " };
        println!(
            "{:>2} {} {:<22} {:<12} {}",
            index,
            marker,
            tab.id,
            tab.label(),
            tab.category()
        );
    }
}

/// Initialize the logging system
fn init_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,easy_notes=debug"),
    )
    .format_timestamp_millis()
    .init();
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_flags(&args) {
        Ok(flags) => flags,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    }
}

fn parse_flags(args: &[String]) -> Result<Flags, String> {
    let mut flags = Flags::default();
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "--store" => {
                let path = args.get(i + 1).ok_or("--store requires a path argument")?;
                flags.store = Some(PathBuf::from(path));
                i += 1;
            }
            "-c" | "--config" => {
                let path = args.get(i + 1).ok_or("--config requires a path argument")?;
                flags.config = Some(PathBuf::from(path));
                i += 1;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    flags.command = parse_command(&positional)?;
    Ok(flags)
}

fn parse_command(args: &[String]) -> Result<Option<TabCommand>, String> {
    let words: Vec<&str> = args.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        [] => return Ok(None),
        ["tabs"] | ["tabs", "list"] => TabCommand::List,
        ["tabs", "add", name @ ..] if !name.is_empty() => TabCommand::Add {
            name: name.join(" "),
        },
        ["tabs", "rename", id, name @ ..] if !name.is_empty() => TabCommand::Rename {
            id: id.to_string(),
            name: name.join(" "),
        },
        ["tabs", "remove", id] => TabCommand::Remove { id: id.to_string() },
        ["tabs", "reset"] => TabCommand::Reset,
        _ => return Err(format!("Unknown command: {}", words.join(" "))),
    };
    Ok(Some(command))
}

/// Print help message
fn print_help() {
    println!(
        r#"Easy Notes - tab manager

USAGE:
    easy-notes [OPTIONS] tabs [COMMAND]

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information
    -s, --store PATH    Use PATH as the tab store file
    -c, --config PATH   Load configuration from PATH

COMMANDS:
    tabs list                 List tabs (default)
    tabs add NAME             Add a tab named NAME
    tabs rename ID NAME       Rename a user tab
    tabs remove ID            Remove a user tab
    tabs reset                Restore the default tabs

Default tabs (marked *) cannot be renamed or removed.
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use easy_notes::error::{StoreError, StoreResult};
    use easy_notes::storage::MemoryStore;

    /// Store whose writes always fail
    struct FullDisk;

    impl KeyValueStore for FullDisk {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        fn put(&mut self, _key: &str, _value: String) -> StoreResult<()> {
            Err(StoreError::WriteError {
                path: PathBuf::from("/full/tabs_prefs.json"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }

        fn remove(&mut self, _key: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_add_joins_name() {
        let flags = parse_flags(&args(&["--store", "/tmp/t.json", "tabs", "add", "Road", "trips"])).unwrap();
        assert_eq!(flags.store, Some(PathBuf::from("/tmp/t.json")));
        assert_eq!(
            flags.command,
            Some(TabCommand::Add {
                name: "Road trips".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_flags(&args(&["tabs", "explode"])).is_err());
        assert!(parse_flags(&args(&["--bogus"])).is_err());
        assert!(parse_flags(&args(&["--store"])).is_err());
    }

    #[test]
    fn test_run_add_and_remove() {
        let mut registry = TabRegistry::new();
        assert_eq!(
            run(&mut registry, &TabCommand::Add { name: "  ".to_string() }),
            Err(TabError::EmptyName)
        );
        assert_eq!(registry.len(), 4);

        run(&mut registry, &TabCommand::Add { name: "Travel".to_string() }).unwrap();
        let id = registry.tabs()[4].id.clone();
        assert!(id.starts_with("custom_"));

        run(&mut registry, &TabCommand::Remove { id }).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(
            run(&mut registry, &TabCommand::Remove { id: "nope".to_string() }),
            Err(TabError::NotFound { id: "nope".to_string() })
        );
    }

    #[test]
    fn test_run_refused_default_change_needs_no_save() {
        let mut registry = TabRegistry::new();
        let rename = TabCommand::Rename {
            id: "work".to_string(),
            name: "Office".to_string(),
        };
        assert_eq!(run(&mut registry, &rename), Ok(false));
        assert_eq!(
            run(&mut registry, &TabCommand::Remove { id: "home".to_string() }),
            Ok(false)
        );
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("work").unwrap().label(), "Work");
    }

    #[test]
    fn test_save_failure_keeps_going() {
        let mut registry = TabRegistry::new();
        run(&mut registry, &TabCommand::Add { name: "Travel".to_string() }).unwrap();

        assert!(!save_tabs(&registry, &mut FullDisk));
        assert_eq!(registry.len(), 5);

        let mut store = MemoryStore::new();
        assert!(save_tabs(&registry, &mut store));
        assert!(!store.is_empty());
    }
}
