//! Tab registry
//!
//! Manages the ordered tab list: four permanent default tabs followed by
//! user tabs, the active tab, persistence to a key-value store, and change
//! publication to subscribers. Index `i` of the list is page `i` of the
//! notes pager, so every consumer reads the same ordered snapshot.

use crate::config::{DEFAULT_STORE_KEY, FALLBACK_CATEGORY};
use crate::error::{StoreResult, TabError};
use crate::notes::NoteFilter;
use crate::storage::{KeyValueStore, StoreWriter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::watch;

/// Ids of the permanent tabs, in display order
pub const DEFAULT_TAB_IDS: [&str; 4] = ["all", "home", "work", "bookmark"];

/// Id of the tab that lists every note
pub const ALL_TAB_ID: &str = "all";

/// Prefix of ids generated for user tabs
pub const CUSTOM_TAB_PREFIX: &str = "custom_";

/// Icon asset of the bookmark tab
pub const BOOKMARK_ICON: &str = "ic_bookmark";

/// Whether `id` names one of the permanent tabs
pub fn is_default_id(id: &str) -> bool {
    DEFAULT_TAB_IDS.contains(&id)
}

/// How a tab renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TabKind {
    /// Title only
    #[default]
    Text,
    /// Icon only
    Icon,
    /// Icon and title
    Mixed,
}

impl TabKind {
    pub fn shows_title(self) -> bool {
        matches!(self, TabKind::Text | TabKind::Mixed)
    }

    pub fn shows_icon(self) -> bool {
        matches!(self, TabKind::Icon | TabKind::Mixed)
    }
}

/// A single tab in the tab strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDescriptor {
    /// Stable unique key
    pub id: String,

    /// Display label, absent for icon-only tabs
    #[serde(default)]
    pub title: Option<String>,

    /// Icon asset name
    #[serde(default)]
    pub icon_ref: Option<String>,

    #[serde(default)]
    pub kind: TabKind,

    /// Category the tab filters notes by; unset means "use the title"
    #[serde(default)]
    pub category: Option<String>,
}

impl TabDescriptor {
    /// Create a title-only tab
    pub fn text(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            icon_ref: None,
            kind: TabKind::Text,
            category: None,
        }
    }

    /// Create an icon-only tab
    pub fn icon(id: impl Into<String>, icon_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            icon_ref: Some(icon_ref.into()),
            kind: TabKind::Icon,
            category: None,
        }
    }

    /// Create a user tab from a name typed into the "add tab" prompt
    ///
    /// The id is derived from `now_millis`; the category mirrors the name.
    pub fn custom(name: &str, now_millis: i64) -> Result<Self, TabError> {
        let name = validate_tab_name(name)?;
        Ok(Self::text(format!("{}{}", CUSTOM_TAB_PREFIX, now_millis), name)
            .with_category(name))
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Category this tab filters by, falling back to the title
    pub fn category(&self) -> &str {
        self.category
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Label for menus and logs
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn is_default(&self) -> bool {
        is_default_id(&self.id)
    }

    /// Notes shown on this tab's page
    pub fn filter(&self) -> NoteFilter {
        if self.id == ALL_TAB_ID {
            NoteFilter::All
        } else {
            NoteFilter::Category(self.category().to_string())
        }
    }

    /// Fill an unset category from the title
    fn resolve_category(mut self) -> Self {
        if self.category.is_none() {
            self.category = Some(self.category().to_string());
        }
        self
    }
}

/// The four permanent tabs. Categories use the display label.
pub fn default_tabs() -> Vec<TabDescriptor> {
    vec![
        TabDescriptor::text("all", "All").with_category("All"),
        TabDescriptor::text("home", "Home").with_category("Home"),
        TabDescriptor::text("work", "Work").with_category("Work"),
        TabDescriptor::icon("bookmark", BOOKMARK_ICON).with_category("Bookmarked"),
    ]
}

/// Trim a user-entered tab name and reject empty ones
fn validate_tab_name(name: &str) -> Result<&str, TabError> {
    let name = name.trim();
    if name.is_empty() {
        Err(TabError::EmptyName)
    } else {
        Ok(name)
    }
}

/// What `TabRegistry::load` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored list used as-is
    Restored,
    /// Stored list used after putting the default tabs back in place
    Repaired,
    /// Nothing usable stored; defaults installed
    Defaults,
}

/// State of the tab strip
#[derive(Debug)]
pub struct TabRegistry {
    /// Ordered list of tabs, defaults first
    tabs: Vec<TabDescriptor>,

    /// Index of the currently active tab
    active_index: Option<usize>,

    /// Store key the list is persisted under
    store_key: String,

    /// Publishes a snapshot after every change
    changes: watch::Sender<Vec<TabDescriptor>>,
}

impl TabRegistry {
    /// Create a registry holding the default tabs
    pub fn new() -> Self {
        Self::with_store_key(DEFAULT_STORE_KEY)
    }

    /// Create a registry persisting under a custom key
    pub fn with_store_key(store_key: impl Into<String>) -> Self {
        let tabs = default_tabs();
        let (changes, _) = watch::channel(tabs.clone());
        Self {
            tabs,
            active_index: Some(0),
            store_key: store_key.into(),
            changes,
        }
    }

    /// Reset to exactly the default tabs
    pub fn initialize(&mut self) {
        self.tabs = default_tabs();
        self.active_index = Some(0);
        self.publish();
    }

    /// Append a tab and return its index. Ids are not checked for duplicates.
    pub fn add_tab(&mut self, tab: TabDescriptor) -> usize {
        let tab = tab.resolve_category();
        log::debug!("Adding tab {} ({})", tab.id, tab.category());
        self.tabs.push(tab);
        self.publish();
        self.tabs.len() - 1
    }

    /// Remove every tab with `id`. Default tabs are left alone.
    ///
    /// Returns whether a tab was removed.
    pub fn remove_tab(&mut self, id: &str) -> bool {
        if is_default_id(id) {
            log::debug!("Ignoring removal of default tab {}", id);
            return false;
        }

        let before = self.tabs.len();
        let removed_before_active = self.active_index.map(|active| {
            self.tabs[..active.min(before)]
                .iter()
                .filter(|t| t.id == id)
                .count()
        });
        let active_removed = self.active().is_some_and(|t| t.id == id);

        self.tabs.retain(|t| t.id != id);
        if self.tabs.len() == before {
            return false;
        }

        // Update active index
        if let (Some(active), Some(shift)) = (self.active_index, removed_before_active) {
            let shifted = active - shift;
            self.active_index = Some(if active_removed {
                // Removed active tab, select the one that slid into its place
                shifted.min(self.tabs.len() - 1)
            } else {
                shifted
            });
        }

        self.publish();
        true
    }

    /// Rename a user tab; its category follows the new title
    ///
    /// Default tabs are left alone whatever the name. Otherwise an empty
    /// name is rejected before anything changes. Returns whether a tab was
    /// renamed.
    pub fn rename_tab(&mut self, id: &str, new_title: &str) -> Result<bool, TabError> {
        if is_default_id(id) {
            log::debug!("Ignoring rename of default tab {}", id);
            return Ok(false);
        }

        let new_title = validate_tab_name(new_title)?;

        let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        tab.title = Some(new_title.to_string());
        tab.category = Some(new_title.to_string());

        self.publish();
        Ok(true)
    }

    /// Index of the tab with `id`
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&TabDescriptor> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tabs(&self) -> &[TabDescriptor] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Page filters, index-aligned with `tabs()`
    pub fn pages(&self) -> Vec<NoteFilter> {
        self.tabs.iter().map(TabDescriptor::filter).collect()
    }

    /// Set the active tab by id
    pub fn select(&mut self, id: &str) -> Result<(), TabError> {
        let index = self.position_of(id).ok_or_else(|| TabError::NotFound {
            id: id.to_string(),
        })?;
        self.active_index = Some(index);
        Ok(())
    }

    /// Get the active tab
    pub fn active(&self) -> Option<&TabDescriptor> {
        self.active_index.and_then(|i| self.tabs.get(i))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Receive a snapshot of the list after every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<TabDescriptor>> {
        self.changes.subscribe()
    }

    /// Serialize the list as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.tabs)
    }

    /// Write the list to `store`, replacing what was there
    pub fn save(&self, store: &mut impl KeyValueStore) -> StoreResult<()> {
        let json = self.encode()?;
        store.put(&self.store_key, json).map_err(|e| {
            log::error!("Failed to save tabs: {}", e);
            e
        })
    }

    /// Queue the list on a background writer
    pub fn persist<S>(&self, writer: &StoreWriter<S>) -> StoreResult<()>
    where
        S: KeyValueStore + Send + 'static,
    {
        writer.put(&self.store_key, self.encode()?)
    }

    fn encode(&self) -> StoreResult<String> {
        self.to_json().map_err(|e| crate::error::StoreError::Encode {
            key: self.store_key.clone(),
            source: e,
        })
    }

    /// Restore the list from `store`
    ///
    /// Never fails: a missing key, unreadable store, malformed JSON or an
    /// empty list installs the defaults instead.
    pub fn load(&mut self, store: &impl KeyValueStore) -> LoadOutcome {
        let json = match store.get(&self.store_key) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No saved tabs, using defaults");
                self.initialize();
                return LoadOutcome::Defaults;
            }
            Err(e) => {
                log::error!("Error loading tabs: {}", e);
                self.initialize();
                return LoadOutcome::Defaults;
            }
        };

        let loaded: Vec<TabDescriptor> = match serde_json::from_str(&json) {
            Ok(tabs) => tabs,
            Err(e) => {
                log::error!("Error parsing saved tabs: {}", e);
                self.initialize();
                return LoadOutcome::Defaults;
            }
        };

        if loaded.is_empty() {
            log::warn!("Saved tab list is empty, using defaults");
            self.initialize();
            return LoadOutcome::Defaults;
        }

        let repaired = repair(&loaded);
        let outcome = if repaired == loaded {
            LoadOutcome::Restored
        } else {
            log::warn!("Saved tabs were inconsistent, default tabs restored in place");
            LoadOutcome::Repaired
        };

        self.tabs = repaired;
        self.active_index = Some(0);
        self.publish();
        log::debug!("Loaded {} tabs", self.tabs.len());
        outcome
    }

    fn publish(&self) {
        self.changes.send_replace(self.tabs.clone());
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical defaults followed by the stored user tabs in stored order,
/// keeping the first occurrence of each id
fn repair(loaded: &[TabDescriptor]) -> Vec<TabDescriptor> {
    let mut tabs = default_tabs();
    let mut seen: HashSet<String> = DEFAULT_TAB_IDS.iter().map(|id| id.to_string()).collect();

    for tab in loaded {
        if seen.insert(tab.id.clone()) {
            tabs.push(tab.clone().resolve_category());
        }
    }
    tabs
}
