//! User configuration. Panel endpoint, timing, permissions, keybindings.
//!
//! Stored as a simple `key = value` text file at
//! `$XDG_CONFIG_HOME/ward-board/config.toml` (default
//! `~/.config/ward-board/config.toml`).  Missing or invalid values fall back
//! to the defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::refresh::RefreshSettings;
use crate::core::access::{self, Permissions};
use crate::core::scroll::ScrollSettings;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    PrevColumn,
    NextColumn,
    SortColumn,
    NextFilter,
    FilterForward,
    FilterBack,
    ClearFilters,
    ToggleAutoScroll,
    Refresh,
    ToggleHelp,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help popup and the file).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::PrevColumn,
        Action::NextColumn,
        Action::SortColumn,
        Action::NextFilter,
        Action::FilterForward,
        Action::FilterBack,
        Action::ClearFilters,
        Action::ToggleAutoScroll,
        Action::Refresh,
        Action::ToggleHelp,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::ScrollUp => "Scroll Up",
            Action::ScrollDown => "Scroll Down",
            Action::PageUp => "Page Up",
            Action::PageDown => "Page Down",
            Action::PrevColumn => "Previous Column",
            Action::NextColumn => "Next Column",
            Action::SortColumn => "Sort By Column",
            Action::NextFilter => "Next Filter",
            Action::FilterForward => "Filter Value ▸",
            Action::FilterBack => "Filter Value ◂",
            Action::ClearFilters => "Clear Filters",
            Action::ToggleAutoScroll => "Auto Scroll",
            Action::Refresh => "Refresh Now",
            Action::ToggleHelp => "Help",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::PrevColumn => "prev_column",
            Action::NextColumn => "next_column",
            Action::SortColumn => "sort_column",
            Action::NextFilter => "next_filter",
            Action::FilterForward => "filter_forward",
            Action::FilterBack => "filter_back",
            Action::ClearFilters => "clear_filters",
            Action::ToggleAutoScroll => "toggle_autoscroll",
            Action::Refresh => "refresh",
            Action::ToggleHelp => "help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding (key code + modifier combination).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// User-friendly display string (e.g. `"Alt+↑"`, `"Ctrl+r"`, `"q"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Config-file spelling (e.g. `"Alt+Up"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, pretty: bool) -> String {
        let mut s = String::new();
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(name);
            }
        }
        let key = match (self.code, pretty) {
            (KeyCode::Char(' '), _) => "Space".to_string(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Left, true) => "←".into(),
            (KeyCode::Right, true) => "→".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse a key string like `"Ctrl+r"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let (mods, key_part) = match s.rsplit_once('+') {
            Some((m, k)) if !k.is_empty() => (Some(m), k),
            // A bare "+" is the plus key.
            _ => (None, s),
        };

        for part in mods.into_iter().flat_map(|m| m.split('+')) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ => {
                // Keep the case for single characters ("R" ≠ "r").
                let mut chars = key_part.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Origin of the panel API, e.g. `http://localhost:5000`.
    pub api_origin: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    /// Auto-scroll speed in rows per second.
    pub scroll_speed: f64,
    /// Auto-scroll never travels past this row.
    pub row_limit: usize,
    /// Dwell at the scroll end.
    pub pause_ms: u64,
    /// Dwell at the top before scrolling again.
    pub restart_delay_ms: u64,
    /// Auto-scroll switches itself on this long after start-up.
    pub autoscroll_start_ms: u64,
    /// Panel ids this user may open.
    pub permissions: Vec<String>,
    pub admin: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            api_origin: "http://localhost:5000".into(),
            poll_interval_ms: 30_000,
            request_timeout_ms: 15_000,
            scroll_speed: 2.0,
            row_limit: 30,
            pause_ms: 2_000,
            restart_delay_ms: 5_000,
            autoscroll_start_ms: 5_000,
            permissions: vec!["painel2".into()],
            admin: false,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(Char(' '), n)]);
        m.insert(PrevColumn, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(NextColumn, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(SortColumn, vec![KeyBind::new(Enter, n), KeyBind::new(Char('s'), n)]);
        m.insert(NextFilter, vec![KeyBind::new(Tab, n)]);
        m.insert(FilterForward, vec![KeyBind::new(Char('f'), n)]);
        m.insert(FilterBack, vec![KeyBind::new(Char('F'), KeyModifiers::SHIFT)]);
        m.insert(ClearFilters, vec![KeyBind::new(Char('c'), n)]);
        m.insert(ToggleAutoScroll, vec![KeyBind::new(Char('a'), n)]);
        m.insert(Refresh, vec![KeyBind::new(Char('r'), n)]);
        m.insert(ToggleHelp, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    /// Find the action that matches a key event.  The binding with the most
    /// modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(KeyBind::display).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: sort | {}: filter | {}: auto-scroll | {}: refresh | {}: help | {}: quit",
            self.short_binding(Action::SortColumn),
            self.short_binding(Action::FilterForward),
            self.short_binding(Action::ToggleAutoScroll),
            self.short_binding(Action::Refresh),
            self.short_binding(Action::ToggleHelp),
            self.short_binding(Action::Quit),
        )
    }

    // ── derived settings ────────────────────────────────────────

    pub fn scroll_settings(&self) -> ScrollSettings {
        ScrollSettings {
            speed: self.scroll_speed,
            row_limit: self.row_limit,
            pause: Duration::from_millis(self.pause_ms),
            restart_delay: Duration::from_millis(self.restart_delay_ms),
        }
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            autoscroll_start: Duration::from_millis(self.autoscroll_start_ms),
            ..RefreshSettings::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn permissions(&self) -> Permissions {
        Permissions {
            panels: self.permissions.clone(),
            is_admin: self.admin,
        }
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), %err, "config unreadable, using defaults");
                }
                Self::default()
            }
        }
    }

    /// Persist current config to the default location.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut cfg = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "api_origin" => {
                    if !value.is_empty() {
                        cfg.api_origin = value.trim_end_matches('/').to_string();
                    }
                    continue;
                }
                "poll_interval_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.poll_interval_ms = v.clamp(1_000, 3_600_000);
                    }
                    continue;
                }
                "request_timeout_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.request_timeout_ms = v.clamp(500, 120_000);
                    }
                    continue;
                }
                "scroll_speed" => {
                    if let Ok(v) = value.parse::<f64>() {
                        if v.is_finite() {
                            cfg.scroll_speed = v.clamp(0.1, 50.0);
                        }
                    }
                    continue;
                }
                "row_limit" => {
                    if let Ok(v) = value.parse::<usize>() {
                        cfg.row_limit = v.max(1);
                    }
                    continue;
                }
                "pause_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.pause_ms = v;
                    }
                    continue;
                }
                "restart_delay_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.restart_delay_ms = v;
                    }
                    continue;
                }
                "autoscroll_start_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.autoscroll_start_ms = v;
                    }
                    continue;
                }
                "permissions" => {
                    // Accepts `a, b` as well as the TOML array form `["a", "b"]`.
                    let list = value.trim_start_matches('[').trim_end_matches(']');
                    cfg.permissions = list
                        .split(',')
                        .map(|p| p.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
                        .filter(|p| !p.is_empty())
                        .collect();
                    for panel in &cfg.permissions {
                        if !access::is_known_panel(panel) {
                            tracing::warn!(panel = %panel, "unknown panel in permissions");
                        }
                    }
                    continue;
                }
                "admin" => {
                    cfg.admin = value == "true";
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!(key, "unknown config key ignored");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                cfg.bindings.insert(action, parsed);
            }
        }

        cfg
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# ward-board configuration".to_string(),
            String::new(),
            "# Panel API".to_string(),
            format!("api_origin = {}", self.api_origin),
            format!("poll_interval_ms = {}", self.poll_interval_ms),
            format!("request_timeout_ms = {}", self.request_timeout_ms),
            String::new(),
            "# Auto-scroll (speed in rows per second)".to_string(),
            format!("scroll_speed = {}", self.scroll_speed),
            format!("row_limit = {}", self.row_limit),
            format!("pause_ms = {}", self.pause_ms),
            format!("restart_delay_ms = {}", self.restart_delay_ms),
            format!("autoscroll_start_ms = {}", self.autoscroll_start_ms),
            String::new(),
            "# Access".to_string(),
            format!("permissions = {}", self.permissions.join(", ")),
            format!("admin = {}", self.admin),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/ward-board/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn defaults_match_the_ward_screens() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.poll_interval_ms, 30_000);
        assert_eq!(cfg.row_limit, 30);
        assert_eq!(cfg.pause_ms, 2_000);
        assert_eq!(cfg.match_key(key(KeyCode::Char('a'), KeyModifiers::NONE)), Some(Action::ToggleAutoScroll));
        assert_eq!(cfg.match_key(key(KeyCode::Char('F'), KeyModifiers::SHIFT)), Some(Action::FilterBack));
        assert_eq!(cfg.match_key(key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn parses_settings_and_clamps_them() {
        let cfg = AppConfig::parse_config(
            "# comment\n\
             api_origin = \"http://painel.local:8080/\"\n\
             poll_interval_ms = 10\n\
             scroll_speed = 3.5\n\
             row_limit = 0\n\
             permissions = painel2, painel5\n\
             admin = true\n\
             refresh = Ctrl+r, F5\n\
             quit = nonsense+key\n",
        );
        assert_eq!(cfg.api_origin, "http://painel.local:8080");
        assert_eq!(cfg.poll_interval_ms, 1_000);
        assert_eq!(cfg.scroll_speed, 3.5);
        assert_eq!(cfg.row_limit, 1);
        assert_eq!(cfg.permissions, vec!["painel2".to_string(), "painel5".to_string()]);
        assert!(cfg.admin);
        assert_eq!(
            cfg.bindings[&Action::Refresh],
            vec![
                KeyBind::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
                KeyBind::new(KeyCode::F(5), KeyModifiers::NONE)
            ]
        );
        // Unparsable bindings keep the defaults.
        assert_eq!(cfg.bindings[&Action::Quit], AppConfig::default_bindings()[&Action::Quit]);
    }

    #[test]
    fn permissions_accept_a_toml_array() {
        let cfg = AppConfig::parse_config("permissions = [\"painel2\", 'painel5']\n");
        assert_eq!(cfg.permissions, vec!["painel2".to_string(), "painel5".to_string()]);
        let perms = cfg.permissions();
        assert!(perms.can_access("painel2"));
        assert!(perms.can_access("painel5"));
        assert!(!perms.can_access("painel3"));
    }

    #[test]
    fn save_then_load_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.api_origin = "http://10.0.0.7:5000".into();
        cfg.restart_delay_ms = 1234;
        cfg.bindings.insert(Action::Quit, vec![KeyBind::new(KeyCode::Char('x'), KeyModifiers::ALT)]);
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.api_origin, cfg.api_origin);
        assert_eq!(loaded.restart_delay_ms, 1234);
        assert_eq!(loaded.bindings, cfg.bindings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("absent.toml"));
        assert_eq!(cfg.api_origin, AppConfig::default().api_origin);
    }

    #[test]
    fn key_names_round_trip() {
        for raw in ["Alt+Up", "Ctrl+r", "PageDown", "Space", "Shift+F", "+", "F5", "Tab"] {
            let bind = KeyBind::parse(raw).unwrap_or_else(|| panic!("{raw}"));
            assert_eq!(KeyBind::parse(&bind.to_config_string()), Some(bind), "{raw}");
        }
        assert_eq!(KeyBind::new(KeyCode::Up, KeyModifiers::ALT).display(), "Alt+↑");
    }
}
