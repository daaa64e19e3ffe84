//! Configuration management
//!
//! Handles loading, parsing, and validating the TOML configuration file.
//! Settings choose the audio tool preset; the optional `[format]` and
//! `[commands]` tables override individual report patterns and command lines
//! for tool versions that lay their output out differently.

use color_eyre::eyre::{self, Context, ContextCompat, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cache::DEFAULT_CACHE_SIZE;
use crate::inspector::SinkFormat;
use crate::server::{
    CommandSet, SINK_ID_PLACEHOLDER, SINK_NAME_PLACEHOLDER, STREAM_ID_PLACEHOLDER,
};
use crate::tool::Tool;

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

// ============================================================================
// Public Configuration Types
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    /// Report patterns (preset with overrides applied)
    pub format: SinkFormat,
    /// Command lines (preset with overrides applied)
    pub commands: CommandSet,
}

/// Global settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub poll_interval_ms: u64,
    pub log_level: String,
    pub tool: Tool,
    pub notify_switch: bool,
    /// Number of parsed sink reports to keep (0 disables)
    pub cache_size: usize,
}

// ============================================================================
// Config File Deserialization (TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    settings: SettingsFile,
    #[serde(default)]
    format: FormatFile,
    #[serde(default)]
    commands: CommandsFile,
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    tool: Tool,
    #[serde(default = "default_true")]
    notify_switch: bool,
    #[serde(default = "default_cache_size")]
    cache_size: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FormatFile {
    #[serde(with = "serde_regex")]
    index: Option<Regex>,
    #[serde(with = "serde_regex")]
    name: Option<Regex>,
    #[serde(with = "serde_regex")]
    priority: Option<Regex>,
    #[serde(with = "serde_regex")]
    state: Option<Regex>,
    #[serde(with = "serde_regex")]
    stream_index: Option<Regex>,
    enabled_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommandsFile {
    list_sinks: Option<Vec<String>>,
    list_streams: Option<Vec<String>>,
    set_default: Option<Vec<String>>,
    move_stream: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_level: default_log_level(),
            tool: Tool::default(),
            notify_switch: true,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

// ============================================================================
// Config Implementation
// ============================================================================

impl Default for Config {
    fn default() -> Self {
        Self::resolve(ConfigFile::default())
    }
}

impl Config {
    /// Load configuration from the default XDG config path
    ///
    /// Creates a commented default config on first use.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created, read, parsed, or fails validation.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Creating default config at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit path
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {path:?}"))?;

        let config_file: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {path:?}"))?;

        Self::from_config_file(config_file)
            .with_context(|| format!("Invalid config: {path:?}"))
    }

    fn from_config_file(config_file: ConfigFile) -> Result<Self> {
        let config = Self::resolve(config_file);
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides on top of the selected tool preset
    fn resolve(config_file: ConfigFile) -> Self {
        let ConfigFile {
            settings,
            format,
            commands,
        } = config_file;

        let preset_format = settings.tool.format();
        let preset_commands = settings.tool.commands();

        Self {
            format: SinkFormat {
                index: format.index.unwrap_or(preset_format.index),
                name: format.name.unwrap_or(preset_format.name),
                priority: format.priority.unwrap_or(preset_format.priority),
                state: format.state.unwrap_or(preset_format.state),
                enabled_marker: format
                    .enabled_marker
                    .unwrap_or(preset_format.enabled_marker),
                stream_index: format.stream_index.unwrap_or(preset_format.stream_index),
            },
            commands: CommandSet {
                list_sinks: commands.list_sinks.unwrap_or(preset_commands.list_sinks),
                list_streams: commands
                    .list_streams
                    .unwrap_or(preset_commands.list_streams),
                set_default: commands.set_default.unwrap_or(preset_commands.set_default),
                move_stream: commands.move_stream.unwrap_or(preset_commands.move_stream),
            },
            settings: Settings {
                poll_interval_ms: settings.poll_interval_ms,
                log_level: settings.log_level,
                tool: settings.tool,
                notify_switch: settings.notify_switch,
                cache_size: settings.cache_size,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        match self.settings.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            level => eyre::bail!(
                "Invalid log_level '{level}'. Must be: error, warn, info, debug, or trace"
            ),
        }

        if self.settings.poll_interval_ms == 0 {
            eyre::bail!("poll_interval_ms must be greater than 0");
        }

        if self.format.enabled_marker.is_empty() {
            eyre::bail!("format.enabled_marker must not be empty");
        }

        let commands = [
            ("list_sinks", &self.commands.list_sinks, &[][..]),
            ("list_streams", &self.commands.list_streams, &[][..]),
            ("set_default", &self.commands.set_default, &[SINK_NAME_PLACEHOLDER][..]),
            (
                "move_stream",
                &self.commands.move_stream,
                &[STREAM_ID_PLACEHOLDER, SINK_ID_PLACEHOLDER][..],
            ),
        ];

        for (key, argv, placeholders) in commands {
            if argv.first().is_none_or(String::is_empty) {
                eyre::bail!("commands.{key} must name a program");
            }
            for placeholder in placeholders {
                if !argv.iter().any(|arg| arg.contains(*placeholder)) {
                    eyre::bail!("commands.{key} must contain {placeholder}");
                }
            }
        }

        Ok(())
    }

    /// Get the XDG config path for PRISW
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or created.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("prisw");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir: {config_dir:?}"))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Directory for the daemon log file
    ///
    /// # Errors
    /// Returns an error if no state or data directory can be determined.
    pub fn get_log_dir() -> Result<PathBuf> {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("prisw"))
            .context("Could not determine state directory for logs")
    }

    fn create_default_config(path: &Path) -> Result<()> {
        let default_config = r#"# PRISW (Priority Switcher) Configuration
#
# Keeps the highest-priority audio sink active and moves playing streams to it.
# Priorities come from the audio server itself; nothing to rank here.

[settings]
poll_interval_ms = 1000    # How often to check sinks
log_level = "info"         # error, warn, info, debug, trace
tool = "pactl"             # pactl or pacmd
notify_switch = true       # Desktop notification when the output changes
cache_size = 1000          # Parsed sink reports to remember (0 disables)

# Report patterns (regex). Only needed if your tool version prints sinks
# differently from the preset. The n-th match of each pattern must describe
# the n-th sink.
#
# [format]
# index = 'Sink #[0-9]+'
# name = 'Name: .+'
# priority = 'priority: [0-9]+'
# state = 'State: [A-Z]+'
# enabled_marker = "RUNNING"
# stream_index = 'Sink Input #[0-9]+'

# Command lines. {sink_name}, {sink_id} and {stream_id} are substituted.
#
# [commands]
# list_sinks = ["pactl", "list", "sinks"]
# list_streams = ["pactl", "list", "sink-inputs"]
# set_default = ["pactl", "set-default-sink", "{sink_name}"]
# move_stream = ["pactl", "move-sink-input", "{stream_id}", "{sink_id}"]
"#;
        fs::write(path, default_config)
            .with_context(|| format!("Failed to write config: {path:?}"))?;

        eprintln!("Created default config at: {path:?}");
        eprintln!();
        eprintln!("Next steps:");
        eprintln!("  1. Run 'prisw list-sinks' to check that sinks are detected");
        eprintln!("  2. Run 'prisw validate' to check your config");
        eprintln!("  3. Run 'prisw daemon' to start");
        eprintln!();

        Ok(())
    }

    /// Print a human-readable summary of the configuration
    pub fn print_summary(&self) {
        println!("✓ Configuration valid\n");

        println!("Settings:");
        println!("  poll_interval_ms: {}", self.settings.poll_interval_ms);
        println!("  log_level: {}", self.settings.log_level);
        println!("  tool: {}", self.settings.tool);
        println!("  notify_switch: {}", self.settings.notify_switch);
        println!("  cache_size: {}", self.settings.cache_size);

        println!("\nFormat:");
        println!("  index: {}", self.format.index.as_str());
        println!("  name: {}", self.format.name.as_str());
        println!("  priority: {}", self.format.priority.as_str());
        println!("  state: {}", self.format.state.as_str());
        println!("  enabled_marker: {:?}", self.format.enabled_marker);
        println!("  stream_index: {}", self.format.stream_index.as_str());

        println!("\nCommands:");
        println!("  list_sinks: {}", self.commands.list_sinks.join(" "));
        println!("  list_streams: {}", self.commands.list_streams.join(" "));
        println!("  set_default: {}", self.commands.set_default.join(" "));
        println!("  move_stream: {}", self.commands.move_stream.join(" "));

        if let Ok(path) = Self::get_config_path() {
            println!("\nConfig: {path:?}");
        }
    }
}
