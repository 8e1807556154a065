use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ratatui::style::Color;

use crate::presenter::{
    DEFAULT_CLOCK_FORMAT, DEFAULT_STOPWATCH_FORMAT, Template, is_valid_clock_format,
};

pub const DEFAULT_BACKGROUND: &str = "black";
pub const DEFAULT_CURRENT_WIDTH: u32 = 480;
pub const DEFAULT_NEXT_WIDTH: u32 = 320;
pub const DEFAULT_OVERVIEW_WIDTH: u32 = 200;
/// Largest accepted thumbnail width in pixels.
pub const MAX_WIDTH_PX: u32 = 16_384;

/// Options as written on the command line or in an rc file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub background: Option<String>,
    pub current_width: Option<u32>,
    pub next_width: Option<u32>,
    pub overview_width: Option<u32>,
    pub layout_file: Option<PathBuf>,
    pub clock_format: Option<String>,
    pub stopwatch_format: Option<String>,
    pub slide_tty: Option<PathBuf>,
    pub slide_size: Option<(u16, u16)>,
    pub cache_dir: Option<PathBuf>,
    pub perf: bool,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; values in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            background: other.background.clone().or_else(|| self.background.clone()),
            current_width: other.current_width.or(self.current_width),
            next_width: other.next_width.or(self.next_width),
            overview_width: other.overview_width.or(self.overview_width),
            layout_file: other.layout_file.clone().or_else(|| self.layout_file.clone()),
            clock_format: other.clock_format.clone().or_else(|| self.clock_format.clone()),
            stopwatch_format: other
                .stopwatch_format
                .clone()
                .or_else(|| self.stopwatch_format.clone()),
            slide_tty: other.slide_tty.clone().or_else(|| self.slide_tty.clone()),
            slide_size: other.slide_size.or(self.slide_size),
            cache_dir: other.cache_dir.clone().or_else(|| self.cache_dir.clone()),
            perf: self.perf || other.perf,
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }
}

/// Validated, typed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub background: Color,
    pub current_width: u32,
    pub next_width: u32,
    pub overview_width: u32,
    pub template: Template,
    pub clock_format: String,
    pub stopwatch_format: String,
    pub slide_tty: Option<PathBuf>,
    pub slide_size: Option<(u16, u16)>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background: Color::Black,
            current_width: DEFAULT_CURRENT_WIDTH,
            next_width: DEFAULT_NEXT_WIDTH,
            overview_width: DEFAULT_OVERVIEW_WIDTH,
            template: Template::default(),
            clock_format: DEFAULT_CLOCK_FORMAT.to_string(),
            stopwatch_format: DEFAULT_STOPWATCH_FORMAT.to_string(),
            slide_tty: None,
            slide_size: None,
        }
    }
}

impl Settings {
    /// Validate flags and fill in defaults.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable color, a zero width, an invalid clock format,
    /// or an unreadable layout file.
    pub fn resolve(flags: &ConfigFlags) -> Result<Self> {
        let defaults = Self::default();
        let background = match flags.background.as_deref() {
            Some(name) => name
                .parse::<Color>()
                .map_err(|_| anyhow::anyhow!("Invalid background color: {name}"))?,
            None => defaults.background,
        };
        let current_width = positive("current-width", flags.current_width, defaults.current_width)?;
        let next_width = positive("next-width", flags.next_width, defaults.next_width)?;
        let overview_width =
            positive("overview-width", flags.overview_width, defaults.overview_width)?;

        let clock_format = flags
            .clock_format
            .clone()
            .unwrap_or(defaults.clock_format);
        if !is_valid_clock_format(&clock_format) {
            bail!("Invalid clock format: {clock_format}");
        }

        let template = match &flags.layout_file {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read layout {}", path.display()))?;
                Template::parse(&source)
            }
            None => defaults.template,
        };

        Ok(Self {
            background,
            current_width,
            next_width,
            overview_width,
            template,
            clock_format,
            stopwatch_format: flags
                .stopwatch_format
                .clone()
                .unwrap_or(defaults.stopwatch_format),
            slide_tty: flags.slide_tty.clone(),
            slide_size: flags.slide_size,
        })
    }
}

fn positive(name: &str, value: Option<u32>, default: u32) -> Result<u32> {
    match value {
        Some(0) => bail!("--{name} must be greater than zero"),
        Some(v) if v > MAX_WIDTH_PX => bail!("--{name} must be at most {MAX_WIDTH_PX}"),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("podium").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("podium")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("podium").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("podium").join("config");
        }
    }

    PathBuf::from(".podiumrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".podiumrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Split one rc-file line. A value-taking flag owns the rest of its line, so
/// formats and paths may contain spaces.
fn line_tokens(line: &str) -> Vec<String> {
    let name_end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(name_end);
    if takes_value(name) && !rest.is_empty() {
        let value = rest.strip_prefix('=').unwrap_or(rest).trim();
        return vec![name.to_string(), value.to_string()];
    }
    line.split_whitespace().map(ToOwned::to_owned).collect()
}

fn takes_value(name: &str) -> bool {
    matches!(
        name,
        "--background"
            | "--current-width"
            | "--next-width"
            | "--overview-width"
            | "--layout-file"
            | "--clock-format"
            | "--stopwatch-format"
            | "--slide-tty"
            | "--slide-size"
            | "--cache-dir"
            | "--debug-log"
    )
}

/// Write one flag per line; `load_config_flags` reads each value to the end
/// of its line.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# podium defaults (saved with --save)".to_string());
    if let Some(color) = &flags.background {
        lines.push(format!("--background {color}"));
    }
    if let Some(px) = flags.current_width {
        lines.push(format!("--current-width {px}"));
    }
    if let Some(px) = flags.next_width {
        lines.push(format!("--next-width {px}"));
    }
    if let Some(px) = flags.overview_width {
        lines.push(format!("--overview-width {px}"));
    }
    if let Some(path) = &flags.layout_file {
        lines.push(format!("--layout-file {}", path.display()));
    }
    if let Some(fmt) = &flags.clock_format {
        lines.push(format!("--clock-format {fmt}"));
    }
    if let Some(fmt) = &flags.stopwatch_format {
        lines.push(format!("--stopwatch-format {fmt}"));
    }
    if let Some(path) = &flags.slide_tty {
        lines.push(format!("--slide-tty {}", path.display()));
    }
    if let Some((cols, rows)) = flags.slide_size {
        lines.push(format!("--slide-size {cols}x{rows}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pull recognized flags out of a token list. Unknown tokens are ignored.
///
/// `--cache-dir` is a per-invocation flag and is never saved.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--perf" {
            flags.perf = true;
            i += 1;
            continue;
        }
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (token, None),
        };
        if !takes_value(name) {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => value,
            None => {
                i += 1;
                match tokens.get(i) {
                    Some(value) => value.clone(),
                    None => break,
                }
            }
        };
        match name {
            "--background" => flags.background = Some(value),
            "--current-width" => flags.current_width = value.parse().ok(),
            "--next-width" => flags.next_width = value.parse().ok(),
            "--overview-width" => flags.overview_width = value.parse().ok(),
            "--layout-file" => flags.layout_file = Some(PathBuf::from(value)),
            "--clock-format" => flags.clock_format = Some(value),
            "--stopwatch-format" => flags.stopwatch_format = Some(value),
            "--slide-tty" => flags.slide_tty = Some(PathBuf::from(value)),
            "--slide-size" => flags.slide_size = parse_size(&value),
            "--cache-dir" => flags.cache_dir = Some(PathBuf::from(value)),
            "--debug-log" => flags.debug_log = Some(PathBuf::from(value)),
            _ => {}
        }
        i += 1;
    }
    flags
}

/// Parse `COLSxROWS`.
pub fn parse_size(s: &str) -> Option<(u16, u16)> {
    let (cols, rows) = s.split_once(['x', 'X'])?;
    let cols = cols.trim().parse().ok()?;
    let rows = rows.trim().parse().ok()?;
    (cols > 0 && rows > 0).then_some((cols, rows))
}
