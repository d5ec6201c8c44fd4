use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    /// Open read-write. Only ever taken from the command line.
    pub writable: bool,
    pub columns: Option<u64>,
    pub no_mmap: bool,
    pub ascii: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            writable: self.writable || other.writable,
            columns: other.columns.or(self.columns),
            no_mmap: self.no_mmap || other.no_mmap,
            ascii: self.ascii || other.ascii,
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("hexless").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("hexless")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("hexless").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("hexless")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".hexlessrc")
}

/// Read saved defaults. A missing file yields the defaults.
///
/// `--writable` is ignored here so a config file can never make a session
/// read-write behind the user's back.
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
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    let flags = parse_flag_tokens(&tokens);
    if flags.writable {
        tracing::warn!(path = %path.display(), "ignoring --writable in config file");
    }
    Ok(ConfigFlags {
        writable: false,
        ..flags
    })
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# hexless defaults (saved with --save)".to_string());
    if let Some(columns) = flags.columns {
        lines.push(format!("--columns {columns}"));
    }
    if flags.no_mmap {
        lines.push("--no-mmap".to_string());
    }
    if flags.ascii {
        lines.push("--ascii".to_string());
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
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

/// Extract known flags from argv or config file tokens; anything else is skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "-w" | "--writable" => flags.writable = true,
            "--no-mmap" => flags.no_mmap = true,
            "--ascii" => flags.ascii = true,
            "-c" | "--columns" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.columns = parse_columns(next);
                    i += 1;
                }
            }
            "--log-file" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.log_file = Some(PathBuf::from(next));
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--columns=") {
                    flags.columns = parse_columns(value);
                } else if let Some(value) = token.strip_prefix("--log-file=") {
                    flags.log_file = Some(PathBuf::from(value));
                }
            }
        }
        i += 1;
    }
    flags
}

/// `0` means "fit the terminal", same as leaving the flag out.
fn parse_columns(s: &str) -> Option<u64> {
    s.parse::<u64>().ok().filter(|&c| c > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "hexless",
            "-w",
            "--columns",
            "16",
            "--no-mmap",
            "--ascii",
            "--log-file=hexless.log",
            "dump.bin",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.writable);
        assert_eq!(flags.columns, Some(16));
        assert!(flags.no_mmap);
        assert!(flags.ascii);
        assert_eq!(flags.log_file, Some(PathBuf::from("hexless.log")));
    }

    #[test]
    fn test_zero_or_invalid_columns_mean_auto() {
        assert_eq!(parse_flag_tokens(&tokens(&["-c", "0"])).columns, None);
        assert_eq!(parse_flag_tokens(&tokens(&["--columns=abc"])).columns, None);
        assert_eq!(parse_flag_tokens(&tokens(&["-c", "8"])).columns, Some(8));
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            ascii: true,
            columns: Some(8),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            no_mmap: true,
            columns: Some(32),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.ascii);
        assert!(merged.no_mmap);
        assert_eq!(merged.columns, Some(32));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hexless").join("config");
        let flags = ConfigFlags {
            writable: true,
            columns: Some(24),
            no_mmap: true,
            ascii: true,
            log_file: Some(PathBuf::from("hexless.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(!saved.contains("--writable"));

        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(
            loaded,
            ConfigFlags {
                writable: false,
                ..flags
            }
        );

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_writable_in_config_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".hexlessrc");
        std::fs::write(&path, "--writable\n--ascii\n").unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert!(!loaded.writable);
        assert!(loaded.ascii);
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("nope")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
