use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest
/// priority.  Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. System-wide default
    paths.push(PathBuf::from("/etc/zilmon/config.toml"));

    // 2. XDG / home
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/zilmon/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("zilmon/config.toml"));
    }

    // 3. Workspace-local
    paths.push(PathBuf::from(".zilmon/config.toml"));
    paths.push(PathBuf::from("zilmon.toml"));

    paths
}

/// Load configuration by merging all discovered TOML files, lowest priority
/// first: the search paths above, then `ZILMON_CONFIG` (if set), then the
/// explicit `extra` path (the `--config` CLI flag).
///
/// Discovered layers that are missing are skipped silently; the env var and
/// the explicit path are requests for a specific file, so a read or parse
/// failure there is an error.
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut merged, read_layer(&path)?);
        }
    }

    if let Ok(env_path) = std::env::var("ZILMON_CONFIG") {
        let path = PathBuf::from(env_path);
        debug!(path = %path.display(), "loading ZILMON_CONFIG layer");
        merge_toml(&mut merged, read_layer(&path)?);
    }

    if let Some(path) = extra {
        debug!(path = %path.display(), "loading explicit config");
        merge_toml(&mut merged, read_layer(path)?);
    }

    let config: Config = merged.try_into().unwrap_or_default();
    Ok(config)
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                let entry = d.entry(k).or_insert(toml::Value::Table(toml::map::Map::new()));
                merge_toml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn val(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val(r#"x = 1"#);
        let src = val(r#"x = 2"#);
        merge_toml(&mut dst, src);
        assert_eq!(dst["x"].as_integer(), Some(2));
    }

    #[test]
    fn merge_preserves_keys_not_in_src() {
        let mut dst = val(r#"a = 1
b = 2"#);
        let src = val(r#"b = 99"#);
        merge_toml(&mut dst, src);
        assert_eq!(dst["a"].as_integer(), Some(1));
        assert_eq!(dst["b"].as_integer(), Some(99));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val(r#"[downstream]
command = "monitoring-mcp"
project = "projects/zq2-mainnet""#);
        let src = val(r#"[downstream]
project = "projects/zq2-testnet""#);
        merge_toml(&mut dst, src);
        assert_eq!(dst["downstream"]["command"].as_str(), Some("monitoring-mcp"));
        assert_eq!(
            dst["downstream"]["project"].as_str(),
            Some("projects/zq2-testnet")
        );
    }

    #[test]
    fn load_missing_explicit_path_is_an_error() {
        let result = load(Some(Path::new("/tmp/zilmon_nonexistent_config_xyz.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_with_no_extra_path_returns_defaults() {
        let cfg = load(None).unwrap();
        assert_eq!(cfg.downstream.query_tool, "list_time_series");
    }

    #[test]
    fn load_explicit_file_overrides_defaults() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"[downstream]
command = "fake-mcp"
project = "projects/test""#
        )
        .unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.downstream.command, "fake-mcp");
        assert_eq!(cfg.downstream.project, "projects/test");
    }
}
