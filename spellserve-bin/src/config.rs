use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use spellserve::registry::Registry;
use spellserve::tokenizer::{WordSplitter, DEFAULT_WORD_PATTERN};

#[derive(Debug, Parser)]
#[command(
    name = "spellserve",
    version,
    about = "HTTP server managing named spellchecking dictionaries"
)]
pub struct Config {
    /// Directory holding dictionary records and alias metadata
    #[arg(long, env = "SPELLCHECKER_DIR")]
    pub dir: PathBuf,

    /// Address to listen on
    #[arg(long, env = "SPELLCHECKER_HTTP_ADDR", default_value = "localhost:8011")]
    pub addr: String,

    /// Period between automatic saves, e.g. "30s" or "5m"; zero disables them
    #[arg(
        long,
        env = "SPELLCHECKER_AUTOSAVE_INTERVAL",
        value_parser = humantime::parse_duration,
        default_value = "0s"
    )]
    pub autosave_interval: Duration,

    /// Regular expression matching a single word
    #[arg(long, env = "SPELLCHECKER_WORD_SPLIT_REGEXP", default_value = DEFAULT_WORD_PATTERN)]
    pub word_split_regexp: String,

    /// Log filter: error, warn, info, debug or trace
    #[arg(long, env = "SPELLCHECKER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Creates the storage directory if needed and loads it.
    pub fn open_registry(&self) -> anyhow::Result<Registry> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("unable to create dir {}", self.dir.display()))?;

        Registry::open(&self.dir).context("unable to open dictionary registry")
    }

    pub fn word_splitter(&self) -> anyhow::Result<WordSplitter> {
        WordSplitter::new(&self.word_split_regexp).context("invalid SPELLCHECKER_WORD_SPLIT_REGEXP")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["spellserve", "--dir", "/tmp/dicts"]).unwrap();

        assert_eq!(config.addr, "localhost:8011");
        assert_eq!(config.autosave_interval, Duration::ZERO);
        assert_eq!(config.word_split_regexp, DEFAULT_WORD_PATTERN);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn parses_durations() {
        let config = Config::try_parse_from([
            "spellserve",
            "--dir",
            "/tmp/dicts",
            "--autosave-interval",
            "5m",
        ])
        .unwrap();

        assert_eq!(config.autosave_interval, Duration::from_secs(300));
        assert!(Config::try_parse_from([
            "spellserve",
            "--dir",
            "/tmp/dicts",
            "--autosave-interval",
            "soon",
        ])
        .is_err());
    }

    #[test]
    fn rejects_bad_word_pattern() {
        let config = Config::try_parse_from([
            "spellserve",
            "--dir",
            "/tmp/dicts",
            "--word-split-regexp",
            "(",
        ])
        .unwrap();

        assert!(config.word_splitter().is_err());
    }

    #[test]
    fn creates_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("nested").join("store");
        let config = Config::try_parse_from([
            OsStr::new("spellserve"),
            OsStr::new("--dir"),
            store.as_os_str(),
        ])
        .unwrap();

        let registry = config.open_registry().unwrap();
        assert!(store.is_dir());
        assert!(registry.list().is_empty());
    }
}
