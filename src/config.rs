use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::fibonacci::{FibError, Strategy};

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pin_cores: bool,
    pub num_workers: usize,
    pub bind_address: String,
    pub results_dir: String,
    pub naive_recursive_limit: u64, // Naive recursion is O(2^n), larger n would stall a worker
    pub big_n_limit: u64, // BigUint results grow linearly in n, unbounded n exhausts memory
    pub default_repetitions: u32,
    pub shuffle_jobs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pin_cores: false,
            num_workers: 2,
            bind_address: "[::]:8080".to_string(),
            results_dir: "results".to_string(),
            naive_recursive_limit: 35,
            big_n_limit: 100_000,
            default_repetitions: 10,
            shuffle_jobs: false,
        }
    }
}

impl Config {
    /// Clamps the worker count to `[1, available_cores]`.
    pub fn clamp_workers(mut self, available_cores: usize) -> Self {
        self.num_workers = self.num_workers.clamp(1, available_cores.max(1));
        self
    }

    pub fn check_naive_limit(&self, strategy: Strategy, n: u64) -> Result<(), FibError> {
        if strategy == Strategy::NaiveRecursive && n > self.naive_recursive_limit {
            return Err(FibError::NaiveLimitExceeded {
                n,
                limit: self.naive_recursive_limit,
            });
        }
        Ok(())
    }

    pub fn check_big_limit(&self, n: u64) -> Result<(), FibError> {
        if n > self.big_n_limit {
            return Err(FibError::BigLimitExceeded {
                n,
                limit: self.big_n_limit,
            });
        }
        Ok(())
    }
}

pub fn load_config() -> Config {
    load_config_from(CONFIG_FILE)
}

pub fn load_config_from(path: impl AsRef<Path>) -> Config {
    //Loads configuration file. Examples:
    //    1) pin_cores=true and num_workers=2 pins the benchmark jobs to 2 cores
    //    2) pin_cores=false lets the OS move jobs across cores
    //    3) shuffle_jobs=true randomizes the run order of a submitted batch
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(config_content) => match serde_yaml::from_str::<Config>(&config_content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                Config::default()
            }
        },
        Err(_) => {
            warn!("{} not found, using defaults", path.display());
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("fib-bench-{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_from("/nonexistent/config.yaml");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let path = write_temp("partial.yaml", "pin_cores: true\nnum_workers: 4\n");
        let config = load_config_from(&path);
        assert_eq!(
            config,
            Config {
                pin_cores: true,
                num_workers: 4,
                ..Config::default()
            }
        );
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = write_temp("bad.yaml", "num_workers: [not a number\n");
        assert_eq!(load_config_from(&path), Config::default());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn limits_only_reject_past_their_bound() {
        let config = Config {
            naive_recursive_limit: 20,
            big_n_limit: 1_000,
            ..Config::default()
        };
        assert_eq!(config.check_naive_limit(Strategy::NaiveRecursive, 20), Ok(()));
        assert_eq!(
            config.check_naive_limit(Strategy::NaiveRecursive, 21),
            Err(FibError::NaiveLimitExceeded { n: 21, limit: 20 })
        );
        assert_eq!(config.check_naive_limit(Strategy::FastMatrix, 90), Ok(()));
        assert_eq!(config.check_big_limit(1_000), Ok(()));
        assert_eq!(
            config.check_big_limit(u64::MAX),
            Err(FibError::BigLimitExceeded { n: u64::MAX, limit: 1_000 })
        );
    }

    #[test]
    fn workers_are_clamped() {
        let config = Config {
            num_workers: 0,
            ..Config::default()
        };
        assert_eq!(config.clamp_workers(8).num_workers, 1);
        let config = Config {
            num_workers: 64,
            ..Config::default()
        };
        assert_eq!(config.clamp_workers(8).num_workers, 8);
    }
}
