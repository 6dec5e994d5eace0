// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::Graph;
use crate::errors::{DagrunError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DagrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_task_graph(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(DagrunError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.threads == 0 {
        return Err(DagrunError::ConfigError(
            "[config].threads must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.config.name.trim().is_empty() {
        return Err(DagrunError::ConfigError(
            "[config].name must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_task_graph(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.cmd.trim().is_empty() {
            return Err(DagrunError::ConfigError(format!(
                "task '{}' has an empty `cmd`",
                name
            )));
        }
    }

    // Same checks the scheduler runs before a run, surfaced at load time.
    Graph::from_tasks(&cfg.config.name, cfg.config.threads, &cfg.task)?.validate()
}
