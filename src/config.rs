use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    Gaussian,
    OrnsteinUhlenbeck,
}

/// Every recognized option of a training run. Missing JSON fields fall back
/// to the defaults below, which are tuned for the pendulum task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub task: String,
    pub seed: u64,
    pub buffer_size: usize,
    pub actor_lr: f64,
    pub actor_wd: f64,
    pub critic_lr: f64,
    pub critic_wd: f64,
    pub gamma: f64,
    pub tau: f64,
    pub exploration_noise: f64,
    pub noise: NoiseKind,
    pub epoch: usize,
    pub step_per_epoch: usize,
    pub collect_per_step: usize,
    pub batch_size: usize,
    pub layer_num: usize,
    pub hidden_size: i64,
    pub training_num: usize,
    pub test_num: usize,
    pub max_episode_steps: usize,
    /// Stop as soon as the best evaluation reward reaches this value.
    pub stop_reward: Option<f64>,
    /// CSV file receiving every recorded metric.
    pub log_path: Option<PathBuf>,
    /// Directory the trained networks are written to.
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            task: "pendulum".to_string(),
            seed: 1626,
            buffer_size: 20000,
            actor_lr: 1e-4,
            actor_wd: 0.0,
            critic_lr: 1e-3,
            critic_wd: 1e-2,
            gamma: 0.99,
            tau: 0.005,
            exploration_noise: 0.1,
            noise: NoiseKind::Gaussian,
            epoch: 100,
            step_per_epoch: 2400,
            collect_per_step: 1,
            batch_size: 128,
            layer_num: 1,
            hidden_size: 128,
            training_num: 1,
            test_num: 100,
            max_episode_steps: 200,
            stop_reward: Some(-250.0),
            log_path: None,
            checkpoint_dir: None,
        }
    }
}

impl TrainConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: TrainConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(Error::Config(msg)) };
        if !(0.0..1.0).contains(&self.gamma) {
            return fail(format!("gamma must be in [0, 1), got {}", self.gamma));
        }
        if !(self.tau > 0.0 && self.tau <= 1.0) {
            return fail(format!("tau must be in (0, 1], got {}", self.tau));
        }
        if !(self.exploration_noise >= 0.0 && self.exploration_noise.is_finite()) {
            return fail(format!(
                "exploration_noise must be a non-negative number, got {}",
                self.exploration_noise
            ));
        }
        if self.batch_size == 0 {
            return fail("batch_size must be positive".to_string());
        }
        if self.buffer_size < self.batch_size {
            return fail(format!(
                "buffer_size {} is smaller than batch_size {}",
                self.buffer_size, self.batch_size
            ));
        }
        if self.collect_per_step == 0 || self.step_per_epoch < self.collect_per_step {
            return fail(format!(
                "need 0 < collect_per_step <= step_per_epoch, got {} and {}",
                self.collect_per_step, self.step_per_epoch
            ));
        }
        if self.training_num == 0 || self.test_num == 0 {
            return fail("training_num and test_num must be positive".to_string());
        }
        if self.hidden_size <= 0 {
            return fail("hidden_size must be positive".to_string());
        }
        if self.max_episode_steps == 0 {
            return fail("max_episode_steps must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = TrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_size, 20000);
        assert_eq!(config.critic_wd, 1e-2);
        assert_eq!(config.noise, NoiseKind::Gaussian);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainConfig =
            serde_json::from_str(r#"{"tau": 0.01, "noise": "ornstein_uhlenbeck", "epoch": 5}"#)
                .unwrap();
        assert_eq!(config.tau, 0.01);
        assert_eq!(config.epoch, 5);
        assert_eq!(config.noise, NoiseKind::OrnsteinUhlenbeck);
        assert_eq!(config.batch_size, 128);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            TrainConfig {
                gamma: 1.0,
                ..Default::default()
            },
            TrainConfig {
                tau: 0.0,
                ..Default::default()
            },
            TrainConfig {
                buffer_size: 10,
                batch_size: 64,
                ..Default::default()
            },
            TrainConfig {
                collect_per_step: 0,
                ..Default::default()
            },
            TrainConfig {
                test_num: 0,
                ..Default::default()
            },
            TrainConfig {
                exploration_noise: -1.0,
                ..Default::default()
            },
        ];
        for config in cases.iter() {
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"task": "target_reach", "batch_size": 64}}"#).unwrap();
        let config = TrainConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.task, "target_reach");
        assert_eq!(config.batch_size, 64);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{"gamma": 2.0}}"#).unwrap();
        assert!(matches!(
            TrainConfig::from_json_file(bad.path()),
            Err(Error::Config(_))
        ));
    }
}
