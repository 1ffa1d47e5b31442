use super::base_env::{ActionBounds, Environment, Info, Step};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ResetResponse {
    session_id: String,
    observation: Vec<f32>,
}

#[derive(Deserialize)]
struct StepResponse {
    observation: Vec<f32>,
    reward: f64,
    done: bool,
    #[serde(default)]
    info: Info,
}

/// Simulator hosted by an HTTP gym server.
///
/// `POST /reset {"env", "seed"}` opens a session and `POST /step
/// {"session_id", "action"}` advances it. The server does not describe its
/// spaces, so shapes and bounds are given up front.
///
/// Requests wait for the server indefinitely unless a timeout is set with
/// [`WebEnv::with_timeout`].
pub struct WebEnv {
    client: Client,
    timeout: Option<Duration>,
    base_url: String,
    env_name: String,
    observation_shape: Vec<usize>,
    action_bounds: ActionBounds,
    session_id: Option<String>,
    seed: Option<u64>,
}

impl WebEnv {
    pub fn new(
        base_url: &str,
        env_name: &str,
        observation_shape: Vec<usize>,
        action_bounds: ActionBounds,
    ) -> Result<Self> {
        Ok(WebEnv {
            client: build_client(None)?,
            timeout: None,
            base_url: base_url.trim_end_matches('/').to_string(),
            env_name: env_name.to_string(),
            observation_shape,
            action_bounds,
            session_id: None,
            seed: None,
        })
    }

    /// Fails any request the server takes longer than `timeout` to answer.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(Some(timeout))?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

fn build_client(timeout: Option<Duration>) -> Result<Client> {
    // The blocking client applies a 30s default unless told otherwise.
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(Error::environment)
}

impl Environment for WebEnv {
    fn reset(&mut self) -> Result<Vec<f32>> {
        let resp = self
            .client
            .post(format!("{}/reset", self.base_url))
            .json(&serde_json::json!({ "env": self.env_name, "seed": self.seed }))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(Error::environment)?
            .json::<ResetResponse>()
            .map_err(Error::environment)?;
        // Seed only the first episode so later resets differ.
        self.seed = None;
        self.session_id = Some(resp.session_id);
        Ok(resp.observation)
    }

    fn step(&mut self, action: &[f32]) -> Result<Step> {
        let session_id = self
            .session_id
            .as_ref()
            .ok_or_else(|| Error::environment("step called before reset"))?;
        let resp = self
            .client
            .post(format!("{}/step", self.base_url))
            .json(&serde_json::json!({ "session_id": session_id, "action": action }))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(Error::environment)?
            .json::<StepResponse>()
            .map_err(Error::environment)?;
        Ok(Step {
            obs: resp.observation,
            reward: resp.reward,
            done: resp.done,
            info: resp.info,
        })
    }

    fn seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    fn observation_shape(&self) -> Vec<usize> {
        self.observation_shape.clone()
    }

    fn action_shape(&self) -> Vec<usize> {
        vec![self.action_bounds.len()]
    }

    fn action_bounds(&self) -> ActionBounds {
        self.action_bounds.clone()
    }
}
