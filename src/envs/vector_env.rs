use super::base_env::{ActionBounds, Environment, Info};
use crate::error::{Error, Result};
use rayon::prelude::*;

/// One slot's outcome from a pool step.
///
/// `obs` is always the observation the action led to, terminal or not.
/// When the pool resets a finished slot on its own, the first observation of
/// the new episode is carried in `reset_obs`.
#[derive(Debug, Clone)]
pub struct VecStep {
    pub obs: Vec<f32>,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
    pub reset_obs: Option<Vec<f32>>,
}

/// A pool of simulators advanced together.
///
/// `step` advances only the slots named in `ids` (strictly increasing), with
/// `actions` aligned to `ids`. A single simulator is a pool of size one.
pub trait VectorEnv {
    fn len(&self) -> usize;
    fn reset(&mut self) -> Result<Vec<Vec<f32>>>;
    fn reset_slot(&mut self, id: usize) -> Result<Vec<f32>>;
    fn step(&mut self, ids: &[usize], actions: &[Vec<f32>]) -> Result<Vec<VecStep>>;
    fn seed(&mut self, seed: u64);
    fn reset_after_done(&self) -> bool;
    fn observation_shape(&self) -> Vec<usize>;
    fn action_shape(&self) -> Vec<usize>;
    fn action_bounds(&self) -> ActionBounds;
}

fn check_envs<E>(envs: &[E]) -> Result<()> {
    if envs.is_empty() {
        return Err(Error::Argument(
            "an environment pool needs at least one simulator".to_string(),
        ));
    }
    Ok(())
}

fn check_step_args(n_envs: usize, ids: &[usize], actions: &[Vec<f32>]) -> Result<()> {
    if ids.len() != actions.len() {
        return Err(Error::Argument(format!(
            "{} slot ids but {} actions",
            ids.len(),
            actions.len()
        )));
    }
    if ids.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::Argument(
            "slot ids must be strictly increasing".to_string(),
        ));
    }
    if let Some(&id) = ids.iter().find(|&&id| id >= n_envs) {
        return Err(Error::Argument(format!(
            "slot {} out of range for a pool of {}",
            id, n_envs
        )));
    }
    Ok(())
}

fn step_slot<E: Environment>(env: &mut E, action: &[f32], reset_after_done: bool) -> Result<VecStep> {
    let step = env.step(action)?;
    let reset_obs = if step.done && reset_after_done {
        Some(env.reset()?)
    } else {
        None
    };
    Ok(VecStep {
        obs: step.obs,
        reward: step.reward,
        done: step.done,
        info: step.info,
        reset_obs,
    })
}

/// Steps its simulators one after another on the calling thread.
pub struct DummyVectorEnv<E: Environment> {
    envs: Vec<E>,
    reset_after_done: bool,
}

impl<E: Environment> DummyVectorEnv<E> {
    pub fn new(envs: Vec<E>, reset_after_done: bool) -> Result<Self> {
        check_envs(&envs)?;
        Ok(DummyVectorEnv {
            envs,
            reset_after_done,
        })
    }

    pub fn single(env: E, reset_after_done: bool) -> Self {
        DummyVectorEnv {
            envs: vec![env],
            reset_after_done,
        }
    }
}

impl<E: Environment> VectorEnv for DummyVectorEnv<E> {
    fn len(&self) -> usize {
        self.envs.len()
    }

    fn reset(&mut self) -> Result<Vec<Vec<f32>>> {
        self.envs.iter_mut().map(|env| env.reset()).collect()
    }

    fn reset_slot(&mut self, id: usize) -> Result<Vec<f32>> {
        match self.envs.get_mut(id) {
            Some(env) => env.reset(),
            None => Err(Error::Argument(format!("no slot {}", id))),
        }
    }

    fn step(&mut self, ids: &[usize], actions: &[Vec<f32>]) -> Result<Vec<VecStep>> {
        check_step_args(self.envs.len(), ids, actions)?;
        let reset_after_done = self.reset_after_done;
        ids.iter()
            .zip(actions)
            .map(|(&id, action)| step_slot(&mut self.envs[id], action, reset_after_done))
            .collect()
    }

    fn seed(&mut self, seed: u64) {
        for (i, env) in self.envs.iter_mut().enumerate() {
            env.seed(seed.wrapping_add(i as u64));
        }
    }

    fn reset_after_done(&self) -> bool {
        self.reset_after_done
    }

    fn observation_shape(&self) -> Vec<usize> {
        self.envs[0].observation_shape()
    }

    fn action_shape(&self) -> Vec<usize> {
        self.envs[0].action_shape()
    }

    fn action_bounds(&self) -> ActionBounds {
        self.envs[0].action_bounds()
    }
}

/// Steps its simulators concurrently on the rayon thread pool. Calls still
/// block until every requested slot has finished.
pub struct ParallelVectorEnv<E: Environment> {
    envs: Vec<E>,
    reset_after_done: bool,
}

impl<E: Environment> ParallelVectorEnv<E> {
    pub fn new(envs: Vec<E>, reset_after_done: bool) -> Result<Self> {
        check_envs(&envs)?;
        Ok(ParallelVectorEnv {
            envs,
            reset_after_done,
        })
    }
}

impl<E: Environment> VectorEnv for ParallelVectorEnv<E> {
    fn len(&self) -> usize {
        self.envs.len()
    }

    fn reset(&mut self) -> Result<Vec<Vec<f32>>> {
        self.envs.par_iter_mut().map(|env| env.reset()).collect()
    }

    fn reset_slot(&mut self, id: usize) -> Result<Vec<f32>> {
        match self.envs.get_mut(id) {
            Some(env) => env.reset(),
            None => Err(Error::Argument(format!("no slot {}", id))),
        }
    }

    fn step(&mut self, ids: &[usize], actions: &[Vec<f32>]) -> Result<Vec<VecStep>> {
        check_step_args(self.envs.len(), ids, actions)?;
        let mut slot_actions: Vec<Option<&Vec<f32>>> = vec![None; self.envs.len()];
        for (&id, action) in ids.iter().zip(actions) {
            slot_actions[id] = Some(action);
        }
        let reset_after_done = self.reset_after_done;
        self.envs
            .par_iter_mut()
            .zip(slot_actions.into_par_iter())
            .filter_map(|(env, action)| action.map(|a| step_slot(env, a, reset_after_done)))
            .collect()
    }

    fn seed(&mut self, seed: u64) {
        for (i, env) in self.envs.iter_mut().enumerate() {
            env.seed(seed.wrapping_add(i as u64));
        }
    }

    fn reset_after_done(&self) -> bool {
        self.reset_after_done
    }

    fn observation_shape(&self) -> Vec<usize> {
        self.envs[0].observation_shape()
    }

    fn action_shape(&self) -> Vec<usize> {
        self.envs[0].action_shape()
    }

    fn action_bounds(&self) -> ActionBounds {
        self.envs[0].action_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::base_env::Step;

    struct CountingEnv {
        count: usize,
        max_steps: usize,
        seed: u64,
    }

    impl CountingEnv {
        fn new(max_steps: usize) -> Self {
            CountingEnv {
                count: 0,
                max_steps,
                seed: 0,
            }
        }
    }

    impl Environment for CountingEnv {
        fn reset(&mut self) -> Result<Vec<f32>> {
            self.count = 0;
            Ok(vec![0.0])
        }

        fn step(&mut self, action: &[f32]) -> Result<Step> {
            if action[0].is_nan() {
                return Err(Error::environment("nan action"));
            }
            self.count += 1;
            Ok(Step {
                obs: vec![self.count as f32],
                reward: 1.0,
                done: self.count >= self.max_steps,
                info: Info::new(),
            })
        }

        fn seed(&mut self, seed: u64) {
            self.seed = seed;
        }

        fn observation_shape(&self) -> Vec<usize> {
            vec![1]
        }

        fn action_shape(&self) -> Vec<usize> {
            vec![1]
        }

        fn action_bounds(&self) -> ActionBounds {
            ActionBounds::symmetric(1, 1.0)
        }
    }

    #[test]
    fn test_dummy_vector_env_auto_reset() {
        let mut venv = DummyVectorEnv::new(vec![CountingEnv::new(2)], true).unwrap();
        venv.reset().unwrap();
        let first = venv.step(&[0], &[vec![0.0]]).unwrap();
        assert!(!first[0].done);
        assert!(first[0].reset_obs.is_none());

        let second = venv.step(&[0], &[vec![0.0]]).unwrap();
        assert!(second[0].done);
        assert_eq!(second[0].obs, vec![2.0]);
        assert_eq!(second[0].reset_obs, Some(vec![0.0]));
    }

    #[test]
    fn test_dummy_vector_env_without_auto_reset() {
        let mut venv = DummyVectorEnv::single(CountingEnv::new(1), false);
        venv.reset().unwrap();
        let steps = venv.step(&[0], &[vec![0.0]]).unwrap();
        assert!(steps[0].done);
        assert!(steps[0].reset_obs.is_none());
    }

    #[test]
    fn test_vector_env_rejects_bad_ids() {
        let mut venv =
            DummyVectorEnv::new(vec![CountingEnv::new(5), CountingEnv::new(5)], true).unwrap();
        assert!(matches!(
            venv.step(&[1, 0], &[vec![0.0], vec![0.0]]),
            Err(Error::Argument(_))
        ));
        assert!(matches!(
            venv.step(&[2], &[vec![0.0]]),
            Err(Error::Argument(_))
        ));
        assert!(matches!(venv.step(&[0], &[]), Err(Error::Argument(_))));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let envs: Vec<CountingEnv> = vec![];
        assert!(matches!(
            DummyVectorEnv::new(envs, true),
            Err(Error::Argument(_))
        ));
    }

    #[test]
    fn test_parallel_vector_env_steps_subset_in_order() {
        let envs = (0..4).map(|_| CountingEnv::new(10)).collect();
        let mut venv = ParallelVectorEnv::new(envs, true).unwrap();
        venv.reset().unwrap();
        venv.step(&[0, 1, 2, 3], &vec![vec![0.0]; 4]).unwrap();
        let steps = venv.step(&[1, 3], &vec![vec![0.0]; 2]).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].obs, vec![2.0]);
        assert_eq!(steps[1].obs, vec![2.0]);
        let steps = venv.step(&[0], &[vec![0.0]]).unwrap();
        assert_eq!(steps[0].obs, vec![2.0]);
    }

    #[test]
    fn test_parallel_vector_env_propagates_env_error() {
        let envs = (0..3).map(|_| CountingEnv::new(10)).collect();
        let mut venv = ParallelVectorEnv::new(envs, true).unwrap();
        venv.reset().unwrap();
        let result = venv.step(&[0, 2], &[vec![0.0], vec![f32::NAN]]);
        assert!(matches!(result, Err(Error::Environment(_))));
    }

    #[test]
    fn test_seed_offsets_per_slot() {
        let envs = (0..3).map(|_| CountingEnv::new(10)).collect();
        let mut venv = DummyVectorEnv::new(envs, true).unwrap();
        venv.seed(100);
        let seeds: Vec<u64> = venv.envs.iter().map(|e| e.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102]);
    }
}
