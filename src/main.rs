use anyhow::{bail, Context, Result};
use ddpgx::agents::{BaseAgent, DDPG};
use ddpgx::collector::Collector;
use ddpgx::config::TrainConfig;
use ddpgx::envs::{Environment, ParallelVectorEnv, Pendulum, TargetReach, VectorEnv, WebEnv};
use ddpgx::memory::ReplayBuffer;
use ddpgx::metrics::CsvSink;
use ddpgx::trainer::Trainer;
use std::env;
use tch::Device;
use tracing::info;
use ulid::Ulid;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    ddpgx::load_cuda_dlls()?;

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<String> = None;
    let mut env_value: Option<String> = None;
    let mut url: Option<String> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config_path = iter.next().cloned(),
            "--env" => env_value = iter.next().cloned(),
            "--url" => url = iter.next().cloned(),
            other => bail!("unknown argument {}", other),
        }
    }

    let mut config = match &config_path {
        Some(path) => TrainConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => TrainConfig::default(),
    };
    if let Some(task) = env_value {
        config.task = task;
    }
    config.validate()?;

    let max_steps = config.max_episode_steps;
    match (config.task.as_str(), url) {
        ("pendulum", None) => run(&config, |_| Ok(Pendulum::new(max_steps))),
        ("target_reach", None) => run(&config, |_| Ok(TargetReach::new(0.5, max_steps))),
        (name, Some(url)) => {
            // The gym server hosts a pendulum but does not report its spaces.
            let local = Pendulum::new(max_steps);
            let observation_shape = local.observation_shape();
            let action_bounds = local.action_bounds();
            run(&config, |_| {
                WebEnv::new(&url, name, observation_shape.clone(), action_bounds.clone())
            })
        }
        (other, None) => bail!("unknown task {}", other),
    }
}

fn run<E, F>(config: &TrainConfig, make_env: F) -> Result<()>
where
    E: Environment,
    F: Fn(usize) -> ddpgx::Result<E>,
{
    let run_id = Ulid::new();
    let device = Device::cuda_if_available();
    info!(%run_id, task = %config.task, seed = config.seed, ?device, "starting DDPG");
    tch::manual_seed(config.seed as i64);

    let train_envs = (0..config.training_num)
        .map(&make_env)
        .collect::<ddpgx::Result<Vec<_>>>()?;
    let test_envs = (0..config.test_num)
        .map(&make_env)
        .collect::<ddpgx::Result<Vec<_>>>()?;
    let mut train_envs = ParallelVectorEnv::new(train_envs, true)?;
    let mut test_envs = ParallelVectorEnv::new(test_envs, false)?;
    train_envs.seed(config.seed);
    test_envs.seed(config.seed);

    let observation_size = train_envs.observation_shape().iter().product();
    let mut agent = DDPG::from_config(
        config,
        observation_size,
        train_envs.action_bounds(),
        device,
    )?;

    let buffer = ReplayBuffer::new(config.buffer_size, config.seed);
    let mut train_collector = Collector::new(train_envs, Some(buffer))?;
    let mut test_collector = Collector::new(test_envs, None)?;

    let mut trainer = Trainer::from_config(config);
    if let Some(path) = &config.log_path {
        trainer = trainer.with_metrics(Box::new(CsvSink::create(path)?));
    }
    let stats = trainer.train(&mut agent, &mut train_collector, &mut test_collector)?;

    if let Some(dir) = &config.checkpoint_dir {
        let dir = dir.join(run_id.to_string());
        agent.save(&dir.to_string_lossy())?;
        info!(dir = %dir.display(), "saved checkpoint");
    }

    println!(
        "Collect {} frame / {} episode during training and {} frame / {} episode during test in {:.2}s, best_reward: {}, speed: {:.2}it/s",
        stats.train_step,
        stats.train_episode,
        stats.test_step,
        stats.test_episode,
        stats.duration.as_secs_f64(),
        stats.best_reward,
        stats.speed()
    );
    Ok(())
}
