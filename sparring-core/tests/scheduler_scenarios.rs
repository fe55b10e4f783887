use anyhow::Result;
use sparring_core::{
    dummy::{ScriptedAgent, ScriptedEnv, ScriptedEnvConfig},
    record::{BufferedRecorder, NullRecorder},
    Env, EvalScheduler, Monitor, SchedulerConfig, Trainer, TrainerConfig,
};
use std::{fs, path::Path};
use tempdir::TempDir;

fn sorted_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = vec![];
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

fn first_cells(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(|l| l.split(',').next().unwrap_or_default().to_string())
        .collect())
}

#[test]
fn checkpoint_video_and_evaluation_over_ten_steps() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp = TempDir::new("scenario")?;
    let base = tmp.path();
    let config = SchedulerConfig::default()
        .checkpoint_dir(base.join("models"))
        .video_dir(base.join("videos"))
        .raw_data_dir(base.join("raw-data"))
        .checkpoint_interval(3)
        .video_interval(100)
        .evaluation_interval(5)
        .episodes_per_evaluation(2)
        .max_episode_steps(50)
        .lengths_history(base.join("Evaluation_lengths.csv"), vec!["WoodMan".into(), "".into()])
        .rewards_history(
            base.join("Evaluation_rewards.csv"),
            vec!["WoodMan (0.5, 0.5)".into(), "50".into()],
        );
    let env_config = ScriptedEnvConfig::default().episode_len(6);
    let eval_env = ScriptedEnv::build(&env_config, 1)?;
    let mut scheduler = EvalScheduler::build(config, eval_env)?;
    let mut train_env = Monitor::<ScriptedEnv>::build(&env_config, 0)?;
    let mut agent = ScriptedAgent::default();
    let mut trainer = Trainer::build(TrainerConfig::default().total_timesteps(10));

    trainer.train(&mut train_env, &mut agent, &mut scheduler, &mut NullRecorder::new())?;

    assert_eq!(
        sorted_files(&base.join("models"))?,
        vec!["3.model", "6.model", "9.model"]
    );
    assert!(sorted_files(&base.join("videos"))?.is_empty());
    assert_eq!(first_cells(&base.join("raw-data/wins.csv"))?, vec!["5", "10"]);
    assert_eq!(first_cells(&base.join("raw-data/rewards.csv"))?, vec!["5", "10"]);
    assert_eq!(scheduler.mean_lengths(), &[6.0, 6.0]);
    assert_eq!(scheduler.mean_rewards(), &[6.0, 6.0]);

    let lengths = fs::read_to_string(base.join("Evaluation_lengths.csv"))?;
    assert_eq!(lengths.lines().count(), 1);
    assert!(lengths.trim_end().ends_with(",6.0,6.0"));
    let rewards = fs::read_to_string(base.join("Evaluation_rewards.csv"))?;
    assert_eq!(rewards.lines().count(), 1);
    assert!(rewards.starts_with("'WoodMan (0.5, 0.5)',"));
    Ok(())
}

#[test]
fn checkpoints_follow_floor_of_total_over_interval() -> Result<()> {
    for (total, interval) in [(10, 1), (10, 4), (7, 7), (6, 7), (25, 5)] {
        let tmp = TempDir::new("checkpoints")?;
        let models = tmp.path().join("models");
        let config = SchedulerConfig::default()
            .checkpoint_dir(&models)
            .checkpoint_interval(interval);
        let env_config = ScriptedEnvConfig::default();
        let mut scheduler = EvalScheduler::build(config, ScriptedEnv::build(&env_config, 0)?)?;
        let mut env = ScriptedEnv::build(&env_config, 0)?;
        let mut agent = ScriptedAgent::default();
        let mut trainer = Trainer::build(TrainerConfig::default().total_timesteps(total));

        trainer.train(&mut env, &mut agent, &mut scheduler, &mut NullRecorder::new())?;

        assert_eq!(sorted_files(&models)?.len(), total / interval);
    }
    Ok(())
}

#[test]
fn non_terminating_evaluation_is_capped() -> Result<()> {
    let tmp = TempDir::new("capped")?;
    let config = SchedulerConfig::default()
        .raw_data_dir(tmp.path())
        .evaluation_interval(2)
        .episodes_per_evaluation(3)
        .max_episode_steps(40);
    let eval_env = ScriptedEnv::build(&ScriptedEnvConfig::default().never_done(), 0)?;
    let mut scheduler = EvalScheduler::build(config, eval_env)?
        .recorder(Box::new(BufferedRecorder::new()));
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
    let mut agent = ScriptedAgent::default();
    let mut trainer = Trainer::build(TrainerConfig::default().total_timesteps(2));

    trainer.train(&mut env, &mut agent, &mut scheduler, &mut NullRecorder::new())?;

    assert_eq!(scheduler.mean_lengths(), &[40.0]);
    let wins = fs::read_to_string(tmp.path().join("wins.csv"))?;
    assert!(wins.trim_end().ends_with(",0,0,0"));
    Ok(())
}
