//! Run evaluation episodes with a fixed policy.
//!
//! Every episode is bounded by a step cap so that an environment which never
//! signals the end of an episode cannot stall the caller. An episode reaching
//! the cap counts as a loss and contributes the cap as its length.
use crate::{Combatants, Env, Policy};
use anyhow::Result;
mod batch;
pub use batch::{EpisodeOutcome, EvaluationBatch};

/// Result of playing a single episode, without judging it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeRun {
    /// Cumulative reward.
    pub reward: f32,

    /// Number of steps taken.
    pub length: usize,

    /// `false` if the episode was cut at the step cap.
    pub is_done: bool,
}

/// Plays one episode from a reset with index `ix`, at most `max_steps` steps.
///
/// An episode that neither terminates nor is truncated within `max_steps` steps
/// is cut with `length == max_steps` and `is_done == false`.
pub fn play_episode<E, P>(
    env: &mut E,
    policy: &mut P,
    ix: usize,
    max_steps: usize,
    deterministic: bool,
) -> Result<EpisodeRun>
where
    E: Env,
    P: Policy<E>,
{
    let mut obs = env.reset_with_index(ix)?;
    let mut reward = 0f32;

    for t in 0..max_steps {
        let act = policy.predict(&obs, deterministic);
        let (step, _) = env.step(&act);
        reward += step.reward;
        if step.is_done() {
            return Ok(EpisodeRun {
                reward,
                length: t + 1,
                is_done: true,
            });
        }
        obs = step.obs;
    }

    Ok(EpisodeRun {
        reward,
        length: max_steps,
        is_done: false,
    })
}

/// Plays one episode and judges it by the opponent health at its end.
///
/// # Arguments
///
/// * `env` - the environment, reset with [`Env::reset_with_index`] before the
///   first step.
/// * `policy` - takes every action of the episode.
/// * `ix` - index handed to the reset, e.g. the episode number in a pass.
/// * `max_steps` - step cap of the episode.
/// * `deterministic` - passed to [`Policy::predict`].
///
/// # Returns
///
/// The [`EpisodeOutcome`]: the episode is a win iff it ended within the cap and
/// [`Combatants::read_health`] then reports no opponent health left. An episode
/// cut at the cap is a loss with `capped == true`, its partial cumulative reward
/// and `max_steps` as its length. Errors of the reset are returned.
pub fn run_episode<E, P>(
    env: &mut E,
    policy: &mut P,
    ix: usize,
    max_steps: usize,
    deterministic: bool,
) -> Result<EpisodeOutcome>
where
    E: Env + Combatants,
    P: Policy<E>,
{
    let run = play_episode(env, policy, ix, max_steps, deterministic)?;
    let win = run.is_done && env.read_health().is_win();
    Ok(EpisodeOutcome {
        win,
        reward: run.reward,
        length: run.length,
        capped: !run.is_done,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{ScriptedAgent, ScriptedEnv, ScriptedEnvConfig};

    fn outcome(config: ScriptedEnvConfig, max_steps: usize) -> Result<EpisodeOutcome> {
        let mut env = ScriptedEnv::build(&config, 0)?;
        let mut agent = ScriptedAgent::default();
        run_episode(&mut env, &mut agent, 0, max_steps, false)
    }

    #[test]
    fn zero_opponent_health_is_a_win() -> Result<()> {
        let o = outcome(
            ScriptedEnvConfig::default().opponent_health_at_end(vec![0.0]),
            100,
        )?;
        assert!(o.win);
        assert!(!o.capped);
        Ok(())
    }

    #[test]
    fn positive_opponent_health_is_a_loss() -> Result<()> {
        let o = outcome(
            ScriptedEnvConfig::default().opponent_health_at_end(vec![1.0]),
            100,
        )?;
        assert!(!o.win);
        Ok(())
    }

    #[test]
    fn length_counts_steps_of_natural_termination() -> Result<()> {
        let o = outcome(
            ScriptedEnvConfig::default()
                .episode_len(7)
                .reward_per_step(0.5),
            100,
        )?;
        assert_eq!(o.length, 7);
        assert_eq!(o.reward, 3.5);
        Ok(())
    }

    #[test]
    fn capped_episode_is_a_loss_with_cap_length() -> Result<()> {
        let o = outcome(ScriptedEnvConfig::default().never_done(), 25)?;
        assert!(o.capped);
        assert!(!o.win);
        assert_eq!(o.length, 25);
        assert_eq!(o.reward, 25.0);
        Ok(())
    }

    #[test]
    fn termination_on_last_allowed_step_is_not_capped() -> Result<()> {
        let o = outcome(ScriptedEnvConfig::default().episode_len(25), 25)?;
        assert!(!o.capped);
        assert!(o.win);
        assert_eq!(o.length, 25);
        Ok(())
    }
}
