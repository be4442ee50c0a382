//! Cooperative timers advanced by simulated time.
//!
//! Nothing runs concurrently: [`Timers::advance`] returns the tasks that came due
//! and the caller dispatches them one after another. Timers are cancelled by handle
//! or expire on their own (one-shot, or repeating with a bounded lifetime).

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

/// Everything the game ever schedules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerTask {
    /// Re-read challenge counters.
    ChallengePoll,
    /// Regenerate challenges if the calendar day changed.
    ChallengeRefresh,
    /// Sample tower height (tower mode).
    TowerPoll,
    /// Pick a new random gravity direction (chaos mode).
    ChaosShift,
    /// End a freeze, restoring the captured time scale.
    FreezeRelease { restore: f32 },
    /// Bleed off excess spin after gluing.
    SpinDamp,
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    task: TimerTask,
    remaining: f32,
    period: Option<f32>,
    lifetime: Option<f32>,
}

const MIN_PERIOD: f32 = 0.001;

#[derive(Debug)]
pub struct Timers {
    timers: Vec<Timer>,
    next_id: u32,
}

impl Timers {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// Run `task` once after `delay` seconds.
    pub fn after(&mut self, delay: f32, task: TimerTask) -> TimerId {
        self.insert(task, delay.max(0.0), None, None)
    }

    /// Run `task` every `period` seconds until cancelled.
    pub fn every(&mut self, period: f32, task: TimerTask) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(task, period, Some(period), None)
    }

    /// Run `task` every `period` seconds, for `lifetime` seconds in total.
    pub fn every_for(&mut self, period: f32, lifetime: f32, task: TimerTask) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(task, period, Some(period), Some(lifetime.max(0.0)))
    }

    /// Cancel a timer. Returns `false` if it already fired or expired.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Seconds until the timer next fires.
    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.remaining)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Move time forward by `dt` seconds and collect the tasks that came due.
    pub fn advance(&mut self, dt: f32) -> Vec<TimerTask> {
        let mut fired = Vec::new();
        let dt = dt.max(0.0);

        for timer in self.timers.iter_mut() {
            let mut budget = dt;
            if let Some(lifetime) = timer.lifetime.as_mut() {
                budget = budget.min(*lifetime);
                *lifetime -= dt;
            }
            timer.remaining -= budget;
            while timer.remaining <= 0.0 {
                fired.push(timer.task);
                match timer.period {
                    Some(period) => timer.remaining += period,
                    None => break,
                }
            }
        }

        self.timers.retain(|t| {
            let expired = t.lifetime.is_some_and(|l| l <= 0.0);
            let spent = t.period.is_none() && t.remaining <= 0.0;
            !expired && !spent
        });
        fired
    }

    fn insert(
        &mut self,
        task: TimerTask,
        remaining: f32,
        period: Option<f32>,
        lifetime: Option<f32>,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            task,
            remaining,
            period,
            lifetime,
        });
        id
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once() {
        let mut timers = Timers::new();
        let id = timers.after(1.0, TimerTask::ChaosShift);
        assert!(timers.advance(0.5).is_empty());
        assert_eq!(timers.advance(0.5), vec![TimerTask::ChaosShift]);
        assert!(!timers.is_live(id));
        assert!(timers.advance(5.0).is_empty());
    }

    #[test]
    fn repeating_fires_each_period() {
        let mut timers = Timers::new();
        timers.every(2.0, TimerTask::ChallengePoll);
        assert_eq!(timers.advance(1.0).len(), 0);
        assert_eq!(timers.advance(1.0).len(), 1);
        assert_eq!(timers.advance(4.0).len(), 2);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn bounded_repeat_expires() {
        let mut timers = Timers::new();
        let id = timers.every_for(0.1, 1.02, TimerTask::SpinDamp);
        let mut total = 0;
        for _ in 0..40 {
            total += timers.advance(0.05).len();
        }
        assert_eq!(total, 10);
        assert!(!timers.is_live(id));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = Timers::new();
        let id = timers.every(0.5, TimerTask::TowerPoll);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.advance(10.0).is_empty());
    }
}
