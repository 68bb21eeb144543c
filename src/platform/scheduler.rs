//! Timer scheduling
//!
//! The match never sleeps or spawns threads for timing. It asks a
//! `Scheduler` for timers and gets back ids; the host polls the scheduler and
//! hands fired ids back to `Match::on_timer`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum times a repeating timer fires in one poll before it resyncs.
/// Keeps a stalled host from replaying a long backlog of ticks.
pub const MAX_CATCH_UP: u32 = 8;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Timer capability injected into the match
pub trait Scheduler {
    /// Fire repeatedly every `period`, first after one period
    fn every(&mut self, period: Duration) -> TimerId;

    /// Fire once after `delay`
    fn after(&mut self, delay: Duration) -> TimerId;

    /// Stop a timer. Unknown or already-fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    deadline: Duration,
    period: Option<Duration>,
}

/// Timers on a monotonic clock the host advances.
///
/// Tests step it by hand; the native driver feeds it wall-clock elapsed time.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Earliest deadline of any armed timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Move the clock forward by `dt`
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerId> {
        let target = self.now + dt;
        self.advance_to(target)
    }

    /// Move the clock to `now` and return every timer that fired, in deadline
    /// order (ties in scheduling order). One-shot timers are disarmed;
    /// repeating timers are re-armed one period later.
    pub fn advance_to(&mut self, now: Duration) -> Vec<TimerId> {
        if now > self.now {
            self.now = now;
        }

        let mut fired: Vec<(Duration, u64, TimerId)> = Vec::new();
        let mut fire_count = 0u64;
        let current = self.now;

        self.timers.retain_mut(|timer| {
            if timer.deadline > current {
                return true;
            }
            match timer.period {
                None => {
                    fired.push((timer.deadline, fire_count, timer.id));
                    fire_count += 1;
                    false
                }
                Some(period) => {
                    let mut fires = 0;
                    while timer.deadline <= current && fires < MAX_CATCH_UP {
                        fired.push((timer.deadline, fire_count, timer.id));
                        fire_count += 1;
                        timer.deadline += period;
                        fires += 1;
                    }
                    if timer.deadline <= current {
                        // Drift: drop the backlog and resync to the clock
                        log::debug!("Timer {:?} fell behind, resyncing", timer.id);
                        timer.deadline = current + period;
                    }
                    true
                }
            }
        });

        fired.sort_by_key(|&(deadline, order, _)| (deadline, order));
        fired.into_iter().map(|(_, _, id)| id).collect()
    }

    fn schedule(&mut self, delay: Duration, period: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer {
            id,
            deadline: self.now + delay,
            period,
        });
        id
    }
}

impl Scheduler for TimerQueue {
    fn every(&mut self, period: Duration) -> TimerId {
        // A zero period would fire forever within one poll
        let period = period.max(Duration::from_micros(1));
        self.schedule(period, Some(period))
    }

    fn after(&mut self, delay: Duration) -> TimerId {
        self.schedule(delay, None)
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }
}
