// KPI counter board and frame-driven count-up animation
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Displayed value of every KPI element on the page
#[derive(Debug, Clone, Default)]
pub struct KpiBoard {
    values: BTreeMap<String, u64>,
}

impl KpiBoard {
    /// Board exposing exactly the given element ids, all starting at 0
    pub fn with_elements<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            values: ids.into_iter().map(|id| (id.to_string(), 0)).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<u64> {
        self.values.get(id).copied()
    }

    /// Set an existing element; unknown ids are ignored
    pub fn set(&mut self, id: &str, value: u64) {
        if let Some(slot) = self.values.get_mut(id) {
            *slot = value;
        }
    }
}

#[derive(Debug, Clone)]
struct CounterAnimation {
    start: u64,
    end: u64,
    duration: Duration,
    /// Timestamp of the first frame, not of the trigger
    started_at: Option<Instant>,
}

impl CounterAnimation {
    /// Value for the frame at `now` and whether this is the final frame
    fn frame(&mut self, now: Instant) -> (u64, bool) {
        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started_at);

        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };

        if progress >= 1.0 {
            return (self.end, true);
        }

        let span = self.end as f64 - self.start as f64;
        let value = (progress * span + self.start as f64).floor().max(0.0) as u64;
        (value, false)
    }
}

/// Runs at most one count-up animation per element
#[derive(Debug, Default)]
pub struct CounterAnimator {
    active: HashMap<String, CounterAnimation>,
}

impl CounterAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animate `id` from `start` to `end` over `duration`.
    ///
    /// Equal endpoints set the value immediately. A new animation on an element
    /// replaces the one in flight.
    pub fn animate(&mut self, board: &mut KpiBoard, id: &str, start: u64, end: u64, duration: Duration) {
        if !board.contains(id) {
            tracing::error!("Could not find KPI element with id '{}'", id);
            return;
        }

        if start == end {
            self.active.remove(id);
            board.set(id, end);
            return;
        }

        board.set(id, start);
        self.active.insert(
            id.to_string(),
            CounterAnimation {
                start,
                end,
                duration,
                started_at: None,
            },
        );
    }

    /// Advance every animation by one frame. Returns true while any remain.
    pub fn tick(&mut self, board: &mut KpiBoard, now: Instant) -> bool {
        self.active.retain(|id, animation| {
            let (value, done) = animation.frame(now);
            board.set(id, value);
            !done
        });
        !self.active.is_empty()
    }

    #[cfg(test)]
    pub fn is_animating(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
