use std::time::{Duration, Instant};

/// Deadline-based redraw scheduler for a fixed target frame rate.
///
/// The runtime asks [`is_due`](Self::is_due) before requesting a redraw and
/// sleeps until [`deadline`](Self::deadline) otherwise. Deadlines advance by a
/// whole interval per frame so the average rate holds; after a stall longer
/// than one interval the schedule restarts from the current time instead of
/// bursting to catch up.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next: Instant,
}

impl FramePacer {
    /// `target_fps == 0` disables pacing: every frame is due immediately.
    pub fn new(target_fps: u32, now: Instant) -> Self {
        let interval = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / target_fps
        };
        Self {
            interval,
            next: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next frame should start.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Records that a frame started at `now` and schedules the next one.
    pub fn mark(&mut self, now: Instant) {
        let next = self.next + self.interval;
        self.next = if next < now { now + self.interval } else { next };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_fps_interval() {
        let p = FramePacer::new(60, Instant::now());
        assert_eq!(p.interval(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn first_frame_is_due_immediately() {
        let t0 = Instant::now();
        let p = FramePacer::new(60, t0);
        assert!(p.is_due(t0));
    }

    #[test]
    fn deadlines_advance_by_whole_intervals() {
        let t0 = Instant::now();
        let mut p = FramePacer::new(50, t0);
        let step = Duration::from_millis(20);

        p.mark(t0);
        assert_eq!(p.deadline(), t0 + step);
        assert!(!p.is_due(t0 + Duration::from_millis(19)));
        assert!(p.is_due(t0 + step));

        // Starting a little late does not push the schedule back.
        p.mark(t0 + Duration::from_millis(23));
        assert_eq!(p.deadline(), t0 + step * 2);
    }

    #[test]
    fn long_stall_resynchronises() {
        let t0 = Instant::now();
        let mut p = FramePacer::new(50, t0);
        p.mark(t0);

        let late = t0 + Duration::from_secs(2);
        p.mark(late);
        assert_eq!(p.deadline(), late + Duration::from_millis(20));
    }

    #[test]
    fn zero_fps_is_unpaced() {
        let t0 = Instant::now();
        let mut p = FramePacer::new(0, t0);
        p.mark(t0);
        assert!(p.is_due(t0));
    }
}
