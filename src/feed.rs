use std::time::{Duration, Instant};

/// Canned dispatch lines for the live feed. Client-side animation only; no
/// backend involved.
pub const DISPATCH_MESSAGES: &[&str] = &[
    "Unit 12 dispatched to sector 7 - reported disturbance",
    "Patrol 4 confirms area clear near Central Market",
    "CCTV flag: unattended vehicle on Ring Road, verifying",
    "Unit 9 responding to alarm trigger at warehouse district",
    "Dispatch: foot patrol requested near railway station exit",
    "Control room: shift handover complete, all units accounted",
];

/// Cycles the canned messages sequentially (the random variant seen in one
/// revision of the source was rejected) with a fade-out/fade-in transition.
/// Advancement is derived from wall-clock elapsed time, so the feed holds no
/// timer and costs nothing while its panel is hidden.
pub struct LiveFeed {
    messages: Vec<String>,
    index: usize,
    cycle_started: Instant,
    interval: Duration,
    fade: Duration,
}

impl LiveFeed {
    pub fn new(interval_secs: u64, fade_ms: u64) -> Self {
        Self::with_messages(
            DISPATCH_MESSAGES.iter().map(|m| m.to_string()).collect(),
            interval_secs,
            fade_ms,
        )
    }

    pub fn with_messages(messages: Vec<String>, interval_secs: u64, fade_ms: u64) -> Self {
        let interval = Duration::from_secs(interval_secs.max(1));
        Self {
            messages,
            index: 0,
            cycle_started: Instant::now(),
            interval,
            fade: Duration::from_millis(fade_ms).min(interval / 2),
        }
    }

    /// Current message plus its fade alpha in 0.0..=1.0.
    pub fn current(&mut self) -> (&str, f32) {
        self.advance();
        let alpha = self.alpha();
        let msg = self
            .messages
            .get(self.index)
            .map(|m| m.as_str())
            .unwrap_or("");
        (msg, alpha)
    }

    fn advance(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let elapsed = self.cycle_started.elapsed();
        if elapsed >= self.interval {
            let steps = (elapsed.as_millis() / self.interval.as_millis().max(1)) as usize;
            self.index = (self.index + steps) % self.messages.len();
            self.cycle_started = Instant::now();
        }
    }

    fn alpha(&self) -> f32 {
        let fade_ms = self.fade.as_millis() as f32;
        if fade_ms <= 0.0 {
            return 1.0;
        }
        let elapsed_ms = self.cycle_started.elapsed().as_millis() as f32;
        let interval_ms = self.interval.as_millis() as f32;
        let remaining_ms = (interval_ms - elapsed_ms).max(0.0);
        if elapsed_ms < fade_ms {
            elapsed_ms / fade_ms
        } else if remaining_ms < fade_ms {
            remaining_ms / fade_ms
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_feed() -> LiveFeed {
        LiveFeed::with_messages(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            2,
            200,
        )
    }

    #[test]
    fn cycles_sequentially_and_wraps() {
        let mut feed = test_feed();
        assert_eq!(feed.current().0, "a");

        feed.cycle_started -= Duration::from_secs(2);
        assert_eq!(feed.current().0, "b");

        feed.cycle_started -= Duration::from_secs(2);
        assert_eq!(feed.current().0, "c");

        feed.cycle_started -= Duration::from_secs(2);
        assert_eq!(feed.current().0, "a");
    }

    #[test]
    fn long_gap_skips_ahead_without_panicking() {
        let mut feed = test_feed();
        feed.cycle_started -= Duration::from_secs(7);
        // 7s / 2s interval = 3 whole steps from "a".
        assert_eq!(feed.current().0, "a");
    }

    #[test]
    fn alpha_fades_in_and_holds() {
        let mut feed = test_feed();
        let (_, early) = feed.current();
        assert!(early <= 1.0);

        feed.cycle_started -= Duration::from_millis(1000);
        let (_, mid) = feed.current();
        assert_eq!(mid, 1.0);
    }

    #[test]
    fn empty_message_set_is_inert() {
        let mut feed = LiveFeed::with_messages(Vec::new(), 2, 200);
        assert_eq!(feed.current().0, "");
    }
}
