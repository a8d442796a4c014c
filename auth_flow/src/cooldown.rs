use std::time::Duration;

/// Client-side resend throttle: after a resend the control is disabled for
/// the whole window, counting down one second at a time. No server
/// coordination beyond the resend call itself.
#[derive(Debug)]
pub struct ResendCooldown {
    window: u32,
    remaining: u32,
}

impl ResendCooldown {
    pub fn new(window_secs: u32) -> Self {
        ResendCooldown {
            window: window_secs,
            remaining: 0,
        }
    }

    pub fn start(&mut self) {
        self.remaining = self.window;
    }

    /// One second elapsed. Returns the seconds left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Drives the countdown on a one-second interval until it reaches zero.
    /// Dropping the future stops the countdown (unmount cleanup).
    pub async fn countdown(&mut self) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await; // first tick completes immediately
        while self.is_active() {
            interval.tick().await;
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_from_the_window_to_zero() {
        let mut cooldown = ResendCooldown::new(60);
        assert!(!cooldown.is_active());

        cooldown.start();
        assert_eq!(cooldown.remaining(), 60);
        for expected in (0..60).rev() {
            assert!(cooldown.is_active());
            assert_eq!(cooldown.tick(), expected);
        }
        assert!(!cooldown.is_active());
        // ticking past zero stays at zero
        assert_eq!(cooldown.tick(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_takes_sixty_one_second_ticks() {
        let mut cooldown = ResendCooldown::new(60);
        cooldown.start();

        let started = tokio::time::Instant::now();
        cooldown.countdown().await;

        assert_eq!(cooldown.remaining(), 0);
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }
}
