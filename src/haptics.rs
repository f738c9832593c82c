// Haptic feedback while the stroke stays on the letter.
// Feel: one pulse per cooldown window, however many ticks ask for one.

use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, info};

/// A platform capability that can buzz for a while.
pub trait Vibrate {
    fn vibrate(&mut self, pulse: Duration);
}

/// Desktop stand-in for a vibration motor: rings the terminal bell.
pub struct TerminalBell;

impl Vibrate for TerminalBell {
    fn vibrate(&mut self, _pulse: Duration) {
        let mut err = std::io::stderr();
        let _ = err.write_all(b"\x07");
        let _ = err.flush();
    }
}

/// Cooldown state for a throttled call with one trailing call.
///
/// A call inside the cooldown does not fire; it leaves exactly one deferred
/// fire at cooldown expiry, which replaces any earlier deferred fire.
#[derive(Debug, Clone)]
pub struct Throttle {
    cooldown: Duration,
    last_fire: Option<Instant>,
    pending: Option<Instant>,
}

impl Throttle {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last_fire: None, pending: None }
    }

    /// True if the call should fire right now.
    pub fn attempt(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.saturating_duration_since(last) < self.cooldown => {
                self.pending = Some(last + self.cooldown);
                false
            }
            _ => {
                self.last_fire = Some(now);
                self.pending = None;
                true
            }
        }
    }

    /// True once, when a deferred call has come due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(due) if now >= due => {
                self.pending = None;
                self.last_fire = Some(due);
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> Option<Instant> {
        self.pending
    }
}

pub struct HapticFeedback {
    device: Option<Box<dyn Vibrate>>,
    pulse: Duration,
    throttle: Throttle,
}

impl HapticFeedback {
    /// Probe once at startup. Without a device every trigger is a no-op.
    pub fn probe(device: Option<Box<dyn Vibrate>>, pulse: Duration) -> Self {
        if device.is_some() {
            info!(pulse_ms = pulse.as_millis() as u64, "vibration supported");
        } else {
            info!("vibration not supported");
        }
        Self { device, pulse, throttle: Throttle::new(pulse) }
    }

    pub fn unsupported() -> Self {
        Self { device: None, pulse: Duration::ZERO, throttle: Throttle::new(Duration::ZERO) }
    }

    pub fn is_supported(&self) -> bool {
        self.device.is_some()
    }

    pub fn trigger(&mut self, now: Instant) {
        let Some(device) = self.device.as_mut() else {
            return;
        };
        if self.throttle.attempt(now) {
            device.vibrate(self.pulse);
        }
    }

    /// Fire the trailing pulse if its time has come. The host calls this every frame.
    pub fn poll(&mut self, now: Instant) {
        let Some(device) = self.device.as_mut() else {
            return;
        };
        if self.throttle.poll(now) {
            debug!("trailing vibration pulse");
            device.vibrate(self.pulse);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts pulses instead of buzzing.
    #[derive(Clone, Default)]
    pub(crate) struct PulseCounter(pub(crate) Rc<Cell<u32>>);

    impl Vibrate for PulseCounter {
        fn vibrate(&mut self, _pulse: Duration) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_call_fires_then_cooldown_collapses() {
        let t0 = Instant::now();
        let mut th = Throttle::new(ms(300));
        assert!(th.attempt(t0));
        assert!(!th.attempt(t0 + ms(16)));
        assert!(!th.attempt(t0 + ms(32)));
        assert_eq!(th.pending(), Some(t0 + ms(300)));
        assert!(th.attempt(t0 + ms(300)));
        assert_eq!(th.pending(), None);
    }

    #[test]
    fn trailing_call_fires_once_at_expiry() {
        let t0 = Instant::now();
        let mut th = Throttle::new(ms(300));
        th.attempt(t0);
        th.attempt(t0 + ms(100));
        th.attempt(t0 + ms(200));
        assert!(!th.poll(t0 + ms(299)));
        assert!(th.poll(t0 + ms(300)));
        assert!(!th.poll(t0 + ms(301)));
        // The trailing fire starts a new window.
        assert!(!th.attempt(t0 + ms(400)));
    }

    #[test]
    fn haptics_pulse_through_the_throttle() {
        let counter = PulseCounter::default();
        let mut haptics = HapticFeedback::probe(Some(Box::new(counter.clone())), ms(300));
        let t0 = Instant::now();
        for i in 0..10 {
            haptics.trigger(t0 + ms(i * 16));
        }
        assert_eq!(counter.0.get(), 1);
        haptics.poll(t0 + ms(300));
        assert_eq!(counter.0.get(), 2);
    }

    #[test]
    fn unsupported_device_is_silent() {
        let mut haptics = HapticFeedback::unsupported();
        let t0 = Instant::now();
        haptics.trigger(t0);
        haptics.poll(t0 + ms(1000));
        assert!(!haptics.is_supported());
    }
}
