//! Click counter behind the play button
//!
//! Clicking the button a few times in a row reveals a short animation,
//! after which the button sulks for a while. The machine holds no timers:
//! every operation takes the current [`Instant`] and deadlines are stored
//! as instants, so callers decide when to re-render.
//!
//! ```text
//!  Idle --click x N--> Showing --duration--> Cooldown --cooldown--> Idle
//!                                              |
//!                                  first click: "ok lil bro stop it"
//! ```

use std::time::{Duration, Instant};

/// Shown on the first click during cooldown
pub const COOLDOWN_MESSAGE: &str = "ok lil bro stop it";

/// How long the remaining-clicks hint stays visible
pub const COUNTDOWN_MESSAGE_DURATION: Duration = Duration::from_millis(1500);

/// How long the cooldown message stays visible
pub const COOLDOWN_MESSAGE_DURATION: Duration = Duration::from_secs(2);

/// Timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EasterEggSettings {
    /// Clicks needed to reveal the egg
    pub clicks: u32,
    /// How long the egg stays visible
    pub duration: Duration,
    /// Quiet period after the egg disappears
    pub cooldown: Duration,
}

impl Default for EasterEggSettings {
    fn default() -> Self {
        Self {
            clicks: 5,
            duration: Duration::from_millis(3000),
            cooldown: Duration::from_secs(5 * 60),
        }
    }
}

/// What the view should show at a given instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EasterEggView {
    pub show_easter_egg: bool,
    pub click_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Showing { until: Instant },
    Cooldown { until: Instant, warned: bool },
}

#[derive(Debug, Clone)]
struct Message {
    text: String,
    until: Instant,
}

/// Caller-held easter egg state machine
#[derive(Debug, Clone)]
pub struct EasterEgg {
    settings: EasterEggSettings,
    phase: Phase,
    count: u32,
    message: Option<Message>,
}

impl Default for EasterEgg {
    fn default() -> Self {
        Self::new(EasterEggSettings::default())
    }
}

impl EasterEgg {
    pub fn new(settings: EasterEggSettings) -> Self {
        Self {
            settings: EasterEggSettings {
                clicks: settings.clicks.max(1),
                ..settings
            },
            phase: Phase::Idle,
            count: 0,
            message: None,
        }
    }

    pub fn settings(&self) -> &EasterEggSettings {
        &self.settings
    }

    /// Clicks registered since the last reveal
    pub fn click_count(&self) -> u32 {
        self.count
    }

    /// Register a click on the play button
    pub fn click(&mut self, now: Instant) {
        self.advance(now);

        match self.phase {
            Phase::Showing { .. } => {}
            Phase::Cooldown { until, warned } => {
                if !warned {
                    self.phase = Phase::Cooldown {
                        until,
                        warned: true,
                    };
                    self.show_message(COOLDOWN_MESSAGE.to_string(), now, COOLDOWN_MESSAGE_DURATION);
                }
            }
            Phase::Idle => {
                self.count += 1;
                if self.count >= self.settings.clicks {
                    tracing::debug!("Easter egg revealed");
                    self.count = 0;
                    self.message = None;
                    self.phase = Phase::Showing {
                        until: now + self.settings.duration,
                    };
                } else {
                    let remaining = self.settings.clicks - self.count;
                    self.show_message(remaining_clicks_message(remaining), now, COUNTDOWN_MESSAGE_DURATION);
                }
            }
        }
    }

    /// Current view, expiring whatever is due at `now`
    pub fn view(&mut self, now: Instant) -> EasterEggView {
        self.advance(now);
        EasterEggView {
            show_easter_egg: matches!(self.phase, Phase::Showing { .. }),
            click_message: self.message.as_ref().map(|m| m.text.clone()),
        }
    }

    /// Earliest instant at which the view will change on its own
    pub fn next_deadline(&self) -> Option<Instant> {
        let phase_deadline = match self.phase {
            Phase::Idle => None,
            Phase::Showing { until } | Phase::Cooldown { until, .. } => Some(until),
        };
        let message_deadline = self.message.as_ref().map(|m| m.until);
        match (phase_deadline, message_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn show_message(&mut self, text: String, now: Instant, duration: Duration) {
        self.message = Some(Message {
            text,
            until: now + duration,
        });
    }

    fn advance(&mut self, now: Instant) {
        if self.message.as_ref().is_some_and(|m| now >= m.until) {
            self.message = None;
        }

        if let Phase::Showing { until } = self.phase {
            if now >= until {
                self.phase = Phase::Cooldown {
                    until: until + self.settings.cooldown,
                    warned: false,
                };
            }
        }

        if let Phase::Cooldown { until, .. } = self.phase {
            if now >= until {
                self.phase = Phase::Idle;
            }
        }
    }
}

/// `"click 1 more time"` / `"click N more times"`
pub fn remaining_clicks_message(remaining: u32) -> String {
    if remaining == 1 {
        "click 1 more time".to_string()
    } else {
        format!("click {} more times", remaining)
    }
}
