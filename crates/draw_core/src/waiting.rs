use std::fmt;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};

/// Remaining cooldown until draws resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitNotice {
    pub reset_at: DateTime<Utc>,
    pub remaining: TimeDelta,
}

impl WaitNotice {
    /// Reset time of day on the local clock.
    pub fn reset_time(&self) -> String {
        format_reset_time(self.reset_at, &Local)
    }

    pub fn message(&self) -> String {
        render_message(&self.reset_time(), self.remaining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitView {
    Pending(WaitNotice),
    Elapsed,
}

pub fn evaluate(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> WaitView {
    let remaining = reset_at - now;
    if remaining <= TimeDelta::zero() {
        WaitView::Elapsed
    } else {
        WaitView::Pending(WaitNotice {
            reset_at,
            remaining,
        })
    }
}

/// `HH:MM`, 24-hour, in `tz`.
pub fn format_reset_time<Tz>(reset_at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    reset_at.with_timezone(tz).format("%H:%M").to_string()
}

pub fn format_remaining(remaining: TimeDelta) -> String {
    let total_minutes = (remaining.num_seconds().max(0) + 59) / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else {
        format!("{minutes}m")
    }
}

pub fn render_message(reset_time: &str, remaining: TimeDelta) -> String {
    format!(
        "Every card has been drawn for today.\nPlease wait until {reset_time} ({} left) for the next draw.",
        format_remaining(remaining)
    )
}
