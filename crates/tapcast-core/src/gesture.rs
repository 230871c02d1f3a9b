//! Gesture planning: turns tap/swipe intents into ordered event sequences.
//!
//! Planning is pure. A plan is a `Vec<GestureStep>` of touch events
//! interleaved with pauses; the session layer executes it by encoding each
//! touch event against the latched resolution and sleeping for each pause.
//! Splitting planning from execution keeps the interpolation arithmetic
//! fully unit-testable without a socket or a clock.

use std::time::Duration;

use crate::protocol::messages::TouchAction;

/// One step of a planned gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureStep {
    /// Emit a touch event at the given screen position.
    Touch { action: TouchAction, x: i32, y: i32 },
    /// Suspend before the next step.
    Pause(Duration),
}

/// Plans a tap: touch-down, pause for `duration`, touch-up at the same point.
pub fn plan_tap(x: i32, y: i32, duration: Duration) -> Vec<GestureStep> {
    vec![
        GestureStep::Touch {
            action: TouchAction::Down,
            x,
            y,
        },
        GestureStep::Pause(duration),
        GestureStep::Touch {
            action: TouchAction::Up,
            x,
            y,
        },
    ]
}

/// Plans a multi-step swipe from `start` to `end`.
///
/// Both endpoints are clamped to `[0, resolution)`. The step count is
/// `n = max(round(distance / step_length), 1)`; intermediate points are the
/// linear interpolation `start + delta * (i / n)` truncated to integers per
/// axis, so accumulated rounding error stays within one unit. The plan holds
/// exactly `n + 1` touch events: one down, `n - 1` moves (each followed by a
/// `step_delay` pause), and the final interpolated point as the up event.
/// Coincident endpoints degenerate to down-then-up with no moves.
pub fn plan_swipe(
    start: (i32, i32),
    end: (i32, i32),
    resolution: (u16, u16),
    delay: Duration,
    step_length: u32,
    step_delay: Duration,
) -> Vec<GestureStep> {
    let (sx, sy) = clamp_point(start, resolution);
    let (ex, ey) = clamp_point(end, resolution);

    let dx = f64::from(ex - sx);
    let dy = f64::from(ey - sy);
    let distance = (dx * dx + dy * dy).sqrt();
    let n = ((distance / f64::from(step_length.max(1))).round() as u32).max(1);

    let mut plan = Vec::with_capacity(2 * n as usize + 1);
    plan.push(GestureStep::Touch {
        action: TouchAction::Down,
        x: sx,
        y: sy,
    });
    plan.push(GestureStep::Pause(delay.max(step_delay)));

    for i in 1..=n {
        let t = f64::from(i) / f64::from(n);
        let px = (f64::from(sx) + dx * t) as i32;
        let py = (f64::from(sy) + dy * t) as i32;
        if i < n {
            plan.push(GestureStep::Touch {
                action: TouchAction::Move,
                x: px,
                y: py,
            });
            plan.push(GestureStep::Pause(step_delay));
        } else {
            plan.push(GestureStep::Touch {
                action: TouchAction::Up,
                x: px,
                y: py,
            });
        }
    }
    plan
}

fn clamp_point((x, y): (i32, i32), (width, height): (u16, u16)) -> (i32, i32) {
    (
        x.clamp(0, i32::from(width).saturating_sub(1)),
        y.clamp(0, i32::from(height).saturating_sub(1)),
    )
}
