use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub const DEFAULT_DURATION_MS: u64 = 1400;
pub const DEFAULT_STEP_MS: u64 = 12;
/// Radius of the SVG circle path drawn by the page markup.
pub const DEFAULT_RADIUS: f64 = 15.9155;

/// Timing and geometry shared by every progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressTiming {
    pub duration_ms: u64,
    pub step_ms: u64,
    pub radius: f64,
}

impl Default for ProgressTiming {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            step_ms: DEFAULT_STEP_MS,
            radius: DEFAULT_RADIUS,
        }
    }
}

impl ProgressTiming {
    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    /// Number of ticks in one animation. Not necessarily whole (1400 / 12).
    pub fn step_count(&self) -> f64 {
        if self.step_ms == 0 {
            return 1.0;
        }
        (self.duration_ms as f64 / self.step_ms as f64).max(1.0)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
}

/// Parse a `data-percent` style attribute.
///
/// Reads the leading integer the way an HTML attribute is usually read:
/// surrounding junk after the digits is ignored (`"80px"` is 80) and any
/// fraction is truncated. Missing, non-numeric and negative values become 0,
/// anything above 100 becomes 100.
pub fn parse_percent(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 0;
    };

    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    if digits.is_empty() || negative {
        return 0;
    }

    // Only overflow can fail here; a huge number is still "above 100".
    digits
        .parse::<u64>()
        .map(|v| v.min(100) as u32)
        .unwrap_or(100)
}

/// Animation state of a single indicator
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTarget {
    target_percent: u32,
    current_percent: f64,
    increment_per_tick: f64,
}

impl ProgressTarget {
    pub fn new(percent: u32, timing: &ProgressTiming) -> Self {
        let target_percent = percent.min(100);
        Self {
            target_percent,
            current_percent: 0.0,
            increment_per_tick: target_percent as f64 / timing.step_count(),
        }
    }

    pub fn from_attribute(raw: Option<&str>, timing: &ProgressTiming) -> Self {
        Self::new(parse_percent(raw), timing)
    }

    pub fn target_percent(&self) -> u32 {
        self.target_percent
    }

    pub fn current_percent(&self) -> f64 {
        self.current_percent
    }

    pub fn increment_per_tick(&self) -> f64 {
        self.increment_per_tick
    }

    pub fn is_complete(&self) -> bool {
        self.current_percent >= self.target_percent as f64
    }

    fn advance(&mut self) -> f64 {
        let target = self.target_percent as f64;
        self.current_percent = (self.current_percent + self.increment_per_tick).min(target);
        self.current_percent
    }
}

/// What one tick paints: the label and the arc
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFrame {
    pub percent: u32,
    pub arc_length: f64,
    pub circumference: f64,
}

impl ProgressFrame {
    pub fn label(&self) -> String {
        format!("{}%", self.percent)
    }

    /// Value for the circle's `stroke-dasharray`.
    pub fn dash_array(&self) -> String {
        format!("{} {}", self.arc_length, self.circumference)
    }

    /// Text rendering of the arc for terminals.
    pub fn bar(&self, width: usize) -> String {
        let ratio = if self.circumference > 0.0 {
            (self.arc_length / self.circumference).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (ratio * width as f64).round() as usize;
        let empty = width - filled.min(width);

        format!(
            "[{}{}] {:>4}",
            "█".repeat(filled.min(width)),
            "░".repeat(empty),
            self.label()
        )
    }
}

/// Steps a [`ProgressTarget`] toward its target, one frame per tick.
///
/// Iterating gives the frames without waiting; [`ProgressAnimator::run`]
/// paces them on the tokio timer.
#[derive(Debug, Clone)]
pub struct ProgressAnimator {
    target: ProgressTarget,
    circumference: f64,
    tick: Duration,
    done: bool,
}

impl ProgressAnimator {
    pub fn new(target: ProgressTarget, timing: &ProgressTiming) -> Self {
        Self {
            target,
            circumference: timing.circumference(),
            tick: timing.tick(),
            done: false,
        }
    }

    pub fn for_attribute(raw: Option<&str>, timing: &ProgressTiming) -> Self {
        Self::new(ProgressTarget::from_attribute(raw, timing), timing)
    }

    pub fn target(&self) -> &ProgressTarget {
        &self.target
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Emit frames on the timer until the target is reached.
    ///
    /// The first frame is painted immediately, later ones one tick apart.
    /// Returns the final frame.
    pub async fn run<F>(mut self, mut on_tick: F) -> Option<ProgressFrame>
    where
        F: FnMut(&ProgressFrame),
    {
        let tick = self.tick;
        let mut last = None;

        while let Some(frame) = self.next() {
            on_tick(&frame);
            last = Some(frame);
            if self.done {
                break;
            }
            tokio::time::sleep(tick).await;
        }

        debug!(
            target_percent = self.target.target_percent(),
            "progress animation complete"
        );
        last
    }
}

impl Iterator for ProgressAnimator {
    type Item = ProgressFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = self.target.advance();
        if self.target.is_complete() {
            self.done = true;
        }

        Some(ProgressFrame {
            percent: current.round() as u32,
            arc_length: current / 100.0 * self.circumference,
            circumference: self.circumference,
        })
    }
}

/// Animate every indicator on the page at once.
///
/// `on_tick` receives the indicator's index with each frame. Returns the
/// final frame of each indicator, in input order.
pub async fn animate_all<F>(animators: Vec<ProgressAnimator>, mut on_tick: F) -> Vec<ProgressFrame>
where
    F: FnMut(usize, &ProgressFrame),
{
    let count = animators.len();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for (index, animator) in animators.into_iter().enumerate() {
        let tx = tx.clone();
        tokio::spawn(async move {
            animator
                .run(move |frame: &ProgressFrame| {
                    let _ = tx.send((index, frame.clone()));
                })
                .await;
        });
    }
    drop(tx);

    let mut finals: Vec<Option<ProgressFrame>> = vec![None; count];
    while let Some((index, frame)) = rx.recv().await {
        on_tick(index, &frame);
        finals[index] = Some(frame);
    }

    finals.into_iter().flatten().collect()
}
