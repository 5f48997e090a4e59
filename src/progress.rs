//! Client-side progress display shown after a launch is accepted.
//!
//! The timeline is a fixed-duration local timer. It says nothing about the
//! workflow's real progress.
use std::time::Duration;

const TICK_COUNT: u32 = 20;

/// Stage labels and the percentage each one runs up to.
const STAGES: [(&str, u8); 5] = [
    ("Queued", 10),
    ("Collecting sources", 40),
    ("Analyzing competitors", 70),
    ("Generating insights", 90),
    ("Finalizing", 100),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTick {
    pub percent: u8,
    pub stage: &'static str,
}

#[derive(Debug, Clone)]
pub struct ProgressSimulation {
    total: Duration,
}

impl ProgressSimulation {
    pub fn new(total: Duration) -> Self {
        Self { total }
    }

    pub fn tick_interval(&self) -> Duration {
        self.total / TICK_COUNT
    }

    /// Every tick of the timeline, ending at 100%.
    pub fn ticks(&self) -> Vec<ProgressTick> {
        (1..=TICK_COUNT)
            .map(|idx| {
                let percent = (idx * 100 / TICK_COUNT) as u8;
                ProgressTick {
                    percent,
                    stage: stage_for(percent),
                }
            })
            .collect()
    }

    /// Play the timeline, sleeping between ticks unless the duration is zero.
    pub fn run<F: FnMut(&ProgressTick)>(&self, mut on_tick: F) {
        let interval = self.tick_interval();
        for tick in self.ticks() {
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
            on_tick(&tick);
        }
    }
}

pub fn stage_for(percent: u8) -> &'static str {
    STAGES
        .iter()
        .find(|(_, until)| percent <= *until)
        .map(|(label, _)| *label)
        .unwrap_or("Finalizing")
}
