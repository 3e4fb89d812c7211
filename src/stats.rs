//! Rolling statistics for the viewer graphs and the run report.
use std::collections::VecDeque;

use serde::Serialize;

use crate::config::SimConfig;
use crate::simulation::{DaySummary, StateCounts};

/// The most recent `capacity` samples of one series, oldest first.
pub struct RingBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest once full.
    pub fn push(&mut self, value: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Per-state head counts over the most recent days.
pub struct EpidemicStats {
    pub susceptible: RingBuffer,
    pub incubating: RingBuffer,
    pub symptomatic: RingBuffer,
    pub immune: RingBuffer,
    pub peak_infected: usize,
    pub peak_day: u64,
}

impl EpidemicStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            susceptible: RingBuffer::new(capacity),
            incubating: RingBuffer::new(capacity),
            symptomatic: RingBuffer::new(capacity),
            immune: RingBuffer::new(capacity),
            peak_infected: 0,
            peak_day: 0,
        }
    }

    pub fn record(&mut self, day: u64, counts: StateCounts) {
        self.susceptible.push(counts.susceptible as f32);
        self.incubating.push(counts.incubating as f32);
        self.symptomatic.push(counts.symptomatic as f32);
        self.immune.push(counts.immune as f32);

        let infected = counts.incubating + counts.symptomatic;
        if infected > self.peak_infected {
            self.peak_infected = infected;
            self.peak_day = day;
        }
    }

    pub fn clear(&mut self) {
        self.susceptible.clear();
        self.incubating.clear();
        self.symptomatic.clear();
        self.immune.clear();
        self.peak_infected = 0;
        self.peak_day = 0;
    }
}

/// Everything the headless runner writes out.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub configuration: SimConfig,
    pub days: Vec<DaySummary>,
    pub peak_infected: usize,
    pub peak_day: u64,
}

impl RunReport {
    pub fn new(seed: u64, configuration: SimConfig) -> Self {
        Self {
            seed,
            configuration,
            days: Vec::new(),
            peak_infected: 0,
            peak_day: 0,
        }
    }

    pub fn push(&mut self, summary: DaySummary) {
        if summary.n_infected > self.peak_infected {
            self.peak_infected = summary.n_infected;
            self.peak_day = summary.day;
        }
        self.days.push(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_iterates_in_insertion_order_after_wrap() {
        let mut buf = RingBuffer::new(3);
        buf.push(1.0);
        buf.push(2.0);
        buf.push(3.0);
        buf.push(4.0);

        let values: Vec<f32> = buf.iter().collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(buf.last(), Some(4.0));
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest_sample() {
        let mut buf = RingBuffer::new(0);
        assert!(buf.is_empty());
        assert_eq!(buf.last(), None);
        buf.push(5.0);
        buf.push(6.0);
        assert_eq!(buf.iter().collect::<Vec<_>>(), vec![6.0]);
    }

    #[test]
    fn stats_track_the_infection_peak() {
        let mut stats = EpidemicStats::new(8);
        let counts = |susceptible, incubating, symptomatic, immune| StateCounts {
            susceptible,
            incubating,
            symptomatic,
            immune,
        };
        stats.record(1, counts(90, 5, 5, 0));
        stats.record(2, counts(80, 6, 14, 0));
        stats.record(3, counts(80, 1, 9, 10));

        assert_eq!(stats.peak_infected, 20);
        assert_eq!(stats.peak_day, 2);
        let immune: Vec<f32> = stats.immune.iter().collect();
        assert_eq!(immune, vec![0.0, 0.0, 10.0]);

        stats.clear();
        assert!(stats.susceptible.is_empty());
        assert_eq!(stats.peak_infected, 0);
    }

    #[test]
    fn report_keeps_first_day_of_peak() {
        let mut report = RunReport::new(333, SimConfig::default());
        for (day, n_infected) in [(1, 3), (2, 7), (3, 7), (4, 2)] {
            report.push(DaySummary {
                day,
                n_infected,
                n_immune: 0,
            });
        }
        assert_eq!(report.days.len(), 4);
        assert_eq!(report.peak_infected, 7);
        assert_eq!(report.peak_day, 2);
    }
}
