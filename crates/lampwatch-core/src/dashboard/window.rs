// ── Sliding chart windows ──
//
// A `ChartWindow<N>` holds N parallel series over one shared label axis.
// Pushing past capacity evicts the oldest point from the axis and from
// every series in the same step, so the series never drift out of line.

use std::collections::VecDeque;

use serde::Serialize;

/// Points kept per chart.
pub const WINDOW_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartWindow<const N: usize> {
    capacity: usize,
    names: [&'static str; N],
    labels: VecDeque<String>,
    series: [VecDeque<f64>; N],
}

impl<const N: usize> ChartWindow<N> {
    pub fn new(names: [&'static str; N]) -> Self {
        Self::with_capacity(WINDOW_CAPACITY, names)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize, names: [&'static str; N]) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            names,
            labels: VecDeque::with_capacity(capacity),
            series: std::array::from_fn(|_| VecDeque::with_capacity(capacity)),
        }
    }

    /// Append one point to every series, evicting the oldest first when full.
    pub fn push(&mut self, label: impl Into<String>, values: [f64; N]) {
        if self.labels.len() >= self.capacity {
            self.labels.pop_front();
            for series in &mut self.series {
                series.pop_front();
            }
        }
        self.labels.push_back(label.into());
        for (series, value) in self.series.iter_mut().zip(values) {
            series.push_back(value);
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Values of series `index`, oldest first. `None` past the last series.
    pub fn series(&self, index: usize) -> Option<Vec<f64>> {
        self.series.get(index).map(|s| s.iter().copied().collect())
    }

    /// Most recent point of every series.
    pub fn latest(&self) -> Option<(&str, [f64; N])> {
        let label = self.labels.back()?;
        let mut values = [0.0; N];
        for (slot, series) in values.iter_mut().zip(&self.series) {
            *slot = *series.back()?;
        }
        Some((label.as_str(), values))
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        for series in &mut self.series {
            series.clear();
        }
    }

    /// Owned, serializable copy for rendering.
    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            labels: self.labels.iter().cloned().collect(),
            series: self
                .names
                .iter()
                .zip(&self.series)
                .map(|(name, data)| NamedSeries {
                    name: (*name).to_owned(),
                    data: data.iter().copied().collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSnapshot {
    pub labels: Vec<String>,
    pub series: Vec<NamedSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub data: Vec<f64>,
}

// ── Dashboard charts ─────────────────────────────────────────────────

/// The three live charts of the monitoring dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveCharts {
    /// Good / poor posture percentage.
    pub posture: ChartWindow<2>,
    /// Positive / neutral / negative emotion percentage.
    pub emotion: ChartWindow<3>,
    /// Focus percentage.
    pub focus: ChartWindow<1>,
}

impl Default for LiveCharts {
    fn default() -> Self {
        Self {
            posture: ChartWindow::new(["good", "poor"]),
            emotion: ChartWindow::new(["positive", "neutral", "negative"]),
            focus: ChartWindow::new(["focused"]),
        }
    }
}
