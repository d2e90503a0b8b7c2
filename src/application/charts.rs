// Chart adapter and per-slot chart registry
use crate::domain::dashboard::{palette, Rgb, WidgetKind};
use crate::domain::resources::CostSeries;
use std::collections::HashMap;

/// Chart slot; one per widget
pub type ChartSlot = WidgetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
    /// Per-slice colors for categorical charts
    pub colors: Vec<Rgb>,
    /// Per-point colors for line charts
    pub point_colors: Vec<Rgb>,
    pub border_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Draw the label/color key next to the chart
    pub show_legend: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self { show_legend: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Two-slice proportion chart (running/stopped, private/public, mfa/no-mfa)
pub fn build_categorical_chart_config(
    labels: [&str; 2],
    values: [u64; 2],
    colors: [Rgb; 2],
) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            datasets: vec![Dataset {
                label: String::new(),
                values: values.iter().map(|v| *v as f64).collect(),
                colors: colors.to_vec(),
                point_colors: Vec::new(),
                border_color: palette::BORDER,
            }],
        },
        options: ChartOptions::default(),
    }
}

/// Cost line data; anomalous points are drawn red
pub fn build_cost_chart_data(series: &CostSeries) -> ChartData {
    let label = series
        .datasets
        .first()
        .map(|d| d.label.clone())
        .unwrap_or_default();

    let point_colors = series
        .aligned_anomalies()
        .into_iter()
        .map(|anomalous| if anomalous { palette::RED } else { palette::SKY })
        .collect();

    ChartData {
        labels: series.labels.clone(),
        datasets: vec![Dataset {
            label,
            values: series.values().to_vec(),
            colors: Vec::new(),
            point_colors,
            border_color: palette::SKY,
        }],
    }
}

pub fn build_cost_chart_config(series: &CostSeries) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Line,
        data: build_cost_chart_data(series),
        options: ChartOptions::default(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub handle: ChartHandle,
    pub config: ChartConfig,
    /// Bumped on every in-place data update
    pub revision: u64,
}

/// Owns at most one live chart per slot
#[derive(Debug, Default)]
pub struct ChartRegistry {
    slots: HashMap<ChartSlot, ChartInstance>,
    next_handle: u64,
    destroyed: u64,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever occupies `slot` with a freshly constructed chart.
    /// The previous instance is destroyed first.
    pub fn render(&mut self, slot: ChartSlot, config: ChartConfig) -> ChartHandle {
        self.destroy(slot);
        self.create(slot, config)
    }

    /// Update the slot's data in place if a chart exists, else create one.
    pub fn render_series(&mut self, slot: ChartSlot, config: ChartConfig) -> ChartHandle {
        match self.slots.get_mut(&slot) {
            Some(instance) => {
                instance.config.data = config.data;
                instance.revision += 1;
                tracing::trace!("Updated {:?} chart in place (revision {})", slot, instance.revision);
                instance.handle
            }
            None => self.create(slot, config),
        }
    }

    pub fn destroy(&mut self, slot: ChartSlot) -> Option<ChartInstance> {
        let removed = self.slots.remove(&slot);
        if let Some(instance) = &removed {
            self.destroyed += 1;
            tracing::trace!(
                "Destroyed {:?} chart {:?} ({} destroyed so far)",
                slot,
                instance.handle,
                self.destroyed
            );
        }
        removed
    }

    pub fn get(&self, slot: ChartSlot) -> Option<&ChartInstance> {
        self.slots.get(&slot)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }

    fn create(&mut self, slot: ChartSlot, config: ChartConfig) -> ChartHandle {
        self.next_handle += 1;
        let handle = ChartHandle(self.next_handle);
        self.slots.insert(
            slot,
            ChartInstance {
                handle,
                config,
                revision: 0,
            },
        );
        handle
    }
}
