//! Chart dispatcher. Maps a dataset record to the charts that show it.
//!
//! [`payload::classify`] decides *which* layout applies; [`layout_for`]
//! turns the chosen variant into renderer-agnostic [`Chart`] descriptions.
//! Both are pure.

pub mod payload;

use chrono::{DateTime, Timelike};

use crate::records::{self, DatasetRecord};
use payload::{
    Algorithm, Collision, CsUnits, Measurement, Metric, Model, Payload, PhysicsUnits,
    QuantumMeasurement, TestEnvironment,
};

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
}

/// A named list of `(x, y)` points. Missing data is simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Chart {
    fn new(kind: ChartKind, title: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_label: x.into(),
            y_label: y.into(),
            series: Vec::new(),
        }
    }

    fn with(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Everything rendered for one record: annotations, then charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub notes: Vec<String>,
    pub charts: Vec<Chart>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.charts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn layout_for(record: &DatasetRecord) -> Layout {
    build(payload::classify(&record.data_type, &record.payload))
}

/// Build the layout for an already classified payload.
pub fn build(payload: Payload) -> Layout {
    match payload {
        Payload::HiggsDecay {
            measurements,
            units,
        } => higgs_decay(&measurements, &units),
        Payload::Entanglement {
            measurements,
            bell_parameter,
            units,
        } => entanglement(&measurements, bell_parameter, &units),
        Payload::EnergyTimeline {
            measurements,
            units,
        } => energy_timeline(&measurements, &units),
        Payload::Collisions { collisions, units } => collisions_scatter(&collisions, &units),
        Payload::Training { model } => training(&model),
        Payload::Algorithms {
            algorithms,
            test_environment,
        } => algorithm_comparison(&algorithms, test_environment.as_ref()),
        Payload::Network { metrics, units } => network(&metrics, &units),
        Payload::Unrecognized => Layout::default(),
    }
}

fn unit<'a>(configured: &'a Option<String>, fallback: &'a str) -> &'a str {
    configured.as_deref().unwrap_or(fallback)
}

/// `(1-based index, value)` for every item where `f` yields a value.
fn indexed<T>(items: &[T], f: impl Fn(&T) -> Option<f64>) -> Vec<(f64, f64)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| f(item).map(|y| ((i + 1) as f64, y)))
        .collect()
}

fn paired<T>(items: &[T], x: impl Fn(&T) -> Option<f64>, y: impl Fn(&T) -> Option<f64>) -> Vec<(f64, f64)> {
    items.iter().filter_map(|i| Some((x(i)?, y(i)?))).collect()
}

/// Zip two positional lists, skipping positions where either side is unreadable.
fn aligned(xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter_map(|(&x, &y)| Some((x?, y?)))
        .collect()
}

// ---------------------------------------------------------------------------
// Physics layouts
// ---------------------------------------------------------------------------

fn higgs_decay(measurements: &[Measurement], units: &PhysicsUnits) -> Layout {
    let energy = unit(&units.energy, "GeV");

    let mass = Chart::new(
        ChartKind::Bar,
        "Higgs Boson Invariant Mass Distribution",
        "Event #",
        format!("Invariant Mass ({energy})"),
    )
    .with(Series::new("Invariant Mass", indexed(measurements, |m| m.invariant_mass)));

    let photons = Chart::new(
        ChartKind::Line,
        "Photon Energy Distribution",
        "Event #",
        format!("Energy ({energy})"),
    )
    .with(Series::new("Photon 1", indexed(measurements, |m| m.photon1_energy)))
    .with(Series::new("Photon 2", indexed(measurements, |m| m.photon2_energy)));

    Layout {
        notes: Vec::new(),
        charts: vec![mass, photons],
    }
}

fn entanglement(
    measurements: &[QuantumMeasurement],
    bell_parameter: Option<f64>,
    units: &PhysicsUnits,
) -> Layout {
    let angle = unit(&units.angle, "degrees");

    let chart = Chart::new(
        ChartKind::Line,
        "Quantum Entanglement Correlation vs Measurement Angle",
        format!("Angle ({angle})"),
        "Correlation",
    )
    .with(Series::new(
        "Correlation",
        paired(measurements, |m| m.angle, |m| m.correlation),
    ));

    let notes = bell_parameter
        .map(|s| {
            if s > 2.0 {
                format!("Bell Parameter S = {s} (violates Bell inequality: S > 2)")
            } else {
                format!("Bell Parameter S = {s}")
            }
        })
        .into_iter()
        .collect();

    Layout {
        notes,
        charts: vec![chart],
    }
}

fn energy_timeline(measurements: &[Measurement], units: &PhysicsUnits) -> Layout {
    let time = unit(&units.time, "ns");
    let energy = unit(&units.energy, "eV");

    let over_time = Chart::new(
        ChartKind::Line,
        "Energy vs Time",
        format!("Time ({time})"),
        format!("Energy ({energy})"),
    )
    .with(Series::new("Energy", paired(measurements, |m| m.time, |m| m.energy)));

    let distribution = Chart::new(
        ChartKind::Bar,
        "Energy Distribution",
        "Measurement #",
        format!("Energy ({energy})"),
    )
    .with(Series::new("Energy", indexed(measurements, |m| m.energy)));

    Layout {
        notes: Vec::new(),
        charts: vec![over_time, distribution],
    }
}

fn collisions_scatter(collisions: &[Collision], units: &PhysicsUnits) -> Layout {
    let momentum = unit(&units.momentum, "GeV/c");
    let angle = unit(&units.angle, "degrees");

    let chart = Chart::new(
        ChartKind::Scatter,
        "Particle Collision Analysis",
        format!("Momentum ({momentum})"),
        format!("Angle ({angle})"),
    )
    .with(Series::new("Tracks", paired(collisions, |c| c.momentum, |c| c.angle)));

    Layout {
        notes: Vec::new(),
        charts: vec![chart],
    }
}

// ---------------------------------------------------------------------------
// Computer science layouts
// ---------------------------------------------------------------------------

fn training(model: &Model) -> Layout {
    let curve = |values: &[Option<f64>]| aligned(&model.epochs, values);

    let accuracy = Chart::new(
        ChartKind::Line,
        format!("{} Training Accuracy", model.name),
        "Epoch",
        "Accuracy",
    )
    .with(Series::new("Accuracy", curve(&model.accuracy)));

    let loss = Chart::new(ChartKind::Line, "Training Loss", "Epoch", "Loss")
        .with(Series::new("Loss", curve(&model.loss)));

    let mut notes = Vec::new();
    if model.parameters.is_some() || model.training_time_per_epoch.is_some() {
        notes.push(format!(
            "Parameters: {} | Time/Epoch: {}",
            model.parameters.as_deref().unwrap_or("-"),
            model.training_time_per_epoch.as_deref().unwrap_or("-"),
        ));
    }

    Layout {
        notes,
        charts: vec![accuracy, loss],
    }
}

fn algorithm_comparison(algorithms: &[Algorithm], env: Option<&TestEnvironment>) -> Layout {
    let mut notes = Vec::new();
    if let Some(env) = env {
        let parts: Vec<&str> = [&env.cpu, &env.memory, &env.compiler, &env.optimization]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if !parts.is_empty() {
            notes.push(parts.join(" | "));
        }
    }

    // The x axis always comes from the first algorithm.
    let sizes = algorithms
        .first()
        .map(|a| a.input_sizes.as_slice())
        .unwrap_or_default();
    if sizes.is_empty() {
        notes.push("No algorithm data available".to_string());
        return Layout {
            notes,
            charts: Vec::new(),
        };
    }

    let mut chart = Chart::new(
        ChartKind::Line,
        "Algorithm Performance Comparison",
        "Input Size",
        "Runtime (seconds)",
    );
    for algo in algorithms {
        let points = aligned(sizes, &algo.runtime);
        let name = format!(
            "{} ({})",
            algo.name,
            algo.complexity.as_deref().unwrap_or("Unknown")
        );
        chart = chart.with(Series::new(name, points));
    }

    Layout {
        notes,
        charts: vec![chart],
    }
}

/// Hour of day in the timestamp's own offset; naive strings and epoch
/// milliseconds are read as UTC.
fn metric_hour(metric: &Metric) -> Option<f64> {
    let ts = metric.timestamp.as_ref()?;
    let hour = match ts.as_str().map(DateTime::parse_from_rfc3339) {
        Some(Ok(parsed)) => parsed.hour(),
        _ => records::parse_timestamp(ts).ok()?.hour(),
    };
    Some(f64::from(hour))
}

fn network(metrics: &[Metric], units: &CsUnits) -> Layout {
    let bandwidth = unit(&units.bandwidth, "Mbps");
    let latency = unit(&units.latency, "ms");
    let packet_loss = unit(&units.packet_loss, "%");

    let bandwidth_chart = Chart::new(
        ChartKind::Line,
        "5G Network Bandwidth (24h)",
        "Hour of Day",
        format!("Bandwidth ({bandwidth})"),
    )
    .with(Series::new(
        format!("Bandwidth ({bandwidth})"),
        paired(metrics, metric_hour, |m| m.bandwidth),
    ));

    let latency_chart = Chart::new(
        ChartKind::Line,
        "Network Latency & Packet Loss",
        "Hour of Day",
        format!("Latency ({latency})"),
    )
    .with(Series::new(
        format!("Latency ({latency})"),
        paired(metrics, metric_hour, |m| m.latency),
    ))
    .with(Series::new(
        format!("Packet Loss ({packet_loss})"),
        paired(metrics, metric_hour, |m| m.packet_loss),
    ));

    let signal_chart = Chart::new(
        ChartKind::Line,
        "Signal Strength & User Load",
        "Hour of Day",
        "Signal Strength (dBm) / Users",
    )
    .with(Series::new(
        "Signal Strength (dBm)",
        paired(metrics, metric_hour, |m| m.signal_strength),
    ))
    .with(Series::new(
        "Active Users",
        paired(metrics, metric_hour, |m| m.user_count),
    ));

    Layout {
        notes: Vec::new(),
        charts: [bandwidth_chart, latency_chart, signal_chart]
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DataType;
    use serde_json::json;

    fn physics(payload: serde_json::Value) -> Layout {
        build(payload::classify(&DataType::Physics, &payload))
    }

    fn cs(payload: serde_json::Value) -> Layout {
        build(payload::classify(&DataType::ComputerScience, &payload))
    }

    #[test]
    fn higgs_layout_is_bar_then_photon_lines() {
        let layout = physics(json!({
            "measurements": [
                {"invariant_mass": 125.2, "photon1_energy": 60.0, "photon2_energy": 65.0, "time": 0.0},
                {"invariant_mass": 124.8, "photon1_energy": 70.0, "time": 0.025}
            ],
            "units": {"energy": "TeV"}
        }));

        assert_eq!(layout.charts.len(), 2);
        let mass = &layout.charts[0];
        assert_eq!(mass.kind, ChartKind::Bar);
        assert_eq!(mass.y_label, "Invariant Mass (TeV)");
        assert_eq!(mass.series[0].points, vec![(1.0, 125.2), (2.0, 124.8)]);

        let photons = &layout.charts[1];
        assert_eq!(photons.kind, ChartKind::Line);
        assert_eq!(photons.series[0].name, "Photon 1");
        assert_eq!(photons.series[1].points, vec![(1.0, 65.0)]);
    }

    #[test]
    fn entanglement_notes_bell_parameter() {
        let layout = physics(json!({
            "quantum_measurements": [
                {"angle": 0.0, "correlation": -0.98},
                {"angle": 22.5, "correlation": -0.71}
            ],
            "bell_parameter": 2.82
        }));
        assert_eq!(
            layout.notes,
            vec!["Bell Parameter S = 2.82 (violates Bell inequality: S > 2)".to_string()]
        );
        assert_eq!(layout.charts[0].x_label, "Angle (degrees)");
        assert_eq!(layout.charts[0].series[0].points[1], (22.5, -0.71));
    }

    #[test]
    fn timeline_uses_electron_volt_fallback() {
        let layout = physics(json!({"measurements": [{"energy": 3.5, "time": 2.0}]}));
        assert_eq!(layout.charts[0].x_label, "Time (ns)");
        assert_eq!(layout.charts[0].y_label, "Energy (eV)");
        assert_eq!(layout.charts[0].series[0].points, vec![(2.0, 3.5)]);
        assert_eq!(layout.charts[1].kind, ChartKind::Bar);
        assert_eq!(layout.charts[1].series[0].points, vec![(1.0, 3.5)]);
    }

    #[test]
    fn collisions_scatter_angle_against_momentum() {
        let layout = physics(json!({"collisions": [{"momentum": 4.2, "angle": 91.5}, {"angle": 3.0}]}));
        let chart = &layout.charts[0];
        assert_eq!(chart.kind, ChartKind::Scatter);
        assert_eq!(chart.x_label, "Momentum (GeV/c)");
        assert_eq!(chart.series[0].points, vec![(4.2, 91.5)]);
    }

    #[test]
    fn unrecognized_renders_nothing() {
        assert!(physics(json!({"detector": "CMS"})).is_empty());
    }

    #[test]
    fn training_charts_first_model() {
        let layout = cs(json!({
            "models": [{
                "name": "ResNet-50",
                "epochs": [1, 2, 3],
                "accuracy": [0.1, 0.3],
                "loss": [2.3, 1.9, 1.2],
                "parameters": "25.6M",
                "training_time_per_epoch": "4.2 minutes"
            }]
        }));
        assert_eq!(layout.charts[0].title, "ResNet-50 Training Accuracy");
        assert_eq!(layout.charts[0].series[0].points.len(), 2);
        assert_eq!(layout.charts[1].series[0].points.len(), 3);
        assert_eq!(layout.notes, vec!["Parameters: 25.6M | Time/Epoch: 4.2 minutes".to_string()]);
    }

    #[test]
    fn algorithms_keep_declared_order_and_drop_missing_points() {
        let layout = cs(json!({
            "algorithms": [
                {"name": "A", "runtime": [1, 2], "inputSize": [10, 20]},
                {"name": "B", "runtime": [3], "inputSize": [10, 20]}
            ]
        }));
        let chart = &layout.charts[0];
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "A (Unknown)");
        assert_eq!(chart.series[0].points, vec![(10.0, 1.0), (20.0, 2.0)]);
        assert_eq!(chart.series[1].points, vec![(10.0, 3.0)]);
    }

    #[test]
    fn algorithms_without_sizes_show_notice() {
        let layout = cs(json!({
            "algorithms": [{"name": "A", "runtime": [1]}],
            "test_environment": {"cpu": "i9", "compiler": "GCC 13.2"}
        }));
        assert!(layout.charts.is_empty());
        assert_eq!(
            layout.notes,
            vec!["i9 | GCC 13.2".to_string(), "No algorithm data available".to_string()]
        );
    }

    #[test]
    fn network_omits_charts_without_data() {
        let layout = cs(json!({
            "metrics": [
                {"timestamp": "2024-01-15T08:00:00Z", "bandwidth": 900.0, "latency": 12.0, "packet_loss": 0.2},
                {"timestamp": "not a time", "bandwidth": 1.0, "latency": 1.0}
            ],
            "units": {"latency": "us"}
        }));
        assert_eq!(layout.charts.len(), 2);
        assert_eq!(layout.charts[0].series[0].points, vec![(8.0, 900.0)]);
        assert_eq!(layout.charts[1].y_label, "Latency (us)");
        assert_eq!(layout.charts[1].series[1].name, "Packet Loss (%)");
    }

    #[test]
    fn epoch_millis_metrics_plot_by_utc_hour() {
        let layout = cs(json!({
            "metrics": [
                {"timestamp": 1705305600000i64, "bandwidth": 900.0},
                {"timestamp": "2024-01-15T09:00:00", "bandwidth": 950.0}
            ]
        }));
        assert_eq!(layout.charts.len(), 1);
        assert_eq!(layout.charts[0].series[0].points, vec![(8.0, 900.0), (9.0, 950.0)]);
    }

    #[test]
    fn numeric_parameters_still_annotate_training() {
        let layout = cs(json!({
            "models": [{
                "name": "BERT",
                "epochs": [1, 2],
                "accuracy": [0.4, "?"],
                "loss": [1.0, 0.7],
                "parameters": 110000000
            }]
        }));
        assert_eq!(layout.notes, vec!["Parameters: 110000000 | Time/Epoch: -".to_string()]);
        assert_eq!(layout.charts[0].series[0].points, vec![(1.0, 0.4)]);
        assert_eq!(layout.charts[1].series[0].points, vec![(1.0, 1.0), (2.0, 0.7)]);
    }

    #[test]
    fn float_measurement_count_does_not_hide_entanglement() {
        let layout = physics(json!({
            "quantum_measurements": [{"angle": 0.0, "correlation": -0.98, "measurement_count": 1200.0}],
            "bell_parameter": 1.9
        }));
        assert_eq!(layout.notes, vec!["Bell Parameter S = 1.9".to_string()]);
        assert_eq!(layout.charts[0].series[0].points, vec![(0.0, -0.98)]);
    }
}
