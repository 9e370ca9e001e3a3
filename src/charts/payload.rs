//! Structural classification of dataset payloads.
//!
//! Payloads carry no discriminant tag. [`classify`] inspects which
//! top-level keys are present, in a fixed priority order per data type, and
//! returns a [`Payload`] variant holding the typed view of the winning
//! field. The function is total: anything it cannot place is
//! [`Payload::Unrecognized`].
//!
//! Only the shape of the winning key decides the variant. Items are read
//! field by field, so a value of the wrong type drops that one field (and
//! the chart point built from it) rather than the whole payload.

use serde_json::{Map, Value};

use crate::records::DataType;

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

fn num(item: &Value, key: &str) -> Option<f64> {
    item.get(key).and_then(Value::as_f64)
}

/// Numeric list, position preserved; non-numbers read as `None`.
fn nums(item: &Value, key: &str) -> Vec<Option<f64>> {
    item.get(key)
        .and_then(Value::as_array)
        .map(|values| values.iter().map(Value::as_f64).collect())
        .unwrap_or_default()
}

/// Display text; numbers are accepted and printed as-is.
fn text(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Physics payload pieces
// ---------------------------------------------------------------------------

/// One detector measurement (Higgs decay or energy timeline).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    pub invariant_mass: Option<f64>,
    pub photon1_energy: Option<f64>,
    pub photon2_energy: Option<f64>,
    pub energy: Option<f64>,
    pub time: Option<f64>,
}

impl From<&Value> for Measurement {
    fn from(item: &Value) -> Self {
        Self {
            invariant_mass: num(item, "invariant_mass"),
            photon1_energy: num(item, "photon1_energy"),
            photon2_energy: num(item, "photon2_energy"),
            energy: num(item, "energy"),
            time: num(item, "time"),
        }
    }
}

/// One cosmic-ray / collision track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collision {
    pub momentum: Option<f64>,
    pub angle: Option<f64>,
    pub energy_loss: Option<f64>,
    pub track_length: Option<f64>,
}

impl From<&Value> for Collision {
    fn from(item: &Value) -> Self {
        Self {
            momentum: num(item, "momentum"),
            angle: num(item, "angle"),
            energy_loss: num(item, "energy_loss"),
            track_length: num(item, "track_length"),
        }
    }
}

/// One Bell-test correlation measurement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantumMeasurement {
    pub angle: Option<f64>,
    pub correlation: Option<f64>,
    pub measurement_count: Option<f64>,
    pub statistical_error: Option<f64>,
}

impl From<&Value> for QuantumMeasurement {
    fn from(item: &Value) -> Self {
        Self {
            angle: num(item, "angle"),
            correlation: num(item, "correlation"),
            measurement_count: num(item, "measurement_count"),
            statistical_error: num(item, "statistical_error"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsUnits {
    pub energy: Option<String>,
    pub time: Option<String>,
    pub momentum: Option<String>,
    pub angle: Option<String>,
    pub correlation: Option<String>,
}

impl From<&Value> for PhysicsUnits {
    fn from(units: &Value) -> Self {
        Self {
            energy: text(units, "energy"),
            time: text(units, "time"),
            momentum: text(units, "momentum"),
            angle: text(units, "angle"),
            correlation: text(units, "correlation"),
        }
    }
}

// ---------------------------------------------------------------------------
// Computer science payload pieces
// ---------------------------------------------------------------------------

/// Training curve of one model. Curves keep their positions so epochs and
/// values stay aligned when an entry is unreadable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub name: String,
    pub epochs: Vec<Option<f64>>,
    pub accuracy: Vec<Option<f64>>,
    pub loss: Vec<Option<f64>>,
    pub parameters: Option<String>,
    pub training_time_per_epoch: Option<String>,
}

impl From<&Value> for Model {
    fn from(item: &Value) -> Self {
        Self {
            name: text(item, "name").unwrap_or_default(),
            epochs: nums(item, "epochs"),
            accuracy: nums(item, "accuracy"),
            loss: nums(item, "loss"),
            parameters: text(item, "parameters"),
            training_time_per_epoch: text(item, "training_time_per_epoch"),
        }
    }
}

/// Benchmark of one algorithm, with input sizes resolved from either
/// `inputSize` or `input_size`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Algorithm {
    pub name: String,
    pub runtime: Vec<Option<f64>>,
    pub input_sizes: Vec<Option<f64>>,
    pub complexity: Option<String>,
}

impl From<&Value> for Algorithm {
    fn from(item: &Value) -> Self {
        let camel = nums(item, "inputSize");
        Self {
            name: text(item, "name").unwrap_or_default(),
            runtime: nums(item, "runtime"),
            input_sizes: if camel.is_empty() {
                nums(item, "input_size")
            } else {
                camel
            },
            complexity: text(item, "complexity"),
        }
    }
}

/// One hourly network sample. The timestamp is kept raw: it may be a
/// string or epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metric {
    pub timestamp: Option<Value>,
    pub bandwidth: Option<f64>,
    pub latency: Option<f64>,
    pub packet_loss: Option<f64>,
    pub signal_strength: Option<f64>,
    pub user_count: Option<f64>,
}

impl From<&Value> for Metric {
    fn from(item: &Value) -> Self {
        Self {
            timestamp: item.get("timestamp").filter(|v| !v.is_null()).cloned(),
            bandwidth: num(item, "bandwidth"),
            latency: num(item, "latency"),
            packet_loss: num(item, "packet_loss"),
            signal_strength: num(item, "signal_strength"),
            user_count: num(item, "user_count"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsUnits {
    pub bandwidth: Option<String>,
    pub latency: Option<String>,
    pub packet_loss: Option<String>,
}

impl From<&Value> for CsUnits {
    fn from(units: &Value) -> Self {
        Self {
            bandwidth: text(units, "bandwidth"),
            latency: text(units, "latency"),
            packet_loss: text(units, "packet_loss"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestEnvironment {
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub compiler: Option<String>,
    pub optimization: Option<String>,
}

impl From<&Value> for TestEnvironment {
    fn from(env: &Value) -> Self {
        Self {
            cpu: text(env, "cpu"),
            memory: text(env, "memory"),
            compiler: text(env, "compiler"),
            optimization: text(env, "optimization"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A payload reconstructed as an explicit variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    HiggsDecay {
        measurements: Vec<Measurement>,
        units: PhysicsUnits,
    },
    Entanglement {
        measurements: Vec<QuantumMeasurement>,
        bell_parameter: Option<f64>,
        units: PhysicsUnits,
    },
    EnergyTimeline {
        measurements: Vec<Measurement>,
        units: PhysicsUnits,
    },
    Collisions {
        collisions: Vec<Collision>,
        units: PhysicsUnits,
    },
    /// Only the first declared model is kept.
    Training {
        model: Model,
    },
    Algorithms {
        algorithms: Vec<Algorithm>,
        test_environment: Option<TestEnvironment>,
    },
    Network {
        metrics: Vec<Metric>,
        units: CsUnits,
    },
    Unrecognized,
}

/// Classify `payload` for a record of type `data_type`.
pub fn classify(data_type: &DataType, payload: &Value) -> Payload {
    let Some(obj) = payload.as_object() else {
        return Payload::Unrecognized;
    };
    let classified = match data_type {
        DataType::Physics => classify_physics(obj),
        DataType::ComputerScience => classify_cs(obj),
        DataType::Other(_) => None,
    };
    classified.unwrap_or(Payload::Unrecognized)
}

/// Physics priority: invariant mass → quantum → measurements → collisions.
fn classify_physics(obj: &Map<String, Value>) -> Option<Payload> {
    if let Some(raw) = present(obj, "measurements")
        && has_invariant_mass(raw)
    {
        return Some(Payload::HiggsDecay {
            measurements: items(raw)?,
            units: units(obj),
        });
    }
    if let Some(raw) = present(obj, "quantum_measurements") {
        return Some(Payload::Entanglement {
            measurements: items(raw)?,
            bell_parameter: obj.get("bell_parameter").and_then(Value::as_f64),
            units: units(obj),
        });
    }
    if let Some(raw) = present(obj, "measurements") {
        return Some(Payload::EnergyTimeline {
            measurements: items(raw)?,
            units: units(obj),
        });
    }
    if let Some(raw) = present(obj, "collisions") {
        return Some(Payload::Collisions {
            collisions: items(raw)?,
            units: units(obj),
        });
    }
    None
}

/// CS priority: models → algorithms → metrics; empty lists don't count.
fn classify_cs(obj: &Map<String, Value>) -> Option<Payload> {
    if let Some(raw) = non_empty(obj, "models") {
        let first = raw.as_array()?.first().filter(|m| m.is_object())?;
        return Some(Payload::Training {
            model: Model::from(first),
        });
    }
    if let Some(raw) = non_empty(obj, "algorithms") {
        return Some(Payload::Algorithms {
            algorithms: items(raw)?,
            test_environment: present(obj, "test_environment")
                .filter(|env| env.is_object())
                .map(TestEnvironment::from),
        });
    }
    if let Some(raw) = non_empty(obj, "metrics") {
        return Some(Payload::Network {
            metrics: items(raw)?,
            units: units(obj),
        });
    }
    None
}

fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn non_empty<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    present(obj, key).filter(|v| v.as_array().is_some_and(|a| !a.is_empty()))
}

/// A zero mass does not mark the payload as a Higgs decay.
fn has_invariant_mass(measurements: &Value) -> bool {
    measurements.as_array().is_some_and(|items| {
        items
            .iter()
            .any(|m| num(m, "invariant_mass").is_some_and(|mass| mass != 0.0))
    })
}

/// Every item of a JSON array; `None` when the field is not an array.
fn items<'a, T: From<&'a Value>>(raw: &'a Value) -> Option<Vec<T>> {
    Some(raw.as_array()?.iter().map(T::from).collect())
}

fn units<T: for<'a> From<&'a Value> + Default>(obj: &Map<String, Value>) -> T {
    present(obj, "units")
        .filter(|u| u.is_object())
        .map(T::from)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
