//! Sample datasets served by the development backend.
//!
//! Three physics and three computer science datasets, regenerated on every
//! server start. Values follow the shape of the real experiments they
//! imitate (Higgs peak near 125 GeV, Bell correlations of `-cos 2θ`, ...)
//! with random noise on top.

use std::f64::consts::PI;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde_json::{Value, json};

/// Every dataset, newest first, in the backend's snake_case wire shape.
pub fn generate(rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<Value> {
    let bodies = vec![
        higgs_decay(rng),
        cosmic_ray_muons(rng),
        bell_test(rng),
        sorting_benchmarks(),
        model_training(rng),
        network_5g(rng),
    ];

    // Later entries were "inserted" later.
    let count = bodies.len() as i64;
    let mut records: Vec<Value> = bodies
        .into_iter()
        .enumerate()
        .map(|(i, (title, description, data_type, data))| {
            let at = (now - Duration::minutes(count - i as i64)).to_rfc3339();
            json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "title": title,
                "description": description,
                "data_type": data_type,
                "data": data,
                "created_at": at,
                "updated_at": at,
            })
        })
        .collect();
    records.reverse();
    records
}

type Body = (&'static str, &'static str, &'static str, Value);

fn round(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

/// Standard normal sample (Box-Muller).
fn normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Exponential sample with unit mean.
fn exponential(rng: &mut impl Rng) -> f64 {
    -rng.gen_range(f64::EPSILON..1.0).ln()
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

fn higgs_decay(rng: &mut impl Rng) -> Body {
    let measurements: Vec<Value> = (0..50)
        .map(|i| {
            let mut mass = 125.0 + normal(rng) * 2.5;
            if !(110.0..=140.0).contains(&mass) {
                mass = 120.0 + rng.gen_range(0.0..10.0);
            }
            let photon1 = 20.0 + rng.gen_range(0.0..80.0);
            let photon2 = mass - photon1 + normal(rng) * 5.0;
            json!({
                "invariant_mass": round(mass, 2),
                "photon1_energy": round(photon1, 2),
                "photon2_energy": round(photon2, 2),
                "time": f64::from(i) * 0.025,
            })
        })
        .collect();

    (
        "LHC Higgs Boson Decay Analysis",
        "Collision data from the ATLAS experiment showing Higgs boson decay to two photons",
        "physics",
        json!({
            "experiment": "ATLAS",
            "collision_energy": "13TeV",
            "luminosity": "139 fb^-1",
            "measurements": measurements,
            "units": {"energy": "GeV", "time": "ns", "momentum": "GeV/c"},
        }),
    )
}

fn cosmic_ray_muons(rng: &mut impl Rng) -> Body {
    let collisions: Vec<Value> = (0..30)
        .map(|_| {
            json!({
                "momentum": round(1.0 + exponential(rng) * 10.0, 2),
                "angle": round(rng.gen_range(0.0..180.0), 1),
                "energy_loss": round(2.0 + rng.gen_range(0.0..8.0), 2),
                "track_length": round(5.0 + rng.gen_range(0.0..15.0), 1),
            })
        })
        .collect();

    (
        "Cosmic Ray Muon Detection",
        "High-energy muon detection data from cosmic ray interactions",
        "physics",
        json!({
            "experiment": "CMS",
            "detector_type": "Muon Chambers",
            "collisions": collisions,
            "background_rate": 2.3,
        }),
    )
}

fn bell_test(rng: &mut impl Rng) -> Body {
    let measurements: Vec<Value> = [0.0, 22.5, 45.0, 67.5, 90.0, 112.5, 135.0, 157.5]
        .into_iter()
        .map(|angle: f64| {
            let correlation = -(2.0 * angle.to_radians()).cos() + (rng.r#gen::<f64>() - 0.5) * 0.1;
            json!({
                "angle": angle,
                "correlation": round(correlation, 3),
                "measurement_count": rng.gen_range(1000..1500),
                "statistical_error": round(rng.r#gen::<f64>() * 0.05, 3),
            })
        })
        .collect();

    (
        "Bell State Quantum Entanglement",
        "Quantum entanglement correlation measurements violating Bell inequalities",
        "physics",
        json!({
            "experiment_type": "Bell Test",
            "quantum_measurements": measurements,
            "bell_parameter": 2.82,
            "units": {"correlation": "dimensionless", "angle": "degrees"},
        }),
    )
}

// ---------------------------------------------------------------------------
// Computer science
// ---------------------------------------------------------------------------

fn sorting_benchmarks() -> Body {
    const SIZES: [u32; 6] = [1_000, 5_000, 10_000, 50_000, 100_000, 500_000];

    let runtimes = |cost: &dyn Fn(f64) -> f64| -> Vec<f64> {
        SIZES.iter().map(|&n| round(cost(f64::from(n)), 3)).collect()
    };
    let algorithm = |name: &str, complexity: &str, runtime: Vec<f64>| {
        json!({
            "name": name,
            "runtime": runtime,
            "input_size": SIZES,
            "complexity": complexity,
        })
    };

    let algorithms = vec![
        algorithm(
            "QuickSort",
            "O(n log n) avg, O(n²) worst",
            runtimes(&|n: f64| n * n.ln() / 1_000_000.0),
        ),
        algorithm("MergeSort", "O(n log n)", runtimes(&|n: f64| n * n.ln() / 800_000.0)),
        algorithm(
            "TimSort",
            "O(n) to O(n log n)",
            runtimes(&|n: f64| n * n.ln() / 900_000.0),
        ),
        algorithm("RadixSort", "O(kn)", runtimes(&|n: f64| n * 4.0 / 1_000_000.0)),
    ];

    (
        "Modern Sorting Algorithm Performance",
        "Benchmarks of sorting algorithms on various data distributions",
        "computer_science",
        json!({
            "algorithms": algorithms,
            "test_environment": {
                "cpu": "Intel i9-13900K",
                "memory": "32GB DDR5-5600",
                "compiler": "GCC 13.2",
                "optimization": "-O3",
            },
        }),
    )
}

fn training_curve(
    rng: &mut impl Rng,
    accuracy: (f64, f64, f64, f64),
    loss: (f64, f64, f64, f64),
) -> (Vec<u32>, Vec<f64>, Vec<f64>) {
    let epochs: Vec<u32> = (1..=100).collect();
    let (a_base, a_gain, a_tau, a_noise) = accuracy;
    let (l_scale, l_tau, l_floor, l_noise) = loss;
    let mut acc = Vec::with_capacity(epochs.len());
    let mut los = Vec::with_capacity(epochs.len());
    for &e in &epochs {
        let e = f64::from(e);
        acc.push(round(
            a_base + a_gain * (1.0 - (-e / a_tau).exp()) + rng.r#gen::<f64>() * a_noise,
            3,
        ));
        los.push(round(
            l_scale * (-e / l_tau).exp() + l_floor + rng.r#gen::<f64>() * l_noise,
            3,
        ));
    }
    (epochs, acc, los)
}

fn model_training(rng: &mut impl Rng) -> Body {
    let (epochs, accuracy, loss) =
        training_curve(rng, (0.1, 0.65, 20.0, 0.05), (2.3, 15.0, 0.1, 0.1));
    let resnet = json!({
        "name": "ResNet-50",
        "epochs": epochs,
        "accuracy": accuracy,
        "loss": loss,
        "parameters": "25.6M",
        "training_time_per_epoch": "4.2 minutes",
    });

    let (epochs, accuracy, loss) =
        training_curve(rng, (0.05, 0.75, 25.0, 0.03), (2.8, 18.0, 0.08, 0.08));
    let vit = json!({
        "name": "Vision Transformer",
        "epochs": epochs,
        "accuracy": accuracy,
        "loss": loss,
        "parameters": "86.6M",
        "training_time_per_epoch": "6.8 minutes",
    });

    (
        "Deep Learning Model Training Metrics",
        "Training performance data for various neural network architectures",
        "computer_science",
        json!({
            "models": [resnet, vit],
            "dataset": "ImageNet-1K",
            "hardware": "NVIDIA RTX 4090",
        }),
    )
}

fn network_5g(rng: &mut impl Rng) -> Body {
    let metrics: Vec<Value> = (0..24u32)
        .map(|hour| {
            // Business hours, evening peak, night.
            let (bandwidth, latency, packet_loss) = match hour {
                8..=18 => (
                    800.0 + rng.gen_range(0.0..400.0),
                    8.0 + rng.gen_range(0.0..12.0),
                    rng.gen_range(0.0..0.5),
                ),
                19..=23 => (
                    600.0 + rng.gen_range(0.0..600.0),
                    10.0 + rng.gen_range(0.0..15.0),
                    rng.gen_range(0.0..0.8),
                ),
                _ => (
                    1000.0 + rng.gen_range(0.0..500.0),
                    3.0 + rng.gen_range(0.0..7.0),
                    rng.gen_range(0.0..0.2),
                ),
            };
            json!({
                "timestamp": format!("2024-01-15T{hour:02}:00:00Z"),
                "bandwidth": round(bandwidth, 1),
                "latency": round(latency, 1),
                "packet_loss": round(packet_loss, 3),
                "signal_strength": -70.0 + rng.gen_range(0.0..20.0),
                "user_count": rng.gen_range(50..250),
            })
        })
        .collect();

    (
        "5G Network Performance Analysis",
        "5G network performance metrics across different conditions",
        "computer_science",
        json!({
            "metrics": metrics,
            "test_locations": ["Urban", "Suburban", "Rural"],
            "units": {"bandwidth": "Mbps", "latency": "ms", "packet_loss": "%"},
        }),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::payload::{Payload, classify};
    use crate::records::normalize_all;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample() -> Vec<Value> {
        generate(&mut StdRng::seed_from_u64(7), Utc::now())
    }

    #[test]
    fn six_datasets_newest_first() {
        let records = normalize_all(&sample()).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].title, "5G Network Performance Analysis");
        assert_eq!(records[5].title, "LHC Higgs Boson Decay Analysis");
        assert!(records.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    #[test]
    fn every_dataset_has_a_layout() {
        let kinds: Vec<&str> = normalize_all(&sample())
            .unwrap()
            .iter()
            .map(|r| match classify(&r.data_type, &r.payload) {
                Payload::HiggsDecay { .. } => "higgs",
                Payload::Entanglement { .. } => "bell",
                Payload::EnergyTimeline { .. } => "timeline",
                Payload::Collisions { .. } => "collisions",
                Payload::Training { .. } => "training",
                Payload::Algorithms { .. } => "algorithms",
                Payload::Network { .. } => "network",
                Payload::Unrecognized => "none",
            })
            .collect();
        assert_eq!(
            kinds,
            ["network", "training", "algorithms", "bell", "collisions", "higgs"]
        );
    }

    #[test]
    fn higgs_masses_stay_in_window() {
        let data = &sample()[5]["data"]["measurements"];
        for m in data.as_array().unwrap() {
            let mass = m["invariant_mass"].as_f64().unwrap();
            assert!((110.0..=140.0).contains(&mass), "mass {mass}");
        }
    }
}
