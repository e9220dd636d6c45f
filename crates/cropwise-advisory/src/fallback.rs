//! Built-in advisories shown when the live advisory fetch fails.

use crate::types::{Advisory, AdvisoryKind, AdvisoryResult, AdvisorySource, OrchestrationKey, Severity};

/// Location label derived from raw coordinates, e.g. `"40, -75"`.
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("{}, {}", lat, lon)
}

fn advisory(
    id: &str,
    kind: AdvisoryKind,
    severity: Severity,
    title: &str,
    reason: &str,
    action: &str,
    tags: &[&str],
) -> Advisory {
    Advisory {
        id: id.to_string(),
        kind,
        severity,
        title: title.to_string(),
        reason: reason.to_string(),
        action: action.to_string(),
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
    }
}

/// The fixed representative advisory set.
pub fn fallback_advisories() -> Vec<Advisory> {
    vec![
        advisory(
            "demo1",
            AdvisoryKind::Irrigation,
            Severity::Medium,
            "Irrigation advisable",
            "Hot & dry window (max 31°C; low rain next 48h).",
            "Irrigate early; check soil moisture and avoid runoff.",
            &["heat", "water"],
        ),
        advisory(
            "demo2",
            AdvisoryKind::FungalRisk,
            Severity::High,
            "Fungal disease risk",
            "Humid conditions with heavy rain expected (12 mm, RH 88%).",
            "Scout susceptible areas; consider preventive fungicide spray.",
            &["disease", "moisture"],
        ),
        advisory(
            "demo3",
            AdvisoryKind::FrostRisk,
            Severity::Low,
            "Light frost risk",
            "Nighttime lows near 2 °C in the next 48h.",
            "Cover seedlings or use row covers in low-lying areas.",
            &["cold", "protection"],
        ),
        advisory(
            "demo4",
            AdvisoryKind::WindCaution,
            Severity::Medium,
            "Windy for spraying",
            "Peak wind gusts 6.5 m/s expected tomorrow afternoon.",
            "Avoid spraying during windy hours; reschedule if possible.",
            &["drift", "spraying"],
        ),
        advisory(
            "demo5",
            AdvisoryKind::HeatStress,
            Severity::High,
            "Heat stress warning",
            "Temperatures may exceed 35 °C for 2 consecutive days.",
            "Irrigate in early morning and monitor crops for wilting.",
            &["heat", "stress"],
        ),
    ]
}

/// Fallback result for a key: the built-in set labelled with raw coordinates.
pub fn fallback_result(key: &OrchestrationKey) -> AdvisoryResult {
    AdvisoryResult {
        advisories: fallback_advisories(),
        location_label: coordinate_label(key.lat, key.lon),
        source: AdvisorySource::Fallback,
    }
}
