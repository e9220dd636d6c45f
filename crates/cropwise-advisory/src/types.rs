use serde::{Deserialize, Serialize};

/// How urgent an advisory is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory categories. Unknown wire values fall back to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    Irrigation,
    FungalRisk,
    FrostRisk,
    WindCaution,
    HeatStress,
    #[default]
    #[serde(other)]
    General,
}

impl AdvisoryKind {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Irrigation => "Irrigation",
            Self::FungalRisk => "Fungal risk",
            Self::FrostRisk => "Frost risk",
            Self::WindCaution => "Wind caution",
            Self::HeatStress => "Heat stress",
            Self::General => "General",
        }
    }

    /// Icon name for renderers
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Irrigation => "droplet",
            Self::FungalRisk => "flask",
            Self::FrostRisk => "snowflake",
            Self::WindCaution => "wind",
            Self::HeatStress => "sun",
            Self::General => "info",
        }
    }
}

/// A single actionable recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AdvisoryKind,
    pub severity: Severity,
    pub title: String,
    pub reason: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Where an advisory result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySource {
    Live,
    Fallback,
}

/// Advisories for one key plus the resolved location label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResult {
    pub advisories: Vec<Advisory>,
    pub location_label: String,
    pub source: AdvisorySource,
}

impl AdvisoryResult {
    pub fn is_fallback(&self) -> bool {
        self.source == AdvisorySource::Fallback
    }
}

/// One day of the short-range outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPoint {
    /// Unix seconds
    pub dt: i64,
    pub t_min: f64,
    pub t_max: f64,
    pub rain_mm: f64,
    /// Probability of precipitation, 0..=1
    pub pop: f64,
}

/// Daily points ascending by `dt`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub daily: Vec<DayPoint>,
}

impl ForecastSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts points by `dt` and clamps `pop` into [0, 1].
    pub fn from_points(mut daily: Vec<DayPoint>) -> Self {
        daily.sort_by_key(|p| p.dt);
        for point in &mut daily {
            point.pop = if point.pop.is_nan() {
                0.0
            } else {
                point.pop.clamp(0.0, 1.0)
            };
        }
        Self { daily }
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    pub fn len(&self) -> usize {
        self.daily.len()
    }
}

/// A place candidate returned by the location lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

/// Identifies one advisory/forecast request pair. Equality is exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationKey {
    pub lat: f64,
    pub lon: f64,
    pub crop: String,
}

impl std::fmt::Display for OrchestrationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}, {}", self.crop, self.lat, self.lon)
    }
}

/// Key fields as they arrive from navigation; any may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub crop: Option<String>,
}

impl KeyParams {
    pub fn new(lat: Option<f64>, lon: Option<f64>, crop: Option<&str>) -> Self {
        Self {
            lat,
            lon,
            crop: crop.map(str::to_string),
        }
    }

    /// Coordinates of a chosen suggestion paired with a crop.
    pub fn from_suggestion(suggestion: &Suggestion, crop: Option<&str>) -> Self {
        Self::new(Some(suggestion.lat), Some(suggestion.lon), crop)
    }

    /// The full key, or `None` when a field is missing. Blank crops and
    /// non-finite coordinates count as missing.
    pub fn complete(&self) -> Option<OrchestrationKey> {
        let lat = self.lat.filter(|v| v.is_finite())?;
        let lon = self.lon.filter(|v| v.is_finite())?;
        let crop = self.crop.as_deref().filter(|c| !c.trim().is_empty())?;
        Some(OrchestrationKey {
            lat,
            lon,
            crop: crop.to_string(),
        })
    }
}

/// Crops offered by the crop picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Corn,
    Soybeans,
    Wheat,
    Rice,
    Barley,
    Canola,
}

impl Crop {
    pub const ALL: [Crop; 6] = [
        Crop::Corn,
        Crop::Soybeans,
        Crop::Wheat,
        Crop::Rice,
        Crop::Barley,
        Crop::Canola,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corn => "corn",
            Self::Soybeans => "soybeans",
            Self::Wheat => "wheat",
            Self::Rice => "rice",
            Self::Barley => "barley",
            Self::Canola => "canola",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Corn => "Corn",
            Self::Soybeans => "Soybeans",
            Self::Wheat => "Wheat",
            Self::Rice => "Rice",
            Self::Barley => "Barley",
            Self::Canola => "Canola",
        }
    }
}

impl std::fmt::Display for Crop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Crop {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Crop::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Crop::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown crop '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
