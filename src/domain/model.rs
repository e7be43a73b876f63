use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orbital environment, keyed to an integral proton flux (cm^-2 s^-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flux {
    Leo,
    VanAllen,
    Mars,
    Europa,
    JupiterBelt,
}

impl Flux {
    pub const ALL: [Flux; 5] = [
        Flux::Leo,
        Flux::VanAllen,
        Flux::Mars,
        Flux::Europa,
        Flux::JupiterBelt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flux::Leo => "LEO",
            Flux::VanAllen => "VAN_ALLEN",
            Flux::Mars => "MARS",
            Flux::Europa => "EUROPA",
            Flux::JupiterBelt => "JUPITER_BELT",
        }
    }
}

/// Device susceptibility tier, keyed to a per-bit cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossSection {
    High,
    Medium,
    Low,
}

impl CrossSection {
    pub const ALL: [CrossSection; 3] = [CrossSection::High, CrossSection::Medium, CrossSection::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            CrossSection::High => "HIGH",
            CrossSection::Medium => "MEDIUM",
            CrossSection::Low => "LOW",
        }
    }
}

/// Location for the annual-rate model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Location {
    Leo,
    Jupiter,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Leo, Location::Jupiter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Leo => "LEO",
            Location::Jupiter => "JUPITER",
        }
    }
}

macro_rules! tag_parsing {
    ($ty:ty) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|tag| tag.as_str() == s)
                    .ok_or_else(|| format!("unknown tag '{}'", s))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

tag_parsing!(Flux);
tag_parsing!(CrossSection);
tag_parsing!(Location);

/// How a resolved probability maps onto the per-byte corruption chance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Semantics {
    /// The probability is per bit; a byte is hit with chance `8p`.
    #[default]
    PerBit,
    /// The probability is already per byte.
    PerByte,
}

impl FromStr for Semantics {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "per-bit" => Ok(Semantics::PerBit),
            "per-byte" => Ok(Semantics::PerByte),
            other => Err(format!(
                "unknown semantics '{}', expected per-bit or per-byte",
                other
            )),
        }
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semantics::PerBit => f.write_str("per-bit"),
            Semantics::PerByte => f.write_str("per-byte"),
        }
    }
}

/// What to do with a resolved probability outside [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbabilityPolicy {
    #[default]
    Clamp,
    Reject,
    Passthrough,
}

impl FromStr for ProbabilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "clamp" => Ok(ProbabilityPolicy::Clamp),
            "reject" => Ok(ProbabilityPolicy::Reject),
            "passthrough" => Ok(ProbabilityPolicy::Passthrough),
            other => Err(format!(
                "unknown probability policy '{}', expected clamp, reject or passthrough",
                other
            )),
        }
    }
}

impl fmt::Display for ProbabilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilityPolicy::Clamp => f.write_str("clamp"),
            ProbabilityPolicy::Reject => f.write_str("reject"),
            ProbabilityPolicy::Passthrough => f.write_str("passthrough"),
        }
    }
}

/// Raw rate inputs as the user supplied them. Tags stay unparsed so the
/// rate model decides how unknown values are handled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateRequest {
    pub flip_probability: Option<f64>,
    pub flux: Option<String>,
    pub cross_section: Option<String>,
    pub location: Option<String>,
    pub years: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RateSource {
    Explicit,
    Physical {
        flux: Flux,
        cross_section: CrossSection,
        years: f64,
    },
    Location {
        location: Location,
        years: f64,
    },
    /// Unknown location tag; the fallback probability was used instead.
    LocationFallback { tag: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRate {
    pub probability: f64,
    pub source: RateSource,
    /// Set when the range policy changed the raw value.
    pub adjusted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorruptionStats {
    pub bytes_processed: u64,
    pub bytes_flipped: u64,
}

impl CorruptionStats {
    pub fn flipped_fraction(&self) -> f64 {
        if self.bytes_processed == 0 {
            0.0
        } else {
            self.bytes_flipped as f64 / self.bytes_processed as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_file: String,
    pub output_file: String,
    pub rate: ResolvedRate,
    pub semantics: Semantics,
    pub seed: u64,
    pub stats: CorruptionStats,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}
