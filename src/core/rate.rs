//! Flip-probability resolution.
//!
//! Three input modes produce a single probability:
//! - explicit: `--flip_probability` as given
//! - physical: flux x cross-section x years x seconds per year
//! - location: annual rate x years, falling back to the explicit
//!   probability when the location tag is unknown

use crate::domain::model::{
    CrossSection, Flux, Location, ProbabilityPolicy, RateRequest, RateSource, ResolvedRate,
};
use crate::utils::error::{FlipError, Result};
use crate::utils::validation::{validate_finite, validate_range, validate_required_field};

pub const SECONDS_PER_YEAR: f64 = (60 * 60 * 24 * 365) as f64;

/// Probability used by the location model when no explicit one is given.
pub const DEFAULT_FALLBACK_PROBABILITY: f64 = 0.5;

/// Integral flux above 10 MeV, cm^-2 s^-1.
pub fn flux_value(flux: Flux) -> f64 {
    match flux {
        Flux::Leo => 10.0,
        Flux::VanAllen => 1e5,
        Flux::Mars => 0.1,
        Flux::Europa => 1e5,
        Flux::JupiterBelt => 1e7,
    }
}

/// Per-bit upset cross-section.
pub fn cross_section_value(cross_section: CrossSection) -> f64 {
    match cross_section {
        CrossSection::High => 1e-10,
        CrossSection::Medium => 1e-12,
        CrossSection::Low => 1e-15,
    }
}

/// Bit flips per bit per year.
pub fn annual_rate_value(location: Location) -> f64 {
    match location {
        Location::Leo => 1e-7,
        Location::Jupiter => 1e-4,
    }
}

fn choices<T: std::fmt::Display>(all: &[T]) -> String {
    all.iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_flux(tag: &str) -> Result<Flux> {
    tag.parse().map_err(|_| FlipError::InvalidChoiceError {
        field: "flux".to_string(),
        value: tag.to_string(),
        choices: choices(&Flux::ALL),
    })
}

fn parse_cross_section(tag: &str) -> Result<CrossSection> {
    tag.parse().map_err(|_| FlipError::InvalidChoiceError {
        field: "cross section".to_string(),
        value: tag.to_string(),
        choices: choices(&CrossSection::ALL),
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RateModel {
    policy: ProbabilityPolicy,
}

impl RateModel {
    pub fn new(policy: ProbabilityPolicy) -> Self {
        Self { policy }
    }

    /// Resolves the request into a single probability. Pure: equal requests
    /// always produce equal results.
    pub fn resolve(&self, request: &RateRequest) -> Result<ResolvedRate> {
        validate_finite("flip_probability", request.flip_probability)?;
        validate_finite("years", request.years)?;

        let (raw, source) = self.resolve_raw(request)?;
        let (probability, adjusted) = self.apply_policy(raw)?;

        Ok(ResolvedRate {
            probability,
            source,
            adjusted,
        })
    }

    fn resolve_raw(&self, request: &RateRequest) -> Result<(f64, RateSource)> {
        let physical = request.flux.is_some() || request.cross_section.is_some();

        if let Some(tag) = &request.location {
            if physical {
                return Err(FlipError::conflicting(
                    "You cannot combine --location with --flux/--cross_section options.",
                ));
            }
            let years = *validate_required_field("years", &request.years)?;

            return Ok(match tag.parse::<Location>() {
                Ok(location) => (
                    annual_rate_value(location) * years,
                    RateSource::Location { location, years },
                ),
                Err(_) => {
                    let fallback = request
                        .flip_probability
                        .unwrap_or(DEFAULT_FALLBACK_PROBABILITY);
                    tracing::warn!(
                        "Unknown location '{}', falling back to flip probability {}",
                        tag,
                        fallback
                    );
                    (fallback, RateSource::LocationFallback { tag: tag.clone() })
                }
            });
        }

        if let Some(probability) = request.flip_probability {
            if physical || request.years.is_some() {
                return Err(FlipError::conflicting(
                    "You cannot provide both a flip probability and specify flux/cross section/years options.",
                ));
            }
            return Ok((probability, RateSource::Explicit));
        }

        match (&request.flux, &request.cross_section, request.years) {
            (Some(flux), Some(cross_section), Some(years)) => {
                let flux = parse_flux(flux)?;
                let cross_section = parse_cross_section(cross_section)?;
                let probability = flux_value(flux)
                    * cross_section_value(cross_section)
                    * years
                    * SECONDS_PER_YEAR;
                Ok((
                    probability,
                    RateSource::Physical {
                        flux,
                        cross_section,
                        years,
                    },
                ))
            }
            _ => Err(FlipError::config(
                "You must either provide a flip probability or a flux, a cross section, and a number of years.",
            )),
        }
    }

    fn apply_policy(&self, raw: f64) -> Result<(f64, bool)> {
        if (0.0..=1.0).contains(&raw) {
            return Ok((raw, false));
        }

        match self.policy {
            ProbabilityPolicy::Clamp => {
                let clamped = raw.clamp(0.0, 1.0);
                tracing::warn!(
                    "Resolved flip probability {} is outside [0, 1], clamped to {}",
                    raw,
                    clamped
                );
                Ok((clamped, true))
            }
            ProbabilityPolicy::Reject => {
                validate_range("flip_probability", raw, 0.0, 1.0)?;
                Ok((raw, false))
            }
            ProbabilityPolicy::Passthrough => {
                tracing::debug!("Passing out-of-range flip probability {} through", raw);
                Ok((raw, false))
            }
        }
    }
}
