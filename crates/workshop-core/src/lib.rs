#![deny(warnings)]

//! Core domain models and invariants for the steering workshop.
//!
//! This crate defines the serializable types shared by the calculator, the
//! session runtime and the persistence layer, together with validation
//! helpers that guard every value before it reaches a formula.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod catalog;
pub mod risk;
pub mod survey;

/// Number of markets every design is scored against.
pub const MARKET_COUNT: usize = 3;
/// Upper bound of the minimum turning radius, in meters.
pub const MAX_TURNING_RADIUS_M: f64 = 50.0;
/// Upper bound of price and cost, in kilo-euros.
pub const MAX_MONEY_KEUR: f64 = 500.0;
/// Upper bound of a market size, in trucks per year.
pub const MAX_MARKET_SIZE: u32 = 200_000;

/// A candidate steering system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Design {
    /// Short name, e.g. "System 1".
    pub name: String,
    /// Free-text description of the architecture.
    pub description: String,
    /// Minimum turning radius in meters, in (0, 50].
    pub min_turning_radius: f64,
    /// Probability of operating without failure, in (0, 1].
    pub reliability: f64,
    /// Fuel consumption figure (> 0) used by consumption-aware formulas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_consumption: Option<f64>,
    /// Electricity consumption figure (> 0) used by consumption-aware formulas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_consumption: Option<f64>,
    /// Selling price in kilo-euros, in (0, 500].
    pub price: f64,
    /// Unit cost in kilo-euros, in [0, 500].
    pub cost: f64,
}

impl Design {
    /// Unit margin; negative when the design sells below cost.
    pub fn margin(&self) -> f64 {
        self.price - self.cost
    }
}

/// Addressable customer segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketId {
    /// Cold-climate haulage.
    Artic,
    /// Hot-climate haulage.
    Desert,
    /// Special vehicles and indoor operation.
    Special,
}

impl MarketId {
    /// All markets in scoring order.
    pub const ALL: [MarketId; MARKET_COUNT] = [MarketId::Artic, MarketId::Desert, MarketId::Special];

    /// Chart label.
    pub fn label(self) -> &'static str {
        match self {
            MarketId::Artic => "Artic",
            MarketId::Desert => "Desert",
            MarketId::Special => "Special",
        }
    }

    /// Long, human-readable name.
    pub fn long_name(self) -> &'static str {
        match self {
            MarketId::Special => "Special/Indoors",
            other => other.label(),
        }
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A market segment with its yearly size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Segment identifier.
    pub id: MarketId,
    /// Addressable trucks per year, in [0, 200000].
    pub size: u32,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("non-finite value for {0}")]
    NonFinite(&'static str),
    /// Design names are used as series labels and must not be blank.
    #[error("design name must not be blank")]
    BlankName,
    /// Turning radius outside (0, 50].
    #[error("design `{name}`: turning radius {value} m is outside (0, 50]")]
    TurningRadiusOutOfRange { name: String, value: f64 },
    /// Reliability outside (0, 1].
    #[error("design `{name}`: reliability {value} is outside (0, 1]")]
    ReliabilityOutOfRange { name: String, value: f64 },
    /// Price outside (0, 500].
    #[error("design `{name}`: price {value} is outside (0, 500]")]
    PriceOutOfRange { name: String, value: f64 },
    /// Cost outside [0, 500].
    #[error("design `{name}`: cost {value} is outside [0, 500]")]
    CostOutOfRange { name: String, value: f64 },
    /// Consumption figures must be strictly positive when given.
    #[error("design `{name}`: {attribute} must be > 0")]
    NonPositiveConsumption { name: String, attribute: &'static str },
    /// Market size outside [0, 200000].
    #[error("market {market}: size {size} exceeds 200000")]
    MarketSizeOutOfRange { market: MarketId, size: u32 },
    /// Wrong number of markets.
    #[error("expected {expected} markets, found {found}")]
    MarketCount { expected: usize, found: usize },
    /// Markets must appear once each, in scoring order.
    #[error("market at position {position} should be {expected}, found {found}")]
    MarketOrder {
        position: usize,
        expected: MarketId,
        found: MarketId,
    },
    /// Unknown risk identifier.
    #[error("unknown risk: {0}")]
    UnknownRisk(String),
    /// Unknown mitigation identifier.
    #[error("unknown mitigation: {0}")]
    UnknownMitigation(String),
    /// Risk matrix cell outside the matrix.
    #[error("cell ({row}, {col}) is outside a {size}x{size} matrix")]
    CellOutOfBounds { row: usize, col: usize, size: usize },
    /// Risk matrix diagonal is undefined.
    #[error("diagonal cell ({0}, {0}) cannot hold a value")]
    DiagonalCell(usize),
    /// Workshop group outside 1..=12.
    #[error("workshop group {0} is out of range [1, 12]")]
    GroupOutOfRange(u8),
    /// Participant did not consent to data use.
    #[error("consent is required before any data is recorded")]
    ConsentMissing,
    /// Questionnaire rating outside [0, 5].
    #[error("rating for `{question}` must be within [0, 5], got {value}")]
    RatingOutOfRange { question: &'static str, value: f32 },
    /// Professional experience outside [0, 100] years.
    #[error("experience {0} years is out of range [0, 100]")]
    ExperienceOutOfRange(u32),
}

fn finite(value: f64, field: &'static str) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite(field))
    }
}

/// Validate a single design.
pub fn validate_design(d: &Design) -> Result<(), ValidationError> {
    if d.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    let radius = finite(d.min_turning_radius, "min_turning_radius")?;
    if radius <= 0.0 || radius > MAX_TURNING_RADIUS_M {
        return Err(ValidationError::TurningRadiusOutOfRange {
            name: d.name.clone(),
            value: radius,
        });
    }
    let reliability = finite(d.reliability, "reliability")?;
    if reliability <= 0.0 || reliability > 1.0 {
        return Err(ValidationError::ReliabilityOutOfRange {
            name: d.name.clone(),
            value: reliability,
        });
    }
    let price = finite(d.price, "price")?;
    if price <= 0.0 || price > MAX_MONEY_KEUR {
        return Err(ValidationError::PriceOutOfRange {
            name: d.name.clone(),
            value: price,
        });
    }
    let cost = finite(d.cost, "cost")?;
    if !(0.0..=MAX_MONEY_KEUR).contains(&cost) {
        return Err(ValidationError::CostOutOfRange {
            name: d.name.clone(),
            value: cost,
        });
    }
    for (attribute, value) in [
        ("fuel_consumption", d.fuel_consumption),
        ("electric_consumption", d.electric_consumption),
    ] {
        if let Some(v) = value {
            if finite(v, attribute)? <= 0.0 {
                return Err(ValidationError::NonPositiveConsumption {
                    name: d.name.clone(),
                    attribute,
                });
            }
        }
    }
    Ok(())
}

/// Validate every design of a table. An empty table is valid.
pub fn validate_designs(designs: &[Design]) -> Result<(), ValidationError> {
    designs.iter().try_for_each(validate_design)
}

/// Validate the market list: exactly three markets, in scoring order, within size bounds.
pub fn validate_markets(markets: &[Market]) -> Result<(), ValidationError> {
    if markets.len() != MARKET_COUNT {
        return Err(ValidationError::MarketCount {
            expected: MARKET_COUNT,
            found: markets.len(),
        });
    }
    for (position, (m, expected)) in markets.iter().zip(MarketId::ALL).enumerate() {
        if m.id != expected {
            return Err(ValidationError::MarketOrder {
                position,
                expected,
                found: m.id,
            });
        }
        if m.size > MAX_MARKET_SIZE {
            return Err(ValidationError::MarketSizeOutOfRange {
                market: m.id,
                size: m.size,
            });
        }
    }
    Ok(())
}

/// Designs every session starts from.
pub fn default_designs() -> Vec<Design> {
    vec![
        Design {
            name: "System 1".to_string(),
            description: "Only front steering".to_string(),
            min_turning_radius: 10.7,
            reliability: 0.92,
            fuel_consumption: Some(6.5),
            electric_consumption: Some(0.1),
            price: 100.0,
            cost: 90.0,
        },
        Design {
            name: "System 2".to_string(),
            description: "Front + Back steering (hydraulic)".to_string(),
            min_turning_radius: 8.0,
            reliability: 0.8,
            fuel_consumption: Some(3.5),
            electric_consumption: Some(0.1),
            price: 110.0,
            cost: 100.0,
        },
        Design {
            name: "System 3".to_string(),
            description: "Front + Back steering (electric)".to_string(),
            min_turning_radius: 7.6,
            reliability: 0.9,
            fuel_consumption: Some(0.1),
            electric_consumption: Some(3.5),
            price: 110.0,
            cost: 100.0,
        },
    ]
}

/// Default yearly market sizes.
pub fn default_markets() -> Vec<Market> {
    vec![
        Market {
            id: MarketId::Artic,
            size: 10_000,
        },
        Market {
            id: MarketId::Desert,
            size: 20_000,
        },
        Market {
            id: MarketId::Special,
            size: 40_000,
        },
    ]
}
