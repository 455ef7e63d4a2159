#![deny(warnings)]

//! Market-share and profitability calculator for the steering workshop.
//!
//! Shares are heuristic attractiveness scores built from saturating
//! sub-terms over design attributes. The formula of every market is data
//! (`ScoringConfig`), so the drafts used during the workshop differ only in
//! configuration:
//! - `saturating`: `1 - 0.5^(k / x) + offset`
//! - `growth`: `1 - 0.5^(x / k) + offset`
//! - `inverse_square`: `1 / (1 + ((x - x0) * c)^2) + offset`
//!
//! A market share is `scale * sum(terms)` and is neither clamped nor
//! normalized across designs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use workshop_core::{
    validate_designs, validate_markets, Design, Market, MarketId, ValidationError, MARKET_COUNT,
};

pub mod report;

/// Design attribute a share term reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    TurningRadius,
    Reliability,
    FuelConsumption,
    ElectricConsumption,
    Price,
}

impl Attribute {
    pub fn name(self) -> &'static str {
        match self {
            Attribute::TurningRadius => "min_turning_radius",
            Attribute::Reliability => "reliability",
            Attribute::FuelConsumption => "fuel_consumption",
            Attribute::ElectricConsumption => "electric_consumption",
            Attribute::Price => "price",
        }
    }

    /// Attribute value of a design, `None` for consumption figures it lacks.
    pub fn value(self, d: &Design) -> Option<f64> {
        match self {
            Attribute::TurningRadius => Some(d.min_turning_radius),
            Attribute::Reliability => Some(d.reliability),
            Attribute::FuelConsumption => d.fuel_consumption,
            Attribute::ElectricConsumption => d.electric_consumption,
            Attribute::Price => Some(d.price),
        }
    }
}

/// One additive sub-term of a market share.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShareTerm {
    /// `1 - 0.5^(k / x) + offset`, decreasing in `x`.
    Saturating {
        attribute: Attribute,
        k: f64,
        #[serde(default)]
        offset: f64,
    },
    /// `1 - 0.5^(x / k) + offset`, increasing in `x`.
    Growth {
        attribute: Attribute,
        k: f64,
        #[serde(default)]
        offset: f64,
    },
    /// `1 / (1 + ((x - x0) * c)^2) + offset`, peaking at `x0`.
    InverseSquare {
        attribute: Attribute,
        x0: f64,
        c: f64,
        #[serde(default)]
        offset: f64,
    },
}

impl ShareTerm {
    pub fn attribute(&self) -> Attribute {
        match self {
            ShareTerm::Saturating { attribute, .. }
            | ShareTerm::Growth { attribute, .. }
            | ShareTerm::InverseSquare { attribute, .. } => *attribute,
        }
    }

    /// Term value at attribute value `x`.
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            ShareTerm::Saturating { k, offset, .. } => 1.0 - 0.5f64.powf(k / x) + offset,
            ShareTerm::Growth { k, offset, .. } => 1.0 - 0.5f64.powf(x / k) + offset,
            ShareTerm::InverseSquare { x0, c, offset, .. } => {
                1.0 / (1.0 + ((x - x0) * c).powi(2)) + offset
            }
        }
    }

    fn check(&self, market: MarketId) -> Result<(), ConfigError> {
        let (k, rest) = match *self {
            ShareTerm::Saturating { k, offset, .. } | ShareTerm::Growth { k, offset, .. } => {
                (Some(k), [offset, 0.0, 0.0])
            }
            ShareTerm::InverseSquare { x0, c, offset, .. } => (None, [x0, c, offset]),
        };
        if rest.iter().chain(k.as_ref()).any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite(market));
        }
        if let Some(k) = k {
            if k <= 0.0 {
                return Err(ConfigError::NonPositiveK { market, k });
            }
        }
        Ok(())
    }
}

/// Share formula of one market.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketFormula {
    pub market: MarketId,
    /// Normalization applied to the sum of terms.
    pub scale: f64,
    pub terms: Vec<ShareTerm>,
}

impl MarketFormula {
    /// Share of a design that satisfies the formula's preconditions.
    pub fn share(&self, d: &Design) -> f64 {
        let sum: f64 = self
            .terms
            .iter()
            // NaN for a missing attribute; `validate_inputs` rules that out
            .map(|t| t.eval(t.attribute().value(d).unwrap_or(f64::NAN)))
            .sum();
        self.scale * sum
    }
}

/// Errors in a scoring configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid yaml: {0}")]
    Yaml(String),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("expected {expected} market formulas, found {found}")]
    FormulaCount { expected: usize, found: usize },
    #[error("formula at position {position} should be for {expected}, found {found}")]
    FormulaOrder {
        position: usize,
        expected: MarketId,
        found: MarketId,
    },
    #[error("formula for {0} has no terms")]
    EmptyFormula(MarketId),
    #[error("formula for {0} has a non-finite parameter")]
    NonFinite(MarketId),
    #[error("formula for {market}: k must be > 0, got {k}")]
    NonPositiveK { market: MarketId, k: f64 },
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e.to_string())
    }
}

/// Names accepted by [`ScoringConfig::preset`].
pub const PRESETS: [&str; 2] = ["workshop_2023", "consumption_2023"];

/// Share formulas for all markets, in scoring order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub name: String,
    pub markets: Vec<MarketFormula>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::workshop_2023()
    }
}

impl ScoringConfig {
    /// Formula used during the workshop: turning radius, price and reliability.
    pub fn workshop_2023() -> Self {
        use Attribute::*;
        let road = |market| MarketFormula {
            market,
            scale: 0.2,
            terms: vec![
                ShareTerm::InverseSquare {
                    attribute: TurningRadius,
                    x0: 10.0,
                    c: 0.5,
                    offset: -0.5,
                },
                ShareTerm::Saturating {
                    attribute: Price,
                    k: 50.0,
                    offset: -0.3,
                },
                ShareTerm::Saturating {
                    attribute: Reliability,
                    k: 1.0,
                    offset: 0.0,
                },
            ],
        };
        Self {
            name: "workshop_2023".to_string(),
            markets: vec![
                road(MarketId::Artic),
                road(MarketId::Desert),
                MarketFormula {
                    market: MarketId::Special,
                    scale: 0.2,
                    terms: vec![
                        ShareTerm::Saturating {
                            attribute: TurningRadius,
                            k: 50.0,
                            offset: -0.3,
                        },
                        ShareTerm::Saturating {
                            attribute: Price,
                            k: 500.0,
                            offset: -0.3,
                        },
                        ShareTerm::Saturating {
                            attribute: Reliability,
                            k: 1.0,
                            offset: 0.0,
                        },
                    ],
                },
            ],
        }
    }

    /// Earlier draft weighting fuel and electricity consumption.
    pub fn consumption_2023() -> Self {
        use Attribute::*;
        let formula = |market, radius: ShareTerm| MarketFormula {
            market,
            scale: 0.25,
            terms: vec![
                radius,
                ShareTerm::Saturating {
                    attribute: FuelConsumption,
                    k: 2.0,
                    offset: 0.0,
                },
                ShareTerm::Saturating {
                    attribute: ElectricConsumption,
                    k: 0.5,
                    offset: 0.0,
                },
                ShareTerm::Saturating {
                    attribute: Price,
                    k: 20.0,
                    offset: 0.0,
                },
            ],
        };
        let peaked = ShareTerm::InverseSquare {
            attribute: TurningRadius,
            x0: 10.0,
            c: 0.5,
            offset: 0.0,
        };
        Self {
            name: "consumption_2023".to_string(),
            markets: vec![
                formula(MarketId::Artic, peaked.clone()),
                formula(MarketId::Desert, peaked),
                formula(
                    MarketId::Special,
                    ShareTerm::Saturating {
                        attribute: TurningRadius,
                        k: 20.0,
                        offset: 0.0,
                    },
                ),
            ],
        }
    }

    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "workshop_2023" => Ok(Self::workshop_2023()),
            "consumption_2023" => Ok(Self::consumption_2023()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: ScoringConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Exactly one formula per market, in scoring order, with sane parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markets.len() != MARKET_COUNT {
            return Err(ConfigError::FormulaCount {
                expected: MARKET_COUNT,
                found: self.markets.len(),
            });
        }
        for (position, (f, expected)) in self.markets.iter().zip(MarketId::ALL).enumerate() {
            if f.market != expected {
                return Err(ConfigError::FormulaOrder {
                    position,
                    expected,
                    found: f.market,
                });
            }
            if !f.scale.is_finite() {
                return Err(ConfigError::NonFinite(f.market));
            }
            if f.terms.is_empty() {
                return Err(ConfigError::EmptyFormula(f.market));
            }
            for t in &f.terms {
                t.check(f.market)?;
            }
        }
        Ok(())
    }

    /// Attributes referenced by any formula, in first-use order.
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut out = Vec::new();
        for t in self.markets.iter().flat_map(|f| &f.terms) {
            if !out.contains(&t.attribute()) {
                out.push(t.attribute());
            }
        }
        out
    }
}

/// Errors produced while checking calculator inputs.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configuration reads an attribute the design does not carry.
    #[error("design `{design}` has no {attribute} but the formula uses it")]
    MissingAttribute {
        design: String,
        attribute: &'static str,
    },
}

/// Share, units, revenue and profit of one design in one market.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MarketOutcome {
    pub market: MarketId,
    pub share: f64,
    pub units: f64,
    pub revenue: f64,
    pub profit: f64,
}

/// A design with its derived columns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredDesign {
    pub design: Design,
    pub markets: Vec<MarketOutcome>,
    pub total_units: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
}

impl ScoredDesign {
    pub fn outcome(&self, market: MarketId) -> Option<&MarketOutcome> {
        self.markets.iter().find(|o| o.market == market)
    }
}

/// One row of the `market x design` table; vectors follow design order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketSummary {
    pub market: MarketId,
    pub size: u32,
    pub shares: Vec<f64>,
    pub units: Vec<f64>,
    pub revenue: Vec<f64>,
    pub profit: Vec<f64>,
}

/// Sums across all designs and markets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Totals {
    pub units: f64,
    pub revenue: f64,
    pub profit: f64,
}

/// Calculator output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scorecard {
    pub designs: Vec<ScoredDesign>,
    pub summary: Vec<MarketSummary>,
}

impl Scorecard {
    /// Grand totals; zero for an empty design table.
    pub fn totals(&self) -> Totals {
        self.designs.iter().fold(Totals::default(), |acc, d| Totals {
            units: acc.units + d.total_units,
            revenue: acc.revenue + d.total_revenue,
            profit: acc.profit + d.total_profit,
        })
    }
}

/// Check every precondition of [`score`].
pub fn validate_inputs(
    designs: &[Design],
    markets: &[Market],
    config: &ScoringConfig,
) -> Result<(), EconError> {
    config.validate()?;
    validate_markets(markets)?;
    validate_designs(designs)?;
    let attributes = config.attributes();
    for d in designs {
        for a in &attributes {
            if a.value(d).is_none() {
                return Err(EconError::MissingAttribute {
                    design: d.name.clone(),
                    attribute: a.name(),
                });
            }
        }
    }
    Ok(())
}

/// Score every design against every market.
///
/// Pure and deterministic. Inputs must satisfy [`validate_inputs`]; the
/// formulas divide by turning radius, reliability, price and consumption.
///
/// Markets are paired with the config's formulas position by position, so
/// a market list and config of different lengths would silently score only
/// the common prefix. Release builds do not check this; call
/// [`score_checked`] for untrusted inputs.
pub fn score(designs: &[Design], markets: &[Market], config: &ScoringConfig) -> Scorecard {
    debug_assert_eq!(
        markets.len(),
        config.markets.len(),
        "market list and scoring config disagree on the market count"
    );
    let scored: Vec<ScoredDesign> = designs
        .iter()
        .map(|d| {
            let outcomes: Vec<MarketOutcome> = config
                .markets
                .iter()
                .zip(markets)
                .map(|(f, m)| {
                    let share = f.share(d);
                    let units = share * f64::from(m.size);
                    MarketOutcome {
                        market: m.id,
                        share,
                        units,
                        revenue: d.price * units,
                        profit: (d.price - d.cost) * units,
                    }
                })
                .collect();
            ScoredDesign {
                total_units: outcomes.iter().map(|o| o.units).sum(),
                total_revenue: outcomes.iter().map(|o| o.revenue).sum(),
                total_profit: outcomes.iter().map(|o| o.profit).sum(),
                design: d.clone(),
                markets: outcomes,
            }
        })
        .collect();

    let summary: Vec<MarketSummary> = config
        .markets
        .iter()
        .zip(markets)
        .enumerate()
        .map(|(i, (_, m))| {
            let column = |pick: fn(&MarketOutcome) -> f64| -> Vec<f64> {
                scored.iter().map(|s| pick(&s.markets[i])).collect()
            };
            MarketSummary {
                market: m.id,
                size: m.size,
                shares: column(|o| o.share),
                units: column(|o| o.units),
                revenue: column(|o| o.revenue),
                profit: column(|o| o.profit),
            }
        })
        .collect();

    debug!(
        designs = designs.len(),
        config = %config.name,
        "scored design table"
    );
    Scorecard {
        designs: scored,
        summary,
    }
}

/// [`validate_inputs`] followed by [`score`].
pub fn score_checked(
    designs: &[Design],
    markets: &[Market],
    config: &ScoringConfig,
) -> Result<Scorecard, EconError> {
    validate_inputs(designs, markets, config)?;
    Ok(score(designs, markets, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;
    use workshop_core::{default_designs, default_markets};

    fn system_1() -> Design {
        Design {
            name: "System 1".into(),
            description: "Only front steering".into(),
            min_turning_radius: 10.7,
            reliability: 0.92,
            fuel_consumption: None,
            electric_consumption: None,
            price: 100.0,
            cost: 90.0,
        }
    }

    fn markets(sizes: [u32; 3]) -> Vec<Market> {
        MarketId::ALL
            .into_iter()
            .zip(sizes)
            .map(|(id, size)| Market { id, size })
            .collect()
    }

    /// Reliability rewarded by a growth term instead of the workshop's saturating one.
    fn reliability_rewarding() -> ScoringConfig {
        let mut cfg = ScoringConfig::workshop_2023();
        for f in &mut cfg.markets {
            for t in &mut f.terms {
                if t.attribute() == Attribute::Reliability {
                    *t = ShareTerm::Growth {
                        attribute: Attribute::Reliability,
                        k: 1.0,
                        offset: 0.0,
                    };
                }
            }
        }
        cfg
    }

    fn asset(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../assets/scoring")
            .join(name)
    }

    #[test]
    fn artic_share_matches_workshop_formula() {
        let d = system_1();
        let m = markets([10_000, 20_000, 40_000]);
        let card = score_checked(&[d], &m, &ScoringConfig::workshop_2023()).unwrap();
        let expected = 0.2
            * (1.0 / (1.0 + ((10.7f64 - 10.0) * 0.5).powi(2)) - 0.5
                + (1.0 - 0.5f64.powf(50.0 / 100.0) - 0.3)
                + (1.0 - 0.5f64.powf(1.0 / 0.92)));
        let artic = card.designs[0].outcome(MarketId::Artic).unwrap();
        assert!((artic.share - expected).abs() < 1e-9);
        assert_eq!(artic.units, artic.share * 10_000.0);
        assert_eq!(artic.revenue, 100.0 * artic.units);
        assert_eq!(artic.profit, 10.0 * artic.units);
    }

    #[test]
    fn special_market_uses_its_own_terms() {
        let d = system_1();
        let card = score(&[d], &default_markets(), &ScoringConfig::workshop_2023());
        let expected = 0.2
            * ((1.0 - 0.5f64.powf(50.0 / 10.7) - 0.3)
                + (1.0 - 0.5f64.powf(500.0 / 100.0) - 0.3)
                + (1.0 - 0.5f64.powf(1.0 / 0.92)));
        let special = card.designs[0].outcome(MarketId::Special).unwrap();
        assert!((special.share - expected).abs() < 1e-12);
        let desert = card.designs[0].outcome(MarketId::Desert).unwrap();
        let artic = card.designs[0].outcome(MarketId::Artic).unwrap();
        assert_eq!(desert.share, artic.share);
    }

    #[test]
    fn consumption_preset_uses_consumption_terms() {
        let d = default_designs().remove(0);
        let card = score_checked(
            std::slice::from_ref(&d),
            &default_markets(),
            &ScoringConfig::consumption_2023(),
        )
        .unwrap();
        let expected = 0.25
            * (1.0 / (1.0 + ((10.7f64 - 10.0) * 0.5).powi(2))
                + (1.0 - 0.5f64.powf(2.0 / 6.5))
                + (1.0 - 0.5f64.powf(0.5 / 0.1))
                + (1.0 - 0.5f64.powf(20.0 / 100.0)));
        assert!((card.designs[0].markets[0].share - expected).abs() < 1e-12);
    }

    #[test]
    fn missing_consumption_is_rejected() {
        let err = validate_inputs(
            &[system_1()],
            &default_markets(),
            &ScoringConfig::consumption_2023(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EconError::MissingAttribute {
                design: "System 1".into(),
                attribute: "fuel_consumption"
            }
        );
        // the workshop formula does not read consumption
        assert!(validate_inputs(
            &[system_1()],
            &default_markets(),
            &ScoringConfig::workshop_2023()
        )
        .is_ok());
    }

    #[test]
    fn invalid_attributes_are_rejected_before_scoring() {
        let mut d = system_1();
        d.price = 0.0;
        assert!(matches!(
            score_checked(&[d], &default_markets(), &ScoringConfig::default()),
            Err(EconError::Invalid(ValidationError::PriceOutOfRange { .. }))
        ));
    }

    #[test]
    fn market_count_mismatch_is_rejected() {
        let mut m = default_markets();
        m.push(Market {
            id: MarketId::Artic,
            size: 1,
        });
        assert_eq!(
            validate_inputs(&[system_1()], &m, &ScoringConfig::default()),
            Err(EconError::Invalid(ValidationError::MarketCount {
                expected: 3,
                found: 4
            }))
        );
        let mut cfg = ScoringConfig::default();
        cfg.markets.pop();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::FormulaCount {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "disagree on the market count")]
    fn unchecked_score_refuses_short_market_list() {
        let m = default_markets();
        score(&default_designs(), &m[..2], &ScoringConfig::default());
    }

    #[test]
    fn checked_score_rejects_short_market_list() {
        let m = default_markets();
        assert_eq!(
            score_checked(&default_designs(), &m[..2], &ScoringConfig::default()),
            Err(EconError::Invalid(ValidationError::MarketCount {
                expected: 3,
                found: 2
            }))
        );
    }

    #[test]
    fn empty_designs_give_zero_totals() {
        let card = score_checked(&[], &default_markets(), &ScoringConfig::default()).unwrap();
        assert!(card.designs.is_empty());
        assert_eq!(card.summary.len(), 3);
        assert!(card.summary.iter().all(|row| row.shares.is_empty()));
        assert_eq!(card.totals(), Totals::default());
    }

    #[test]
    fn price_equal_cost_gives_zero_profit() {
        let mut d = system_1();
        d.cost = d.price;
        let card = score(&[d], &default_markets(), &ScoringConfig::default());
        assert!(card.designs[0].markets.iter().all(|o| o.profit == 0.0));
        assert_eq!(card.designs[0].total_profit, 0.0);
    }

    #[test]
    fn summary_is_transposed_view() {
        let designs = default_designs();
        let card = score(&designs, &default_markets(), &ScoringConfig::default());
        for (i, row) in card.summary.iter().enumerate() {
            assert_eq!(row.market, MarketId::ALL[i]);
            for (j, s) in card.designs.iter().enumerate() {
                assert_eq!(row.shares[j], s.markets[i].share);
                assert_eq!(row.profit[j], s.markets[i].profit);
            }
        }
    }

    #[test]
    fn term_shapes() {
        let sat = ShareTerm::Saturating {
            attribute: Attribute::Price,
            k: 50.0,
            offset: 0.0,
        };
        assert!(sat.eval(80.0) < sat.eval(40.0));
        assert!((sat.eval(50.0) - 0.5).abs() < 1e-15);
        let growth = ShareTerm::Growth {
            attribute: Attribute::Reliability,
            k: 1.0,
            offset: 0.0,
        };
        assert!(growth.eval(0.9) > growth.eval(0.5));
        let peak = ShareTerm::InverseSquare {
            attribute: Attribute::TurningRadius,
            x0: 10.0,
            c: 0.5,
            offset: -0.5,
        };
        assert_eq!(peak.eval(10.0), 0.5);
        assert!(peak.eval(12.0) < peak.eval(11.0));
        assert_eq!(peak.eval(8.0), peak.eval(12.0));
    }

    #[test]
    fn config_rejects_bad_parameters() {
        let mut cfg = ScoringConfig::default();
        cfg.markets[1].terms[1] = ShareTerm::Saturating {
            attribute: Attribute::Price,
            k: 0.0,
            offset: 0.0,
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositiveK {
                market: MarketId::Desert,
                k: 0.0
            })
        );
        let mut cfg = ScoringConfig::default();
        cfg.markets[2].terms.clear();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyFormula(MarketId::Special))
        );
        let mut cfg = ScoringConfig::default();
        cfg.markets.swap(0, 2);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::FormulaOrder { position: 0, .. })
        ));
    }

    #[test]
    fn presets_match_shipped_yaml() {
        for name in PRESETS {
            let from_file = ScoringConfig::from_path(asset(&format!("{name}.yaml"))).unwrap();
            assert_eq!(from_file, ScoringConfig::preset(name).unwrap());
        }
        assert!(matches!(
            ScoringConfig::preset("nope"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn yaml_roundtrip_and_default_offset() {
        let text = ScoringConfig::consumption_2023().to_yaml_string().unwrap();
        let back = ScoringConfig::from_yaml_str(&text).unwrap();
        assert_eq!(back, ScoringConfig::consumption_2023());

        let minimal = r#"
name: flat
markets:
  - market: artic
    scale: 1.0
    terms: [{ shape: saturating, attribute: price, k: 50.0 }]
  - market: desert
    scale: 1.0
    terms: [{ shape: growth, attribute: reliability, k: 1.0 }]
  - market: special
    scale: 1.0
    terms: [{ shape: inverse_square, attribute: turning_radius, x0: 5.0, c: 1.0 }]
"#;
        let cfg = ScoringConfig::from_yaml_str(minimal).unwrap();
        assert_eq!(
            cfg.markets[0].terms[0],
            ShareTerm::Saturating {
                attribute: Attribute::Price,
                k: 50.0,
                offset: 0.0
            }
        );
        assert_eq!(
            cfg.attributes(),
            vec![
                Attribute::Price,
                Attribute::Reliability,
                Attribute::TurningRadius
            ]
        );
    }

    #[test]
    fn yaml_errors_are_reported() {
        assert!(matches!(
            ScoringConfig::from_yaml_str("markets: 3"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            ScoringConfig::from_path(asset("does_not_exist.yaml")),
            Err(ConfigError::Io(_))
        ));
    }

    fn arb_design() -> impl Strategy<Value = Design> {
        (0.5f64..50.0, 0.05f64..=1.0, 1.0f64..500.0, 0.0f64..500.0).prop_map(
            |(r, rel, price, cost)| Design {
                name: "P".into(),
                description: String::new(),
                min_turning_radius: r,
                reliability: rel,
                fuel_consumption: None,
                electric_consumption: None,
                price,
                cost,
            },
        )
    }

    proptest! {
        #[test]
        fn scoring_is_idempotent(d in arb_design(), a in 0u32..=200_000, b in 0u32..=200_000, c in 0u32..=200_000) {
            let m = markets([a, b, c]);
            let cfg = ScoringConfig::default();
            let first = score(std::slice::from_ref(&d), &m, &cfg);
            let second = score(std::slice::from_ref(&d), &m, &cfg);
            for (x, y) in first.designs[0].markets.iter().zip(&second.designs[0].markets) {
                prop_assert_eq!(x.share.to_bits(), y.share.to_bits());
                prop_assert_eq!(x.profit.to_bits(), y.profit.to_bits());
            }
            prop_assert_eq!(first, second);
        }

        #[test]
        fn totals_are_sums_over_markets(d in arb_design(), a in 0u32..=200_000, b in 0u32..=200_000, c in 0u32..=200_000) {
            let card = score(&[d], &markets([a, b, c]), &ScoringConfig::default());
            let s = &card.designs[0];
            let profit: f64 = s.markets.iter().map(|o| o.profit).sum();
            let revenue: f64 = s.markets.iter().map(|o| o.revenue).sum();
            let units: f64 = s.markets.iter().map(|o| o.units).sum();
            prop_assert_eq!(s.total_profit, profit);
            prop_assert_eq!(s.total_revenue, revenue);
            prop_assert_eq!(s.total_units, units);
        }

        #[test]
        fn doubling_size_doubles_units_and_revenue(d in arb_design(), a in 0u32..=100_000, b in 0u32..=100_000, c in 0u32..=100_000) {
            let cfg = ScoringConfig::default();
            let base = score(std::slice::from_ref(&d), &markets([a, b, c]), &cfg);
            let doubled = score(std::slice::from_ref(&d), &markets([2 * a, 2 * b, 2 * c]), &cfg);
            for (x, y) in base.designs[0].markets.iter().zip(&doubled.designs[0].markets) {
                prop_assert_eq!(x.share, y.share);
                prop_assert_eq!(2.0 * x.units, y.units);
                prop_assert_eq!(2.0 * x.revenue, y.revenue);
            }
        }

        #[test]
        fn profitable_designs_never_lose_money(mut d in arb_design(), margin in 0.01f64..100.0,
                                               a in 0u32..=200_000, b in 0u32..=200_000, c in 0u32..=200_000) {
            d.cost = (d.price - margin).max(0.0);
            let card = score(&[d], &markets([a, b, c]), &ScoringConfig::default());
            for o in &card.designs[0].markets {
                if o.share >= 0.0 {
                    prop_assert!(o.profit >= 0.0);
                }
            }
        }

        #[test]
        fn growth_reliability_is_monotone(d in arb_design(), lo in 0.05f64..=1.0, hi in 0.05f64..=1.0) {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let cfg = reliability_rewarding();
            let mut worse = d.clone();
            worse.reliability = lo;
            let mut better = d;
            better.reliability = hi;
            for f in &cfg.markets {
                prop_assert!(f.share(&better) >= f.share(&worse));
            }
        }
    }
}
