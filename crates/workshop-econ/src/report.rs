//! Presentation helpers: chart series and money metrics derived from a
//! [`Scorecard`].

use crate::Scorecard;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{self, Write};
use workshop_core::MarketId;

/// Suffix of money metrics expressed in millions of euros.
pub const MILLIONS_SUFFIX: &str = "M€";

/// Value in millions rounded to three decimals; `None` for non-finite input.
pub fn millions(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value / 1_000_000.0).map(|d| d.round_dp(3))
}

/// Format a money amount as e.g. `0.913 M€`.
pub fn format_millions(value: f64) -> String {
    match millions(value) {
        Some(m) => format!("{m:.3} {MILLIONS_SUFFIX}"),
        None => format!("n/a {MILLIONS_SUFFIX}"),
    }
}

/// A labelled metric tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// Total profit per design.
pub fn profit_metrics(card: &Scorecard) -> Vec<Metric> {
    card.designs
        .iter()
        .map(|d| Metric {
            label: d.design.name.clone(),
            value: format_millions(d.total_profit),
        })
        .collect()
}

/// Total revenue per design.
pub fn revenue_metrics(card: &Scorecard) -> Vec<Metric> {
    card.designs
        .iter()
        .map(|d| Metric {
            label: d.design.name.clone(),
            value: format_millions(d.total_revenue),
        })
        .collect()
}

/// Closed polygon of a design's shares over the markets.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RadarSeries {
    pub name: String,
    pub theta: Vec<&'static str>,
    pub r: Vec<f64>,
}

/// One radar series per design; the first market is repeated to close the shape.
pub fn radar_series(card: &Scorecard) -> Vec<RadarSeries> {
    card.designs
        .iter()
        .map(|d| {
            let mut theta: Vec<&'static str> = d.markets.iter().map(|o| o.market.label()).collect();
            let mut r: Vec<f64> = d.markets.iter().map(|o| o.share).collect();
            if let Some(first) = d.markets.first() {
                theta.push(first.market.label());
                r.push(first.share);
            }
            RadarSeries {
                name: d.design.name.clone(),
                theta,
                r,
            }
        })
        .collect()
}

/// Bars of a grouped chart: one group per market, one bar per design.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarGroup {
    pub market: MarketId,
    pub bars: Vec<(String, f64)>,
}

/// Quantity plotted by [`bar_groups`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    Share,
    Units,
    Revenue,
    Profit,
}

pub fn bar_groups(card: &Scorecard, measure: Measure) -> Vec<BarGroup> {
    card.summary
        .iter()
        .map(|row| {
            let values = match measure {
                Measure::Share => &row.shares,
                Measure::Units => &row.units,
                Measure::Revenue => &row.revenue,
                Measure::Profit => &row.profit,
            };
            BarGroup {
                market: row.market,
                bars: card
                    .designs
                    .iter()
                    .zip(values)
                    .map(|(d, v)| (d.design.name.clone(), *v))
                    .collect(),
            }
        })
        .collect()
}

/// Plain-text table of shares and profits for terminals.
pub fn render_text(card: &Scorecard) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    write_table(&mut out, card).ok();
    out
}

fn write_table(out: &mut impl Write, card: &Scorecard) -> fmt::Result {
    write!(out, "{:<10}", "market")?;
    for d in &card.designs {
        write!(out, " | {:>12}", d.design.name)?;
    }
    writeln!(out)?;
    for row in &card.summary {
        write!(out, "{:<10}", row.market.label())?;
        for share in &row.shares {
            write!(out, " | {:>11.2}%", share * 100.0)?;
        }
        writeln!(out)?;
    }
    write!(out, "{:<10}", "profit")?;
    for d in &card.designs {
        write!(out, " | {:>12}", format_millions(d.total_profit))?;
    }
    writeln!(out)
}
