#![deny(warnings)]

//! Headless workshop CLI: scores the design table, prints the value
//! analysis and risk hotspots, and optionally records the participant's
//! enrollment and questionnaire in the document store.

use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use chrono::NaiveDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;
use workshop_core::risk::{default_matrix, RiskMatrix};
use workshop_core::survey::{
    new_session_id, Enrollment, ParticipantState, Questionnaire, QuestionnaireResponse, Ratings,
    SessionRecord, QUESTIONS,
};
use workshop_core::{default_designs, default_markets, Design, MarketId, MARKET_COUNT};
use workshop_econ::report::{
    bar_groups, format_millions, profit_metrics, radar_series, render_text, revenue_metrics,
    Measure,
};
use workshop_econ::ScoringConfig;
use workshop_runtime::{DesignEdit, Session, WorkshopRuntime};

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    preset: Option<String>,
    markets: Option<[u32; MARKET_COUNT]>,
    prices: Vec<(usize, f64)>,
    costs: Vec<(usize, f64)>,
    json: bool,
    db: Option<String>,
    group: Option<u8>,
    consent: bool,
    role: Option<String>,
    experience: Option<u32>,
    ratings: Vec<(usize, f32)>,
    mitigations: Vec<String>,
    risk_system: Option<usize>,
}

/// Hotspots listed for the selected risk matrix.
const HOTSPOT_COUNT: usize = 5;

fn value(flag: &str, v: Option<String>) -> Result<String> {
    v.ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = Some(PathBuf::from(value(&arg, it.next())?)),
            "--preset" => out.preset = Some(value(&arg, it.next())?),
            "--markets" => out.markets = Some(parse_markets(&value(&arg, it.next())?)?),
            "--price" => out.prices.push(parse_assignment(&value(&arg, it.next())?)?),
            "--cost" => out.costs.push(parse_assignment(&value(&arg, it.next())?)?),
            "--json" => out.json = true,
            "--db" => out.db = Some(value(&arg, it.next())?),
            "--group" => {
                let raw = value(&arg, it.next())?;
                out.group = Some(raw.parse().with_context(|| format!("bad group `{raw}`"))?);
            }
            "--consent" => out.consent = true,
            "--role" => out.role = Some(value(&arg, it.next())?),
            "--experience" => {
                let raw = value(&arg, it.next())?;
                out.experience = Some(
                    raw.parse()
                        .with_context(|| format!("bad experience `{raw}`"))?,
                );
            }
            "--rating" => {
                let (question, v) = parse_assignment(&value(&arg, it.next())?)?;
                if question >= QUESTIONS.len() {
                    bail!("questions run from 1 to {}", QUESTIONS.len());
                }
                out.ratings.push((question, v as f32));
            }
            "--mitigation" => out.mitigations.push(value(&arg, it.next())?),
            "--risk-system" => {
                let raw = value(&arg, it.next())?;
                let system: usize = raw
                    .parse()
                    .with_context(|| format!("bad system `{raw}`"))?;
                if system == 0 {
                    bail!("system numbers start at 1");
                }
                out.risk_system = Some(system);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    if out.config.is_some() && out.preset.is_some() {
        bail!("--config and --preset are mutually exclusive");
    }
    if out.db.is_some() && out.group.is_none() {
        bail!("--db requires --group");
    }
    Ok(out)
}

/// `a,b,c` market sizes in scoring order.
fn parse_markets(raw: &str) -> Result<[u32; MARKET_COUNT]> {
    let sizes = raw
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .with_context(|| format!("bad market size `{s}`"))
        })
        .collect::<Result<Vec<_>>>()?;
    sizes
        .try_into()
        .map_err(|v: Vec<u32>| anyhow!("expected {MARKET_COUNT} market sizes, got {}", v.len()))
}

/// `i=v` with a 1-based system index, returned 0-based.
fn parse_assignment(raw: &str) -> Result<(usize, f64)> {
    let (index, v) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <system>=<value>, got `{raw}`"))?;
    let index: usize = index
        .trim()
        .parse()
        .with_context(|| format!("bad system index in `{raw}`"))?;
    if index == 0 {
        bail!("system indices start at 1");
    }
    let v: f64 = v
        .trim()
        .parse()
        .with_context(|| format!("bad value in `{raw}`"))?;
    Ok((index - 1, v))
}

fn load_config(args: &Args) -> Result<ScoringConfig> {
    if let Some(path) = &args.config {
        return ScoringConfig::from_path(path)
            .with_context(|| format!("loading scoring config {}", path.display()));
    }
    match &args.preset {
        Some(name) => Ok(ScoringConfig::preset(name)?),
        None => Ok(ScoringConfig::default()),
    }
}

fn edits(args: &Args) -> Vec<DesignEdit> {
    let mut out = Vec::new();
    if let Some(sizes) = args.markets {
        for (market, size) in MarketId::ALL.into_iter().zip(sizes) {
            out.push(DesignEdit::SetMarketSize { market, size });
        }
    }
    for &(index, price) in &args.prices {
        out.push(DesignEdit::SetPrice { index, price });
    }
    for &(index, cost) in &args.costs {
        out.push(DesignEdit::SetCost { index, cost });
    }
    out
}

fn questionnaire(args: &Args) -> Questionnaire {
    let mut ratings = Ratings::default().to_array();
    for &(question, v) in &args.ratings {
        if let Some(slot) = ratings.get_mut(question) {
            *slot = v;
        }
    }
    Questionnaire {
        role: args.role.clone().unwrap_or_default(),
        experience_years: args.experience.unwrap_or(0),
        ratings: Ratings::from_array(ratings),
        mitigations: args.mitigations.clone(),
    }
}

/// Documents written for one participant.
#[derive(Debug)]
struct Records {
    session: SessionRecord,
    state: ParticipantState,
    response: QuestionnaireResponse,
}

fn build_records(
    args: &Args,
    session_id: &str,
    at: NaiveDateTime,
    designs: &[Design],
) -> Result<Records> {
    let group = args.group.context("--group is required to record a session")?;
    let enrollment = Enrollment {
        group,
        consent: args.consent,
    };
    let questionnaire = questionnaire(args);
    Ok(Records {
        session: SessionRecord::new(session_id, at, &enrollment)?,
        state: ParticipantState::new(&questionnaire.role, group),
        response: QuestionnaireResponse::new(session_id, at, &enrollment, &questionnaire, designs)?,
    })
}

fn persist(url: &str, records: &Records) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let pool = persistence::init_db(url).await?;
        persistence::save_session(&pool, &records.session).await?;
        persistence::save_participant_state(&pool, &records.session.session_id, &records.state)
            .await?;
        persistence::save_response(&pool, &records.response).await
    })?;
    Ok(())
}

fn risk_json(system: usize, matrix: &RiskMatrix) -> serde_json::Value {
    let totals: Vec<u32> = (0..matrix.size()).map(|r| matrix.row_total(r)).collect();
    serde_json::json!({
        "system": system,
        "labels": matrix.labels(),
        "matrix": matrix,
        "row_totals": totals,
        "hotspots": matrix.hotspots(HOTSPOT_COUNT),
    })
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(
        sha = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        ?args,
        "starting workshop CLI"
    );

    let config = load_config(&args)?;
    let session = Session::new(default_designs(), default_markets(), config)?;
    let mut runtime = WorkshopRuntime::new(session);
    for edit in edits(&args) {
        runtime
            .submit(edit.clone())
            .with_context(|| format!("edit rejected: {edit:?}"))?;
    }
    let card = runtime.scorecard();
    let risk = args.risk_system.map(|n| (n, default_matrix(n)));

    if args.json {
        let mut out = serde_json::json!({
            "session": runtime.session(),
            "scorecard": card,
            "profit": profit_metrics(card),
            "revenue": revenue_metrics(card),
            "radar": radar_series(card),
            "shares": bar_groups(card, Measure::Share),
        });
        if let Some((n, matrix)) = &risk {
            out["risk"] = risk_json(*n, matrix);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Scoring config: {}", runtime.session().config().name);
        print!("{}", render_text(card));
        for m in revenue_metrics(card) {
            println!("revenue {:<10} {}", m.label, m.value);
        }
        let totals = card.totals();
        println!(
            "TOTAL | units: {:.0} | revenue: {} | profit: {}",
            totals.units,
            format_millions(totals.revenue),
            format_millions(totals.profit)
        );
        if let Some((n, matrix)) = &risk {
            println!("Risk hotspots, System {} ({} elements):", n, matrix.size());
            for c in matrix.hotspots(HOTSPOT_COUNT) {
                println!("  Element {} -> Element {}: {}", c.row + 1, c.col + 1, c.value);
            }
        }
    }

    if let Some(url) = &args.db {
        let session_id = new_session_id();
        let records = build_records(
            &args,
            &session_id,
            chrono::Local::now().naive_local(),
            runtime.session().designs(),
        )?;
        persist(url, &records)?;
        println!("Session {} recorded at {}", session_id, url);
    }

    Ok(())
}
