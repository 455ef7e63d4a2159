#![deny(warnings)]

//! Session state and the recompute-on-change runtime.
//!
//! A [`Session`] owns the inputs of one participant: the design table, the
//! market sizes and the scoring configuration. Edits are validated against
//! the whole resulting state and either committed or rejected. The
//! [`WorkshopRuntime`] keeps the session in an ECS world and rescoring runs
//! as a system that only fires when the session changed.

use bevy_ecs::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use workshop_core::{default_designs, default_markets, Design, Market, MarketId};
use workshop_econ::{score, validate_inputs, EconError, Scorecard, ScoringConfig};

/// A user edit of the session inputs.
#[derive(Clone, Debug, PartialEq)]
pub enum DesignEdit {
    SetPrice { index: usize, price: f64 },
    SetCost { index: usize, cost: f64 },
    SetMarketSize { market: MarketId, size: u32 },
    AddDesign(Design),
    RemoveDesign { index: usize },
    ReplaceDesigns(Vec<Design>),
    SetConfig(ScoringConfig),
}

/// Reason an edit was not applied.
#[derive(Debug, Error, PartialEq)]
pub enum EditRejected {
    #[error("no design at row {0}")]
    NoSuchDesign(usize),
    #[error("no market {0} in session")]
    NoSuchMarket(MarketId),
    #[error(transparent)]
    Invalid(#[from] EconError),
}

/// Inputs of one participant session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Session {
    designs: Vec<Design>,
    markets: Vec<Market>,
    config: ScoringConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            designs: default_designs(),
            markets: default_markets(),
            config: ScoringConfig::default(),
        }
    }
}

impl Session {
    pub fn new(
        designs: Vec<Design>,
        markets: Vec<Market>,
        config: ScoringConfig,
    ) -> Result<Self, EditRejected> {
        validate_inputs(&designs, &markets, &config)?;
        Ok(Self {
            designs,
            markets,
            config,
        })
    }

    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Apply an edit; on error the session is left untouched.
    pub fn apply(&mut self, edit: DesignEdit) -> Result<(), EditRejected> {
        let mut next = self.clone();
        next.apply_unchecked(edit)?;
        validate_inputs(&next.designs, &next.markets, &next.config)?;
        *self = next;
        Ok(())
    }

    fn design_mut(&mut self, index: usize) -> Result<&mut Design, EditRejected> {
        self.designs
            .get_mut(index)
            .ok_or(EditRejected::NoSuchDesign(index))
    }

    fn apply_unchecked(&mut self, edit: DesignEdit) -> Result<(), EditRejected> {
        match edit {
            DesignEdit::SetPrice { index, price } => self.design_mut(index)?.price = price,
            DesignEdit::SetCost { index, cost } => self.design_mut(index)?.cost = cost,
            DesignEdit::SetMarketSize { market, size } => {
                self.markets
                    .iter_mut()
                    .find(|m| m.id == market)
                    .ok_or(EditRejected::NoSuchMarket(market))?
                    .size = size;
            }
            DesignEdit::AddDesign(d) => self.designs.push(d),
            DesignEdit::RemoveDesign { index } => {
                if index >= self.designs.len() {
                    return Err(EditRejected::NoSuchDesign(index));
                }
                self.designs.remove(index);
            }
            DesignEdit::ReplaceDesigns(designs) => self.designs = designs,
            DesignEdit::SetConfig(config) => self.config = config,
        }
        Ok(())
    }

    /// Score the current inputs.
    pub fn score(&self) -> Scorecard {
        score(&self.designs, &self.markets, &self.config)
    }
}

#[derive(Resource)]
struct SessionInputs(Session);

/// Latest scoring result and how many times it was recomputed.
#[derive(Resource)]
struct Scoreboard {
    card: Scorecard,
    revision: u64,
}

fn rescore_on_change(inputs: Res<SessionInputs>, mut board: ResMut<Scoreboard>) {
    if !inputs.is_changed() {
        return;
    }
    board.card = inputs.0.score();
    board.revision += 1;
    debug!(revision = board.revision, "scorecard refreshed");
}

/// Session plus a schedule that rescoring runs on.
pub struct WorkshopRuntime {
    world: World,
    schedule: Schedule,
}

impl WorkshopRuntime {
    pub fn new(session: Session) -> Self {
        let mut world = World::new();
        world.insert_resource(SessionInputs(session));
        world.insert_resource(Scoreboard {
            card: Scorecard {
                designs: vec![],
                summary: vec![],
            },
            revision: 0,
        });
        let mut schedule = Schedule::default();
        schedule.add_systems(rescore_on_change);
        let mut rt = Self { world, schedule };
        rt.update();
        rt
    }

    /// Run the schedule once; rescoring only happens if inputs changed.
    pub fn update(&mut self) {
        self.schedule.run(&mut self.world);
    }

    /// Validate and commit an edit, then refresh the scorecard.
    pub fn submit(&mut self, edit: DesignEdit) -> Result<u64, EditRejected> {
        let mut next = self.session().clone();
        if let Err(e) = next.apply(edit) {
            warn!(reason = %e, "edit rejected");
            return Err(e);
        }
        self.world.resource_mut::<SessionInputs>().0 = next;
        self.update();
        Ok(self.revision())
    }

    pub fn session(&self) -> &Session {
        &self.world.resource::<SessionInputs>().0
    }

    pub fn scorecard(&self) -> &Scorecard {
        &self.world.resource::<Scoreboard>().card
    }

    /// Number of times the scorecard has been computed.
    pub fn revision(&self) -> u64 {
        self.world.resource::<Scoreboard>().revision
    }
}

impl Default for WorkshopRuntime {
    fn default() -> Self {
        Self::new(Session::default())
    }
}
