//! # Action kernel
//!
//! Every move a player can make is one variant of [`Action`]. The kernel
//! validates before it mutates: a failed submission leaves the state
//! untouched. Pending sub-actions (leech offers, tile selections, spades)
//! are data on the state, drained by further submissions; while any queue is
//! non-empty only the draining actions are legal and the turn does not
//! advance.

mod build;
mod leech;
mod misc;
mod pending;
mod power_action;
mod special;
mod upgrade;

pub use self::build::*;
pub use self::leech::*;
pub use self::misc::*;
pub use self::pending::*;
pub use self::power_action::*;
pub use self::special::*;
pub use self::upgrade::*;

use crate::cult::CultTrack;
use crate::hex::Hex;
use crate::map::{BridgeError, BuildingKind, Terrain};
use crate::phase;
use crate::state::{GameState, PendingKind, Phase};
use crate::tiles::{BonusCard, FavorTile, TownTile};

/// Which resource a validation found missing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
  Coins,
  Workers,
  Priests,
  Power,
}

/// What is wrong with a targeted hex.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HexProblem {
  OffMap,
  River,
  Occupied,
  WrongTerrain,
}

/// Typed failure kinds surfaced by `submit`. A failed action never leaves a
/// partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionError {
  PlayerNotFound,
  NotYourTurn,
  WrongPhase,
  InsufficientResources(ResourceKind),
  IllegalHex(HexProblem),
  NotAdjacent,
  BuildingCapExceeded,
  InvalidUpgradePath,
  FactionDisallowed,
  SpecialActionAlreadyUsed,
  PendingSubActionRequired(PendingKind),
  /// Tile, card or cult slot not available (exhausted stock, duplicate
  /// favor, occupied priest slot).
  TileUnavailable,
  /// Malformed action value; the reason is a short static description.
  InvalidAction(&'static str),
  /// Replay ingestion hit a decision the log does not record.
  MissingInfo { round: u8, players: Vec<String> },
}

impl std::fmt::Display for ActionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ActionError::PlayerNotFound => write!(f, "player not found"),
      ActionError::NotYourTurn => write!(f, "not your turn"),
      ActionError::WrongPhase => write!(f, "action not legal in this phase"),
      ActionError::InsufficientResources(kind) => write!(f, "insufficient {:?}", kind),
      ActionError::IllegalHex(problem) => write!(f, "illegal hex: {:?}", problem),
      ActionError::NotAdjacent => write!(f, "hex not adjacent"),
      ActionError::BuildingCapExceeded => write!(f, "building cap exceeded"),
      ActionError::InvalidUpgradePath => write!(f, "invalid upgrade path"),
      ActionError::FactionDisallowed => write!(f, "faction cannot do that"),
      ActionError::SpecialActionAlreadyUsed => write!(f, "special action already used"),
      ActionError::PendingSubActionRequired(kind) => {
        write!(f, "pending sub-action must be resolved first: {:?}", kind)
      }
      ActionError::TileUnavailable => write!(f, "tile not available"),
      ActionError::InvalidAction(reason) => write!(f, "invalid action: {}", reason),
      ActionError::MissingInfo { round, players } => {
        write!(f, "missing info in round {} for {:?}", round, players)
      }
    }
  }
}

impl std::error::Error for ActionError {}

impl From<BridgeError> for ActionError {
  fn from(e: BridgeError) -> Self {
    match e {
      BridgeError::OffMap => ActionError::IllegalHex(HexProblem::OffMap),
      BridgeError::EndpointIsRiver => ActionError::IllegalHex(HexProblem::River),
      BridgeError::Occupied => ActionError::IllegalHex(HexProblem::Occupied),
      BridgeError::BadOrientation | BridgeError::NoRiverBelow => ActionError::NotAdjacent,
      BridgeError::CapExceeded => ActionError::BuildingCapExceeded,
    }
  }
}

/// The seven numbered power actions on the board edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerActionSlot {
  Bridge,
  Spade,
  TwoSpades,
  Coins7,
  Workers2,
  Priest,
  PowerVp,
}

impl PowerActionSlot {
  pub fn from_index(idx: u8) -> Option<PowerActionSlot> {
    match idx {
      1 => Some(PowerActionSlot::Bridge),
      2 => Some(PowerActionSlot::Spade),
      3 => Some(PowerActionSlot::TwoSpades),
      4 => Some(PowerActionSlot::Coins7),
      5 => Some(PowerActionSlot::Workers2),
      6 => Some(PowerActionSlot::Priest),
      7 => Some(PowerActionSlot::PowerVp),
      _ => None,
    }
  }

  pub fn index(self) -> u8 {
    match self {
      PowerActionSlot::Bridge => 1,
      PowerActionSlot::Spade => 2,
      PowerActionSlot::TwoSpades => 3,
      PowerActionSlot::Coins7 => 4,
      PowerActionSlot::Workers2 => 5,
      PowerActionSlot::Priest => 6,
      PowerActionSlot::PowerVp => 7,
    }
  }

  /// Power cost paid from bowl III.
  pub fn cost(self) -> u8 {
    match self {
      PowerActionSlot::Bridge => 3,
      PowerActionSlot::Spade => 4,
      PowerActionSlot::TwoSpades => 6,
      PowerActionSlot::Coins7 => 4,
      PowerActionSlot::Workers2 => 4,
      PowerActionSlot::Priest => 3,
      PowerActionSlot::PowerVp => 4,
    }
  }
}

/// Free exchanges that never consume the turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conversion {
  /// 1 power -> 1 coin, `n` times.
  PowerToCoins(u8),
  /// 3 power -> 1 worker, `n` times.
  PowerToWorkers(u8),
  /// 5 power -> 1 priest, `n` times.
  PowerToPriests(u8),
  /// 1 priest -> 1 worker, `n` times.
  PriestsToWorkers(u32),
  /// 1 worker -> 1 coin, `n` times.
  WorkersToCoins(u32),
  /// Alchemists only: 1 VP -> 1 coin, `n` times.
  VpToCoins(u32),
  /// Alchemists only: 2 coins -> 1 VP, `n` times.
  CoinsToVp(u32),
}

/// Faction and tile specials; most are once per round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAction {
  /// Auren stronghold: two steps on one cult track.
  AurenCult { track: CultTrack },
  /// Witches stronghold: a free dwelling on any empty forest hex.
  WitchesRide { hex: Hex },
  /// Swarmlings stronghold: a free dwelling-to-trading-house upgrade.
  SwarmlingsUpgrade { hex: Hex },
  /// Chaos Magicians stronghold: two actions, one turn advance.
  ChaosDoubleTurn {
    first: Box<Action>,
    second: Box<Action>,
  },
  /// Giants stronghold: two free spades on a reachable hex, optional build.
  GiantsSpades { hex: Hex, build: bool },
  /// Nomads stronghold: transform a directly adjacent hex to desert.
  Sandstorm { hex: Hex, build: bool },
  /// Bonus card spade: one free spade, optionally continued into a full
  /// transform and build.
  BonusSpade {
    hex: Hex,
    target: Option<Terrain>,
    build: bool,
  },
  /// Bonus card cult step.
  BonusCult { track: CultTrack },
  /// Water+2 favor cult step.
  FavorCult { track: CultTrack },
  /// Mermaids: claim a town across a river hex.
  MermaidTown { river: Hex },
}

/// Every submittable move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
  TransformAndBuild {
    hex: Hex,
    target: Option<Terrain>,
    build: bool,
    skip: bool,
  },
  UpgradeBuilding {
    hex: Hex,
    target: BuildingKind,
  },
  AdvanceShipping,
  AdvanceDigging,
  SendPriest {
    track: CultTrack,
    steps: u8,
  },
  PowerAction(PowerActionSlot),
  Pass {
    bonus: Option<BonusCard>,
  },
  Special(SpecialAction),
  EngineersBridge {
    from: Hex,
    to: Hex,
  },
  /// The bridge owed after power action 1.
  PlaceBridge {
    from: Hex,
    to: Hex,
  },
  AcceptLeech {
    offer: usize,
  },
  DeclineLeech {
    offer: usize,
  },
  ChooseCultistsCult {
    track: CultTrack,
  },
  UseSpade {
    hex: Hex,
  },
  ForfeitSpades,
  ChooseFavor {
    tile: FavorTile,
  },
  ChooseTown {
    tile: TownTile,
  },
  /// Setup bonus card draft.
  ChooseBonus {
    card: BonusCard,
  },
  DarklingsOrdination {
    workers: u8,
  },
  Convert(Conversion),
  Burn {
    count: u8,
  },
}

impl Action {
  /// Actions that drain a pending queue and may run out of normal turn
  /// order.
  fn is_draining(&self) -> bool {
    matches!(
      self,
      Action::AcceptLeech { .. }
        | Action::DeclineLeech { .. }
        | Action::ChooseCultistsCult { .. }
        | Action::UseSpade { .. }
        | Action::ForfeitSpades
        | Action::ChooseFavor { .. }
        | Action::ChooseTown { .. }
        | Action::PlaceBridge { .. }
        | Action::DarklingsOrdination { .. }
    )
  }

  /// Free actions that neither consume nor advance the turn.
  fn is_free(&self) -> bool {
    matches!(self, Action::Convert(_) | Action::Burn { .. })
  }
}

/// Validates and executes one submission. The single entry point used by
/// the game facade and the replay feed.
pub fn submit(state: &mut GameState, action: &Action) -> Result<(), ActionError> {
  match state.phase {
    Phase::Finished | Phase::Income => Err(ActionError::WrongPhase),
    Phase::Setup => submit_setup(state, action),
    Phase::Cleanup => submit_cleanup(state, action),
    Phase::Actions => submit_actions(state, action),
  }
}

fn submit_setup(state: &mut GameState, action: &Action) -> Result<(), ActionError> {
  match action {
    Action::TransformAndBuild {
      hex,
      target,
      build,
      skip,
    } => {
      if target.is_some() || !*build || *skip {
        return Err(ActionError::WrongPhase);
      }
      build::place_setup_dwelling(state, *hex)
    }
    Action::ChooseBonus { card } => pending::choose_setup_bonus(state, *card),
    // Snellman logs write the setup draft as a pass line.
    Action::Pass { bonus: Some(card) } => pending::choose_setup_bonus(state, *card),
    _ => Err(ActionError::WrongPhase),
  }
}

fn submit_cleanup(state: &mut GameState, action: &Action) -> Result<(), ActionError> {
  // Only the cult-reward spades are spendable between rounds.
  match action {
    Action::UseSpade { hex } => pending::use_spade(state, *hex),
    Action::ForfeitSpades => pending::forfeit_spades(state),
    _ => Err(ActionError::WrongPhase),
  }
}

fn submit_actions(state: &mut GameState, action: &Action) -> Result<(), ActionError> {
  if action.is_draining() {
    return submit_draining(state, action);
  }
  if let Some(kind) = state.pending_kind() {
    return Err(ActionError::PendingSubActionRequired(kind));
  }
  let player = state.turn_player().ok_or(ActionError::PlayerNotFound)?;
  if state.players[player].passed {
    return Err(ActionError::NotYourTurn);
  }
  if action.is_free() {
    return misc::free_action(state, player, action);
  }
  execute_main(state, player, action)?;
  phase::after_main_action(state);
  Ok(())
}

fn submit_draining(state: &mut GameState, action: &Action) -> Result<(), ActionError> {
  match action {
    Action::AcceptLeech { offer } => leech::accept(state, *offer),
    Action::DeclineLeech { offer } => leech::decline(state, *offer),
    Action::ChooseCultistsCult { track } => leech::choose_cultists_cult(state, *track),
    Action::UseSpade { hex } => pending::use_spade(state, *hex),
    Action::ForfeitSpades => pending::forfeit_spades(state),
    Action::ChooseFavor { tile } => pending::choose_favor(state, *tile),
    Action::ChooseTown { tile } => pending::choose_town(state, *tile),
    Action::PlaceBridge { from, to } => power_action::place_bridge(state, *from, *to),
    Action::DarklingsOrdination { workers } => pending::ordination(state, *workers),
    _ => unreachable!("is_draining covers the draining variants"),
  }
}

/// One main action for `player`. Shared by the normal flow and the Chaos
/// Magicians' double turn, which is why the turn advance stays outside.
pub(crate) fn execute_main(
  state: &mut GameState,
  player: usize,
  action: &Action,
) -> Result<(), ActionError> {
  match action {
    Action::TransformAndBuild {
      hex,
      target,
      build,
      skip,
    } => build::transform_and_build(state, player, *hex, *target, *build, *skip),
    Action::UpgradeBuilding { hex, target } => {
      upgrade::upgrade_building(state, player, *hex, *target)
    }
    Action::AdvanceShipping => misc::advance_shipping(state, player),
    Action::AdvanceDigging => misc::advance_digging(state, player),
    Action::SendPriest { track, steps } => misc::send_priest(state, player, *track, *steps),
    Action::PowerAction(slot) => power_action::power_action(state, player, *slot),
    Action::Pass { bonus } => misc::pass(state, player, *bonus),
    Action::Special(special) => special::special_action(state, player, special),
    Action::EngineersBridge { from, to } => misc::engineers_bridge(state, player, *from, *to),
    _ => Err(ActionError::InvalidAction("not a main action")),
  }
}
