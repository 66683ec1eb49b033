//! Transform-and-build: the canonical composite action, plus the shared
//! helpers every other build path (setup placement, Witches' ride, Giants'
//! spades, sandstorm) leans on.

use crate::action::{ActionError, HexProblem, ResourceKind};
use crate::faction::{self, Faction};
use crate::hex::Hex;
use crate::map::{Building, BuildingKind, Terrain};
use crate::phase;
use crate::power::Resources;
use crate::state::{GameState, SetupTask, VpSource};
use crate::tiles::{FavorTile, ScoringEvent};
use crate::town;

/// The target cell for any build or transform: on the map, not river, not
/// occupied.
pub(crate) fn open_land(state: &GameState, hex: Hex) -> Result<Terrain, ActionError> {
  let cell = state
    .map
    .cell(hex)
    .ok_or(ActionError::IllegalHex(HexProblem::OffMap))?;
  if cell.terrain.is_river() {
    return Err(ActionError::IllegalHex(HexProblem::River));
  }
  if cell.building.is_some() {
    return Err(ActionError::IllegalHex(HexProblem::Occupied));
  }
  Ok(cell.terrain)
}

/// Direct, bridge or shipping adjacency from any building of `player`.
pub(crate) fn reaches(state: &GameState, player: usize, hex: Hex) -> bool {
  let shipping = state.players[player].shipping_level();
  state
    .map
    .buildings_of(player)
    .iter()
    .any(|(own, _)| state.map.player_adjacent(*own, hex, player, shipping))
}

/// Skip reach: plain hex distance to the nearest own building, rivers and
/// all, for carpets and tunnels.
pub(crate) fn within_skip_range(state: &GameState, player: usize, hex: Hex) -> bool {
  let range = state.players[player].skip_range as i32;
  range > 0
    && state
      .map
      .buildings_of(player)
      .iter()
      .any(|(own, _)| own.distance(hex) <= range)
}

/// Maps a shortfall to the right error kind. Checks coins, then workers,
/// then priests.
pub(crate) fn check_afford(have: &Resources, cost: &Resources) -> Result<(), ActionError> {
  if have.coins < cost.coins {
    return Err(ActionError::InsufficientResources(ResourceKind::Coins));
  }
  if have.workers < cost.workers {
    return Err(ActionError::InsufficientResources(ResourceKind::Workers));
  }
  if have.priests < cost.priests {
    return Err(ActionError::InsufficientResources(ResourceKind::Priests));
  }
  Ok(())
}

/// Scoring and faction passives for `count` spades of terraforming.
pub(crate) fn apply_spade_rewards(state: &mut GameState, player: usize, count: u8) {
  if count == 0 {
    return;
  }
  state.score_event(player, ScoringEvent::Spade, count);
  let faction = state.players[player].faction;
  let passive = faction::vp_per_spade(faction) * count as i32;
  state.award_vp(player, passive, VpSource::FactionPassive);
  if faction == Faction::Alchemists && state.players[player].stronghold_built() {
    state.gain_power(player, 2 * count);
  }
}

/// Places a dwelling that has already been paid for (or is free), fires the
/// dwelling scoring, favor VP, leech offers and the town check.
pub(crate) fn place_dwelling(
  state: &mut GameState,
  player: usize,
  hex: Hex,
) -> Result<(), ActionError> {
  if state.players[player].counts.at_cap(BuildingKind::Dwelling) {
    return Err(ActionError::BuildingCapExceeded);
  }
  let cell = state
    .map
    .cell_mut(hex)
    .ok_or(ActionError::IllegalHex(HexProblem::OffMap))?;
  cell.building = Some(Building {
    kind: BuildingKind::Dwelling,
    owner: player,
  });
  state.players[player].counts.add(BuildingKind::Dwelling);
  state.score_event(player, ScoringEvent::Dwelling, 1);
  if state.players[player].has_favor(FavorTile::Earth1) {
    state.award_vp(player, 2, VpSource::Favor);
  }
  crate::action::leech::trigger(state, player, hex);
  town::check_after_build(state, player, hex);
  Ok(())
}

/// The full composite: terraform `hex` toward `target` (home terrain by
/// default) and optionally build a dwelling on it.
pub fn transform_and_build(
  state: &mut GameState,
  player: usize,
  hex: Hex,
  target: Option<Terrain>,
  build: bool,
  skip: bool,
) -> Result<(), ActionError> {
  let current = open_land(state, hex)?;
  let faction = state.players[player].faction;
  let home = faction.home_terrain();
  let target_terrain = target.unwrap_or(home);
  if target_terrain == Terrain::River {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  if faction == Faction::Giants && target_terrain != home {
    return Err(ActionError::FactionDisallowed);
  }
  if build && target_terrain != home {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  let distance = current
    .wheel_distance(target_terrain)
    .ok_or(ActionError::IllegalHex(HexProblem::River))?;
  if distance == 0 && !build {
    return Err(ActionError::InvalidAction("nothing to transform or build"));
  }

  // Reach the hex: normal adjacency, or the faction's skip ability.
  let mut skip_cost = Resources::default();
  let mut skip_vp = 0;
  if skip {
    match faction {
      Faction::Fakirs => {
        if !within_skip_range(state, player, hex) {
          return Err(ActionError::NotAdjacent);
        }
        skip_cost.priests = 1;
        skip_vp = 4;
      }
      Faction::Dwarves => {
        if !within_skip_range(state, player, hex) {
          return Err(ActionError::NotAdjacent);
        }
        skip_cost.workers = if state.players[player].stronghold_built() {
          1
        } else {
          2
        };
        skip_vp = 4;
      }
      _ => return Err(ActionError::FactionDisallowed),
    }
  } else if !reaches(state, player, hex) {
    return Err(ActionError::NotAdjacent);
  }

  let digging = state.players[player].digging;
  let tf = faction::terraform_cost(faction, digging, distance);
  let mut cost = skip_cost;
  cost.workers += tf.spades as u32 * tf.workers_per_spade;
  cost.priests += tf.spades as u32 * faction::priests_per_spade(faction);
  if build {
    let sheet = faction::setup(faction);
    let dwelling = sheet.dwelling.as_resources();
    cost.coins += dwelling.coins;
    cost.workers += dwelling.workers;
  }
  check_afford(&state.players[player].resources, &cost)?;

  // All checks passed; mutate.
  state.players[player].resources.pay(&cost);
  state.award_vp(player, skip_vp, VpSource::FactionPassive);
  if distance > 0 {
    state
      .map
      .cell_mut(hex)
      .expect("validated above")
      .terrain = target_terrain;
    apply_spade_rewards(state, player, tf.spades);
  }
  if build {
    place_dwelling(state, player, hex)?;
  }
  Ok(())
}

/// A free starting dwelling on home terrain during setup.
pub fn place_setup_dwelling(state: &mut GameState, hex: Hex) -> Result<(), ActionError> {
  let player = match state.setup_queue.front() {
    Some(SetupTask::Dwelling(p)) => *p,
    _ => return Err(ActionError::WrongPhase),
  };
  let terrain = open_land(state, hex)?;
  let home = state.players[player].faction.home_terrain();
  if terrain != home {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  if state.players[player].counts.at_cap(BuildingKind::Dwelling) {
    return Err(ActionError::BuildingCapExceeded);
  }
  let cell = state.map.cell_mut(hex).expect("validated above");
  cell.building = Some(Building {
    kind: BuildingKind::Dwelling,
    owner: player,
  });
  state.players[player].counts.add(BuildingKind::Dwelling);
  state.setup_queue.pop_front();
  phase::after_setup_task(state);
  Ok(())
}
