//! Special actions: stronghold abilities, bonus card and favor tile
//! actions, the Mermaids' river town claim.

use crate::action::{build, upgrade, Action, ActionError, HexProblem, SpecialAction};
use crate::cult::CultTrack;
use crate::faction::{self, Faction};
use crate::hex::Hex;
use crate::map::{BuildingKind, Terrain};
use crate::state::{GameState, SpecialUse};
use crate::town;

pub fn special_action(
  state: &mut GameState,
  player: usize,
  special: &SpecialAction,
) -> Result<(), ActionError> {
  match special {
    SpecialAction::AurenCult { track } => auren_cult(state, player, *track),
    SpecialAction::WitchesRide { hex } => witches_ride(state, player, *hex),
    SpecialAction::SwarmlingsUpgrade { hex } => swarmlings_upgrade(state, player, *hex),
    SpecialAction::ChaosDoubleTurn { first, second } => {
      chaos_double_turn(state, player, first, second)
    }
    SpecialAction::GiantsSpades { hex, build } => giants_spades(state, player, *hex, *build),
    SpecialAction::Sandstorm { hex, build } => sandstorm(state, player, *hex, *build),
    SpecialAction::BonusSpade { hex, target, build } => {
      bonus_spade(state, player, *hex, *target, *build)
    }
    SpecialAction::BonusCult { track } => bonus_cult(state, player, *track),
    SpecialAction::FavorCult { track } => favor_cult(state, player, *track),
    SpecialAction::MermaidTown { river } => mermaid_town(state, player, *river),
  }
}

/// Stronghold actions require the right faction, a built stronghold and an
/// unused per-round slot.
fn stronghold_ready(
  state: &GameState,
  player: usize,
  faction: Faction,
) -> Result<(), ActionError> {
  if state.players[player].faction != faction {
    return Err(ActionError::FactionDisallowed);
  }
  if !state.players[player].stronghold_built() {
    return Err(ActionError::FactionDisallowed);
  }
  if state.players[player].used.contains(&SpecialUse::Stronghold) {
    return Err(ActionError::SpecialActionAlreadyUsed);
  }
  Ok(())
}

fn auren_cult(state: &mut GameState, player: usize, track: CultTrack) -> Result<(), ActionError> {
  stronghold_ready(state, player, Faction::Auren)?;
  state.players[player].used.insert(SpecialUse::Stronghold);
  state.advance_cult(player, track, 2);
  Ok(())
}

/// A free dwelling on any empty forest hex, adjacency be damned.
fn witches_ride(state: &mut GameState, player: usize, hex: Hex) -> Result<(), ActionError> {
  stronghold_ready(state, player, Faction::Witches)?;
  let terrain = build::open_land(state, hex)?;
  if terrain != Terrain::Forest {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  if state.players[player].counts.at_cap(BuildingKind::Dwelling) {
    return Err(ActionError::BuildingCapExceeded);
  }
  state.players[player].used.insert(SpecialUse::Stronghold);
  build::place_dwelling(state, player, hex)
}

fn swarmlings_upgrade(state: &mut GameState, player: usize, hex: Hex) -> Result<(), ActionError> {
  stronghold_ready(state, player, Faction::Swarmlings)?;
  match state.map.building(hex) {
    Some(b) if b.owner == player && b.kind == BuildingKind::Dwelling => {}
    _ => return Err(ActionError::InvalidUpgradePath),
  }
  upgrade::do_upgrade(state, player, hex, BuildingKind::TradingHouse, true)?;
  state.players[player].used.insert(SpecialUse::Stronghold);
  Ok(())
}

/// Two child actions, one turn advance. Executed on a scratch copy so a
/// failing second child cannot leave half a double turn behind.
fn chaos_double_turn(
  state: &mut GameState,
  player: usize,
  first: &Action,
  second: &Action,
) -> Result<(), ActionError> {
  stronghold_ready(state, player, Faction::ChaosMagicians)?;
  for child in [first, second].iter() {
    match child {
      Action::Pass { .. } => {
        return Err(ActionError::InvalidAction("cannot pass inside a double turn"))
      }
      Action::Special(SpecialAction::ChaosDoubleTurn { .. }) => {
        return Err(ActionError::InvalidAction("double turns do not nest"))
      }
      _ => {}
    }
  }
  let snapshot = state.clone();
  state.players[player].used.insert(SpecialUse::Stronghold);
  let result = crate::action::execute_main(state, player, first)
    .and_then(|_| crate::action::execute_main(state, player, second));
  if let Err(e) = result {
    *state = snapshot;
    return Err(e);
  }
  Ok(())
}

/// Giants' stronghold: two free spades flip a reachable hex to wasteland.
fn giants_spades(
  state: &mut GameState,
  player: usize,
  hex: Hex,
  build_dwelling: bool,
) -> Result<(), ActionError> {
  stronghold_ready(state, player, Faction::Giants)?;
  let terrain = build::open_land(state, hex)?;
  let home = Terrain::Wasteland;
  if terrain == home {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  if !build::reaches(state, player, hex) {
    return Err(ActionError::NotAdjacent);
  }
  let dwelling_cost = faction::setup(Faction::Giants).dwelling.as_resources();
  if build_dwelling {
    if state.players[player].counts.at_cap(BuildingKind::Dwelling) {
      return Err(ActionError::BuildingCapExceeded);
    }
    build::check_afford(&state.players[player].resources, &dwelling_cost)?;
  }
  state.players[player].used.insert(SpecialUse::Stronghold);
  state.map.cell_mut(hex).expect("validated above").terrain = home;
  build::apply_spade_rewards(state, player, 2);
  if build_dwelling {
    state.players[player].resources.pay(&dwelling_cost);
    build::place_dwelling(state, player, hex)?;
  }
  Ok(())
}

/// Nomads' sandstorm: a directly adjacent hex turns to desert, no spades
/// involved.
fn sandstorm(
  state: &mut GameState,
  player: usize,
  hex: Hex,
  build_dwelling: bool,
) -> Result<(), ActionError> {
  stronghold_ready(state, player, Faction::Nomads)?;
  let terrain = build::open_land(state, hex)?;
  if terrain == Terrain::Desert {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  let direct = hex.neighbors().iter().any(|n| {
    state
      .map
      .building(*n)
      .map(|b| b.owner == player)
      .unwrap_or(false)
  });
  if !direct {
    return Err(ActionError::NotAdjacent);
  }
  let dwelling_cost = faction::setup(Faction::Nomads).dwelling.as_resources();
  if build_dwelling {
    if state.players[player].counts.at_cap(BuildingKind::Dwelling) {
      return Err(ActionError::BuildingCapExceeded);
    }
    build::check_afford(&state.players[player].resources, &dwelling_cost)?;
  }
  state.players[player].used.insert(SpecialUse::Stronghold);
  state.map.cell_mut(hex).expect("validated above").terrain = Terrain::Desert;
  if build_dwelling {
    state.players[player].resources.pay(&dwelling_cost);
    build::place_dwelling(state, player, hex)?;
  }
  Ok(())
}

/// The bonus card's free spade, optionally continued into a full transform
/// and build by paying for the remaining spades.
fn bonus_spade(
  state: &mut GameState,
  player: usize,
  hex: Hex,
  target: Option<Terrain>,
  build_dwelling: bool,
) -> Result<(), ActionError> {
  let has_card = state.players[player]
    .bonus
    .map(|b| b.has_spade_action())
    .unwrap_or(false);
  if !has_card {
    return Err(ActionError::FactionDisallowed);
  }
  if state.players[player].used.contains(&SpecialUse::BonusCard) {
    return Err(ActionError::SpecialActionAlreadyUsed);
  }
  let current = build::open_land(state, hex)?;
  let faction = state.players[player].faction;
  let home = faction.home_terrain();
  let target_terrain = target.unwrap_or(home);
  if faction == Faction::Giants && target_terrain != home {
    return Err(ActionError::FactionDisallowed);
  }
  if build_dwelling && target_terrain != home {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  let distance = current
    .wheel_distance(target_terrain)
    .ok_or(ActionError::IllegalHex(HexProblem::River))?;
  if distance == 0 {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  if !build::reaches(state, player, hex) {
    return Err(ActionError::NotAdjacent);
  }
  let tf = faction::terraform_cost(faction, state.players[player].digging, distance);
  let paid_spades = tf.spades.saturating_sub(1) as u32;
  let mut cost = crate::power::Resources::default();
  cost.workers = paid_spades * tf.workers_per_spade;
  cost.priests = paid_spades * faction::priests_per_spade(faction);
  if build_dwelling {
    if state.players[player].counts.at_cap(BuildingKind::Dwelling) {
      return Err(ActionError::BuildingCapExceeded);
    }
    let dwelling = faction::setup(faction).dwelling.as_resources();
    cost.coins += dwelling.coins;
    cost.workers += dwelling.workers;
  }
  build::check_afford(&state.players[player].resources, &cost)?;

  state.players[player].used.insert(SpecialUse::BonusCard);
  state.players[player].resources.pay(&cost);
  state.map.cell_mut(hex).expect("validated above").terrain = target_terrain;
  build::apply_spade_rewards(state, player, tf.spades);
  if build_dwelling {
    build::place_dwelling(state, player, hex)?;
  }
  Ok(())
}

fn bonus_cult(state: &mut GameState, player: usize, track: CultTrack) -> Result<(), ActionError> {
  let has_card = state.players[player]
    .bonus
    .map(|b| b.has_cult_action())
    .unwrap_or(false);
  if !has_card {
    return Err(ActionError::FactionDisallowed);
  }
  if state.players[player].used.contains(&SpecialUse::BonusCard) {
    return Err(ActionError::SpecialActionAlreadyUsed);
  }
  state.players[player].used.insert(SpecialUse::BonusCard);
  state.advance_cult(player, track, 1);
  Ok(())
}

fn favor_cult(state: &mut GameState, player: usize, track: CultTrack) -> Result<(), ActionError> {
  if !state.players[player].has_favor(crate::tiles::FavorTile::Water2) {
    return Err(ActionError::FactionDisallowed);
  }
  if state.players[player].used.contains(&SpecialUse::WaterFavor) {
    return Err(ActionError::SpecialActionAlreadyUsed);
  }
  state.players[player].used.insert(SpecialUse::WaterFavor);
  state.advance_cult(player, track, 1);
  Ok(())
}

/// Mermaids claim a town whose halves sit across `river`.
fn mermaid_town(state: &mut GameState, player: usize, river: Hex) -> Result<(), ActionError> {
  if state.players[player].faction != Faction::Mermaids {
    return Err(ActionError::FactionDisallowed);
  }
  if !state.map.is_river(river) {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  match town::try_river_town(state, player, river) {
    Some(pending) => {
      state.pending_towns.push_back(pending);
      Ok(())
    }
    None => Err(ActionError::InvalidAction("no town forms across that river")),
  }
}

#[cfg(test)]
mod tests {
  use crate::action::special::*;
  use crate::action::{Action, ActionError, SpecialAction};
  use crate::faction::Faction;
  use crate::map::{Building, BuildingKind, Map, Terrain};
  use crate::phase::tests::bare_state;
  use crate::state::{GameState, SpecialUse};

  fn seed(state: &mut GameState, player: usize, h: crate::hex::Hex, kind: BuildingKind) {
    state.map.cell_mut(h).unwrap().building = Some(Building { kind, owner: player });
    state.players[player].counts.add(kind);
  }

  #[test]
  fn witches_ride_builds_anywhere_in_the_forest() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(5, 3), Terrain::Forest),
      (hex!(6, 3), Terrain::Plains),
    ]);
    seed(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold);
    let coins = state.players[0].resources.coins;
    special_action(
      &mut state,
      0,
      &SpecialAction::WitchesRide { hex: hex!(5, 3) },
    )
    .unwrap();
    // Free of charge, any forest hex.
    assert_eq!(state.players[0].resources.coins, coins);
    assert!(state.map.building(hex!(5, 3)).is_some());
    assert_eq!(
      special_action(
        &mut state,
        0,
        &SpecialAction::WitchesRide { hex: hex!(6, 3) },
      ),
      Err(ActionError::SpecialActionAlreadyUsed)
    );
  }

  #[test]
  fn witches_ride_needs_forest() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Plains),
    ]);
    seed(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold);
    assert_eq!(
      special_action(
        &mut state,
        0,
        &SpecialAction::WitchesRide { hex: hex!(1, 0) },
      ),
      Err(ActionError::IllegalHex(crate::action::HexProblem::WrongTerrain))
    );
  }

  #[test]
  fn auren_cult_needs_the_stronghold() {
    let mut state = bare_state(vec![("a", Faction::Auren), ("n", Faction::Nomads)]);
    assert_eq!(
      special_action(
        &mut state,
        0,
        &SpecialAction::AurenCult {
          track: crate::cult::CultTrack::Water
        },
      ),
      Err(ActionError::FactionDisallowed)
    );
    state.map = Map::from_cells(vec![(hex!(0, 0), Terrain::Forest)]);
    seed(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold);
    special_action(
      &mut state,
      0,
      &SpecialAction::AurenCult {
        track: crate::cult::CultTrack::Water,
      },
    )
    .unwrap();
    assert_eq!(state.players[0].cult[1], 1 + 2);
  }

  #[test]
  fn sandstorm_is_strictly_local() {
    let mut state = bare_state(vec![("n", Faction::Nomads), ("w", Faction::Witches)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Desert),
      (hex!(1, 0), Terrain::Swamp),
      (hex!(3, 0), Terrain::Swamp),
    ]);
    seed(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold);
    assert_eq!(
      special_action(
        &mut state,
        0,
        &SpecialAction::Sandstorm {
          hex: hex!(3, 0),
          build: false
        },
      ),
      Err(ActionError::NotAdjacent)
    );
    special_action(
      &mut state,
      0,
      &SpecialAction::Sandstorm {
        hex: hex!(1, 0),
        build: true,
      },
    )
    .unwrap();
    assert_eq!(state.map.terrain(hex!(1, 0)), Some(Terrain::Desert));
    assert!(state.map.building(hex!(1, 0)).is_some());
  }

  #[test]
  fn chaos_double_turn_rolls_back_cleanly() {
    let mut state = bare_state(vec![
      ("c", Faction::ChaosMagicians),
      ("n", Faction::Nomads),
    ]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Wasteland),
      (hex!(1, 0), Terrain::Wasteland),
    ]);
    seed(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold);
    // One priest: the shipping child spends it, the digging child starves.
    state.players[0].resources.priests = 1;
    let before = state.clone();
    let double = SpecialAction::ChaosDoubleTurn {
      first: Box::new(Action::AdvanceShipping),
      second: Box::new(Action::AdvanceDigging),
    };
    let result = special_action(&mut state, 0, &double);
    assert!(result.is_err());
    assert_eq!(state.players[0].shipping, before.players[0].shipping);
    assert!(!state.players[0].used.contains(&SpecialUse::Stronghold));
  }

  #[test]
  fn chaos_double_turn_runs_two_actions() {
    let mut state = bare_state(vec![
      ("c", Faction::ChaosMagicians),
      ("n", Faction::Nomads),
    ]);
    state.map = Map::from_cells(vec![(hex!(0, 0), Terrain::Wasteland)]);
    seed(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold);
    state.players[0].resources.priests = 2;
    state.players[0].resources.coins = 20;
    let double = SpecialAction::ChaosDoubleTurn {
      first: Box::new(Action::AdvanceShipping),
      second: Box::new(Action::AdvanceDigging),
    };
    special_action(&mut state, 0, &double).unwrap();
    assert_eq!(state.players[0].shipping, 1);
    assert_eq!(state.players[0].digging, 1);
    assert!(state.players[0].used.contains(&SpecialUse::Stronghold));
  }

  #[test]
  fn bonus_cult_requires_the_card() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    assert_eq!(
      special_action(
        &mut state,
        0,
        &SpecialAction::BonusCult {
          track: crate::cult::CultTrack::Air
        },
      ),
      Err(ActionError::FactionDisallowed)
    );
    state.players[0].bonus = Some(crate::tiles::BonusCard::CultStep);
    special_action(
      &mut state,
      0,
      &SpecialAction::BonusCult {
        track: crate::cult::CultTrack::Air,
      },
    )
    .unwrap();
    assert_eq!(state.players[0].cult[3], 2 + 1);
  }
}
