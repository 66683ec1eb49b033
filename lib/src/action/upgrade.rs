//! Building upgrades: D -> TH -> Temple | Stronghold | Sanctuary, favor
//! grants, stronghold unlock effects.

use crate::action::{build, leech, ActionError, HexProblem};
use crate::faction::{self, Faction, StrongholdEffect};
use crate::hex::Hex;
use crate::map::{Building, BuildingKind};
use crate::state::{GameState, VpSource};
use crate::tiles::{FavorTile, ScoringEvent};
use crate::town;

/// Shared by the paid action and the Swarmlings' free upgrade.
pub(crate) fn do_upgrade(
  state: &mut GameState,
  player: usize,
  hex: Hex,
  target: BuildingKind,
  free: bool,
) -> Result<(), ActionError> {
  let current = match state.map.building(hex) {
    Some(b) if b.owner == player => b.kind,
    Some(_) => return Err(ActionError::IllegalHex(HexProblem::Occupied)),
    None => return Err(ActionError::InvalidUpgradePath),
  };
  if !current.upgrades_to(target) {
    return Err(ActionError::InvalidUpgradePath);
  }
  if state.players[player].counts.at_cap(target) {
    return Err(ActionError::BuildingCapExceeded);
  }

  let faction = state.players[player].faction;
  let mut cost = faction::setup(faction).cost_of(target).as_resources();
  if target == BuildingKind::TradingHouse {
    let next_to_opponent = (0..state.players.len())
      .filter(|o| *o != player)
      .any(|o| state.map.touches_building_of(hex, o));
    if !next_to_opponent {
      cost.coins *= 2;
    }
  }
  if free {
    cost = Default::default();
  }
  build::check_afford(&state.players[player].resources, &cost)?;

  state.players[player].resources.pay(&cost);
  state.players[player].counts.remove(current);
  state.players[player].counts.add(target);
  state
    .map
    .cell_mut(hex)
    .expect("building present above")
    .building = Some(Building {
    kind: target,
    owner: player,
  });

  match target {
    BuildingKind::TradingHouse => {
      state.score_event(player, ScoringEvent::TradingHouse, 1);
      if state.players[player].has_favor(FavorTile::Water1) {
        state.award_vp(player, 3, VpSource::Favor);
      }
    }
    BuildingKind::Temple => {
      grant_favors(state, player);
    }
    BuildingKind::Sanctuary => {
      state.score_event(player, ScoringEvent::BigBuilding, 1);
      grant_favors(state, player);
    }
    BuildingKind::Stronghold => {
      state.score_event(player, ScoringEvent::BigBuilding, 1);
      unlock_stronghold(state, player);
    }
    BuildingKind::Dwelling => unreachable!("dwellings are built, not upgraded to"),
  }

  leech::trigger(state, player, hex);
  town::check_after_build(state, player, hex);
  Ok(())
}

pub fn upgrade_building(
  state: &mut GameState,
  player: usize,
  hex: Hex,
  target: BuildingKind,
) -> Result<(), ActionError> {
  do_upgrade(state, player, hex, target, false)
}

/// Temples and the sanctuary grant a favor tile; Chaos Magicians take two.
fn grant_favors(state: &mut GameState, player: usize) {
  let tiles = if state.players[player].faction == Faction::ChaosMagicians {
    2
  } else {
    1
  };
  for _ in 0..tiles {
    state.pending_favors.push_back(player);
  }
}

fn unlock_stronghold(state: &mut GameState, player: usize) {
  let effect = match faction::stronghold_effect(state.players[player].faction) {
    Some(e) => e,
    None => return,
  };
  match effect {
    StrongholdEffect::GainPower12 => state.gain_power(player, 12),
    StrongholdEffect::GainVp7 => state.award_vp(player, 7, VpSource::Stronghold),
    StrongholdEffect::ShippingLevel => {
      let max = faction::setup(state.players[player].faction).shipping_max;
      if state.players[player].shipping < max {
        state.players[player].shipping += 1;
        let vp = state.players[player].shipping as i32 + 1;
        state.award_vp(player, vp, VpSource::Shipping);
      }
    }
    StrongholdEffect::FavorTile => state.pending_favors.push_back(player),
    StrongholdEffect::PendingSpades3 => {
      *state.pending_spades.entry(player).or_insert(0) += 3;
    }
    StrongholdEffect::Ordination => state.pending_ordination = Some(player),
    StrongholdEffect::CarpetRange => state.players[player].skip_range += 1,
  }
}

#[cfg(test)]
mod tests {
  use crate::action::upgrade::*;
  use crate::action::ActionError;
  use crate::faction::Faction;
  use crate::map::{Building, BuildingKind, Map, Terrain};
  use crate::phase::tests::bare_state;
  use crate::state::GameState;

  fn with_dwelling(state: &mut GameState, player: usize, hex: crate::hex::Hex) {
    state.map.cell_mut(hex).unwrap().building = Some(Building {
      kind: BuildingKind::Dwelling,
      owner: player,
    });
    state.players[player].counts.add(BuildingKind::Dwelling);
  }

  fn flat_map() -> Map {
    Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Forest),
      (hex!(2, 0), Terrain::Plains),
    ])
  }

  #[test]
  fn lone_trading_house_costs_double_coins() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = flat_map();
    with_dwelling(&mut state, 0, hex!(0, 0));
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::TradingHouse).unwrap();
    // 2 workers and 6 coins without an adjacent opponent.
    assert_eq!(state.players[0].resources.coins, 15 - 6);
    assert_eq!(state.players[0].resources.workers, 3 - 2);
    assert_eq!(state.players[0].counts.trading_houses, 1);
    assert_eq!(state.players[0].counts.dwellings, 0);
  }

  #[test]
  fn neighboring_opponent_halves_the_coins() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = flat_map();
    with_dwelling(&mut state, 0, hex!(0, 0));
    with_dwelling(&mut state, 1, hex!(1, 0));
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::TradingHouse).unwrap();
    assert_eq!(state.players[0].resources.coins, 15 - 3);
    // The opponent next door is offered power for their own dwelling's value.
    assert_eq!(state.pending_leech.len(), 1);
    assert_eq!(state.pending_leech[0].amount, 1);
  }

  #[test]
  fn dwelling_cannot_become_temple() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = flat_map();
    with_dwelling(&mut state, 0, hex!(0, 0));
    assert_eq!(
      upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::Temple),
      Err(ActionError::InvalidUpgradePath)
    );
  }

  #[test]
  fn temple_grants_a_favor_choice() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = flat_map();
    state.players[0].resources.coins = 20;
    state.players[0].resources.workers = 8;
    with_dwelling(&mut state, 0, hex!(0, 0));
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::TradingHouse).unwrap();
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::Temple).unwrap();
    assert_eq!(state.pending_favors.len(), 1);
    assert_eq!(state.pending_favors[0], 0);
  }

  #[test]
  fn chaos_magicians_take_two_favors() {
    let mut state = bare_state(vec![("c", Faction::ChaosMagicians), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Wasteland),
      (hex!(1, 0), Terrain::Wasteland),
    ]);
    state.players[0].resources.coins = 30;
    state.players[0].resources.workers = 10;
    with_dwelling(&mut state, 0, hex!(0, 0));
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::TradingHouse).unwrap();
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::Temple).unwrap();
    assert_eq!(state.pending_favors.len(), 2);
  }

  #[test]
  fn alchemists_stronghold_pumps_power() {
    let mut state = bare_state(vec![("a", Faction::Alchemists), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Swamp),
      (hex!(1, 0), Terrain::Swamp),
    ]);
    state.players[0].resources.coins = 30;
    state.players[0].resources.workers = 10;
    with_dwelling(&mut state, 0, hex!(0, 0));
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::TradingHouse).unwrap();
    let before = state.players[0].power;
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold).unwrap();
    let mut expected = before;
    expected.gain(12);
    assert_eq!(state.players[0].power, expected);
  }

  #[test]
  fn halflings_stronghold_queues_spades() {
    let mut state = bare_state(vec![("h", Faction::Halflings), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Plains),
      (hex!(1, 0), Terrain::Plains),
    ]);
    state.players[0].resources.coins = 30;
    state.players[0].resources.workers = 10;
    with_dwelling(&mut state, 0, hex!(0, 0));
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::TradingHouse).unwrap();
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold).unwrap();
    assert_eq!(state.pending_spades.get(&0), Some(&3));
  }

  #[test]
  fn second_stronghold_is_capped() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = flat_map();
    state.players[0].resources.coins = 40;
    state.players[0].resources.workers = 16;
    with_dwelling(&mut state, 0, hex!(0, 0));
    with_dwelling(&mut state, 0, hex!(1, 0));
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::TradingHouse).unwrap();
    upgrade_building(&mut state, 0, hex!(0, 0), BuildingKind::Stronghold).unwrap();
    upgrade_building(&mut state, 0, hex!(1, 0), BuildingKind::TradingHouse).unwrap();
    assert_eq!(
      upgrade_building(&mut state, 0, hex!(1, 0), BuildingKind::Stronghold),
      Err(ActionError::BuildingCapExceeded)
    );
  }
}
