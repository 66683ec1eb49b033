//! # Town formation and building connectivity
//!
//! Towns form over the *structural* adjacency of a player's buildings:
//! shared edges and bridges. Shipping never glues a town together, but a
//! Mermaid town may consume one river hex as a connector. End-of-game area
//! scoring reuses the component walk with each faction's own reach.

use crate::faction::Faction;
use crate::hex::Hex;
use crate::map::Map;
use crate::state::{GameState, PendingTown};
use std::collections::BTreeSet;

/// True when two built hexes are town-adjacent for `player`: shared edge or
/// a bridge between them. `river` designates the one river hex a Mermaid
/// component may flow through.
fn town_adjacent(map: &Map, a: Hex, b: Hex, river: Option<Hex>) -> bool {
  if a.is_neighbor(b) || map.has_bridge(a, b) {
    return true;
  }
  match river {
    Some(r) => a.is_neighbor(r) && b.is_neighbor(r),
    None => false,
  }
}

/// The connected component of `player`'s buildings through `start`.
pub fn component(map: &Map, player: usize, start: Hex, river: Option<Hex>) -> Vec<Hex> {
  let mine: BTreeSet<Hex> = map
    .buildings_of(player)
    .into_iter()
    .map(|(h, _)| h)
    .collect();
  if !mine.contains(&start) {
    return Vec::new();
  }
  let mut seen: BTreeSet<Hex> = BTreeSet::new();
  let mut stack = vec![start];
  seen.insert(start);
  while let Some(h) = stack.pop() {
    for other in mine.iter() {
      if !seen.contains(other) && town_adjacent(map, h, *other, river) {
        seen.insert(*other);
        stack.push(*other);
      }
    }
  }
  seen.into_iter().collect()
}

/// Sum of building power values over a component.
pub fn component_power(map: &Map, cells: &[Hex]) -> u8 {
  cells
    .iter()
    .filter_map(|h| map.building(*h))
    .map(|b| b.kind.power_value())
    .sum()
}

fn touches_existing_town(map: &Map, cells: &[Hex]) -> bool {
  cells
    .iter()
    .any(|h| map.cell(*h).map(|c| c.in_town).unwrap_or(false))
}

fn qualifies(state: &GameState, player: usize, cells: &[Hex]) -> bool {
  cells.len() >= 4 && component_power(&state.map, cells) >= state.player(player).town_threshold()
}

/// River hexes bordering at least two buildings of the component; the only
/// candidates worth trying as a Mermaid connector.
fn river_candidates(state: &GameState, player: usize, around: Hex) -> Vec<Hex> {
  let mut out = Vec::new();
  let mine: BTreeSet<Hex> = state
    .map
    .buildings_of(player)
    .into_iter()
    .map(|(h, _)| h)
    .collect();
  let reachable = component(&state.map, player, around, None);
  let mut seen = BTreeSet::new();
  for h in reachable.iter() {
    for r in state.map.river_neighbors(*h) {
      if !seen.insert(r) {
        continue;
      }
      if state.map.cell(r).and_then(|c| c.town_marker).is_some() {
        continue;
      }
      let bordering = r.neighbors().iter().filter(|n| mine.contains(n)).count();
      if bordering >= 2 {
        out.push(r);
      }
    }
  }
  out
}

/// Called after every build, upgrade or bridge that may have grown
/// `player`'s component through `hex`. Joins an existing town silently, or
/// queues a pending town selection when a new town appears.
pub fn check_after_build(state: &mut GameState, player: usize, hex: Hex) {
  let plain = component(&state.map, player, hex, None);
  if plain.is_empty() {
    return;
  }
  if touches_existing_town(&state.map, &plain) {
    for h in plain.iter() {
      if let Some(cell) = state.map.cell_mut(*h) {
        cell.in_town = true;
      }
    }
    return;
  }
  if qualifies(state, player, &plain) {
    state.pending_towns.push_back(PendingTown {
      player,
      component: plain,
      river: None,
    });
    return;
  }
  // Mermaids may bridge exactly one river hex when that completes a town.
  if state.player(player).faction == Faction::Mermaids {
    for r in river_candidates(state, player, hex) {
      let extended = component(&state.map, player, hex, Some(r));
      if touches_existing_town(&state.map, &extended) {
        continue;
      }
      if qualifies(state, player, &extended) {
        state.pending_towns.push_back(PendingTown {
          player,
          component: extended,
          river: Some(r),
        });
        return;
      }
    }
  }
}

/// Tries to complete a Mermaid town across one specific river hex; used by
/// the explicit claim action for towns the build-time check did not fire
/// on (a shipping or favor change, or a delayed claim).
pub fn try_river_town(state: &GameState, player: usize, river: Hex) -> Option<PendingTown> {
  if state.map.cell(river).and_then(|c| c.town_marker).is_some() {
    return None;
  }
  let anchor = river.neighbors().iter().cloned().find(|n| {
    state
      .map
      .building(*n)
      .map(|b| b.owner == player)
      .unwrap_or(false)
  })?;
  let extended = component(&state.map, player, anchor, Some(river));
  if touches_existing_town(&state.map, &extended) {
    return None;
  }
  if !qualifies(state, player, &extended) {
    return None;
  }
  Some(PendingTown {
    player,
    component: extended,
    river: Some(river),
  })
}

/// Marks a pending town founded: flags the cells, stamps the Mermaid river
/// marker.
pub fn found(state: &mut GameState, town: &PendingTown) {
  for h in town.component.iter() {
    if let Some(cell) = state.map.cell_mut(*h) {
      cell.in_town = true;
    }
  }
  if let Some(r) = town.river {
    if let Some(cell) = state.map.cell_mut(r) {
      cell.town_marker = Some(town.player);
    }
  }
  state.players[town.player].towns += 1;
}

/// Area-scoring adjacency: each faction's own notion of connected.
fn area_adjacent(state: &GameState, player: usize, a: Hex, b: Hex) -> bool {
  let p = state.player(player);
  match p.faction {
    // Carpets cross anything within flight range, rivers included.
    Faction::Fakirs => a.distance(b) <= p.skip_range as i32,
    Faction::Dwarves => a.distance(b) <= 2,
    _ => {
      a.is_neighbor(b)
        || state.map.bridge_owner(a, b) == Some(player)
        || state.map.shipping_reachable(a, b, p.shipping_level())
    }
  }
}

/// Size of the player's largest connected component for end-game area
/// scoring.
pub fn largest_component(state: &GameState, player: usize) -> usize {
  let mine: Vec<Hex> = state
    .map
    .buildings_of(player)
    .into_iter()
    .map(|(h, _)| h)
    .collect();
  let mut best = 0;
  let mut seen: BTreeSet<Hex> = BTreeSet::new();
  for start in mine.iter() {
    if seen.contains(start) {
      continue;
    }
    let mut size = 0;
    let mut stack = vec![*start];
    seen.insert(*start);
    while let Some(h) = stack.pop() {
      size += 1;
      for other in mine.iter() {
        if !seen.contains(other) && area_adjacent(state, player, h, *other) {
          seen.insert(*other);
          stack.push(*other);
        }
      }
    }
    best = best.max(size);
  }
  best
}

/// Bridges whose both ends carry a building of `player`; the Engineers'
/// pass bonus counts these.
pub fn own_bridge_links(state: &GameState, player: usize) -> usize {
  state
    .map
    .bridges()
    .filter(|(key, owner)| {
      if **owner != player {
        return false;
      }
      let (a, b) = key.endpoints();
      let both = |h: Hex| {
        state
          .map
          .building(h)
          .map(|bld| bld.owner == player)
          .unwrap_or(false)
      };
      both(a) && both(b)
    })
    .count()
}

#[cfg(test)]
mod tests {
  use crate::faction::Faction;
  use crate::hex::Hex;
  use crate::map::{Building, BuildingKind, Map, Terrain};
  use crate::town::*;

  fn place(map: &mut Map, h: Hex, kind: BuildingKind, owner: usize) {
    let cell = map.cell_mut(h).expect("hex on map");
    cell.building = Some(Building { kind, owner });
  }

  #[test]
  fn component_walks_edges_and_stops_at_gaps() {
    let mut map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Forest),
      (hex!(2, 0), Terrain::Forest),
      (hex!(4, 0), Terrain::Forest),
    ]);
    for h in [hex!(0, 0), hex!(1, 0), hex!(2, 0), hex!(4, 0)].iter() {
      place(&mut map, *h, BuildingKind::Dwelling, 0);
    }
    let c = component(&map, 0, hex!(0, 0), None);
    assert_eq!(c.len(), 3);
    assert!(!c.contains(&hex!(4, 0)));
  }

  #[test]
  fn component_ignores_other_players() {
    let mut map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Plains),
      (hex!(2, 0), Terrain::Forest),
    ]);
    place(&mut map, hex!(0, 0), BuildingKind::Dwelling, 0);
    place(&mut map, hex!(1, 0), BuildingKind::Dwelling, 1);
    place(&mut map, hex!(2, 0), BuildingKind::Dwelling, 0);
    let c = component(&map, 0, hex!(0, 0), None);
    assert_eq!(c.len(), 1);
  }

  #[test]
  fn river_hex_bridges_a_mermaid_component() {
    let mut map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Lake),
      (hex!(1, 0), Terrain::River),
      (hex!(2, 0), Terrain::Lake),
    ]);
    place(&mut map, hex!(0, 0), BuildingKind::Dwelling, 0);
    place(&mut map, hex!(2, 0), BuildingKind::Dwelling, 0);
    assert_eq!(component(&map, 0, hex!(0, 0), None).len(), 1);
    let c = component(&map, 0, hex!(0, 0), Some(hex!(1, 0)));
    assert_eq!(c.len(), 2);
  }

  #[test]
  fn component_power_sums_building_values() {
    let mut map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Forest),
    ]);
    place(&mut map, hex!(0, 0), BuildingKind::Stronghold, 0);
    place(&mut map, hex!(1, 0), BuildingKind::TradingHouse, 0);
    assert_eq!(component_power(&map, &[hex!(0, 0), hex!(1, 0)]), 5);
  }

  #[test]
  fn four_buildings_at_power_seven_raise_a_town() {
    let mut state = crate::phase::tests::bare_state(vec![
      ("w", Faction::Witches),
      ("n", Faction::Nomads),
    ]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Forest),
      (hex!(2, 0), Terrain::Forest),
      (hex!(3, 0), Terrain::Forest),
    ]);
    // Three trading houses and the fresh dwelling: power 2+2+2+1 = 7.
    for h in [hex!(0, 0), hex!(1, 0), hex!(2, 0)].iter() {
      place(&mut state.map, *h, BuildingKind::TradingHouse, 0);
    }
    place(&mut state.map, hex!(3, 0), BuildingKind::Dwelling, 0);
    check_after_build(&mut state, 0, hex!(3, 0));
    assert_eq!(state.pending_towns.len(), 1);
    assert_eq!(state.pending_towns[0].component.len(), 4);
    assert_eq!(state.pending_towns[0].river, None);
  }

  #[test]
  fn three_buildings_are_not_a_town() {
    let mut state = crate::phase::tests::bare_state(vec![
      ("w", Faction::Witches),
      ("n", Faction::Nomads),
    ]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Forest),
      (hex!(2, 0), Terrain::Forest),
    ]);
    for h in [hex!(0, 0), hex!(1, 0)].iter() {
      place(&mut state.map, *h, BuildingKind::TradingHouse, 0);
    }
    place(&mut state.map, hex!(2, 0), BuildingKind::Stronghold, 0);
    check_after_build(&mut state, 0, hex!(2, 0));
    assert!(state.pending_towns.is_empty());
  }

  #[test]
  fn fire_favor_lowers_the_threshold_to_six() {
    let mut state = crate::phase::tests::bare_state(vec![
      ("w", Faction::Witches),
      ("n", Faction::Nomads),
    ]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Forest),
      (hex!(2, 0), Terrain::Forest),
      (hex!(3, 0), Terrain::Forest),
    ]);
    // Two trading houses and two dwellings: power 6.
    place(&mut state.map, hex!(0, 0), BuildingKind::TradingHouse, 0);
    place(&mut state.map, hex!(1, 0), BuildingKind::TradingHouse, 0);
    place(&mut state.map, hex!(2, 0), BuildingKind::Dwelling, 0);
    place(&mut state.map, hex!(3, 0), BuildingKind::Dwelling, 0);
    check_after_build(&mut state, 0, hex!(3, 0));
    assert!(state.pending_towns.is_empty());
    state.players[0].favors.push(crate::tiles::FavorTile::Fire2);
    check_after_build(&mut state, 0, hex!(3, 0));
    assert_eq!(state.pending_towns.len(), 1);
  }

  #[test]
  fn mermaids_close_a_town_across_the_river() {
    let mut state = crate::phase::tests::bare_state(vec![
      ("m", Faction::Mermaids),
      ("n", Faction::Nomads),
    ]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Lake),
      (hex!(1, 0), Terrain::Lake),
      (hex!(2, 0), Terrain::River),
      (hex!(3, 0), Terrain::Lake),
      (hex!(4, 0), Terrain::Lake),
    ]);
    place(&mut state.map, hex!(0, 0), BuildingKind::TradingHouse, 0);
    place(&mut state.map, hex!(1, 0), BuildingKind::TradingHouse, 0);
    place(&mut state.map, hex!(3, 0), BuildingKind::TradingHouse, 0);
    place(&mut state.map, hex!(4, 0), BuildingKind::Dwelling, 0);
    check_after_build(&mut state, 0, hex!(4, 0));
    assert_eq!(state.pending_towns.len(), 1);
    assert_eq!(state.pending_towns[0].river, Some(hex!(2, 0)));
    assert_eq!(state.pending_towns[0].component.len(), 4);
  }

  #[test]
  fn fakirs_components_ignore_rivers() {
    // Four dwellings at mutual distance <= 3 with river in between form
    // one component once the carpet range reaches 3.
    let mut map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Desert),
      (hex!(1, 0), Terrain::River),
      (hex!(2, 0), Terrain::River),
      (hex!(3, 0), Terrain::Desert),
      (hex!(0, 1), Terrain::River),
      (hex!(1, 1), Terrain::River),
      (hex!(0, 2), Terrain::Desert),
      (hex!(1, 2), Terrain::Desert),
    ]);
    let spots = [hex!(0, 0), hex!(3, 0), hex!(0, 2), hex!(1, 2)];
    for h in spots.iter() {
      place(&mut map, *h, BuildingKind::Dwelling, 0);
    }
    let mut state = crate::phase::tests::bare_state(vec![
      ("f", Faction::Fakirs),
      ("w", Faction::Witches),
    ]);
    state.map = map;
    state.players[0].skip_range = 3;
    assert_eq!(largest_component(&state, 0), 4);
    state.players[0].skip_range = 1;
    assert!(largest_component(&state, 0) < 4);
  }
}
