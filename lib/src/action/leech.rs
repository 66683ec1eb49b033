//! Power leech: offers raised by a build or upgrade next to opponents, the
//! accept/decline resolutions, and the Cultists' conditional bonus keyed by
//! build event.

use crate::action::ActionError;
use crate::cult::CultTrack;
use crate::faction::Faction;
use crate::hex::Hex;
use crate::phase;
use crate::state::{GameState, LeechEvent, LeechOffer, VpSource};
use std::collections::BTreeSet;

/// Hexes adjacent to `hex` for leech purposes: the six neighbors plus any
/// bridge span ending here.
fn leech_neighbors(state: &GameState, hex: Hex) -> Vec<Hex> {
  let mut out: BTreeSet<Hex> = hex.neighbors().iter().cloned().collect();
  for (key, _) in state.map.bridges() {
    let (a, b) = key.endpoints();
    if a == hex {
      out.insert(b);
    } else if b == hex {
      out.insert(a);
    }
  }
  out.into_iter().collect()
}

/// Raises one offer per adjacent opponent after a build or upgrade on
/// `hex`. Offer amounts sum the power values of that opponent's adjacent
/// buildings; the turn will not advance until every offer is resolved.
pub fn trigger(state: &mut GameState, builder: usize, hex: Hex) {
  let neighbors = leech_neighbors(state, hex);
  let player_count = state.players.len();
  let event = state.fresh_event();
  let mut created = 0;
  for step in 1..player_count {
    let opponent = (builder + step) % player_count;
    let amount: u8 = neighbors
      .iter()
      .filter_map(|n| state.map.building(*n))
      .filter(|b| b.owner == opponent)
      .map(|b| b.kind.power_value())
      .sum();
    if amount == 0 {
      continue;
    }
    state.pending_leech.push(LeechOffer {
      from: builder,
      to: opponent,
      amount,
      event,
    });
    created += 1;
  }
  if created > 0 && state.players[builder].faction == Faction::Cultists {
    state.leech_events.insert(
      event,
      LeechEvent {
        builder,
        offers_created: created,
        resolved: 0,
        accepted: 0,
        declined: 0,
      },
    );
  }
}

fn take_offer(state: &mut GameState, index: usize) -> Result<LeechOffer, ActionError> {
  if index >= state.pending_leech.len() {
    return Err(ActionError::InvalidAction("no such leech offer"));
  }
  Ok(state.pending_leech.remove(index))
}

/// Tallies one resolution into the event record. Forced declines, where the
/// recipient could not have gained anything, count in neither column; the
/// bonus is decided when the last offer of the event resolves.
fn resolve_event(state: &mut GameState, event: u64, potential: u8, accepted: bool) {
  let done = match state.leech_events.get_mut(&event) {
    Some(e) => {
      e.resolved += 1;
      if potential > 0 {
        if accepted {
          e.accepted += 1;
        } else {
          e.declined += 1;
        }
      }
      e.resolved == e.offers_created
    }
    None => return,
  };
  if done {
    let e = state.leech_events.remove(&event).expect("present above");
    if e.accepted > 0 {
      state.pending_cultists = Some(e.builder);
    } else if e.declined > 0 {
      state.gain_power(e.builder, 1);
    }
  }
}

/// Accepts an offer: gain the power, pay `amount - 1` VP. VP may go
/// negative.
pub fn accept(state: &mut GameState, index: usize) -> Result<(), ActionError> {
  let offer = take_offer(state, index)?;
  let potential = state.players[offer.to].power.potential_gain(offer.amount);
  state.players[offer.to].power.gain(offer.amount);
  state.award_vp(offer.to, -offer.vp_cost(), VpSource::Leech);
  resolve_event(state, offer.event, potential, true);
  phase::after_pending_drained(state);
  Ok(())
}

/// Declines an offer; resources stay put.
pub fn decline(state: &mut GameState, index: usize) -> Result<(), ActionError> {
  let offer = take_offer(state, index)?;
  let potential = state.players[offer.to].power.potential_gain(offer.amount);
  resolve_event(state, offer.event, potential, false);
  phase::after_pending_drained(state);
  Ok(())
}

/// The Cultists' cult choice owed after an accepted leech.
pub fn choose_cultists_cult(state: &mut GameState, track: CultTrack) -> Result<(), ActionError> {
  let player = match state.pending_cultists {
    Some(p) => p,
    None => return Err(ActionError::InvalidAction("no cultists choice pending")),
  };
  state.pending_cultists = None;
  state.advance_cult(player, track, 1);
  phase::after_pending_drained(state);
  Ok(())
}
