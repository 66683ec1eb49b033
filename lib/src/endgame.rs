//! # End-of-game scoring
//!
//! Cult majorities at 8/4/2 per track, area scoring at 18/12/6, then
//! leftover resources at three coins per VP. Ties split the pooled prizes
//! and round down.

use crate::cult::TRACKS;
use crate::state::{GameState, VpSource};
use crate::town;

const CULT_PRIZES: [i32; 3] = [8, 4, 2];
const AREA_PRIZES: [i32; 3] = [18, 12, 6];

/// Awards pooled prizes to ranked `(player, value)` pairs. Tied players
/// split the prizes their ranks span, floored; the next group moves past
/// all spanned ranks.
fn award_ranked(state: &mut GameState, scores: &[(usize, u32)], prizes: &[i32; 3], source: VpSource) {
  let mut ranked: Vec<(usize, u32)> = scores.iter().filter(|(_, v)| *v > 0).cloned().collect();
  ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
  let mut rank = 0;
  let mut i = 0;
  while i < ranked.len() && rank < prizes.len() {
    let value = ranked[i].1;
    let group: Vec<usize> = ranked[i..]
      .iter()
      .take_while(|(_, v)| *v == value)
      .map(|(p, _)| *p)
      .collect();
    let pool: i32 = (rank..(rank + group.len()).min(prizes.len()))
      .map(|r| prizes[r])
      .sum();
    let share = pool / group.len() as i32;
    for p in group.iter() {
      state.award_vp(*p, share, source);
    }
    i += group.len();
    rank += group.len();
  }
}

/// Runs the complete end scoring. Called by the phase machine after the
/// last pass of round six.
pub fn score(state: &mut GameState) {
  // Cult track majorities; players at position zero score nothing.
  for track in TRACKS.iter() {
    let scores: Vec<(usize, u32)> = (0..state.players.len())
      .map(|p| (p, state.players[p].cult[track.index()] as u32))
      .collect();
    award_ranked(state, &scores, &CULT_PRIZES, VpSource::CultMajority);
  }

  // Largest connected component per player.
  let sizes: Vec<(usize, u32)> = (0..state.players.len())
    .map(|p| (p, town::largest_component(state, p) as u32))
    .collect();
  award_ranked(state, &sizes, &AREA_PRIZES, VpSource::Area);

  // Leftover resources: workers and priests count as coins, three coins
  // buy one VP. Power tokens are discarded.
  for p in 0..state.players.len() {
    let r = state.players[p].resources;
    let coins = r.coins + r.workers + r.priests;
    state.award_vp(p, (coins / 3) as i32, VpSource::Resources);
  }
}
