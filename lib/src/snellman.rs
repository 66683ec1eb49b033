//! # Replay log lines
//!
//! Parses the Snellman-style action grammar into [`Action`] values. One
//! action per line, optionally prefixed with the acting faction
//! (`witches: build E5`). Board positions use row letter plus column
//! number (`A1` .. `I13`).
//!
//! A few commands need the current state to resolve: leech lines are
//! matched against the open offers, `send p to FIRE` picks the biggest
//! open priest slot, and a bare `bridge` line becomes the power-action
//! child when one is owed, the Engineers' main action otherwise.
//!
//! The Chaos Magicians' double turn cannot be expressed on one line; the
//! parser surfaces `MissingInfo` so the caller can ask for the two child
//! actions.

use crate::action::{Action, ActionError, Conversion, PowerActionSlot, SpecialAction};
use crate::cult::CultTrack;
use crate::faction::Faction;
use crate::hex::Hex;
use crate::map::{row_col_to_axial, BuildingKind, Terrain, ROW_LETTERS};
use crate::state::GameState;
use crate::tiles::{BonusCard, FavorTile, TownTile};
use regex::Regex;

/// A parsed line: the author if the line named one, and the action.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
  pub author: Option<Faction>,
  pub action: Action,
}

/// Why a line did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
  UnknownCommand(String),
  BadPosition(String),
  BadFaction(String),
  BadTile(String),
  NoMatchingOffer,
  /// The grammar cannot carry this decision; ask the submitter.
  NeedsMoreInfo(&'static str),
}

impl std::fmt::Display for ParseError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ParseError::UnknownCommand(line) => write!(f, "unparseable line: {}", line),
      ParseError::BadPosition(pos) => write!(f, "bad board position: {}", pos),
      ParseError::BadFaction(name) => write!(f, "unknown faction: {}", name),
      ParseError::BadTile(code) => write!(f, "unknown tile: {}", code),
      ParseError::NoMatchingOffer => write!(f, "no open leech offer matches"),
      ParseError::NeedsMoreInfo(what) => write!(f, "line needs more info: {}", what),
    }
  }
}

impl std::error::Error for ParseError {}

/// `E5` -> axial hex. Row letters A..I, columns 1-based.
pub fn parse_position(pos: &str) -> Result<Hex, ParseError> {
  let bad = || ParseError::BadPosition(pos.to_string());
  let mut chars = pos.chars();
  let row_letter = chars.next().ok_or_else(bad)?.to_ascii_uppercase();
  let row = ROW_LETTERS
    .iter()
    .position(|c| *c == row_letter)
    .ok_or_else(bad)?;
  let col: usize = chars.as_str().parse().map_err(|_| bad())?;
  if col == 0 {
    return Err(bad());
  }
  Ok(row_col_to_axial(row, col - 1))
}

fn parse_track(name: &str) -> Result<CultTrack, ParseError> {
  CultTrack::from_name(name).ok_or_else(|| ParseError::BadFaction(name.to_string()))
}

fn parse_terrain(name: &str) -> Result<Terrain, ParseError> {
  let lowered = name.to_ascii_lowercase();
  for t in crate::map::WHEEL.iter() {
    if t.name() == lowered {
      return Ok(*t);
    }
  }
  Err(ParseError::BadTile(name.to_string()))
}

lazy_static! {
  static ref PREFIX: Regex =
    Regex::new(r"^(?P<faction>[A-Za-z]+):\s*(?P<rest>.*)$").expect("prefix regex");
  static ref BUILD: Regex = Regex::new(r"(?i)^build\s+(?P<pos>[A-I]\d{1,2})$").expect("regex");
  static ref DIG_BUILD: Regex =
    Regex::new(r"(?i)^dig\s+\d+\.\s*build\s+(?P<pos>[A-I]\d{1,2})$").expect("regex");
  static ref TRANSFORM: Regex =
    Regex::new(r"(?i)^transform\s+(?P<pos>[A-I]\d{1,2})(?:\s+to\s+(?P<terrain>[a-z]+))?$")
      .expect("regex");
  static ref UPGRADE: Regex =
    Regex::new(r"(?i)^upgrade\s+(?P<pos>[A-I]\d{1,2})\s+to\s+(?P<kind>TP|TH|TE|SH|SA)$")
      .expect("regex");
  static ref LEECH: Regex =
    Regex::new(r"(?i)^(?P<verb>leech|decline)\s+(?P<amount>\d+)\s+from\s+(?P<from>[a-z]+)$")
      .expect("regex");
  static ref PASS: Regex = Regex::new(r"(?i)^pass(?:\s+(?P<bon>BON\d))?$").expect("regex");
  static ref POWER: Regex = Regex::new(r"(?i)^action\s+ACT(?P<slot>[1-7])$").expect("regex");
  static ref SPECIAL_POS: Regex = Regex::new(
    r"(?i)^action\s+(?P<code>ACTW|ACTS|ACTG|ACTN)\s+(?P<pos>[A-I]\d{1,2})(?:\s+(?P<build>build))?$"
  )
  .expect("regex");
  static ref SPECIAL_CULT: Regex =
    Regex::new(r"(?i)^action\s+(?P<code>ACTA|BON2|FAV6)\s+(?P<track>[a-z]+)$").expect("regex");
  static ref BONUS_SPADE: Regex = Regex::new(
    r"(?i)^action\s+BON1\s+(?P<pos>[A-I]\d{1,2})(?:\s+(?P<build>build))?$"
  )
  .expect("regex");
  static ref CHAOS_DOUBLE: Regex = Regex::new(r"(?i)^action\s+ACTC\b").expect("regex");
  static ref MERMAID_TOWN: Regex =
    Regex::new(r"(?i)^action\s+ACTM\s+(?P<pos>[A-I]\d{1,2})$").expect("regex");
  static ref SEND: Regex =
    Regex::new(r"(?i)^send\s+p\s+to\s+(?P<track>[a-z]+)(?:\s+for\s+(?P<steps>[1-3]))?$")
      .expect("regex");
  static ref ADVANCE: Regex = Regex::new(r"(?i)^advance\s+(?P<what>ship|dig)$").expect("regex");
  static ref BRIDGE: Regex = Regex::new(
    r"(?i)^bridge\s+(?P<a>[A-I]\d{1,2}):(?P<b>[A-I]\d{1,2})$"
  )
  .expect("regex");
  static ref CONVERT: Regex = Regex::new(
    r"(?i)^convert\s+(?P<n>\d+)\s*(?P<from>PW|VP|C|W|P)\s+to\s+(?P<to>VP|C|W|P)$"
  )
  .expect("regex");
  static ref BURN: Regex = Regex::new(r"(?i)^burn\s+(?P<n>\d+)$").expect("regex");
  static ref FAVOR: Regex = Regex::new(r"(?i)^\+?(?P<fav>FAV\d{1,2})$").expect("regex");
  static ref TOWN: Regex = Regex::new(r"(?i)^\+?(?P<tw>TW\d)$").expect("regex");
  static ref CULT_CHOICE: Regex = Regex::new(r"(?i)^cult\s+(?P<track>[a-z]+)$").expect("regex");
  static ref ORDINATION: Regex =
    Regex::new(r"(?i)^ordination\s+(?P<n>[0-3])$").expect("regex");
  static ref FORFEIT: Regex = Regex::new(r"(?i)^forfeit$").expect("regex");
}

/// Parses one log line against the current state. Blank lines and `#`
/// comments yield `None`.
pub fn parse_line(state: &GameState, line: &str) -> Result<Option<ParsedLine>, ParseError> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return Ok(None);
  }

  let (author, rest) = match PREFIX.captures(trimmed) {
    Some(caps) => {
      let name = caps.name("faction").expect("group").as_str();
      match Faction::from_name(name) {
        Some(f) => (Some(f), caps.name("rest").expect("group").as_str().to_string()),
        None => return Err(ParseError::BadFaction(name.to_string())),
      }
    }
    None => {
      // The colon is optional: `witches build E5` works too.
      let mut split = trimmed.splitn(2, char::is_whitespace);
      let head = split.next().unwrap_or("");
      match (Faction::from_name(head), split.next()) {
        (Some(f), Some(tail)) => (Some(f), tail.to_string()),
        _ => (None, trimmed.to_string()),
      }
    }
  };
  let rest = rest.trim();

  let action = parse_command(state, author, rest)?;
  Ok(Some(ParsedLine { author, action }))
}

fn parse_command(
  state: &GameState,
  author: Option<Faction>,
  rest: &str,
) -> Result<Action, ParseError> {
  if let Some(caps) = BUILD.captures(rest).or_else(|| DIG_BUILD.captures(rest)) {
    return Ok(Action::TransformAndBuild {
      hex: parse_position(&caps["pos"])?,
      target: None,
      build: true,
      skip: false,
    });
  }
  if let Some(caps) = TRANSFORM.captures(rest) {
    let target = match caps.name("terrain") {
      Some(t) => Some(parse_terrain(t.as_str())?),
      None => None,
    };
    return Ok(Action::TransformAndBuild {
      hex: parse_position(&caps["pos"])?,
      target,
      build: false,
      skip: false,
    });
  }
  if let Some(caps) = UPGRADE.captures(rest) {
    let kind = BuildingKind::from_code(&caps["kind"].to_ascii_uppercase())
      .ok_or_else(|| ParseError::BadTile(caps["kind"].to_string()))?;
    return Ok(Action::UpgradeBuilding {
      hex: parse_position(&caps["pos"])?,
      target: kind,
    });
  }
  if let Some(caps) = LEECH.captures(rest) {
    let amount: u8 = caps["amount"].parse().map_err(|_| ParseError::NoMatchingOffer)?;
    let from = Faction::from_name(&caps["from"])
      .ok_or_else(|| ParseError::BadFaction(caps["from"].to_string()))?;
    let accept = caps["verb"].to_ascii_lowercase() == "leech";
    let offer = state
      .pending_leech
      .iter()
      .position(|o| {
        o.amount == amount
          && state.players[o.from].faction == from
          && author
            .map(|a| state.players[o.to].faction == a)
            .unwrap_or(true)
      })
      .ok_or(ParseError::NoMatchingOffer)?;
    return Ok(if accept {
      Action::AcceptLeech { offer }
    } else {
      Action::DeclineLeech { offer }
    });
  }
  if let Some(caps) = PASS.captures(rest) {
    let bonus = match caps.name("bon") {
      Some(code) => Some(
        BonusCard::from_code(code.as_str())
          .ok_or_else(|| ParseError::BadTile(code.as_str().to_string()))?,
      ),
      None => None,
    };
    return Ok(Action::Pass { bonus });
  }
  if let Some(caps) = POWER.captures(rest) {
    let slot: u8 = caps["slot"].parse().expect("single digit");
    return Ok(Action::PowerAction(
      PowerActionSlot::from_index(slot).expect("range checked by regex"),
    ));
  }
  if let Some(caps) = BONUS_SPADE.captures(rest) {
    return Ok(Action::Special(SpecialAction::BonusSpade {
      hex: parse_position(&caps["pos"])?,
      target: None,
      build: caps.name("build").is_some(),
    }));
  }
  if let Some(caps) = SPECIAL_POS.captures(rest) {
    let hex = parse_position(&caps["pos"])?;
    let build = caps.name("build").is_some();
    let action = match caps["code"].to_ascii_uppercase().as_str() {
      "ACTW" => SpecialAction::WitchesRide { hex },
      "ACTS" => SpecialAction::SwarmlingsUpgrade { hex },
      "ACTG" => SpecialAction::GiantsSpades { hex, build },
      "ACTN" => SpecialAction::Sandstorm { hex, build },
      other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    return Ok(Action::Special(action));
  }
  if let Some(caps) = SPECIAL_CULT.captures(rest) {
    let track = parse_track(&caps["track"])?;
    let action = match caps["code"].to_ascii_uppercase().as_str() {
      "ACTA" => SpecialAction::AurenCult { track },
      "BON2" => SpecialAction::BonusCult { track },
      "FAV6" => SpecialAction::FavorCult { track },
      other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    return Ok(Action::Special(action));
  }
  if CHAOS_DOUBLE.is_match(rest) {
    return Err(ParseError::NeedsMoreInfo("chaos double turn children"));
  }
  if let Some(caps) = MERMAID_TOWN.captures(rest) {
    return Ok(Action::Special(SpecialAction::MermaidTown {
      river: parse_position(&caps["pos"])?,
    }));
  }
  if let Some(caps) = SEND.captures(rest) {
    let track = parse_track(&caps["track"])?;
    let steps = match caps.name("steps") {
      Some(s) => s.as_str().parse().expect("range checked by regex"),
      // Without an explicit count, take the biggest open slot.
      None => {
        if state.cult_board.has_open_slot(track, 3) {
          3
        } else if state.cult_board.has_open_slot(track, 2) {
          2
        } else {
          1
        }
      }
    };
    return Ok(Action::SendPriest { track, steps });
  }
  if let Some(caps) = ADVANCE.captures(rest) {
    return Ok(if &caps["what"].to_ascii_lowercase() == "ship" {
      Action::AdvanceShipping
    } else {
      Action::AdvanceDigging
    });
  }
  if let Some(caps) = BRIDGE.captures(rest) {
    let from = parse_position(&caps["a"])?;
    let to = parse_position(&caps["b"])?;
    return Ok(if state.pending_bridge.is_some() {
      Action::PlaceBridge { from, to }
    } else {
      Action::EngineersBridge { from, to }
    });
  }
  if let Some(caps) = CONVERT.captures(rest) {
    return parse_convert(state, &caps["n"], &caps["from"], &caps["to"]);
  }
  if let Some(caps) = BURN.captures(rest) {
    let n: u8 = caps["n"].parse().map_err(|_| {
      ParseError::UnknownCommand(rest.to_string())
    })?;
    return Ok(Action::Burn { count: n });
  }
  if let Some(caps) = FAVOR.captures(rest) {
    let tile = FavorTile::from_code(&caps["fav"])
      .ok_or_else(|| ParseError::BadTile(caps["fav"].to_string()))?;
    return Ok(Action::ChooseFavor { tile });
  }
  if let Some(caps) = TOWN.captures(rest) {
    let tile = TownTile::from_code(&caps["tw"])
      .ok_or_else(|| ParseError::BadTile(caps["tw"].to_string()))?;
    return Ok(Action::ChooseTown { tile });
  }
  if let Some(caps) = CULT_CHOICE.captures(rest) {
    return Ok(Action::ChooseCultistsCult {
      track: parse_track(&caps["track"])?,
    });
  }
  if let Some(caps) = ORDINATION.captures(rest) {
    return Ok(Action::DarklingsOrdination {
      workers: caps["n"].parse().expect("range checked by regex"),
    });
  }
  if FORFEIT.is_match(rest) {
    return Ok(Action::ForfeitSpades);
  }
  // Setup lines reuse `build` and `pass BONn`; a bare tile code covers the
  // draft. Anything else is unknown.
  warn!("unparseable log line: {}", rest);
  Err(ParseError::UnknownCommand(rest.to_string()))
}

fn parse_convert(
  state: &GameState,
  n: &str,
  from: &str,
  to: &str,
) -> Result<Action, ParseError> {
  let n32: u32 = n.parse().map_err(|_| ParseError::UnknownCommand(n.to_string()))?;
  let n8 = n32.min(255) as u8;
  let from = from.to_ascii_uppercase();
  let to = to.to_ascii_uppercase();
  let conversion = match (from.as_str(), to.as_str()) {
    ("PW", "C") => Conversion::PowerToCoins(n8),
    ("PW", "W") => Conversion::PowerToWorkers(n8),
    ("PW", "P") => Conversion::PowerToPriests(n8),
    ("P", "W") => Conversion::PriestsToWorkers(n32),
    ("W", "C") => Conversion::WorkersToCoins(n32),
    ("VP", "C") => Conversion::VpToCoins(n32),
    ("C", "VP") => Conversion::CoinsToVp(n32),
    // `convert N w to p` is the Darklings' ordination when one is owed.
    ("W", "P") if state.pending_ordination.is_some() => {
      return Ok(Action::DarklingsOrdination { workers: n8 })
    }
    _ => return Err(ParseError::UnknownCommand(format!("convert {} to {}", from, to))),
  };
  Ok(Action::Convert(conversion))
}

/// Parses a whole log, feeding each action through `submit`. Returns the
/// number of applied actions. Author mismatches against the engine's
/// expected actor are reported by the engine itself (wrong player, wrong
/// phase); lines without an author run as the player whose turn it is.
pub fn replay(game: &mut crate::game::Game, log: &str) -> Result<usize, ReplayError> {
  let mut applied = 0;
  for (number, line) in log.lines().enumerate() {
    let parsed = parse_line(game.state(), line).map_err(|e| ReplayError {
      line: number + 1,
      kind: ReplayErrorKind::Parse(e),
    })?;
    let parsed = match parsed {
      Some(p) => p,
      None => continue,
    };
    game.submit_action(&parsed.action).map_err(|e| ReplayError {
      line: number + 1,
      kind: ReplayErrorKind::Action(e),
    })?;
    applied += 1;
  }
  Ok(applied)
}

/// A replay failure, pinned to its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayError {
  pub line: usize,
  pub kind: ReplayErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayErrorKind {
  Parse(ParseError),
  Action(ActionError),
}

impl std::fmt::Display for ReplayError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.kind {
      ReplayErrorKind::Parse(e) => write!(f, "line {}: {}", self.line, e),
      ReplayErrorKind::Action(e) => write!(f, "line {}: {}", self.line, e),
    }
  }
}

impl std::error::Error for ReplayError {}
