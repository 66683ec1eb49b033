//! Bonus cards. Each player holds exactly one between rounds; leftover cards
//! accrue a coin at the end of setup and of each non-final round.

use crate::faction::Income;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BonusCard {
  /// BON1: one free spade as a special action, 2 coins income.
  Spade,
  /// BON2: one cult step as a special action, 4 coins income.
  CultStep,
  /// BON3: 6 coins income.
  Coins6,
  /// BON4: +1 shipping while held, 3 power income.
  Shipping,
  /// BON5: 1 worker and 3 power income.
  WorkerPower,
  /// BON6: 2 workers income, 4 VP per stronghold/sanctuary on pass.
  BigBuildingVp,
  /// BON7: 1 worker income, 2 VP per trading house on pass.
  TradingVp,
  /// BON8: 1 priest income.
  Priest,
  /// BON9: 2 coins income, 1 VP per dwelling on pass.
  DwellingVp,
}

pub const BONUS_CARDS: [BonusCard; 9] = [
  BonusCard::Spade,
  BonusCard::CultStep,
  BonusCard::Coins6,
  BonusCard::Shipping,
  BonusCard::WorkerPower,
  BonusCard::BigBuildingVp,
  BonusCard::TradingVp,
  BonusCard::Priest,
  BonusCard::DwellingVp,
];

impl BonusCard {
  pub fn code(self) -> &'static str {
    match self {
      BonusCard::Spade => "BON1",
      BonusCard::CultStep => "BON2",
      BonusCard::Coins6 => "BON3",
      BonusCard::Shipping => "BON4",
      BonusCard::WorkerPower => "BON5",
      BonusCard::BigBuildingVp => "BON6",
      BonusCard::TradingVp => "BON7",
      BonusCard::Priest => "BON8",
      BonusCard::DwellingVp => "BON9",
    }
  }

  pub fn from_code(code: &str) -> Option<BonusCard> {
    let upper = code.to_ascii_uppercase();
    BONUS_CARDS.iter().cloned().find(|c| c.code() == upper)
  }

  pub fn income(self) -> Income {
    match self {
      BonusCard::Spade => Income {
        coins: 2,
        ..Income::default()
      },
      BonusCard::CultStep => Income {
        coins: 4,
        ..Income::default()
      },
      BonusCard::Coins6 => Income {
        coins: 6,
        ..Income::default()
      },
      BonusCard::Shipping => Income {
        power: 3,
        ..Income::default()
      },
      BonusCard::WorkerPower => Income {
        workers: 1,
        power: 3,
        ..Income::default()
      },
      BonusCard::BigBuildingVp => Income {
        workers: 2,
        ..Income::default()
      },
      BonusCard::TradingVp => Income {
        workers: 1,
        ..Income::default()
      },
      BonusCard::Priest => Income {
        priests: 1,
        ..Income::default()
      },
      BonusCard::DwellingVp => Income {
        coins: 2,
        ..Income::default()
      },
    }
  }

  /// Passive shipping bump while the card is held.
  pub fn shipping_bonus(self) -> u8 {
    if self == BonusCard::Shipping {
      1
    } else {
      0
    }
  }

  /// VP granted when passing with this card.
  pub fn pass_vp(
    self,
    dwellings: u8,
    trading_houses: u8,
    strongholds: u8,
    sanctuaries: u8,
  ) -> i32 {
    match self {
      BonusCard::BigBuildingVp => 4 * (strongholds + sanctuaries) as i32,
      BonusCard::TradingVp => 2 * trading_houses as i32,
      BonusCard::DwellingVp => dwellings as i32,
      _ => 0,
    }
  }

  pub fn has_spade_action(self) -> bool {
    self == BonusCard::Spade
  }

  pub fn has_cult_action(self) -> bool {
    self == BonusCard::CultStep
  }
}
