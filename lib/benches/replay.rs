#[macro_use]
extern crate criterion;

use criterion::Criterion;
use terramystica::action::Action;
use terramystica::faction::Faction;
use terramystica::state::SetupTask;
use terramystica::Game;

/// Plays the full setup choreography by always taking the first free home
/// hex and the first card in the row.
fn run_setup(game: &mut Game) {
  while let Some(task) = game.state().setup_queue.front().cloned() {
    match task {
      SetupTask::Dwelling(p) => {
        let home = game.state().players[p].faction.home_terrain();
        let hex = game
          .state()
          .map
          .cells()
          .find(|(_, c)| c.terrain == home && c.building.is_none())
          .map(|(h, _)| *h)
          .expect("free home hex");
        game
          .submit_action(&Action::TransformAndBuild {
            hex,
            target: None,
            build: true,
            skip: false,
          })
          .expect("setup dwelling");
      }
      SetupTask::Bonus(_) => {
        let card = *game.state().bonus_supply.keys().next().expect("bonus card");
        game
          .submit_action(&Action::ChooseBonus { card })
          .expect("bonus draft");
      }
    }
  }
}

fn criterion_function(c: &mut Criterion) {
  c.bench_function("setup_and_snapshot", |b| {
    b.iter(|| {
      let mut game =
        Game::quick(vec![("w", Faction::Witches), ("n", Faction::Nomads)]).expect("game");
      run_setup(&mut game);
      game.snapshot()
    })
  });

  c.bench_function("legal_actions_round_one", |b| {
    let mut game =
      Game::quick(vec![("w", Faction::Witches), ("n", Faction::Nomads)]).expect("game");
    run_setup(&mut game);
    b.iter(|| game.legal_actions().len())
  });
}

criterion_group!(benches, criterion_function);
criterion_main!(benches);
