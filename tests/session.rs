use std::io::Cursor;

use tideline::session::{Session, SessionEvent};
use tideline::strategy::{Action, StrategyEngine};
use tideline::{Direction, Location, TileState};

const ENCLOSED_ISLAND: [&str; 5] = [".oooo.", "o####o", "o####o", "o####o", ".oooo."];

fn start(board: &[&str]) -> Session {
    let mut session = Session::new(StrategyEngine::default());
    for line in board.iter().copied().chain(["GAMEBOARDEND"]) {
        assert_eq!(session.dispatch(line).unwrap(), SessionEvent::Continue);
    }
    session
}

fn flooded(session: &Session) -> usize {
    session
        .grid()
        .map(|grid| grid.count(TileState::Flooded))
        .unwrap_or_default()
}

/// Plays one round and checks every action: a DRY only hits a tile that was
/// flooded, a GO lands on a walkable tile, and the bot never stays put while
/// flooded tiles are left. Every tile of the boards used here is reachable.
fn play_round(session: &mut Session, round: u32, position: Location) -> Location {
    let before = session.grid().cloned().unwrap();
    let line = format!("ROUND {} {},{}", round, position.x() + 1, position.y() + 1);
    let plan = match session.dispatch(&line).unwrap() {
        SessionEvent::Actions(plan) => plan,
        other => panic!("round {} produced {:?}", round, other),
    };
    assert_eq!(plan.actions.len(), 3);

    let mut current = position;
    let mut remaining = before.count(TileState::Flooded);
    for action in plan.actions {
        match action {
            Action::Go(Direction::Current) => {
                assert_eq!(remaining, 0, "round {} idled next to flood", round);
            }
            Action::Go(direction) => {
                current = current.step(direction).unwrap();
                assert!(
                    matches!(
                        before.get(current),
                        Ok(TileState::Dry | TileState::Redried | TileState::Flooded)
                    ),
                    "round {} walked onto {}",
                    round,
                    current
                );
            }
            Action::Dry(direction) => {
                let target = if direction == Direction::Current {
                    current
                } else {
                    current.step(direction).unwrap()
                };
                assert_eq!(
                    before.get(target),
                    Ok(TileState::Flooded),
                    "round {} dried {} twice",
                    round,
                    target
                );
                remaining -= 1;
            }
        }
    }
    assert_eq!(current, plan.final_position);
    current
}

#[test]
fn enclosed_island_dries_its_buffer() {
    let mut session = start(&ENCLOSED_ISLAND);
    let initial = flooded(&session);
    assert_eq!(initial, 14);

    let mut position = Location::from_coords(1, 1);
    for round in 1..=5 {
        position = play_round(&mut session, round, position);
    }
    assert!(flooded(&session) + 5 <= initial);
    assert_eq!(session.grid().unwrap().count(TileState::Drowned), 4);

    for round in 6..=25 {
        if flooded(&session) == 0 {
            break;
        }
        position = play_round(&mut session, round, position);
    }
    assert_eq!(flooded(&session), 0);
    assert_eq!(session.grid().unwrap().count(TileState::Redried), 14);
}

#[test]
fn run_answers_rounds_until_end() {
    let input = "#o\n##\nGAMEBOARDEND\nROUND 1 1,1\nBOGUS\n\nEND\nROUND 2 1,1\n";
    let mut output = Vec::new();
    let mut session = Session::new(StrategyEngine::default());
    session.run(Cursor::new(input), &mut output).unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "DRY EAST\nGO CURRENT\nGO CURRENT\n"
    );
    assert_eq!(session.round(), 1);
}

#[test]
fn run_survives_floods_and_bad_rounds() {
    let input = "\
###
###
GAMEBOARDEND
ROUND 1 9,9
FLOOD 2,1
FLOOD 2,1
ROUND 2 1,1
";
    let mut output = Vec::new();
    let mut session = Session::new(StrategyEngine::default());
    session.run(Cursor::new(input), &mut output).unwrap();

    let output = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|line| !line.starts_with("DRY")));
    assert_eq!(
        session.grid().unwrap().get(Location::from_coords(1, 0)),
        Ok(TileState::Drowned)
    );
}
