//! The line protocol spoken with the game server.
//!
//! Coordinates on the wire are 1-based `<col>,<row>` pairs; everything past
//! this module uses 0-based `Location`s.

use crate::constants::*;
use crate::errors::ProtocolError;
use crate::location::Location;
use crate::strategy::Action;
use crate::terrain::TileState;
use std::io::Write;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// One row of a board snapshot.
    BoardRow(String),
    BoardStart,
    BoardEnd,
    Round { number: u32, position: Location },
    Flood(Location),
    /// Server echo of a dry action; the bot already applied it.
    Dry(Location),
    End,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ProtocolError> {
    let line = line.trim();
    let first = match line.chars().next() {
        Some(c) => c,
        None => return Ok(None),
    };
    if TileState::from_char(first).is_some() {
        return Ok(Some(Command::BoardRow(line.to_owned())));
    }

    let mut parts = line.split_whitespace();
    let keyword = parts.next().unwrap_or_default();
    let command = match keyword {
        GAMEBOARD_START => Command::BoardStart,
        GAMEBOARD_END => Command::BoardEnd,
        "ROUND" => {
            let number = parts
                .next()
                .ok_or(ProtocolError::MissingArgument { command: "ROUND" })?;
            let number = number
                .parse::<u32>()
                .map_err(|_| ProtocolError::MalformedNumber(number.to_owned()))?;
            let position = parse_coordinate(
                parts
                    .next()
                    .ok_or(ProtocolError::MissingArgument { command: "ROUND" })?,
            )?;
            Command::Round { number, position }
        }
        "FLOOD" => Command::Flood(parse_coordinate(
            parts
                .next()
                .ok_or(ProtocolError::MissingArgument { command: "FLOOD" })?,
        )?),
        "DRY" => Command::Dry(parse_coordinate(
            parts
                .next()
                .ok_or(ProtocolError::MissingArgument { command: "DRY" })?,
        )?),
        "END" => Command::End,
        _ => return Err(ProtocolError::UnknownCommand(line.to_owned())),
    };
    Ok(Some(command))
}

/// Parse a 1-based `<col>,<row>` pair into a 0-based location.
pub fn parse_coordinate(text: &str) -> Result<Location, ProtocolError> {
    let malformed = || ProtocolError::MalformedCoordinate(text.to_owned());

    let (col, row) = text.split_once(',').ok_or_else(malformed)?;
    let col: u32 = col.trim().parse().map_err(|_| malformed())?;
    let row: u32 = row.trim().parse().map_err(|_| malformed())?;
    if col == 0 || row == 0 || col > MAX_BOARD_EDGE as u32 || row > MAX_BOARD_EDGE as u32 {
        return Err(malformed());
    }
    Ok(Location::from_coords(col - 1, row - 1))
}

/// Write one line per action.
pub fn write_actions<W: Write>(writer: &mut W, actions: &[Action]) -> std::io::Result<()> {
    for action in actions {
        writeln!(writer, "{}", action)?;
    }
    Ok(())
}
