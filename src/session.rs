use crate::errors::*;
use crate::protocol::*;
use crate::strategy::*;
use crate::terrain::TerrainGrid;
use log::*;
use std::error::Error;
use std::io::{BufRead, Write};

/// What the caller should do after a line was dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Continue,
    Actions(TurnPlan),
    End,
}

/// One game against the server: the persistent board plus the strategy.
pub struct Session {
    engine: StrategyEngine,
    grid: Option<TerrainGrid>,
    pending_board: Vec<String>,
    round: u32,
}

impl Session {
    pub fn new(engine: StrategyEngine) -> Self {
        Session {
            engine,
            grid: None,
            pending_board: Vec::new(),
            round: 0,
        }
    }

    pub fn grid(&self) -> Option<&TerrainGrid> {
        self.grid.as_ref()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn dispatch(&mut self, line: &str) -> Result<SessionEvent, SessionError> {
        let command = match parse_line(line)? {
            Some(command) => command,
            None => return Ok(SessionEvent::Continue),
        };

        match command {
            Command::BoardRow(row) => self.pending_board.push(row),
            Command::BoardStart => self.pending_board.clear(),
            Command::BoardEnd => self.finish_board()?,
            Command::Round { number, position } => {
                self.round = number;
                let grid = self
                    .grid
                    .as_mut()
                    .ok_or(ProtocolError::NoBoard { command: "ROUND" })?;
                debug!("Round {} at {}", number, position);
                let plan = self.engine.play(grid, position)?;
                return Ok(SessionEvent::Actions(plan));
            }
            Command::Flood(location) => {
                let grid = self
                    .grid
                    .as_mut()
                    .ok_or(ProtocolError::NoBoard { command: "FLOOD" })?;
                grid.flood(location)?;
            }
            Command::Dry(_) => {}
            Command::End => return Ok(SessionEvent::End),
        }
        Ok(SessionEvent::Continue)
    }

    fn finish_board(&mut self) -> Result<(), GridError> {
        let lines = std::mem::take(&mut self.pending_board);
        let board = TerrainGrid::from_lines(&lines)?;
        if let Some(current) = &self.grid {
            current.ensure_same_dimensions(&board)?;
        }
        debug!("Board of {}x{} tiles", board.columns(), board.rows());
        trace!("Board:\n{}", board);
        self.grid = Some(board);
        Ok(())
    }

    /// Drive a whole game. Lines that cannot be handled are logged and
    /// skipped; only I/O failures end the session early.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        writer: &mut W,
    ) -> Result<(), SessionError> {
        for line in reader.lines() {
            let line = line?;
            match self.dispatch(&line) {
                Ok(SessionEvent::Continue) => {}
                Ok(SessionEvent::Actions(plan)) => {
                    write_actions(writer, &plan.actions)?;
                    writer.flush()?;
                }
                Ok(SessionEvent::End) => {
                    info!("Game ended after round {}", self.round);
                    return Ok(());
                }
                Err(SessionError::Io(err)) => return Err(SessionError::Io(err)),
                Err(err) => match err.source() {
                    Some(source) => warn!("{} on {:?}: {}", err, line, source),
                    None => warn!("{} on {:?}", err, line),
                },
            }
        }
        info!("Input closed after round {}", self.round);
        Ok(())
    }
}
