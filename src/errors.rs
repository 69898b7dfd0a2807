use crate::location::{Direction, Location};

/// Board and graph invariant violations. Any of these aborts the current turn.
#[derive(Debug, PartialEq, Eq)]
pub enum GridError {
    EmptyBoard,
    RaggedBoard {
        row: usize,
        expected: usize,
        found: usize,
    },
    UnknownTile {
        x: usize,
        y: usize,
        tile: char,
    },
    BoardTooLarge {
        columns: usize,
        rows: usize,
    },
    OutOfBounds {
        location: Location,
        columns: usize,
        rows: usize,
    },
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    AsymmetricLink {
        location: Location,
        direction: Direction,
    },
}

impl std::error::Error for GridError {}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::EmptyBoard => write!(f, "The board snapshot contained no rows"),
            GridError::RaggedBoard { row, expected, found } => write!(
                f,
                "Board row {} has {} tiles, expected {}",
                row, found, expected
            ),
            GridError::UnknownTile { x, y, tile } => {
                write!(f, "Unknown tile {:?} at ({}, {})", tile, x, y)
            }
            GridError::BoardTooLarge { columns, rows } => {
                write!(f, "Board of {}x{} tiles cannot be addressed", columns, rows)
            }
            GridError::OutOfBounds { location, columns, rows } => write!(
                f,
                "Location {} lies outside the {}x{} board",
                location, columns, rows
            ),
            GridError::DimensionMismatch { expected, found } => write!(
                f,
                "Board dimensions changed from {}x{} to {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            GridError::AsymmetricLink { location, direction } => write!(
                f,
                "Link {} of node {} has no matching back link",
                direction, location
            ),
        }
    }
}

/// A line from the game server that could not be understood.
#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownCommand(String),
    MissingArgument { command: &'static str },
    MalformedNumber(String),
    MalformedCoordinate(String),
    NoBoard { command: &'static str },
}

impl std::error::Error for ProtocolError {}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::UnknownCommand(line) => write!(f, "Unknown command line {:?}", line),
            ProtocolError::MissingArgument { command } => {
                write!(f, "Command {} is missing an argument", command)
            }
            ProtocolError::MalformedNumber(text) => write!(f, "Malformed number {:?}", text),
            ProtocolError::MalformedCoordinate(text) => {
                write!(f, "Malformed coordinate {:?}, expected <col>,<row>", text)
            }
            ProtocolError::NoBoard { command } => {
                write!(f, "Received {} before any board", command)
            }
        }
    }
}

/// The error type for driving a whole game session.
#[derive(Debug)]
pub enum SessionError {
    Protocol(ProtocolError),
    Grid(GridError),
    Io(std::io::Error),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Protocol(err) => Some(err),
            SessionError::Grid(err) => Some(err),
            SessionError::Io(err) => Some(err),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Protocol(_) => write!(f, "Malformed input from the game server"),
            SessionError::Grid(_) => write!(f, "Board invariant violated, turn aborted"),
            SessionError::Io(_) => write!(f, "I/O failure on the protocol stream"),
        }
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        SessionError::Protocol(err)
    }
}

impl From<GridError> for SessionError {
    fn from(err: GridError) -> Self {
        SessionError::Grid(err)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Io(err)
    }
}
