use crate::location::Location;
use crate::terrain::{TerrainGrid, TileState};
use quickcheck::{Arbitrary, Gen};

const MAX_EDGE: u8 = 8;

/// A random board of 1 to 8 columns and rows.
#[derive(Clone, Debug)]
pub struct TestBoard {
    pub grid: TerrainGrid,
}

impl TestBoard {
    fn location(&self, g: &mut Gen) -> Location {
        let x = u32::arbitrary(g) % self.grid.columns() as u32;
        let y = u32::arbitrary(g) % self.grid.rows() as u32;
        Location::from_coords(x, y)
    }
}

impl Arbitrary for TestBoard {
    fn arbitrary(g: &mut Gen) -> Self {
        let columns = 1 + u8::arbitrary(g) % MAX_EDGE;
        let rows = 1 + u8::arbitrary(g) % MAX_EDGE;

        let lines: Vec<String> = (0..rows)
            .map(|_| {
                (0..columns)
                    .map(|_| TileState::arbitrary(g).as_char())
                    .collect()
            })
            .collect();

        TestBoard {
            grid: TerrainGrid::from_lines(&lines).expect("generated board is rectangular"),
        }
    }
}

impl Arbitrary for TileState {
    fn arbitrary(g: &mut Gen) -> Self {
        // Dry land shows up twice as often so boards have islands to work with.
        *g.choose(&[
            TileState::Dry,
            TileState::Dry,
            TileState::Flooded,
            TileState::Drowned,
            TileState::Redried,
        ])
        .unwrap()
    }
}

/// A board plus a sequence of node additions (`true`) and removals
/// (`false`), all inside the board.
#[derive(Clone, Debug)]
pub struct BoardMutations {
    pub board: TestBoard,
    pub edits: Vec<(Location, bool)>,
}

impl Arbitrary for BoardMutations {
    fn arbitrary(g: &mut Gen) -> Self {
        let board = TestBoard::arbitrary(g);
        let count = usize::arbitrary(g) % 16;
        let edits = (0..count)
            .map(|_| (board.location(g), bool::arbitrary(g)))
            .collect();
        BoardMutations { board, edits }
    }
}

/// A board and a bot position inside it.
#[derive(Clone, Debug)]
pub struct BoardWithPosition {
    pub board: TestBoard,
    pub position: Location,
}

impl Arbitrary for BoardWithPosition {
    fn arbitrary(g: &mut Gen) -> Self {
        let board = TestBoard::arbitrary(g);
        let position = board.location(g);
        BoardWithPosition { board, position }
    }
}
