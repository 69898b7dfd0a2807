/// Number of actions the server expects for every round.
pub const ACTIONS_PER_TURN: usize = 3;

/// Island value weight of a flooded tile.
pub const FLOODED_WEIGHT: u32 = 2;
/// Island value weight of a redried tile.
pub const REDRIED_WEIGHT: u32 = 3;
/// Island value weight of a dry tile.
pub const DRY_WEIGHT: u32 = 4;

/// Score penalty per tile of walking distance when ranking flooded clusters.
pub const CLUSTER_DISTANCE_PENALTY: i64 = 4;

/// Largest board edge a `Location` can address.
pub const MAX_BOARD_EDGE: usize = u16::MAX as usize;

/// Line terminating a board snapshot.
pub const GAMEBOARD_END: &str = "GAMEBOARDEND";
/// Line opening a board snapshot; some servers omit it.
pub const GAMEBOARD_START: &str = "GAMEBOARDSTART";
