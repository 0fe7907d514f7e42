//! Colours shared by both renderers

use lotview_core::{CellType, Color, EntityClass};

pub const BACKGROUND: u32 = 0xf5f5f5;
pub const CELL_OUTLINE: u32 = 0xe0e0e0;
pub const WALL: u32 = 0x2b2b2b;
pub const ROAD: u32 = 0xffffff;
pub const PARKING: u32 = 0xfff4cc;
pub const ENTRY: u32 = 0xd9f7d9;
pub const EXIT: u32 = 0xffd6d6;

/// Vehicles present when the run started
pub const INITIAL_CAR: u32 = 0xff8c00;
/// Vehicles spawned at an entry during the run
pub const ARRIVING_CAR: u32 = 0x1e90ff;

pub fn cell_color(cell_type: CellType) -> Color {
    Color::from_hex(match cell_type {
        CellType::Wall => WALL,
        CellType::Road => ROAD,
        CellType::Parking => PARKING,
        CellType::Entry => ENTRY,
        CellType::Exit => EXIT,
    })
}

pub fn entity_color(class: EntityClass) -> Color {
    Color::from_hex(match class {
        EntityClass::Initial => INITIAL_CAR,
        EntityClass::Arriving => ARRIVING_CAR,
    })
}
