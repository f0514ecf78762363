pub mod face;
pub mod raster;
pub mod table;

pub use face::{DEFAULT_THREAD_COLOR, Face, Rgba};
pub use raster::{DEFAULT_TILE_PIXELS, PlateRasterizer, TileRasterizer};
pub use table::{ContentEntry, ContentError, ContentTable, SLOTS_PER_FACE};
