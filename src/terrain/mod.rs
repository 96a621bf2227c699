mod brush;
mod grid;
mod picking;

pub use brush::*;
pub use grid::*;
pub use picking::*;
