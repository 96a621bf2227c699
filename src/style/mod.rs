mod color;
mod computed_style;
mod length;
mod style_table;

pub use color::*;
pub use computed_style::*;
pub use length::*;
pub use style_table::*;
