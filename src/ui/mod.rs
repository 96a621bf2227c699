mod builder;
mod element;
mod layout;
mod markup;
mod traverse;

pub use builder::*;
pub use element::*;
pub use layout::*;
pub use markup::*;
pub use traverse::*;
