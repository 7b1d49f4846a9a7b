pub use self::{coord::*, field::*, shape::*};

pub(crate) mod coord;
pub(crate) mod field;
pub(crate) mod shape;
