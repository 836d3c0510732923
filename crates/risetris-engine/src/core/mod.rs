pub use self::{board::*, piece::*, power_up_kind::*, shape::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod power_up_kind;
pub(crate) mod shape;
