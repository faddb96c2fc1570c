pub(crate) mod axes_draw;
pub mod grid;
pub mod ratio;
