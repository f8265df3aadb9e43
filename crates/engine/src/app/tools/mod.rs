mod overlay;
pub(crate) mod text;

pub(crate) use overlay::{draw_overlay, OverlayData};
