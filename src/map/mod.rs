mod geometry;
mod projection;
mod renderer;
mod spatial;
mod view;

pub use projection::{Camera, Viewport};
pub use renderer::{render_layer, Layer, RenderKey, Rendered};
pub use view::{
    Focus, Hit, MapView, Request, FLY_DURATION, NATIONAL_CENTER, NATIONAL_ZOOM, STATE_ZOOM,
};
