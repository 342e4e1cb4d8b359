pub mod deck;
pub mod error;
pub mod id;
pub mod layout;
pub mod mapper;
pub mod metrics;
pub mod model;

pub use deck::Deck;
pub use error::{DeckError, LayoutError};
pub use id::{LayerId, SlideId};
pub use layout::{LayerGeometry, LineGeometry, ResolvedBounds, Viewport, layout_slide};
pub use mapper::{Envelope, bounds_for};
pub use metrics::{FontSpec, MonospaceMetrics, TextMetrics};
pub use model::*;
