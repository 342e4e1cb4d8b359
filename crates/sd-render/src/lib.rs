pub mod assets;
pub mod error;
pub mod filters;
pub mod hit;
pub mod raster;
pub mod text;

pub use assets::{AssetSource, FsAssets};
pub use error::{AssetError, RenderError};
pub use hit::{HandleSide, Hit, hit_test};
pub use raster::{RasterRenderer, RenderOptions};
pub use text::FontMetrics;
