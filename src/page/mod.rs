//! Page and text-region model for comicast.
//!
//! A comic is an ordered list of [`Page`]s. Each page starts unanalyzed and,
//! once the analysis collaborator has answered, carries its detected
//! [`TextRegion`]s in reading order.
//!
//! # Design Principles
//!
//! 1. **One coordinate convention**: region boxes are always `box_2d`
//!    tuples `(ymin, xmin, ymax, xmax)` on a 0–1000 scale, independent of
//!    the image's pixel size.
//!
//! 2. **Stable identity**: pages are identified by filename and regions by
//!    page plus detection index, so ids survive re-sequencing.
//!
//! # Example
//!
//! ```
//! use comicast::page::{ImageRef, Page, RegionBox, RegionId, TextRegion};
//!
//! let page = Page::new(
//!     "001.png",
//!     ImageRef::File { path: "comic/001.png".into() },
//!     800,
//!     1200,
//! );
//! let region = TextRegion::new(
//!     RegionId::for_page(&page.id, 1),
//!     "Hello!",
//!     RegionBox::from_box_2d([100.0, 800.0, 150.0, 900.0]),
//! );
//! assert_eq!(region.bbox.center_x(), 850.0);
//! ```

mod bbox;
mod ids;
pub mod io_json;
mod model;

pub use bbox::{RegionBox, NORMALIZED_SCALE};
pub use ids::{PageId, RegionId};
pub use io_json::{AnalysisResponse, RawRegion};
pub use model::{ImageRef, Page, ReadingMode, TextRegion};
