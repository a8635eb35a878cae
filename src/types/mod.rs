pub mod as_path;
pub mod errors;
pub(crate) mod path_id;
pub mod stats;

pub use as_path::{AsPath, AsPathSegment, Hop, HopPath, SegmentType};
pub use path_id::{PathId, PATH_ID_SIZE};
