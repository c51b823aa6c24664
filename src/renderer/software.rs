//! ---------------------------------------------------------------------------
//! Portal-sector software (CPU) renderer
//!
//! * Fills an internal frame-buffer in **0xAARRGGBB** format.
//! * Visibility comes from walking sectors through their portals, near to
//!   far, while an [`OcclusionTracker`] records which columns are finished.
//!   No depth buffer is needed: the first paint of a column is the closest.
//! ---------------------------------------------------------------------------

mod lighting;
mod occlusion;
mod planes;
mod portal;
mod projection;
mod renderer;
mod walls;

pub use lighting::{diminish, mip_level, shade};
pub use occlusion::{OcclusionTracker, ScreenInterval};
pub use portal::{OUTLINE_COLOUR, PortalWindow, WorkItem};
pub use projection::{NEAR_EPSILON, ProjectedWall, View, clamp_row, pixel_edge, pixel_span};
pub use renderer::Software;
