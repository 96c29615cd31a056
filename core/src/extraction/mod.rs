pub mod coil;
pub mod geometry;
pub mod image_type;
pub mod tags;

pub use coil::{extract_coil_labels, split_coil_labels};
pub use geometry::{extract_pixel_spacing, extract_rescale};
pub use image_type::extract_image_type;
pub use tags::*;
