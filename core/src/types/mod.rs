//! Core type definitions for phantom QA
//!
//! This module provides the fundamental types used throughout the library:
//! - [`Image`]: Rescaled single-frame pixel array
//! - [`PixelSpacing`]: Physical pixel size in millimeters
//! - [`ImageType`]: Decomposed DICOM ImageType field
//! - [`Orientation`], [`ScanKind`], [`CoilElement`]: Classification vocabulary
//! - Workflow configuration ([`WeeklyConfig`], [`NemaBodyConfig`], [`TorsoConfig`])

mod config;
mod enums;
mod image;
mod image_type;
mod pixel_spacing;

pub use config::{
    CentralRoiSpec, DetectorConfig, NemaBodyConfig, PeakRoiSpec, PhantomRoiSpec, QaConfig,
    TorsoConfig, WeeklyConfig, COMBINED_SNR_SCALE, ELEMENT_SNR_SCALE, NOISE_AREA_MM2,
    SIGNAL_AREA_MM2, UNSCALED_SNR,
};
pub use enums::{CoilElement, Orientation, ScanKind};
pub use image::Image;
pub use image_type::ImageType;
pub use pixel_spacing::PixelSpacing;
