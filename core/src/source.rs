//! Loading scans from disk
//!
//! The workflows never touch the DICOM decoder directly: they ask a
//! [`ScanSource`] for headers and images, which keeps them testable with
//! synthetic data.

use crate::api::{ScanMetadata, ScanMetadataExtractor};
use crate::error::{QaError, Result};
use crate::types::Image;
use dicom_dictionary_std::tags::PIXEL_DATA;
use dicom_object::{FileDicomObject, InMemDicomObject, OpenFileOptions};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use log::debug;
use ndarray::{Axis, Ix4};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One decoded scan: where it came from, its header, and its first frame
#[derive(Debug, Clone)]
pub struct Scan {
    pub path: PathBuf,
    pub metadata: ScanMetadata,
    pub image: Image,
}

/// Provider of scan headers and pixels
pub trait ScanSource {
    /// Reads the header only
    fn read_header(&self, path: &Path) -> Result<ScanMetadata>;

    /// Reads the header and decodes the first frame, rescaled
    fn read_scan(&self, path: &Path) -> Result<Scan>;
}

impl<T: ScanSource + ?Sized> ScanSource for &T {
    fn read_header(&self, path: &Path) -> Result<ScanMetadata> {
        (**self).read_header(path)
    }

    fn read_scan(&self, path: &Path) -> Result<Scan> {
        (**self).read_scan(path)
    }
}

/// [`ScanSource`] backed by DICOM files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomFileSource;

impl DicomFileSource {
    pub fn new() -> Self {
        Self
    }
}

impl ScanSource for DicomFileSource {
    fn read_header(&self, path: &Path) -> Result<ScanMetadata> {
        let dcm = OpenFileOptions::new().read_until(PIXEL_DATA).open_file(path)?;
        Ok(ScanMetadataExtractor::extract_for_path(&dcm, path))
    }

    fn read_scan(&self, path: &Path) -> Result<Scan> {
        let dcm = dicom_object::open_file(path)?;
        let metadata = ScanMetadataExtractor::extract_for_path(&dcm, path);
        let image = decode_first_frame(&dcm)?;
        check_dimensions(&metadata, &image)?;
        let image = match metadata.rescale {
            Some((slope, intercept)) => image.rescaled(slope, intercept),
            None => image,
        };

        debug!(
            "Loaded {} ({}x{})",
            path.display(),
            image.cols(),
            image.rows()
        );

        Ok(Scan {
            path: path.to_path_buf(),
            metadata,
            image,
        })
    }
}

/// Decodes frame 0, sample 0 as raw stored values
///
/// The modality LUT is not applied here; rescaling is driven by the
/// extracted header so that both tags must be present.
fn decode_first_frame(dcm: &FileDicomObject<InMemDicomObject>) -> Result<Image> {
    let decoded = dcm.decode_pixel_data()?;
    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    let array = decoded
        .to_ndarray_with_options::<f32>(&options)?
        .into_dimensionality::<Ix4>()
        .map_err(|e| QaError::Decode(format!("unexpected pixel array shape: {}", e)))?;

    let (frames, _, _, samples) = array.dim();
    if frames == 0 || samples == 0 {
        return Err(QaError::Decode("pixel data holds no frame".to_string()));
    }

    let frame = array.index_axis(Axis(0), 0);
    let plane = frame.index_axis(Axis(2), 0);
    Ok(Image::new(plane.mapv(f64::from)))
}

/// Rejects frames whose shape disagrees with the Rows/Columns header
fn check_dimensions(metadata: &ScanMetadata, image: &Image) -> Result<()> {
    let rows_ok = metadata.rows.map_or(true, |r| usize::from(r) == image.rows());
    let cols_ok = metadata.columns.map_or(true, |c| usize::from(c) == image.cols());
    if rows_ok && cols_ok {
        Ok(())
    } else {
        Err(QaError::Decode(format!(
            "decoded frame is {}x{} but header declares {:?}x{:?}",
            image.rows(),
            image.cols(),
            metadata.rows,
            metadata.columns
        )))
    }
}

/// [`ScanSource`] over scans already held in memory
///
/// Paths not inserted read as [`QaError::Decode`].
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    scans: BTreeMap<PathBuf, (ScanMetadata, Image)>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scan; `metadata.file_name` is filled from the path when empty
    pub fn insert(&mut self, path: impl Into<PathBuf>, mut metadata: ScanMetadata, image: Image) {
        let path = path.into();
        if metadata.file_name.is_empty() {
            metadata.file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        self.scans.insert(path, (metadata, image));
    }

    pub fn with_scan(mut self, path: impl Into<PathBuf>, metadata: ScanMetadata, image: Image) -> Self {
        self.insert(path, metadata, image);
        self
    }

    /// Inserted paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.scans.keys().cloned().collect()
    }

    fn get(&self, path: &Path) -> Result<&(ScanMetadata, Image)> {
        self.scans
            .get(path)
            .ok_or_else(|| QaError::Decode(format!("no scan loaded for {}", path.display())))
    }
}

impl ScanSource for InMemorySource {
    fn read_header(&self, path: &Path) -> Result<ScanMetadata> {
        Ok(self.get(path)?.0.clone())
    }

    fn read_scan(&self, path: &Path) -> Result<Scan> {
        let (metadata, image) = self.get(path)?;
        let image = match metadata.rescale {
            Some((slope, intercept)) => image.clone().rescaled(slope, intercept),
            None => image.clone(),
        };
        Ok(Scan {
            path: path.to_path_buf(),
            metadata: metadata.clone(),
            image,
        })
    }
}
