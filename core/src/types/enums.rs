use std::fmt;

/// Anatomical orientation of a phantom acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Orientation {
    Sagittal,
    Transverse,
    Coronal,
}

impl Orientation {
    /// Processing order of the combined torso views
    pub const TORSO_ORDER: [Orientation; 3] = [
        Orientation::Sagittal,
        Orientation::Transverse,
        Orientation::Coronal,
    ];

    /// Region label used in torso reports ("SAG", "TRA", "COR")
    pub fn region_label(&self) -> &'static str {
        match self {
            Orientation::Sagittal => "SAG",
            Orientation::Transverse => "TRA",
            Orientation::Coronal => "COR",
        }
    }

    /// Orientation label used in NEMA body reports
    pub fn nema_label(&self) -> &'static str {
        match self {
            Orientation::Sagittal => "Sagi",
            Orientation::Transverse => "Trans",
            Orientation::Coronal => "Coronal",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Orientation::Sagittal => "sagittal",
            Orientation::Transverse => "transverse",
            Orientation::Coronal => "coronal",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Whether a scan carries phantom signal or background noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum ScanKind {
    #[cfg_attr(feature = "json", serde(rename = "image"))]
    Signal,
    Noise,
}

impl ScanKind {
    /// Noise if either the description or the file name mentions "noise"
    pub fn from_hints(series_description: &str, file_name: &str) -> Self {
        if series_description.to_lowercase().contains("noise")
            || file_name.to_lowercase().contains("noise")
        {
            ScanKind::Noise
        } else {
            ScanKind::Signal
        }
    }

    /// Label used in NEMA body reports ("image" / "noise")
    pub fn simple_name(&self) -> &'static str {
        match self {
            ScanKind::Signal => "image",
            ScanKind::Noise => "noise",
        }
    }
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Individual receive element of the torso coil
///
/// Declaration order is the canonical report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "UPPERCASE"))]
pub enum CoilElement {
    Vas1,
    Vas2,
    Vas3,
    Vps1,
    Vps2,
    Vps3,
    Vap1,
    Vap2,
    Vap3,
    Vpp1,
    Vpp2,
    Vpp3,
}

impl CoilElement {
    /// All elements in canonical order
    pub const ALL: [CoilElement; 12] = [
        CoilElement::Vas1,
        CoilElement::Vas2,
        CoilElement::Vas3,
        CoilElement::Vps1,
        CoilElement::Vps2,
        CoilElement::Vps3,
        CoilElement::Vap1,
        CoilElement::Vap2,
        CoilElement::Vap3,
        CoilElement::Vpp1,
        CoilElement::Vpp2,
        CoilElement::Vpp3,
    ];

    /// Scanner label of the element
    pub fn label(&self) -> &'static str {
        match self {
            CoilElement::Vas1 => "VAS1",
            CoilElement::Vas2 => "VAS2",
            CoilElement::Vas3 => "VAS3",
            CoilElement::Vps1 => "VPS1",
            CoilElement::Vps2 => "VPS2",
            CoilElement::Vps3 => "VPS3",
            CoilElement::Vap1 => "VAP1",
            CoilElement::Vap2 => "VAP2",
            CoilElement::Vap3 => "VAP3",
            CoilElement::Vpp1 => "VPP1",
            CoilElement::Vpp2 => "VPP2",
            CoilElement::Vpp3 => "VPP3",
        }
    }

    /// Exact match against the known label set
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.label() == label)
    }
}

impl fmt::Display for CoilElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_labels_round_trip() {
        for element in CoilElement::ALL {
            assert_eq!(CoilElement::from_label(element.label()), Some(element));
        }
        assert_eq!(CoilElement::from_label("vas1"), None);
        assert_eq!(CoilElement::from_label("BO1"), None);
    }

    #[test]
    fn test_canonical_order_matches_ord() {
        let mut shuffled = vec![CoilElement::Vpp3, CoilElement::Vas1, CoilElement::Vap2];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![CoilElement::Vas1, CoilElement::Vap2, CoilElement::Vpp3]
        );
    }

    #[test]
    fn test_scan_kind_from_hints() {
        assert_eq!(ScanKind::from_hints("t1 SAG NOISE", "a.dcm"), ScanKind::Noise);
        assert_eq!(ScanKind::from_hints("t1 sag", "/x/Noise_01.dcm"), ScanKind::Noise);
        assert_eq!(ScanKind::from_hints("t1 sag", "image.dcm"), ScanKind::Signal);
    }

    #[test]
    fn test_orientation_labels() {
        assert_eq!(Orientation::Transverse.region_label(), "TRA");
        assert_eq!(Orientation::Sagittal.nema_label(), "Sagi");
        assert_eq!(Orientation::Coronal.to_string(), "coronal");
    }
}
