use crate::diagnostics::QaWarning;
use crate::workflow::{NemaBodyReport, TorsoReport, WeeklyReport};
use std::fmt;

/// Text report formatter for a workflow result and its warnings
pub struct TextReport<'a, T> {
    report: &'a T,
    warnings: &'a [QaWarning],
}

impl<'a, T> TextReport<'a, T> {
    /// Creates a new text report
    pub fn new(report: &'a T, warnings: &'a [QaWarning]) -> Self {
        Self { report, warnings }
    }

    fn write_warnings(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.warnings.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "Warnings")?;
        writeln!(f, "--------")?;
        for warning in self.warnings {
            writeln!(f, "- {}", warning)?;
        }
        Ok(())
    }
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl<'a> fmt::Display for TextReport<'a, WeeklyReport> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "Weekly Phantom QA")?;
        writeln!(f, "=================")?;
        writeln!(f)?;
        writeln!(f, "Selected Slice: {}", report.selected.display())?;
        writeln!(f, "Slice Location: {}", opt(report.slice_location))?;

        match &report.record {
            Some(record) => {
                writeln!(f, "Filename:       {}", record.filename)?;
                writeln!(f, "Mean:           {}", record.mean)?;
                writeln!(f, "Min:            {}", record.min)?;
                writeln!(f, "Max:            {}", record.max)?;
                writeln!(f, "Sum:            {}", record.sum)?;
                writeln!(f, "StDev:          {}", record.stdev)?;
                writeln!(f, "SNR:            {}", record.snr)?;
                writeln!(f, "PIU:            {}", record.piu)?;
            }
            None => writeln!(f, "No metrics: ROI selected no pixels")?,
        }

        self.write_warnings(f)
    }
}

impl<'a> fmt::Display for TextReport<'a, NemaBodyReport> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NEMA Body QA")?;
        writeln!(f, "============")?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<20} {:<8} {:<6} {:>12} {:>12} {:>12} {:>16} {:>12} {:<24} {:>5} {:>8} {:>8}",
            "ScanID", "Orient.", "Type", "Mean", "Min", "Max", "Sum", "StDev", "Filename", "Slice",
            "SNR", "PIU"
        )?;
        for r in &self.report.records {
            writeln!(
                f,
                "{:<20} {:<8} {:<6} {:>12} {:>12} {:>12} {:>16} {:>12} {:<24} {:>5} {:>8} {:>8}",
                r.scan_id,
                r.orientation.nema_label(),
                r.kind,
                r.mean,
                r.min,
                r.max,
                r.sum,
                r.stdev,
                r.filename,
                r.slice,
                opt(r.snr),
                opt(r.piu)
            )?;
        }
        if self.report.records.is_empty() {
            writeln!(f, "No results. Please check the input directory structure.")?;
        }

        self.write_warnings(f)
    }
}

impl<'a> fmt::Display for TextReport<'a, TorsoReport> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Torso Coil QA")?;
        writeln!(f, "=============")?;
        writeln!(f)?;

        writeln!(f, "Combined Views")?;
        writeln!(f, "--------------")?;
        writeln!(
            f,
            "{:<6} {:>10} {:>10} {:>10} {:>10} {:>8} {:>10}",
            "Region", "Sig Max", "Sig Min", "Sig Mean", "Noise SD", "SNR", "Uniformity"
        )?;
        for r in &self.report.combined {
            writeln!(
                f,
                "{:<6} {:>10.1} {:>10.1} {:>10.1} {:>10.2} {:>8} {:>10}",
                r.region, r.signal_max, r.signal_min, r.signal_mean, r.noise_sd, r.snr, r.uniformity
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Individual Elements")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "{:<7} {:>12} {:>10} {:>8}", "Element", "Signal Mean", "Noise SD", "SNR")?;
        for r in &self.report.elements {
            writeln!(
                f,
                "{:<7} {:>12.1} {:>10.2} {:>8}",
                r.element.label(),
                r.signal_mean,
                r.noise_sd,
                r.snr
            )?;
        }

        self.write_warnings(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CoilElement, Orientation, ScanKind};
    use crate::workflow::{
        CombinedRecord, ElementRecord, NemaLayout, NemaRecord, WeeklyRecord,
    };
    use std::path::PathBuf;

    #[test]
    fn test_weekly_report_format() {
        let report = WeeklyReport {
            selected: PathBuf::from("/data/IM_0004.dcm"),
            slice_location: Some(0.5),
            instance_number: Some(4),
            record: Some(WeeklyRecord {
                filename: "IM_0004.dcm".to_string(),
                mean: 1012.34,
                min: 950.0,
                max: 1060.5,
                sum: 3_400_000.0,
                stdev: 12.5,
                snr: 80.99,
                piu: 94.52,
            }),
        };
        let warnings = vec![QaWarning::DegenerateRoi {
            file: PathBuf::from("/data/IM_0004.dcm"),
        }];

        let output = format!("{}", TextReport::new(&report, &warnings));

        assert!(output.contains("Weekly Phantom QA"));
        assert!(output.contains("Filename:       IM_0004.dcm"));
        assert!(output.contains("SNR:            80.99"));
        assert!(output.contains("PIU:            94.52"));
        assert!(output.contains("Warnings"));
        assert!(output.contains("forced to 1 px"));
    }

    #[test]
    fn test_nema_report_marks_unpaired_rows() {
        let report = NemaBodyReport {
            layout: NemaLayout::Files,
            records: vec![NemaRecord {
                scan_id: "cor_noise.dcm".to_string(),
                orientation: Orientation::Coronal,
                kind: ScanKind::Noise,
                mean: 0.1,
                min: -12.0,
                max: 11.0,
                sum: 3400.0,
                stdev: 4.2,
                filename: "cor_noise.dcm".to_string(),
                slice: 1,
                snr: None,
                piu: None,
            }],
        };

        let output = format!("{}", TextReport::new(&report, &[]));

        assert!(output.contains("Coronal"));
        assert!(output.contains("noise"));
        assert!(!output.contains("Warnings"));
        assert!(output.trim_end().ends_with('-'));
    }

    #[test]
    fn test_torso_report_sections() {
        let report = TorsoReport {
            combined: vec![CombinedRecord {
                region: "SAG".to_string(),
                signal_max: 1100.0,
                signal_min: 900.0,
                signal_mean: 1000.0,
                noise_sd: 5.0,
                snr: 140.0,
                uniformity: 90.0,
            }],
            elements: vec![ElementRecord {
                element: CoilElement::Vps3,
                signal_mean: 400.0,
                noise_sd: 4.0,
                snr: 66.0,
            }],
        };

        let output = format!("{}", TextReport::new(&report, &[]));

        assert!(output.contains("Combined Views"));
        assert!(output.contains("SAG"));
        assert!(output.contains("Individual Elements"));
        assert!(output.contains("VPS3"));
        assert!(output.contains("66"));
    }
}
