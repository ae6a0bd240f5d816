use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::labels::{ConfidenceBand, Grade};
use crate::models::{
    DashboardMetrics, GradeBucket, HistoryPage, HistoryView, ScanRecord, SortDirection,
};

pub fn display_date(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

pub fn build_history_report(view: &HistoryView, page: &HistoryPage<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Patient History");
    let direction = match view.direction {
        SortDirection::Asc => "A to Z",
        SortDirection::Desc => "Z to A",
    };
    if view.search.trim().is_empty() {
        let _ = writeln!(output, "All patients, sorted {direction}");
    } else {
        let _ = writeln!(
            output,
            "Patients matching \"{}\", sorted {direction}",
            view.search
        );
    }
    let _ = writeln!(output);

    if page.rows.is_empty() {
        let _ = writeln!(output, "No patients match your search criteria.");
        return output;
    }

    let _ = writeln!(output, "| Patient | ID | Age/Gender | Latest Scan | Grade | Trend | Scans |");
    let _ = writeln!(output, "|---|---|---|---|---|---|---|");
    for row in page.rows.iter() {
        let scan = row.latest;
        let trend = scan.change.indicator();
        let _ = writeln!(
            output,
            "| {} | {} | {} / {} | {} | {} | {} {} | {} |",
            scan.patient_name,
            scan.patient_id,
            scan.age,
            scan.gender,
            display_date(&scan.timestamp),
            Grade::from_value(scan.grade).label(),
            trend.icon,
            trend.label,
            row.scan_count
        );
    }

    if let Some(expanded) = &page.expanded {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Scan History for {}", expanded.patient_id);
        for scan in expanded.scans.iter() {
            let _ = writeln!(
                output,
                "- {} • Grade {} ({}) [{}]",
                display_date(&scan.timestamp),
                scan.grade,
                Grade::from_value(scan.grade).label(),
                scan.id
            );
        }
    }

    output
}

pub fn build_dashboard_report(
    metrics: &DashboardMetrics,
    buckets: &[GradeBucket],
    recent: &[&ScanRecord],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Retinopathy Dashboard");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Metrics");
    let _ = writeln!(
        output,
        "- Total scans: {} across {} patients",
        metrics.total_scans, metrics.patient_count
    );
    let _ = writeln!(
        output,
        "- Healthy (Grade 0): {} ({:.1}% of total)",
        metrics.healthy_count, metrics.healthy_pct
    );
    let _ = writeln!(output, "- Severe cases (Grade 3-4): {}", metrics.severe_count);
    if metrics.unknown_grade_count > 0 {
        let _ = writeln!(output, "- Unclassified: {}", metrics.unknown_grade_count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Distribution");
    for bucket in buckets.iter() {
        let _ = writeln!(
            output,
            "- Grade {} ({}): {} scans ({}%)",
            bucket.grade,
            Grade::from_value(bucket.grade).label(),
            bucket.count,
            bucket.percent
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Scans");
    if recent.is_empty() {
        let _ = writeln!(output, "No scans recorded yet.");
    } else {
        for scan in recent.iter() {
            let confidence = scan
                .confidence
                .map(|value| format!(", {value:.1}% confidence"))
                .unwrap_or_default();
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {}{}",
                scan.patient_name,
                scan.patient_id,
                display_date(&scan.timestamp),
                Grade::from_value(scan.grade).label(),
                confidence
            );
        }
    }

    output
}

pub fn build_scan_report(scan: &ScanRecord) -> String {
    let mut output = String::new();
    let grade = Grade::from_value(scan.grade);

    let _ = writeln!(output, "# Scan {}", scan.id);
    let _ = writeln!(
        output,
        "Patient: {} ({}), {} / {}",
        scan.patient_name, scan.patient_id, scan.age, scan.gender
    );
    let _ = writeln!(
        output,
        "Taken: {}",
        scan.timestamp.format("%B %-d, %Y %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade {}: {}", scan.grade, grade.clinical_label());
    let _ = writeln!(output, "{}", grade.description());

    match scan.confidence {
        Some(value) => {
            let band = ConfidenceBand::from_percent(value);
            let _ = writeln!(output, "Confidence: {value:.1}% ({})", band.label());
        }
        None => {
            let _ = writeln!(output, "Confidence: not recorded");
        }
    }

    let trend = scan.change.indicator();
    let _ = writeln!(output, "Trend: {} {}", trend.icon, trend.label);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard;
    use crate::history;
    use crate::sample::sample_scans;

    #[test]
    fn history_report_lists_rows_and_expanded_scans() {
        let scans = sample_scans().unwrap();
        let view = HistoryView {
            search: "garcia".to_string(),
            direction: SortDirection::Asc,
            expanded: Some("P-4821".to_string()),
        };
        let page = history::aggregate(&scans, &view);
        let report = build_history_report(&view, &page);

        assert!(report.contains(
            "| Maria Garcia | P-4821 | 57 / Female | May 21, 2025 | Severe | ↓ Worsened | 2 |"
        ));
        assert!(report.contains("## Scan History for P-4821"));
        let newest = report.find("scan-124").unwrap();
        let oldest = report.find("scan-101").unwrap();
        assert!(newest < oldest);
        assert!(!report.contains("Robert Johnson"));
    }

    #[test]
    fn history_report_for_no_matches() {
        let scans = sample_scans().unwrap();
        let view = HistoryView {
            search: "zzz".to_string(),
            ..HistoryView::default()
        };
        let page = history::aggregate(&scans, &view);
        let report = build_history_report(&view, &page);
        assert!(report.contains("No patients match your search criteria."));
    }

    #[test]
    fn dashboard_report_includes_metrics_and_distribution() {
        let scans = sample_scans().unwrap();
        let metrics = dashboard::metrics(&scans);
        let buckets = dashboard::distribution(&scans);
        let recent = dashboard::recent_scans(&scans, 2);
        let report = build_dashboard_report(&metrics, &buckets, &recent);

        assert!(report.contains("- Total scans: 10 across 5 patients"));
        assert!(report.contains("- Healthy (Grade 0): 2 (20.0% of total)"));
        assert!(report.contains("- Grade 2 (Moderate): 4 scans (40%)"));
        assert!(report
            .contains("- Robert Johnson (P-5692) on May 21, 2025: No DR, 98.2% confidence"));
        assert!(!report.contains("Unclassified"));
    }

    #[test]
    fn scan_report_describes_grade_and_confidence() {
        let scans = sample_scans().unwrap();
        let scan = dashboard::find_scan(&scans, "scan-126").unwrap();
        let report = build_scan_report(scan);

        assert!(report.contains("## Grade 2: Moderate NPDR"));
        assert!(report.contains("Microaneurysms and some other abnormalities."));
        assert!(report.contains("Confidence: 89.5% (medium)"));
        assert!(report.contains("Taken: May 20, 2025 10:12"));
    }

    #[test]
    fn scan_report_for_unknown_grade() {
        let mut scans = sample_scans().unwrap();
        scans[1].grade = 12;
        let report = build_scan_report(&scans[1]);
        assert!(report.contains("## Grade 12: Unknown"));
        assert!(report.contains("Classification not available"));
        assert!(report.contains("Confidence: not recorded"));
    }
}
