use std::collections::HashSet;

use crate::labels::Grade;
use crate::models::{DashboardMetrics, GradeBucket, ScanRecord};

pub fn metrics(scans: &[ScanRecord]) -> DashboardMetrics {
    let mut healthy_count = 0usize;
    let mut severe_count = 0usize;
    let mut unknown_grade_count = 0usize;
    let mut patients: HashSet<&str> = HashSet::new();

    for scan in scans {
        patients.insert(scan.patient_id.as_str());
        let grade = Grade::from_value(scan.grade);
        match grade {
            Grade::NoDr => healthy_count += 1,
            Grade::Unknown => unknown_grade_count += 1,
            _ if grade.is_severe() => severe_count += 1,
            _ => {}
        }
    }

    DashboardMetrics {
        total_scans: scans.len(),
        patient_count: patients.len(),
        healthy_count,
        healthy_pct: percentage(healthy_count, scans.len()),
        severe_count,
        unknown_grade_count,
    }
}

/// Scan counts for grades 0 through 4. Unknown grades are left out and the
/// percentages are relative to the classified scans only.
pub fn distribution(scans: &[ScanRecord]) -> Vec<GradeBucket> {
    let mut counts = [0usize; 5];

    for scan in scans {
        if let Ok(index) = usize::try_from(scan.grade) {
            if let Some(count) = counts.get_mut(index) {
                *count += 1;
            }
        }
    }

    let classified: usize = counts.iter().sum();
    counts
        .iter()
        .zip(0i32..)
        .map(|(count, grade)| GradeBucket {
            grade,
            count: *count,
            percent: percentage(*count, classified).round() as u32,
        })
        .collect()
}

pub fn recent_scans(scans: &[ScanRecord], limit: usize) -> Vec<&ScanRecord> {
    let mut recent: Vec<&ScanRecord> = scans.iter().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(limit);
    recent
}

pub fn find_scan<'a>(scans: &'a [ScanRecord], id: &str) -> Option<&'a ScanRecord> {
    scans.iter().find(|scan| scan.id == id)
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_scans;

    #[test]
    fn metrics_count_healthy_and_severe() {
        let scans = sample_scans().unwrap();
        let summary = metrics(&scans);
        assert_eq!(summary.total_scans, 10);
        assert_eq!(summary.patient_count, 5);
        assert_eq!(summary.healthy_count, 2);
        assert!((summary.healthy_pct - 20.0).abs() < 0.001);
        assert_eq!(summary.severe_count, 3);
        assert_eq!(summary.unknown_grade_count, 0);
    }

    #[test]
    fn metrics_on_empty_input_are_zero() {
        let summary = metrics(&[]);
        assert_eq!(summary.total_scans, 0);
        assert_eq!(summary.healthy_pct, 0.0);
    }

    #[test]
    fn distribution_has_five_buckets_and_skips_unknown() {
        let mut scans = sample_scans().unwrap();
        scans[0].grade = 9;
        let buckets = distribution(&scans);

        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 4, 2, 1]);
        assert_eq!(buckets[2].percent, 44);
        assert_eq!(metrics(&scans).unknown_grade_count, 1);
    }

    #[test]
    fn recent_scans_are_newest_first_and_limited() {
        let scans = sample_scans().unwrap();
        let recent = recent_scans(&scans, 3);
        let ids: Vec<&str> = recent.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["scan-123", "scan-124", "scan-125"]);
    }

    #[test]
    fn find_scan_by_id() {
        let scans = sample_scans().unwrap();
        assert_eq!(find_scan(&scans, "scan-127").map(|s| s.grade), Some(4));
        assert!(find_scan(&scans, "scan-999").is_none());
    }
}
