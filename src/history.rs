//! Patient history aggregation.
//!
//! Turns a flat list of scans into one row per patient (their most recent
//! scan), ordered by patient name, plus the full scan list of the expanded
//! patient. Every function here is pure; view state is passed in by the caller.

use std::cmp::Ordering;
use std::collections::HashMap;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{
    ExpandedPatient, HistoryPage, HistoryView, PatientRow, ScanRecord, SortDirection,
};

pub fn aggregate<'a>(scans: &'a [ScanRecord], view: &HistoryView) -> HistoryPage<'a> {
    let filtered = filter_scans(scans, &view.search);
    let groups = group_by_patient(&filtered);

    let mut rows: Vec<PatientRow<'a>> = groups
        .values()
        .filter_map(|group| {
            latest_scan(group).map(|latest| PatientRow {
                latest,
                scan_count: group.len(),
            })
        })
        .collect();
    sort_rows(&mut rows, view.direction);

    let expanded = view.expanded.as_ref().and_then(|patient_id| {
        groups.get(patient_id.as_str()).map(|group| ExpandedPatient {
            patient_id: patient_id.clone(),
            scans: scans_newest_first(group),
        })
    });

    log::debug!(
        "aggregated {} scans into {} patient rows (search {:?})",
        filtered.len(),
        rows.len(),
        view.search
    );

    HistoryPage { rows, expanded }
}

/// Keeps scans whose patient name or id contains `term`, ignoring case.
/// A blank term keeps everything.
pub fn filter_scans<'a>(scans: &'a [ScanRecord], term: &str) -> Vec<&'a ScanRecord> {
    if term.trim().is_empty() {
        return scans.iter().collect();
    }

    let needle = term.to_lowercase();
    scans
        .iter()
        .filter(|scan| {
            scan.patient_name.to_lowercase().contains(&needle)
                || scan.patient_id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Groups scans by patient id. Each group keeps the relative input order.
pub fn group_by_patient<'a>(scans: &[&'a ScanRecord]) -> HashMap<&'a str, Vec<&'a ScanRecord>> {
    let mut groups: HashMap<&'a str, Vec<&'a ScanRecord>> = HashMap::new();

    for scan in scans {
        groups
            .entry(scan.patient_id.as_str())
            .or_default()
            .push(*scan);
    }

    groups
}

/// Most recent scan of a group; the earliest one in input order wins a tie.
pub fn latest_scan<'a>(group: &[&'a ScanRecord]) -> Option<&'a ScanRecord> {
    let mut latest: Option<&'a ScanRecord> = None;

    for scan in group {
        match latest {
            Some(current) if current.timestamp >= scan.timestamp => {}
            _ => latest = Some(*scan),
        }
    }

    latest
}

pub fn scans_newest_first<'a>(group: &[&'a ScanRecord]) -> Vec<&'a ScanRecord> {
    let mut scans = group.to_vec();
    scans.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    scans
}

pub fn sort_rows(rows: &mut [PatientRow<'_>], direction: SortDirection) {
    rows.sort_by(|a, b| {
        compare_names(&a.latest.patient_name, &b.latest.patient_name)
            .then_with(|| a.latest.patient_id.cmp(&b.latest.patient_id))
    });

    if direction == SortDirection::Desc {
        rows.reverse();
    }
}

/// Collation used for patient names. Base letters are compared first with
/// accents and case folded away, then accents, then the exact text, so
/// "Émile" sorts between "Adams" and "Zoe" and the order is still total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented_letters(a).cmp(accented_letters(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

/// Expands `patient_id`, or collapses it when it is already expanded.
pub fn toggle_expansion(view: &mut HistoryView, patient_id: &str) {
    if view.expanded.as_deref() == Some(patient_id) {
        view.expanded = None;
    } else {
        view.expanded = Some(patient_id.to_string());
    }
}
