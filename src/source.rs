use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;

use crate::error::RecordError;
use crate::models::ScanRecord;

pub fn load_csv(path: &Path) -> anyhow::Result<Vec<ScanRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut scans = Vec::new();

    for (line, result) in reader.deserialize::<ScanRecord>().enumerate() {
        let scan = result.with_context(|| {
            format!("invalid scan row {} in {}", line + 1, path.display())
        })?;
        scans.push(scan);
    }

    validate(&scans)?;
    log::info!("Loaded {} scans from {}", scans.len(), path.display());
    Ok(scans)
}

pub fn load_json(path: &Path) -> anyhow::Result<Vec<ScanRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let scans: Vec<ScanRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid scan list in {}", path.display()))?;

    validate(&scans)?;
    log::info!("Loaded {} scans from {}", scans.len(), path.display());
    Ok(scans)
}

/// Rejects empty or repeated scan ids. Missing patient ids and names that
/// change within one patient are only reported.
pub fn validate(scans: &[ScanRecord]) -> Result<(), RecordError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names: HashMap<&str, &str> = HashMap::new();

    for (position, scan) in scans.iter().enumerate() {
        if scan.id.is_empty() {
            return Err(RecordError::EmptyScanId(position));
        }
        if !seen.insert(scan.id.as_str()) {
            return Err(RecordError::DuplicateScanId(scan.id.clone()));
        }

        if scan.patient_id.is_empty() {
            log::warn!("Scan {} has no patient id", scan.id);
        }

        let name = names
            .entry(scan.patient_id.as_str())
            .or_insert(scan.patient_name.as_str());
        if *name != scan.patient_name {
            log::warn!(
                "Patient {} appears as both {:?} and {:?}",
                scan.patient_id,
                name,
                scan.patient_name
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Change;
    use crate::sample::sample_scans;
    use std::io::Write;

    const CSV_HEADER: &str =
        "id,patient_id,patient_name,timestamp,age,gender,grade,change,confidence\n";

    #[test]
    fn loads_scans_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{CSV_HEADER}\
             scan-1,P-1,Ana Ruiz,2025-05-21T14:23:00,61,Female,2,worsened,91.5\n\
             scan-2,P-1,Ana Ruiz,2025-01-02T08:00:00,61,Female,7,regressed,\n"
        )
        .unwrap();

        let scans = load_csv(file.path()).unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].change, Change::Worsened);
        assert_eq!(scans[0].confidence, Some(91.5));
        assert_eq!(scans[1].grade, 7);
        assert_eq!(scans[1].change, Change::Unknown);
        assert_eq!(scans[1].confidence, None);
    }

    #[test]
    fn csv_with_duplicate_ids_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{CSV_HEADER}\
             scan-1,P-1,Ana Ruiz,2025-05-21T14:23:00,61,Female,2,stable,\n\
             scan-1,P-2,Ben Ode,2025-05-22T14:23:00,50,Male,0,new,\n"
        )
        .unwrap();

        let err = load_csv(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::DuplicateScanId("scan-1".to_string()))
        );
    }

    #[test]
    fn loads_scans_from_json() {
        let scans = sample_scans().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&scans).unwrap().as_bytes())
            .unwrap();

        let loaded = load_json(file.path()).unwrap();
        assert_eq!(loaded, scans);
    }

    #[test]
    fn empty_scan_id_is_rejected() {
        let mut scans = sample_scans().unwrap();
        scans[3].id.clear();
        assert_eq!(validate(&scans), Err(RecordError::EmptyScanId(3)));
    }

    #[test]
    fn renamed_patient_still_validates() {
        let mut scans = sample_scans().unwrap();
        scans[0].patient_name = "Zed".to_string();
        scans[1].patient_name = "Abe".to_string();
        assert_eq!(scans[0].patient_id, scans[1].patient_id);
        assert!(validate(&scans).is_ok());
    }

    #[test]
    fn missing_patient_id_is_allowed() {
        let mut scans = sample_scans().unwrap();
        scans[0].patient_id.clear();
        assert!(validate(&scans).is_ok());
    }
}
