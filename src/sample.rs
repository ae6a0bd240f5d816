use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Change, ScanRecord};

type Patient = (&'static str, &'static str, i32, &'static str);

const ROBERT: Patient = ("P-5692", "Robert Johnson", 62, "Male");
const MARIA: Patient = ("P-4821", "Maria Garcia", 57, "Female");
const DAVID: Patient = ("P-3219", "David Lee", 45, "Male");
const EMILY: Patient = ("P-7103", "Emily Wilson", 69, "Female");
const SAMANTHA: Patient = ("P-6287", "Samantha Brown", 54, "Female");

fn taken_at(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> anyhow::Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .context("invalid scan timestamp")
}

/// Demo scans for five patients, two visits each.
pub fn sample_scans() -> anyhow::Result<Vec<ScanRecord>> {
    let rows = vec![
        ("scan-123", ROBERT, (2025, 5, 21, 14, 23), 0, Change::Stable, Some(98.2)),
        ("scan-100", ROBERT, (2025, 2, 15, 10, 30), 0, Change::Stable, None),
        ("scan-124", MARIA, (2025, 5, 21, 11, 5), 3, Change::Worsened, Some(93.7)),
        ("scan-101", MARIA, (2025, 2, 20, 13, 45), 2, Change::Stable, None),
        ("scan-125", DAVID, (2025, 5, 20, 16, 48), 1, Change::Improved, Some(95.1)),
        ("scan-102", DAVID, (2025, 1, 10, 9, 15), 2, Change::Stable, None),
        ("scan-126", EMILY, (2025, 5, 20, 10, 12), 2, Change::Stable, Some(89.5)),
        ("scan-103", EMILY, (2025, 3, 5, 14, 20), 2, Change::New, None),
        ("scan-127", SAMANTHA, (2025, 5, 19, 15, 30), 4, Change::Worsened, Some(96.3)),
        ("scan-104", SAMANTHA, (2025, 4, 12, 11, 40), 3, Change::Worsened, None),
    ];

    let mut scans = Vec::with_capacity(rows.len());
    for (id, patient, (year, month, day, hour, minute), grade, change, confidence) in rows {
        let (patient_id, patient_name, age, gender) = patient;
        scans.push(ScanRecord {
            id: id.to_string(),
            patient_id: patient_id.to_string(),
            patient_name: patient_name.to_string(),
            timestamp: taken_at(year, month, day, hour, minute)?,
            age,
            gender: gender.to_string(),
            grade,
            change,
            confidence,
        });
    }

    Ok(scans)
}
