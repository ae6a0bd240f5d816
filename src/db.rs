use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Change, ScanRecord};
use crate::sample::sample_scans;
use crate::source;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for scan in sample_scans()? {
        if insert_scan(pool, &scan).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let scans = source::load_csv(csv_path)?;
    let mut inserted = 0usize;

    for scan in &scans {
        if insert_scan(pool, scan).await? {
            inserted += 1;
        } else {
            log::debug!("Scan {} already stored, skipping", scan.id);
        }
    }

    Ok(inserted)
}

async fn insert_scan(pool: &PgPool, scan: &ScanRecord) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO retina_history.scans
        (id, scan_key, patient_id, patient_name, taken_at, age, gender, grade, change, confidence)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (scan_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&scan.id)
    .bind(&scan.patient_id)
    .bind(&scan.patient_name)
    .bind(scan.timestamp)
    .bind(scan.age)
    .bind(&scan.gender)
    .bind(scan.grade)
    .bind(scan.change.as_str())
    .bind(scan.confidence)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_scans(
    pool: &PgPool,
    since: Option<NaiveDate>,
) -> anyhow::Result<Vec<ScanRecord>> {
    let mut query = String::from(
        "SELECT scan_key, patient_id, patient_name, taken_at, age, gender, grade, change, \
         confidence FROM retina_history.scans",
    );

    if since.is_some() {
        query.push_str(" WHERE taken_at >= $1");
    }
    query.push_str(" ORDER BY taken_at DESC, scan_key");

    let mut rows = sqlx::query(&query);

    if let Some(date) = since {
        rows = rows.bind(date.and_time(NaiveTime::MIN));
    }

    let records = rows.fetch_all(pool).await?;
    let mut scans = Vec::with_capacity(records.len());

    for row in records {
        let change: String = row.get("change");
        scans.push(ScanRecord {
            id: row.get("scan_key"),
            patient_id: row.get("patient_id"),
            patient_name: row.get("patient_name"),
            timestamp: row.get("taken_at"),
            age: row.get("age"),
            gender: row.get("gender"),
            grade: row.get("grade"),
            change: Change::parse(&change),
            confidence: row.get("confidence"),
        });
    }

    log::info!("Fetched {} scans from Postgres", scans.len());
    Ok(scans)
}
