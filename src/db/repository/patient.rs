use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{CheckoutEntry, ConditionFlags, Measurements, Patient};

const PATIENT_COLUMNS: &str = "eid, vdate, rcount, gender,
    dialysisrenalendstage, asthma, irondef, pneum, substancedependence,
    psychologicaldisordermajor, depress, psychother, fibrosisandother,
    malnutrition, hemo,
    hemoglobin, leukocytes, sodium, glucose, bloodureanitro, creatinine,
    bmi, pulse, respiration,
    secondarydiagnosisnonicd9, discharged, facid, lengthofstay, pred_lengthofstay";

/// Insert a new encounter. A second insert with the same `eid` fails with
/// `DatabaseError::Conflict`; nothing is overwritten.
pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let f = &patient.flags;
    let m = &patient.measurements;
    conn.execute(
        &format!(
            "INSERT INTO patients ({PATIENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)"
        ),
        params![
            patient.eid,
            patient.vdate,
            patient.rcount,
            patient.gender,
            f.dialysisrenalendstage,
            f.asthma,
            f.irondef,
            f.pneum,
            f.substancedependence,
            f.psychologicaldisordermajor,
            f.depress,
            f.psychother,
            f.fibrosisandother,
            f.malnutrition,
            f.hemo,
            m.hemoglobin,
            m.leukocytes,
            m.sodium,
            m.glucose,
            m.bloodureanitro,
            m.creatinine,
            m.bmi,
            m.pulse,
            m.respiration,
            patient.secondarydiagnosisnonicd9,
            patient.discharged,
            patient.facid,
            patient.lengthofstay,
            patient.pred_lengthofstay,
        ],
    )
    .map_err(|e| {
        DatabaseError::from_insert(e, || format!("patient {} already exists", patient.eid))
    })?;
    Ok(())
}

pub fn get_patient(conn: &Connection, eid: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE eid = ?1"),
            params![eid],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY eid"
    ))?;
    let rows = stmt.query_map([], patient_from_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(row?);
    }
    Ok(patients)
}

/// Highest encounter id on record, `None` when there are no patients.
pub fn max_patient_id(conn: &Connection) -> Result<Option<i64>, DatabaseError> {
    let max = conn.query_row("SELECT MAX(eid) FROM patients", [], |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(max)
}

/// Patients without a discharge date, with their facility's display name.
pub fn list_admitted_patients(conn: &Connection) -> Result<Vec<CheckoutEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.eid, f.name, p.vdate, p.pred_lengthofstay
         FROM patients p
         LEFT JOIN facilities f ON f.facid = p.facid
         WHERE p.discharged IS NULL
         ORDER BY p.eid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(CheckoutEntry {
            eid: row.get(0)?,
            facility: row.get(1)?,
            vdate: row.get(2)?,
            pred_lengthofstay: row.get(3)?,
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

/// Write the discharge date and actual length of stay.
///
/// Only touches a record that is still admitted; returns `false` when no row
/// was updated (unknown id or already discharged).
pub fn record_discharge(
    conn: &Connection,
    eid: i64,
    discharged: NaiveDate,
    length_of_stay: i64,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE patients SET discharged = ?2, lengthofstay = ?3
         WHERE eid = ?1 AND discharged IS NULL",
        params![eid, discharged, length_of_stay],
    )?;
    Ok(updated == 1)
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> Result<Patient, rusqlite::Error> {
    Ok(Patient {
        eid: row.get(0)?,
        vdate: row.get(1)?,
        rcount: row.get(2)?,
        gender: row.get(3)?,
        flags: ConditionFlags {
            dialysisrenalendstage: row.get(4)?,
            asthma: row.get(5)?,
            irondef: row.get(6)?,
            pneum: row.get(7)?,
            substancedependence: row.get(8)?,
            psychologicaldisordermajor: row.get(9)?,
            depress: row.get(10)?,
            psychother: row.get(11)?,
            fibrosisandother: row.get(12)?,
            malnutrition: row.get(13)?,
            hemo: row.get(14)?,
        },
        measurements: Measurements {
            hemoglobin: row.get(15)?,
            leukocytes: row.get(16)?,
            sodium: row.get(17)?,
            glucose: row.get(18)?,
            bloodureanitro: row.get(19)?,
            creatinine: row.get(20)?,
            bmi: row.get(21)?,
            pulse: row.get(22)?,
            respiration: row.get(23)?,
        },
        secondarydiagnosisnonicd9: row.get(24)?,
        discharged: row.get(25)?,
        facid: row.get(26)?,
        lengthofstay: row.get(27)?,
        pred_lengthofstay: row.get(28)?,
    })
}
