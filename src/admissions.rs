//! Ward workflow around recorded encounters: the next-id hint, the
//! checkout list and discharge.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::{self, DatabaseError};
use crate::models::CheckoutEntry;

/// Suggested id for the next admission: highest id on record plus one, or 1
/// for an empty store. Advisory only; ids are still supplied by the caller.
pub fn next_patient_id(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(db::max_patient_id(conn)?.map_or(1, |max| max + 1))
}

/// Patients still admitted, with facility names, for the checkout screen.
pub fn checkout_list(conn: &Connection) -> Result<Vec<CheckoutEntry>, DatabaseError> {
    db::list_admitted_patients(conn)
}

/// Whole days from admission to `discharged`.
pub fn length_of_stay(admitted: NaiveDate, discharged: NaiveDate) -> i64 {
    (discharged - admitted).num_days()
}

/// Discharge encounter `eid` on `today` and return the actual length of stay.
///
/// A record is discharged at most once: a second call fails with
/// `DatabaseError::Conflict` and leaves the stored values untouched.
pub fn discharge(conn: &mut Connection, eid: i64, today: NaiveDate) -> Result<i64, DatabaseError> {
    // Take the write lock before reading so a concurrent discharge waits
    // instead of invalidating this snapshot.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let patient = db::get_patient(&tx, eid)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Patient".into(),
        id: eid.to_string(),
    })?;
    if let Some(date) = patient.discharged {
        return Err(DatabaseError::Conflict(format!(
            "patient {eid} was already discharged on {date}"
        )));
    }

    let days = length_of_stay(patient.vdate, today);
    if !db::record_discharge(&tx, eid, today, days)? {
        return Err(DatabaseError::Conflict(format!(
            "patient {eid} was discharged concurrently"
        )));
    }
    tx.commit()?;

    tracing::info!(eid, length_of_stay = days, "Patient discharged");
    Ok(days)
}
