use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Facility, NewFacility};

const FACILITY_COLUMNS: &str = "facid, name, postcode, address, contact_no, capacity";

pub fn insert_facility(conn: &Connection, facility: &NewFacility) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO facilities (name, postcode, address, contact_no, capacity)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            facility.name,
            facility.postcode,
            facility.address,
            facility.contact_no,
            facility.capacity,
        ],
    )
    .map_err(|e| {
        DatabaseError::from_insert(e, || format!("facility '{}' already exists", facility.name))
    })?;
    Ok(conn.last_insert_rowid())
}

/// Insert a facility, or refresh its details if one with the same name
/// exists. The facility id is stable across upserts.
pub fn upsert_facility(conn: &Connection, facility: &NewFacility) -> Result<i64, DatabaseError> {
    let facid = conn.query_row(
        "INSERT INTO facilities (name, postcode, address, contact_no, capacity)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(name) DO UPDATE SET
             postcode = excluded.postcode,
             address = excluded.address,
             contact_no = excluded.contact_no,
             capacity = excluded.capacity
         RETURNING facid",
        params![
            facility.name,
            facility.postcode,
            facility.address,
            facility.contact_no,
            facility.capacity,
        ],
        |row| row.get(0),
    )?;
    Ok(facid)
}

pub fn list_facilities(conn: &Connection) -> Result<Vec<Facility>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FACILITY_COLUMNS} FROM facilities ORDER BY facid"
    ))?;
    let rows = stmt.query_map([], facility_from_row)?;

    let mut facilities = Vec::new();
    for row in rows {
        facilities.push(row?);
    }
    Ok(facilities)
}

/// Exact, case-sensitive lookup by display name.
pub fn get_facility_by_name(conn: &Connection, name: &str) -> Result<Option<Facility>, DatabaseError> {
    let facility = conn
        .query_row(
            &format!("SELECT {FACILITY_COLUMNS} FROM facilities WHERE name = ?1"),
            params![name],
            facility_from_row,
        )
        .optional()?;
    Ok(facility)
}

fn facility_from_row(row: &rusqlite::Row<'_>) -> Result<Facility, rusqlite::Error> {
    Ok(Facility {
        facid: row.get(0)?,
        name: row.get(1)?,
        postcode: row.get(2)?,
        address: row.get(3)?,
        contact_no: row.get(4)?,
        capacity: row.get(5)?,
    })
}
