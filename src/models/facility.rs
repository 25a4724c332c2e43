use serde::{Deserialize, Serialize};

/// A care facility. Reference data, entered out of band.
///
/// `name` is the display key the prediction path resolves against, so it is
/// unique in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub facid: i64,
    pub name: String,
    pub postcode: i64,
    pub address: String,
    #[serde(rename = "contactNo")]
    pub contact_no: String,
    pub capacity: i64,
}

/// Facility as entered by an administrator, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFacility {
    pub name: String,
    pub postcode: i64,
    pub address: String,
    #[serde(rename = "contactNo")]
    pub contact_no: String,
    pub capacity: i64,
}
