use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Condition flags recorded at admission. Each is 0 or 1.
///
/// `fibrosisandother` is stored with the encounter but is not a model input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionFlags {
    pub dialysisrenalendstage: u8,
    pub asthma: u8,
    pub irondef: u8,
    pub pneum: u8,
    pub substancedependence: u8,
    pub psychologicaldisordermajor: u8,
    pub depress: u8,
    pub psychother: u8,
    pub fibrosisandother: u8,
    pub malnutrition: u8,
    pub hemo: u8,
}

/// Clinical measurements recorded at admission.
///
/// `respiration` is stored with the encounter but is not a model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub hemoglobin: f64,
    pub leukocytes: f64,
    pub sodium: f64,
    pub glucose: f64,
    pub bloodureanitro: f64,
    pub creatinine: f64,
    pub bmi: f64,
    pub pulse: f64,
    pub respiration: f64,
}

/// One patient encounter.
///
/// `discharged` and `lengthofstay` are `None` while the patient is admitted
/// and are written together, once, at discharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub eid: i64,
    pub vdate: NaiveDate,
    pub rcount: String,
    pub gender: String,
    #[serde(flatten)]
    pub flags: ConditionFlags,
    #[serde(flatten)]
    pub measurements: Measurements,
    pub secondarydiagnosisnonicd9: i64,
    pub discharged: Option<NaiveDate>,
    pub facid: i64,
    pub lengthofstay: Option<i64>,
    pub pred_lengthofstay: i64,
}

/// Row shown on the checkout screen: an admitted patient and where they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutEntry {
    pub eid: i64,
    pub facility: Option<String>,
    pub vdate: NaiveDate,
    pub pred_lengthofstay: i64,
}

#[cfg(test)]
impl Patient {
    /// An admitted patient with unremarkable values, for tests.
    pub(crate) fn sample(eid: i64, facid: i64, vdate: NaiveDate) -> Self {
        Self {
            eid,
            vdate,
            rcount: "2".into(),
            gender: "M".into(),
            flags: ConditionFlags::default(),
            measurements: Measurements {
                hemoglobin: 12.5,
                leukocytes: 7.0,
                sodium: 140.0,
                glucose: 100.0,
                bloodureanitro: 15.0,
                creatinine: 1.0,
                bmi: 24.0,
                pulse: 70.0,
                respiration: 16.0,
            },
            secondarydiagnosisnonicd9: 1,
            discharged: None,
            facid,
            lengthofstay: None,
            pred_lengthofstay: 4,
        }
    }
}
