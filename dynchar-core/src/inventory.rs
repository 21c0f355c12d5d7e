//! Dynamic inventory rows and their characterized expansions

use crate::timeseries::FloatValue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a biosphere flow
pub type FlowId = i64;
/// Identifier of the activity emitting a flow
pub type ActivityId = i64;

/// A pulse emission: `amount` kg of `flow` emitted by `activity` on `date`.
///
/// Negative amounts are uptakes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub date: NaiveDate,
    /// unit: kg
    pub amount: FloatValue,
    pub flow: FlowId,
    pub activity: ActivityId,
}

impl EmissionRecord {
    pub fn new(date: NaiveDate, amount: FloatValue, flow: FlowId, activity: ActivityId) -> Self {
        Self {
            date,
            amount,
            flow,
            activity,
        }
    }

    /// A characterized row carrying this record's flow and activity
    pub fn characterized(&self, date: NaiveDate, amount: FloatValue) -> CharacterizedRecord {
        CharacterizedRecord {
            date,
            amount,
            flow: self.flow,
            activity: self.activity,
        }
    }
}

/// One row of characterized output.
///
/// `amount` holds the metric value: W/m^2 for radiative forcing rows and kg CO2-eq for
/// relative metrics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterizedRecord {
    pub date: NaiveDate,
    pub amount: FloatValue,
    pub flow: FlowId,
    pub activity: ActivityId,
}
