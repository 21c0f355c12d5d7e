//! Python bindings for the characterization driver
//!
//! Inventories cross the boundary as numpy columns. Dates are days since 1970-01-01.

use crate::characterize::{characterize as rust_characterize, CharacterizeOptions, FunctionSource};
use crate::method::BiosphereFlow;
use crate::registry::{Characterizer, DecaySeries, Metric};
use chrono::{Days, NaiveDate};
use dynchar_core::inventory::{ActivityId, EmissionRecord, FlowId};
use dynchar_core::timeseries::FloatValue;
use numpy::{PyArray1, PyReadonlyArray1, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

type Columns<'py> = (
    Bound<'py, PyArray1<i64>>,
    Bound<'py, PyArray1<FloatValue>>,
    Bound<'py, PyArray1<FlowId>>,
    Bound<'py, PyArray1<ActivityId>>,
);

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn date_from_days(days: i64) -> PyResult<NaiveDate> {
    let shifted = if days >= 0 {
        epoch().checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        epoch().checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| PyValueError::new_err(format!("Date out of range: {days} days")))
}

fn days_from_date(date: NaiveDate) -> i64 {
    (date - epoch()).num_days()
}

fn from_python<T: DeserializeOwned>(obj: &Bound<'_, PyAny>) -> PyResult<T> {
    pythonize::depythonize::<T>(obj).map_err(|e| PyValueError::new_err(format!("{}", e)))
}

fn from_python_or_default<T: DeserializeOwned + Default>(
    obj: Option<Bound<'_, PyAny>>,
) -> PyResult<T> {
    obj.map_or_else(|| Ok(T::default()), |obj| from_python(&obj))
}

/// Characterize an inventory given as columns.
///
/// Characterizers come either from `characterizers`, a dict mapping flow ids to
/// characterizers such as `{1: "co2", 2: "ch4", 3: {"decay": [...]}}`, or from an LCIA
/// `method`. In the latter case `method_flows` maps method names to lists of flow dicts
/// (`id`, `name`, `categories`, `cas_number`) and `decay_series` maps CAS numbers to
/// per-kg forcing series. Returns the output columns and a list of warning messages.
#[pyfunction]
#[pyo3(signature = (
    date,
    amount,
    flow,
    activity,
    metric,
    characterizers=None,
    options=None,
    method=None,
    method_flows=None,
    decay_series=None
))]
#[allow(clippy::too_many_arguments)]
fn characterize<'py>(
    py: Python<'py>,
    date: PyReadonlyArray1<'py, i64>,
    amount: PyReadonlyArray1<'py, FloatValue>,
    flow: PyReadonlyArray1<'py, FlowId>,
    activity: PyReadonlyArray1<'py, ActivityId>,
    metric: &str,
    characterizers: Option<Bound<'py, PyAny>>,
    options: Option<Bound<'py, PyAny>>,
    method: Option<&str>,
    method_flows: Option<Bound<'py, PyAny>>,
    decay_series: Option<Bound<'py, PyAny>>,
) -> PyResult<(Columns<'py>, Vec<String>)> {
    let (date, amount, flow, activity) = (
        date.as_array(),
        amount.as_array(),
        flow.as_array(),
        activity.as_array(),
    );
    let n = date.len();
    if amount.len() != n || flow.len() != n || activity.len() != n {
        return Err(PyValueError::new_err("Inventory columns must have the same length"));
    }

    let inventory = (0..n)
        .map(|i| {
            let record_date = date_from_days(date[i])?;
            Ok(EmissionRecord::new(record_date, amount[i], flow[i], activity[i]))
        })
        .collect::<PyResult<Vec<_>>>()?;
    let metric: Metric = metric.parse()?;
    let mapping = characterizers
        .map(|obj| from_python::<HashMap<FlowId, Characterizer>>(&obj))
        .transpose()?;
    let options: CharacterizeOptions = from_python_or_default(options)?;
    let method_flows: HashMap<String, Vec<BiosphereFlow>> = from_python_or_default(method_flows)?;
    let decay_series: HashMap<String, DecaySeries> = from_python_or_default(decay_series)?;

    let functions =
        FunctionSource::select(mapping.as_ref(), method, &method_flows, &decay_series)?;
    let result = rust_characterize(&inventory, metric, functions, &options)?;

    let records = &result.records;
    let dates: Vec<i64> = records.iter().map(|r| days_from_date(r.date)).collect();
    let amounts: Vec<FloatValue> = records.iter().map(|r| r.amount).collect();
    let flows: Vec<FlowId> = records.iter().map(|r| r.flow).collect();
    let activities: Vec<ActivityId> = records.iter().map(|r| r.activity).collect();
    let warnings = result.warnings.iter().map(|w| w.to_string()).collect();

    Ok((
        (
            dates.to_pyarray_bound(py),
            amounts.to_pyarray_bound(py),
            flows.to_pyarray_bound(py),
            activities.to_pyarray_bound(py),
        ),
        warnings,
    ))
}

#[pymodule]
pub fn components(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(characterize, m)?)?;
    Ok(())
}
