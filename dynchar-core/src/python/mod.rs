//! Python bindings for the scenario selector and the AGWP/AGTP calculators

use crate::errors::CharacterizationError;
use crate::irf::Gas;
use crate::metrics::{agtp as rust_agtp, agwp as rust_agwp, ProspectiveContext};
use crate::scenario::{self, Scenario};
use crate::timeseries::FloatValue;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

impl From<CharacterizationError> for PyErr {
    fn from(e: CharacterizationError) -> PyErr {
        match e {
            CharacterizationError::MissingScenario
            | CharacterizationError::MissingScenarioData(_) => {
                PyRuntimeError::new_err(e.to_string())
            }
            _ => PyValueError::new_err(e.to_string()),
        }
    }
}

fn parse_gas(gas: &str) -> PyResult<Gas> {
    gas.parse().map_err(|_| {
        PyValueError::new_err(format!("Unknown gas '{gas}'. Expected CO2, CH4 or N2O"))
    })
}

fn parse_scenario(scenario: Option<Bound<'_, PyAny>>) -> PyResult<Option<Scenario>> {
    scenario
        .map(|obj| {
            pythonize::depythonize::<Scenario>(&obj)
                .map_err(|e| PyValueError::new_err(format!("{}", e)))
        })
        .transpose()
}

/// Select the scenario used by prospective metrics
#[pyfunction]
fn set_scenario(iam: &str, ssp: &str, rcp: &str) -> PyResult<()> {
    scenario::set_scenario(iam, ssp, rcp)?;
    Ok(())
}

/// The selected scenario as a dict, or None when unset
#[pyfunction]
fn get_scenario(py: Python<'_>) -> PyResult<PyObject> {
    match scenario::get_scenario() {
        Some(selected) => Ok(pythonize::pythonize(py, &selected)?),
        None => Ok(py.None()),
    }
}

#[pyfunction]
fn reset_scenario() {
    scenario::reset_scenario()
}

fn evaluate<F>(
    scenario: Option<Bound<'_, PyAny>>,
    time_varying_re: bool,
    f: F,
) -> PyResult<FloatValue>
where
    F: FnOnce(Option<&ProspectiveContext>) -> Result<FloatValue, CharacterizationError>,
{
    let value = match parse_scenario(scenario)? {
        Some(scenario) => f(Some(&ProspectiveContext::builtin(scenario, time_varying_re)?))?,
        None => f(None)?,
    };
    Ok(value)
}

/// AGWP of a 1 kg pulse in W yr m^-2 kg^-1.
///
/// Passing a scenario dict (`{"iam": ..., "ssp": ..., "rcp": ...}`) computes the
/// prospective value.
#[pyfunction]
#[pyo3(signature = (gas, emission_year=2030, time_horizon=100, scenario=None, time_varying_re=false))]
fn agwp(
    gas: &str,
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<Bound<'_, PyAny>>,
    time_varying_re: bool,
) -> PyResult<FloatValue> {
    let gas = parse_gas(gas)?;
    evaluate(scenario, time_varying_re, |ctx| {
        rust_agwp(gas, emission_year, time_horizon, ctx)
    })
}

/// AGTP of a 1 kg pulse in K kg^-1
#[pyfunction]
#[pyo3(signature = (gas, emission_year=2030, time_horizon=100, scenario=None, time_varying_re=false))]
fn agtp(
    gas: &str,
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<Bound<'_, PyAny>>,
    time_varying_re: bool,
) -> PyResult<FloatValue> {
    let gas = parse_gas(gas)?;
    evaluate(scenario, time_varying_re, |ctx| {
        rust_agtp(gas, emission_year, time_horizon, ctx)
    })
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(set_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(get_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(reset_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(agwp, m)?)?;
    m.add_function(wrap_pyfunction!(agtp, m)?)?;
    Ok(())
}
