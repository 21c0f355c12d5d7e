//! Characterization with the process-wide scenario selector.
//!
//! Every test holds `LOCK` since they share the selected scenario.

use chrono::NaiveDate;
use dynchar_components::characterize::{characterize, CharacterizeOptions, FunctionSource};
use dynchar_components::registry::{Characterizer, Metric};
use dynchar_core::errors::CharacterizationError;
use dynchar_core::inventory::{EmissionRecord, FlowId};
use dynchar_core::scenario::{reset_scenario, set_scenario, Scenario};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

static LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    let guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset_scenario();
    guard
}

fn inventory() -> Vec<EmissionRecord> {
    vec![EmissionRecord::new(
        NaiveDate::from_ymd_opt(2050, 1, 1).unwrap(),
        1.0,
        1,
        1,
    )]
}

fn mapping() -> HashMap<FlowId, Characterizer> {
    HashMap::from([(1, Characterizer::Ch4)])
}

fn pgwp(options: &CharacterizeOptions) -> Result<f64, CharacterizationError> {
    let mapping = mapping();
    let result = characterize(
        &inventory(),
        Metric::Pgwp,
        FunctionSource::Explicit(&mapping),
        options,
    )?;
    Ok(result.records[0].amount)
}

#[test]
fn prospective_metrics_need_a_scenario() {
    let _guard = lock();
    let mapping = mapping();
    for metric in [Metric::ProspectiveRadiativeForcing, Metric::Pgwp, Metric::Pgtp] {
        let err = characterize(
            &inventory(),
            metric,
            FunctionSource::Explicit(&mapping),
            &CharacterizeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, CharacterizationError::MissingScenario);
    }

    // IPCC metrics do not
    let result = characterize(
        &inventory(),
        Metric::Gwp,
        FunctionSource::Explicit(&mapping),
        &CharacterizeOptions::default(),
    )
    .unwrap();
    assert_eq!(result.records.len(), 1);
}

#[test]
fn selected_scenario_is_used() {
    let _guard = lock();
    let selected = set_scenario("REMIND", "SSP5", "8.5").unwrap();

    let implicit = pgwp(&CharacterizeOptions::default()).unwrap();
    let explicit = pgwp(&CharacterizeOptions {
        scenario: Some(selected),
        ..CharacterizeOptions::default()
    })
    .unwrap();
    assert_eq!(implicit, explicit);
}

#[test]
fn explicit_scenario_overrides_selection() {
    let _guard = lock();
    set_scenario("REMIND", "SSP5", "8.5").unwrap();
    let other = Scenario::parse("IMAGE", "SSP1", "2.6").unwrap();

    let implicit = pgwp(&CharacterizeOptions {
        time_varying_re: true,
        ..CharacterizeOptions::default()
    })
    .unwrap();
    let explicit = pgwp(&CharacterizeOptions {
        time_varying_re: true,
        scenario: Some(other),
        ..CharacterizeOptions::default()
    })
    .unwrap();
    assert_ne!(implicit, explicit);
}

#[test]
fn reset_clears_selection() {
    let _guard = lock();
    set_scenario("AIM", "SSP3", "4.5").unwrap();
    assert!(pgwp(&CharacterizeOptions::default()).is_ok());

    reset_scenario();
    assert_eq!(
        pgwp(&CharacterizeOptions::default()),
        Err(CharacterizationError::MissingScenario)
    );
}
