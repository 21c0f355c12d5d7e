//! Characterizers derived from an LCIA method
//!
//! Instead of an explicit flow mapping, callers can name an LCIA method. The biosphere
//! flows it characterizes are fetched from a [`MethodFlowSource`] and matched by name.
//! Flows without a dedicated characterizer fall back to a decay series looked up by
//! CAS number.

use crate::registry::{Characterizer, DecaySeries};
use dynchar_core::inventory::FlowId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A biosphere flow characterized by an LCIA method
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiosphereFlow {
    pub id: FlowId,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub cas_number: Option<String>,
}

/// Provider of the flows characterized by an LCIA method
pub trait MethodFlowSource {
    /// Flows of `method`, `None` if the method is unknown
    fn method_flows(&self, method: &str) -> Option<Vec<BiosphereFlow>>;
}

impl MethodFlowSource for HashMap<String, Vec<BiosphereFlow>> {
    fn method_flows(&self, method: &str) -> Option<Vec<BiosphereFlow>> {
        self.get(method).cloned()
    }
}

/// Pick a characterizer for a flow from its name, categories and CAS number
pub fn characterizer_for_flow(
    flow: &BiosphereFlow,
    decay_series: &HashMap<String, DecaySeries>,
) -> Option<Characterizer> {
    let name = flow.name.to_lowercase();

    if name.contains("carbon dioxide") {
        if flow.categories.iter().any(|category| category == "soil") {
            Some(Characterizer::Co2Uptake)
        } else {
            Some(Characterizer::Co2)
        }
    } else if name.contains("methane, fossil")
        || name.contains("methane, non-fossil")
        || name.contains("methane, from soil or biomass stock")
    {
        Some(Characterizer::Ch4)
    } else if name.contains("dinitrogen monoxide") {
        Some(Characterizer::N2o)
    } else if name.contains("carbon monoxide") {
        Some(Characterizer::Co)
    } else {
        flow.cas_number
            .as_ref()
            .and_then(|cas| decay_series.get(cas))
            .map(|series| Characterizer::Decay(series.clone()))
    }
}

/// Build the flow mapping for every flow of `method` that can be characterized.
///
/// Returns `None` if the source does not know the method.
pub fn characterizers_from_method(
    method: &str,
    source: &dyn MethodFlowSource,
    decay_series: &HashMap<String, DecaySeries>,
) -> Option<HashMap<FlowId, Characterizer>> {
    let flows = source.method_flows(method)?;
    let mapping: HashMap<_, _> = flows
        .iter()
        .filter_map(|flow| {
            let characterizer = characterizer_for_flow(flow, decay_series);
            if characterizer.is_none() {
                log::debug!("No characterizer for flow {} ({})", flow.id, flow.name);
            }
            characterizer.map(|c| (flow.id, c))
        })
        .collect();
    log::debug!(
        "Resolved {} of {} flows from method {method}",
        mapping.len(),
        flows.len()
    );
    Some(mapping)
}
