//! Range exports of raw module readings.

use crate::types::{
    EnergyReading, EnvironmentalReading, Module, PopulationReading, TrafficReading,
};
use serde::{Deserialize, Serialize};

/// Every stored reading of one module within a time range, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", content = "readings", rename_all = "lowercase")]
pub enum ReadingExport {
    Traffic(Vec<TrafficReading>),
    Energy(Vec<EnergyReading>),
    Environmental(Vec<EnvironmentalReading>),
    Population(Vec<PopulationReading>),
}

impl ReadingExport {
    pub fn module(&self) -> Module {
        match self {
            ReadingExport::Traffic(_) => Module::Traffic,
            ReadingExport::Energy(_) => Module::Energy,
            ReadingExport::Environmental(_) => Module::Environmental,
            ReadingExport::Population(_) => Module::Population,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReadingExport::Traffic(r) => r.len(),
            ReadingExport::Energy(r) => r.len(),
            ReadingExport::Environmental(r) => r.len(),
            ReadingExport::Population(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
