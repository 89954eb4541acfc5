//! Cell library: gate templates with characterized delay and capacitance.
//!
//! The library carries a default delay element, a two-inverter buffer the
//! analyzer instantiates when it sizes corrective feedback delays.

use serde::{Deserialize, Serialize};

use crate::delay::DelayModel;
use crate::gate::GateFn;

/// A library cell template: the data needed to instantiate a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellTemplate {
    /// Library cell name.
    pub name: String,
    /// The logic function of the cell.
    pub func: GateFn,
    /// Input pin capacitance, in load units.
    pub input_cap: f64,
    /// Delay arc from each input to the output.
    pub delay: DelayModel,
}

/// A collection of cell templates with a designated default delay element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellLibrary {
    cells: Vec<CellTemplate>,
    default_delay: CellTemplate,
}

impl CellLibrary {
    /// Creates a library with the given default delay element and no other
    /// cells.
    pub fn new(default_delay: CellTemplate) -> Self {
        Self {
            cells: Vec::new(),
            default_delay,
        }
    }

    /// Creates a library with a generic inverter-pair delay element:
    /// 0.5 ns block delay, 0.1 ns per unit load, unit input capacitance.
    pub fn standard() -> Self {
        Self::new(CellTemplate {
            name: "dly_pair".to_string(),
            func: GateFn::DelayBuf,
            input_cap: 1.0,
            delay: DelayModel::Fixed {
                block_ns: 0.5,
                fanout_ns_per_load: 0.1,
            },
        })
    }

    /// Registers a cell template.
    pub fn add_cell(&mut self, cell: CellTemplate) {
        self.cells.push(cell);
    }

    /// Looks up a cell template by name.
    pub fn find(&self, name: &str) -> Option<&CellTemplate> {
        self.cells.iter().find(|c| c.name == name)
    }

    /// The default delay element used for inserted feedback delays.
    pub fn default_delay(&self) -> &CellTemplate {
        &self.default_delay
    }

    /// Worst-case delay contributed by one default element inside a chain,
    /// where each element drives the next element's input pin.
    pub fn element_delay_ns(&self) -> f64 {
        self.default_delay
            .delay
            .worst_ns(self.default_delay.input_cap)
    }
}

impl Default for CellLibrary {
    fn default() -> Self {
        Self::standard()
    }
}
