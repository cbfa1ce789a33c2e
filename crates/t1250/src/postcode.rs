//! Postcode to state translation.
//!
//! The table is walked in order and the first state whose ranges or
//! exceptions contain the postcode wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRanges {
    pub state: String,
    /// Inclusive `[low, high]` pairs.
    pub ranges: Vec<(u32, u32)>,
    #[serde(default)]
    pub exceptions: Vec<u32>,
}

impl StateRanges {
    pub fn new(state: &str, ranges: &[(u32, u32)], exceptions: &[u32]) -> Self {
        Self {
            state: state.to_string(),
            ranges: ranges.to_vec(),
            exceptions: exceptions.to_vec(),
        }
    }

    pub fn contains(&self, postcode: u32) -> bool {
        self.ranges
            .iter()
            .any(|&(low, high)| (low..=high).contains(&postcode))
            || self.exceptions.contains(&postcode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostcodeTable {
    states: Vec<StateRanges>,
}

impl PostcodeTable {
    pub fn new(states: Vec<StateRanges>) -> Self {
        Self { states }
    }

    /// Australia Post allocation. NSW is listed first so its border-town
    /// exceptions win over the neighbouring VIC and QLD ranges.
    pub fn australia() -> Self {
        Self::new(vec![
            StateRanges::new(
                "NSW",
                &[(1000, 1999), (2000, 2599), (2619, 2899), (2921, 2999)],
                &[3585, 3586, 3644, 3707, 4375, 4376, 4377, 4380, 4383, 4385],
            ),
            StateRanges::new("ACT", &[(200, 299), (2600, 2618), (2900, 2920)], &[]),
            StateRanges::new("VIC", &[(3000, 3999), (8000, 8999)], &[]),
            StateRanges::new("QLD", &[(4000, 4999), (9000, 9999)], &[]),
            StateRanges::new("SA", &[(5000, 5799), (5800, 5999)], &[]),
            StateRanges::new("WA", &[(6000, 6797), (6800, 6999)], &[]),
            StateRanges::new("TAS", &[(7000, 7799), (7800, 7999)], &[]),
            StateRanges::new("NT", &[(800, 899), (900, 999)], &[]),
        ])
    }

    pub fn states(&self) -> &[StateRanges] {
        &self.states
    }

    pub fn lookup(&self, postcode: u32) -> Option<&str> {
        self.states
            .iter()
            .find(|s| s.contains(postcode))
            .map(|s| s.state.as_str())
    }

    /// Translates raw postcode text into a state code. Returns an empty
    /// string for non-numeric input or postcodes outside the table.
    pub fn translate(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            debug!("Postcode '{}' is not numeric, no state assigned", trimmed);
            return String::new();
        }

        let Ok(postcode) = trimmed.parse::<u32>() else {
            debug!("Postcode '{}' out of range, no state assigned", trimmed);
            return String::new();
        };

        match self.lookup(postcode) {
            Some(state) => state.to_string(),
            None => {
                debug!("No state found for postcode {}", postcode);
                String::new()
            }
        }
    }

    /// A postcode inside the state's first declared range.
    pub fn representative(&self, state: &str) -> Option<u32> {
        self.states
            .iter()
            .find(|s| s.state == state)
            .and_then(|s| s.ranges.first())
            .map(|&(low, _)| low)
    }
}

impl Default for PostcodeTable {
    fn default() -> Self {
        Self::australia()
    }
}
