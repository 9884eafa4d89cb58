//! Periodic dither injection into a target's instruction sequence.

use std::collections::HashMap;

use log::{debug, trace};

use crate::models::PlanInstruction;

/// Inserts a [`PlanInstruction::Dither`] whenever any single filter has taken
/// `every + 1` exposures since the last dither.
///
/// Counters are per filter and restart from zero after each inserted dither.
/// Non-exposure instructions pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DitherInjector {
    every: u32,
}

impl DitherInjector {
    /// `every == 0` disables injection.
    pub fn new(every: u32) -> Self {
        Self { every }
    }

    pub fn every(&self) -> u32 {
        self.every
    }

    pub fn is_enabled(&self) -> bool {
        self.every > 0
    }

    pub fn inject(&self, instructions: Vec<PlanInstruction>) -> Vec<PlanInstruction> {
        if !self.is_enabled() || instructions.is_empty() {
            return instructions;
        }

        let threshold = self.every.saturating_add(1);
        let mut output =
            Vec::with_capacity(instructions.len() + instructions.len() / threshold as usize);
        let mut counts: HashMap<String, u32> = HashMap::new();
        let mut injected = 0usize;

        for instruction in instructions {
            let trigger = match instruction.exposure_filter() {
                Some(filter) => {
                    let count = counts.entry(filter.to_string()).or_insert(0);
                    *count += 1;
                    trace!("filter {} at {} since last dither", filter, count);
                    *count >= threshold
                }
                None => false,
            };
            output.push(instruction);
            if trigger {
                output.push(PlanInstruction::Dither);
                counts.clear();
                injected += 1;
            }
        }

        debug!("injected {} dithers (every {})", injected, self.every);
        output
    }
}
