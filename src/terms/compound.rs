//! Equipment + problem compound construction
//!
//! A single greedy left-to-right pass over noun/verb surfaces. An equipment
//! term immediately followed by a problem term becomes one compound and both
//! positions are consumed; any other lexicon term is emitted alone; terms in
//! neither vocabulary are dropped.

use crate::lexicon::Lexicon;

/// Builds compound terms against a shared lexicon.
#[derive(Debug, Clone, Copy)]
pub struct CompoundBuilder<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> CompoundBuilder<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Merge adjacent equipment+problem pairs.
    ///
    /// Pairs never overlap: once `terms[i+1]` is consumed as the problem half
    /// of a pair it is not looked at again.
    pub fn build<S: AsRef<str>>(&self, terms: &[S]) -> Vec<String> {
        let mut compounds = Vec::with_capacity(terms.len());
        let mut i = 0;

        while i + 1 < terms.len() {
            let current = terms[i].as_ref();
            let next = terms[i + 1].as_ref();

            if self.lexicon.is_equipment(current) && self.lexicon.is_problem(next) {
                let mut compound = String::with_capacity(current.len() + next.len());
                compound.push_str(current);
                compound.push_str(next);
                compounds.push(compound);
                i += 2;
            } else {
                if self.lexicon.contains(current) {
                    compounds.push(current.to_string());
                }
                i += 1;
            }
        }

        // One term left over when the loop ended on a single step.
        if i + 1 == terms.len() {
            let last = terms[i].as_ref();
            if self.lexicon.contains(last) {
                compounds.push(last.to_string());
            }
        }

        compounds
    }
}
