//! Which tables to populate and in what order.

use nexus_core::TableNames;
use nexus_core::catalog::POPULATION_ORDER;

/// Live tables in population order plus catalog tables that do not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationPlan {
    /// Real table names, parents before children.
    pub ordered: Vec<String>,
    /// Lowercase catalog names with no live table.
    pub missing: Vec<&'static str>,
}

impl PopulationPlan {
    /// Order the live tables by the fixed population order.
    ///
    /// Live tables outside the catalog are not populated.
    #[must_use]
    pub fn from_tables(tables: &TableNames) -> Self {
        Self::with_order(tables, POPULATION_ORDER)
    }

    /// Order the live tables by an explicit order, e.g. one derived from
    /// foreign-key metadata.
    #[must_use]
    pub fn with_order(tables: &TableNames, order: &[&'static str]) -> Self {
        let mut plan = Self::default();
        for table in order {
            match tables.resolve(table) {
                Some(real) => plan.ordered.push(real.to_string()),
                None => plan.missing.push(*table),
            }
        }
        plan
    }

    /// Every catalog table exists.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// `TAXON -> HIERARQUIA -> ...` for display.
    #[must_use]
    pub fn describe(&self) -> String {
        self.ordered
            .iter()
            .map(|table| table.to_uppercase())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Outcome counters of a population run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationTally {
    pub successes: u32,
    pub errors: u32,
    /// Tables that received new rows.
    pub processed: u32,
    /// Tables skipped because they already had rows.
    pub skipped: u32,
}

impl PopulationTally {
    pub const fn success(&mut self) {
        self.successes += 1;
        self.processed += 1;
    }

    pub const fn error(&mut self) {
        self.errors += 1;
    }

    /// Success rate in percent, `None` when nothing was attempted.
    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        let attempted = self.successes + self.errors;
        (attempted > 0).then(|| f64::from(self.successes) * 100.0 / f64::from(attempted))
    }
}
