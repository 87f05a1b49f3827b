//! Relationship descriptors resolved eagerly into [`JoinSpec`] values.
//!
//! A relationship joins on foreign-key equality and, optionally, on the
//! election cycle. Source cycles can be rounded up to their two-year period
//! (`cycle + cycle % 2`) before comparing, since history tables are keyed
//! by even years.

use openfec_query::{Error, JoinSpec, Model, ModelRegistry};

#[derive(Debug, Clone, PartialEq)]
pub struct Related {
    related_model: String,
    id_label: String,
    related_id_label: Option<String>,
    cycle_label: Option<String>,
    related_cycle_label: Option<String>,
    use_modulus: bool,
}

impl Related {
    pub fn new(related_model: &str, id_label: &str) -> Self {
        Self {
            related_model: related_model.to_string(),
            id_label: id_label.to_string(),
            related_id_label: None,
            cycle_label: None,
            related_cycle_label: None,
            use_modulus: true,
        }
    }

    /// Key column on the related model, if named differently.
    pub fn related_id_label(mut self, label: &str) -> Self {
        self.related_id_label = Some(label.to_string());
        self
    }

    /// Cycle column on the source model. Without it no cycle condition is
    /// added.
    pub fn cycle_label(mut self, label: &str) -> Self {
        self.cycle_label = Some(label.to_string());
        self
    }

    pub fn related_cycle_label(mut self, label: &str) -> Self {
        self.related_cycle_label = Some(label.to_string());
        self
    }

    pub fn use_modulus(mut self, use_modulus: bool) -> Self {
        self.use_modulus = use_modulus;
        self
    }

    pub fn related_model(&self) -> &str {
        &self.related_model
    }

    /// Resolves the descriptor against `source` and the registry.
    pub fn build(&self, registry: &ModelRegistry, source: &Model) -> Result<JoinSpec, Error> {
        let related = registry.try_get(&self.related_model)?;
        let related_id_label = self.related_id_label.as_deref().unwrap_or(&self.id_label);

        let id_column = source.try_column(&self.id_label)?;
        let related_id_column = related.try_column(related_id_label)?;
        let mut join = JoinSpec::new(related).on(id_column.eq(related_id_column));

        if let Some(cycle_label) = &self.cycle_label {
            let related_cycle_label = self.related_cycle_label.as_deref().unwrap_or(cycle_label);
            let cycle = source.try_column(cycle_label)?.expr();
            let cycle = if self.use_modulus {
                cycle.clone().plus(cycle.modulo(2_i64))
            } else {
                cycle
            };
            let related_cycle = related.try_column(related_cycle_label)?;
            join = join.on(cycle.eq(related_cycle));
        }
        tracing::debug!(
            source = source.name(),
            related = related.name(),
            "built relationship join"
        );
        Ok(join)
    }
}

pub fn related_committee() -> Related {
    Related::new("CommitteeDetail", "committee_id")
}

pub fn related_candidate() -> Related {
    Related::new("CandidateDetail", "candidate_id")
}

/// Pair with [`Related::cycle_label`] to match the committee's cycle row.
pub fn related_committee_history() -> Related {
    Related::new("CommitteeHistory", "committee_id").related_cycle_label("cycle")
}

/// Pair with [`Related::cycle_label`] to match the candidate's period row.
pub fn related_candidate_history() -> Related {
    Related::new("CandidateHistory", "candidate_id").related_cycle_label("two_year_period")
}

pub fn related_efile_summary() -> Related {
    Related::new("EFilings", "file_number").related_id_label("file_number")
}
