//! Table descriptors for the mirrored OpenFEC resources.
//!
//! Column lists match `schema/sqlite.sql`. Names passed to
//! [`ModelRegistry::get`] are the resource names used by the relationship
//! presets in [`crate::relations`].

use openfec_query::{ColumnType, Model, ModelRegistry};

/// Itemized receipts (Schedule A).
pub fn schedule_a() -> Model {
    Model::new("ScheduleA", "sched_a")
        .with_primary_key("sub_id", ColumnType::Integer)
        .with_column("committee_id", ColumnType::Text)
        .with_column("contributor_name", ColumnType::Text)
        .with_column("contributor_state", ColumnType::Text)
        .with_column("contributor_employer", ColumnType::Text)
        .with_column("contribution_receipt_date", ColumnType::Date)
        .with_column("contribution_receipt_amount", ColumnType::Float)
        .with_column("two_year_transaction_period", ColumnType::Integer)
        .with_column("is_individual", ColumnType::Boolean)
        .with_column("image_number", ColumnType::Text)
        .with_column("file_number", ColumnType::Integer)
}

pub fn committee_detail() -> Model {
    Model::new("CommitteeDetail", "committee_detail")
        .with_primary_key("committee_id", ColumnType::Text)
        .with_column("name", ColumnType::Text)
        .with_column("committee_type", ColumnType::Text)
        .with_column("designation", ColumnType::Text)
        .with_column("party", ColumnType::Text)
        .with_column("state", ColumnType::Text)
}

/// One row per committee per two-year cycle.
pub fn committee_history() -> Model {
    Model::new("CommitteeHistory", "committee_history")
        .with_primary_key("idx", ColumnType::Integer)
        .with_required_column("committee_id", ColumnType::Text)
        .with_required_column("cycle", ColumnType::Integer)
        .with_column("name", ColumnType::Text)
        .with_column("treasurer_name", ColumnType::Text)
        .with_column("committee_type", ColumnType::Text)
}

pub fn candidate_detail() -> Model {
    Model::new("CandidateDetail", "candidate_detail")
        .with_primary_key("candidate_id", ColumnType::Text)
        .with_column("name", ColumnType::Text)
        .with_column("party", ColumnType::Text)
        .with_column("office", ColumnType::Text)
        .with_column("state", ColumnType::Text)
        .with_column("district", ColumnType::Text)
}

/// One row per candidate per two-year period.
pub fn candidate_history() -> Model {
    Model::new("CandidateHistory", "candidate_history")
        .with_primary_key("idx", ColumnType::Integer)
        .with_required_column("candidate_id", ColumnType::Text)
        .with_required_column("two_year_period", ColumnType::Integer)
        .with_column("candidate_election_year", ColumnType::Integer)
        .with_column("name", ColumnType::Text)
        .with_column("office", ColumnType::Text)
        .with_column("state", ColumnType::Text)
        .with_column("district", ColumnType::Text)
        .with_column("party", ColumnType::Text)
        .with_column("incumbent_challenge", ColumnType::Text)
}

/// Electronic filing summaries.
pub fn efilings() -> Model {
    Model::new("EFilings", "efilings")
        .with_primary_key("file_number", ColumnType::Integer)
        .with_required_column("committee_id", ColumnType::Text)
        .with_column("form_type", ColumnType::Text)
        .with_column("report_type", ColumnType::Text)
        .with_column("document_description", ColumnType::Text)
        .with_column("receipt_date", ColumnType::Date)
        .with_column("report_year", ColumnType::Integer)
        .with_column("beginning_image_number", ColumnType::Text)
        .with_column("amends_file", ColumnType::Integer)
}

/// Registry holding every model above, keyed by resource name.
pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .with_model(schedule_a())
        .with_model(committee_detail())
        .with_model(committee_history())
        .with_model(candidate_detail())
        .with_model(candidate_history())
        .with_model(efilings())
}
