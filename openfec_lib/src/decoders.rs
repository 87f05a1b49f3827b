/// FEC form type codes and their names.
pub const FORM_TYPES: &[(&str, &str)] = &[
    ("F1", "Statement of Organization"),
    ("F1M", "Notification of Multicandidate Status"),
    ("F2", "Statement of Candidacy"),
    ("F3", "Report of Receipts and Expenditures for a House or Senate Campaign"),
    ("F3P", "Report of Receipts and Expenditures for a Presidential Campaign"),
    ("F3X", "Report of Receipts and Expenditures for Other Than an Authorized Committee"),
    ("F3L", "Report of Contributions Bundled by Lobbyists/Registrants and Lobbyist/Registrant PACs"),
    ("F4", "Report of Receipts and Disbursements for a Convention Committee"),
    ("F5", "Report of Independent Expenditures Made and Contributions Received"),
    ("F6", "48 Hour Notice of Contributions/Loans Received"),
    ("F7", "Report of Communication Costs by Corporations and Membership Organizations"),
    ("F8", "Debt Settlement Plan"),
    ("F9", "24 Hour Notice of Disbursements for Electioneering Communications"),
    ("F13", "Report of Donations Accepted for Inaugural Committee"),
    ("F99", "Miscellaneous Text"),
    ("FRQ", "Request for Additional Information"),
    ("RFAI", "Request For Additional Information"),
];

/// Name for a form type code, e.g. `F3X`. Codes are matched exactly.
pub fn form_type_name(code: &str) -> Option<&'static str> {
    FORM_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
