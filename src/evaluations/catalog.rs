use super::domain::{EmployeeRecord, EvaluationLevel};

/// Fixed mapping from the HR form-type option-set code to the level it
/// selects. The numeric codes come from the upstream HR system and are a
/// closed enumeration; they are not tenant data.
pub const FORM_TYPE_LEVELS: [(u32, &str, &str); 4] = [
    (433930000, "TACT", "Tactical"),
    (433930001, "OPEADM", "Operational Administrative"),
    (433930002, "OPE", "Operational"),
    (433930003, "ESTR", "Strategic"),
];

/// Resolve the catalog level an employee's form-type code selects.
///
/// Returns `None` when the employee carries no form-type code, when the code
/// is not in the fixed table, or when the catalog has no matching level; the
/// caller must then prompt for a manual level selection. Matching is
/// case-insensitive on the level short code first, then on the display name.
pub fn auto_assign_level<'a>(
    employee: &EmployeeRecord,
    levels: &'a [EvaluationLevel],
) -> Option<&'a EvaluationLevel> {
    let form_type = employee.form_type?;
    let (_, code, name) = FORM_TYPE_LEVELS
        .iter()
        .find(|(candidate, _, _)| *candidate == form_type)?;

    levels
        .iter()
        .find(|level| level.code.eq_ignore_ascii_case(code))
        .or_else(|| {
            levels
                .iter()
                .find(|level| level.name.eq_ignore_ascii_case(name))
        })
}
