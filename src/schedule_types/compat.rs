use super::ScheduleType;
use super::units::units_for;
use crate::model::schedule::ScheduleTypeLimits;

/// How strictly open bounds of a requirement are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stringency {
    /// A requirement without a bound accepts candidates with any bound on that side.
    #[default]
    Lenient,
    /// A requirement without a bound rejects candidates that set one on that side.
    Strict,
}

/// Whether `candidate` can serve as limits for a schedule used where `requirement` applies.
///
/// Continuous/discrete mismatches are not checked.
pub fn is_compatible(requirement: &ScheduleType, candidate: &ScheduleTypeLimits) -> bool {
    is_compatible_with(requirement, candidate, Stringency::Lenient)
}

pub fn is_compatible_with(
    requirement: &ScheduleType,
    candidate: &ScheduleTypeLimits,
    stringency: Stringency,
) -> bool {
    if units_for(&requirement.unit_type) != units_for(candidate.unit_type()) {
        return false;
    }
    let strict = stringency == Stringency::Strict;

    match (requirement.lower_limit_value, candidate.lower_limit_value) {
        (Some(req), Some(cand)) if cand < req => return false,
        (Some(_), None) => return false,
        (None, Some(_)) if strict => return false,
        _ => {}
    }
    match (requirement.upper_limit_value, candidate.upper_limit_value) {
        (Some(req), Some(cand)) if cand > req => return false,
        (Some(_), None) => return false,
        (None, Some(_)) if strict => return false,
        _ => {}
    }
    true
}
