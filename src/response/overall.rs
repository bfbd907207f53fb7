use crate::criteria::{CrWithNeNonTarget, ResponseCriteria};
use crate::response::{NonTargetCategory, ResponseCategory};

/// Combinations resolved by protocol convention rather than by RECIST 1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguousRule {
    CrTargetNeNonTarget,
}

impl AmbiguousRule {
    pub fn describe(self) -> &'static str {
        match self {
            Self::CrTargetNeNonTarget => "target CR with non-target NE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverallResponse {
    pub response: ResponseCategory,
    pub ambiguity: Option<AmbiguousRule>,
}

/// Timepoint response from the three component signals (RECIST 1.1 Table 4).
///
/// A new lesion or any PD component overrides everything. CR needs CR in both
/// target and non-target lesions (or no non-target lesions at all), otherwise
/// it is downgraded to PR.
pub fn integrate(
    target: ResponseCategory,
    nontarget: NonTargetCategory,
    new_lesion: bool,
    criteria: &ResponseCriteria,
) -> OverallResponse {
    use NonTargetCategory as N;
    use ResponseCategory as R;

    let (response, ambiguity) = match (target, nontarget, new_lesion) {
        (_, _, true) => (R::Pd, None),
        (R::Pd, _, false) => (R::Pd, None),
        (_, N::Pd, false) => (R::Pd, None),
        (R::Cr, N::Cr | N::NotApplicable, false) => (R::Cr, None),
        (R::Cr, N::NonCrNonPd, false) => (R::Pr, None),
        (R::Cr, N::Ne, false) => {
            let response = match criteria.cr_with_ne_nontarget {
                CrWithNeNonTarget::Pr => R::Pr,
                CrWithNeNonTarget::Ne => R::Ne,
            };
            (response, Some(AmbiguousRule::CrTargetNeNonTarget))
        }
        (R::Pr, _, false) => (R::Pr, None),
        (R::Sd, _, false) => (R::Sd, None),
        (R::Ne, _, false) => (R::Ne, None),
    };

    OverallResponse {
        response,
        ambiguity,
    }
}
