//! Per-rule tags carried through automaton construction.
//!
//! Every lexer rule tags the transitions that complete one of its matches
//! with a [`Mark`]. When subset construction or minimization folds several
//! NFA paths into one DFA transition, the marks on those paths are merged:
//! plain action marks only merge with themselves, while priority marks
//! always merge in favour of the earlier-declared rule. A failed merge is a
//! [`MarkConflict`] and surfaces as a build error with a witness input path.

use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A tag identifying which rule produced a transition.
///
/// The `action` payload is the user-facing action id; `0` is reserved to
/// mean "no action" (a rule whose matches are consumed silently).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Mark {
    /// A bare action tag. Merges only with an equal tag.
    Action(u32),
    /// An action tag wrapped with its rule's declaration index. Two priority
    /// marks always merge; the smaller `priority` wins.
    Priority { priority: u32, action: u32 },
}

impl Mark {
    /// The action id this mark resolves to.
    #[must_use]
    pub const fn action(self) -> u32 {
        match self {
            Self::Action(action) | Self::Priority { action, .. } => action,
        }
    }

    const fn can_merge_with(self, other: Self) -> bool {
        match (self, other) {
            (Self::Action(a), Self::Action(b)) => a == b,
            (Self::Priority { .. }, Self::Priority { .. }) => true,
            _ => false,
        }
    }

    const fn merge_with(self, other: Self) -> Self {
        match (self, other) {
            (Self::Priority { priority: p, .. }, Self::Priority { priority: q, .. }) => {
                if p <= q {
                    self
                } else {
                    other
                }
            }
            _ => self,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => write!(f, "action {action}"),
            Self::Priority { priority, action } => {
                write!(f, "rule {priority} (action {action})")
            }
        }
    }
}

/// Two marks that refused to merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkConflict {
    pub first: Mark,
    pub second: Mark,
}

/// Merge two optional marks. `None` is the identity; a failed merge reports
/// both operands.
///
/// # Errors
///
/// Returns [`MarkConflict`] when both marks are present and incompatible.
pub fn merge_marks(a: Option<Mark>, b: Option<Mark>) -> Result<Option<Mark>, MarkConflict> {
    match (a, b) {
        (None, other) | (other, None) => Ok(other),
        (Some(first), Some(second)) => {
            if first.can_merge_with(second) {
                Ok(Some(first.merge_with(second)))
            } else {
                Err(MarkConflict { first, second })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let mark = Some(Mark::Action(3));
        assert_eq!(merge_marks(None, mark).unwrap(), mark);
        assert_eq!(merge_marks(mark, None).unwrap(), mark);
        assert_eq!(merge_marks(None, None).unwrap(), None);
    }

    #[test]
    fn equal_actions_merge_to_identity() {
        let mark = Some(Mark::Action(7));
        assert_eq!(merge_marks(mark, mark).unwrap(), mark);
    }

    #[test]
    fn distinct_actions_conflict() {
        let err = merge_marks(Some(Mark::Action(1)), Some(Mark::Action(2))).unwrap_err();
        assert_eq!(err.first, Mark::Action(1));
        assert_eq!(err.second, Mark::Action(2));
    }

    #[test]
    fn earlier_priority_wins() {
        let early = Mark::Priority {
            priority: 0,
            action: 1,
        };
        let late = Mark::Priority {
            priority: 4,
            action: 2,
        };
        assert_eq!(merge_marks(Some(late), Some(early)).unwrap(), Some(early));
        assert_eq!(merge_marks(Some(early), Some(late)).unwrap(), Some(early));
    }

    #[test]
    fn mixed_kinds_conflict() {
        let plain = Mark::Action(1);
        let wrapped = Mark::Priority {
            priority: 0,
            action: 1,
        };
        assert!(merge_marks(Some(plain), Some(wrapped)).is_err());
    }
}
