//! Which edit flow currently owns the expanded editing region.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::FeatureKind;

/// Owner of the editing region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    None,
    PolygonPanel,
    ObjectPanel,
}

impl Owner {
    /// The feature kind edited by this owner.
    pub fn kind(self) -> Option<FeatureKind> {
        match self {
            Self::None => None,
            Self::PolygonPanel => Some(FeatureKind::Area),
            Self::ObjectPanel => Some(FeatureKind::Point),
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::PolygonPanel => "polygon-panel",
            Self::ObjectPanel => "object-panel",
        })
    }
}

/// Process-wide ownership record.
///
/// The controller only records ownership. Displacing the previous owner is
/// the caller's job, driven by the value `acquire` returns.
///
/// Every effective change bumps a generation counter; work started under one
/// generation can tell it has been superseded.
#[derive(Debug, Default)]
pub struct ExclusivityController {
    owner: Owner,
    generation: u64,
}

impl ExclusivityController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the owner unconditionally and returns the previous one.
    pub fn acquire(&mut self, owner: Owner) -> Owner {
        let previous = std::mem::replace(&mut self.owner, owner);
        self.generation += 1;
        previous
    }

    /// Clears the owner only if it is still `owner`. Returns whether it did.
    pub fn release(&mut self, owner: Owner) -> bool {
        if owner.is_none() || self.owner != owner {
            return false;
        }
        self.owner = Owner::None;
        self.generation += 1;
        true
    }

    pub fn current(&self) -> Owner {
        self.owner
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_returns_previous() {
        let mut ctl = ExclusivityController::new();
        assert_eq!(ctl.acquire(Owner::PolygonPanel), Owner::None);
        assert_eq!(ctl.acquire(Owner::ObjectPanel), Owner::PolygonPanel);
        assert_eq!(ctl.current(), Owner::ObjectPanel);
    }

    #[test]
    fn test_stale_release_is_noop() {
        let mut ctl = ExclusivityController::new();
        ctl.acquire(Owner::PolygonPanel);
        ctl.acquire(Owner::ObjectPanel);
        let generation = ctl.generation();

        // The polygon flow lost ownership; its late release must not clobber the object flow.
        assert!(!ctl.release(Owner::PolygonPanel));
        assert_eq!(ctl.current(), Owner::ObjectPanel);
        assert_eq!(ctl.generation(), generation);

        assert!(ctl.release(Owner::ObjectPanel));
        assert_eq!(ctl.current(), Owner::None);
        assert!(ctl.generation() > generation);
    }

    #[test]
    fn test_release_none_is_noop() {
        let mut ctl = ExclusivityController::new();
        assert!(!ctl.release(Owner::None));
        assert_eq!(ctl.generation(), 0);
    }

    #[test]
    fn test_reacquire_same_owner_bumps_generation() {
        let mut ctl = ExclusivityController::new();
        ctl.acquire(Owner::ObjectPanel);
        let g = ctl.generation();
        assert_eq!(ctl.acquire(Owner::ObjectPanel), Owner::ObjectPanel);
        assert_eq!(ctl.generation(), g + 1);
    }

    #[test]
    fn test_owner_kind() {
        assert_eq!(Owner::None.kind(), None);
        assert_eq!(Owner::PolygonPanel.kind(), Some(FeatureKind::Area));
        assert_eq!(Owner::ObjectPanel.kind(), Some(FeatureKind::Point));
    }
}
