//! Per-kind edit session: the draft being composed and how it was entered.

use crate::error::EditorError;
use crate::model::{FeatureId, FeatureRecord};

/// Observable mode of one kind's edit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Idle,
    Creating,
    Editing,
}

impl EditMode {
    pub fn is_active(self) -> bool {
        self != Self::Idle
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Creating,
    Editing { target: FeatureId },
}

/// What a save sends to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<F> {
    Create(F),
    Update(FeatureId, F),
}

impl<F> Mutation<F> {
    pub fn draft(&self) -> &F {
        match self {
            Self::Create(draft) | Self::Update(_, draft) => draft,
        }
    }
}

/// A live create or edit flow. Dropping the session discards its draft.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession<F> {
    entry: Entry,
    draft: F,
    generation: u64,
    saving: bool,
}

impl<F: FeatureRecord> EditSession<F> {
    /// Create flow seeded with a blank draft.
    pub fn creating(generation: u64) -> Self {
        Self {
            entry: Entry::Creating,
            draft: F::blank(),
            generation,
            saving: false,
        }
    }

    /// Edit flow on a persisted feature. `None` if the feature has no id yet.
    pub fn editing(feature: F, generation: u64) -> Option<Self> {
        let target = feature.id()?.clone();
        Some(Self {
            entry: Entry::Editing { target },
            draft: feature,
            generation,
            saving: false,
        })
    }

    pub fn mode(&self) -> EditMode {
        match self.entry {
            Entry::Creating => EditMode::Creating,
            Entry::Editing { .. } => EditMode::Editing,
        }
    }

    /// Id of the feature under edit; set iff the mode is `Editing`.
    pub fn target(&self) -> Option<&FeatureId> {
        match &self.entry {
            Entry::Creating => None,
            Entry::Editing { target } => Some(target),
        }
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    pub(crate) fn draft_mut(&mut self) -> &mut F {
        &mut self.draft
    }

    /// Exclusivity generation at which the session was entered.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Validates the draft and marks a save in flight. The request carries a trimmed description.
    pub(crate) fn start_save(&mut self) -> Result<Mutation<F>, EditorError> {
        if self.saving {
            return Err(EditorError::SaveInFlight);
        }
        self.draft.validate()?;
        self.saving = true;
        let mut draft = self.draft.clone();
        let description = draft
            .description()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        draft.set_description(description);
        Ok(match &self.entry {
            Entry::Creating => Mutation::Create(draft),
            Entry::Editing { target } => {
                draft.set_id(Some(target.clone()));
                Mutation::Update(target.clone(), draft)
            }
        })
    }

    pub(crate) fn abort_save(&mut self) {
        self.saving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::geometry::{Coord, PolygonGeometry};
    use crate::model::{AreaFeature, PointFeature};

    #[test]
    fn test_creating_starts_blank() {
        let session = EditSession::<PointFeature>::creating(3);
        assert_eq!(session.mode(), EditMode::Creating);
        assert_eq!(session.target(), None);
        assert_eq!(session.draft().position(), Coord::new(0.0, 0.0));
        assert_eq!(session.generation(), 3);
    }

    #[test]
    fn test_editing_requires_id() {
        let unsaved = AreaFeature::new("Park", PolygonGeometry::empty());
        assert!(EditSession::editing(unsaved.clone(), 1).is_none());

        let mut saved = unsaved;
        saved.id = Some(FeatureId::new("p1"));
        let session = EditSession::editing(saved, 1).unwrap();
        assert_eq!(session.mode(), EditMode::Editing);
        assert_eq!(session.target(), Some(&FeatureId::new("p1")));
    }

    #[test]
    fn test_start_save_validates_and_sequences() {
        let mut session = EditSession::<PointFeature>::creating(1);
        assert_eq!(
            session.start_save(),
            Err(EditorError::Validation(ValidationError::MissingName))
        );
        assert!(!session.is_saving());

        session.draft_mut().name = "Cafe".to_string();
        let mutation = session.start_save().unwrap();
        assert!(matches!(mutation, Mutation::Create(ref p) if p.name == "Cafe"));
        assert_eq!(session.start_save(), Err(EditorError::SaveInFlight));

        session.abort_save();
        assert!(session.start_save().is_ok());
    }

    #[test]
    fn test_update_carries_target_id() {
        let mut feature = PointFeature::new("Pier", Coord::new(1.0, 2.0));
        feature.id = Some(FeatureId::new("o9"));
        let mut session = EditSession::editing(feature, 1).unwrap();
        session.draft_mut().id = None;

        match session.start_save().unwrap() {
            Mutation::Update(id, draft) => {
                assert_eq!(id, FeatureId::new("o9"));
                assert_eq!(draft.id, Some(FeatureId::new("o9")));
            }
            Mutation::Create(_) => panic!("expected update"),
        }
    }
}
