//! The editor coordinator.
//!
//! One value owns the exclusivity controller, the single active edit session,
//! the fetched feature lists and the notice log. It performs no I/O: each
//! operation updates state and queues outgoing signals, which the caller
//! drains with [`Editor::drain_outbox`] and publishes. Store calls are split
//! into `begin_*` (hands out a ticket plus the request) and `finish_*`
//! (applies the response only if the ticket still matches current state).

use tracing::{debug, error, info, warn};

use crate::error::{EditorError, Notice, NoticeLevel, StoreError};
use crate::exclusivity::{ExclusivityController, Owner};
use crate::geometry::{Coord, PolygonGeometry};
use crate::model::{AreaFeature, Feature, FeatureId, FeatureKind, FeatureRecord, PointFeature, SymbolKind};
use crate::session::{EditMode, EditSession, Mutation};
use crate::signal::Signal;

const NOTICE_HISTORY: usize = 32;

/// Which flow, if any, is live. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActiveEditor {
    #[default]
    None,
    Polygon(EditSession<AreaFeature>),
    Object(EditSession<PointFeature>),
}

impl ActiveEditor {
    pub fn kind(&self) -> Option<FeatureKind> {
        match self {
            Self::None => None,
            Self::Polygon(_) => Some(FeatureKind::Area),
            Self::Object(_) => Some(FeatureKind::Point),
        }
    }
}

/// Fetched features of one kind in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCache<F> {
    items: Vec<F>,
    issued: u64,
    applied: u64,
    loaded: bool,
}

impl<F> Default for FeatureCache<F> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            issued: 0,
            applied: 0,
            loaded: false,
        }
    }
}

impl<F: FeatureRecord> FeatureCache<F> {
    pub fn items(&self) -> &[F] {
        &self.items
    }

    pub fn get(&self, id: &FeatureId) -> Option<&F> {
        self.items.iter().find(|f| f.id() == Some(id))
    }

    /// True once any fetch for this kind has completed, successfully or not.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn upsert(&mut self, feature: F) {
        match self.items.iter_mut().find(|f| f.id().is_some() && f.id() == feature.id()) {
            Some(slot) => *slot = feature,
            None => self.items.push(feature),
        }
    }

    fn remove(&mut self, id: &FeatureId) -> bool {
        let before = self.items.len();
        self.items.retain(|f| f.id() != Some(id));
        self.items.len() != before
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCaches {
    pub points: FeatureCache<PointFeature>,
    pub areas: FeatureCache<AreaFeature>,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::model::PointFeature {}
    impl Sealed for crate::model::AreaFeature {}
}

/// Glue between a feature type and its slot in the editor.
pub trait Editable: FeatureRecord + sealed::Sealed {
    #[doc(hidden)]
    fn session(active: &ActiveEditor) -> Option<&EditSession<Self>>;
    #[doc(hidden)]
    fn session_mut(active: &mut ActiveEditor) -> Option<&mut EditSession<Self>>;
    #[doc(hidden)]
    fn activate(session: EditSession<Self>) -> ActiveEditor;
    #[doc(hidden)]
    fn cache(caches: &FeatureCaches) -> &FeatureCache<Self>;
    #[doc(hidden)]
    fn cache_mut(caches: &mut FeatureCaches) -> &mut FeatureCache<Self>;
    /// Affordance shown while this draft is on the surface.
    #[doc(hidden)]
    fn show_affordance(draft: &Self) -> Option<Signal>;
    #[doc(hidden)]
    fn clear_affordance() -> Signal;
}

impl Editable for PointFeature {
    fn session(active: &ActiveEditor) -> Option<&EditSession<Self>> {
        match active {
            ActiveEditor::Object(s) => Some(s),
            _ => None,
        }
    }

    fn session_mut(active: &mut ActiveEditor) -> Option<&mut EditSession<Self>> {
        match active {
            ActiveEditor::Object(s) => Some(s),
            _ => None,
        }
    }

    fn activate(session: EditSession<Self>) -> ActiveEditor {
        ActiveEditor::Object(session)
    }

    fn cache(caches: &FeatureCaches) -> &FeatureCache<Self> {
        &caches.points
    }

    fn cache_mut(caches: &mut FeatureCaches) -> &mut FeatureCache<Self> {
        &mut caches.points
    }

    // Editing a point only moves the camera; the marker appears once it is moved.
    fn show_affordance(_: &Self) -> Option<Signal> {
        None
    }

    fn clear_affordance() -> Signal {
        Signal::ClearTempMarker
    }
}

impl Editable for AreaFeature {
    fn session(active: &ActiveEditor) -> Option<&EditSession<Self>> {
        match active {
            ActiveEditor::Polygon(s) => Some(s),
            _ => None,
        }
    }

    fn session_mut(active: &mut ActiveEditor) -> Option<&mut EditSession<Self>> {
        match active {
            ActiveEditor::Polygon(s) => Some(s),
            _ => None,
        }
    }

    fn activate(session: EditSession<Self>) -> ActiveEditor {
        ActiveEditor::Polygon(session)
    }

    fn cache(caches: &FeatureCaches) -> &FeatureCache<Self> {
        &caches.areas
    }

    fn cache_mut(caches: &mut FeatureCaches) -> &mut FeatureCache<Self> {
        &mut caches.areas
    }

    fn show_affordance(draft: &Self) -> Option<Signal> {
        (!draft.geometry.is_empty()).then(|| Signal::ShowEditingPolygon(draft.geometry.clone()))
    }

    fn clear_affordance() -> Signal {
        Signal::ClearEditingPolygon
    }
}

fn clear_affordance(kind: FeatureKind) -> Signal {
    match kind {
        FeatureKind::Point => PointFeature::clear_affordance(),
        FeatureKind::Area => AreaFeature::clear_affordance(),
    }
}

/// Identifies one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub kind: FeatureKind,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave<F> {
    pub ticket: SaveTicket,
    pub mutation: Mutation<F>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Applied; the session is back to idle.
    Saved,
    /// The store failed; the session keeps its state so the user can retry.
    Failed,
    /// The session that issued the save is gone. Nothing was applied.
    Stale { refetch: bool },
}

impl SaveOutcome {
    /// Whether server state changed and the list for this kind should be fetched again.
    pub fn needs_refetch(self) -> bool {
        matches!(self, Self::Saved | Self::Stale { refetch: true })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: FeatureKind,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Editor {
    exclusivity: ExclusivityController,
    active: ActiveEditor,
    caches: FeatureCaches,
    notices: Vec<Notice>,
    outbox: Vec<Signal>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals queued since the last drain, in emission order.
    pub fn drain_outbox(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, signal: Signal) {
        self.outbox.push(signal);
    }

    /// Routes an inbound bus signal. Signals the editor itself emits are ignored.
    pub fn handle(&mut self, signal: &Signal) {
        match signal {
            Signal::OpenCreate(kind) => self.open_create(*kind),
            Signal::OpenEdit(feature) => self.open_edit(feature.clone()),
            Signal::CoordinatePicked { lat, lon } => self.pick_coordinate(*lat, *lon),
            Signal::RingSet(geometry) => self.set_rings(geometry.clone()),
            Signal::Cancel(kind) => {
                self.cancel(*kind);
            }
            _ => {}
        }
    }

    // ---- queries ----

    pub fn owner(&self) -> Owner {
        self.exclusivity.current()
    }

    pub fn generation(&self) -> u64 {
        self.exclusivity.generation()
    }

    pub fn active(&self) -> &ActiveEditor {
        &self.active
    }

    pub fn mode(&self, kind: FeatureKind) -> EditMode {
        match (&self.active, kind) {
            (ActiveEditor::Polygon(s), FeatureKind::Area) => s.mode(),
            (ActiveEditor::Object(s), FeatureKind::Point) => s.mode(),
            _ => EditMode::Idle,
        }
    }

    /// Whether `kind`'s flow currently owns exclusivity.
    pub fn owns_exclusivity(&self, kind: FeatureKind) -> bool {
        self.exclusivity.current() == kind.owner()
    }

    pub fn session<F: Editable>(&self) -> Option<&EditSession<F>> {
        F::session(&self.active)
    }

    pub fn draft<F: Editable>(&self) -> Option<&F> {
        self.session::<F>().map(EditSession::draft)
    }

    pub fn features<F: Editable>(&self) -> &[F] {
        F::cache(&self.caches).items()
    }

    pub fn cache<F: Editable>(&self) -> &FeatureCache<F> {
        F::cache(&self.caches)
    }

    pub fn points(&self) -> &[PointFeature] {
        self.caches.points.items()
    }

    pub fn areas(&self) -> &[AreaFeature] {
        self.caches.areas.items()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.clear();
    }

    // ---- transitions ----

    /// Installs a new session, displacing whatever flow was live.
    fn enter<F: Editable>(&mut self, make: impl FnOnce(u64) -> Option<EditSession<F>>) -> Option<u64> {
        let owner = F::KIND.owner();
        // The session records the generation its own acquire produces.
        let session = make(self.exclusivity.generation() + 1)?;

        let displaced = std::mem::take(&mut self.active);
        if let Some(kind) = displaced.kind() {
            debug!(%kind, by = %F::KIND, "edit flow displaced");
            self.emit(clear_affordance(kind));
        }

        let previous = self.exclusivity.acquire(owner);
        let generation = self.exclusivity.generation();
        self.active = F::activate(session);
        self.emit(Signal::OwnerChanged {
            previous,
            current: owner,
        });
        Some(generation)
    }

    /// Starts a create flow for `kind`.
    pub fn open_create(&mut self, kind: FeatureKind) {
        match kind {
            FeatureKind::Point => self.open_create_record::<PointFeature>(),
            FeatureKind::Area => self.open_create_record::<AreaFeature>(),
        }
    }

    fn open_create_record<F: Editable>(&mut self) {
        if let Some(generation) = self.enter(|g| Some(EditSession::<F>::creating(g))) {
            debug!(kind = %F::KIND, generation, "create flow opened");
        }
    }

    /// Starts an edit flow on a persisted feature.
    pub fn open_edit(&mut self, feature: Feature) {
        match feature {
            Feature::Point(p) => self.open_edit_record(p),
            Feature::Area(a) => self.open_edit_record(a),
        }
    }

    fn open_edit_record<F: Editable>(&mut self, feature: F) {
        let target = feature.camera_target();
        let Some(generation) = self.enter(|g| EditSession::editing(feature, g)) else {
            warn!(kind = %F::KIND, "edit requested for a feature without id");
            return;
        };
        let show = F::session(&self.active).and_then(|session| {
            debug!(kind = %F::KIND, target = ?session.target(), generation, "edit flow opened");
            F::show_affordance(session.draft())
        });
        if let Some(show) = show {
            self.emit(show);
        }
        if let Some(target) = target {
            self.emit(Signal::FocusCamera {
                target,
                transition: generation,
            });
        }
    }

    /// Abandons `kind`'s flow. Idempotent: emits nothing when that flow is idle.
    pub fn cancel(&mut self, kind: FeatureKind) -> bool {
        if self.active.kind() != Some(kind) {
            return false;
        }
        self.active = ActiveEditor::None;
        self.emit(clear_affordance(kind));
        self.release(kind);
        debug!(%kind, "edit flow cancelled");
        true
    }

    fn release(&mut self, kind: FeatureKind) {
        let owner = kind.owner();
        if self.exclusivity.release(owner) {
            self.emit(Signal::OwnerChanged {
                previous: owner,
                current: Owner::None,
            });
        }
    }

    /// A coordinate picked on the map, latitude first.
    pub fn pick_coordinate(&mut self, lat: f64, lon: f64) {
        self.set_coordinate(Coord::from_lat_lon(lat, lon));
    }

    /// Moves the object draft to `at` and shows the temporary marker there.
    pub fn set_coordinate(&mut self, at: Coord) {
        let Some(session) = PointFeature::session_mut(&mut self.active) else {
            debug!("coordinate ignored, no object flow");
            return;
        };
        session.draft_mut().geometry.0 = at;
        self.emit(Signal::ShowTempMarker(at));
        self.emit(Signal::DraftChanged(FeatureKind::Point));
    }

    /// Replaces the polygon draft's rings with what the draw tool produced.
    pub fn set_rings(&mut self, geometry: PolygonGeometry) {
        let Some(session) = AreaFeature::session_mut(&mut self.active) else {
            debug!("ring set ignored, no polygon flow");
            return;
        };
        let draft = session.draft_mut();
        draft.geometry = geometry;
        let affordance = AreaFeature::show_affordance(draft).unwrap_or_else(AreaFeature::clear_affordance);
        self.emit(affordance);
        self.emit(Signal::DraftChanged(FeatureKind::Area));
    }

    fn edit_draft(&mut self, kind: FeatureKind, apply: impl FnOnce(&mut dyn DraftFields)) {
        let changed = match (&mut self.active, kind) {
            (ActiveEditor::Object(s), FeatureKind::Point) => {
                apply(s.draft_mut());
                true
            }
            (ActiveEditor::Polygon(s), FeatureKind::Area) => {
                apply(s.draft_mut());
                true
            }
            _ => false,
        };
        if changed {
            self.emit(Signal::DraftChanged(kind));
        }
    }

    pub fn set_name(&mut self, kind: FeatureKind, name: impl Into<String>) {
        let name = name.into();
        self.edit_draft(kind, |d| d.put_name(name));
    }

    /// The draft keeps the text as typed; trimming happens when the save request is built.
    pub fn set_description(&mut self, kind: FeatureKind, description: impl Into<String>) {
        let description = description.into();
        let description = (!description.is_empty()).then_some(description);
        self.edit_draft(kind, |d| d.put_description(description));
    }

    pub fn set_symbol_kind(&mut self, symbol: SymbolKind) {
        if let Some(session) = PointFeature::session_mut(&mut self.active) {
            session.draft_mut().symbol_kind = symbol;
            self.emit(Signal::DraftChanged(FeatureKind::Point));
        }
    }

    // ---- save ----

    /// Validates the active draft of `F` and hands out the store request.
    pub fn begin_save<F: Editable>(&mut self) -> Result<PendingSave<F>, EditorError> {
        let Some(session) = F::session_mut(&mut self.active) else {
            return Err(EditorError::NoActiveSession(F::KIND));
        };
        let generation = session.generation();
        match session.start_save() {
            Ok(mutation) => {
                debug!(kind = %F::KIND, generation, "save started");
                self.emit(Signal::DraftChanged(F::KIND));
                Ok(PendingSave {
                    ticket: SaveTicket {
                        kind: F::KIND,
                        generation,
                    },
                    mutation,
                })
            }
            Err(err) => {
                if let EditorError::Validation(validation) = &err {
                    self.raise(Notice::error(format!("Cannot save {}: {validation}", F::KIND)));
                }
                Err(err)
            }
        }
    }

    /// Applies the store's answer to a save started with `ticket`.
    pub fn finish_save<F: Editable>(&mut self, ticket: SaveTicket, result: Result<F, StoreError>) -> SaveOutcome {
        let current = F::session(&self.active).is_some_and(|s| s.generation() == ticket.generation && s.is_saving());
        if !current {
            warn!(kind = %F::KIND, generation = ticket.generation, ok = result.is_ok(), "stale save response discarded");
            return SaveOutcome::Stale {
                refetch: result.is_ok(),
            };
        }

        match result {
            Ok(saved) => {
                self.active = ActiveEditor::None;
                self.emit(F::clear_affordance());
                self.release(F::KIND);
                info!(kind = %F::KIND, id = ?saved.id(), name = saved.name(), "feature saved");
                F::cache_mut(&mut self.caches).upsert(saved.clone());
                self.emit(Signal::FeaturesReplaced(F::KIND));
                self.raise(Notice::info(format!("Saved {} \"{}\"", F::KIND, saved.name())));
                self.emit(Signal::SaveSucceeded(saved.into()));
                SaveOutcome::Saved
            }
            Err(err) => {
                if let Some(session) = F::session_mut(&mut self.active) {
                    session.abort_save();
                }
                self.report(F::KIND, "save", &err);
                SaveOutcome::Failed
            }
        }
    }

    // ---- fetch ----

    pub fn begin_fetch<F: Editable>(&mut self) -> FetchTicket {
        let cache = F::cache_mut(&mut self.caches);
        cache.issued += 1;
        FetchTicket {
            kind: F::KIND,
            seq: cache.issued,
        }
    }

    /// Replaces the cached list wholesale. Returns false when a newer fetch already landed.
    /// A failed fetch keeps the current list (empty on first load) and raises a notice.
    pub fn finish_fetch<F: Editable>(&mut self, ticket: FetchTicket, result: Result<Vec<F>, StoreError>) -> bool {
        let cache = F::cache_mut(&mut self.caches);
        if ticket.seq <= cache.applied {
            debug!(kind = %F::KIND, seq = ticket.seq, applied = cache.applied, "out-of-order fetch ignored");
            return false;
        }
        cache.applied = ticket.seq;
        cache.loaded = true;
        match result {
            Ok(items) => {
                debug!(kind = %F::KIND, count = items.len(), "features replaced");
                cache.items = items;
            }
            Err(err) => self.report(F::KIND, "load", &err),
        }
        self.emit(Signal::FeaturesReplaced(F::KIND));
        true
    }

    // ---- delete ----

    /// Applies the outcome of a delete. On success the feature leaves the list
    /// and any edit flow on it is cancelled. Returns whether a refetch is due.
    pub fn finish_delete<F: Editable>(&mut self, id: &FeatureId, result: Result<(), StoreError>) -> bool {
        if let Err(err) = result {
            self.report(F::KIND, "delete", &err);
            return false;
        }
        let name = F::cache(&self.caches).get(id).map(|f| f.name().to_string());
        F::cache_mut(&mut self.caches).remove(id);
        info!(kind = %F::KIND, %id, "feature deleted");

        if F::session(&self.active).and_then(EditSession::target) == Some(id) {
            self.cancel(F::KIND);
        }
        self.emit(Signal::FeaturesReplaced(F::KIND));
        self.raise(Notice::info(format!(
            "Deleted {} \"{}\"",
            F::KIND,
            name.as_deref().unwrap_or(id.as_str())
        )));
        true
    }

    // ---- notices ----

    pub fn raise(&mut self, notice: Notice) {
        if self.notices.len() == NOTICE_HISTORY {
            self.notices.remove(0);
        }
        self.notices.push(notice.clone());
        self.emit(Signal::NoticeRaised(notice));
    }

    fn report(&mut self, kind: FeatureKind, action: &str, err: &StoreError) {
        match err {
            StoreError::Unexpected(_) => error!(%kind, action, error = %err, "store call failed"),
            _ => warn!(%kind, action, error = %err, "store call failed"),
        }
        let message = match err {
            StoreError::ServiceUnavailable(_) => format!("Could not {action} {kind}: service unavailable"),
            StoreError::NotFound { .. } => format!("Could not {action} {kind}: it no longer exists"),
            StoreError::Rejected(reason) => format!("Could not {action} {kind}: {reason}"),
            StoreError::Unexpected(_) => format!("Could not {action} {kind}: unexpected error"),
        };
        self.raise(Notice {
            level: NoticeLevel::Error,
            message,
        });
    }
}

/// Form fields shared by both drafts.
trait DraftFields {
    fn put_name(&mut self, name: String);
    fn put_description(&mut self, description: Option<String>);
}

impl<F: FeatureRecord> DraftFields for F {
    fn put_name(&mut self, name: String) {
        self.set_name(name);
    }

    fn put_description(&mut self, description: Option<String>) {
        self.set_description(description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn tel_aviv() -> AreaFeature {
        let mut area = AreaFeature::new(
            "Tel Aviv City Center",
            PolygonGeometry::from_outer(vec![
                Coord::new(34.7517, 32.0818),
                Coord::new(34.77, 32.0818),
                Coord::new(34.77, 32.095),
                Coord::new(34.7517, 32.095),
                Coord::new(34.7517, 32.0818),
            ]),
        );
        area.id = Some(FeatureId::new("a1"));
        area
    }

    fn cafe() -> PointFeature {
        let mut p = PointFeature::new("Cafe", Coord::new(34.77, 32.08));
        p.id = Some(FeatureId::new("o1"));
        p
    }

    fn at_most_one_active(editor: &Editor) -> bool {
        let active = FeatureKind::ALL
            .iter()
            .filter(|k| editor.mode(**k).is_active())
            .count();
        active <= 1
    }

    #[test]
    fn test_open_create_acquires() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        assert_eq!(editor.mode(FeatureKind::Point), EditMode::Creating);
        assert_eq!(editor.owner(), Owner::ObjectPanel);
        assert_eq!(editor.draft::<PointFeature>().unwrap().position(), Coord::new(0.0, 0.0));
        assert_eq!(
            editor.drain_outbox(),
            vec![Signal::OwnerChanged {
                previous: Owner::None,
                current: Owner::ObjectPanel
            }]
        );
    }

    #[test]
    fn test_displacement_discards_other_draft() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        editor.set_name(FeatureKind::Point, "Unsaved");
        editor.drain_outbox();

        editor.open_edit(tel_aviv().into());
        assert_eq!(editor.mode(FeatureKind::Point), EditMode::Idle);
        assert!(editor.draft::<PointFeature>().is_none());
        assert_eq!(editor.mode(FeatureKind::Area), EditMode::Editing);
        assert_eq!(editor.owner(), Owner::PolygonPanel);

        let out = editor.drain_outbox();
        let generation = editor.generation();
        assert_eq!(out[0], Signal::ClearTempMarker);
        assert_eq!(
            out[1],
            Signal::OwnerChanged {
                previous: Owner::ObjectPanel,
                current: Owner::PolygonPanel
            }
        );
        assert_eq!(out[2], Signal::ShowEditingPolygon(tel_aviv().geometry));
        assert!(matches!(
            out[3],
            Signal::FocusCamera { target: crate::surface::CameraTarget::Bounds(b), transition }
                if transition == generation && b.min == Coord::new(34.7517, 32.0818)
        ));

        // Opening the same unsaved object flow again starts from scratch.
        editor.open_create(FeatureKind::Point);
        assert_eq!(editor.draft::<PointFeature>().unwrap().name, "");
    }

    #[test]
    fn test_exclusivity_holds_for_any_open_sequence() {
        let mut editor = Editor::new();
        let script: Vec<Signal> = vec![
            Signal::OpenCreate(FeatureKind::Point),
            Signal::OpenCreate(FeatureKind::Area),
            Signal::OpenEdit(cafe().into()),
            Signal::OpenEdit(tel_aviv().into()),
            Signal::OpenCreate(FeatureKind::Area),
            Signal::Cancel(FeatureKind::Point),
            Signal::OpenEdit(cafe().into()),
        ];
        for signal in &script {
            editor.handle(signal);
            assert!(at_most_one_active(&editor));
            let expected = editor.active().kind().map_or(Owner::None, FeatureKind::owner);
            assert_eq!(editor.owner(), expected);
        }
        assert_eq!(editor.mode(FeatureKind::Point), EditMode::Editing);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut editor = Editor::new();
        assert!(!editor.cancel(FeatureKind::Area));
        assert!(editor.drain_outbox().is_empty());
        assert_eq!(editor.generation(), 0);

        editor.open_create(FeatureKind::Area);
        editor.drain_outbox();
        assert!(editor.cancel(FeatureKind::Area));
        assert_eq!(
            editor.drain_outbox(),
            vec![
                Signal::ClearEditingPolygon,
                Signal::OwnerChanged {
                    previous: Owner::PolygonPanel,
                    current: Owner::None
                }
            ]
        );
        assert!(!editor.cancel(FeatureKind::Area));
        assert!(editor.drain_outbox().is_empty());
    }

    #[test]
    fn test_cancel_other_kind_does_nothing() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Area);
        editor.drain_outbox();
        assert!(!editor.cancel(FeatureKind::Point));
        assert!(editor.drain_outbox().is_empty());
        assert_eq!(editor.mode(FeatureKind::Area), EditMode::Creating);
    }

    #[test]
    fn test_pick_coordinate_is_lat_lon() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        editor.drain_outbox();

        editor.handle(&Signal::CoordinatePicked { lat: 32.08, lon: 34.77 });
        assert_eq!(
            editor.draft::<PointFeature>().unwrap().position(),
            Coord::new(34.77, 32.08)
        );
        assert_eq!(
            editor.drain_outbox(),
            vec![
                Signal::ShowTempMarker(Coord::new(34.77, 32.08)),
                Signal::DraftChanged(FeatureKind::Point)
            ]
        );
    }

    #[test]
    fn test_geometry_for_inactive_kind_is_ignored() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Area);
        editor.drain_outbox();
        editor.pick_coordinate(1.0, 2.0);
        editor.set_symbol_kind(SymbolKind::Beach);
        assert!(editor.drain_outbox().is_empty());

        let ring = PolygonGeometry::from_outer(vec![Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(1.0, 1.0)]);
        editor.handle(&Signal::RingSet(ring.clone()));
        assert_eq!(editor.draft::<AreaFeature>().unwrap().geometry, ring);
    }

    #[test]
    fn test_empty_ring_set_clears_overlay() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Area);
        editor.set_rings(tel_aviv().geometry);
        editor.drain_outbox();

        editor.set_rings(PolygonGeometry { rings: vec![] });
        assert!(editor.draft::<AreaFeature>().unwrap().geometry.is_empty());
        assert_eq!(
            editor.drain_outbox(),
            vec![Signal::ClearEditingPolygon, Signal::DraftChanged(FeatureKind::Area)]
        );

        editor.set_rings(tel_aviv().geometry);
        assert_eq!(
            editor.drain_outbox(),
            vec![
                Signal::ShowEditingPolygon(tel_aviv().geometry),
                Signal::DraftChanged(FeatureKind::Area)
            ]
        );
    }

    #[test]
    fn test_field_edits() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        editor.set_name(FeatureKind::Point, "Pier");
        editor.set_description(FeatureKind::Point, " ");
        editor.set_symbol_kind(SymbolKind::Beach);
        let draft = editor.draft::<PointFeature>().unwrap();
        assert_eq!(draft.name, "Pier");
        assert_eq!(draft.description.as_deref(), Some(" "));
        assert_eq!(draft.symbol_kind, SymbolKind::Beach);

        editor.set_description(FeatureKind::Point, "");
        assert_eq!(editor.draft::<PointFeature>().unwrap().description, None);

        editor.set_description(FeatureKind::Point, "On the water");
        assert_eq!(
            editor.draft::<PointFeature>().unwrap().description.as_deref(),
            Some("On the water")
        );
        // Edits addressed to the idle kind go nowhere.
        editor.drain_outbox();
        editor.set_name(FeatureKind::Area, "Ghost");
        assert!(editor.drain_outbox().is_empty());
    }

    #[test]
    fn test_validation_blocks_save() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Area);
        editor.set_name(FeatureKind::Area, "Park");
        editor.drain_outbox();

        let err = editor.begin_save::<AreaFeature>().unwrap_err();
        assert_eq!(err, EditorError::Validation(ValidationError::MissingGeometry));
        assert_eq!(editor.mode(FeatureKind::Area), EditMode::Creating);
        assert_eq!(editor.latest_notice().unwrap().level, NoticeLevel::Error);
        assert!(matches!(editor.drain_outbox().as_slice(), [Signal::NoticeRaised(_)]));
    }

    #[test]
    fn test_save_without_session() {
        let mut editor = Editor::new();
        assert_eq!(
            editor.begin_save::<PointFeature>().unwrap_err(),
            EditorError::NoActiveSession(FeatureKind::Point)
        );
    }

    #[test]
    fn test_second_save_while_in_flight() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        editor.set_name(FeatureKind::Point, "Cafe");
        editor.begin_save::<PointFeature>().unwrap();
        assert_eq!(
            editor.begin_save::<PointFeature>().unwrap_err(),
            EditorError::SaveInFlight
        );
    }

    #[test]
    fn test_begin_save_refreshes_form() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        editor.set_name(FeatureKind::Point, "Cafe");
        editor.drain_outbox();

        editor.begin_save::<PointFeature>().unwrap();
        assert!(editor.session::<PointFeature>().unwrap().is_saving());
        assert_eq!(editor.drain_outbox(), vec![Signal::DraftChanged(FeatureKind::Point)]);
    }

    #[test]
    fn test_description_trimmed_only_on_save() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        editor.set_name(FeatureKind::Point, "Cafe");
        editor.set_description(FeatureKind::Point, " ");
        editor.set_description(FeatureKind::Point, " Espresso bar ");
        assert_eq!(
            editor.draft::<PointFeature>().unwrap().description.as_deref(),
            Some(" Espresso bar ")
        );

        let pending = editor.begin_save::<PointFeature>().unwrap();
        assert_eq!(pending.mutation.draft().description.as_deref(), Some("Espresso bar"));
        assert_eq!(
            editor.draft::<PointFeature>().unwrap().description.as_deref(),
            Some(" Espresso bar ")
        );
    }

    #[test]
    fn test_blank_description_saved_as_absent() {
        let mut editor = Editor::new();
        editor.open_edit(tel_aviv().into());
        editor.set_description(FeatureKind::Area, "  \n ");
        let pending = editor.begin_save::<AreaFeature>().unwrap();
        assert_eq!(pending.mutation.draft().description, None);
    }

    #[test]
    fn test_save_success_returns_to_idle() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Point);
        editor.pick_coordinate(32.08, 34.77);
        editor.set_name(FeatureKind::Point, "Cafe");
        let pending = editor.begin_save::<PointFeature>().unwrap();
        editor.drain_outbox();

        let mut stored = pending.mutation.draft().clone();
        stored.id = Some(FeatureId::new("X"));
        let outcome = editor.finish_save(pending.ticket, Ok(stored.clone()));

        assert_eq!(outcome, SaveOutcome::Saved);
        assert!(outcome.needs_refetch());
        assert_eq!(editor.mode(FeatureKind::Point), EditMode::Idle);
        assert_eq!(editor.owner(), Owner::None);
        assert_eq!(editor.points(), &[stored.clone()]);

        let out = editor.drain_outbox();
        assert_eq!(out[0], Signal::ClearTempMarker);
        assert!(out.contains(&Signal::SaveSucceeded(stored.into())));
    }

    #[test]
    fn test_save_failure_keeps_session() {
        let mut editor = Editor::new();
        editor.open_edit(cafe().into());
        editor.set_name(FeatureKind::Point, "Renamed");
        let pending = editor.begin_save::<PointFeature>().unwrap();

        let outcome = editor.finish_save::<PointFeature>(
            pending.ticket,
            Err(StoreError::NotFound {
                kind: FeatureKind::Point,
                id: FeatureId::new("o1"),
            }),
        );
        assert_eq!(outcome, SaveOutcome::Failed);
        assert_eq!(editor.mode(FeatureKind::Point), EditMode::Editing);
        assert_eq!(editor.draft::<PointFeature>().unwrap().name, "Renamed");
        assert!(!editor.session::<PointFeature>().unwrap().is_saving());
        assert!(editor.latest_notice().unwrap().message.contains("no longer exists"));

        // Retry is allowed.
        assert!(editor.begin_save::<PointFeature>().is_ok());
    }

    #[test]
    fn test_stale_save_is_discarded() {
        let mut editor = Editor::new();
        editor.open_create(FeatureKind::Area);
        editor.set_name(FeatureKind::Area, "Old");
        editor.set_rings(tel_aviv().geometry);
        let pending = editor.begin_save::<AreaFeature>().unwrap();

        // User cancels and starts over before the response lands.
        editor.cancel(FeatureKind::Area);
        editor.open_create(FeatureKind::Area);
        editor.set_name(FeatureKind::Area, "New");
        editor.drain_outbox();

        let mut stored = pending.mutation.draft().clone();
        stored.id = Some(FeatureId::new("a9"));
        let outcome = editor.finish_save(pending.ticket, Ok(stored));
        assert_eq!(outcome, SaveOutcome::Stale { refetch: true });
        assert_eq!(editor.mode(FeatureKind::Area), EditMode::Creating);
        assert_eq!(editor.draft::<AreaFeature>().unwrap().name, "New");
        assert!(editor.areas().is_empty());
        assert!(editor.drain_outbox().is_empty());

        let failed = editor.finish_save::<AreaFeature>(pending.ticket, Err(StoreError::Unexpected("x".into())));
        assert_eq!(failed, SaveOutcome::Stale { refetch: false });
        assert!(!failed.needs_refetch());
    }

    #[test]
    fn test_fetch_order_and_degradation() {
        let mut editor = Editor::new();
        let older = editor.begin_fetch::<AreaFeature>();
        let newer = editor.begin_fetch::<AreaFeature>();

        assert!(editor.finish_fetch(newer, Ok(vec![tel_aviv()])));
        assert!(!editor.finish_fetch::<AreaFeature>(older, Ok(vec![])));
        assert_eq!(editor.areas().len(), 1);

        let failing = editor.begin_fetch::<AreaFeature>();
        assert!(editor.finish_fetch::<AreaFeature>(
            failing,
            Err(StoreError::ServiceUnavailable("down".into()))
        ));
        assert_eq!(editor.areas().len(), 1);
        assert!(editor.latest_notice().unwrap().message.contains("service unavailable"));

        let points = editor.begin_fetch::<PointFeature>();
        editor.finish_fetch::<PointFeature>(points, Err(StoreError::ServiceUnavailable("down".into())));
        assert!(editor.points().is_empty());
        assert!(editor.cache::<PointFeature>().is_loaded());
    }

    #[test]
    fn test_delete_cancels_matching_edit() {
        let mut editor = Editor::new();
        let t = editor.begin_fetch::<AreaFeature>();
        editor.finish_fetch(t, Ok(vec![tel_aviv()]));
        editor.open_edit(tel_aviv().into());
        editor.drain_outbox();

        assert!(editor.finish_delete::<AreaFeature>(&FeatureId::new("a1"), Ok(())));
        assert!(editor.areas().is_empty());
        assert_eq!(editor.mode(FeatureKind::Area), EditMode::Idle);
        assert_eq!(editor.owner(), Owner::None);
        assert!(editor.latest_notice().unwrap().message.contains("Tel Aviv City Center"));
    }

    #[test]
    fn test_delete_failure_keeps_list() {
        let mut editor = Editor::new();
        let t = editor.begin_fetch::<PointFeature>();
        editor.finish_fetch(t, Ok(vec![cafe()]));
        assert!(!editor.finish_delete::<PointFeature>(
            &FeatureId::new("o1"),
            Err(StoreError::ServiceUnavailable("down".into()))
        ));
        assert_eq!(editor.points().len(), 1);
    }

    #[test]
    fn test_edit_without_id_is_ignored() {
        let mut editor = Editor::new();
        editor.open_edit(PointFeature::new("Draft", Coord::default()).into());
        assert_eq!(editor.owner(), Owner::None);
        assert!(editor.drain_outbox().is_empty());
    }
}
