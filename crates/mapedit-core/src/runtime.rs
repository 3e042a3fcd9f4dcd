//! Wiring between the sans-IO editor, the bus and a store.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::bus::{SignalBus, Subscription};
use crate::editor::{Editable, Editor, SaveOutcome};
use crate::error::EditorError;
use crate::geometry::{Coord, PolygonGeometry};
use crate::model::{AreaFeature, Feature, FeatureId, FeatureKind, PointFeature};
use crate::session::Mutation;
use crate::signal::Signal;
use crate::store::FeatureStore;
use crate::surface::{CameraMove, Surface};

/// Shared editor bound to a bus.
///
/// Inbound bus signals are fed to the editor; whatever the editor queues is
/// published after its borrow is released, so subscribers may read the editor
/// from their handlers.
#[derive(Clone)]
pub struct EditorHandle {
    editor: Rc<RefCell<Editor>>,
    bus: SignalBus,
    _inbound: Rc<Subscription>,
}

impl PartialEq for EditorHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.editor, &other.editor)
    }
}

impl std::fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHandle").field("bus", &self.bus).finish_non_exhaustive()
    }
}

impl EditorHandle {
    pub fn new(bus: SignalBus) -> Self {
        let editor = Rc::new(RefCell::new(Editor::new()));

        let weak_editor = Rc::downgrade(&editor);
        let weak_bus = bus.downgrade();
        let inbound = bus.subscribe(move |signal| {
            let (Some(editor), Some(bus)) = (weak_editor.upgrade(), weak_bus.upgrade()) else {
                return;
            };
            let outgoing = match editor.try_borrow_mut() {
                Ok(mut editor) => {
                    editor.handle(signal);
                    editor.drain_outbox()
                }
                Err(_) => {
                    warn!(signal = signal.name(), "editor busy, signal dropped");
                    return;
                }
            };
            for signal in outgoing {
                bus.publish(signal);
            }
        });

        Self {
            editor,
            bus,
            _inbound: Rc::new(inbound),
        }
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    pub fn publish(&self, signal: Signal) {
        self.bus.publish(signal);
    }

    /// Runs `f` on the editor, then publishes what it queued.
    pub fn with<R>(&self, f: impl FnOnce(&mut Editor) -> R) -> R {
        let (result, outgoing) = {
            let mut editor = self.editor.borrow_mut();
            let result = f(&mut editor);
            (result, editor.drain_outbox())
        };
        for signal in outgoing {
            self.bus.publish(signal);
        }
        result
    }

    pub fn read<R>(&self, f: impl FnOnce(&Editor) -> R) -> R {
        f(&self.editor.borrow())
    }

    /// Saves the active draft of `kind` and refetches on success.
    pub async fn save<S: FeatureStore>(&self, store: &S, kind: FeatureKind) -> Result<SaveOutcome, EditorError> {
        match kind {
            FeatureKind::Point => self.save_record::<PointFeature, S>(store).await,
            FeatureKind::Area => self.save_record::<AreaFeature, S>(store).await,
        }
    }

    async fn save_record<F: Editable, S: FeatureStore>(&self, store: &S) -> Result<SaveOutcome, EditorError> {
        let pending = self.with(Editor::begin_save::<F>)?;
        let result = match &pending.mutation {
            Mutation::Create(draft) => store.create(draft).await,
            Mutation::Update(id, draft) => store.update(id, draft).await,
        };
        let outcome = self.with(|editor| editor.finish_save(pending.ticket, result));
        debug!(kind = %F::KIND, ?outcome, "save finished");
        if outcome.needs_refetch() {
            self.refresh_record::<F, S>(store).await;
        }
        Ok(outcome)
    }

    /// Replaces the cached list of `kind` with the server's.
    pub async fn refresh<S: FeatureStore>(&self, store: &S, kind: FeatureKind) {
        match kind {
            FeatureKind::Point => self.refresh_record::<PointFeature, S>(store).await,
            FeatureKind::Area => self.refresh_record::<AreaFeature, S>(store).await,
        }
    }

    async fn refresh_record<F: Editable, S: FeatureStore>(&self, store: &S) {
        let ticket = self.with(Editor::begin_fetch::<F>);
        let result = store.fetch_all::<F>().await;
        self.with(|editor| editor.finish_fetch(ticket, result));
    }

    /// Initial load: areas, then points. Failures degrade to empty lists.
    pub async fn load_all<S: FeatureStore>(&self, store: &S) {
        self.refresh(store, FeatureKind::Area).await;
        self.refresh(store, FeatureKind::Point).await;
    }

    /// Deletes feature `id` of `kind`, then refetches. Returns whether it was deleted.
    pub async fn delete<S: FeatureStore>(&self, store: &S, kind: FeatureKind, id: &FeatureId) -> bool {
        match kind {
            FeatureKind::Point => self.delete_record::<PointFeature, S>(store, id).await,
            FeatureKind::Area => self.delete_record::<AreaFeature, S>(store, id).await,
        }
    }

    async fn delete_record<F: Editable, S: FeatureStore>(&self, store: &S, id: &FeatureId) -> bool {
        let result = store.delete::<F>(id).await;
        let deleted = self.with(|editor| editor.finish_delete::<F>(id, result));
        if deleted {
            self.refresh_record::<F, S>(store).await;
        }
        deleted
    }
}

/// Shared surface model bound to a bus.
#[derive(Clone)]
pub struct SurfaceHandle {
    surface: Rc<RefCell<Surface>>,
    bus: SignalBus,
    _inbound: Rc<Subscription>,
}

impl PartialEq for SurfaceHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.surface, &other.surface)
    }
}

impl SurfaceHandle {
    pub fn new(bus: SignalBus) -> Self {
        let surface = Rc::new(RefCell::new(Surface::new()));
        let weak = Rc::downgrade(&surface);
        let inbound = bus.subscribe(move |signal| {
            if let Some(surface) = weak.upgrade() {
                if let Ok(mut surface) = surface.try_borrow_mut() {
                    surface.handle(signal);
                }
            }
        });
        Self {
            surface,
            bus,
            _inbound: Rc::new(inbound),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&Surface) -> R) -> R {
        f(&self.surface.borrow())
    }

    fn emit(&self, signal: Option<Signal>) -> bool {
        match signal {
            Some(signal) => {
                self.bus.publish(signal);
                true
            }
            None => false,
        }
    }

    /// Returns whether the click was forwarded.
    pub fn click_map(&self, at: Coord) -> bool {
        let signal = self.surface.borrow().click_map(at);
        self.emit(signal)
    }

    pub fn draw_finished(&self, geometry: PolygonGeometry) -> bool {
        let signal = self.surface.borrow().draw_finished(geometry);
        self.emit(signal)
    }

    pub fn draw_edited(&self, geometry: PolygonGeometry) -> bool {
        let signal = self.surface.borrow().draw_edited(geometry);
        self.emit(signal)
    }

    /// Returns whether the click opened an edit.
    pub fn click_feature(&self, feature: &Feature) -> bool {
        let Some(signals) = self.surface.borrow().click_feature(feature) else {
            return false;
        };
        for signal in signals {
            self.bus.publish(signal);
        }
        true
    }

    pub fn take_camera_move(&self) -> Option<CameraMove> {
        self.surface.borrow_mut().take_camera_move()
    }
}
