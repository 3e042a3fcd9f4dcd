//! Access to the shared editor and re-rendering on bus traffic.

use std::rc::Rc;

use mapedit_core::{EditorHandle, Signal, SignalBus, SurfaceHandle};
use yew::prelude::*;

use crate::network::RestFeatureStore;

/// Everything the panels and the map share. Provided once by `App`.
#[derive(Clone, PartialEq)]
pub struct EditorContext {
    pub editor: EditorHandle,
    pub surface: SurfaceHandle,
    pub store: Rc<RestFeatureStore>,
}

impl EditorContext {
    pub fn new(store: RestFeatureStore) -> Self {
        let bus = SignalBus::new();
        // The editor subscribes first so the surface sees its affordance
        // signals after the state that produced them.
        let editor = EditorHandle::new(bus.clone());
        let surface = SurfaceHandle::new(bus);
        Self {
            editor,
            surface,
            store: Rc::new(store),
        }
    }

    pub fn bus(&self) -> &SignalBus {
        self.editor.bus()
    }
}

/// Access `EditorContext`. Panics if no provider ancestor.
#[hook]
pub fn use_editor() -> EditorContext {
    use_context::<EditorContext>().expect("use_editor: EditorContext provider not found")
}

/// Re-renders the calling component whenever `filter` accepts a signal.
/// The subscription lives as long as the component.
#[hook]
pub fn use_signal_refresh<P>(filter: P)
where
    P: Fn(&Signal) -> bool + 'static,
{
    let context = use_editor();
    let trigger = use_force_update();

    use_effect_with(context.bus().clone(), move |bus| {
        let subscription = bus.subscribe(move |signal| {
            if filter(signal) {
                trigger.force_update();
            }
        });
        move || drop(subscription)
    });
}
