//! Main application component.

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::{MapDataPanel, MapSurface, NoticeToast, ObjectsPanel, PolygonsPanel};
use crate::config::API_BASE_URL;
use crate::hooks::EditorContext;
use crate::network::RestFeatureStore;

#[function_component(App)]
pub fn app() -> Html {
    let context = use_memo((), |_| EditorContext::new(RestFeatureStore::new(API_BASE_URL)));

    // Initial load: areas, then points.
    {
        let context = context.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                context.editor.load_all(context.store.as_ref()).await;
                tracing::info!(
                    polygons = context.editor.read(|e| e.areas().len()),
                    map_objects = context.editor.read(|e| e.points().len()),
                    "Initial load finished"
                );
            });
            || ()
        });
    }

    html! {
        <ContextProvider<EditorContext> context={(*context).clone()}>
            <div class="app">
                <aside class="sidebar">
                    <PolygonsPanel />
                    <ObjectsPanel />
                    <MapDataPanel />
                </aside>
                <main class="map-area">
                    <MapSurface />
                </main>
            </div>
            <NoticeToast />
        </ContextProvider<EditorContext>>
    }
}
