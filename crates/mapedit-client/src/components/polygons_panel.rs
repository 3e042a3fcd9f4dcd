//! Polygon create/edit form.

use mapedit_core::{AreaFeature, EditMode, FeatureKind, FeatureRecord, Signal};
use tracing::debug;
use yew::prelude::*;

use crate::hooks::{EditorContext, use_editor, use_signal_refresh};
use crate::util::{async_callback, event_value};

const KIND: FeatureKind = FeatureKind::Area;

#[function_component(PolygonsPanel)]
pub fn polygons_panel() -> Html {
    let context = use_editor();
    use_signal_refresh(|signal| {
        signal.kind() == Some(KIND) || matches!(signal, Signal::OwnerChanged { .. } | Signal::NoticeRaised(_))
    });

    let editor = context.editor.clone();
    let count = editor.read(|e| e.areas().len());
    let session = editor.read(|e| {
        e.session::<AreaFeature>()
            .map(|s| (s.mode(), s.draft().clone(), s.is_saving()))
    });

    let on_toggle = {
        let editor = editor.clone();
        let active = session.is_some();
        Callback::from(move |_: MouseEvent| {
            editor.publish(if active { Signal::Cancel(KIND) } else { Signal::OpenCreate(KIND) });
        })
    };

    let header = html! {
        <div class="panel-header" onclick={on_toggle}>
            <h3>
                { "Polygons" }
                <span class="badge">{ count }</span>
            </h3>
            <button>{ if session.is_some() { "−" } else { "+" } }</button>
        </div>
    };

    let Some((mode, draft, saving)) = session else {
        return html! { <section class="panel">{ header }</section> };
    };

    let on_name = {
        let editor = editor.clone();
        Callback::from(move |e: InputEvent| {
            let value = event_value(&e);
            editor.with(|ed| ed.set_name(KIND, value));
        })
    };
    let on_description = {
        let editor = editor.clone();
        Callback::from(move |e: InputEvent| {
            let value = event_value(&e);
            editor.with(|ed| ed.set_description(KIND, value));
        })
    };
    let on_cancel = {
        let editor = editor.clone();
        Callback::from(move |_: MouseEvent| editor.publish(Signal::Cancel(KIND)))
    };
    let on_save: Callback<MouseEvent> = async_callback(context.clone(), |context: EditorContext| async move {
        match context.editor.save(context.store.as_ref(), KIND).await {
            Ok(outcome) => debug!(?outcome, "polygon save"),
            Err(e) => debug!(error = %e, "polygon save not started"),
        }
    });

    let vertices = draft.geometry.open_outer_ring().len();
    let hint = if vertices == 0 {
        "Click on the map to add corners, then finish the shape.".to_string()
    } else {
        format!("{vertices} corners. Drag them on the map to reshape.")
    };

    html! {
        <section class="panel">
            { header }
            <div class="panel-body">
                <p class="hint">
                    <strong>{ if mode == EditMode::Editing { "Edit polygon" } else { "New polygon" } }</strong>
                    { " · " }{ hint }
                </p>
                <label class="form-row">
                    { "Name" }
                    <input type="text" value={draft.name().to_string()} oninput={on_name} />
                </label>
                <label class="form-row">
                    { "Description" }
                    <textarea
                        rows="3"
                        value={draft.description().unwrap_or_default().to_string()}
                        oninput={on_description}
                    />
                </label>
                <div class="form-actions">
                    <button class="primary" disabled={saving} onclick={on_save}>
                        { if saving { "Saving…" } else { "Save" } }
                    </button>
                    <button onclick={on_cancel}>{ "Cancel" }</button>
                </div>
            </div>
        </section>
    }
}
