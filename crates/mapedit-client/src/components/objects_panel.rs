//! Map object create/edit form.

use mapedit_core::{Coord, EditMode, FeatureKind, FeatureRecord, PointFeature, Signal, SymbolKind};
use tracing::debug;
use yew::prelude::*;

use crate::components::symbol_style;
use crate::hooks::{EditorContext, use_editor, use_signal_refresh};
use crate::util::{async_callback, event_value};

const KIND: FeatureKind = FeatureKind::Point;

#[derive(Clone, Copy, PartialEq)]
enum Axis {
    Lat,
    Lon,
}

#[function_component(ObjectsPanel)]
pub fn objects_panel() -> Html {
    let context = use_editor();
    use_signal_refresh(|signal| {
        signal.kind() == Some(KIND) || matches!(signal, Signal::OwnerChanged { .. } | Signal::NoticeRaised(_))
    });

    let editor = context.editor.clone();
    let count = editor.read(|e| e.points().len());
    let session = editor.read(|e| {
        e.session::<PointFeature>()
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
                { "Map objects" }
                <span class="badge">{ count }</span>
            </h3>
            <button>{ if session.is_some() { "−" } else { "+" } }</button>
        </div>
    };

    let Some((mode, draft, saving)) = session else {
        return html! { <section class="panel">{ header }</section> };
    };

    let position = draft.position();

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
    let on_symbol = {
        let editor = editor.clone();
        Callback::from(move |e: Event| {
            let symbol = SymbolKind::parse(&event_value(&e));
            editor.with(|ed| ed.set_symbol_kind(symbol));
        })
    };
    // Committed on change, not per keystroke, so partial input like "31." survives.
    let on_axis = |axis: Axis| {
        let editor = editor.clone();
        Callback::from(move |e: Event| {
            let Ok(value) = event_value(&e).trim().parse::<f64>() else {
                return;
            };
            let at = match axis {
                Axis::Lat => Coord::new(position.lon, value),
                Axis::Lon => Coord::new(value, position.lat),
            };
            editor.with(|ed| ed.set_coordinate(at));
        })
    };
    let on_cancel = {
        let editor = editor.clone();
        Callback::from(move |_: MouseEvent| editor.publish(Signal::Cancel(KIND)))
    };
    let on_save: Callback<MouseEvent> = async_callback(context.clone(), |context: EditorContext| async move {
        match context.editor.save(context.store.as_ref(), KIND).await {
            Ok(outcome) => debug!(?outcome, "map object save"),
            Err(e) => debug!(error = %e, "map object save not started"),
        }
    });

    let style = symbol_style(draft.symbol_kind);

    html! {
        <section class="panel">
            { header }
            <div class="panel-body">
                <p class="hint">
                    <strong>{ if mode == EditMode::Editing { "Edit map object" } else { "New map object" } }</strong>
                    { " · Click on the map to place it, or enter coordinates." }
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
                <label class="form-row">
                    <span>
                        { "Symbol " }
                        <span style={format!("color: {}", style.color)}>{ style.glyph }</span>
                    </span>
                    <select onchange={on_symbol}>
                        { for SymbolKind::ALL.iter().map(|kind| html! {
                            <option value={kind.as_str()} selected={*kind == draft.symbol_kind}>
                                { kind.as_str() }
                            </option>
                        }) }
                    </select>
                </label>
                <div class="form-grid">
                    <label class="form-row">
                        { "Latitude" }
                        <input type="number" step="any" value={format!("{:.6}", position.lat)} onchange={on_axis(Axis::Lat)} />
                    </label>
                    <label class="form-row">
                        { "Longitude" }
                        <input type="number" step="any" value={format!("{:.6}", position.lon)} onchange={on_axis(Axis::Lon)} />
                    </label>
                </div>
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
