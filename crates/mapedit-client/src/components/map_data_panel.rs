//! Read-only tables of the fetched features with edit and delete triggers.

use mapedit_core::{AreaFeature, Feature, FeatureId, FeatureKind, FeatureRecord, PointFeature, Signal};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::{Modal, symbol_style};
use crate::hooks::{use_editor, use_signal_refresh};

#[derive(Clone, PartialEq)]
struct PendingDelete {
    kind: FeatureKind,
    id: FeatureId,
    name: String,
}

#[function_component(MapDataPanel)]
pub fn map_data_panel() -> Html {
    let context = use_editor();
    use_signal_refresh(|signal| matches!(signal, Signal::FeaturesReplaced(_) | Signal::SaveSucceeded(_)));

    let pending = use_state(|| None::<PendingDelete>);
    let confirm_open = use_state(|| false);

    let (areas, points) = context
        .editor
        .read(|e| (e.areas().to_vec(), e.points().to_vec()));

    let on_edit = {
        let editor = context.editor.clone();
        Callback::from(move |feature: Feature| editor.publish(Signal::OpenEdit(feature)))
    };
    let on_delete = {
        let pending = pending.clone();
        let confirm_open = confirm_open.clone();
        Callback::from(move |target: PendingDelete| {
            pending.set(Some(target));
            confirm_open.set(true);
        })
    };
    let on_confirm = {
        let context = context.clone();
        let pending = pending.clone();
        let confirm_open = confirm_open.clone();
        Callback::from(move |_: MouseEvent| {
            confirm_open.set(false);
            let Some(target) = (*pending).clone() else {
                return;
            };
            pending.set(None);
            let context = context.clone();
            spawn_local(async move {
                context
                    .editor
                    .delete(context.store.as_ref(), target.kind, &target.id)
                    .await;
            });
        })
    };
    let on_dismiss = {
        let confirm_open = confirm_open.clone();
        Callback::from(move |_: MouseEvent| confirm_open.set(false))
    };
    let on_close = {
        let pending = pending.clone();
        Callback::from(move |()| pending.set(None))
    };

    let body = if areas.is_empty() && points.is_empty() {
        html! { <div class="empty-state">{ "No polygons or map objects yet." }</div> }
    } else {
        html! {
            <>
                { area_table(&areas, &on_edit, &on_delete) }
                { point_table(&points, &on_edit, &on_delete) }
            </>
        }
    };

    let question = (*pending).as_ref().map_or_else(String::new, |target| {
        format!("Delete {} \"{}\"? This cannot be undone.", target.kind.label(), target.name)
    });

    html! {
        <section class="panel">
            <div class="panel-header">
                <h3>{ "Map data" }</h3>
            </div>
            <div class="panel-body">{ body }</div>
            <Modal
                state={confirm_open}
                title={AttrValue::from("Confirm delete")}
                onclose={on_close}
                actions={html! {
                    <>
                        <button class="danger" onclick={on_confirm}>{ "Delete" }</button>
                        <button onclick={on_dismiss}>{ "Cancel" }</button>
                    </>
                }}
            >
                <p>{ question }</p>
            </Modal>
        </section>
    }
}

fn row_actions<F: FeatureRecord>(feature: &F, on_edit: &Callback<Feature>, on_delete: &Callback<PendingDelete>) -> Html {
    let Some(id) = feature.id().cloned() else {
        return html! {};
    };
    let edit = {
        let feature: Feature = feature.clone().into();
        on_edit.reform(move |_: MouseEvent| feature.clone())
    };
    let delete = {
        let target = PendingDelete {
            kind: F::KIND,
            id,
            name: feature.name().to_string(),
        };
        on_delete.reform(move |_: MouseEvent| target.clone())
    };
    html! {
        <td>
            <button onclick={edit}>{ "Edit" }</button>
            { " " }
            <button class="danger" onclick={delete}>{ "Delete" }</button>
        </td>
    }
}

fn area_table(areas: &[AreaFeature], on_edit: &Callback<Feature>, on_delete: &Callback<PendingDelete>) -> Html {
    if areas.is_empty() {
        return html! {};
    }
    html! {
        <table class="feature-table">
            <thead>
                <tr><th>{ "Polygon" }</th><th>{ "Description" }</th><th>{ "Points" }</th><th /></tr>
            </thead>
            <tbody>
                { for areas.iter().map(|area| html! {
                    <tr key={area.id().map(ToString::to_string).unwrap_or_default()}>
                        <td>{ area.name.clone() }</td>
                        <td>{ area.description.clone().unwrap_or_default() }</td>
                        <td>{ area.geometry.open_outer_ring().len() }</td>
                        { row_actions(area, on_edit, on_delete) }
                    </tr>
                }) }
            </tbody>
        </table>
    }
}

fn point_table(points: &[PointFeature], on_edit: &Callback<Feature>, on_delete: &Callback<PendingDelete>) -> Html {
    if points.is_empty() {
        return html! {};
    }
    html! {
        <table class="feature-table">
            <thead>
                <tr><th>{ "Map object" }</th><th>{ "Description" }</th><th>{ "Symbol" }</th><th /></tr>
            </thead>
            <tbody>
                { for points.iter().map(|point| {
                    let style = symbol_style(point.symbol_kind);
                    html! {
                        <tr key={point.id().map(ToString::to_string).unwrap_or_default()}>
                            <td>{ point.name.clone() }</td>
                            <td>{ point.description.clone().unwrap_or_default() }</td>
                            <td>
                                <span style={format!("color: {}", style.color)}>{ style.glyph }</span>
                                { " " }{ point.symbol_kind.as_str() }
                            </td>
                            { row_actions(point, on_edit, on_delete) }
                        </tr>
                    }
                }) }
            </tbody>
        </table>
    }
}
