//! SVG map surface.
//!
//! Renders the fetched features and the current affordance from the shared
//! [`SurfaceHandle`](mapedit_core::SurfaceHandle), and turns pointer input into
//! bus signals through it. The draw tool collects corners locally until the
//! shape is finished; vertex drags on the editing polygon report the reshaped
//! ring on release.

use std::cell::RefCell;
use std::rc::Rc;

use mapedit_core::{
    AreaFeature, Coord, Feature, FeatureRecord, Overlay, PointFeature, PolygonGeometry, Ring, Signal, Viewport,
};
use yew::prelude::*;

use crate::components::symbol_style;
use crate::config::{CLICK_SLOP, INITIAL_CENTER, INITIAL_ZOOM, MAP_HEIGHT, MAP_WIDTH, WHEEL_ZOOM_STEP};
use crate::hooks::{use_editor, use_signal_refresh};

const MARKER_RADIUS: f64 = 9.0;
const HANDLE_RADIUS: f64 = 6.0;
const EDIT_COLOR: &str = "#e12d39";
const AREA_COLOR: &str = "#2680c2";

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Pan { last: (f64, f64), travelled: f64 },
    Vertex { index: usize },
}

/// Canvas pixel under the pointer. The SVG stretches its viewBox to the element.
fn canvas_point(svg: &NodeRef, e: &MouseEvent) -> Option<(f64, f64)> {
    let element = svg.cast::<web_sys::Element>()?;
    let rect = element.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    Some((
        (f64::from(e.client_x()) - rect.left()) * MAP_WIDTH / rect.width(),
        (f64::from(e.client_y()) - rect.top()) * MAP_HEIGHT / rect.height(),
    ))
}

fn ring_path(viewport: &Viewport, rings: &[Ring]) -> String {
    let mut path = String::new();
    for ring in rings.iter().filter(|ring| !ring.is_empty()) {
        for (i, c) in ring.iter().enumerate() {
            let (x, y) = viewport.to_screen(*c);
            path.push_str(if i == 0 { "M" } else { "L" });
            path.push_str(&format!("{x:.1} {y:.1} "));
        }
        path.push('Z');
    }
    path
}

fn polyline_points(viewport: &Viewport, coords: &[Coord]) -> String {
    coords
        .iter()
        .map(|c| {
            let (x, y) = viewport.to_screen(*c);
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Faint lon/lat grid, coarser when zoomed out.
fn graticule(viewport: &Viewport) -> Html {
    let step = if viewport.zoom >= 10.0 {
        0.1
    } else if viewport.zoom >= 6.0 {
        1.0
    } else {
        10.0
    };
    let top_left = viewport.from_screen(0.0, 0.0);
    let bottom_right = viewport.from_screen(MAP_WIDTH, MAP_HEIGHT);

    let lines = |from: f64, to: f64| {
        let first = (from.min(to) / step).floor() as i64;
        let last = (from.max(to) / step).ceil() as i64;
        (first..=last).take(200).map(move |i| i as f64 * step)
    };

    let verticals = lines(top_left.lon, bottom_right.lon).map(|lon| {
        let (x, _) = viewport.to_screen(Coord::new(lon, top_left.lat));
        html! { <line x1={x.to_string()} y1="0" x2={x.to_string()} y2={MAP_HEIGHT.to_string()} /> }
    });
    let horizontals = lines(bottom_right.lat, top_left.lat).map(|lat| {
        let (_, y) = viewport.to_screen(Coord::new(top_left.lon, lat));
        html! { <line x1="0" y1={y.to_string()} x2={MAP_WIDTH.to_string()} y2={y.to_string()} /> }
    });

    html! {
        <g stroke="#b6cde0" stroke-width="1" pointer-events="none">
            { for verticals }
            { for horizontals }
        </g>
    }
}

#[function_component(MapSurface)]
pub fn map_surface() -> Html {
    let context = use_editor();
    use_signal_refresh(|signal| {
        matches!(
            signal,
            Signal::OwnerChanged { .. }
                | Signal::ShowTempMarker(_)
                | Signal::ClearTempMarker
                | Signal::ShowEditingPolygon(_)
                | Signal::ClearEditingPolygon
                | Signal::FocusCamera { .. }
                | Signal::FeaturesReplaced(_)
        )
    });
    let redraw = use_force_update();
    let svg_ref = use_node_ref();
    let viewport = use_mut_ref(|| Viewport::new(INITIAL_CENTER, INITIAL_ZOOM, MAP_WIDTH, MAP_HEIGHT));
    let gesture: Rc<RefCell<Option<Gesture>>> = use_mut_ref(|| None);
    let dragged: Rc<RefCell<Option<(usize, Coord)>>> = use_mut_ref(|| None);
    let sketch = use_state(Vec::<Coord>::new);

    let surface = context.surface.clone();
    if let Some(camera) = surface.take_camera_move() {
        viewport.borrow_mut().apply(&camera);
    }

    let drawing = surface.read(|s| s.drawing_enabled());
    let picking = surface.read(|s| s.owner() == mapedit_core::Owner::ObjectPanel);
    let overlay = surface.read(|s| s.overlay().clone());
    let editing_polygon = match &overlay {
        Overlay::EditingPolygon(geometry) => Some(geometry.clone()),
        _ => None,
    };
    let sketching = surface.read(|s| s.sketching());

    // A sketch only makes sense while the draw tool is live and nothing is drawn yet.
    {
        let sketch = sketch.clone();
        use_effect_with(sketching, move |sketching| {
            if !*sketching {
                sketch.set(Vec::new());
            }
        });
    }

    let on_mouse_down = {
        let svg_ref = svg_ref.clone();
        let gesture = gesture.clone();
        Callback::from(move |e: MouseEvent| {
            if e.button() != 0 {
                return;
            }
            if let Some(last) = canvas_point(&svg_ref, &e) {
                *gesture.borrow_mut() = Some(Gesture::Pan { last, travelled: 0.0 });
            }
        })
    };

    let on_mouse_move = {
        let svg_ref = svg_ref.clone();
        let gesture = gesture.clone();
        let dragged = dragged.clone();
        let viewport = viewport.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: MouseEvent| {
            let Some(point) = canvas_point(&svg_ref, &e) else {
                return;
            };
            let mut gesture = gesture.borrow_mut();
            match gesture.as_mut() {
                Some(Gesture::Pan { last, travelled }) => {
                    let (dx, dy) = (point.0 - last.0, point.1 - last.1);
                    *travelled += dx.hypot(dy);
                    *last = point;
                    if *travelled >= CLICK_SLOP {
                        viewport.borrow_mut().pan_by(dx, dy);
                        redraw.force_update();
                    }
                }
                Some(Gesture::Vertex { index }) => {
                    let at = viewport.borrow().from_screen(point.0, point.1);
                    *dragged.borrow_mut() = Some((*index, at));
                    redraw.force_update();
                }
                None => {}
            }
        })
    };

    let on_mouse_up = {
        let svg_ref = svg_ref.clone();
        let gesture = gesture.clone();
        let dragged = dragged.clone();
        let viewport = viewport.clone();
        let surface = surface.clone();
        let sketch = sketch.clone();
        let editing_polygon = editing_polygon.clone();
        Callback::from(move |e: MouseEvent| {
            let Some(finished) = gesture.borrow_mut().take() else {
                return;
            };
            match finished {
                Gesture::Pan { travelled, .. } if travelled < CLICK_SLOP => {
                    let Some((x, y)) = canvas_point(&svg_ref, &e) else {
                        return;
                    };
                    let at = viewport.borrow().from_screen(x, y);
                    if sketching {
                        let mut corners = (*sketch).clone();
                        corners.push(at);
                        sketch.set(corners);
                    } else {
                        surface.click_map(at);
                    }
                }
                Gesture::Pan { .. } => {}
                Gesture::Vertex { .. } => {
                    let moved = dragged.borrow_mut().take();
                    if let (Some((index, at)), Some(geometry)) = (moved, editing_polygon.as_ref()) {
                        surface.draw_edited(geometry.with_outer_vertex(index, at));
                    }
                }
            }
        })
    };

    let on_mouse_leave = {
        let gesture = gesture.clone();
        let dragged = dragged.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            gesture.borrow_mut().take();
            if dragged.borrow_mut().take().is_some() {
                redraw.force_update();
            }
        })
    };

    let on_wheel = {
        let svg_ref = svg_ref.clone();
        let viewport = viewport.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: WheelEvent| {
            e.prevent_default();
            let Some((x, y)) = canvas_point(&svg_ref, &e) else {
                return;
            };
            let delta = if e.delta_y() < 0.0 { WHEEL_ZOOM_STEP } else { -WHEEL_ZOOM_STEP };
            viewport.borrow_mut().zoom_at(delta, x, y);
            redraw.force_update();
        })
    };

    let view = *viewport.borrow();
    let (areas, points) = context
        .editor
        .read(|e| (e.areas().to_vec(), e.points().to_vec()));

    // Feature clicks must not start a pan on the background. While sketching the
    // shapes let clicks through so corners can land on top of them.
    let feature_events = sketching.then_some("none");
    let swallow = Callback::from(|e: MouseEvent| e.stop_propagation());
    let on_feature = |feature: Feature| {
        let surface = surface.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            surface.click_feature(&feature);
        })
    };

    let area_shapes = areas.iter().map(|area: &AreaFeature| {
        html! {
            <path
                d={ring_path(&view, &area.geometry.rings)}
                fill={AREA_COLOR}
                fill-opacity="0.25"
                fill-rule="evenodd"
                stroke={AREA_COLOR}
                stroke-width="2"
                pointer-events={feature_events}
                onmousedown={swallow.clone()}
                onclick={on_feature(area.clone().into())}
            >
                <title>{ area.name().to_string() }</title>
            </path>
        }
    });

    let point_markers = points.iter().map(|point: &PointFeature| {
        let (x, y) = view.to_screen(point.position());
        let style = symbol_style(point.symbol_kind);
        html! {
            <g
                transform={format!("translate({x:.1} {y:.1})")}
                pointer-events={feature_events}
                onmousedown={swallow.clone()}
                onclick={on_feature(point.clone().into())}
                style="cursor: pointer"
            >
                <title>{ point.name().to_string() }</title>
                <circle r={MARKER_RADIUS.to_string()} fill={style.color} stroke="#fff" stroke-width="2" />
                <text text-anchor="middle" dominant-baseline="central" font-size="10" fill="#fff">{ style.glyph }</text>
            </g>
        }
    });

    let overlay_view = match (&overlay, &editing_polygon) {
        (Overlay::TempMarker(at), _) => {
            let (x, y) = view.to_screen(*at);
            html! {
                <g transform={format!("translate({x:.1} {y:.1})")} pointer-events="none">
                    <circle r={(MARKER_RADIUS + 5.0).to_string()} fill="none" stroke={EDIT_COLOR} stroke-width="2" stroke-dasharray="4 3" />
                    <circle r="4" fill={EDIT_COLOR} />
                </g>
            }
        }
        (_, Some(geometry)) => {
            let shown = match *dragged.borrow() {
                Some((index, at)) => geometry.with_outer_vertex(index, at),
                None => geometry.clone(),
            };
            let handles = shown.open_outer_ring().iter().enumerate().map(|(index, c)| {
                let (x, y) = view.to_screen(*c);
                let on_grab = {
                    let gesture = gesture.clone();
                    Callback::from(move |e: MouseEvent| {
                        e.stop_propagation();
                        *gesture.borrow_mut() = Some(Gesture::Vertex { index });
                    })
                };
                html! {
                    <circle
                        cx={format!("{x:.1}")}
                        cy={format!("{y:.1}")}
                        r={HANDLE_RADIUS.to_string()}
                        fill="#fff"
                        stroke={EDIT_COLOR}
                        stroke-width="2"
                        style="cursor: move"
                        onmousedown={on_grab}
                    />
                }
            });
            html! {
                <g>
                    <path
                        d={ring_path(&view, &shown.rings)}
                        fill={EDIT_COLOR}
                        fill-opacity="0.2"
                        fill-rule="evenodd"
                        stroke={EDIT_COLOR}
                        stroke-width="3"
                        pointer-events="none"
                    />
                    if drawing {
                        { for handles }
                    }
                </g>
            }
        }
        _ => html! {},
    };

    let sketch_view = if sketch.is_empty() {
        html! {}
    } else {
        html! {
            <g pointer-events="none">
                <polyline points={polyline_points(&view, &sketch)} fill="none" stroke={EDIT_COLOR} stroke-width="2" stroke-dasharray="6 4" />
                { for sketch.iter().map(|c| {
                    let (x, y) = view.to_screen(*c);
                    html! { <circle cx={format!("{x:.1}")} cy={format!("{y:.1}")} r="4" fill={EDIT_COLOR} /> }
                }) }
            </g>
        }
    };

    let toolbar = if sketching {
        let on_finish = {
            let sketch = sketch.clone();
            let surface = surface.clone();
            Callback::from(move |_: MouseEvent| {
                if sketch.len() >= 3 {
                    surface.draw_finished(PolygonGeometry::from_outer((*sketch).clone()).closed());
                    sketch.set(Vec::new());
                }
            })
        };
        let on_undo = {
            let sketch = sketch.clone();
            Callback::from(move |_: MouseEvent| {
                let mut corners = (*sketch).clone();
                corners.pop();
                sketch.set(corners);
            })
        };
        html! {
            <div class="draw-toolbar">
                <button class="primary" disabled={sketch.len() < 3} onclick={on_finish}>
                    { format!("Finish shape ({})", sketch.len()) }
                </button>
                <button disabled={sketch.is_empty()} onclick={on_undo}>{ "Undo corner" }</button>
            </div>
        }
    } else {
        html! {}
    };

    let class = classes!(
        "map-surface",
        sketching.then_some("drawing"),
        picking.then_some("picking"),
    );

    html! {
        <>
            <svg
                ref={svg_ref}
                class={class}
                viewBox={format!("0 0 {MAP_WIDTH} {MAP_HEIGHT}")}
                preserveAspectRatio="none"
                onmousedown={on_mouse_down}
                onmousemove={on_mouse_move}
                onmouseup={on_mouse_up}
                onmouseleave={on_mouse_leave}
                onwheel={on_wheel}
            >
                { graticule(&view) }
                { for area_shapes }
                { for point_markers }
                { overlay_view }
                { sketch_view }
            </svg>
            { toolbar }
        </>
    }
}
