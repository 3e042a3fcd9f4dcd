use yew::Callback;

/// Callback that clones `deps` and runs `f` on the local executor, ignoring the event.
pub fn async_callback<Deps, F, Fut, E>(deps: Deps, f: F) -> Callback<E>
where
    Deps: Clone + 'static,
    F: Fn(Deps) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    Callback::from(move |_| {
        let deps = deps.clone();
        wasm_bindgen_futures::spawn_local(f(deps));
    })
}

/// Value of the `<input>`, `<textarea>` or `<select>` an event came from.
pub fn event_value(e: &web_sys::Event) -> String {
    use wasm_bindgen::JsCast;

    let Some(target) = e.target() else {
        return String::new();
    };
    if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
        input.value()
    } else if let Some(area) = target.dyn_ref::<web_sys::HtmlTextAreaElement>() {
        area.value()
    } else if let Some(select) = target.dyn_ref::<web_sys::HtmlSelectElement>() {
        select.value()
    } else {
        String::new()
    }
}
