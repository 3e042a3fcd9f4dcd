//! Common modal component.

use yew::prelude::*;

/// Props for the Modal component.
#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub state: UseStateHandle<bool>,
    /// Modal content.
    pub children: Children,
    #[prop_or_default]
    pub title: Option<AttrValue>,
    /// Buttons rendered under the content.
    #[prop_or_default]
    pub actions: Html,
    #[prop_or_default]
    pub onclose: Option<Callback<()>>,
    #[prop_or(true)]
    pub overlay_click_closes: bool,
}

/// Closes on the × button and, unless disabled, on an overlay click.
#[function_component(Modal)]
pub fn modal(props: &ModalProps) -> Html {
    let close = {
        let onclose = props.onclose.clone();
        let is_showing = props.state.clone();
        Callback::from(move |()| {
            is_showing.set(false);
            if let Some(cb) = onclose.as_ref() {
                cb.emit(());
            }
        })
    };

    let on_overlay_click = {
        let close = close.clone();
        let overlay_click_closes = props.overlay_click_closes;
        Callback::from(move |_: MouseEvent| {
            if overlay_click_closes {
                close.emit(());
            }
        })
    };

    let on_modal_click = Callback::from(|e: MouseEvent| {
        e.stop_propagation();
    });

    let on_close_button_click = close.reform(|_: MouseEvent| ());

    if !*props.state {
        return html! {};
    }

    html! {
        <div class="modal-overlay" onclick={on_overlay_click}>
            <div class="modal" onclick={on_modal_click}>
                <div class="modal-header">
                    <h2>{ props.title.clone().unwrap_or_default() }</h2>
                    <button class="modal-close-btn" onclick={on_close_button_click}>
                        { "×" }
                    </button>
                </div>
                <div class="modal-content">
                    { for props.children.iter() }
                </div>
                <div class="modal-content form-actions">
                    { props.actions.clone() }
                </div>
            </div>
        </div>
    }
}
