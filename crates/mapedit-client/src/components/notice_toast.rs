//! Latest notice as a dismissable toast.

use gloo::timers::callback::Timeout;
use mapedit_core::{Editor, NoticeLevel, Signal};
use yew::prelude::*;

use crate::hooks::{use_editor, use_signal_refresh};

const INFO_TIMEOUT_MS: u32 = 4_000;

#[function_component(NoticeToast)]
pub fn notice_toast() -> Html {
    let context = use_editor();
    use_signal_refresh(|signal| matches!(signal, Signal::NoticeRaised(_)));
    let trigger = use_force_update();

    let notice = context.editor.read(|e| e.latest_notice().cloned());

    let dismiss = {
        let editor = context.editor.clone();
        let trigger = trigger.clone();
        Callback::from(move |()| {
            editor.with(Editor::dismiss_notices);
            trigger.force_update();
        })
    };

    // Confirmations fade on their own; errors stay until dismissed.
    {
        let dismiss = dismiss.clone();
        use_effect_with(notice.clone(), move |notice| {
            let timeout = notice
                .as_ref()
                .filter(|n| n.level == NoticeLevel::Info)
                .map(|_| Timeout::new(INFO_TIMEOUT_MS, move || dismiss.emit(())));
            move || drop(timeout)
        });
    }

    let Some(notice) = notice else {
        return html! {};
    };

    let class = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };

    html! {
        <div class={classes!("notice-toast", class)} role="status">
            <span>{ notice.message }</span>
            <button onclick={dismiss.reform(|_: MouseEvent| ())}>{ "×" }</button>
        </div>
    }
}
