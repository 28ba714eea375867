use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::*;
use yew::prelude::*;
use yew::AppHandle;

use crate::ports::ToastVariant;

/// How long a toast stays up before fading out.
pub const TOAST_DELAY_MS: i32 = 5000;

/// Longest the fade-out may take. The toast is dismissed after this even
/// when no `transitionend` arrives.
pub const TOAST_FADE_MS: i32 = 600;

/// A transient, self-dismissing notification.
#[derive(Properties, PartialEq)]
pub struct ToastProps {
    /// Message text
    pub message: String,
    /// Color of the toast
    pub variant: ToastVariant,
    /// Milliseconds before the fade-out starts
    #[prop_or(TOAST_DELAY_MS)]
    pub delay_ms: i32,
    /// Fired once, after the fade-out
    #[prop_or_default]
    pub on_dismissed: Callback<()>,
}

fn after<F>(ms: i32, f: F)
where
    F: FnOnce() + 'static,
{
    let callback = Closure::once_into_js(f);
    if let Some(win) = web_sys::window() {
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            ms,
        );
    }
}

/// Fades out like Bootstrap's `Toast.hide()`: `showing` drops the opacity
/// while `show` keeps the element displayed until it is removed.
#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let hiding = use_state(|| false);
    let dismissed = use_mut_ref(|| false);

    let dismiss = {
        let on_dismissed = props.on_dismissed.clone();
        Callback::from(move |()| {
            if !dismissed.replace(true) {
                on_dismissed.emit(());
            }
        })
    };

    {
        let hiding = hiding.clone();
        use_effect_with(props.delay_ms, move |delay_ms| {
            after(*delay_ms, move || hiding.set(true));
            || ()
        });
    }

    {
        let dismiss = dismiss.clone();
        use_effect_with(*hiding, move |hiding| {
            if *hiding {
                after(TOAST_FADE_MS, move || dismiss.emit(()));
            }
            || ()
        });
    }

    let on_close = {
        let hiding = hiding.clone();
        Callback::from(move |_: MouseEvent| hiding.set(true))
    };

    let on_transition_end = {
        let hiding = hiding.clone();
        Callback::from(move |_: TransitionEvent| {
            if *hiding {
                dismiss.emit(());
            }
        })
    };

    html! {
        <div
            class={classes!(
                "toast", "fade", "show", "align-items-center", "border-0",
                "position-fixed", "bottom-0", "end-0", "m-3",
                format!("text-bg-{}", props.variant.as_str()),
                (*hiding).then_some("showing"),
            )}
            role="alert"
            aria-live="assertive"
            aria-atomic="true"
            ontransitionend={on_transition_end}
        >
            <div class="d-flex">
                <div class="toast-body">{ &props.message }</div>
                <button
                    type="button"
                    class="btn-close btn-close-white me-2 m-auto"
                    aria-label="Close"
                    onclick={on_close}
                />
            </div>
        </div>
    }
}

/// Show `message` as a toast appended to `<body>`.
pub fn notify(message: &str, variant: ToastVariant) {
    notify_for(message, variant, TOAST_DELAY_MS);
}

/// Like [`notify`], with an explicit display time. Returns the host node,
/// which is removed from the document once the toast is dismissed.
pub fn notify_for(message: &str, variant: ToastVariant, delay_ms: i32) -> Option<web_sys::Element> {
    let document = web_sys::window().and_then(|win| win.document())?;
    let (Some(body), Ok(host)) = (document.body(), document.create_element("div")) else {
        tracing::warn!("cannot show toast: {message}");
        return None;
    };
    body.append_child(&host).ok()?;

    let handle: Rc<RefCell<Option<AppHandle<Toast>>>> = Rc::default();
    let on_dismissed = {
        let handle = handle.clone();
        let host = host.clone();
        Callback::from(move |_| {
            let app = handle.borrow_mut().take();
            let host = host.clone();
            // Tear down outside the toast's own callback.
            wasm_bindgen_futures::spawn_local(async move {
                if let Some(app) = app {
                    app.destroy();
                }
                host.remove();
            });
        })
    };

    let props = ToastProps {
        message: message.to_string(),
        variant,
        delay_ms,
        on_dismissed,
    };
    let app = yew::Renderer::<Toast>::with_root_and_props(host.clone(), props).render();
    *handle.borrow_mut() = Some(app);
    Some(host)
}
