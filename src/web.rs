//! Browser integration: the canvas, variant buttons and the double-click
//! full-screen gesture.

use anyhow::{Result, anyhow};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use winit::event_loop::EventLoopProxy;

use crate::app::ViewerEvent;

fn document() -> Result<web_sys::Document> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| anyhow!("No document available"))
}

pub fn find_canvas(id: &str) -> Result<web_sys::HtmlCanvasElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No element with id '{}'", id))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| anyhow!("Element '{}' is not a canvas", id))
}

fn send(proxy: &EventLoopProxy<ViewerEvent>, event: ViewerEvent) {
    if proxy.send_event(event).is_err() {
        log::debug!("Event loop closed, dropping page event");
    }
}

/// Clicking an element whose id is a variant name selects that variant.
/// Variants without an element are skipped.
pub fn bind_variant_buttons<'a>(
    names: impl IntoIterator<Item = &'a str>,
    proxy: &EventLoopProxy<ViewerEvent>,
) -> Result<()> {
    let document = document()?;
    for name in names {
        let Some(element) = document.get_element_by_id(name) else {
            log::debug!("No button for variant '{}'", name);
            continue;
        };
        let proxy = proxy.clone();
        let variant = name.to_string();
        let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            send(&proxy, ViewerEvent::SelectVariant(variant.clone()));
        });
        element
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(|e| anyhow!("Could not listen on '{}': {:?}", name, e))?;
        // Lives as long as the page
        on_click.forget();
    }
    Ok(())
}

/// Double clicks anywhere on the page toggle full screen when they land on
/// the canvas.
pub fn bind_fullscreen_toggle(
    canvas: web_sys::HtmlCanvasElement,
    proxy: &EventLoopProxy<ViewerEvent>,
) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("No window available"))?;
    let proxy = proxy.clone();
    let canvas: JsValue = canvas.into();
    let on_dblclick = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let target = event.target().map(JsValue::from);
        if target.as_ref() == Some(&canvas) {
            send(&proxy, ViewerEvent::ToggleFullscreen);
        }
    });
    window
        .add_event_listener_with_callback("dblclick", on_dblclick.as_ref().unchecked_ref())
        .map_err(|e| anyhow!("Could not listen for double clicks: {:?}", e))?;
    on_dblclick.forget();
    Ok(())
}
