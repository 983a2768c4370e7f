use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::LiveDebuggerError;
use crate::geometry::{Rect, Size, Viewport};
use crate::inspect::Ancestry;
use crate::intent::{
    COMPONENT_ATTRIBUTE, HighlightDescriptor, MAIN_ATTRIBUTE, SESSION_ATTRIBUTE, Selector,
    TooltipMetadata,
};
use crate::pulse::PulseAnimation;
use crate::surface::{Layer, Sessions, Surface, Visibility};
use crate::tooltip::Arrow;

/// Stacks above anything a page is likely to use.
const OVERLAY_Z_INDEX: &str = "10000";

/// The live document.
#[derive(Debug, Clone)]
pub struct WebSurface {
    window: Window,
    document: Document,
}

impl WebSurface {
    /// Wrap the given window and its document.
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// The wrapped window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The wrapped document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn style(node: &Element, property: &str, value: &str) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            if let Err(error) = element.style().set_property(property, value) {
                tracing::debug!("Unable to set {property}: {}", super::describe(&error));
            }
        }
    }

    fn computed(&self, node: &Element, property: &str) -> String {
        self.window
            .get_computed_style(node)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn session_elements(&self) -> Vec<Element> {
        let selector = format!("[{SESSION_ATTRIBUTE}]");
        let Ok(list) = self.document.query_selector_all(&selector) else {
            return Vec::new();
        };

        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn keyframe(frame: Rect, offset: f64, color: &str) -> Result<Object, JsValue> {
        let keyframe = Object::new();
        Reflect::set(&keyframe, &"offset".into(), &offset.into())?;
        Reflect::set(&keyframe, &"left".into(), &px(frame.left).into())?;
        Reflect::set(&keyframe, &"top".into(), &px(frame.top).into())?;
        Reflect::set(&keyframe, &"width".into(), &px(frame.width).into())?;
        Reflect::set(&keyframe, &"height".into(), &px(frame.height).into())?;
        Reflect::set(&keyframe, &"backgroundColor".into(), &color.into())?;
        Ok(keyframe)
    }

    fn start_animation(node: &Element, animation: &PulseAnimation) -> Result<(), JsValue> {
        let keyframes = Array::new();
        for step in &animation.keyframes {
            keyframes.push(&Self::keyframe(step.frame, step.offset, step.color)?);
        }

        let options = Object::new();
        Reflect::set(
            &options,
            &"duration".into(),
            &(animation.duration.as_millis() as f64).into(),
        )?;
        Reflect::set(
            &options,
            &"delay".into(),
            &(animation.delay.as_millis() as f64).into(),
        )?;
        Reflect::set(&options, &"easing".into(), &"ease-out".into())?;
        Reflect::set(&options, &"fill".into(), &"forwards".into())?;

        // element.animate(keyframes, options)
        let animate: js_sys::Function = Reflect::get(node, &"animate".into())?.dyn_into()?;
        let running = animate.call2(node, &keyframes, &options)?;

        let finished = node.clone();
        let on_finish = Closure::once_into_js(move || finished.remove());
        Reflect::set(&running, &"onfinish".into(), &on_finish)?;

        Ok(())
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

impl Surface for WebSurface {
    type Node = Element;

    fn find(&self, selector: &Selector) -> Option<Element> {
        self.document
            .query_selector(&selector.to_css())
            .ok()
            .flatten()
    }

    fn visibility(&self, node: &Element) -> Visibility {
        Visibility {
            display_none: self.computed(node, "display") == "none",
            visibility_hidden: self.computed(node, "visibility") == "hidden",
            opacity: self.computed(node, "opacity").parse().unwrap_or(1.0),
        }
    }

    fn client_rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
        };

        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
        .scrolled(
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }

    fn mount(&self, layer: Layer) -> Result<Element, LiveDebuggerError> {
        let node = self.document.create_element("div")?;

        match layer {
            Layer::Pulse => node.set_class_name(layer.name()),
            Layer::Highlight | Layer::Tooltip => node.set_id(layer.name()),
        }

        Self::style(&node, "position", "absolute");
        Self::style(&node, "z-index", OVERLAY_Z_INDEX);
        if layer != Layer::Tooltip {
            Self::style(&node, "pointer-events", "none");
        }

        let body = self
            .document
            .body()
            .ok_or_else(|| LiveDebuggerError::Platform("Document has no body".into()))?;
        body.append_child(&node)?;

        Ok(node)
    }

    fn tag(&self, node: &Element, selector: &Selector) {
        let _ = node.set_attribute("data-attr", &selector.attribute);
        let _ = node.set_attribute("data-val", &selector.value);
    }

    fn place(&self, node: &Element, frame: Rect) {
        Self::style(node, "left", &px(frame.left));
        Self::style(node, "top", &px(frame.top));
        Self::style(node, "width", &px(frame.width));
        Self::style(node, "height", &px(frame.height));
    }

    fn paint(&self, node: &Element, color: &str) {
        Self::style(node, "background-color", color);
    }

    fn write_tooltip(&self, node: &Element, metadata: &TooltipMetadata) {
        node.set_inner_html("");

        let lines = [
            ("module", metadata.module.clone()),
            ("type", metadata.kind.label().to_string()),
            ("id", format!("{}: {}", metadata.id_key, metadata.id_value)),
        ];

        for (class, text) in lines {
            match self.document.create_element("div") {
                Ok(line) => {
                    line.set_class_name(class);
                    line.set_text_content(Some(&text));
                    let _ = node.append_child(&line);
                }
                Err(error) => {
                    tracing::debug!("Unable to write tooltip: {}", super::describe(&error))
                }
            }
        }
    }

    fn measure(&self, node: &Element) -> Size {
        let rect = node.get_bounding_client_rect();
        Size::new(rect.width(), rect.height())
    }

    fn point(&self, node: &Element, arrow: Arrow) {
        let classes = node.class_list();
        let stale = match arrow {
            Arrow::Down => Arrow::Up,
            Arrow::Up => Arrow::Down,
        };
        let _ = classes.remove_1(stale.class_name());
        let _ = classes.add_1(arrow.class_name());
    }

    fn animate(&self, node: &Element, animation: &PulseAnimation) {
        if let Err(error) = Self::start_animation(node, animation) {
            tracing::warn!("Unable to animate pulse: {}", super::describe(&error));
            node.remove();
        }
    }

    fn unmount(&self, node: &Element) {
        node.remove();
    }
}

impl Sessions for WebSurface {
    fn session_ids(&self) -> Vec<String> {
        self.session_elements()
            .iter()
            .map(|element| element.id())
            .filter(|id| !id.is_empty())
            .collect()
    }

    fn primary_session_id(&self) -> Option<String> {
        let main = format!("[{MAIN_ATTRIBUTE}]");

        self.document
            .query_selector(&main)
            .ok()
            .flatten()
            .map(|element| element.id())
            .filter(|id| !id.is_empty())
            .or_else(|| self.session_ids().into_iter().next())
    }
}

impl Ancestry for WebSurface {
    type Target = Element;

    fn parent(&self, target: &Element) -> Option<Element> {
        target.parent_element()
    }

    fn identity(&self, target: &Element) -> Option<HighlightDescriptor> {
        if let Some(cid) = target.get_attribute(COMPONENT_ATTRIBUTE) {
            return Some(HighlightDescriptor::component(cid));
        }

        if target.has_attribute(SESSION_ATTRIBUTE) {
            let id = target.id();
            if !id.is_empty() {
                return Some(HighlightDescriptor::view(id));
            }
        }

        None
    }
}
