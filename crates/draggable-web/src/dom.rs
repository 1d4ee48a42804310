//! [`LayoutNode`] over live DOM elements.

use crate::style::parse_css_int;
use draggable_core::geometry::{BoxEdges, LayoutNode};
use kurbo::{Insets, Rect, Vec2};
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement};

/// A DOM element together with the document that owns it.
///
/// Any element can be an event target, SVG included. Offset geometry only
/// exists on HTML elements and reads as zero elsewhere.
///
/// The document is carried along so iframed elements resolve styles,
/// listeners and selectors against their own document.
#[derive(Debug, Clone)]
pub struct WebNode {
    element: Element,
    document: Document,
}

impl PartialEq for WebNode {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl WebNode {
    /// Wrap an element attached to a document.
    pub fn new(element: Element) -> Option<Self> {
        let document = element.owner_document()?;
        Some(Self { element, document })
    }

    pub(crate) fn in_document(element: Element, document: Document) -> Self {
        Self { element, document }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn html(&self) -> Option<&HtmlElement> {
        self.element.dyn_ref::<HtmlElement>()
    }

    fn related(&self, element: Option<Element>) -> Option<Self> {
        Some(Self::in_document(element?, self.document.clone()))
    }

    fn computed_style(&self) -> Option<CssStyleDeclaration> {
        let window = self.document.default_view()?;
        window.get_computed_style(&self.element).ok().flatten()
    }
}

fn read_insets(style: &CssStyleDeclaration, prefix: &str, suffix: &str) -> Insets {
    let side = |name: &str| {
        style
            .get_property_value(&format!("{prefix}-{name}{suffix}"))
            .map_or(0.0, |value| parse_css_int(&value))
    };
    Insets::new(side("left"), side("top"), side("right"), side("bottom"))
}

impl LayoutNode for WebNode {
    type Document = Document;

    fn owner_document(&self) -> Document {
        self.document.clone()
    }

    fn client_width(&self) -> f64 {
        f64::from(self.element.client_width())
    }

    fn client_height(&self) -> f64 {
        f64::from(self.element.client_height())
    }

    fn offset_left(&self) -> f64 {
        self.html().map_or(0.0, |html| f64::from(html.offset_left()))
    }

    fn offset_top(&self) -> f64 {
        self.html().map_or(0.0, |html| f64::from(html.offset_top()))
    }

    fn scroll_offset(&self) -> Vec2 {
        Vec2::new(
            f64::from(self.element.scroll_left()),
            f64::from(self.element.scroll_top()),
        )
    }

    fn bounding_client_rect(&self) -> Rect {
        let rect = self.element.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.right(), rect.bottom())
    }

    fn box_edges(&self) -> BoxEdges {
        let Some(style) = self.computed_style() else {
            log::warn!("No computed style for draggable element");
            return BoxEdges::default();
        };
        BoxEdges {
            border: read_insets(&style, "border", "-width"),
            padding: read_insets(&style, "padding", ""),
            margin: read_insets(&style, "margin", ""),
        }
    }

    fn parent_element(&self) -> Option<Self> {
        self.related(self.element.parent_element())
    }

    fn offset_parent(&self) -> Option<Self> {
        self.related(self.html()?.offset_parent())
    }

    fn document_body(&self) -> Option<Self> {
        let body = self.document.body()?;
        Some(Self::in_document(body.into(), self.document.clone()))
    }

    fn is_document_body(&self) -> bool {
        self.document
            .body()
            .is_some_and(|body| AsRef::<Element>::as_ref(&body) == &self.element)
    }

    fn matches(&self, selector: &str) -> bool {
        self.element.matches(selector).unwrap_or(false)
    }

    fn query_selector(&self, selector: &str) -> Option<Self> {
        let element = self.document.query_selector(selector).ok().flatten();
        self.related(element)
    }
}
