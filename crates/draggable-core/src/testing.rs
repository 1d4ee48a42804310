//! In-memory layout tree and host used by unit tests.

use crate::geometry::{BoxEdges, LayoutNode};
use crate::host::{ListenerHost, UserSelectHack};
use crate::modality::DragEvents;
use kurbo::{Rect, Vec2};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Once;

struct NodeData {
    tag: String,
    is_body: bool,
    id: RefCell<Option<String>>,
    classes: RefCell<Vec<String>>,
    client_size: Cell<(f64, f64)>,
    offset: Cell<(f64, f64)>,
    scroll: Cell<Vec2>,
    rect: Cell<Rect>,
    edges: Cell<BoxEdges>,
    parent: RefCell<Option<FakeNode>>,
    offset_parent: RefCell<Option<FakeNode>>,
    document: RefCell<Option<FakeDocument>>,
}

/// Element handle with settable layout.
#[derive(Clone)]
pub struct FakeNode(Rc<NodeData>);

impl fmt::Debug for FakeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FakeNode(<{}>)", self.0.tag)
    }
}

impl PartialEq for FakeNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FakeNode {
    fn with_tag(tag: &str, is_body: bool) -> Self {
        Self(Rc::new(NodeData {
            tag: tag.to_string(),
            is_body,
            id: RefCell::new(None),
            classes: RefCell::new(Vec::new()),
            client_size: Cell::new((0.0, 0.0)),
            offset: Cell::new((0.0, 0.0)),
            scroll: Cell::new(Vec2::ZERO),
            rect: Cell::new(Rect::ZERO),
            edges: Cell::new(BoxEdges::default()),
            parent: RefCell::new(None),
            offset_parent: RefCell::new(None),
            document: RefCell::new(None),
        }))
    }

    pub fn new(tag: &str) -> Self {
        Self::with_tag(tag, false)
    }

    pub fn body() -> Self {
        Self::with_tag("body", true)
    }

    pub fn set_id(&self, id: &str) {
        *self.0.id.borrow_mut() = Some(id.to_string());
    }

    pub fn add_class(&self, class: &str) {
        self.0.classes.borrow_mut().push(class.to_string());
    }

    pub fn set_client_size(&self, width: f64, height: f64) {
        self.0.client_size.set((width, height));
    }

    pub fn set_offset(&self, left: f64, top: f64) {
        self.0.offset.set((left, top));
    }

    pub fn set_scroll(&self, scroll: Vec2) {
        self.0.scroll.set(scroll);
    }

    pub fn set_rect(&self, rect: Rect) {
        self.0.rect.set(rect);
    }

    pub fn set_edges(&self, edges: BoxEdges) {
        self.0.edges.set(edges);
    }

    pub fn set_parent(&self, parent: &FakeNode) {
        *self.0.parent.borrow_mut() = Some(parent.clone());
    }

    pub fn set_offset_parent(&self, parent: &FakeNode) {
        *self.0.offset_parent.borrow_mut() = Some(parent.clone());
    }
}

impl LayoutNode for FakeNode {
    type Document = FakeDocument;

    fn owner_document(&self) -> FakeDocument {
        self.0
            .document
            .borrow()
            .clone()
            .unwrap_or_else(FakeDocument::new)
    }

    fn client_width(&self) -> f64 {
        self.0.client_size.get().0
    }

    fn client_height(&self) -> f64 {
        self.0.client_size.get().1
    }

    fn offset_left(&self) -> f64 {
        self.0.offset.get().0
    }

    fn offset_top(&self) -> f64 {
        self.0.offset.get().1
    }

    fn scroll_offset(&self) -> Vec2 {
        self.0.scroll.get()
    }

    fn bounding_client_rect(&self) -> Rect {
        self.0.rect.get()
    }

    fn box_edges(&self) -> BoxEdges {
        self.0.edges.get()
    }

    fn parent_element(&self) -> Option<Self> {
        self.0.parent.borrow().clone()
    }

    fn offset_parent(&self) -> Option<Self> {
        self.0.offset_parent.borrow().clone()
    }

    fn document_body(&self) -> Option<Self> {
        self.0.document.borrow().as_ref().map(FakeDocument::body)
    }

    fn is_document_body(&self) -> bool {
        self.0.is_body
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(class) = selector.strip_prefix('.') {
            self.0.classes.borrow().iter().any(|c| c == class)
        } else if let Some(id) = selector.strip_prefix('#') {
            self.0.id.borrow().as_deref() == Some(id)
        } else {
            self.0.tag == selector
        }
    }

    fn query_selector(&self, selector: &str) -> Option<Self> {
        let document = self.0.document.borrow().clone()?;
        let nodes = document.0.nodes.borrow();
        nodes.iter().find(|node| node.matches(selector)).cloned()
    }
}

struct DocumentData {
    body: FakeNode,
    nodes: RefCell<Vec<FakeNode>>,
    listeners: RefCell<Vec<&'static str>>,
    selection_disabled: Cell<bool>,
}

/// Document that records attached listeners and the selection hack.
#[derive(Clone)]
pub struct FakeDocument(Rc<DocumentData>);

impl fmt::Debug for FakeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeDocument")
            .field("listeners", &self.0.listeners.borrow())
            .field("selection_disabled", &self.0.selection_disabled.get())
            .finish()
    }
}

impl FakeDocument {
    pub fn new() -> Self {
        let document = Self(Rc::new(DocumentData {
            body: FakeNode::body(),
            nodes: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            selection_disabled: Cell::new(false),
        }));
        let body = document.body();
        document.adopt(&body);
        document
    }

    pub fn body(&self) -> FakeNode {
        self.0.body.clone()
    }

    /// Make `node` part of this document.
    pub fn adopt(&self, node: &FakeNode) {
        *node.0.document.borrow_mut() = Some(self.clone());
        self.0.nodes.borrow_mut().push(node.clone());
    }

    /// Event names currently listened to, in attach order.
    pub fn listeners(&self) -> Vec<&'static str> {
        self.0.listeners.borrow().clone()
    }

    pub fn selection_disabled(&self) -> bool {
        self.0.selection_disabled.get()
    }
}

/// Host that applies listener and selection changes to [`FakeDocument`]s.
#[derive(Default)]
pub struct FakeHost {
    frames: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl FakeHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Run tasks queued with `request_animation_frame`.
    pub fn run_frames(&self) {
        let frames: Vec<_> = self.frames.borrow_mut().drain(..).collect();
        for frame in frames {
            frame();
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl ListenerHost<FakeDocument> for FakeHost {
    fn add_listeners(&self, document: &FakeDocument, events: DragEvents) {
        let mut listeners = document.0.listeners.borrow_mut();
        for name in [events.drag, events.stop] {
            if !listeners.contains(&name) {
                listeners.push(name);
            }
        }
    }

    fn remove_listeners(&self, document: &FakeDocument, events: DragEvents) {
        document
            .0
            .listeners
            .borrow_mut()
            .retain(|name| *name != events.drag && *name != events.stop);
    }

    fn request_animation_frame(&self, task: Box<dyn FnOnce()>) {
        self.frames.borrow_mut().push(task);
    }
}

impl UserSelectHack<FakeDocument> for FakeHost {
    fn enable(&self, document: &FakeDocument) {
        document.0.selection_disabled.set(true);
    }

    fn disable(&self, document: &FakeDocument) {
        document.0.selection_disabled.set(false);
    }
}

thread_local! {
    static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Logger that keeps warnings per test thread.
struct WarningLog;

impl log::Log for WarningLog {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            WARNINGS.with(|warnings| warnings.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static WARNING_LOG: WarningLog = WarningLog;

/// Install the warning logger and forget this thread's earlier warnings.
pub fn capture_warnings() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if log::set_logger(&WARNING_LOG).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }
    });
    WARNINGS.with(|warnings| warnings.borrow_mut().clear());
}

/// Warnings logged on this thread since the last call.
pub fn take_warnings() -> Vec<String> {
    WARNINGS.with(|warnings| std::mem::take(&mut *warnings.borrow_mut()))
}
