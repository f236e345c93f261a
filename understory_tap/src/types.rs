// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-facing types: element descriptions, touch and native events, and the
//! traits a host implements so the shim can query and act on its node tree.

use kurbo::Point;
use smallvec::SmallVec;

/// Element kind as far as tap handling is concerned.
///
/// Hosts map their own element types onto these; anything the shim has no
/// special handling for is [`Tag::Other`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A push button.
    Button,
    /// A form input; see [`InputType`].
    Input,
    /// A key-pair generator control.
    Keygen,
    /// A label, possibly associated with a control.
    Label,
    /// A scalar gauge.
    Meter,
    /// A calculation result.
    Output,
    /// A progress indicator.
    Progress,
    /// A drop-down select.
    Select,
    /// A multi-line text area.
    TextArea,
    /// An embedded frame.
    IFrame,
    /// A video player.
    Video,
    /// Any other element.
    #[default]
    Other,
}

impl Tag {
    /// Whether a label may target this kind of element, ignoring input type.
    pub const fn is_labelable(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::Input
                | Self::Keygen
                | Self::Meter
                | Self::Output
                | Self::Progress
                | Self::Select
                | Self::TextArea
        )
    }
}

/// Type of an [`Tag::Input`] element, or of a [`Tag::Button`].
///
/// For buttons only [`InputType::Submit`], [`InputType::Button`] and
/// [`InputType::Reset`] are meaningful; any other value is treated as a
/// submit button, matching a button without a `type` attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputType {
    /// Plain text entry (also the fallback for unknown types).
    #[default]
    Text,
    /// Push button.
    Button,
    /// Checkbox.
    Checkbox,
    /// File picker.
    File,
    /// Hidden value.
    Hidden,
    /// Image submit button.
    Image,
    /// Radio button.
    Radio,
    /// Form submit button.
    Submit,
    /// Form reset button.
    Reset,
    /// Date picker.
    Date,
    /// Date and local time picker.
    DateTimeLocal,
    /// Time picker.
    Time,
    /// Month picker.
    Month,
    /// Password entry.
    Password,
    /// Search field.
    Search,
    /// Email entry.
    Email,
    /// Number entry.
    Number,
    /// Telephone entry.
    Tel,
    /// URL entry.
    Url,
}

impl InputType {
    /// Whether the platform opens a picker for this type rather than a caret.
    pub const fn is_date_like(self) -> bool {
        matches!(
            self,
            Self::Date | Self::DateTimeLocal | Self::Time | Self::Month
        )
    }
}

bitflags::bitflags! {
    /// Per-element state relevant to tap handling.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// The control is disabled.
        const DISABLED   = 0b0000_0001;
        /// The control is read-only.
        const READ_ONLY  = 0b0000_0010;
        /// Opt-out marker: leave native activation alone for this element.
        const NEEDS_CLICK = 0b0000_0100;
        /// Opt-in marker: manage focus explicitly for this element.
        const NEEDS_FOCUS = 0b0000_1000;
    }
}

impl ElementFlags {
    /// Marker flags found in a whitespace-separated class list.
    ///
    /// `needsclick` and `needsfocus` match as whole words, where anything other
    /// than an ASCII alphanumeric or `_` separates words. `foo-needsclick`
    /// therefore carries the marker while `needsclicks` does not.
    ///
    /// ```
    /// use understory_tap::ElementFlags;
    ///
    /// let flags = ElementFlags::from_class_list("btn needsclick");
    /// assert_eq!(flags, ElementFlags::NEEDS_CLICK);
    /// assert!(ElementFlags::from_class_list("needsclicks").is_empty());
    /// ```
    pub fn from_class_list(classes: &str) -> Self {
        let mut flags = Self::empty();
        for word in classes.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
            match word {
                "needsclick" => flags |= Self::NEEDS_CLICK,
                "needsfocus" => flags |= Self::NEEDS_FOCUS,
                _ => {}
            }
        }
        flags
    }
}

/// Snapshot of an element, borrowed from the host.
#[derive(Clone, Debug, Default)]
pub struct ElementInfo<'a> {
    /// Element kind.
    pub tag: Tag,
    /// Input type; only meaningful for [`Tag::Input`].
    pub input_type: InputType,
    /// State and marker flags.
    pub flags: ElementFlags,
    /// Id referenced by a label's `for` attribute.
    pub html_for: Option<&'a str>,
    /// Length of the current value, when the element supports text selection.
    pub selection_len: Option<usize>,
}

impl ElementInfo<'_> {
    /// Whether the element is disabled.
    pub fn is_disabled(&self) -> bool {
        self.flags.contains(ElementFlags::DISABLED)
    }

    /// Whether this element is an input of the given type.
    pub fn is_input(&self, ty: InputType) -> bool {
        self.tag == Tag::Input && self.input_type == ty
    }

    /// Whether activating this element submits its form.
    ///
    /// True for submit inputs and for buttons that are not explicitly
    /// `button` or `reset`.
    pub fn is_submit(&self) -> bool {
        match self.tag {
            Tag::Input => self.input_type == InputType::Submit,
            Tag::Button => !matches!(self.input_type, InputType::Button | InputType::Reset),
            _ => false,
        }
    }
}

/// Scroll geometry of an element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Full content height.
    pub scroll_height: f64,
    /// Visible height.
    pub offset_height: f64,
    /// Current vertical scroll offset.
    pub scroll_top: f64,
}

impl ScrollMetrics {
    /// Whether content overflows the visible box.
    pub fn overflows(&self) -> bool {
        self.scroll_height > self.offset_height
    }
}

/// One touch contact point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Touch {
    /// Platform identifier of the contact. Zero on platforms that do not assign one.
    pub identifier: i64,
    /// Position relative to the document.
    pub page: Point,
    /// Position relative to the viewport.
    pub client: Point,
    /// Position relative to the screen.
    pub screen: Point,
}

impl Touch {
    /// A contact with identical page, client and screen coordinates.
    pub fn at(identifier: i64, position: Point) -> Self {
        Self {
            identifier,
            page: position,
            client: position,
            screen: position,
        }
    }
}

/// Contact list carried by a touch event.
pub type TouchList = SmallVec<[Touch; 2]>;

/// A touch lifecycle event delivered to the surface.
#[derive(Clone, Debug)]
pub struct TouchEvent<K> {
    /// Node the event was dispatched at. May be a text node.
    pub target: K,
    /// Event timestamp in milliseconds on a monotonic clock.
    pub timestamp: u64,
    /// Contacts currently on the surface that started on the target.
    pub target_touches: TouchList,
    /// Contacts that changed in this event.
    pub changed_touches: TouchList,
}

impl<K> TouchEvent<K> {
    /// A single-contact event, the common case for taps.
    ///
    /// For end events the contact has left the surface, so only
    /// `changed_touches` is populated; use [`TouchEvent::ended`] for that.
    pub fn single(target: K, timestamp: u64, touch: Touch) -> Self {
        let mut target_touches = TouchList::new();
        target_touches.push(touch);
        Self {
            target,
            timestamp,
            changed_touches: target_touches.clone(),
            target_touches,
        }
    }

    /// A touch-end event for one contact lifting off.
    pub fn ended(target: K, timestamp: u64, touch: Touch) -> Self {
        let mut changed_touches = TouchList::new();
        changed_touches.push(touch);
        Self {
            target,
            timestamp,
            target_touches: TouchList::new(),
            changed_touches,
        }
    }

    /// First changed contact, if any.
    pub fn changed_touch(&self) -> Option<&Touch> {
        self.changed_touches.first()
    }
}

/// Where an event came from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventOrigin {
    /// Produced by the platform.
    #[default]
    Native,
    /// Produced by this crate's activation dispatcher.
    Synthetic,
}

/// Native pointer and activation events the gate may intercept.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeKind {
    /// Pointer entered an element.
    MouseOver,
    /// Pointer pressed.
    MouseDown,
    /// Pointer released.
    MouseUp,
    /// Activation.
    Click,
}

/// A native (or re-delivered synthetic) pointer event.
#[derive(Copy, Clone, Debug)]
pub struct NativeEvent<K> {
    /// Event kind.
    pub kind: NativeKind,
    /// Node the event was dispatched at.
    pub target: K,
    /// Whether the event came from the platform or from this crate.
    pub origin: EventOrigin,
    /// Whether the default action can be prevented.
    pub cancelable: bool,
    /// Click count; zero for activations triggered without a pointer (keyboard).
    pub detail: u32,
}

impl<K> NativeEvent<K> {
    /// A cancelable native event from a pointer.
    pub fn native(kind: NativeKind, target: K) -> Self {
        Self {
            kind,
            target,
            origin: EventOrigin::Native,
            cancelable: true,
            detail: 1,
        }
    }
}

/// Type of a synthetic activation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActivationKind {
    /// An ordinary click.
    Click,
    /// A press, for controls that open on pointer down.
    MouseDown,
}

/// A synthetic mouse-style activation built from a tap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SyntheticActivation<K> {
    /// Activation type.
    pub kind: ActivationKind,
    /// Element the activation is dispatched at.
    pub target: K,
    /// Screen coordinates of the terminal contact.
    pub screen: Point,
    /// Viewport coordinates of the terminal contact.
    pub client: Point,
    /// Click count.
    pub detail: u32,
    /// Whether the event bubbles.
    pub bubbles: bool,
    /// Whether the default action can be prevented.
    pub cancelable: bool,
    /// Always [`EventOrigin::Synthetic`].
    pub origin: EventOrigin,
}

impl<K: Copy> SyntheticActivation<K> {
    /// The native-event view of this activation, as a host would redeliver it.
    pub fn as_native(&self) -> NativeEvent<K> {
        NativeEvent {
            kind: match self.kind {
                ActivationKind::Click => NativeKind::Click,
                ActivationKind::MouseDown => NativeKind::MouseDown,
            },
            target: self.target,
            origin: self.origin,
            cancelable: self.cancelable,
            detail: self.detail,
        }
    }
}

/// Read-only view of the host's node tree.
pub trait Dom {
    /// Node handle. Must be stable for the lifetime of the node.
    type Node: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Whether `node` is a text node.
    fn is_text(&self, node: Self::Node) -> bool;
    /// Parent element of `node`.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    /// First child of `node`.
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    /// Next sibling of `node`.
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    /// Element description, or `None` for non-element nodes.
    fn element(&self, node: Self::Node) -> Option<ElementInfo<'_>>;
    /// Native control association of a label, when the host tracks one.
    fn label_control(&self, label: Self::Node) -> Option<Self::Node>;
    /// Look up an element by id.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    /// Scroll geometry of `node`.
    fn scroll_metrics(&self, node: Self::Node) -> ScrollMetrics;
    /// Element currently holding input focus.
    fn active_element(&self) -> Option<Self::Node>;
    /// Whether the document has a non-collapsed text selection.
    fn has_text_selection(&self) -> bool;
    /// Whether the document is embedded in a frame.
    fn is_embedded(&self) -> bool;
    /// Topmost element at a viewport position.
    fn element_from_point(&self, client: Point) -> Option<Self::Node>;

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// Side effects the shim performs on the host.
pub trait DomMut: Dom {
    /// Give `node` input focus.
    fn focus(&mut self, node: Self::Node);
    /// Remove input focus from `node`.
    fn blur(&mut self, node: Self::Node);
    /// Set the text selection of `node`; also focuses it.
    fn set_selection_range(&mut self, node: Self::Node, start: usize, end: usize);
    /// Deliver a synthetic activation to listeners on and above its target.
    ///
    /// Hosts that route the activation back through [`FastTap::on_native`](crate::FastTap::on_native)
    /// do so after the current touch handler returns.
    fn dispatch_activation(&mut self, event: SyntheticActivation<Self::Node>);
}

/// Event types the shim listens for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Touch start.
    TouchStart,
    /// Touch move.
    TouchMove,
    /// Touch end.
    TouchEnd,
    /// Touch cancel.
    TouchCancel,
    /// Activation.
    Click,
    /// Pointer over.
    MouseOver,
    /// Pointer down.
    MouseDown,
    /// Pointer up.
    MouseUp,
}

/// Propagation phase a listener is registered for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerPhase {
    /// Root to target.
    Capture,
    /// Target to root.
    Bubble,
}

/// Listener registry of the surface the shim is attached to.
pub trait Surface {
    /// Registration handle returned by [`Surface::add_listener`].
    type Listener;

    /// Route events of `kind` in `phase` to the shim.
    fn add_listener(&mut self, kind: ListenerKind, phase: ListenerPhase) -> Self::Listener;
    /// Undo a registration.
    fn remove_listener(&mut self, listener: Self::Listener);
}
