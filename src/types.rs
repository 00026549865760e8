/*
 * Platform-agnostic types describing a custom menu control: its geometry,
 * the subclass identity it is registered under, the opaque word handed back
 * to the callback, and the non-owning handle returned by the factory.
 *
 * Nothing here touches Win32 so these types compile and are tested on every
 * host.
 */

use std::fmt;

// Message identifiers the router distinguishes. Values match winuser.h.
pub const WM_PAINT: u32 = 0x000F;
pub const WM_NCDESTROY: u32 = 0x0082;

/// Position and size of a control in parent client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ControlRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/*
 * Identifies one subclass callback among several that may be attached to the
 * same control. The factory always registers under `SubclassId::MENU`, so two
 * menus on one control would collide; callers needing more pick their own id
 * through `MenuControlConfig`.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubclassId(pub usize);

impl SubclassId {
    pub const MENU: SubclassId = SubclassId(0);

    pub const fn raw(self) -> usize {
        self.0
    }
}

impl Default for SubclassId {
    fn default() -> Self {
        SubclassId::MENU
    }
}

/// Opaque word passed back to the subclass callback on every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RefData(pub usize);

impl RefData {
    pub const NONE: RefData = RefData(0);

    pub const fn raw(self) -> usize {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/*
 * Everything the factory needs to know about one control besides the parent
 * and module instance handles.
 */
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuControlConfig {
    pub rect: ControlRect,
    pub subclass_id: SubclassId,
    pub ref_data: RefData,
    pub label: Option<String>,
}

impl MenuControlConfig {
    pub fn at(rect: ControlRect) -> Self {
        Self {
            rect,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_subclass_id(mut self, subclass_id: SubclassId) -> Self {
        self.subclass_id = subclass_id;
        self
    }
}

/*
 * Non-owning reference to a control created by the factory. The control
 * belongs to the windowing system and is destroyed together with its parent;
 * dropping a `ControlRef` never destroys anything. The reference records the
 * subclass id it was registered under so teardown can find it again.
 */
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ControlRef<H> {
    handle: H,
    subclass_id: SubclassId,
}

impl<H: Copy> ControlRef<H> {
    pub(crate) fn new(handle: H, subclass_id: SubclassId) -> Self {
        Self {
            handle,
            subclass_id,
        }
    }

    pub fn handle(&self) -> H {
        self.handle
    }

    pub fn subclass_id(&self) -> SubclassId {
        self.subclass_id
    }
}

impl<H: fmt::Debug> fmt::Debug for ControlRef<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlRef")
            .field("handle", &self.handle)
            .field("subclass_id", &self.subclass_id.0)
            .finish()
    }
}

/// Result of asking a paint strategy to render the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The strategy drew the control; the callback reports the message as handled.
    Painted,
    /// Nothing was drawn; the message goes to default handling.
    Deferred,
}
