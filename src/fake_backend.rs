/*
 * In-memory `SubclassBackend` used by unit tests. It keeps a tiny window tree
 * with per-window style and subclass tables and records how often each
 * primitive was called, so tests can assert on what the factory did *not* do.
 */

use crate::backend::SubclassBackend;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{ControlRect, RefData, SubclassId, WM_PAINT};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FakeHandle(pub usize);

impl FakeHandle {
    pub(crate) const INVALID: FakeHandle = FakeHandle(0);
}

#[derive(Debug)]
struct FakeWindow {
    parent: Option<FakeHandle>,
    owner_draw: bool,
    rect: ControlRect,
    label: Option<String>,
    subclasses: HashMap<SubclassId, RefData>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    windows: RefCell<HashMap<FakeHandle, FakeWindow>>,
    next_handle: Cell<usize>,
    create_attempts: Cell<u32>,
    install_attempts: Cell<u32>,
    default_proc_calls: Cell<u32>,
    fail_next_create: Cell<bool>,
    fail_next_install: Cell<bool>,
    released: RefCell<Vec<RefData>>,
    pins: RefCell<HashMap<RefData, u32>>,
    pending_release: RefCell<HashSet<RefData>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        let backend = Self::default();
        backend.next_handle.set(0x100);
        backend
    }

    fn allocate(&self, window: FakeWindow) -> FakeHandle {
        let handle = FakeHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 4);
        self.windows.borrow_mut().insert(handle, window);
        handle
    }

    pub(crate) fn add_top_level_window(&self) -> FakeHandle {
        self.allocate(FakeWindow {
            parent: None,
            owner_draw: false,
            rect: ControlRect::new(0, 0, 640, 480),
            label: None,
            subclasses: HashMap::new(),
        })
    }

    pub(crate) fn fail_next_create(&self) {
        self.fail_next_create.set(true);
    }

    pub(crate) fn fail_next_install(&self) {
        self.fail_next_install.set(true);
    }

    pub(crate) fn create_attempts(&self) -> u32 {
        self.create_attempts.get()
    }

    pub(crate) fn install_attempts(&self) -> u32 {
        self.install_attempts.get()
    }

    pub(crate) fn default_proc_calls(&self) -> u32 {
        self.default_proc_calls.get()
    }

    pub(crate) fn released(&self) -> Vec<RefData> {
        self.released.borrow().clone()
    }

    pub(crate) fn is_pinned(&self, ref_data: RefData) -> bool {
        self.pins.borrow().get(&ref_data).is_some_and(|count| *count > 0)
    }

    pub(crate) fn rect_of(&self, handle: FakeHandle) -> Option<ControlRect> {
        self.windows.borrow().get(&handle).map(|w| w.rect)
    }

    pub(crate) fn label_of(&self, handle: FakeHandle) -> Option<String> {
        self.windows
            .borrow()
            .get(&handle)
            .and_then(|w| w.label.clone())
    }

    pub(crate) fn live_children_of(&self, parent: FakeHandle) -> usize {
        self.windows
            .borrow()
            .values()
            .filter(|w| w.parent == Some(parent))
            .count()
    }
}

impl SubclassBackend for FakeBackend {
    type Handle = FakeHandle;
    type Instance = ();

    fn is_window(&self, handle: FakeHandle) -> bool {
        self.windows.borrow().contains_key(&handle)
    }

    fn create_owner_draw_button(
        &self,
        parent: FakeHandle,
        _instance: (),
        rect: &ControlRect,
        label: Option<&str>,
    ) -> PlatformResult<FakeHandle> {
        self.create_attempts.set(self.create_attempts.get() + 1);
        if self.fail_next_create.replace(false) || !self.is_window(parent) {
            return Err(PlatformError::CreationFailed(
                "fake CreateWindowExW failure".to_string(),
            ));
        }
        Ok(self.allocate(FakeWindow {
            parent: Some(parent),
            owner_draw: true,
            rect: *rect,
            label: label.map(str::to_string),
            subclasses: HashMap::new(),
        }))
    }

    fn destroy_control(&self, control: FakeHandle) {
        self.windows.borrow_mut().remove(&control);
    }

    fn install_subclass(
        &self,
        control: FakeHandle,
        id: SubclassId,
        ref_data: RefData,
    ) -> PlatformResult<()> {
        self.install_attempts.set(self.install_attempts.get() + 1);
        if self.fail_next_install.replace(false) {
            return Err(PlatformError::SubclassFailed(
                "fake SetWindowSubclass failure".to_string(),
            ));
        }
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&control).ok_or_else(|| {
            PlatformError::InvalidHandle(format!("{control:?} is not a live window"))
        })?;
        window.subclasses.insert(id, ref_data);
        Ok(())
    }

    fn remove_subclass(&self, control: FakeHandle, id: SubclassId) -> PlatformResult<RefData> {
        self.windows
            .borrow_mut()
            .get_mut(&control)
            .and_then(|w| w.subclasses.remove(&id))
            .ok_or_else(|| {
                PlatformError::OperationFailed(format!("no subclass {} on {control:?}", id.raw()))
            })
    }

    fn subclass_ref_data(&self, control: FakeHandle, id: SubclassId) -> Option<RefData> {
        self.windows
            .borrow()
            .get(&control)
            .and_then(|w| w.subclasses.get(&id).copied())
    }

    fn release_ref_data(&self, ref_data: RefData) {
        if ref_data.is_none() {
            return;
        }
        if self.is_pinned(ref_data) {
            self.pending_release.borrow_mut().insert(ref_data);
        } else {
            self.released.borrow_mut().push(ref_data);
        }
    }

    fn pin_ref_data(&self, ref_data: RefData) {
        *self.pins.borrow_mut().entry(ref_data).or_insert(0) += 1;
    }

    fn unpin_ref_data(&self, ref_data: RefData) {
        let remaining = {
            let mut pins = self.pins.borrow_mut();
            let count = pins.entry(ref_data).or_insert(1);
            *count -= 1;
            *count
        };
        if remaining == 0 && self.pending_release.borrow_mut().remove(&ref_data) {
            self.released.borrow_mut().push(ref_data);
        }
    }

    // Deterministic stand-in for DefSubclassProc: WM_PAINT validates and
    // returns 0, everything else mixes the inputs.
    fn default_subclass_proc(
        &self,
        _control: FakeHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> isize {
        self.default_proc_calls.set(self.default_proc_calls.get() + 1);
        if msg == WM_PAINT {
            return 0;
        }
        (msg as isize) ^ (wparam as isize).wrapping_mul(31) ^ lparam
    }

    fn parent_of(&self, control: FakeHandle) -> Option<FakeHandle> {
        self.windows.borrow().get(&control).and_then(|w| w.parent)
    }

    fn is_owner_draw(&self, control: FakeHandle) -> bool {
        self.windows
            .borrow()
            .get(&control)
            .is_some_and(|w| w.owner_draw)
    }
}
