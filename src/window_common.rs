/*
 * Win32 implementation of `SubclassBackend` plus the shared helpers the
 * custom menu control needs on Windows: the `PaintScope` begin/end-paint
 * guard and a few handle utilities.
 *
 * The control is a standard `BUTTON` with `BS_OWNERDRAW`, subclassed through
 * comctl32's `SetWindowSubclass` family rather than by swapping
 * `GWLP_WNDPROC`, so several subclasses can coexist on one control and
 * `DefSubclassProc` always reaches the next handler in the chain.
 */

use crate::backend::SubclassBackend;
use crate::controls::menu_handler::{StrategyCell, custom_menu_subclass_proc};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{ControlRect, RefData, SubclassId};

use windows::Win32::{
    Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, RECT, WPARAM},
    Graphics::Gdi::{BeginPaint, EndPaint, HDC, PAINTSTRUCT},
    UI::{
        Shell::{DefSubclassProc, GetWindowSubclass, RemoveWindowSubclass, SetWindowSubclass},
        WindowsAndMessaging::{
            BS_OWNERDRAW, BS_TYPEMASK, CreateWindowExW, DestroyWindow, GWL_STYLE, GetParent,
            GetWindowLongPtrW, IsWindow, WINDOW_EX_STYLE, WINDOW_STYLE, WS_CHILD, WS_VISIBLE,
        },
    },
};
use windows::core::{HSTRING, PCWSTR};

pub(crate) const WC_BUTTON: PCWSTR = windows::core::w!("BUTTON");

pub(crate) const HWND_INVALID: HWND = HWND(std::ptr::null_mut());

/// Zero-sized handle on the live Win32 windowing API.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Win32Backend;

impl SubclassBackend for Win32Backend {
    type Handle = HWND;
    type Instance = HINSTANCE;

    fn is_window(&self, handle: HWND) -> bool {
        handle != HWND_INVALID && unsafe { IsWindow(Some(handle)) }.as_bool()
    }

    fn create_owner_draw_button(
        &self,
        parent: HWND,
        instance: HINSTANCE,
        rect: &ControlRect,
        label: Option<&str>,
    ) -> PlatformResult<HWND> {
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                WC_BUTTON,
                &HSTRING::from(label.unwrap_or("")),
                WS_CHILD | WS_VISIBLE | WINDOW_STYLE(BS_OWNERDRAW as u32),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                Some(parent),
                None,
                Some(instance),
                None,
            )
        }
        .inspect_err(|err| {
            log::warn!("CustomMenu: CreateWindowExW(BUTTON, BS_OWNERDRAW) under {parent:?} failed: {err}");
        })?;

        if hwnd.is_invalid() {
            return Err(PlatformError::CreationFailed(format!(
                "CreateWindowExW(BUTTON, BS_OWNERDRAW) under {parent:?} returned a null HWND"
            )));
        }
        Ok(hwnd)
    }

    fn destroy_control(&self, control: HWND) {
        if let Err(err) = unsafe { DestroyWindow(control) } {
            log::warn!("CustomMenu: DestroyWindow({control:?}) failed: {err}");
        }
    }

    fn install_subclass(&self, control: HWND, id: SubclassId, ref_data: RefData) -> PlatformResult<()> {
        let installed = unsafe {
            SetWindowSubclass(
                control,
                Some(custom_menu_subclass_proc),
                id.raw(),
                ref_data.raw(),
            )
        };
        if installed.as_bool() {
            Ok(())
        } else {
            let last_error = unsafe { GetLastError() };
            Err(PlatformError::SubclassFailed(format!(
                "SetWindowSubclass on {control:?} with ID {} failed (GetLastError: {})",
                id.raw(),
                last_error.0
            )))
        }
    }

    fn remove_subclass(&self, control: HWND, id: SubclassId) -> PlatformResult<RefData> {
        let ref_data = self.subclass_ref_data(control, id).ok_or_else(|| {
            PlatformError::OperationFailed(format!(
                "No menu subclass with ID {} on {control:?}",
                id.raw()
            ))
        })?;

        let removed =
            unsafe { RemoveWindowSubclass(control, Some(custom_menu_subclass_proc), id.raw()) };
        if !removed.as_bool() {
            return Err(PlatformError::OperationFailed(format!(
                "RemoveWindowSubclass on {control:?} with ID {} failed",
                id.raw()
            )));
        }
        Ok(ref_data)
    }

    fn subclass_ref_data(&self, control: HWND, id: SubclassId) -> Option<RefData> {
        let mut data = 0usize;
        let found = unsafe {
            GetWindowSubclass(
                control,
                Some(custom_menu_subclass_proc),
                id.raw(),
                Some(&mut data as *mut usize),
            )
        };
        found.as_bool().then_some(RefData(data))
    }

    fn release_ref_data(&self, ref_data: RefData) {
        if ref_data.is_none() {
            return;
        }
        // Non-zero reference data is only ever produced by `StrategyCell::into_ref_data`.
        unsafe { StrategyCell::release(ref_data) };
    }

    fn pin_ref_data(&self, ref_data: RefData) {
        if !ref_data.is_none() {
            unsafe { StrategyCell::pin(ref_data) };
        }
    }

    fn unpin_ref_data(&self, ref_data: RefData) {
        if !ref_data.is_none() {
            unsafe { StrategyCell::unpin(ref_data) };
        }
    }

    fn default_subclass_proc(&self, control: HWND, msg: u32, wparam: usize, lparam: isize) -> isize {
        unsafe { DefSubclassProc(control, msg, WPARAM(wparam), LPARAM(lparam)) }.0
    }

    fn parent_of(&self, control: HWND) -> Option<HWND> {
        unsafe { GetParent(control) }
            .ok()
            .filter(|parent| !parent.is_invalid())
    }

    fn is_owner_draw(&self, control: HWND) -> bool {
        let style = unsafe { GetWindowLongPtrW(control, GWL_STYLE) } as u32;
        (style & BS_TYPEMASK as u32) == BS_OWNERDRAW as u32
    }
}

/*
 * Scoped acquisition of the paint device context. `begin` calls BeginPaint
 * and the guard's `Drop` calls EndPaint, so the pair stays balanced on every
 * exit path of a painter, including early returns and panics.
 */
pub struct PaintScope {
    hwnd: HWND,
    hdc: HDC,
    ps: PAINTSTRUCT,
}

impl PaintScope {
    pub(crate) fn begin(hwnd: HWND) -> Option<Self> {
        let mut ps = PAINTSTRUCT::default();
        let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
        if hdc.is_invalid() {
            log::warn!("CustomMenu: BeginPaint failed for {hwnd:?}");
            return None;
        }
        Some(Self { hwnd, hdc, ps })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn hdc(&self) -> HDC {
        self.hdc
    }

    /// The invalidated region reported by BeginPaint.
    pub fn update_rect(&self) -> RECT {
        self.ps.rcPaint
    }

    pub fn needs_erase(&self) -> bool {
        self.ps.fErase.as_bool()
    }
}

impl Drop for PaintScope {
    fn drop(&mut self) {
        unsafe {
            let _ = EndPaint(self.hwnd, &self.ps);
        }
    }
}
