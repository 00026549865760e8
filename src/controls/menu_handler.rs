/*
 * Win32 entry points for the custom menu control: the subclass procedure
 * registered with `SetWindowSubclass`, and the HWND-typed wrappers around the
 * portable factory in `menu_control`.
 *
 * The subclass procedure is a shim: it pins the reference data, decodes it
 * into the control's paint strategy (or `DeferToDefault` when there is none)
 * and hands the message to `route_subclass_message`. A strategy released
 * while a dispatch is running, e.g. by a painter that detaches or destroys its
 * own control, is freed only once the outermost dispatch has returned.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::menu_control::{self, DeferToDefault, PaintStrategy};
use crate::types::{ControlRef, MenuControlConfig, PaintOutcome, RefData, SubclassId};
use crate::window_common::{PaintScope, Win32Backend};

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};

/// Non-owning reference to a custom menu control created on Windows.
pub type MenuControl = ControlRef<HWND>;

/*
 * Renders the control inside a BeginPaint/EndPaint pair. Implementors only
 * draw; the scope is opened and closed around them and the callback reports
 * WM_PAINT as handled afterwards.
 *
 * `draw` runs inside an `extern "system"` callback. A panic is caught at that
 * boundary, logged, and the message falls through to default handling; the
 * painter stays attached.
 */
pub trait ScopedPainter {
    fn draw(&self, scope: &PaintScope);
}

/// Adapts a `ScopedPainter` to the paint branch of the subclass callback.
pub(crate) struct Scoped<P>(pub P);

impl<P: ScopedPainter> PaintStrategy<Win32Backend> for Scoped<P> {
    fn paint(&self, _backend: &Win32Backend, control: HWND) -> PaintOutcome {
        let Some(scope) = PaintScope::begin(control) else {
            return PaintOutcome::Deferred;
        };
        match catch_unwind(AssertUnwindSafe(|| self.0.draw(&scope))) {
            Ok(()) => PaintOutcome::Painted,
            Err(_) => {
                log::error!("CustomMenu: Painter for {control:?} panicked; deferring WM_PAINT");
                PaintOutcome::Deferred
            }
        }
    }
}

/*
 * Heap cell behind a non-zero reference-data word. The dispatch counter and
 * release flag let a release that happens during a dispatch be deferred until
 * no callback borrows the strategy any more.
 */
pub(crate) struct StrategyCell {
    strategy: Box<dyn PaintStrategy<Win32Backend>>,
    active_dispatches: Cell<u32>,
    release_requested: Cell<bool>,
}

impl StrategyCell {
    fn into_ref_data(strategy: Box<dyn PaintStrategy<Win32Backend>>) -> RefData {
        let cell = Box::new(StrategyCell {
            strategy,
            active_dispatches: Cell::new(0),
            release_requested: Cell::new(false),
        });
        RefData(Box::into_raw(cell) as usize)
    }

    /// # Safety
    /// `ref_data` must come from `into_ref_data` and must not have been freed.
    unsafe fn from_ref_data<'a>(ref_data: RefData) -> &'a StrategyCell {
        unsafe { &*(ref_data.raw() as *const StrategyCell) }
    }

    /// # Safety
    /// Same contract as `from_ref_data`.
    pub(crate) unsafe fn pin(ref_data: RefData) {
        let cell = unsafe { Self::from_ref_data(ref_data) };
        cell.active_dispatches.set(cell.active_dispatches.get() + 1);
    }

    /// # Safety
    /// Same contract as `from_ref_data`; must balance an earlier `pin`.
    pub(crate) unsafe fn unpin(ref_data: RefData) {
        let free_now = {
            let cell = unsafe { Self::from_ref_data(ref_data) };
            let remaining = cell.active_dispatches.get().saturating_sub(1);
            cell.active_dispatches.set(remaining);
            remaining == 0 && cell.release_requested.get()
        };
        if free_now {
            unsafe { Self::free(ref_data) };
        }
    }

    /// # Safety
    /// Same contract as `from_ref_data`; called at most once per cell.
    pub(crate) unsafe fn release(ref_data: RefData) {
        let free_now = {
            let cell = unsafe { Self::from_ref_data(ref_data) };
            if cell.active_dispatches.get() > 0 {
                cell.release_requested.set(true);
                false
            } else {
                true
            }
        };
        if free_now {
            unsafe { Self::free(ref_data) };
        } else {
            log::debug!(
                "CustomMenu: Paint strategy at {:#x} released mid-dispatch; freeing after it returns",
                ref_data.raw()
            );
        }
    }

    unsafe fn free(ref_data: RefData) {
        drop(unsafe { Box::from_raw(ref_data.raw() as *mut StrategyCell) });
        log::debug!("CustomMenu: Released paint strategy at {:#x}", ref_data.raw());
    }
}

/*
 * The SUBCLASSPROC attached to every custom menu control. It cannot fail:
 * whatever path a message takes, the result is either "handled" from the
 * paint strategy or the value `DefSubclassProc` returned.
 */
pub(crate) unsafe extern "system" fn custom_menu_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    uidsubclass: usize,
    dwrefdata: usize,
) -> LRESULT {
    let backend = Win32Backend;
    let id = SubclassId(uidsubclass);
    let ref_data = RefData(dwrefdata);

    let result = menu_control::with_ref_data_pinned(&backend, ref_data, || {
        if ref_data.is_none() {
            menu_control::route_subclass_message(
                &backend,
                &DeferToDefault,
                hwnd,
                msg,
                wparam.0,
                lparam.0,
                id,
                ref_data,
            )
        } else {
            // Pinned above, so the cell outlives this closure.
            let cell = unsafe { StrategyCell::from_ref_data(ref_data) };
            menu_control::route_subclass_message(
                &backend,
                cell.strategy.as_ref(),
                hwnd,
                msg,
                wparam.0,
                lparam.0,
                id,
                ref_data,
            )
        }
    });
    LRESULT(result)
}

fn reject_caller_ref_data(config: &MenuControlConfig) -> PlatformResult<()> {
    if config.ref_data.is_none() {
        return Ok(());
    }
    log::warn!(
        "CustomMenu: Caller reference data {:#x} rejected; on Windows it is reserved for paint strategies",
        config.ref_data.raw()
    );
    Err(PlatformError::OperationFailed(format!(
        "Reference data {:#x} cannot be supplied on Windows; use create_custom_menu_with",
        config.ref_data.raw()
    )))
}

/*
 * Creates an owner-drawn BUTTON under `parent` and subclasses it with the
 * pass-through menu callback. `config.ref_data` must be `RefData::NONE`; on
 * Windows the word is reserved for the paint strategy.
 */
pub fn create_custom_menu(
    parent: HWND,
    instance: HINSTANCE,
    config: &MenuControlConfig,
) -> PlatformResult<MenuControl> {
    reject_caller_ref_data(config)?;
    menu_control::create_custom_menu(&Win32Backend, parent, instance, config)
}

/*
 * Like `create_custom_menu`, but WM_PAINT is handed to `painter` inside a
 * paint scope. The painter lives until the control is destroyed or the menu
 * is detached, whichever happens first. On error it is dropped before
 * returning.
 */
pub fn create_custom_menu_with<P: ScopedPainter + 'static>(
    parent: HWND,
    instance: HINSTANCE,
    config: &MenuControlConfig,
    painter: P,
) -> PlatformResult<MenuControl> {
    reject_caller_ref_data(config)?;
    let backend = Win32Backend;
    let ref_data = StrategyCell::into_ref_data(Box::new(Scoped(painter)));
    let config = MenuControlConfig {
        ref_data,
        ..config.clone()
    };
    menu_control::create_custom_menu(&backend, parent, instance, &config).inspect_err(|_| {
        // The subclass never took ownership.
        unsafe { StrategyCell::release(ref_data) };
    })
}

pub fn detach_custom_menu(control: MenuControl) -> PlatformResult<()> {
    menu_control::detach_custom_menu(&Win32Backend, control)
}

pub fn is_custom_menu(control: MenuControl) -> bool {
    menu_control::is_custom_menu(&Win32Backend, control)
}
