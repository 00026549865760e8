/*
 * Platform-agnostic core of the custom menu control.
 *
 * `create_custom_menu` builds an owner-drawn button under a parent window and
 * attaches the menu subclass callback to it. The callback itself is a thin
 * `extern "system"` shim (see `controls::menu_handler`) that hands every
 * message to `route_subclass_message`. With the default `DeferToDefault`
 * strategy every message, WM_PAINT included, is forwarded to the default
 * subclass procedure and its result returned unchanged.
 *
 * Teardown happens either automatically on WM_NCDESTROY or explicitly via
 * `detach_custom_menu`. Both paths remove the subclass and release the
 * reference data exactly once.
 */

use crate::backend::SubclassBackend;
use crate::controls::paint_router::{MessageRoute, resolve_message_route};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{ControlRef, MenuControlConfig, PaintOutcome, RefData, SubclassId};

/*
 * Draw strategy invoked from the paint branch of the subclass callback.
 * Returning `Painted` makes the callback report WM_PAINT as handled;
 * `Deferred` lets the default procedure validate the update region.
 */
pub trait PaintStrategy<B: SubclassBackend + ?Sized> {
    fn paint(&self, backend: &B, control: B::Handle) -> PaintOutcome;
}

/// The stub behaviour: never draws, always defers to default handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferToDefault;

impl<B: SubclassBackend + ?Sized> PaintStrategy<B> for DeferToDefault {
    fn paint(&self, _backend: &B, _control: B::Handle) -> PaintOutcome {
        PaintOutcome::Deferred
    }
}

/*
 * Creates the owner-drawn button and registers the menu subclass callback on
 * it. The parent is validated first; on an invalid parent or degenerate
 * rectangle nothing is created and no subclass registration is attempted. If
 * registration fails after creation the new control is destroyed so the
 * caller never receives a half-initialised control.
 */
pub fn create_custom_menu<B: SubclassBackend>(
    backend: &B,
    parent: B::Handle,
    instance: B::Instance,
    config: &MenuControlConfig,
) -> PlatformResult<ControlRef<B::Handle>> {
    log::debug!(
        "CustomMenu: create_custom_menu under parent {parent:?} at {:?}, SubclassID {}",
        config.rect,
        config.subclass_id.raw()
    );

    if !backend.is_window(parent) {
        log::warn!("CustomMenu: Parent {parent:?} is not a live window; skipping creation");
        return Err(PlatformError::InvalidHandle(format!(
            "Parent {parent:?} for custom menu is not a live window"
        )));
    }

    if config.rect.is_degenerate() {
        log::warn!(
            "CustomMenu: Refusing to create control with degenerate geometry {:?}",
            config.rect
        );
        return Err(PlatformError::InvalidGeometry(format!(
            "Custom menu needs positive width and height, got {}x{}",
            config.rect.width, config.rect.height
        )));
    }

    let control = backend
        .create_owner_draw_button(parent, instance, &config.rect, config.label.as_deref())
        .inspect_err(|err| {
            log::error!("CustomMenu: Control creation under {parent:?} failed: {err}");
        })?;

    if let Err(err) = backend.install_subclass(control, config.subclass_id, config.ref_data) {
        log::error!(
            "CustomMenu: Subclassing {control:?} under ID {} failed: {err}. Destroying control.",
            config.subclass_id.raw()
        );
        backend.destroy_control(control);
        return Err(err);
    }

    log::debug!(
        "CustomMenu: Created custom menu {control:?} (SubclassID {}) under {parent:?}",
        config.subclass_id.raw()
    );
    Ok(ControlRef::new(control, config.subclass_id))
}

/*
 * Removes the menu subclass from `control` and releases its reference data.
 * Fails if the callback is not attached under the control's subclass id,
 * which also covers a second detach of the same control.
 */
pub fn detach_custom_menu<B: SubclassBackend>(
    backend: &B,
    control: ControlRef<B::Handle>,
) -> PlatformResult<()> {
    let handle = control.handle();
    let id = control.subclass_id();
    if backend.subclass_ref_data(handle, id).is_none() {
        log::warn!(
            "CustomMenu: detach requested for {handle:?} but no subclass with ID {} is attached",
            id.raw()
        );
        return Err(PlatformError::OperationFailed(format!(
            "No custom menu subclass with ID {} attached to {handle:?}",
            id.raw()
        )));
    }

    let ref_data = backend.remove_subclass(handle, id)?;
    backend.release_ref_data(ref_data);
    log::debug!(
        "CustomMenu: Detached subclass ID {} from {handle:?}",
        id.raw()
    );
    Ok(())
}

pub fn is_custom_menu<B: SubclassBackend>(backend: &B, control: ControlRef<B::Handle>) -> bool {
    backend
        .subclass_ref_data(control.handle(), control.subclass_id())
        .is_some()
}

/*
 * Runs one callback dispatch with `ref_data` pinned. Anything the dispatch
 * does to tear the control down (detach, DestroyWindow -> WM_NCDESTROY) only
 * records the release; the storage behind `ref_data` is freed after
 * `dispatch` has returned and no borrow of the strategy remains.
 */
pub fn with_ref_data_pinned<B: SubclassBackend, R>(
    backend: &B,
    ref_data: RefData,
    dispatch: impl FnOnce() -> R,
) -> R {
    if ref_data.is_none() {
        return dispatch();
    }
    backend.pin_ref_data(ref_data);
    let result = dispatch();
    backend.unpin_ref_data(ref_data);
    result
}

/*
 * Body of the subclass callback. Never fails: every path ends in either a
 * "handled" result from the paint strategy or the default procedure's result.
 */
#[allow(clippy::too_many_arguments)]
pub fn route_subclass_message<B: SubclassBackend>(
    backend: &B,
    strategy: &dyn PaintStrategy<B>,
    control: B::Handle,
    msg: u32,
    wparam: usize,
    lparam: isize,
    id: SubclassId,
    ref_data: RefData,
) -> isize {
    match resolve_message_route(msg) {
        MessageRoute::Paint => {
            if strategy.paint(backend, control) == PaintOutcome::Painted {
                return 0;
            }
        }
        MessageRoute::NcDestroy => {
            match backend.remove_subclass(control, id) {
                Ok(_) => backend.release_ref_data(ref_data),
                Err(err) => {
                    log::warn!("CustomMenu: Could not remove subclass from {control:?} on WM_NCDESTROY: {err}");
                }
            }
            log::debug!("CustomMenu: {control:?} destroyed; subclass ID {} released", id.raw());
        }
        MessageRoute::Default => {}
    }

    backend.default_subclass_proc(control, msg, wparam, lparam)
}
