/*
 * The windowing primitives the custom menu needs, expressed as a trait so the
 * factory and the message router can be written once and exercised without a
 * live desktop. `window_common::Win32Backend` is the production
 * implementation; tests use an in-memory fake.
 *
 * Message parameters travel as raw machine words (`usize` for WPARAM, `isize`
 * for LPARAM and LRESULT) so this module stays free of Win32 types.
 */

use crate::error::Result as PlatformResult;
use crate::types::{ControlRect, RefData, SubclassId};

use std::fmt;

pub trait SubclassBackend {
    type Handle: Copy + Eq + fmt::Debug;
    type Instance: Copy + fmt::Debug;

    /// Returns true if `handle` identifies a live window.
    fn is_window(&self, handle: Self::Handle) -> bool;

    /// Creates a visible `BUTTON` child of `parent` with the owner-draw style.
    fn create_owner_draw_button(
        &self,
        parent: Self::Handle,
        instance: Self::Instance,
        rect: &ControlRect,
        label: Option<&str>,
    ) -> PlatformResult<Self::Handle>;

    fn destroy_control(&self, control: Self::Handle);

    /// Attaches the menu subclass callback under `id`.
    fn install_subclass(
        &self,
        control: Self::Handle,
        id: SubclassId,
        ref_data: RefData,
    ) -> PlatformResult<()>;

    /// Detaches the menu subclass callback and returns the reference data it carried.
    fn remove_subclass(&self, control: Self::Handle, id: SubclassId) -> PlatformResult<RefData>;

    /// Returns the reference data if the menu callback is attached under `id`.
    fn subclass_ref_data(&self, control: Self::Handle, id: SubclassId) -> Option<RefData>;

    /*
     * Gives up the crate's ownership of a reference-data word. Zero is a
     * no-op. While the word is pinned by a dispatch in progress the release is
     * only recorded; the storage is freed by the matching `unpin_ref_data`.
     */
    fn release_ref_data(&self, ref_data: RefData);

    /// Marks `ref_data` as in use by a callback dispatch. Pins nest.
    fn pin_ref_data(&self, ref_data: RefData);

    /// Ends one dispatch; frees the storage if it was released meanwhile.
    fn unpin_ref_data(&self, ref_data: RefData);

    /// Forwards a message to the next handler in the subclass chain.
    fn default_subclass_proc(
        &self,
        control: Self::Handle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> isize;

    fn parent_of(&self, control: Self::Handle) -> Option<Self::Handle>;

    fn is_owner_draw(&self, control: Self::Handle) -> bool;
}
