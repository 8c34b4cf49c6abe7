//! Browser frame scheduling

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::engine::{FrameHandle, FrameScheduler};

/// Called with the handle of the frame that fired and its timestamp
pub type FrameHandler = Rc<dyn Fn(FrameHandle, f64)>;

/// `requestAnimationFrame`-backed scheduler.
///
/// The handler lives in a shared slot so it can be installed after the
/// engine that owns this scheduler has been created. Every request gets its
/// own one-shot closure that reports the handle it was issued under.
pub struct RafScheduler {
    window: web_sys::Window,
    handler: Rc<RefCell<Option<FrameHandler>>>,
}

impl RafScheduler {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            handler: Rc::new(RefCell::new(None)),
        }
    }

    /// Slot for the frame handler
    pub fn handler_slot(&self) -> Rc<RefCell<Option<FrameHandler>>> {
        self.handler.clone()
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let Some(handler) = self.handler.borrow().clone() else {
            log::debug!("No frame handler installed");
            return None;
        };

        // The id is only known once the browser accepts the request
        let issued: Rc<Cell<Option<FrameHandle>>> = Rc::new(Cell::new(None));
        let fired = issued.clone();
        let callback = Closure::once_into_js(move |timestamp: f64| {
            if let Some(handle) = fired.get() {
                handler(handle, timestamp);
            }
        });

        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => {
                let handle = FrameHandle(id as u64);
                issued.set(Some(handle));
                Some(handle)
            }
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0 as i32) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }
}
