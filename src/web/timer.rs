use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use super::now_ms;

/// One `window.setTimeout` following the scheduler's next deadline.
#[derive(Default)]
pub struct TimerDriver {
    timer: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl TimerDriver {
    pub fn set_callback(&mut self, callback: Closure<dyn FnMut()>) {
        self.callback = Some(callback);
    }

    /// Fire the callback at `deadline` (performance time), replacing any
    /// earlier arming. `None` just cancels.
    #[allow(clippy::cast_possible_truncation)]
    pub fn arm(&mut self, deadline: Option<f64>) {
        self.cancel();
        let (Some(deadline), Some(callback), Some(window)) =
            (deadline, self.callback.as_ref(), web_sys::window())
        else {
            return;
        };
        let delay = (deadline - now_ms()).clamp(0.0, f64::from(i32::MAX)).ceil() as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => self.timer = Some(id),
            Err(_) => tracing::warn!("Could not arm scheduler timer"),
        }
    }

    /// The armed timeout ran; there is nothing left to clear.
    pub fn fired(&mut self) {
        self.timer = None;
    }

    pub fn cancel(&mut self) {
        if let (Some(id), Some(window)) = (self.timer.take(), web_sys::window()) {
            window.clear_timeout_with_handle(id);
        }
    }
}
