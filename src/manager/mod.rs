//! Input manager: run loop, dispatch table and application hooks
//!
//! The manager owns the run state and the quasimode keycode slots. It
//! translates key notifier payloads into calls on an [`InputHandler`]:
//!
//! - `quasimodeStart` / `quasimodeEnd`: `on_keypress(Quasimode, START | END)`
//! - `someKey`: `on_some_key()`
//! - `keyUp` / `keyDown`: `on_keypress(KeyUp | KeyDown, keycode)`
//! - anything else: logged and dropped

mod handler;
mod input;
mod state;

pub use handler::InputHandler;
pub use input::{InputError, InputManager};
pub use state::{RunState, StopHandle};
