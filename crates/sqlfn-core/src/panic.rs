//! Panic containment for host function calls.
//!
//! [`contain`] runs a closure under `catch_unwind`. A process-wide panic hook,
//! installed on first use, captures a backtrace for panics raised inside
//! `contain` and suppresses the default report for them; panics anywhere else
//! go to the hook that was installed before.
//!
//! An embedder that calls [`std::panic::set_hook`] after the first call
//! replaces this hook. Contained panics are still caught, but their trace is
//! captured at the catch site instead of the panic site, and the embedder's
//! hook sees them. Install custom hooks before the first call, or chain to the
//! previous hook.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static CONTAINED: Cell<usize> = const { Cell::new(0) };
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// A panic caught by [`contain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaughtPanic {
    /// The panic payload rendered as text.
    pub message: String,
    /// Backtrace captured at the panic site.
    pub backtrace: String,
}

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAINED.with(Cell::get) > 0 {
                let trace = Backtrace::force_capture().to_string();
                LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `f`, turning a panic into a [`CaughtPanic`].
pub fn contain<R>(f: impl FnOnce() -> R) -> Result<R, CaughtPanic> {
    install_hook();

    CONTAINED.with(|depth| depth.set(depth.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINED.with(|depth| depth.set(depth.get() - 1));

    outcome.map_err(|payload| CaughtPanic {
        message: payload_message(payload.as_ref()),
        backtrace: LAST_TRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string()),
    })
}

/// Render a panic payload as text.
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_value_without_panic() {
        assert_eq!(contain(|| 5), Ok(5));
    }

    #[test]
    fn catches_str_payload() {
        let caught = contain(|| -> i32 { panic!("boom") }).unwrap_err();
        assert_eq!(caught.message, "boom");
        assert!(!caught.backtrace.is_empty());
    }

    #[test]
    fn catches_formatted_payload() {
        let caught = contain(|| -> i32 { panic!("bad value {}", 42) }).unwrap_err();
        assert_eq!(caught.message, "bad value 42");
    }

    #[test]
    fn catches_other_payload() {
        let caught = contain(|| -> u8 { std::panic::panic_any(7u32) }).unwrap_err();
        assert_eq!(caught.message, "<non-string panic payload>");
    }

    #[test]
    fn nested_containment() {
        let outer = contain(|| contain(|| -> i32 { panic!("inner") }).is_err());
        assert_eq!(outer, Ok(true));
    }
}
