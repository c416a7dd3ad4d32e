//! Gradient tracking state.
//!
//! Whether layers record what a backward pass needs is a per-thread flag. It is only ever changed
//! through a [`GradModeGuard`], which puts back the previous state when dropped, so leaving a
//! scope early (an error bubbling up with `?`, or a panic) cannot leak a disabled state.

use std::{cell::Cell, marker::PhantomData};

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Returns whether gradient tracking is enabled on the current thread.
pub fn is_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// Disables gradient tracking until the returned guard is dropped.
pub fn no_grad() -> GradModeGuard {
    GradModeGuard::new(false)
}

/// Enables gradient tracking until the returned guard is dropped, even inside a `no_grad` scope.
pub fn enable_grad() -> GradModeGuard {
    GradModeGuard::new(true)
}

/// Scoped change of the gradient tracking state.
///
/// The guard is bound to the thread that created it.
#[must_use = "gradient tracking is restored as soon as the guard is dropped"]
pub struct GradModeGuard {
    prev: bool,
    _not_send: PhantomData<*const ()>,
}

impl GradModeGuard {
    /// Sets the gradient tracking state and remembers the previous one.
    ///
    /// # Arguments
    /// * `enabled` - Whether gradients should be tracked inside the scope.
    ///
    /// # Returns
    /// A new `GradModeGuard` instance.
    pub fn new(enabled: bool) -> Self {
        let prev = GRAD_ENABLED.with(|flag| flag.replace(enabled));

        Self {
            prev,
            _not_send: PhantomData,
        }
    }
}

impl Drop for GradModeGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|flag| flag.set(self.prev));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_grad_is_scoped() {
        assert!(is_enabled());
        {
            let _guard = no_grad();
            assert!(!is_enabled());
        }
        assert!(is_enabled());
    }

    #[test]
    fn guards_nest() {
        let outer = no_grad();
        {
            let _inner = enable_grad();
            assert!(is_enabled());
        }
        assert!(!is_enabled());
        drop(outer);
        assert!(is_enabled());
    }

    #[test]
    fn guard_is_released_on_early_return() {
        fn failing() -> Result<(), ()> {
            let _guard = no_grad();
            Err::<(), ()>(())?;
            Ok(())
        }

        assert!(failing().is_err());
        assert!(is_enabled());
    }

    #[test]
    fn guard_is_released_on_panic() {
        let res = std::panic::catch_unwind(|| {
            let _guard = no_grad();
            panic!("boom");
        });

        assert!(res.is_err());
        assert!(is_enabled());
    }
}
