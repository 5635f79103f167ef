//! Build-time options for scalar functions.
//!
//! Options are captured once when a function is built and never change
//! afterwards. They only affect how the engine treats the function; the
//! marshaling of arguments and results is the same either way.
//!
//! ```
//! use sqlfn_core::{Options, UdfOption};
//!
//! let opts = Options::new().volatile(true);
//! assert!(opts.volatile);
//!
//! let opts = Options::from_options([
//!     UdfOption::SpecialNullHandling(true),
//!     UdfOption::Volatile(true),
//!     UdfOption::SpecialNullHandling(false),
//! ]);
//! assert!(opts.volatile);
//! assert!(!opts.special_null_handling);
//! ```

/// Options of a scalar function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Options {
    /// The function may return different results for the same arguments;
    /// the engine must not constant-fold or cache it.
    pub volatile: bool,
    /// The function receives NULL arguments instead of the engine
    /// short-circuiting the call to NULL.
    pub special_null_handling: bool,
}

impl Options {
    /// Options with every flag off.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volatile(mut self, volatile: bool) -> Self {
        self.volatile = volatile;
        self
    }

    pub fn special_null_handling(mut self, special_null_handling: bool) -> Self {
        self.special_null_handling = special_null_handling;
        self
    }

    /// Apply a single option effect.
    pub fn apply(self, option: UdfOption) -> Self {
        match option {
            UdfOption::Volatile(v) => self.volatile(v),
            UdfOption::SpecialNullHandling(v) => self.special_null_handling(v),
        }
    }

    /// Build options from an ordered list of effects; later effects win.
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = UdfOption>,
    {
        options.into_iter().fold(Self::default(), Self::apply)
    }
}

/// A single option effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UdfOption {
    Volatile(bool),
    SpecialNullHandling(bool),
}

/// Set whether the function is volatile.
pub fn with_volatile(volatile: bool) -> UdfOption {
    UdfOption::Volatile(volatile)
}

/// Set whether the function sees NULL arguments.
pub fn with_special_null_handling(special_null_handling: bool) -> UdfOption {
    UdfOption::SpecialNullHandling(special_null_handling)
}

impl FromIterator<UdfOption> for Options {
    fn from_iter<I: IntoIterator<Item = UdfOption>>(iter: I) -> Self {
        Self::from_options(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        let opts = Options::default();
        assert!(!opts.volatile);
        assert!(!opts.special_null_handling);
        assert_eq!(Options::from_options([]), opts);
    }

    #[test]
    fn last_writer_wins() {
        let opts = Options::from_options([with_volatile(true), UdfOption::Volatile(false)]);
        assert!(!opts.volatile);
        let opts: Options = [with_special_null_handling(true)].into_iter().collect();
        assert!(opts.special_null_handling);
        assert!(!opts.volatile);
    }

    #[test]
    fn helpers_can_switch_a_flag_off() {
        let opts = Options::from_options([
            with_volatile(true),
            with_special_null_handling(true),
            with_volatile(false),
        ]);
        assert!(!opts.volatile);
        assert!(opts.special_null_handling);
        assert_eq!(with_special_null_handling(false), UdfOption::SpecialNullHandling(false));
    }

    #[test]
    fn builder_is_independent_per_flag() {
        let opts = Options::new().volatile(true).special_null_handling(true).volatile(false);
        assert!(!opts.volatile);
        assert!(opts.special_null_handling);
    }
}
