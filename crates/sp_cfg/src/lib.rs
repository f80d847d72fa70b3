#![doc = include_str!("../README.md")]
#![no_std]

/// Defines macros that keep or drop code based on a `cfg` predicate.
///
/// Each `#[cfg(predicate)] => name` entry re-exports either [`enabled!`] or
/// [`disabled!`] under `name`, depending on whether the predicate holds.
/// The resulting `name!` expands its input when enabled and expands to nothing
/// otherwise. It also accepts an `if { .. } else { .. }` form that picks one of
/// the two branches, which is usable in expression position.
///
/// The usual place to invoke this is a `pub mod cfg` block at the crate root.
///
/// # Examples
///
/// ```
/// mod cfg {
///     sp_cfg::define_alias! {
///         #[cfg(debug_assertions)] => debug,
///         #[cfg(any())] => never,
///     }
/// }
///
/// fn checks_enabled() -> bool {
///     cfg::debug! {
///         if { true } else { false }
///     }
/// }
///
/// fn main() {
///     let mut hits = 0;
///     cfg::never! { hits += 1; }
///     assert_eq!(hits, 0);
///     assert_eq!(checks_enabled(), cfg!(debug_assertions));
/// }
/// ```
#[macro_export]
macro_rules! define_alias {
    ($(#[cfg($meta:meta)] => $name:ident),+ $(,)?) => {
        $(
            #[cfg($meta)]
            #[allow(unused_imports)]
            pub use $crate::enabled as $name;

            #[cfg(not($meta))]
            #[allow(unused_imports)]
            pub use $crate::disabled as $name;
        )+
    };
}

/// Expands the enabled branch. See [`define_alias!`].
#[doc(hidden)]
#[macro_export]
macro_rules! enabled {
    (if { $($yes:tt)* } else { $($no:tt)* }) => { $($yes)* };
    (if { $($yes:tt)* }) => { $($yes)* };
    ($($body:tt)*) => { $($body)* };
}

/// Expands the disabled branch. See [`define_alias!`].
#[doc(hidden)]
#[macro_export]
macro_rules! disabled {
    (if { $($yes:tt)* } else { $($no:tt)* }) => { $($no)* };
    (if { $($yes:tt)* }) => {};
    ($($body:tt)*) => {};
}
