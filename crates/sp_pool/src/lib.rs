#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Compilation config

/// Some macros used for compilation control.
pub mod cfg {
    sp_cfg::define_alias! {
        #[cfg(any(test, feature = "std"))] => std,
        #[cfg(any(debug_assertions, feature = "debug"))] => debug,
    }
}

// -----------------------------------------------------------------------------
// no_std support

crate::cfg::std! { extern crate std; }

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod handle;
mod iter;
mod pool;
mod storage;

// -----------------------------------------------------------------------------
// Exports

pub use error::StackError;
pub use handle::StackIndex;
pub use iter::{CursorMut, Iter};
pub use pool::StackPool;
