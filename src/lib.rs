#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use sp_cfg as cfg;
pub use sp_pool as pool;

pub use sp_pool::{CursorMut, Iter, StackError, StackIndex, StackPool};
