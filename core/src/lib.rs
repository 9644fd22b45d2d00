#![no_std]
#![allow(clippy::new_without_default)]
extern crate alloc;

pub mod color;
pub mod color_effect;
pub mod config;
pub mod error;
pub mod fixed;
pub mod hblank;
pub mod memory;
pub mod resources;
pub mod video;

pub use error::{Error, Result};
pub use video::VideoCore;
