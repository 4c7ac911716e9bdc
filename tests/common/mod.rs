#![allow(dead_code)]

pub mod mock_queue;
pub mod strategies;

pub use mock_queue::*;
pub use strategies::*;
