//! Application layer: the frame-loop controller and the port traits it
//! speaks through.

pub mod controller;
pub mod ports;
