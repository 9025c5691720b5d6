// Application layer: submission use case and the port it forwards through.

pub mod ports;
pub mod submit;
