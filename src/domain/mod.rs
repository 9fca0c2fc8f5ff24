// Domain layer: the date range value and the ports the view-model talks through.

pub mod model;
pub mod ports;
