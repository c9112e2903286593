// Domain layer: step/outcome/report types and the ports the driver depends on.

pub mod model;
pub mod ports;
