// Domain layer: resolution model, tables, and the ports the pipeline runs against.

pub mod model;
pub mod ports;
pub mod table;
