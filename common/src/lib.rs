pub mod ids;
pub mod properties;
pub mod shapes;
