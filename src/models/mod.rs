pub mod power;
pub mod weather;
