pub mod config;
pub mod rank;
pub mod tap;
pub mod turn;
