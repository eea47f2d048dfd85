pub mod aggregate;
pub mod config;
pub mod core;
pub mod history;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod weeks;
pub mod worker;
