//! Terminal dashboard for US county and state traffic-fatality statistics.

pub mod app;
pub mod braille;
pub mod data;
pub mod lookup;
pub mod map;
pub mod metric;
pub mod scatter;
pub mod ui;
