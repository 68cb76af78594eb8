pub mod ask;
pub mod demo;
pub mod dispatch;
pub mod manual;
pub mod menu;
pub mod order;
pub mod populate;
pub mod query;
pub mod random_rows;
pub mod report;
pub mod schema;
pub mod seed;
pub mod shared;
pub mod similar;
