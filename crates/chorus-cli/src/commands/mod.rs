pub mod audit;
pub mod dispatch;
pub mod export;
pub mod history;
pub mod replay;
pub mod shared;
