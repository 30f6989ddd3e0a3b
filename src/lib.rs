pub mod fetch;
pub mod history;
pub mod output;
pub mod playlist;
pub mod rankings;
