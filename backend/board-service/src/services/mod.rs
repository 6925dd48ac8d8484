/// Business logic layer
pub mod board;

pub use board::BoardService;
