pub mod book;
pub mod loan;
pub mod member;

pub use book::Book;
