pub mod authors;
pub mod books;
pub mod mappings;
pub mod subjects;
pub mod topics;
