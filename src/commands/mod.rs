pub mod authenticity;
pub mod facts;
pub mod persona;
pub mod retrieval;
