pub mod endpointer;
pub mod graph;
pub mod session;
