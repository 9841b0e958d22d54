pub mod object;

pub use object::ObjectResource;
