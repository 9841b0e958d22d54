pub mod object_schema;

pub use object_schema::ObjectSchemaDataSource;
