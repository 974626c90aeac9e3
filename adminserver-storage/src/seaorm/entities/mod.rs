pub mod properties;

pub use properties::Entity as Properties;
