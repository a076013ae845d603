pub mod enclosing_circle;
pub use enclosing_circle as c001;
