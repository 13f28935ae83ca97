pub mod flatten;
pub mod locate;
pub mod navigate;
pub mod tree_ops;
