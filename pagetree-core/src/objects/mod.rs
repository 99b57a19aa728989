mod array;
mod dictionary;
mod primitive;
mod store;

pub use array::Array;
pub use dictionary::Dictionary;
pub use primitive::{Object, ObjectId};
pub use store::ObjectStore;
