// Session state: the data model, its transition rules, and the URL token codec.
// Nothing in here performs I/O.

pub mod codec;
pub mod models;
pub mod store;
