//! JSON values that know where their memory comes from, an incremental push
//! parser, and a serializer that writes into caller-sized buffers.
//!
//! Every [`Value`], [`JsonString`], [`Array`] and [`Object`] carries a
//! [`StoragePtr`] chosen at construction. All of its memory, and all of its
//! children's memory, comes from that [`MemoryResource`]. Parsing into a
//! [`MonotonicResource`] turns a whole document into a handful of block
//! allocations that are released together.
//!
//! ```
//! use jsonpool::{MonotonicResource, StoragePtr, parse_in};
//!
//! let sp = StoragePtr::new(MonotonicResource::new());
//! let v = parse_in(br#"{"name": "pool", "sizes": [1, 2, 3]}"#, sp.clone()).unwrap();
//! assert_eq!(v["sizes"][2].as_i64(), Some(3));
//! assert_eq!(v["name"].storage(), &sp);
//! assert_eq!(v.to_string(), r#"{"name":"pool","sizes":[1,2,3]}"#);
//! ```
//!
//! Input that arrives in pieces goes through a [`StreamParser`]; a custom
//! [`Handler`] on a [`BasicParser`] sees the raw events without building a
//! tree. [`Serializer`] produces text incrementally.

extern crate alloc;

mod array;
mod error;
mod format;
mod kind;
mod number;
mod object;
mod parser;
mod raw;
mod serializer;
mod slot;
mod string;
mod value;
mod value_stack;

pub mod storage;

#[cfg(any(test, feature = "serde"))]
mod serde_impls;

#[cfg(test)]
mod tests;

pub use array::Array;
pub use error::{Condition, Error};
pub use kind::Kind;
pub use number::Numeric;
pub use object::{KeyValuePair, Object};
pub use parser::{
    BasicParser, Handler, ParseOptions, Parser, StreamParser, parse, parse_in, parse_with,
};
pub use serializer::{Serializer, serialize, to_string};
pub use slot::Slot;
pub use storage::{
    DefaultResource, FixedResource, MemoryResource, MonotonicResource, NullResource, StoragePtr,
};
pub use string::JsonString;
pub use value::{Value, ValueMut, ValueRef};
pub use value_stack::ValueStack;
