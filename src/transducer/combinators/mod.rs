//! Concrete transducer types returned by [`TransducerExt`].
//!
//! Each type implements [`Transducer`] when it wraps a transducer and
//! [`Push`] when it wraps a push, so acquisition rebuilds the same shape
//! around the acquired push functions.
//!
//! [`TransducerExt`]: crate::transducer::TransducerExt
//! [`Transducer`]: crate::transducer::Transducer
//! [`Push`]: crate::transducer::Push

mod contramap;
mod filter;
mod map;
mod map_err;
mod then;

pub use contramap::{Contramap, ContramapChunks, ContramapM};
pub use filter::{Filter, FilterInput, FilterInputM};
pub use map::{Map, MapChunks, MapChunksM, MapM};
pub use map_err::MapErr;
pub use then::Then;
