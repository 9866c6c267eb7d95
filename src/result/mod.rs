//! # Results
//!
//! A [`ResultSet`] wraps the engine's native result and hands out its
//! chunks in order. Rows are produced by [`RowIter`], which holds exactly one
//! chunk at a time:
//!
//! ```text
//! ResultSet ──fetch_chunk──> DataChunk ──decoders()──> Vec<ColumnDecoder>
//!     │                          │
//!     │                 rows decoded in order
//!     │                          │
//!     └── next chunk fetched only after the previous one is dropped
//! ```
//!
//! Stopping early (dropping the iterator) releases the chunk in hand. The
//! remaining chunks are never fetched.
//!
//! | State      | `fetch_chunk`          | Native result |
//! |------------|------------------------|---------------|
//! | Open       | next chunk or `None`   | alive         |
//! | Exhausted  | `None`                 | alive         |
//! | Closed     | `ResourceLifecycle`    | destroyed     |

mod chunk;
mod result_set;
mod row;

pub use chunk::DataChunk;
pub use result_set::{
    ColumnBatch, ColumnBatches, ResultSet, ResultState, ResultStats, RowIter,
};
pub use row::Row;
