//! Byte-exact codec for ARC/INFO arc attribute tables (`aat.adf`).
//!
//! ## Record Layout
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ fnode, tnode: i32            │  8 bytes
//! │ lpoly, rpoly: i32            │  8 bytes
//! │ length: f32 | f64            │  4 or 8 bytes (table precision)
//! │ record number, id: i32       │  8 bytes
//! ├──────────────────────────────┤
//! │ user items, declared order   │  sum of item widths
//! ├──────────────────────────────┤
//! │ pad byte (0x00)              │  only if the item widths sum is odd
//! └──────────────────────────────┘
//! ```
//!
//! All binary quantities are big-endian. Integer (`I`) and numeric (`N`)
//! items are right-justified ASCII text.

mod error;
pub mod record;
pub mod table;
pub mod text;

pub use error::{CodecError, Result};
pub use record::{decode_record, encode_record, encode_to_vec, PAD_BYTE};
pub use table::{encode_table, load, read_table, rewrite, write_table};
