//! The word count application run by the mapper and reducer stages.
//!
//! # Example
//!
//! ```
//! use wordpipe::workload::wc;
//!
//! let counts = wc::count_words(b"Hello, world! hello.");
//! assert_eq!(counts["hello"], 2);
//! assert_eq!(counts["world"], 1);
//! ```

pub mod wc;
