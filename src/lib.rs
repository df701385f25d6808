//! Count top-level domains in dated hostname logs.
//!
//! The core is [`domain::TldTree`], a height-balanced search tree holding one
//! node per distinct TLD with its occurrence count, restricted to an inclusive
//! date range:
//!
//! ```
//! use tldtally::domain::{Date, TldTree};
//!
//! let begin: Date = "01/01/2020".parse().unwrap();
//! let end: Date = "31/01/2020".parse().unwrap();
//! let mut tree = TldTree::new(begin, end);
//!
//! let day: Date = "15/01/2020".parse().unwrap();
//! assert!(tree.add("a.com", &day).unwrap());
//! assert!(tree.add("b.co.uk", &day).unwrap());
//! assert!(!tree.add("d.org", &"01/02/2020".parse().unwrap()).unwrap());
//!
//! let keys: Vec<_> = tree.iter().map(|e| (e.key(), e.count())).collect();
//! assert_eq!(keys, vec![("com", 1), ("uk", 1)]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
