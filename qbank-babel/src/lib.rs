//! Multi-format interoperability for question banks
//!
//!     This crate provides a uniform interface for reading and writing question banks in the
//!     formats teachers actually exchange (GIFT, Aiken, cloze text, JSON) plus a couple of
//!     inspection formats that only write (tag, treeviz).
//!
//!     TLDR: For format authors:
//!         - Formats go from their text straight to the qbank-core `Category` tree and back.
//!         - Markup inside a text (cloze groups, gaps, variables) is never parsed here: build a
//!           [`qbank_core::Delimiters`] table and hand the text to `qbank_core::text::parse`.
//!         - Question kinds a format cannot express are skipped with a `tracing` warning, never
//!           an error, so one odd question does not sink a whole export.
//!         - Each format has unit tests next to its code and fixtures under tests/<format>.
//!
//! Architecture
//!
//!     This is a pure lib, that is, it powers qbank-cli but is shell agnostic: no code should be
//!     written that supposes a shell environment, be it to std print, env vars etc. The one
//!     exception is JSON file embedding, which reads the files a bank points at.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Parser implementation
//!     │   │   ├── serializer.rs   # Serializer implementation
//!     │   │   └── mod.rs
//!     │   ├── common              # Answer summaries shared by the inspection formats
//!     │   └── icons.rs
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     └── <format>
//!         ├── <testname>.rs
//!         └── fixtures
//!             └── <bankname>.<format>
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Formats
//!
//!     Format specific capabilities are implemented with the Format trait. formats should have a
//!     parse() and serialize() method, a name and file extensions. See the trait def [./format.rs ]
//!     - Format trait: Uniform interface for all formats (parsing and/or serialization)
//!     - FormatRegistry: Centralized discovery and selection of formats
//!     - Format implementations: Concrete implementations for each supported format
//!
//!     JSON is the only lossless format: every other one drops what it has no syntax for, so a
//!     round trip through GIFT or Aiken keeps the questions but not all of their settings.

pub mod error;
pub mod format;
pub mod formats;
pub mod registry;

pub use error::FormatError;
pub use format::Format;
pub use registry::FormatRegistry;
