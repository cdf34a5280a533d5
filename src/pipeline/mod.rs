//! Pipeline stages of one conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the controller only sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ upload ──▶ archive ──▶ encode
//! (disk)    (HTTP)     (ZIP/JSON)  (PNG payloads)
//! ```
//!
//! 1. [`input`]: read the chosen file; the PDF filter is advisory only
//! 2. [`upload`]: multipart `POST` to the selected service; the only stage
//!    with network I/O
//! 3. [`archive`]: parse the body according to the output mode, classifying
//!    ZIP entries by suffix
//! 4. [`encode`]: wrap each PNG entry as a displayable image payload

pub mod archive;
pub mod encode;
pub mod input;
pub mod upload;
