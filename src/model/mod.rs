//! Data model for outline extraction.
//!
//! Input types ([`TextRun`], [`SourceDocument`]) describe what the external
//! document model hands over. Intermediate types ([`FeatureVector`],
//! [`HeadingCandidate`]) flow between pipeline stages. Output types
//! ([`OutlineNode`], [`DocumentOutline`]) are what callers receive.

mod candidate;
mod outline;
mod run;

pub use candidate::{FeatureVector, FontSignature, HeadingCandidate};
pub use outline::{DocumentOutline, HeadingLevel, OutlineEntry, OutlineNode};
pub use run::{BoundingBox, PageInfo, SourceDocument, TextRun};
