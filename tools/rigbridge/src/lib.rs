//! rigbridge library
//!
//! glTF skeleton transcoder for the in-memory host scene in `rigbridge-scene`:
//! skins become armatures, vertex groups and armature modifiers on import;
//! actions become glTF animation channels on export.

pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod import;

pub use config::{load_config, Config};
pub use convert::UpAxis;
pub use error::{ExportError, ImportError};
pub use export::{
    export_glb, export_source, AnimationChannel, ChannelGatherer, ChannelGrouping, ExportSettings,
};
pub use import::{import_document, import_gltf, Document, ImportReport, ImportSettings};
