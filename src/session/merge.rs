//! Merge-write strategy
//!
//! Incoming metadata arrives as a serialized packet. It is parsed in fixed
//! size chunks and then either replaces the current document or is merged
//! into it.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::ns;
use crate::engine::MetadataEngine;
use crate::types::options::TemplateFlags;
use std::fmt;
use std::str::FromStr;

/// Bytes handed to the engine per parse call
pub const PARSE_CHUNK_SIZE: usize = 4096;

/// How incoming metadata is combined with the current document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// Replace every property with the incoming ones
    Override,
    /// Add incoming properties and replace the ones that exist
    #[default]
    Upsert,
}

impl WriteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::Override => "override",
            WriteMode::Upsert => "upsert",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "override" | "replace" => Ok(WriteMode::Override),
            "upsert" => Ok(WriteMode::Upsert),
            other => Err(XmpError::Argument(format!("Unknown write mode: {}", other))),
        }
    }
}

/// Parse `buffer` by feeding the engine `chunk_size` bytes at a time
///
/// Every full chunk but the last is sent with more data to come; the final
/// call carries the remainder and completes the document.
pub fn parse_in_chunks<E: MetadataEngine>(
    engine: &E,
    buffer: &[u8],
    chunk_size: usize,
) -> XmpResult<E::Document> {
    if chunk_size == 0 {
        return Err(XmpError::Argument("Chunk size must be positive".to_string()));
    }
    let mut doc = engine.new_document();
    let mut rest = buffer;
    while rest.len() > chunk_size {
        let (chunk, tail) = rest.split_at(chunk_size);
        engine.parse_chunk(&mut doc, chunk, true)?;
        rest = tail;
    }
    engine.parse_chunk(&mut doc, rest, false)?;
    Ok(doc)
}

/// Replace or merge `current` with the incoming packet
///
/// - [`WriteMode::Override`]: every property of `current` is dropped,
///   internal ones included, and the incoming properties take their place.
///   A supplied packet is stamped with `xmp:MetadataDate` first.
/// - [`WriteMode::Upsert`]: incoming properties are added or replace the
///   existing ones; everything else is kept.
///
/// `current` is left untouched when any step fails.
pub fn replace_or_merge<E: MetadataEngine>(
    engine: &E,
    current: &mut E::Document,
    incoming: Option<&[u8]>,
    mode: WriteMode,
) -> XmpResult<()> {
    let incoming = incoming.filter(|buffer| !buffer.is_empty());
    let mut template = match incoming {
        Some(buffer) => parse_in_chunks(engine, buffer, PARSE_CHUNK_SIZE)?,
        None => engine.new_document(),
    };

    let mut merged = current.clone();
    match mode {
        WriteMode::Override => {
            if incoming.is_some() {
                let now = engine.current_date_time();
                engine.set_property_date(&mut template, ns::XMP, "MetadataDate", &now)?;
            }
            engine.remove_properties(&mut merged, true)?;
            engine.apply_template(
                &mut merged,
                &template,
                TemplateFlags::ADD_NEW_PROPERTIES
                    | TemplateFlags::REPLACE_EXISTING_PROPERTIES
                    | TemplateFlags::INCLUDE_INTERNAL_PROPERTIES,
            )?;
        }
        WriteMode::Upsert => {
            engine.apply_template(
                &mut merged,
                &template,
                TemplateFlags::REPLACE_EXISTING_PROPERTIES
                    | TemplateFlags::ADD_NEW_PROPERTIES
                    | TemplateFlags::INCLUDE_INTERNAL_PROPERTIES,
            )?;
        }
    }
    *current = merged;
    tracing::debug!(mode = %mode, incoming = incoming.map_or(0, <[u8]>::len), "metadata merged");
    Ok(())
}

#[cfg(all(test, feature = "basic"))]
mod tests {
    use super::*;
    use crate::engine::BasicEngine;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_mode_from_str() {
        assert_eq!("override".parse::<WriteMode>().unwrap(), WriteMode::Override);
        assert_eq!("Replace".parse::<WriteMode>().unwrap(), WriteMode::Override);
        assert_eq!("upsert".parse::<WriteMode>().unwrap(), WriteMode::Upsert);
        assert!(matches!(
            "append".parse::<WriteMode>(),
            Err(XmpError::Argument(_))
        ));
        assert_eq!(WriteMode::default(), WriteMode::Upsert);
    }

    #[test]
    fn test_zero_chunk_size() {
        let engine = BasicEngine::new();
        assert!(parse_in_chunks(&engine, b"<x/>", 0).is_err());
    }

    #[test]
    fn test_failed_parse_leaves_document() {
        let engine = BasicEngine::new();
        engine.initialize_document_model().unwrap();
        let mut current = engine.new_document();
        engine.set_property(&mut current, ns::XMP, "Label", "keep").unwrap();
        let before = current.clone();

        let result = replace_or_merge(
            &engine,
            &mut current,
            Some(&b"<broken"[..]),
            WriteMode::Override,
        );
        assert!(result.is_err());
        assert_eq!(current, before);
    }
}
