//! In-memory XMP document
//!
//! An ordered list of top-level properties plus the bookkeeping needed for
//! chunked parsing. The document is opaque to the session layer; only the
//! bundled engine looks inside.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::ns;
use crate::core::node::{normalize_lang, ArrayItem, ArrayKind, Property, PropertyNode};
use crate::types::options::TemplateFlags;

const X_DEFAULT: &str = "x-default";

/// Result of a localized-text lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedMatch<'a> {
    pub value: &'a str,
    /// Language of the item that was chosen
    pub lang: &'a str,
    pub item: &'a ArrayItem,
}

/// XMP document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmpDocument {
    /// `rdf:about` of the description
    pub about: String,
    properties: Vec<Property>,
    /// Bytes received by chunked parsing that are not yet parsed
    pub(crate) pending: Vec<u8>,
}

impl XmpDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.is(namespace, name))
    }

    fn get_mut(&mut self, namespace: &str, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.is(namespace, name))
    }

    /// Insert a property, replacing one with the same name in place
    pub fn put(&mut self, property: Property) {
        match self.get_mut(&property.namespace, &property.name) {
            Some(existing) => existing.node = property.node,
            None => self.properties.push(property),
        }
    }

    /// Set a simple property
    ///
    /// Setting a simple value over an array is rejected.
    pub fn set_simple(
        &mut self,
        namespace: &str,
        name: &str,
        value: impl Into<String>,
    ) -> XmpResult<()> {
        validate_name(namespace, name)?;
        match self.get_mut(namespace, name) {
            Some(Property {
                node: PropertyNode::Array { .. },
                ..
            }) => Err(XmpError::BadValue(format!(
                "Property '{}' is an array, not a simple value",
                name
            ))),
            Some(existing) => {
                existing.node = PropertyNode::Simple(value.into());
                Ok(())
            }
            None => {
                self.properties.push(Property::simple(namespace, name, value));
                Ok(())
            }
        }
    }

    /// Delete a property, returning whether it existed
    pub fn delete(&mut self, namespace: &str, name: &str) -> bool {
        let before = self.properties.len();
        self.properties.retain(|p| !p.is(namespace, name));
        self.properties.len() < before
    }

    /// Remove properties
    ///
    /// Internal properties are kept unless `include_internal` is set.
    pub fn remove_properties(&mut self, include_internal: bool) {
        self.properties
            .retain(|p| !include_internal && is_internal(&p.namespace, &p.name));
    }

    /// Choose a localized text item
    ///
    /// Order of preference: exact match of `specific_lang`, first item in
    /// the `generic_lang` family, the `x-default` item, the first item.
    pub fn localized_text(
        &self,
        namespace: &str,
        name: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> Option<LocalizedMatch<'_>> {
        let PropertyNode::Array {
            kind: ArrayKind::Alt,
            items,
        } = &self.get(namespace, name)?.node
        else {
            return None;
        };

        let specific = normalize_lang(specific_lang);
        let generic = normalize_lang(generic_lang);

        let chosen = items
            .iter()
            .find(|item| item_lang(item) == specific)
            .or_else(|| {
                if generic.is_empty() {
                    return None;
                }
                let family = format!("{}-", generic);
                items.iter().find(|item| {
                    let lang = item_lang(item);
                    lang == generic || lang.starts_with(&family)
                })
            })
            .or_else(|| items.iter().find(|item| item_lang(item) == X_DEFAULT))
            .or_else(|| items.first())?;

        Some(LocalizedMatch {
            value: &chosen.value,
            lang: chosen.lang.as_deref().unwrap_or(""),
            item: chosen,
        })
    }

    /// Set a localized text item
    ///
    /// Creates the `rdf:Alt` array when missing. An empty array also gets an
    /// `x-default` item. When the `x-default` item mirrored the value being
    /// replaced it follows the new value.
    pub fn set_localized_text(
        &mut self,
        namespace: &str,
        name: &str,
        _generic_lang: &str,
        specific_lang: &str,
        value: &str,
    ) -> XmpResult<()> {
        validate_name(namespace, name)?;
        let specific = normalize_lang(specific_lang);
        if specific.is_empty() {
            return Err(XmpError::Argument(
                "Specific language must not be empty".to_string(),
            ));
        }

        if self.get(namespace, name).is_none() {
            self.properties
                .push(Property::array(namespace, name, ArrayKind::Alt, Vec::new()));
        }
        let Some(Property {
            node: PropertyNode::Array {
                kind: ArrayKind::Alt,
                items,
            },
            ..
        }) = self.get_mut(namespace, name)
        else {
            return Err(XmpError::BadValue(format!(
                "Property '{}' exists but is not a localized text array (rdf:Alt)",
                name
            )));
        };

        let default_pos = lang_position(items, X_DEFAULT);
        let old_default = default_pos.map(|i| items[i].value.clone());

        if specific == X_DEFAULT {
            match default_pos {
                Some(i) => items[i].value = value.to_string(),
                None => items.insert(0, ArrayItem::with_lang(value, X_DEFAULT)),
            }
            if let Some(old) = old_default {
                for item in items.iter_mut() {
                    if item.lang.as_deref() != Some(X_DEFAULT) && item.value == old {
                        item.value = value.to_string();
                    }
                }
            }
            return Ok(());
        }

        match lang_position(items, &specific) {
            Some(i) => {
                let previous = std::mem::replace(&mut items[i].value, value.to_string());
                if let (Some(d), Some(old)) = (default_pos, old_default) {
                    if old == previous {
                        items[d].value = value.to_string();
                    }
                }
            }
            None => {
                if items.is_empty() {
                    items.push(ArrayItem::with_lang(value, X_DEFAULT));
                }
                items.push(ArrayItem::with_lang(value, &specific));
            }
        }
        Ok(())
    }

    /// Apply a template document
    ///
    /// Internal properties of either document are skipped unless
    /// [`TemplateFlags::INCLUDE_INTERNAL_PROPERTIES`] is set.
    pub fn apply_template(&mut self, template: &XmpDocument, flags: TemplateFlags) {
        let include_internal = flags.contains(TemplateFlags::INCLUDE_INTERNAL_PROPERTIES);

        if flags.contains(TemplateFlags::CLEAR_UNNAMED_PROPERTIES) {
            self.properties.retain(|p| {
                (!include_internal && is_internal(&p.namespace, &p.name))
                    || template.get(&p.namespace, &p.name).is_some()
            });
        }

        for incoming in template
            .properties
            .iter()
            .filter(|p| include_internal || !is_internal(&p.namespace, &p.name))
        {
            let Some(existing) = self.get_mut(&incoming.namespace, &incoming.name) else {
                if flags.contains(TemplateFlags::ADD_NEW_PROPERTIES) && !incoming.node.is_empty() {
                    self.properties.push(incoming.clone());
                }
                continue;
            };

            if flags.contains(TemplateFlags::REPLACE_EXISTING_PROPERTIES) {
                if !incoming.node.is_empty() {
                    existing.node = incoming.node.clone();
                } else if flags.contains(TemplateFlags::REPLACE_WITH_DELETE_EMPTY) {
                    self.delete(&incoming.namespace, &incoming.name);
                }
            } else if flags.contains(TemplateFlags::ADD_NEW_PROPERTIES) {
                merge_items(&mut existing.node, &incoming.node);
            }
        }
    }
}

fn item_lang(item: &ArrayItem) -> &str {
    item.lang.as_deref().unwrap_or("")
}

fn lang_position(items: &[ArrayItem], lang: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.lang.as_deref() == Some(lang))
}

/// Add array items the destination lacks
fn merge_items(dest: &mut PropertyNode, source: &PropertyNode) {
    let (
        PropertyNode::Array {
            kind: dest_kind,
            items: dest_items,
        },
        PropertyNode::Array {
            kind: source_kind,
            items: source_items,
        },
    ) = (dest, source)
    else {
        return;
    };
    if *dest_kind != *source_kind {
        return;
    }
    for item in source_items {
        let present = match (&item.lang, *dest_kind) {
            (Some(lang), ArrayKind::Alt) => dest_items
                .iter()
                .any(|d| d.lang.as_deref() == Some(lang.as_str())),
            _ => dest_items.contains(item),
        };
        if !present {
            dest_items.push(item.clone());
        }
    }
}

fn validate_name(namespace: &str, name: &str) -> XmpResult<()> {
    if namespace.is_empty() {
        return Err(XmpError::BadSchema("Empty schema namespace URI".to_string()));
    }
    if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == ':' || c == '/') {
        return Err(XmpError::Argument(format!(
            "Invalid property name: '{}'",
            name
        )));
    }
    Ok(())
}

/// Whether a property is maintained by applications rather than users
pub fn is_internal(namespace: &str, name: &str) -> bool {
    match namespace {
        ns::DC => matches!(name, "format" | "language"),
        ns::XMP => matches!(
            name,
            "BaseURL" | "CreatorTool" | "Format" | "Locale" | "MetadataDate" | "ModifyDate"
        ),
        ns::PDF => matches!(
            name,
            "BaseURL" | "Creator" | "ModDate" | "PDFVersion" | "Producer"
        ),
        ns::TIFF => !matches!(name, "ImageDescription" | "Artist" | "Copyright"),
        ns::EXIF => name != "UserComment",
        ns::PHOTOSHOP => matches!(name, "ICCProfile" | "TextLayers"),
        ns::XMP_MM => true,
        _ => false,
    }
}
