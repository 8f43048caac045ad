//! Property and template option words

option_bits! {
    /// Option bits describing the shape of a property
    ///
    /// Returned alongside property lookups and accepted by localized-text
    /// setters. Bit values match the ones used by the XMP data model.
    pub struct PropertyOptions {
        /// The value is a URI rather than a literal
        const VALUE_IS_URI = 0x0000_0002 => "value_is_uri";
        /// The property carries qualifiers
        const HAS_QUALIFIERS = 0x0000_0010 => "has_qualifiers";
        /// The node is itself a qualifier
        const IS_QUALIFIER = 0x0000_0020 => "is_qualifier";
        /// The node has an `xml:lang` qualifier
        const HAS_LANG = 0x0000_0040 => "has_lang";
        /// The node has an `rdf:type` qualifier
        const HAS_TYPE = 0x0000_0080 => "has_type";
        /// The value is a structure
        const VALUE_IS_STRUCT = 0x0000_0100 => "value_is_struct";
        /// The value is an array
        const VALUE_IS_ARRAY = 0x0000_0200 => "value_is_array";
        /// The array items are ordered (`rdf:Seq`)
        const ARRAY_IS_ORDERED = 0x0000_0400 => "array_is_ordered";
        /// The array items are alternatives (`rdf:Alt`)
        const ARRAY_IS_ALTERNATE = 0x0000_0800 => "array_is_alternate";
        /// The array is an alt-text array keyed by language
        const ARRAY_IS_ALT_TEXT = 0x0000_1000 => "array_is_alt_text";
    }
}

impl PropertyOptions {
    /// Whether these options describe any kind of array
    pub fn is_array(self) -> bool {
        self.contains(Self::VALUE_IS_ARRAY)
    }
}

option_bits! {
    /// Options for template application
    ///
    /// The merge-write path combines these when it applies an incoming
    /// document to the current one.
    pub struct TemplateFlags {
        /// Internal properties take part in the merge
        const INCLUDE_INTERNAL_PROPERTIES = 0x0001 => "include_internal_properties";
        /// Destination properties present in the template are replaced
        const REPLACE_EXISTING_PROPERTIES = 0x0002 => "replace_existing_properties";
        /// Empty template values delete the destination property
        const REPLACE_WITH_DELETE_EMPTY = 0x0004 => "replace_with_delete_empty";
        /// Template properties missing from the destination are added
        const ADD_NEW_PROPERTIES = 0x0008 => "add_new_properties";
        /// Destination properties missing from the template are removed
        const CLEAR_UNNAMED_PROPERTIES = 0x0010 => "clear_unnamed_properties";
    }
}
