//! File open and handler capability flags
//!
//! Open flags are passed to the engine untouched. Handler flags are reported
//! back by the engine for an open file.

option_bits! {
    /// Options for opening a file.
    ///
    /// Combine constants with `|`, or use the builder methods.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpbridge::OpenFlags;
    ///
    /// let flags = OpenFlags::default().for_update().use_smart_handler();
    /// assert_eq!(flags, OpenFlags::OPEN_FOR_UPDATE | OpenFlags::OPEN_USE_SMART_HANDLER);
    /// ```
    pub struct OpenFlags {
        /// Open for read-only access
        const OPEN_FOR_READ = 0x0000_0001 => "open_for_read";
        /// Open for reading and writing
        const OPEN_FOR_UPDATE = 0x0000_0002 => "open_for_update";
        /// Only the XMP is wanted
        const OPEN_ONLY_XMP = 0x0000_0004 => "open_only_xmp";
        /// Force use of the given handler, do not verify the format
        const FORCE_GIVEN_HANDLER = 0x0000_0008 => "force_given_handler";
        /// Strictly use only the designated handler
        const OPEN_STRICTLY = 0x0000_0010 => "open_strictly";
        /// Require the use of a smart handler
        const OPEN_USE_SMART_HANDLER = 0x0000_0020 => "open_use_smart_handler";
        /// Force packet scanning, do not use a smart handler
        const OPEN_USE_PACKET_SCANNING = 0x0000_0040 => "open_use_packet_scanning";
        /// Only scan files known to need scanning
        const OPEN_LIMITED_SCANNING = 0x0000_0080 => "open_limited_scanning";
        /// Attempt to repair a file opened for update
        const OPEN_REPAIR_FILE = 0x0000_0100 => "open_repair_file";
        /// Optimize file layout when updating
        const OPTIMIZE_FILE_LAYOUT = 0x0000_0200 => "optimize_file_layout";
        /// Preserve PDF document state when updating
        const PRESERVE_PDF_STATE = 0x0000_0400 => "preserve_pdf_state";
    }
}

impl OpenFlags {
    /// Read-only open through the smart handler
    pub const DEFAULT_READ: Self =
        Self::from_bits(Self::OPEN_FOR_READ.bits() | Self::OPEN_USE_SMART_HANDLER.bits());

    /// Open for read-only access.
    pub fn for_read(mut self) -> Self {
        self.remove(Self::OPEN_FOR_UPDATE);
        self.insert(Self::OPEN_FOR_READ);
        self
    }

    /// Open for reading and writing.
    ///
    /// Files opened for update are written to only when closing.
    pub fn for_update(mut self) -> Self {
        self.remove(Self::OPEN_FOR_READ);
        self.insert(Self::OPEN_FOR_UPDATE);
        self
    }

    /// Only the XMP is wanted.
    pub fn only_xmp(mut self) -> Self {
        self.insert(Self::OPEN_ONLY_XMP);
        self
    }

    /// Be strict about only attempting to use the designated file handler.
    pub fn strict(mut self) -> Self {
        self.insert(Self::OPEN_STRICTLY);
        self
    }

    /// Require the use of a smart handler.
    ///
    /// Clears packet scanning.
    pub fn use_smart_handler(mut self) -> Self {
        self.remove(Self::OPEN_USE_PACKET_SCANNING);
        self.insert(Self::OPEN_USE_SMART_HANDLER);
        self
    }

    /// Force packet scanning.
    ///
    /// Clears the smart handler request.
    pub fn use_packet_scanning(mut self) -> Self {
        self.remove(Self::OPEN_USE_SMART_HANDLER);
        self.insert(Self::OPEN_USE_PACKET_SCANNING);
        self
    }

    /// Only packet scan files "known" to need scanning.
    pub fn limited_scanning(mut self) -> Self {
        self.insert(Self::OPEN_LIMITED_SCANNING);
        self
    }

    pub fn is_update(self) -> bool {
        self.contains(Self::OPEN_FOR_UPDATE)
    }
}

option_bits! {
    /// Capabilities of the handler that opened a file
    pub struct HandlerFlags {
        const CAN_INJECT_XMP = 0x0000_0001 => "can_inject_xmp";
        const CAN_EXPAND = 0x0000_0002 => "can_expand";
        const CAN_REWRITE = 0x0000_0004 => "can_rewrite";
        const PREFERS_IN_PLACE = 0x0000_0008 => "prefers_in_place";
        const CAN_RECONCILE = 0x0000_0010 => "can_reconcile";
        const ALLOWS_ONLY_XMP = 0x0000_0020 => "allows_only_xmp";
        const RETURNS_RAW_PACKET = 0x0000_0040 => "returns_raw_packet";
        const HANDLER_OWNS_FILE = 0x0000_0100 => "handler_owns_file";
        const ALLOWS_SAFE_UPDATE = 0x0000_0200 => "allows_safe_update";
        const NEEDS_READ_ONLY_PACKET = 0x0000_0400 => "needs_read_only_packet";
        const USES_SIDECAR_XMP = 0x0000_0800 => "uses_sidecar_xmp";
        const FOLDER_BASED_FORMAT = 0x0000_1000 => "folder_based_format";
        const CAN_NOTIFY_PROGRESS = 0x0000_2000 => "can_notify_progress";
        const NEEDS_PRELOADING = 0x0000_4000 => "needs_preloading";
        const NEEDS_LOCAL_FILE_OPENED = 0x0001_0000 => "needs_local_file_opened";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_toggles_exclusive_bits() {
        let flags = OpenFlags::DEFAULT_READ.for_update().use_packet_scanning();
        assert_eq!(
            flags,
            OpenFlags::OPEN_FOR_UPDATE | OpenFlags::OPEN_USE_PACKET_SCANNING
        );
        assert!(flags.is_update());
        assert!(!flags.for_read().is_update());
    }

    #[test]
    fn test_names() {
        let flags = OpenFlags::from_bits(0x22);
        assert_eq!(flags.names(), vec!["open_for_update", "open_use_smart_handler"]);

        let handler = HandlerFlags::from_bits(0x0000_0845);
        assert_eq!(
            handler.names(),
            vec![
                "can_inject_xmp",
                "can_rewrite",
                "returns_raw_packet",
                "uses_sidecar_xmp"
            ]
        );
    }

    #[test]
    fn test_from_names() {
        let flags = OpenFlags::from_names(["open_for_update", "open_use_packet_scanning"]).unwrap();
        assert_eq!(flags.bits(), 0x42);
        assert!(OpenFlags::from_names(["open_sideways"]).is_err());
    }
}
