#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use xmpbridge::core::XmpDocument;
use xmpbridge::engine::{BasicEngine, ErrorCallback, LocalizedText, MetadataEngine};
use xmpbridge::files::BasicFile;
use xmpbridge::{
    FileFormat, FileInfo, OpenFlags, PacketInfo, PropertyOptions, TemplateFlags, XmpDateTime,
    XmpError, XmpResult,
};

pub const DC: &str = "http://purl.org/dc/elements/1.1/";
pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";

/// Packet with a creator tool, a rating, a title and keywords
pub const PHOTO_PACKET: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
      <xmp:CreatorTool>Camera 1.0</xmp:CreatorTool>
      <xmp:Rating>3</xmp:Rating>
      <dc:title>
        <rdf:Alt>
          <rdf:li xml:lang="x-default">Harbor</rdf:li>
          <rdf:li xml:lang="fr-FR">Port</rdf:li>
        </rdf:Alt>
      </dc:title>
      <dc:subject>
        <rdf:Bag>
          <rdf:li>sea</rdf:li>
        </rdf:Bag>
      </dc:subject>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

/// Packet that only carries a rating and a label
pub const EDIT_PACKET: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:xmp="http://ns.adobe.com/xap/1.0/">
      <xmp:Rating>5</xmp:Rating>
      <xmp:Label>Edited</xmp:Label>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;

/// Write `contents` to a fresh `.xmp` file in `dir`
pub fn sidecar(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// A JPEG-looking file with `packet` embedded and room for it to grow
pub fn jpeg_with_packet(dir: &Path, name: &str, packet: &str, room: usize) -> PathBuf {
    let path = dir.join(name);
    let trailer = "<?xpacket end=\"w\"?>";
    let body = packet.trim_end().trim_end_matches(trailer);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(b"\xFF\xD8\xFF\xE1\x00\x10Exif\x00\x00").unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file.write_all(" ".repeat(room).as_bytes()).unwrap();
    file.write_all(trailer.as_bytes()).unwrap();
    file.write_all(b"\xFF\xD9").unwrap();
    path
}

/// Bytes of a file outside its XMP packet
pub fn bytes_outside_packet(path: &Path) -> (Vec<u8>, Vec<u8>) {
    let data = fs::read(path).unwrap();
    let location = xmpbridge::files::find_packet(&data).unwrap();
    let range = location.range();
    (data[..range.start].to_vec(), data[range.end..].to_vec())
}

/// Counters shared between a [`CountingEngine`] and the test
#[derive(Default)]
pub struct Probe {
    pub document_model_inits: AtomicUsize,
    pub document_model_terminations: AtomicUsize,
    pub file_io_inits: AtomicUsize,
    pub file_io_terminations: AtomicUsize,
    pub loads: AtomicUsize,
    pub fail_file_io: AtomicBool,
    pub fail_get_xmp: AtomicBool,
    pub refuse_put: AtomicBool,
}

impl Probe {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Engine that delegates to [`BasicEngine`] and records what it was asked
pub struct CountingEngine {
    inner: BasicEngine,
    pub probe: Arc<Probe>,
}

impl CountingEngine {
    pub fn new() -> (Self, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let engine = Self {
            inner: BasicEngine::new(),
            probe: Arc::clone(&probe),
        };
        (engine, probe)
    }
}

impl MetadataEngine for CountingEngine {
    type Document = XmpDocument;
    type File = BasicFile;

    fn initialize_document_model(&self) -> XmpResult<()> {
        self.probe.document_model_inits.fetch_add(1, Ordering::SeqCst);
        self.inner.initialize_document_model()
    }

    fn terminate_document_model(&self) {
        self.probe
            .document_model_terminations
            .fetch_add(1, Ordering::SeqCst);
        self.inner.terminate_document_model()
    }

    fn initialize_file_io(&self, plugin_path: Option<&Path>) -> XmpResult<()> {
        self.probe.file_io_inits.fetch_add(1, Ordering::SeqCst);
        if self.probe.fail_file_io.load(Ordering::SeqCst) {
            return Err(XmpError::Internal("plug-in loading failed".to_string()));
        }
        self.inner.initialize_file_io(plugin_path)
    }

    fn terminate_file_io(&self) {
        self.probe.file_io_terminations.fetch_add(1, Ordering::SeqCst);
        self.inner.terminate_file_io()
    }

    fn set_error_callback(&self, callback: ErrorCallback) {
        self.inner.set_error_callback(callback)
    }

    fn new_document(&self) -> XmpDocument {
        self.inner.new_document()
    }

    fn parse_chunk(&self, doc: &mut XmpDocument, chunk: &[u8], more_coming: bool) -> XmpResult<()> {
        self.inner.parse_chunk(doc, chunk, more_coming)
    }

    fn serialize(&self, doc: &XmpDocument) -> XmpResult<String> {
        self.inner.serialize(doc)
    }

    fn get_property(
        &self,
        doc: &XmpDocument,
        namespace: &str,
        name: &str,
    ) -> XmpResult<Option<(String, PropertyOptions)>> {
        self.inner.get_property(doc, namespace, name)
    }

    fn set_property(
        &self,
        doc: &mut XmpDocument,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> XmpResult<()> {
        self.inner.set_property(doc, namespace, name, value)
    }

    fn delete_property(&self, doc: &mut XmpDocument, namespace: &str, name: &str) -> XmpResult<()> {
        self.inner.delete_property(doc, namespace, name)
    }

    fn get_localized_text(
        &self,
        doc: &XmpDocument,
        namespace: &str,
        name: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> XmpResult<Option<LocalizedText>> {
        self.inner
            .get_localized_text(doc, namespace, name, generic_lang, specific_lang)
    }

    fn set_localized_text(
        &self,
        doc: &mut XmpDocument,
        namespace: &str,
        name: &str,
        generic_lang: &str,
        specific_lang: &str,
        value: &str,
        options: PropertyOptions,
    ) -> XmpResult<()> {
        self.inner.set_localized_text(
            doc,
            namespace,
            name,
            generic_lang,
            specific_lang,
            value,
            options,
        )
    }

    fn remove_properties(&self, doc: &mut XmpDocument, include_internal: bool) -> XmpResult<()> {
        self.inner.remove_properties(doc, include_internal)
    }

    fn apply_template(
        &self,
        dest: &mut XmpDocument,
        template: &XmpDocument,
        flags: TemplateFlags,
    ) -> XmpResult<()> {
        self.inner.apply_template(dest, template, flags)
    }

    fn register_namespace(&self, uri: &str, suggested_prefix: &str) -> XmpResult<(bool, String)> {
        self.inner.register_namespace(uri, suggested_prefix)
    }

    fn namespace_prefix(&self, uri: &str) -> Option<String> {
        self.inner.namespace_prefix(uri)
    }

    fn current_date_time(&self) -> XmpDateTime {
        self.inner.current_date_time()
    }

    fn open_file(&self, path: &Path, format: FileFormat, flags: OpenFlags) -> XmpResult<BasicFile> {
        self.inner.open_file(path, format, flags)
    }

    fn close_file(&self, file: BasicFile) -> XmpResult<()> {
        self.inner.close_file(file)
    }

    fn get_xmp(&self, file: &mut BasicFile) -> XmpResult<Option<(XmpDocument, PacketInfo)>> {
        self.probe.loads.fetch_add(1, Ordering::SeqCst);
        if self.probe.fail_get_xmp.load(Ordering::SeqCst) {
            return Err(XmpError::Parse("corrupt packet".to_string()));
        }
        self.inner.get_xmp(file)
    }

    fn can_put_xmp(&self, file: &BasicFile, doc: &XmpDocument) -> XmpResult<bool> {
        if self.probe.refuse_put.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.can_put_xmp(file, doc)
    }

    fn put_xmp(&self, file: &mut BasicFile, doc: &XmpDocument) -> XmpResult<()> {
        self.inner.put_xmp(file, doc)
    }

    fn file_info(&self, file: &BasicFile) -> XmpResult<FileInfo> {
        self.inner.file_info(file)
    }
}
