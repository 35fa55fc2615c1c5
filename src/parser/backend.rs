//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from run extraction. Nothing returned
//! by a backend borrows from the underlying object graph.

use std::collections::BTreeMap;

use crate::error::ExtractionError;
use crate::model::{parse_pdf_date, DocumentInfo, FontStyle};

type Result<T> = std::result::Result<T, ExtractionError>;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// FontDescriptor flag bits (PDF 32000-1, table 123).
const FLAG_ITALIC: i64 = 1 << 6;
const FLAG_FORCE_BOLD: i64 = 1 << 18;

/// Weights at or above this value count as bold.
const BOLD_WEIGHT: f32 = 600.0;

/// Font information returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// Style inferred from the name and the font descriptor.
    pub style: FontStyle,
}

impl BackendFontInfo {
    /// Font info whose style comes from the base font name alone.
    pub fn from_name(name: impl Into<Vec<u8>>, base_font: impl Into<String>) -> Self {
        let base_font = base_font.into();
        Self {
            name: name.into(),
            style: FontStyle::from_font_name(&base_font),
            base_font,
        }
    }
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Build an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font info, content stream
/// decoding, and text decoding, without exposing any concrete PDF library
/// types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId), 1-indexed.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    ///
    /// Pages without a `/Contents` entry return an empty buffer.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Document-level information (version, page count, Info dictionary).
    fn document_info(&self) -> DocumentInfo;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Dictionary, Document as LopdfDocument, Object};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    encrypted: bool,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice, decrypting with `password` when
    /// the document is encrypted.
    pub fn load_bytes(data: &[u8], password: Option<&str>) -> Result<Self> {
        let mut doc = LopdfDocument::load_mem(data).map_err(ExtractionError::from)?;
        let encrypted = doc.is_encrypted();

        if encrypted {
            match password {
                None => return Err(ExtractionError::Encrypted),
                Some(password) => {
                    doc.decrypt(password).map_err(|e| {
                        log::debug!("Decryption failed: {}", e);
                        ExtractionError::InvalidPassword
                    })?;
                }
            }
        } else if password.is_some() {
            log::debug!("Password supplied for an unencrypted document; ignoring");
        }

        Ok(Self { doc, encrypted })
    }

    /// Check if the source document was encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Style evidence from `/FontDescriptor` (directly, or through the first
    /// descendant font of a Type0 font).
    fn descriptor_style(&self, font: &Dictionary) -> FontStyle {
        let descriptor = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
            .or_else(|| {
                let descendants = font
                    .get(b"DescendantFonts")
                    .ok()
                    .and_then(|o| self.resolve(o))
                    .and_then(|o| o.as_array().ok())?;
                let first = self.resolve(descendants.first()?)?.as_dict().ok()?;
                first
                    .get(b"FontDescriptor")
                    .ok()
                    .and_then(|o| self.resolve(o))
                    .and_then(|o| o.as_dict().ok())
            });

        let Some(descriptor) = descriptor else {
            return FontStyle::REGULAR;
        };

        let flags = descriptor
            .get(b"Flags")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        let weight = descriptor
            .get(b"FontWeight")
            .ok()
            .and_then(|o| o.as_float().ok())
            .unwrap_or(0.0);

        FontStyle {
            bold: flags & FLAG_FORCE_BOLD != 0 || weight >= BOLD_WEIGHT,
            italic: flags & FLAG_ITALIC != 0,
        }
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        self.resolve(info)?.as_dict().ok()
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| ExtractionError::PdfParse(e.to_string()))?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let mut info = BackendFontInfo::from_name(name.clone(), base_font);
            info.style = info.style.union(self.descriptor_style(font_dict));
            result.push(info);
        }
        Ok(result)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| ExtractionError::PdfParse(e.to_string()))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => s
                    .decompressed_content()
                    .or_else(|_| Ok(s.content.clone()))
                    .map_err(|e: lopdf::Error| ExtractionError::PdfParse(e.to_string())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(ExtractionError::Corrupted(format!(
                    "Page {:?} has an invalid content stream",
                    page_id
                ))),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(ExtractionError::Corrupted(format!(
                "Page {:?} has an invalid content stream",
                page_id
            ))),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)
            .map_err(|e| ExtractionError::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn document_info(&self) -> DocumentInfo {
        let mut info = DocumentInfo::with_version(self.version());
        info.page_count = self.doc.get_pages().len() as u32;
        info.encrypted = self.encrypted;

        if let Some(dict) = self.info_dictionary() {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.created = get_string_from_dict(dict, b"CreationDate")
                .as_deref()
                .and_then(parse_pdf_date);
            info.modified = get_string_from_dict(dict, b"ModDate")
                .as_deref()
                .and_then(parse_pdf_date);
        }

        info
    }
}

impl LopdfBackend {
    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in arr {
            if let Some(Object::Stream(s)) = self.resolve(obj) {
                match s.decompressed_content() {
                    Ok(data) => content.extend_from_slice(&data),
                    Err(_) => content.extend_from_slice(&s.content),
                }
                content.push(b' ');
            }
        }
        content
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Read a text string from a dictionary (UTF-16BE with BOM, UTF-8, or Latin-1).
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            let s = decode_text_simple(bytes);
            let s = s.trim_matches('\0').trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}
