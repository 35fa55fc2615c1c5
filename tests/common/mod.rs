//! In-memory PDF fixtures shared by the integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// One `Tj` painted inside its own BT/ET block.
#[derive(Debug, Clone)]
pub struct Show {
    pub font: &'static str,
    pub size: i64,
    pub x: i64,
    pub y: i64,
    pub text: &'static str,
}

pub fn show(font: &'static str, size: i64, x: i64, y: i64, text: &'static str) -> Show {
    Show {
        font,
        size,
        x,
        y,
        text,
    }
}

/// Builds small PDFs with a fixed font set:
///
/// - `F1` Helvetica
/// - `F2` Helvetica-Bold
/// - `F3` a font whose name says nothing, but whose descriptor forces bold
pub struct PdfBuilder {
    pages: Vec<Option<Vec<Operation>>>,
    info: Option<Dictionary>,
    encrypted: bool,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            info: None,
            encrypted: false,
        }
    }

    /// Add a page where every show gets its own text object.
    pub fn page(mut self, shows: &[Show]) -> Self {
        let ops = shows.iter().flat_map(block_ops).collect();
        self.pages.push(Some(ops));
        self
    }

    /// Add a page from raw operations.
    pub fn raw_page(mut self, ops: Vec<Operation>) -> Self {
        self.pages.push(Some(ops));
        self
    }

    /// Add a page without a `/Contents` entry.
    pub fn blank_page(mut self) -> Self {
        self.pages.push(None);
        self
    }

    pub fn info(mut self, info: Dictionary) -> Self {
        self.info = Some(info);
        self
    }

    /// Mark the document as encrypted with the standard security handler.
    ///
    /// The stored keys match no password, so any password fails to open it.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(font("Helvetica"));
        let bold = doc.add_object(font("Helvetica-Bold"));
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "Corporate",
            "Flags" => 1i64 << 18,
        });
        let mut forced = font("Corporate");
        forced.set("FontDescriptor", descriptor);
        let forced = doc.add_object(forced);

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
                "F3" => forced,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in self.pages {
            let mut dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if let Some(operations) = page {
                let content = Content { operations };
                let stream = Stream::new(dictionary! {}, content.encode().unwrap());
                let content_id: ObjectId = doc.add_object(stream);
                dict.set("Contents", content_id);
            }
            kids.push(doc.add_object(dict).into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(info) = self.info {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        if self.encrypted {
            let encrypt_id = doc.add_object(dictionary! {
                "Filter" => "Standard",
                "V" => 1i64,
                "R" => 2i64,
                "Length" => 40i64,
                "P" => -4i64,
                "O" => Object::string_literal(vec![0x4fu8; 32]),
                "U" => Object::string_literal(vec![0x55u8; 32]),
            });
            doc.trailer.set("Encrypt", encrypt_id);
            doc.trailer.set(
                "ID",
                vec![
                    Object::string_literal(vec![0x11u8; 16]),
                    Object::string_literal(vec![0x11u8; 16]),
                ],
            );
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base.as_bytes().to_vec()),
    }
}

fn block_ops(s: &Show) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![s.font.into(), s.size.into()]),
        Operation::new("Td", vec![s.x.into(), s.y.into()]),
        Operation::new("Tj", vec![Object::string_literal(s.text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Title at 24pt bold followed by two body lines at 12pt.
pub fn titled_pdf() -> Vec<u8> {
    PdfBuilder::new()
        .page(&[
            show("F2", 24, 72, 760, "Title"),
            show("F1", 12, 72, 720, "Intro text."),
            show("F1", 12, 72, 706, "more."),
        ])
        .build()
}

/// Two chapters, each with a section and body text, over two pages.
pub fn chapters_pdf() -> Vec<u8> {
    PdfBuilder::new()
        .page(&[
            show("F2", 26, 72, 760, "Chapter One"),
            show("F1", 12, 72, 730, "Opening words."),
            show("F2", 19, 72, 700, "Section A"),
            show("F1", 12, 72, 680, "Details of A."),
        ])
        .page(&[
            show("F2", 26, 72, 760, "Chapter Two"),
            show("F1", 15, 72, 730, "Minor heading"),
            show("F1", 12, 72, 700, "Closing words."),
        ])
        .build()
}
