//! Content stream interpretation.
//!
//! Walks the operations of one page and emits a [`RawSpan`] for every text
//! showing operator, tagged with the text object (block) and line it was
//! painted in. Only the state that affects font size, position and line
//! breaks is tracked.

use std::collections::HashMap;

use super::backend::{get_number_from_value, BackendFontInfo, ContentOp, PageId, PdfBackend, PdfValue};
use super::normalize::is_spaceless_script_char;
use crate::model::FontStyle;

/// Kerning adjustment (thousandths of text space) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Vertical movement (text space units) below which a move stays on the same line.
const SAME_LINE_EPSILON: f32 = 0.01;

/// Font size used when a page shows text before any `Tf`.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// One text showing operation, before merging.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawSpan {
    pub text: String,
    /// Font resource key, used to decide whether neighbouring spans merge
    pub font_key: Vec<u8>,
    pub font_name: String,
    pub style: FontStyle,
    /// Effective size in user space
    pub size: f32,
    pub origin: (f32, f32),
    pub block: usize,
    pub line: usize,
    /// A horizontal move separated this span from the previous one
    pub gap_before: bool,
}

/// An affine matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[PdfValue]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n = |i: usize| get_number_from_value(&operands[i]);
        Some(Self {
            a: n(0)?,
            b: n(1)?,
            c: n(2)?,
            d: n(3)?,
            e: n(4)?,
            f: n(5)?,
        })
    }

    /// `self × other` (apply `self` first, then `other`).
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Length of the transformed y unit vector; scales glyph height.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state inside one BT/ET object.
#[derive(Debug, Clone, Default)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
}

impl TextState {
    /// Move to the start of the next line offset by (tx, ty).
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix.translate(tx, ty);
        self.matrix = self.line_matrix;
    }
}

/// Interprets the operations of one page.
pub(crate) struct ContentInterpreter<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    page: PageId,
    fonts: HashMap<Vec<u8>, BackendFontInfo>,
}

impl<'a, B: PdfBackend + ?Sized> ContentInterpreter<'a, B> {
    pub fn new(backend: &'a B, page: PageId, fonts: Vec<BackendFontInfo>) -> Self {
        Self {
            backend,
            page,
            fonts: fonts.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }

    pub fn interpret(&self, ops: &[ContentOp]) -> Vec<RawSpan> {
        let mut spans = Vec::new();

        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut text = TextState::default();
        let mut leading = 0.0_f32;

        let mut font_key: Vec<u8> = Vec::new();
        let mut font_size = DEFAULT_FONT_SIZE;

        let mut in_text_block = false;
        let mut block: usize = 0;
        let mut blocks_seen: usize = 0;
        let mut line: usize = 0;
        let mut line_y = 0.0_f32;
        let mut gap_before = false;

        for op in ops {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => {
                    if let Some(saved) = ctm_stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        ctm = m.multiply(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    text = TextState {
                        leading,
                        ..TextState::default()
                    };
                    block = blocks_seen;
                    blocks_seen += 1;
                    line = 0;
                    line_y = 0.0;
                    gap_before = false;
                }
                "ET" => {
                    in_text_block = false;
                    leading = text.leading;
                }
                "TL" => {
                    if let Some(tl) = op.operands.first().and_then(get_number_from_value) {
                        text.leading = tl;
                        leading = tl;
                    }
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let PdfValue::Name(name) = &op.operands[0] {
                            font_key = name.clone();
                        }
                        font_size = get_number_from_value(&op.operands[1]).unwrap_or(DEFAULT_FONT_SIZE);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number_from_value(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            text.leading = -ty;
                        }
                        text.move_line(tx, ty);
                        self.track_line(&text, &mut line, &mut line_y, &mut gap_before, tx != 0.0);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        let moved_x = m.e != text.line_matrix.e;
                        text.matrix = m;
                        text.line_matrix = m;
                        self.track_line(&text, &mut line, &mut line_y, &mut gap_before, moved_x);
                    }
                }
                "T*" => {
                    let tl = text.leading;
                    text.move_line(0.0, -tl);
                    self.track_line(&text, &mut line, &mut line_y, &mut gap_before, false);
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if !in_text_block {
                        continue;
                    }

                    if op.operator == "'" || op.operator == "\"" {
                        let tl = text.leading;
                        text.move_line(0.0, -tl);
                        self.track_line(&text, &mut line, &mut line_y, &mut gap_before, false);
                    }

                    let shown = match op.operator.as_str() {
                        "TJ" => self.decode_array(&font_key, op.operands.first()),
                        "\"" => self.decode_string(&font_key, op.operands.get(2)),
                        _ => self.decode_string(&font_key, op.operands.first()),
                    };

                    if shown.is_empty() {
                        continue;
                    }

                    let font = self.fonts.get(&font_key);
                    let font_name = font
                        .map(|f| f.base_font.clone())
                        .unwrap_or_else(|| String::from_utf8_lossy(&font_key).to_string());
                    let style = font
                        .map(|f| f.style)
                        .unwrap_or_else(|| FontStyle::from_font_name(&font_name));

                    let device = text.matrix.multiply(&ctm);
                    // A negative Tf mirrors glyphs; the painted size is its magnitude.
                    let size = font_size.abs() * device.vertical_scale();
                    let origin = ctm.transform_point(text.matrix.e, text.matrix.f);

                    spans.push(RawSpan {
                        text: shown,
                        font_key: font_key.clone(),
                        font_name,
                        style,
                        size,
                        origin,
                        block,
                        line,
                        gap_before,
                    });
                    gap_before = false;
                }
                _ => {}
            }
        }

        spans
    }

    /// Update the line counter after a text positioning operator.
    fn track_line(
        &self,
        text: &TextState,
        line: &mut usize,
        line_y: &mut f32,
        gap_before: &mut bool,
        moved_x: bool,
    ) {
        let y = text.line_matrix.f;
        if (y - *line_y).abs() > SAME_LINE_EPSILON {
            *line += 1;
            *line_y = y;
            *gap_before = false;
        } else if moved_x {
            *gap_before = true;
        }
    }

    fn decode_string(&self, font_key: &[u8], operand: Option<&PdfValue>) -> String {
        match operand {
            Some(PdfValue::Str(bytes)) => self.backend.decode_text(self.page, font_key, bytes),
            _ => String::new(),
        }
    }

    fn decode_array(&self, font_key: &[u8], operand: Option<&PdfValue>) -> String {
        let Some(PdfValue::Array(items)) = operand else {
            return String::new();
        };

        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    combined.push_str(&self.backend.decode_text(self.page, font_key, bytes));
                }
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    // Negative adjustments move the pen right; large ones are word breaks
                    let adjustment = -get_number_from_value(item).unwrap_or(0.0);
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}')
                    {
                        if let Some(c) = combined.chars().last() {
                            if !is_spaceless_script_char(c) {
                                combined.push(' ');
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::model::DocumentInfo;
    use std::collections::BTreeMap;

    struct NoBackend;

    impl PdfBackend for NoBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::new()
        }
        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>, ExtractionError> {
            Ok(Vec::new())
        }
        fn page_content(&self, _page: PageId) -> Result<Vec<u8>, ExtractionError> {
            Ok(Vec::new())
        }
        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, ExtractionError> {
            Ok(Vec::new())
        }
        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            crate::parser::backend::decode_text_simple(bytes)
        }
        fn document_info(&self) -> DocumentInfo {
            DocumentInfo::default()
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp::new(operator, operands)
    }

    fn name(s: &str) -> PdfValue {
        PdfValue::Name(s.as_bytes().to_vec())
    }

    fn string(s: &str) -> PdfValue {
        PdfValue::Str(s.as_bytes().to_vec())
    }

    fn int(i: i64) -> PdfValue {
        PdfValue::Integer(i)
    }

    fn interpret(ops: Vec<ContentOp>) -> Vec<RawSpan> {
        let fonts = vec![
            BackendFontInfo::from_name(b"F1".to_vec(), "Helvetica"),
            BackendFontInfo::from_name(b"F2".to_vec(), "Helvetica-Bold"),
        ];
        ContentInterpreter::new(&NoBackend, (1, 0), fonts).interpret(&ops)
    }

    #[test]
    fn test_font_and_size_tracking() {
        let spans = interpret(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F2"), int(24)]),
            op("Td", vec![int(72), int(700)]),
            op("Tj", vec![string("Title")]),
            op("ET", vec![]),
        ]);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Title");
        assert_eq!(spans[0].font_name, "Helvetica-Bold");
        assert!(spans[0].style.bold);
        assert!((spans[0].size - 24.0).abs() < 0.001);
        assert_eq!(spans[0].origin, (72.0, 700.0));
    }

    #[test]
    fn test_text_matrix_scales_size() {
        let spans = interpret(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(1)]),
            op(
                "Tm",
                vec![int(18), int(0), int(0), int(18), int(72), int(600)],
            ),
            op("Tj", vec![string("Scaled")]),
            op("ET", vec![]),
        ]);
        assert!((spans[0].size - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_ctm_scales_size_and_restores() {
        let spans = interpret(vec![
            op("q", vec![]),
            op("cm", vec![int(2), int(0), int(0), int(2), int(0), int(0)]),
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(10)]),
            op("Tj", vec![string("Big")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(10)]),
            op("Tj", vec![string("Normal")]),
            op("ET", vec![]),
        ]);
        assert!((spans[0].size - 20.0).abs() < 0.001);
        assert!((spans[1].size - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_blocks_and_lines() {
        let spans = interpret(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(12)]),
            op("TL", vec![int(14)]),
            op("Td", vec![int(72), int(700)]),
            op("Tj", vec![string("one")]),
            op("T*", vec![]),
            op("Tj", vec![string("two")]),
            op("'", vec![string("three")]),
            op("ET", vec![]),
            op("BT", vec![]),
            op("Tj", vec![string("four")]),
            op("ET", vec![]),
        ]);

        let positions: Vec<(usize, usize)> = spans.iter().map(|s| (s.block, s.line)).collect();
        assert_eq!(positions, vec![(0, 1), (0, 2), (0, 3), (1, 0)]);
        assert_eq!(spans[1].origin.1, 686.0);
    }

    #[test]
    fn test_horizontal_move_marks_gap() {
        let spans = interpret(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(12)]),
            op("Td", vec![int(72), int(700)]),
            op("Tj", vec![string("left")]),
            op("Td", vec![int(40), int(0)]),
            op("Tj", vec![string("right")]),
            op("ET", vec![]),
        ]);
        assert_eq!(spans[0].line, spans[1].line);
        assert!(spans[1].gap_before);
    }

    #[test]
    fn test_tj_kerning_inserts_space() {
        let spans = interpret(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(12)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    string("Hello"),
                    int(-250),
                    string("World"),
                    int(-50),
                    string("!"),
                ])],
            ),
            op("ET", vec![]),
        ]);
        assert_eq!(spans[0].text, "Hello World!");
    }

    #[test]
    fn test_text_outside_bt_ignored() {
        let spans = interpret(vec![op("Tj", vec![string("stray")])]);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_negative_font_size_uses_magnitude() {
        let spans = interpret(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F2"), int(-30)]),
            op("Td", vec![int(72), int(700)]),
            op("Tj", vec![string("Mirrored")]),
            op("ET", vec![]),
        ]);

        assert_eq!(spans.len(), 1);
        assert!((spans[0].size - 30.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_font_size() {
        let spans = interpret(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(0)]),
            op("Tj", vec![string("invisible")]),
            op("ET", vec![]),
        ]);
        assert_eq!(spans[0].size, 0.0);
    }
}
