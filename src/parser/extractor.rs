//! Text run extraction.
//!
//! [`TextRunExtractor`] opens a document once and hands out a lazy
//! [`RunStream`] that decodes one page at a time. Adjacent spans painted on
//! the same line with the same font are merged into a single [`TextRun`];
//! runs that are empty after normalization are dropped.

use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::content::{ContentInterpreter, RawSpan};
use super::normalize::{join_with_space, normalize_run_text};
use super::options::{ErrorMode, ParseOptions, ReadingOrder};
use crate::detect::detect_format_from_bytes;
use crate::error::ExtractionError;
use crate::model::{DocumentInfo, RunPosition, TextRun};

type Result<T> = std::result::Result<T, ExtractionError>;

/// Sizes closer than this are considered the same size when merging spans.
const SIZE_TOLERANCE: f32 = 0.01;

/// Extracts text runs from a PDF document.
pub struct TextRunExtractor<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ParseOptions,
    info: DocumentInfo,
}

impl TextRunExtractor<LopdfBackend> {
    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8], options: &ParseOptions) -> Result<Self> {
        let format = detect_format_from_bytes(data)?;
        log::debug!("Detected {}", format);

        let backend = LopdfBackend::load_bytes(data, options.password.as_deref())?;
        Self::with_backend(backend, options.clone())
    }

    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, options)
    }

    /// Read a PDF from any reader.
    pub fn from_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data, options)
    }
}

impl<B: PdfBackend> TextRunExtractor<B> {
    /// Wrap an already opened backend.
    ///
    /// Fails with [`ExtractionError::PageOutOfRange`] when the page
    /// selection names a page the document does not have.
    pub fn with_backend(backend: B, options: ParseOptions) -> Result<Self> {
        let info = backend.document_info();
        let page_count = backend.pages().len() as u32;

        if let Some(max) = options.pages.max_page() {
            if max > page_count {
                return Err(ExtractionError::PageOutOfRange(max, page_count));
            }
        }

        Ok(Self {
            backend,
            options,
            info,
        })
    }

    /// Document information gathered when the document was opened.
    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Options this extractor was created with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.info.page_count
    }

    /// Lazily extract runs in reading order.
    ///
    /// In strict mode the stream yields the first page error and then ends.
    /// In lenient mode undecodable pages are logged and skipped.
    pub fn runs(&self) -> RunStream<'_, B> {
        let pages = self
            .backend
            .pages()
            .into_iter()
            .filter(|(num, _)| self.options.pages.includes(*num))
            .collect();

        RunStream {
            extractor: self,
            pages,
            buffer: VecDeque::new(),
            next_sequence: 0,
            finished: false,
        }
    }

    /// Extract every run eagerly.
    pub fn collect_runs(&self) -> Result<Vec<TextRun>> {
        self.runs().collect()
    }

    fn page_spans(&self, page_id: PageId) -> Result<Vec<RawSpan>> {
        let content = self.backend.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let fonts = self.backend.page_fonts(page_id)?;
        let ops = self.backend.decode_content(&content)?;
        Ok(ContentInterpreter::new(&self.backend, page_id, fonts).interpret(&ops))
    }

    fn page_runs(&self, page_index: usize, page_id: PageId, next_sequence: &mut u64) -> Result<Vec<TextRun>> {
        let spans = self.page_spans(page_id)?;
        let mut runs = merge_spans(spans, page_index, self.options.normalize_text);

        if self.options.reading_order == ReadingOrder::Geometric {
            sort_geometric(&mut runs);
        }

        Ok(runs
            .into_iter()
            .map(|run| {
                let run = run.with_sequence(*next_sequence);
                *next_sequence += 1;
                run
            })
            .collect())
    }
}

/// A lazy, page-at-a-time stream of runs.
pub struct RunStream<'a, B: PdfBackend = LopdfBackend> {
    extractor: &'a TextRunExtractor<B>,
    pages: VecDeque<(u32, PageId)>,
    buffer: VecDeque<TextRun>,
    next_sequence: u64,
    finished: bool,
}

impl<B: PdfBackend> RunStream<'_, B> {
    /// Pages not yet decoded.
    pub fn remaining_pages(&self) -> usize {
        self.pages.len()
    }
}

impl<B: PdfBackend> Iterator for RunStream<'_, B> {
    type Item = Result<TextRun>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(run) = self.buffer.pop_front() {
                return Some(Ok(run));
            }
            if self.finished {
                return None;
            }

            let Some((page_num, page_id)) = self.pages.pop_front() else {
                self.finished = true;
                return None;
            };
            let page_index = page_num.saturating_sub(1) as usize;

            match self
                .extractor
                .page_runs(page_index, page_id, &mut self.next_sequence)
            {
                Ok(runs) => {
                    log::trace!("Page {}: {} runs", page_num, runs.len());
                    self.buffer.extend(runs);
                }
                Err(e) => match self.extractor.options.error_mode {
                    ErrorMode::Strict => {
                        self.finished = true;
                        self.pages.clear();
                        return Some(Err(e));
                    }
                    ErrorMode::Lenient => {
                        log::warn!("Skipping page {}: {}", page_num, e);
                    }
                },
            }
        }
    }
}

/// Merge consecutive spans that share block, line, font and size.
fn merge_spans(spans: Vec<RawSpan>, page_index: usize, normalize: bool) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut current: Option<RawSpan> = None;

    for mut span in spans {
        if normalize {
            span.text = normalize_run_text(&span.text);
        }

        match current.as_mut() {
            Some(open) if continues(open, &span) => {
                if span.gap_before {
                    join_with_space(&mut open.text, &span.text);
                } else {
                    open.text.push_str(&span.text);
                }
            }
            _ => {
                if let Some(done) = current.replace(span) {
                    push_run(&mut runs, done, page_index, normalize);
                }
            }
        }
    }

    if let Some(done) = current {
        push_run(&mut runs, done, page_index, normalize);
    }

    runs
}

fn continues(open: &RawSpan, next: &RawSpan) -> bool {
    open.block == next.block
        && open.line == next.line
        && open.font_key == next.font_key
        && open.style == next.style
        && (open.size - next.size).abs() < SIZE_TOLERANCE
}

fn push_run(runs: &mut Vec<TextRun>, span: RawSpan, page_index: usize, normalize: bool) {
    let text = if normalize {
        span.text.trim().to_string()
    } else {
        span.text
    };
    if text.trim().is_empty() {
        return;
    }

    runs.push(TextRun::new(
        text,
        span.size,
        span.font_name,
        span.style,
        RunPosition {
            page: page_index,
            block: span.block,
            line: span.line,
            sequence: 0,
        },
        span.origin,
    ));
}

/// Top-to-bottom, then left-to-right. Stable, so ties keep stream order.
fn sort_geometric(runs: &mut [TextRun]) {
    runs.sort_by(|a, b| {
        let (ax, ay) = a.origin();
        let (bx, by) = b.origin();
        by.total_cmp(&ay).then(ax.total_cmp(&bx))
    });
}
