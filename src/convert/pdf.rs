//! PDF converter implementation.

use std::io::Read;
use std::path::Path;

use rayon::prelude::*;

use super::{ConversionStats, ConvertOptions, ConvertResult};
use crate::classify::FontStyleClassifier;
use crate::error::{ClassificationConfigError, Result};
use crate::model::{DocumentInfo, Role, TextRun};
use crate::parser::TextRunExtractor;
use crate::render::{JsonDocument, MetadataEnricher};
use crate::structure::build_structure;

/// PDF converter.
///
/// Holds validated options; each call runs the whole pipeline on its own
/// data and shares nothing with other calls.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    options: ConvertOptions,
}

impl PdfConverter {
    /// Create a converter, rejecting an invalid threshold configuration
    /// before any input is read.
    pub fn new(options: ConvertOptions) -> std::result::Result<Self, ClassificationConfigError> {
        options.thresholds.validate()?;
        Ok(Self { options })
    }

    /// The options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert PDF bytes to an enriched document.
    pub fn convert_bytes(&self, data: &[u8]) -> Result<JsonDocument> {
        Ok(self.convert_bytes_with_stats(data)?.document)
    }

    /// Convert PDF bytes and report statistics.
    pub fn convert_bytes_with_stats(&self, data: &[u8]) -> Result<ConvertResult> {
        let extractor = TextRunExtractor::from_bytes(data, &self.options.parse)?;
        let info = extractor.info().clone();
        log::debug!(
            "Loaded PDF {} with {} pages",
            info.pdf_version,
            info.page_count
        );

        let runs = extractor.collect_runs()?;
        let pages = (1..=info.page_count)
            .filter(|page| self.options.parse.pages.includes(*page))
            .count();
        log::debug!("Extracted {} runs from {} pages", runs.len(), pages);

        let mut result = self.convert_runs(&runs, info)?;
        result.stats.pages = pages;
        Ok(result)
    }

    /// Convert a PDF file. The file name is recorded unless the options
    /// already name one.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConvertResult> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        if self.options.file_name.is_some() {
            return self.convert_bytes_with_stats(&data);
        }

        let mut options = self.options.clone();
        options.file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Self { options }.convert_bytes_with_stats(&data)
    }

    /// Convert a PDF read from any reader.
    pub fn convert_reader<R: Read>(&self, mut reader: R) -> Result<ConvertResult> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.convert_bytes_with_stats(&data)
    }

    /// Convert several files in parallel. Results keep the input order.
    pub fn convert_batch<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<Result<ConvertResult>> {
        paths
            .par_iter()
            .map(|path| self.convert_file(path))
            .collect()
    }

    /// Run classification, tree building, projection and enrichment on
    /// runs that were already extracted.
    pub fn convert_runs(&self, runs: &[TextRun], info: DocumentInfo) -> Result<ConvertResult> {
        let classifier = FontStyleClassifier::for_runs(&self.options.thresholds, runs)?;
        let thresholds = *classifier.thresholds();
        log::debug!(
            "Thresholds: h1 >= {:.1}, h2 >= {:.1}, h3 >= {:.1}",
            thresholds.heading1_min_size,
            thresholds.heading2_min_size,
            thresholds.heading3_min_size
        );

        let unknown_runs = runs
            .iter()
            .filter(|run| classifier.classify(run) == Role::Unknown)
            .count();

        let root = build_structure(runs, &classifier, self.options.paragraph_merge);
        let document = JsonDocument::from_tree(&root, &self.options.project)?;
        let document = self.enricher(&info).enrich_document(document);

        let stats = ConversionStats {
            pages: info.page_count as usize,
            runs: runs.len(),
            unknown_runs,
            ..ConversionStats::from_tree(&root)
        };
        log::info!(
            "Converted {} runs into {} headings, {} paragraphs, {} emphasis",
            stats.runs,
            stats.headings(),
            stats.paragraphs,
            stats.emphasis
        );

        Ok(ConvertResult {
            document,
            info,
            thresholds,
            stats,
            format: self.options.format,
        })
    }

    /// Extract runs and pair each with its role, without building a tree.
    pub fn classify_bytes(&self, data: &[u8]) -> Result<Vec<(TextRun, Role)>> {
        let extractor = TextRunExtractor::from_bytes(data, &self.options.parse)?;
        let runs = extractor.collect_runs()?;
        let classifier = FontStyleClassifier::for_runs(&self.options.thresholds, &runs)?;
        Ok(runs
            .into_iter()
            .map(|run| {
                let role = classifier.classify(&run);
                (run, role)
            })
            .collect())
    }

    fn enricher(&self, info: &DocumentInfo) -> MetadataEnricher {
        let mut enricher = MetadataEnricher::new(self.options.base_url.clone());
        if let Some(name) = &self.options.file_name {
            enricher = enricher.with_file_name(name);
        }
        if self.options.include_info {
            enricher = enricher.with_document_info(info.clone());
        }
        if let Some(placeholder) = &self.options.title_placeholder {
            enricher = enricher.with_placeholder(placeholder.clone());
        }
        enricher
    }
}

#[cfg(feature = "async")]
impl PdfConverter {
    /// Read a file asynchronously, then convert it.
    pub async fn convert_file_async<P: AsRef<Path>>(&self, path: P) -> Result<ConvertResult> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;

        let mut options = self.options.clone();
        if options.file_name.is_none() {
            options.file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        }
        Self { options }.convert_bytes_with_stats(&data)
    }
}
