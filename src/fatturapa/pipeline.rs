//! Sale-to-XML generation as a step-wise state machine.

use std::fmt;

use tracing::{debug, info, warn};

use super::attachments::embed;
use super::writer::{XmlOptions, to_fatturapa_xml_with};
use crate::config::CodecConfig;
use crate::core::*;
use crate::sale::{SaleAggregate, check_preconditions, map_checked};

/// Where a [`Generation`] currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStage {
    Received,
    /// Preconditions hold.
    Validated,
    /// Document model built from the records.
    Mapped,
    /// Tax summary and total computed.
    Aggregated,
    /// Document passed the field and cross-total checks.
    Built,
    /// Attachments appended.
    Embedded,
    /// XML bytes produced.
    Done,
    /// Terminal failure with the reason reported to the caller.
    Failed(String),
}

impl GenerationStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => f.write_str("received"),
            Self::Validated => f.write_str("validated"),
            Self::Mapped => f.write_str("mapped"),
            Self::Aggregated => f.write_str("aggregated"),
            Self::Built => f.write_str("built"),
            Self::Embedded => f.write_str("embedded"),
            Self::Done => f.write_str("done"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// A finished invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedInvoice {
    /// SDI file name, e.g. `IT01234567897_00001.xml`.
    pub file_name: String,
    /// UTF-8 XML bytes.
    pub xml: Vec<u8>,
    /// The document the bytes were rendered from.
    pub document: InvoiceDocument,
}

/// One generation run over one sale aggregate.
///
/// Each call to [`step`](Self::step) performs one atomic transition, so a
/// caller with a deadline can stop between steps and drop the run. Nothing
/// is shared between runs.
///
/// ```
/// use fattura::config::CodecConfig;
/// use fattura::fatturapa::{Generation, GenerationStage};
/// use fattura::sale::SaleAggregate;
///
/// let aggregate: SaleAggregate = serde_json::from_str(r#"{
///     "sale": {"saleId": "s-1", "saleNumber": 7, "saleDate": "2024-06-15", "status": "draft"},
///     "lines": [],
///     "buyer": {"companyName": "Bianchi SpA", "postalCode": "00184", "city": "Roma"},
///     "producer": {"companyName": "Rossi Srl", "postalCode": "20121", "city": "Milano"}
/// }"#).unwrap();
///
/// let config = CodecConfig::default();
/// let mut generation = Generation::new(&aggregate, &config, "00001");
/// let err = generation.step().unwrap_err();
/// assert!(err.to_string().contains("draft sale"));
/// assert!(matches!(generation.stage(), GenerationStage::Failed(_)));
/// ```
pub struct Generation<'a> {
    aggregate: &'a SaleAggregate,
    config: &'a CodecConfig,
    attachments: &'a [Attachment],
    progressive_number: String,
    stage: GenerationStage,
    document: Option<InvoiceDocument>,
    xml: Option<Vec<u8>>,
}

impl<'a> Generation<'a> {
    pub fn new(
        aggregate: &'a SaleAggregate,
        config: &'a CodecConfig,
        progressive_number: impl Into<String>,
    ) -> Self {
        Self {
            aggregate,
            config,
            attachments: &[],
            progressive_number: progressive_number.into(),
            stage: GenerationStage::Received,
            document: None,
            xml: None,
        }
    }

    /// Files to embed after the document is built.
    pub fn with_attachments(mut self, attachments: &'a [Attachment]) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn stage(&self) -> &GenerationStage {
        &self.stage
    }

    /// The document as far as it has been built.
    pub fn document(&self) -> Option<&InvoiceDocument> {
        self.document.as_ref()
    }

    /// Perform the next transition and return the new stage.
    ///
    /// Any error moves the run to [`GenerationStage::Failed`] and is returned
    /// unchanged. Terminal stages are sticky: stepping a finished run
    /// returns its stage again.
    pub fn step(&mut self) -> Result<&GenerationStage, FatturaError> {
        if self.stage.is_terminal() {
            return Ok(&self.stage);
        }
        let from = self.stage.clone();
        match self.advance() {
            Ok(next) => {
                debug!(
                    sale_id = %self.aggregate.sale.sale_id,
                    "generation {from} -> {next}"
                );
                self.stage = next;
                Ok(&self.stage)
            }
            Err(e) => {
                warn!(
                    sale_id = %self.aggregate.sale.sale_id,
                    stage = %from,
                    "invoice generation failed: {e}"
                );
                self.stage = GenerationStage::Failed(e.to_string());
                self.document = None;
                Err(e)
            }
        }
    }

    /// Step until the run finishes or `keep_going` returns false for the
    /// stage just reached.
    pub fn run_while(
        &mut self,
        mut keep_going: impl FnMut(&GenerationStage) -> bool,
    ) -> Result<&GenerationStage, FatturaError> {
        while !self.stage.is_terminal() {
            let stage = self.step()?;
            if !keep_going(stage) {
                break;
            }
        }
        Ok(&self.stage)
    }

    /// Run to completion.
    pub fn run(mut self) -> Result<GeneratedInvoice, FatturaError> {
        self.run_while(|_| true)?;
        self.finish()
    }

    /// Take the result of a run that reached [`GenerationStage::Done`].
    pub fn finish(self) -> Result<GeneratedInvoice, FatturaError> {
        match (self.stage, self.document, self.xml) {
            (GenerationStage::Done, Some(document), Some(xml)) => Ok(GeneratedInvoice {
                file_name: document.header.file_name(),
                xml,
                document,
            }),
            (stage, _, _) => Err(FatturaError::Serialization(format!(
                "generation is not complete (stage: {stage})"
            ))),
        }
    }

    fn advance(&mut self) -> Result<GenerationStage, FatturaError> {
        match self.stage {
            GenerationStage::Received => {
                self.config.validate()?;
                check_preconditions(self.aggregate, self.config)?;
                Ok(GenerationStage::Validated)
            }
            GenerationStage::Validated => {
                let doc = map_checked(self.aggregate, self.config, &self.progressive_number)?;
                self.document = Some(doc);
                Ok(GenerationStage::Mapped)
            }
            GenerationStage::Mapped => {
                let aggregate = self.aggregate;
                let legal_reference = aggregate.sale.vat_off.as_deref();
                let totals = apply_summary(self.document_mut()?, legal_reference)?;
                debug!(
                    "taxable {} + tax {} = {}",
                    totals.taxable_total, totals.tax_total, totals.document_total
                );
                Ok(GenerationStage::Aggregated)
            }
            GenerationStage::Aggregated => {
                let doc = self.document.as_ref().ok_or_else(missing_document)?;
                collapse_errors(validate_document(doc))?;
                verify_summary(&doc.lines, &doc.tax_summary)?;
                Ok(GenerationStage::Built)
            }
            GenerationStage::Built if !self.attachments.is_empty() => {
                let doc = self.take_document()?;
                self.document = Some(embed(doc, self.attachments));
                Ok(GenerationStage::Embedded)
            }
            GenerationStage::Built | GenerationStage::Embedded => {
                let doc = self.document.as_ref().ok_or_else(missing_document)?;
                collapse_errors(validate_document(doc))?;
                let xml = to_fatturapa_xml_with(doc, &XmlOptions::from(self.config))?;
                info!(
                    sale_id = %self.aggregate.sale.sale_id,
                    file = %doc.header.file_name(),
                    bytes = xml.len(),
                    "invoice generated"
                );
                self.xml = Some(xml);
                Ok(GenerationStage::Done)
            }
            GenerationStage::Done | GenerationStage::Failed(_) => Ok(self.stage.clone()),
        }
    }

    fn document_mut(&mut self) -> Result<&mut InvoiceDocument, FatturaError> {
        self.document.as_mut().ok_or_else(missing_document)
    }

    fn take_document(&mut self) -> Result<InvoiceDocument, FatturaError> {
        self.document.take().ok_or_else(missing_document)
    }
}

fn missing_document() -> FatturaError {
    FatturaError::Serialization("no document at this stage".into())
}

/// Generate the invoice for one sale in a single call.
pub fn generate(
    aggregate: &SaleAggregate,
    attachments: &[Attachment],
    config: &CodecConfig,
    progressive_number: &str,
) -> Result<GeneratedInvoice, FatturaError> {
    info!(
        sale_id = %aggregate.sale.sale_id,
        lines = aggregate.lines.len(),
        attachments = attachments.len(),
        "generating invoice"
    );
    Generation::new(aggregate, config, progressive_number)
        .with_attachments(attachments)
        .run()
}
