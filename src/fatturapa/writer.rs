use rust_decimal::Decimal;
use tracing::debug;

use super::xml_utils::XmlWriter;
use super::{FPR12_SCHEMA_LOCATION, ns};
use crate::config::CodecConfig;
use crate::core::*;

/// Rendering options for [`to_fatturapa_xml_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    /// Indentation width (0 = compact).
    pub indent: usize,
    /// `CodiceTipo` written next to item codes.
    pub item_code_type: String,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self::from(&CodecConfig::default())
    }
}

impl From<&CodecConfig> for XmlOptions {
    fn from(config: &CodecConfig) -> Self {
        Self {
            indent: config.indent,
            item_code_type: config.item_code_type.clone(),
        }
    }
}

/// Serialize a document to FatturaPA FPR12 XML with default options.
pub fn to_fatturapa_xml(doc: &InvoiceDocument) -> Result<Vec<u8>, FatturaError> {
    to_fatturapa_xml_with(doc, &XmlOptions::default())
}

/// Serialize a document to FatturaPA FPR12 XML.
///
/// The document must already be complete: a document without lines or
/// without a tax summary is a [`FatturaError::Serialization`] error, since
/// the mapper and aggregator never produce one. Output is deterministic for
/// a given document.
pub fn to_fatturapa_xml_with(
    doc: &InvoiceDocument,
    options: &XmlOptions,
) -> Result<Vec<u8>, FatturaError> {
    if doc.lines.is_empty() {
        return Err(FatturaError::Serialization(
            "DettaglioLinee requires at least one line".into(),
        ));
    }
    if doc.tax_summary.is_empty() {
        return Err(FatturaError::Serialization(
            "DatiRiepilogo requires at least one tax summary entry".into(),
        ));
    }

    let mut w = XmlWriter::new(options.indent)?;
    w.start_element_with_attrs(
        "p:FatturaElettronica",
        &[
            ("versione", doc.header.format.code()),
            ("xmlns:ds", ns::DS),
            ("xmlns:p", ns::FATTURA),
            ("xmlns:xsi", ns::XSI),
            ("xsi:schemaLocation", FPR12_SCHEMA_LOCATION),
        ],
    )?;

    w.start_element("FatturaElettronicaHeader")?;
    write_transmission(&mut w, &doc.header)?;
    w.start_element("CedentePrestatore")?;
    write_party(&mut w, &doc.supplier, true)?;
    w.end_element("CedentePrestatore")?;
    w.start_element("CessionarioCommittente")?;
    write_party(&mut w, &doc.customer, false)?;
    w.end_element("CessionarioCommittente")?;
    w.end_element("FatturaElettronicaHeader")?;

    w.start_element("FatturaElettronicaBody")?;
    let total = doc
        .general
        .total
        .unwrap_or_else(|| document_totals(&doc.tax_summary).document_total);
    write_general(&mut w, &doc.general, total)?;

    w.start_element("DatiBeniServizi")?;
    for line in &doc.lines {
        write_line(&mut w, line, &options.item_code_type)?;
    }
    for entry in &doc.tax_summary {
        write_summary(&mut w, entry)?;
    }
    w.end_element("DatiBeniServizi")?;

    if let Some(payment) = &doc.payment {
        write_payment(&mut w, payment, total)?;
    }
    for attachment in &doc.attachments {
        w.start_element("Allegati")?;
        w.text_element("NomeAttachment", &attachment.name)?;
        w.optional_element("FormatoAttachment", attachment.format.as_deref())?;
        w.optional_element("DescrizioneAttachment", attachment.description.as_deref())?;
        w.text_element("Attachment", &attachment.content)?;
        w.end_element("Allegati")?;
    }
    w.end_element("FatturaElettronicaBody")?;
    w.end_element("p:FatturaElettronica")?;

    let bytes = w.into_bytes();
    debug!(
        "serialized document {} ({} bytes)",
        doc.general.number,
        bytes.len()
    );
    Ok(bytes)
}

// 1.1 DatiTrasmissione
fn write_transmission(w: &mut XmlWriter, header: &InvoiceHeader) -> Result<(), FatturaError> {
    w.start_element("DatiTrasmissione")?;
    w.start_element("IdTrasmittente")?;
    w.text_element("IdPaese", &header.transmitter.country)?;
    w.text_element("IdCodice", &header.transmitter.number)?;
    w.end_element("IdTrasmittente")?;
    w.text_element("ProgressivoInvio", &header.progressive_number)?;
    w.text_element("FormatoTrasmissione", header.format.code())?;
    w.text_element("CodiceDestinatario", &header.destination_code)?;
    if let Some(email) = &header.transmitter_email {
        w.start_element("ContattiTrasmittente")?;
        w.text_element("Email", email)?;
        w.end_element("ContattiTrasmittente")?;
    }
    w.optional_element("PECDestinatario", header.recipient_pec.as_deref())?;
    w.end_element("DatiTrasmissione")?;
    Ok(())
}

// 1.2 / 1.4 DatiAnagrafici, Sede, Contatti
fn write_party(w: &mut XmlWriter, party: &Party, is_supplier: bool) -> Result<(), FatturaError> {
    w.start_element("DatiAnagrafici")?;
    if let Some(id) = &party.vat_id {
        w.start_element("IdFiscaleIVA")?;
        w.text_element("IdPaese", &id.country)?;
        w.text_element("IdCodice", &id.number)?;
        w.end_element("IdFiscaleIVA")?;
    } else if is_supplier {
        return Err(FatturaError::Serialization(
            "CedentePrestatore requires IdFiscaleIVA".into(),
        ));
    }
    w.optional_element("CodiceFiscale", party.fiscal_code.as_deref())?;

    w.start_element("Anagrafica")?;
    match &party.name {
        PartyName::Company(name) => {
            w.text_element("Denominazione", name)?;
        }
        PartyName::Person {
            first_name,
            last_name,
        } => {
            w.text_element("Nome", first_name)?;
            w.text_element("Cognome", last_name)?;
        }
    }
    w.end_element("Anagrafica")?;
    if is_supplier {
        w.text_element("RegimeFiscale", party.tax_regime.as_deref().unwrap_or_default())?;
    }
    w.end_element("DatiAnagrafici")?;

    let address = &party.address;
    w.start_element("Sede")?;
    w.text_element("Indirizzo", &address.street)?;
    w.optional_element("NumeroCivico", address.street_number.as_deref())?;
    w.text_element("CAP", &address.postal_code)?;
    w.text_element("Comune", &address.city)?;
    w.optional_element("Provincia", address.province.as_deref())?;
    w.text_element("Nazione", &address.country)?;
    w.end_element("Sede")?;

    if let (true, Some(contact)) = (is_supplier, &party.contact) {
        w.start_element("Contatti")?;
        w.optional_element("Telefono", contact.phone.as_deref())?;
        w.optional_element("Email", contact.email.as_deref())?;
        w.end_element("Contatti")?;
    }
    Ok(())
}

// 2.1 DatiGenerali
fn write_general(
    w: &mut XmlWriter,
    general: &GeneralData,
    total: Decimal,
) -> Result<(), FatturaError> {
    w.start_element("DatiGenerali")?;

    w.start_element("DatiGeneraliDocumento")?;
    w.text_element("TipoDocumento", general.document_type.code())?;
    w.text_element("Divisa", &general.currency)?;
    w.text_element("Data", &general.date.to_string())?;
    w.text_element("Numero", &general.number)?;
    w.amount_element("ImportoTotaleDocumento", total)?;
    for reason in &general.reasons {
        w.text_element("Causale", reason)?;
    }
    w.end_element("DatiGeneraliDocumento")?;

    if let Some(po) = &general.purchase_order {
        w.start_element("DatiOrdineAcquisto")?;
        w.text_element("IdDocumento", &po.id)?;
        if let Some(date) = po.date {
            w.text_element("Data", &date.to_string())?;
        }
        w.end_element("DatiOrdineAcquisto")?;
    }

    for ddt in &general.delivery_notes {
        w.start_element("DatiDDT")?;
        w.text_element("NumeroDDT", &ddt.id)?;
        let date = ddt.date.map(|d| d.to_string()).unwrap_or_default();
        w.text_element("DataDDT", &date)?;
        w.end_element("DatiDDT")?;
    }

    w.end_element("DatiGenerali")?;
    Ok(())
}

// 2.2.1 DettaglioLinee
fn write_line(w: &mut XmlWriter, line: &InvoiceLine, item_code_type: &str) -> Result<(), FatturaError> {
    w.start_element("DettaglioLinee")?;
    w.text_element("NumeroLinea", &line.line_number.to_string())?;
    if let Some(code) = &line.item_code {
        w.start_element("CodiceArticolo")?;
        w.text_element("CodiceTipo", item_code_type)?;
        w.text_element("CodiceValore", code)?;
        w.end_element("CodiceArticolo")?;
    }
    w.text_element("Descrizione", &line.description)?;
    w.amount_element("Quantita", line.quantity)?;
    w.optional_element("UnitaMisura", line.unit.as_deref())?;
    w.amount_element("PrezzoUnitario", line.unit_price)?;
    if let Some(pct) = line.discount_percent.filter(|p| !p.is_zero()) {
        w.start_element("ScontoMaggiorazione")?;
        w.text_element("Tipo", "SC")?;
        w.amount_element("Percentuale", pct)?;
        w.end_element("ScontoMaggiorazione")?;
    }
    w.amount_element("PrezzoTotale", line.net_amount())?;
    w.amount_element("AliquotaIVA", line.tax_rate)?;
    if let Some(nature) = line.nature {
        w.text_element("Natura", nature.code())?;
    }
    w.end_element("DettaglioLinee")?;
    Ok(())
}

// 2.2.2 DatiRiepilogo
fn write_summary(w: &mut XmlWriter, entry: &TaxSummaryEntry) -> Result<(), FatturaError> {
    w.start_element("DatiRiepilogo")?;
    w.amount_element("AliquotaIVA", entry.tax_rate)?;
    if let Some(nature) = entry.nature {
        w.text_element("Natura", nature.code())?;
    }
    w.amount_element("ImponibileImporto", entry.taxable_amount)?;
    w.amount_element("Imposta", entry.tax_amount)?;
    match entry.nature {
        None => {
            // Immediate exigibility.
            w.text_element("EsigibilitaIVA", "I")?;
        }
        Some(nature) => {
            let reference = entry
                .legal_reference
                .as_deref()
                .unwrap_or(nature.legal_reference());
            w.text_element("RiferimentoNormativo", reference)?;
        }
    }
    w.end_element("DatiRiepilogo")?;
    Ok(())
}

// 2.4 DatiPagamento
fn write_payment(
    w: &mut XmlWriter,
    payment: &PaymentTerms,
    total: Decimal,
) -> Result<(), FatturaError> {
    w.start_element("DatiPagamento")?;
    w.text_element("CondizioniPagamento", payment.condition.code())?;
    w.start_element("DettaglioPagamento")?;
    w.text_element("ModalitaPagamento", payment.method.code())?;
    if let Some(due) = payment.due_date {
        w.text_element("DataScadenzaPagamento", &due.to_string())?;
    }
    w.amount_element("ImportoPagamento", payment.amount.unwrap_or(total))?;
    w.optional_element("IstitutoFinanziario", payment.institution.as_deref())?;
    w.optional_element("IBAN", payment.iban.as_deref())?;
    w.end_element("DettaglioPagamento")?;
    w.end_element("DatiPagamento")?;
    Ok(())
}
