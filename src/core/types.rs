use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round2;
use super::nature::NatureCode;

/// FatturaElettronica: the root aggregate of one generation call.
///
/// Built once by the mapper, completed by the aggregator and the embedder,
/// then handed to the serializer and never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    /// 1.1: DatiTrasmissione.
    pub header: InvoiceHeader,
    /// 1.2: CedentePrestatore.
    pub supplier: Party,
    /// 1.4: CessionarioCommittente.
    pub customer: Party,
    /// 2.1.1: DatiGeneraliDocumento and related references.
    pub general: GeneralData,
    /// 2.2.1: DettaglioLinee.
    pub lines: Vec<InvoiceLine>,
    /// 2.2.2: DatiRiepilogo, one entry per (rate, nature) pair.
    pub tax_summary: Vec<TaxSummaryEntry>,
    /// 2.4: DatiPagamento.
    pub payment: Option<PaymentTerms>,
    /// 2.5: Allegati.
    pub attachments: Vec<EmbeddedAttachment>,
}

/// 1.1: Transmission data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// 1.1.1: IdTrasmittente.
    pub transmitter: VatId,
    /// 1.1.2: ProgressivoInvio, 1-10 alphanumerics, unique per transmitter.
    pub progressive_number: String,
    /// 1.1.3: FormatoTrasmissione.
    pub format: TransmissionFormat,
    /// 1.1.4: CodiceDestinatario; the fallback sentinel for unregistered recipients.
    pub destination_code: String,
    /// 1.1.5: ContattiTrasmittente email.
    pub transmitter_email: Option<String>,
    /// 1.1.6: PECDestinatario, only meaningful with the fallback code.
    pub recipient_pec: Option<String>,
}

impl InvoiceHeader {
    /// SDI file name: `{country}{code}_{progressive}.xml`.
    pub fn file_name(&self) -> String {
        format!(
            "{}{}_{}.xml",
            self.transmitter.country, self.transmitter.number, self.progressive_number
        )
    }
}

/// Transmission format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransmissionFormat {
    /// FPR12: invoices between private parties.
    Fpr12,
}

impl TransmissionFormat {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fpr12 => "FPR12",
        }
    }

    /// Required length of `CodiceDestinatario` for this format.
    pub fn destination_code_len(&self) -> usize {
        match self {
            Self::Fpr12 => 7,
        }
    }
}

/// IdFiscaleIVA: country code and code, always kept apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VatId {
    /// IdPaese (ISO 3166-1 alpha-2).
    pub country: String,
    /// IdCodice, without the country prefix.
    pub number: String,
}

impl std::fmt::Display for VatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.country, self.number)
    }
}

/// 1.2 / 1.4: Trading party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// IdFiscaleIVA.
    pub vat_id: Option<VatId>,
    /// CodiceFiscale.
    pub fiscal_code: Option<String>,
    /// Anagrafica.
    pub name: PartyName,
    /// Sede.
    pub address: Address,
    /// RegimeFiscale (supplier only, e.g. "RF01").
    pub tax_regime: Option<String>,
    /// Contatti (supplier only).
    pub contact: Option<Contact>,
}

/// Anagrafica: either a company name or a person's names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyName {
    /// Denominazione.
    Company(String),
    /// Nome + Cognome.
    Person {
        first_name: String,
        last_name: String,
    },
}

impl PartyName {
    /// Name as a single line, for logs and messages.
    pub fn display_name(&self) -> String {
        match self {
            Self::Company(name) => name.clone(),
            Self::Person {
                first_name,
                last_name,
            } => format!("{first_name} {last_name}"),
        }
    }
}

/// Sede: postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Indirizzo.
    pub street: String,
    /// NumeroCivico.
    pub street_number: Option<String>,
    /// CAP (five digits for Italy).
    pub postal_code: String,
    /// Comune.
    pub city: String,
    /// Provincia (two-letter abbreviation).
    pub province: Option<String>,
    /// Nazione (ISO 3166-1 alpha-2).
    pub country: String,
}

/// Contatti.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Telefono.
    pub phone: Option<String>,
    /// Email.
    pub email: Option<String>,
}

/// 2.1: General document data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralData {
    /// TipoDocumento.
    pub document_type: DocumentType,
    /// Divisa (ISO 4217).
    pub currency: String,
    /// Data.
    pub date: NaiveDate,
    /// Numero.
    pub number: String,
    /// ImportoTotaleDocumento; set once the tax summary is known.
    pub total: Option<Decimal>,
    /// Causale, each entry at most 200 characters.
    pub reasons: Vec<String>,
    /// 2.1.2: DatiOrdineAcquisto.
    pub purchase_order: Option<DocumentReference>,
    /// 2.1.8: DatiDDT.
    pub delivery_notes: Vec<DocumentReference>,
}

/// A referenced document (order, delivery note).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub id: String,
    pub date: Option<NaiveDate>,
}

/// TipoDocumento (subset issued from sales).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// TD01: invoice.
    Invoice,
    /// TD04: credit note.
    CreditNote,
    /// TD05: debit note.
    DebitNote,
    /// TD06: professional fee note.
    FeeNote,
}

impl DocumentType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invoice => "TD01",
            Self::CreditNote => "TD04",
            Self::DebitNote => "TD05",
            Self::FeeNote => "TD06",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TD01" => Some(Self::Invoice),
            "TD04" => Some(Self::CreditNote),
            "TD05" => Some(Self::DebitNote),
            "TD06" => Some(Self::FeeNote),
            _ => None,
        }
    }
}

/// 2.2.1: Invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// NumeroLinea, 1-based and contiguous.
    pub line_number: u32,
    /// CodiceArticolo value.
    pub item_code: Option<String>,
    /// Descrizione.
    pub description: String,
    /// Quantita.
    pub quantity: Decimal,
    /// UnitaMisura.
    pub unit: Option<String>,
    /// PrezzoUnitario.
    pub unit_price: Decimal,
    /// ScontoMaggiorazione percentage (discount).
    pub discount_percent: Option<Decimal>,
    /// AliquotaIVA.
    pub tax_rate: Decimal,
    /// Natura, required iff the rate is zero.
    pub nature: Option<NatureCode>,
}

impl InvoiceLine {
    /// PrezzoTotale: `round2(quantity * unit_price * (1 - discount / 100))`.
    pub fn net_amount(&self) -> Decimal {
        let gross = self.quantity * self.unit_price;
        let net = match self.discount_percent {
            Some(pct) if !pct.is_zero() => gross * (Decimal::ONE_HUNDRED - pct) / Decimal::ONE_HUNDRED,
            _ => gross,
        };
        round2(net)
    }

    /// Tax on the rounded net amount, itself rounded.
    pub fn tax_amount(&self) -> Decimal {
        round2(self.net_amount() * self.tax_rate / Decimal::ONE_HUNDRED)
    }
}

/// 2.2.2: Tax summary per (rate, nature) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSummaryEntry {
    /// AliquotaIVA.
    pub tax_rate: Decimal,
    /// Natura.
    pub nature: Option<NatureCode>,
    /// ImponibileImporto: sum of the rounded line net amounts.
    pub taxable_amount: Decimal,
    /// Imposta: sum of the rounded line tax amounts.
    pub tax_amount: Decimal,
    /// RiferimentoNormativo, for nature entries.
    pub legal_reference: Option<String>,
}

/// Document totals derived from the tax summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub taxable_total: Decimal,
    pub tax_total: Decimal,
    /// ImportoTotaleDocumento = taxable + tax.
    pub document_total: Decimal,
}

/// 2.4: Payment data (single full payment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    /// CondizioniPagamento.
    pub condition: PaymentCondition,
    /// ModalitaPagamento.
    pub method: PaymentMethod,
    /// DataScadenzaPagamento.
    pub due_date: Option<NaiveDate>,
    /// ImportoPagamento; the document total when unset.
    pub amount: Option<Decimal>,
    /// IstitutoFinanziario.
    pub institution: Option<String>,
    /// IBAN.
    pub iban: Option<String>,
}

/// CondizioniPagamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentCondition {
    /// TP01: installments.
    Installments,
    /// TP02: full payment.
    Full,
    /// TP03: advance.
    Advance,
}

impl PaymentCondition {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Installments => "TP01",
            Self::Full => "TP02",
            Self::Advance => "TP03",
        }
    }
}

/// ModalitaPagamento (MP01–MP23).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// MP01
    Cash,
    /// MP02
    Cheque,
    /// MP03
    BankersDraft,
    /// MP04
    CashAtTreasury,
    /// MP05
    BankTransfer,
    /// MP06
    PromissoryNote,
    /// MP07
    PaymentSlip,
    /// MP08
    PaymentCard,
    /// MP09
    Rid,
    /// MP10
    RidUtilities,
    /// MP11
    RidFast,
    /// MP12
    Riba,
    /// MP13
    Mav,
    /// MP14
    TreasuryReceipt,
    /// MP15
    SpecialAccountTransfer,
    /// MP16
    BankDirectDebit,
    /// MP17
    PostalDirectDebit,
    /// MP18
    PostalSlip,
    /// MP19
    SepaDirectDebit,
    /// MP20
    SepaDirectDebitCore,
    /// MP21
    SepaDirectDebitB2b,
    /// MP22
    WithheldSums,
    /// MP23
    PagoPa,
}

/// Methods in `MPxx` order.
static PAYMENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod::Cash,
    PaymentMethod::Cheque,
    PaymentMethod::BankersDraft,
    PaymentMethod::CashAtTreasury,
    PaymentMethod::BankTransfer,
    PaymentMethod::PromissoryNote,
    PaymentMethod::PaymentSlip,
    PaymentMethod::PaymentCard,
    PaymentMethod::Rid,
    PaymentMethod::RidUtilities,
    PaymentMethod::RidFast,
    PaymentMethod::Riba,
    PaymentMethod::Mav,
    PaymentMethod::TreasuryReceipt,
    PaymentMethod::SpecialAccountTransfer,
    PaymentMethod::BankDirectDebit,
    PaymentMethod::PostalDirectDebit,
    PaymentMethod::PostalSlip,
    PaymentMethod::SepaDirectDebit,
    PaymentMethod::SepaDirectDebitCore,
    PaymentMethod::SepaDirectDebitB2b,
    PaymentMethod::WithheldSums,
    PaymentMethod::PagoPa,
];

impl PaymentMethod {
    /// `MPxx` code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cash => "MP01",
            Self::Cheque => "MP02",
            Self::BankersDraft => "MP03",
            Self::CashAtTreasury => "MP04",
            Self::BankTransfer => "MP05",
            Self::PromissoryNote => "MP06",
            Self::PaymentSlip => "MP07",
            Self::PaymentCard => "MP08",
            Self::Rid => "MP09",
            Self::RidUtilities => "MP10",
            Self::RidFast => "MP11",
            Self::Riba => "MP12",
            Self::Mav => "MP13",
            Self::TreasuryReceipt => "MP14",
            Self::SpecialAccountTransfer => "MP15",
            Self::BankDirectDebit => "MP16",
            Self::PostalDirectDebit => "MP17",
            Self::PostalSlip => "MP18",
            Self::SepaDirectDebit => "MP19",
            Self::SepaDirectDebitCore => "MP20",
            Self::SepaDirectDebitB2b => "MP21",
            Self::WithheldSums => "MP22",
            Self::PagoPa => "MP23",
        }
    }

    /// Parse an `MPxx` code.
    pub fn from_code(code: &str) -> Option<Self> {
        let n: usize = code.strip_prefix("MP")?.parse().ok()?;
        if code.len() != 4 || n == 0 {
            return None;
        }
        PAYMENT_METHODS.get(n - 1).copied()
    }
}

/// A file to embed, as handed over by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub description: Option<String>,
    pub bytes: Vec<u8>,
    /// MIME type or extension hint, used to derive `FormatoAttachment`.
    pub mime_type_hint: Option<String>,
}

/// 2.5: Allegati, content already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedAttachment {
    /// NomeAttachment.
    pub name: String,
    /// FormatoAttachment (e.g. "PDF").
    pub format: Option<String>,
    /// DescrizioneAttachment.
    pub description: Option<String>,
    /// Attachment (base64).
    pub content: String,
}
