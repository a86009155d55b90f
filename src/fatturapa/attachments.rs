use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::core::{Attachment, EmbeddedAttachment, InvoiceDocument};

const MAX_NAME: usize = 60;
const MAX_FORMAT: usize = 10;
const MAX_DESCRIPTION: usize = 100;

/// Append one `Allegati` block per file, base64-encoding the raw bytes.
///
/// Bytes are passed through untouched (no compression). Names and
/// descriptions are shortened to the schema's field widths.
pub fn embed(mut doc: InvoiceDocument, attachments: &[Attachment]) -> InvoiceDocument {
    for (i, attachment) in attachments.iter().enumerate() {
        let embedded = encode_attachment(attachment, doc.attachments.len() + 1);
        debug!(
            "embedding attachment {} of {}: {} ({} bytes)",
            i + 1,
            attachments.len(),
            embedded.name,
            attachment.bytes.len()
        );
        doc.attachments.push(embedded);
    }
    doc
}

/// Encode a single attachment; `position` names files that have no name.
pub fn encode_attachment(attachment: &Attachment, position: usize) -> EmbeddedAttachment {
    let name = match attachment.file_name.trim() {
        "" => format!("allegato_{position}"),
        name => shorten_file_name(name),
    };
    EmbeddedAttachment {
        format: attachment_format(attachment),
        description: attachment
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| d.chars().take(MAX_DESCRIPTION).collect()),
        content: STANDARD.encode(&attachment.bytes),
        name,
    }
}

/// `FormatoAttachment` from the MIME hint, else from the file extension.
fn attachment_format(attachment: &Attachment) -> Option<String> {
    let from_hint = attachment.mime_type_hint.as_deref().map(str::trim).and_then(|hint| {
        let subtype = hint.rsplit('/').next().unwrap_or(hint);
        match subtype.to_ascii_lowercase().as_str() {
            "jpeg" | "pjpeg" => Some("JPG".to_string()),
            "plain" => Some("TXT".to_string()),
            "x-zip-compressed" => Some("ZIP".to_string()),
            "" => None,
            other => Some(other.to_ascii_uppercase()),
        }
    });
    let from_name = || {
        let (_, ext) = attachment.file_name.trim().rsplit_once('.')?;
        Some(ext.to_ascii_uppercase())
    };

    from_hint
        .or_else(from_name)
        .filter(|f| {
            !f.is_empty() && f.len() <= MAX_FORMAT && f.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

/// Cut a file name to the field width, keeping its extension.
fn shorten_file_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.chars().count() < MAX_NAME - 1 => {
            let keep = MAX_NAME - 1 - ext.chars().count();
            format!("{}.{ext}", stem.chars().take(keep).collect::<String>())
        }
        _ => name.chars().take(MAX_NAME).collect(),
    }
}
