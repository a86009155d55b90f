use std::borrow::Cow;
use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;

use crate::core::{FatturaError, format_amount};

fn xml_io(e: std::io::Error) -> FatturaError {
    FatturaError::Serialization(format!("XML write error: {e}"))
}

/// Thin wrapper over the quick-xml writer that reports [`FatturaError`].
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// Start a UTF-8 document. `indent` of 0 writes everything on one line.
    pub fn new(indent: usize) -> Result<Self, FatturaError> {
        let sink = Cursor::new(Vec::new());
        let mut writer = if indent == 0 {
            Writer::new(sink)
        } else {
            Writer::new_with_indent(sink, b' ', indent)
        };
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, FatturaError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, FatturaError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, FatturaError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    /// Write `<name>text</name>`, escaping the text. Empty text gives `<name/>`.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, FatturaError> {
        let text = xml_chars(text);
        if text.is_empty() {
            self.writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(xml_io)?;
            return Ok(self);
        }
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write the element only when a value is present.
    pub fn optional_element(
        &mut self,
        name: &str,
        text: Option<&str>,
    ) -> Result<&mut Self, FatturaError> {
        match text {
            Some(t) => self.text_element(name, t),
            None => Ok(self),
        }
    }

    /// Write an amount, quantity or rate with exactly two decimals.
    pub fn amount_element(&mut self, name: &str, amount: Decimal) -> Result<&mut Self, FatturaError> {
        let text = format_amount(amount)?;
        self.text_element(name, &text)
    }
}

/// Keep only characters of the XML 1.0 `Char` production.
fn xml_chars(text: &str) -> Cow<'_, str> {
    let allowed = |c: char| {
        matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
    };
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| allowed(c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn render(f: impl FnOnce(&mut XmlWriter) -> Result<(), FatturaError>) -> String {
        let mut w = XmlWriter::new(0).unwrap();
        f(&mut w).unwrap();
        String::from_utf8(w.into_bytes()).unwrap()
    }

    #[test]
    fn escapes_text() {
        let xml = render(|w| {
            w.text_element("Descrizione", r#"Rossi & Figli <"srl">"#)?;
            Ok(())
        });
        assert!(xml.contains("Rossi &amp; Figli &lt;&quot;srl&quot;&gt;"), "{xml}");
    }

    #[test]
    fn empty_text_is_empty_element() {
        let xml = render(|w| {
            w.text_element("Indirizzo", "")?;
            w.optional_element("Provincia", None)?;
            Ok(())
        });
        assert!(xml.ends_with("<Indirizzo/>"), "{xml}");
        assert!(!xml.contains("Provincia"));
    }

    #[test]
    fn amounts_have_two_decimals() {
        let xml = render(|w| {
            w.amount_element("Imposta", dec!(22))?;
            Ok(())
        });
        assert!(xml.ends_with("<Imposta>22.00</Imposta>"), "{xml}");
    }

    #[test]
    fn control_characters_dropped() {
        assert_eq!(xml_chars("a\u{1}b\tc"), "ab\tc");
        assert!(matches!(xml_chars("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn filters_on_xml_char_range() {
        // C1 controls are legal XML, the two noncharacters are not
        assert_eq!(xml_chars("a\u{85}b\u{9F}"), "a\u{85}b\u{9F}");
        assert_eq!(xml_chars("a\u{FFFE}b\u{FFFF}c"), "abc");
        assert_eq!(xml_chars("\u{1F600}\u{E000}"), "\u{1F600}\u{E000}");
    }
}
