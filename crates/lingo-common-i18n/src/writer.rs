//! `.ts` document writer.

use lingo_common_log::spans::catalog_span;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::path::Path;

use crate::catalog::{Message, TranslationCatalog};
use crate::error::I18nError;

type XmlResult = Result<(), quick_xml::Error>;

/// Serialize a catalog in the layout Qt Linguist writes.
///
/// Locations are written in absolute form. Characters XML 1.0 cannot carry
/// are emitted as `<byte value="xNN"/>`.
pub fn write_catalog(catalog: &TranslationCatalog) -> Result<String, I18nError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    write_document(&mut writer, catalog).map_err(|e| I18nError::Write(e.to_string()))?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| I18nError::Write(e.to_string()))
}

/// Serialize a catalog to a file.
pub fn save_catalog_file(catalog: &TranslationCatalog, path: impl AsRef<Path>) -> Result<(), I18nError> {
    let path = path.as_ref();
    let span = catalog_span("write", &path.display().to_string());
    let _guard = span.enter();

    let text = write_catalog(catalog)?;
    std::fs::write(path, text).map_err(|source| I18nError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(writer: &mut Writer<Vec<u8>>, catalog: &TranslationCatalog) -> XmlResult {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped("TS")))?;

    let mut root = BytesStart::new("TS");
    root.push_attribute(("version", catalog.version.as_str()));
    if let Some(language) = &catalog.target_language {
        root.push_attribute(("language", language.as_str()));
    }
    if let Some(language) = &catalog.source_language {
        root.push_attribute(("sourcelanguage", language.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    for context in &catalog.contexts {
        writer.write_event(Event::Start(BytesStart::new("context")))?;
        write_text_element(writer, "name", &context.name)?;
        for message in &context.messages {
            write_message(writer, message)?;
        }
        writer.write_event(Event::End(BytesEnd::new("context")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("TS")))
}

fn write_message(writer: &mut Writer<Vec<u8>>, message: &Message) -> XmlResult {
    let mut start = BytesStart::new("message");
    if let Some(id) = &message.id {
        start.push_attribute(("id", id.as_str()));
    }
    if message.numerus {
        start.push_attribute(("numerus", "yes"));
    }
    writer.write_event(Event::Start(start))?;

    for location in &message.locations {
        let mut el = BytesStart::new("location");
        el.push_attribute(("filename", location.file.as_str()));
        if let Some(line) = location.line {
            el.push_attribute(("line", line.to_string().as_str()));
        }
        writer.write_event(Event::Empty(el))?;
    }

    write_text_element(writer, "source", &message.source)?;
    if let Some(old) = &message.old_source {
        write_text_element(writer, "oldsource", old)?;
    }
    if !message.comment.is_empty() {
        write_text_element(writer, "comment", &message.comment)?;
    }
    if let Some(old) = &message.old_comment {
        write_text_element(writer, "oldcomment", old)?;
    }
    if let Some(extra) = &message.extra_comment {
        write_text_element(writer, "extracomment", extra)?;
    }
    if let Some(note) = &message.translator_comment {
        write_text_element(writer, "translatorcomment", note)?;
    }

    let mut translation = BytesStart::new("translation");
    if let Some(status) = message.status.attribute() {
        translation.push_attribute(("type", status));
    }
    if message.numerus && !message.numerus_forms.is_empty() {
        writer.write_event(Event::Start(translation))?;
        for form in &message.numerus_forms {
            write_text_element(writer, "numerusform", form)?;
        }
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    } else {
        writer.write_event(Event::Start(translation))?;
        write_text(writer, &message.translation)?;
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("message")))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> XmlResult {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    write_text(writer, text)?;
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

/// Write text content, always emitting at least one text event so the
/// closing tag stays on the same line as the opening one.
fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> XmlResult {
    let mut rest = text;
    while let Some(pos) = rest.find(needs_byte_escape) {
        let (plain, tail) = rest.split_at(pos);
        writer.write_event(Event::Text(BytesText::new(plain)))?;
        let mut chars = tail.chars();
        if let Some(c) = chars.next() {
            let mut byte = BytesStart::new("byte");
            byte.push_attribute(("value", format!("x{:x}", u32::from(c)).as_str()));
            writer.write_event(Event::Empty(byte))?;
        }
        rest = chars.as_str();
    }
    writer.write_event(Event::Text(BytesText::new(rest)))
}

/// Characters outside the XML 1.0 `Char` production.
fn needs_byte_escape(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}
