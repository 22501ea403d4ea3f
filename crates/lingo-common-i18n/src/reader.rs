//! `.ts` document reader.
//!
//! The reader walks `quick-xml` events with one method per element of the
//! Qt Linguist format. Unknown elements are skipped wholesale; structural
//! problems come back as a [`FormatError`] pointing at the offending event.

use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::catalog::{Context, Location, Message, TranslationCatalog, TranslationStatus};
use crate::error::{FormatError, FormatErrorKind, I18nError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a `.ts` document from raw bytes.
///
/// The input must be UTF-8. Nothing outside the returned value is touched,
/// so a failed parse leaves callers with whatever they had before.
pub fn parse_catalog(input: &[u8]) -> Result<TranslationCatalog, FormatError> {
    let body = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    let text = std::str::from_utf8(body)
        .map_err(|e| FormatError::at(body, e.valid_up_to(), FormatErrorKind::InvalidEncoding))?;
    TsReader::new(text).document()
}

/// Read and parse a `.ts` file.
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<TranslationCatalog, I18nError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| I18nError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&data).map_err(|source| I18nError::Format {
        path: Some(path.to_path_buf()),
        source,
    })
}

/// Body of a `<translation>` element.
struct TranslationBody {
    status: TranslationStatus,
    text: String,
    forms: Vec<String>,
}

struct TsReader<'a> {
    input: &'a [u8],
    reader: Reader<&'a [u8]>,
    /// Byte offset where the last event began.
    event_start: usize,
    /// File named by the most recent `<location filename=...>`.
    current_file: Option<String>,
    /// Last line seen per file, the base for `line="+N"` markers.
    current_line: HashMap<String, i64>,
}

impl<'a> TsReader<'a> {
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.trim_text(false);
        Self {
            input: text.as_bytes(),
            reader,
            event_start: 0,
            current_file: None,
            current_line: HashMap::new(),
        }
    }

    fn error(&self, kind: FormatErrorKind) -> FormatError {
        FormatError::at(self.input, self.event_start, kind)
    }

    fn malformed(&self, err: impl fmt::Display) -> FormatError {
        self.error(FormatErrorKind::Malformed(err.to_string()))
    }

    fn next(&mut self) -> Result<Event<'a>, FormatError> {
        self.event_start = self.reader.buffer_position();
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(err) => Err(FormatError::at(
                self.input,
                self.reader.buffer_position(),
                FormatErrorKind::Malformed(err.to_string()),
            )),
        }
    }

    /// Skip the rest of an element we do not model.
    fn skip(&mut self, start: &BytesStart<'_>) -> Result<(), FormatError> {
        let name = tag_name(start);
        match self.reader.read_to_end(start.name()) {
            Ok(_) => Ok(()),
            Err(quick_xml::Error::UnexpectedEof(_)) => Err(FormatError::at(
                self.input,
                self.input.len(),
                FormatErrorKind::UnexpectedEof(name),
            )),
            Err(err) => Err(FormatError::at(
                self.input,
                self.reader.buffer_position(),
                FormatErrorKind::Malformed(err.to_string()),
            )),
        }
    }

    fn attribute(&self, start: &BytesStart<'_>, name: &str) -> Result<Option<String>, FormatError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.malformed(e))?;
            if attr.key.as_ref() == name.as_bytes() {
                let value = attr.unescape_value().map_err(|e| self.malformed(e))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn unescape(&self, text: &BytesText<'_>) -> Result<String, FormatError> {
        text.unescape()
            .map(|s| s.into_owned())
            .map_err(|e| self.malformed(e))
    }

    fn check_declaration(&self, decl: &BytesDecl<'_>) -> Result<(), FormatError> {
        if let Some(encoding) = decl.encoding() {
            let encoding = encoding.map_err(|e| self.malformed(e))?;
            let name = String::from_utf8_lossy(&encoding).to_ascii_lowercase();
            if name != "utf-8" && name != "utf8" {
                return Err(self.error(FormatErrorKind::UnsupportedEncoding(name)));
            }
        }
        Ok(())
    }

    fn document(mut self) -> Result<TranslationCatalog, FormatError> {
        loop {
            match self.next()? {
                Event::Decl(decl) => self.check_declaration(&decl)?,
                Event::Start(start) if start.name().as_ref() == b"TS" => {
                    let mut catalog = self.root_attributes(&start)?;
                    self.contexts(&mut catalog)?;
                    self.trailer()?;
                    return Ok(catalog);
                }
                Event::Empty(start) if start.name().as_ref() == b"TS" => {
                    let catalog = self.root_attributes(&start)?;
                    self.trailer()?;
                    return Ok(catalog);
                }
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.error(FormatErrorKind::UnexpectedElement {
                        found: tag_name(&start),
                        inside: "document".into(),
                    }));
                }
                Event::Text(text) if is_blank(&text) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.malformed("text outside the root element"));
                }
                Event::End(end) => {
                    return Err(self.malformed(format!(
                        "unmatched </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    )));
                }
                Event::Eof => {
                    return Err(self.error(FormatErrorKind::MissingElement {
                        parent: "document".into(),
                        child: "TS".into(),
                    }));
                }
                Event::Comment(_) | Event::DocType(_) | Event::PI(_) => {}
            }
        }
    }

    /// Only comments and whitespace may follow the root element.
    fn trailer(&mut self) -> Result<(), FormatError> {
        loop {
            match self.next()? {
                Event::Eof => return Ok(()),
                Event::Text(text) if is_blank(&text) => {}
                Event::Comment(_) | Event::PI(_) => {}
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.error(FormatErrorKind::UnexpectedElement {
                        found: tag_name(&start),
                        inside: "document".into(),
                    }));
                }
                _ => return Err(self.malformed("content after the root element")),
            }
        }
    }

    fn root_attributes(&self, start: &BytesStart<'_>) -> Result<TranslationCatalog, FormatError> {
        let version = self.attribute(start, "version")?;
        if let Some(version) = &version {
            if !is_supported_version(version) {
                return Err(self.error(FormatErrorKind::UnsupportedVersion(version.clone())));
            }
        }
        Ok(TranslationCatalog {
            version: version.unwrap_or_else(|| crate::catalog::DEFAULT_VERSION.to_string()),
            target_language: self.attribute(start, "language")?.filter(|s| !s.is_empty()),
            source_language: self.attribute(start, "sourcelanguage")?.filter(|s| !s.is_empty()),
            contexts: Vec::new(),
        })
    }

    fn contexts(&mut self, catalog: &mut TranslationCatalog) -> Result<(), FormatError> {
        loop {
            match self.next()? {
                Event::Start(start) if start.name().as_ref() == b"context" => {
                    let context = self.context()?;
                    catalog.contexts.push(context);
                }
                Event::Empty(start) if start.name().as_ref() == b"context" => {
                    return Err(self.error(FormatErrorKind::MissingElement {
                        parent: "context".into(),
                        child: "name".into(),
                    }));
                }
                Event::Start(start) => self.skip(&start)?,
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(self.error(FormatErrorKind::UnexpectedEof("TS".into()))),
                _ => {}
            }
        }
    }

    fn context(&mut self) -> Result<Context, FormatError> {
        let opened_at = self.event_start;
        let mut name: Option<String> = None;
        let mut messages = Vec::new();

        loop {
            match self.next()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"name" => {
                        let text = self.text("name")?;
                        self.set_once(&mut name, text, "context", "name")?;
                    }
                    b"message" => messages.push(self.message(&start)?),
                    _ => self.skip(&start)?,
                },
                Event::Empty(start) => match start.name().as_ref() {
                    b"name" => self.set_once(&mut name, String::new(), "context", "name")?,
                    b"message" => {
                        return Err(self.error(FormatErrorKind::MissingElement {
                            parent: "message".into(),
                            child: "source".into(),
                        }));
                    }
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(self.error(FormatErrorKind::UnexpectedEof("context".into())));
                }
                _ => {}
            }
        }

        let name = name.ok_or_else(|| {
            FormatError::at(
                self.input,
                opened_at,
                FormatErrorKind::MissingElement {
                    parent: "context".into(),
                    child: "name".into(),
                },
            )
        })?;
        Ok(Context { name, messages })
    }

    fn message(&mut self, start: &BytesStart<'_>) -> Result<Message, FormatError> {
        let opened_at = self.event_start;
        let mut message = Message {
            id: self.attribute(start, "id")?,
            numerus: self.attribute(start, "numerus")?.as_deref() == Some("yes"),
            ..Message::default()
        };
        let mut source: Option<String> = None;
        let mut comment: Option<String> = None;
        let mut translation: Option<TranslationBody> = None;

        loop {
            match self.next()? {
                Event::Start(child) => match child.name().as_ref() {
                    b"source" => {
                        let text = self.text("source")?;
                        self.set_once(&mut source, text, "message", "source")?;
                    }
                    b"comment" => {
                        let text = self.text("comment")?;
                        self.set_once(&mut comment, text, "message", "comment")?;
                    }
                    b"oldsource" => message.old_source = Some(self.text("oldsource")?),
                    b"oldcomment" => message.old_comment = Some(self.text("oldcomment")?),
                    b"extracomment" => message.extra_comment = Some(self.text("extracomment")?),
                    b"translatorcomment" => {
                        message.translator_comment = Some(self.text("translatorcomment")?)
                    }
                    b"translation" => {
                        let status = self.status(&child)?;
                        let (text, forms) = self.rich_text("translation", true)?;
                        let body = TranslationBody { status, text, forms };
                        self.set_once(&mut translation, body, "message", "translation")?;
                    }
                    b"location" => {
                        message.locations.extend(self.location(&child)?);
                        self.skip(&child)?;
                    }
                    _ => self.skip(&child)?,
                },
                Event::Empty(child) => match child.name().as_ref() {
                    b"source" => self.set_once(&mut source, String::new(), "message", "source")?,
                    b"comment" => {
                        self.set_once(&mut comment, String::new(), "message", "comment")?
                    }
                    b"translation" => {
                        let body = TranslationBody {
                            status: self.status(&child)?,
                            text: String::new(),
                            forms: Vec::new(),
                        };
                        self.set_once(&mut translation, body, "message", "translation")?;
                    }
                    b"location" => message.locations.extend(self.location(&child)?),
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(self.error(FormatErrorKind::UnexpectedEof("message".into())));
                }
                _ => {}
            }
        }

        message.source = source.ok_or_else(|| {
            FormatError::at(
                self.input,
                opened_at,
                FormatErrorKind::MissingElement {
                    parent: "message".into(),
                    child: "source".into(),
                },
            )
        })?;
        message.comment = comment.unwrap_or_default();
        if let Some(body) = translation {
            message.status = body.status;
            message.translation = body.text;
            message.numerus_forms = body.forms;
        } else {
            // lupdate always writes <translation>; without one nothing is translated
            message.status = TranslationStatus::Unfinished;
        }
        Ok(message)
    }

    fn status(&self, start: &BytesStart<'_>) -> Result<TranslationStatus, FormatError> {
        let value = self.attribute(start, "type")?.unwrap_or_default();
        TranslationStatus::parse(&value).ok_or_else(|| {
            self.error(FormatErrorKind::InvalidAttribute {
                name: "type".into(),
                value,
            })
        })
    }

    /// Resolve a `<location>` marker, following Qt's relative form.
    fn location(&mut self, start: &BytesStart<'_>) -> Result<Option<Location>, FormatError> {
        let file = match self.attribute(start, "filename")?.filter(|f| !f.is_empty()) {
            Some(file) => {
                self.current_file = Some(file.clone());
                file
            }
            None => match &self.current_file {
                Some(file) => file.clone(),
                None => return Ok(None),
            },
        };

        let Some(raw) = self.attribute(start, "line")?.filter(|l| !l.is_empty()) else {
            return Ok(Some(Location::new(file, None)));
        };
        let invalid = || {
            self.error(FormatErrorKind::InvalidAttribute {
                name: "line".into(),
                value: raw.clone(),
            })
        };
        let relative = raw.starts_with('+') || raw.starts_with('-');
        let delta: i64 = raw.parse().map_err(|_| invalid())?;
        let base = if relative {
            self.current_line.get(&file).copied().unwrap_or(0)
        } else {
            0
        };
        let line = base
            .checked_add(delta)
            .and_then(|l| u32::try_from(l).ok())
            .ok_or_else(invalid)?;
        self.current_line.insert(file.clone(), i64::from(line));
        Ok(Some(Location::new(file, Some(line))))
    }

    /// Text content of a leaf element.
    fn text(&mut self, tag: &str) -> Result<String, FormatError> {
        self.rich_text(tag, false).map(|(text, _)| text)
    }

    /// Text content with `<byte>` escapes, length variants and, inside
    /// `<translation>`, plural forms.
    fn rich_text(
        &mut self,
        tag: &str,
        allow_numerus: bool,
    ) -> Result<(String, Vec<String>), FormatError> {
        let mut text = String::new();
        let mut forms = Vec::new();
        let mut variant: Option<String> = None;

        loop {
            match self.next()? {
                Event::Text(chunk) => text.push_str(&self.unescape(&chunk)?),
                Event::CData(chunk) => text.push_str(&String::from_utf8_lossy(&chunk)),
                Event::Empty(child) => match child.name().as_ref() {
                    b"byte" => text.push(self.byte(&child)?),
                    b"numerusform" if allow_numerus => forms.push(String::new()),
                    b"lengthvariant" if variant.is_none() => variant = Some(String::new()),
                    b"lengthvariant" => {}
                    _ => return Err(self.unexpected(&child, tag)),
                },
                Event::Start(child) => match child.name().as_ref() {
                    b"numerusform" if allow_numerus => {
                        forms.push(self.rich_text("numerusform", false)?.0);
                    }
                    b"lengthvariant" => {
                        let value = self.rich_text("lengthvariant", false)?.0;
                        if variant.is_none() {
                            variant = Some(value);
                        }
                    }
                    _ => return Err(self.unexpected(&child, tag)),
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.error(FormatErrorKind::UnexpectedEof(tag.into()))),
                _ => {}
            }
        }

        // structured children make the surrounding text indentation only
        if !forms.is_empty() {
            text.clear();
        } else if let Some(first) = variant {
            text = first;
        }
        Ok((text, forms))
    }

    /// Decode `<byte value="x1b"/>`.
    fn byte(&self, start: &BytesStart<'_>) -> Result<char, FormatError> {
        let raw = self.attribute(start, "value")?.unwrap_or_default();
        let (radix, digits) = if let Some(hex) = raw.strip_prefix("0x") {
            (16, hex)
        } else if let Some(hex) = raw.strip_prefix('x') {
            (16, hex)
        } else {
            (10, raw.as_str())
        };
        u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.bad_byte(&raw))
    }

    fn bad_byte(&self, raw: &str) -> FormatError {
        self.error(FormatErrorKind::InvalidAttribute {
            name: "value".into(),
            value: raw.to_string(),
        })
    }

    fn unexpected(&self, child: &BytesStart<'_>, inside: &str) -> FormatError {
        self.error(FormatErrorKind::UnexpectedElement {
            found: tag_name(child),
            inside: format!("<{inside}>"),
        })
    }

    fn set_once<T>(
        &self,
        slot: &mut Option<T>,
        value: T,
        parent: &str,
        child: &str,
    ) -> Result<(), FormatError> {
        if slot.is_some() {
            return Err(self.error(FormatErrorKind::DuplicateElement {
                parent: parent.into(),
                child: child.into(),
            }));
        }
        *slot = Some(value);
        Ok(())
    }
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

/// Versions 1.x and 2.x share the element vocabulary we read.
fn is_supported_version(version: &str) -> bool {
    let mut parts = version.split('.');
    let major = parts.next().unwrap_or_default();
    matches!(major, "1" | "2") && parts.all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
