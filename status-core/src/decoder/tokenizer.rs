//! Push-style JSON tokenizer.
//!
//! Bytes are handed over in whatever pieces the transport produced and
//! structural events are emitted as soon as they are complete. Any token
//! may be split across calls; partial strings, escapes, numbers and
//! literals are carried over to the next [`Tokenizer::parse`].
//!
//! Strings are not validated as UTF-8. Invalid sequences are replaced with
//! U+FFFD rather than rejected, since the status feed passes client-supplied
//! names through unescaped.

use crate::error::{DecodeError, Result};

/// One structural event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonEvent<'a> {
    StartMap,
    EndMap,
    StartArray,
    EndArray,
    Key(&'a str),
    String(&'a str),
    Integer(i64),
    Double(f64),
    Bool(bool),
    Null,
}

/// Receives events from a [`Tokenizer`]. An error stops tokenizing.
pub trait EventHandler {
    fn handle(&mut self, event: JsonEvent<'_>) -> Result<()>;
}

impl<F> EventHandler for F
where
    F: FnMut(JsonEvent<'_>) -> Result<()>,
{
    fn handle(&mut self, event: JsonEvent<'_>) -> Result<()> {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Map,
    Array,
}

/// What the grammar allows next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    ValueOrEnd,
    Key,
    KeyOrEnd,
    Colon,
    CommaOrEnd,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Backslash,
    Unicode { digits: u8, unit: u32 },
}

/// Token being accumulated across input boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partial {
    None,
    Str { key: bool, escape: Escape },
    Number,
    Literal { word: &'static [u8], matched: usize },
}

#[derive(Debug)]
pub struct Tokenizer {
    stack: Vec<Container>,
    expect: Expect,
    partial: Partial,
    buf: Vec<u8>,
    high_surrogate: Option<u32>,
    offset: u64,
    started: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            expect: Expect::Value,
            partial: Partial::None,
            buf: Vec::new(),
            high_surrogate: None,
            offset: 0,
            started: false,
        }
    }

    /// Whether any part of a document has been seen.
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Whether one whole top-level value has been tokenized.
    pub fn is_complete(&self) -> bool {
        self.expect == Expect::Done && self.partial == Partial::None
    }

    /// Bytes consumed since this tokenizer was created.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Tokenize as much of `input` as belongs to the current document.
    ///
    /// Returns the number of bytes consumed. That is all of `input` unless
    /// the top-level value closed part way through, in which case the
    /// remaining bytes belong to the next document.
    pub fn parse<H: EventHandler + ?Sized>(&mut self, input: &[u8], handler: &mut H) -> Result<usize> {
        let mut pos = 0;
        while pos < input.len() {
            if self.is_complete() {
                break;
            }
            let byte = input[pos];
            match self.partial {
                Partial::Str { key, escape } => {
                    self.string_byte(byte, key, escape, handler)?;
                }
                Partial::Number => {
                    if is_number_byte(byte) {
                        self.buf.push(byte);
                    } else {
                        // The terminator is structural; look at it again.
                        self.finish_number(handler)?;
                        continue;
                    }
                }
                Partial::Literal { word, matched } => {
                    if word.get(matched) != Some(&byte) {
                        return Err(self.syntax("invalid literal"));
                    }
                    if matched + 1 == word.len() {
                        self.finish_literal(word, handler)?;
                    } else {
                        self.partial = Partial::Literal {
                            word,
                            matched: matched + 1,
                        };
                    }
                }
                Partial::None => self.structural_byte(byte, handler)?,
            }
            pos += 1;
            self.offset += 1;
        }
        Ok(pos)
    }

    /// Signal end of input: flush a trailing number and check that the
    /// document is whole.
    pub fn complete<H: EventHandler + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        match self.partial {
            Partial::None => {}
            Partial::Number => self.finish_number(handler)?,
            _ => return Err(DecodeError::Incomplete),
        }
        if self.expect == Expect::Done {
            Ok(())
        } else {
            Err(DecodeError::Incomplete)
        }
    }

    fn structural_byte<H: EventHandler + ?Sized>(&mut self, byte: u8, handler: &mut H) -> Result<()> {
        match byte {
            b' ' | b'\t' | b'\n' | b'\r' => Ok(()),
            b'{' => {
                self.begin_value()?;
                handler.handle(JsonEvent::StartMap)?;
                self.stack.push(Container::Map);
                self.expect = Expect::KeyOrEnd;
                Ok(())
            }
            b'[' => {
                self.begin_value()?;
                handler.handle(JsonEvent::StartArray)?;
                self.stack.push(Container::Array);
                self.expect = Expect::ValueOrEnd;
                Ok(())
            }
            b'}' => {
                if !matches!(self.expect, Expect::KeyOrEnd | Expect::CommaOrEnd)
                    || self.stack.last() != Some(&Container::Map)
                {
                    return Err(self.syntax("unexpected '}'"));
                }
                self.stack.pop();
                handler.handle(JsonEvent::EndMap)?;
                self.value_done();
                Ok(())
            }
            b']' => {
                if !matches!(self.expect, Expect::ValueOrEnd | Expect::CommaOrEnd)
                    || self.stack.last() != Some(&Container::Array)
                {
                    return Err(self.syntax("unexpected ']'"));
                }
                self.stack.pop();
                handler.handle(JsonEvent::EndArray)?;
                self.value_done();
                Ok(())
            }
            b':' => {
                if self.expect != Expect::Colon {
                    return Err(self.syntax("unexpected ':'"));
                }
                self.expect = Expect::Value;
                Ok(())
            }
            b',' => {
                if self.expect != Expect::CommaOrEnd {
                    return Err(self.syntax("unexpected ','"));
                }
                self.expect = match self.stack.last() {
                    Some(Container::Map) => Expect::Key,
                    _ => Expect::Value,
                };
                Ok(())
            }
            b'"' => {
                let key = match self.expect {
                    Expect::Key | Expect::KeyOrEnd => true,
                    _ => {
                        self.begin_value()?;
                        false
                    }
                };
                self.buf.clear();
                self.partial = Partial::Str {
                    key,
                    escape: Escape::None,
                };
                Ok(())
            }
            b'-' | b'0'..=b'9' => {
                self.begin_value()?;
                self.buf.clear();
                self.buf.push(byte);
                self.partial = Partial::Number;
                Ok(())
            }
            b't' => self.begin_literal(b"true"),
            b'f' => self.begin_literal(b"false"),
            b'n' => self.begin_literal(b"null"),
            _ => Err(self.syntax("invalid character")),
        }
    }

    fn string_byte<H: EventHandler + ?Sized>(
        &mut self,
        byte: u8,
        key: bool,
        escape: Escape,
        handler: &mut H,
    ) -> Result<()> {
        let escape = match escape {
            Escape::None => match byte {
                b'"' => return self.finish_string(key, handler),
                b'\\' => Escape::Backslash,
                0x00..=0x1f => return Err(self.syntax("control character in string")),
                _ => {
                    self.flush_surrogate();
                    self.buf.push(byte);
                    Escape::None
                }
            },
            Escape::Backslash => {
                let unescaped = match byte {
                    b'"' => b'"',
                    b'\\' => b'\\',
                    b'/' => b'/',
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'u' => {
                        self.partial = Partial::Str {
                            key,
                            escape: Escape::Unicode { digits: 0, unit: 0 },
                        };
                        return Ok(());
                    }
                    _ => return Err(self.syntax("invalid escape")),
                };
                self.flush_surrogate();
                self.buf.push(unescaped);
                Escape::None
            }
            Escape::Unicode { digits, unit } => {
                let digit = match (byte as char).to_digit(16) {
                    Some(digit) => digit,
                    None => return Err(self.syntax("invalid unicode escape")),
                };
                let unit = (unit << 4) | digit;
                if digits == 3 {
                    self.push_code_unit(unit);
                    Escape::None
                } else {
                    Escape::Unicode {
                        digits: digits + 1,
                        unit,
                    }
                }
            }
        };
        self.partial = Partial::Str { key, escape };
        Ok(())
    }

    fn finish_string<H: EventHandler + ?Sized>(&mut self, key: bool, handler: &mut H) -> Result<()> {
        self.flush_surrogate();
        self.partial = Partial::None;
        {
            let text = String::from_utf8_lossy(&self.buf);
            if key {
                handler.handle(JsonEvent::Key(&text))?;
            } else {
                handler.handle(JsonEvent::String(&text))?;
            }
        }
        self.buf.clear();
        if key {
            self.expect = Expect::Colon;
        } else {
            self.value_done();
        }
        Ok(())
    }

    fn finish_number<H: EventHandler + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        self.partial = Partial::None;
        if !is_valid_number(&self.buf) {
            return Err(self.syntax("malformed number"));
        }
        // Only ASCII number bytes ever reach the buffer.
        let text = String::from_utf8_lossy(&self.buf);
        let event = if text.contains(|c| matches!(c, '.' | 'e' | 'E')) {
            match text.parse::<f64>() {
                Ok(value) => JsonEvent::Double(value),
                Err(_) => return Err(self.syntax("malformed number")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => JsonEvent::Integer(value),
                Err(_) => {
                    return Err(DecodeError::IntegerOverflow {
                        offset: self.offset,
                    })
                }
            }
        };
        handler.handle(event)?;
        self.buf.clear();
        self.value_done();
        Ok(())
    }

    fn finish_literal<H: EventHandler + ?Sized>(
        &mut self,
        word: &'static [u8],
        handler: &mut H,
    ) -> Result<()> {
        self.partial = Partial::None;
        let event = match word {
            b"true" => JsonEvent::Bool(true),
            b"false" => JsonEvent::Bool(false),
            _ => JsonEvent::Null,
        };
        handler.handle(event)?;
        self.value_done();
        Ok(())
    }

    fn begin_literal(&mut self, word: &'static [u8]) -> Result<()> {
        self.begin_value()?;
        self.partial = Partial::Literal { word, matched: 1 };
        Ok(())
    }

    fn begin_value(&mut self) -> Result<()> {
        if !matches!(self.expect, Expect::Value | Expect::ValueOrEnd) {
            return Err(self.syntax("unexpected value"));
        }
        self.started = true;
        Ok(())
    }

    fn value_done(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
    }

    fn push_code_unit(&mut self, unit: u32) {
        match unit {
            0xD800..=0xDBFF => {
                self.flush_surrogate();
                self.high_surrogate = Some(unit);
            }
            0xDC00..=0xDFFF => match self.high_surrogate.take() {
                Some(high) => {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                    self.push_char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                None => self.push_char(char::REPLACEMENT_CHARACTER),
            },
            _ => {
                self.flush_surrogate();
                self.push_char(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    /// A high surrogate with no low half following it.
    fn flush_surrogate(&mut self) {
        if self.high_surrogate.take().is_some() {
            self.push_char(char::REPLACEMENT_CHARACTER);
        }
    }

    fn push_char(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn syntax(&self, reason: &'static str) -> DecodeError {
        DecodeError::Syntax {
            offset: self.offset,
            reason,
        }
    }
}

fn is_number_byte(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_valid_number(bytes: &[u8]) -> bool {
    fn digits(bytes: &[u8], mut i: usize) -> usize {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    }

    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = digits(bytes, i + 1),
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        let end = digits(bytes, i + 1);
        if end == i + 1 {
            return false;
        }
        i = end;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let end = digits(bytes, i);
        if end == i {
            return false;
        }
        i = end;
    }
    i == bytes.len()
}
