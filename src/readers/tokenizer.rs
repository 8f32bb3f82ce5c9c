use crate::error::{ProcessingError, Result};
use crate::utils::constants::{FIELD_DELIMITER, LINE_TERMINATOR, STATION_HASH_SEED};

/// One tokenized `<name>;<temperature>\n` line.
///
/// Offsets are relative to the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Offset of the `;`; the station name is `line[..delimiter]`.
    pub delimiter: usize,
    /// Offset of the terminating `\n`.
    pub newline: usize,
    pub hash: u64,
    /// Temperature in tenths of a degree.
    pub temperature: i32,
}

/// djb2 hash of a station name (`hash * 33 + byte`, wrapping).
#[inline]
pub fn station_hash(name: &[u8]) -> u64 {
    name.iter().fold(STATION_HASH_SEED, |hash, &b| {
        hash.wrapping_mul(33).wrapping_add(b as u64)
    })
}

/// Tokenize the line starting at `line[0]`. Bytes after its newline are ignored.
///
/// Temperatures must be an optional `-`, at least one digit, a `.` and exactly
/// one fractional digit. Anything else is a [`ProcessingError::MalformedRecord`].
#[inline]
pub fn tokenize_line(line: &[u8]) -> Result<Token> {
    let mut hash = STATION_HASH_SEED;
    let mut pos = 0;

    loop {
        match line.get(pos) {
            Some(&FIELD_DELIMITER) => break,
            Some(&LINE_TERMINATOR) | None => {
                return Err(malformed("missing ';' delimiter", line));
            }
            Some(&b) => {
                hash = hash.wrapping_mul(33).wrapping_add(b as u64);
                pos += 1;
            }
        }
    }

    let delimiter = pos;
    let (temperature, newline) = parse_temperature(line, delimiter + 1)?;

    Ok(Token {
        delimiter,
        newline,
        hash,
        temperature,
    })
}

/// Parse the fixed-point temperature starting at `start`.
/// Returns it with the offset of the newline.
#[inline]
fn parse_temperature(line: &[u8], start: usize) -> Result<(i32, usize)> {
    let mut pos = start;
    let negative = line.get(pos) == Some(&b'-');
    if negative {
        pos += 1;
    }

    let mut value: i32 = 0;
    let int_start = pos;
    loop {
        match line.get(pos) {
            Some(&b) if b.is_ascii_digit() => {
                value = push_digit(value, b)
                    .ok_or_else(|| malformed("temperature out of range", line))?;
                pos += 1;
            }
            Some(&b'.') => break,
            Some(&LINE_TERMINATOR) | None => {
                return Err(malformed("temperature has no fractional part", line));
            }
            Some(_) => return Err(malformed("unexpected byte in temperature", line)),
        }
    }
    if pos == int_start {
        return Err(malformed("temperature has no integer digits", line));
    }
    pos += 1;

    match line.get(pos) {
        Some(&b) if b.is_ascii_digit() => {
            value = push_digit(value, b)
                .ok_or_else(|| malformed("temperature out of range", line))?;
            pos += 1;
        }
        _ => return Err(malformed("temperature needs one fractional digit", line)),
    }

    match line.get(pos) {
        Some(&LINE_TERMINATOR) => {}
        None => return Err(malformed("line is not newline-terminated", line)),
        Some(_) => return Err(malformed("temperature needs exactly one fractional digit", line)),
    }

    Ok((if negative { -value } else { value }, pos))
}

#[inline]
fn push_digit(value: i32, digit: u8) -> Option<i32> {
    value.checked_mul(10)?.checked_add((digit - b'0') as i32)
}

fn malformed(reason: &'static str, line: &[u8]) -> ProcessingError {
    let end = memchr::memchr(LINE_TERMINATOR, line).unwrap_or(line.len());
    ProcessingError::malformed(reason, &line[..end])
}
