//! Entity and character reference decoding.
//!
//! A static, data-driven table of the XML 1.0 built-ins plus numeric
//! reference decoding. The tokenizer decodes while accumulating text and
//! attribute values, exactly once; nothing downstream re-decodes.

/// The five predefined XML 1.0 entities.
const NAMED_ENTITIES: &[(&[u8], char)] = &[
    (b"lt", '<'),
    (b"gt", '>'),
    (b"amp", '&'),
    (b"apos", '\''),
    (b"quot", '"'),
];

/// Longest reference body accepted between `&` and `;`.
/// `#x10FFFF` and `#1114111` are both 8 bytes; named entities are shorter.
pub(crate) const MAX_REF_LEN: usize = 10;

/// Decode the reference body `body` (the part between `&` and `;`) and
/// append the replacement to `out`. With `decode_numeric` off, numeric
/// references are appended verbatim, untouched.
pub(crate) fn append_reference(
    body: &[u8],
    decode_numeric: bool,
    out: &mut Vec<u8>,
) -> Result<(), &'static str> {
    if body.is_empty() {
        return Err("empty entity reference");
    }

    if body[0] == b'#' {
        if !decode_numeric {
            out.push(b'&');
            out.extend_from_slice(body);
            out.push(b';');
            return Ok(());
        }
        let c = decode_numeric_reference(&body[1..])?;
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        return Ok(());
    }

    for &(name, c) in NAMED_ENTITIES {
        if name == body {
            let mut utf8 = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            return Ok(());
        }
    }
    // No DTD processing means no way to declare anything beyond the built-ins.
    Err("unknown entity reference")
}

/// Decode `NN` or `xHH` into a character, rejecting anything outside the
/// XML 1.0 Char production.
fn decode_numeric_reference(digits: &[u8]) -> Result<char, &'static str> {
    if digits.is_empty() {
        return Err("invalid character reference");
    }
    let codepoint = if digits[0] == b'x' || digits[0] == b'X' {
        let hex = std::str::from_utf8(&digits[1..]).map_err(|_| "invalid character reference")?;
        u32::from_str_radix(hex, 16).map_err(|_| "invalid character reference")?
    } else {
        let dec = std::str::from_utf8(digits).map_err(|_| "invalid character reference")?;
        dec.parse::<u32>().map_err(|_| "invalid character reference")?
    };
    if !is_valid_xml_char(codepoint) {
        return Err("character reference outside the XML character range");
    }
    char::from_u32(codepoint).ok_or("character reference outside the XML character range")
}

/// XML 1.0 Char production:
/// `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
#[inline]
fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}
