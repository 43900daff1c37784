// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt::Write;

/// Renders fixed-width ASCII device fields: non-ASCII bytes become `?`,
/// leading/trailing blanks and NUL padding are dropped.
pub fn trim_ascii(bytes: &[u8]) -> String {
    let s: String = bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();
    s.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Classic 16-bytes-per-line dump: offset, hex bytes, printable ASCII.
///
/// ```text
/// 0000  00 00 00 30 00 00 00 01  00 00 00 00 00 00 00 00  ...0............
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(16) * 76);
    for (line, chunk) in bytes.chunks(16).enumerate() {
        write!(&mut out, "{:04x} ", line * 16).expect("Writing to String cannot fail");
        for i in 0..16 {
            if i == 8 {
                out.push(' ');
            }
            match chunk.get(i) {
                Some(b) => {
                    write!(&mut out, " {b:02x}").expect("Writing to String cannot fail")
                },
                None => out.push_str("   "),
            }
        }
        out.push_str("  ");
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push('\n');
    }
    out
}
