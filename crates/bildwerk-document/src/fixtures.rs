// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal container files for tests.

use std::path::Path;

/// Length of the MOBI header, `MOBI` identifier and length field included.
const MOBI_HEADER_LEN: usize = 232;
/// PalmDB header up to and including the record count.
const PDB_HEADER_LEN: usize = 78;

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

/// A PalmDB MOBI book with no text: record 0 holds the PalmDOC and MOBI
/// headers plus the title, every later record is one entry of `resources`.
/// The first resource record is the book's first image record.
pub fn mobi_book(resources: &[&[u8]]) -> Vec<u8> {
    let title = b"Fixture";

    // PalmDOC header, uncompressed, zero text records.
    let mut header_record = vec![0u8; 16];
    header_record[..2].copy_from_slice(&1u16.to_be_bytes());

    let mut mobi = vec![0u8; MOBI_HEADER_LEN];
    mobi[..4].copy_from_slice(b"MOBI");
    put_u32(&mut mobi, 4, MOBI_HEADER_LEN as u32);
    put_u32(&mut mobi, 8, 2); // mobi type: book
    put_u32(&mut mobi, 12, 65001); // UTF-8
    let name_offset = (header_record.len() + MOBI_HEADER_LEN) as u32;
    put_u32(&mut mobi, 68, name_offset);
    put_u32(&mut mobi, 72, title.len() as u32);
    put_u32(&mut mobi, 92, 1); // first image record
    header_record.extend_from_slice(&mobi);
    header_record.extend_from_slice(title);

    let mut records: Vec<&[u8]> = vec![header_record.as_slice()];
    records.extend_from_slice(resources);

    let mut book = vec![0u8; PDB_HEADER_LEN];
    book[..title.len()].copy_from_slice(title);
    book[60..64].copy_from_slice(b"BOOK");
    book[64..68].copy_from_slice(b"MOBI");
    book[76..78].copy_from_slice(&(records.len() as u16).to_be_bytes());

    let mut offset = PDB_HEADER_LEN + 8 * records.len() + 2;
    for (id, record) in records.iter().enumerate() {
        book.extend_from_slice(&(offset as u32).to_be_bytes());
        book.extend_from_slice(&(id as u32 * 2).to_be_bytes());
        offset += record.len();
    }
    book.extend_from_slice(&[0, 0]);

    for record in records {
        book.extend_from_slice(record);
    }
    book
}

/// Write [`mobi_book`] to `path`.
pub fn write_mobi(path: &Path, resources: &[&[u8]]) -> std::io::Result<()> {
    std::fs::write(path, mobi_book(resources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobi::Mobi;

    #[test]
    fn book_parses_with_resource_records() {
        let book = Mobi::new(mobi_book(&[b"\xff\xd8\xff\xe0rest", b"second"])).unwrap();
        assert_eq!(book.title(), "Fixture");

        let contents: Vec<&[u8]> = book.image_records().iter().map(|record| record.content).collect();
        assert_eq!(contents, vec![&b"\xff\xd8\xff\xe0rest"[..], &b"second"[..]]);
    }
}
