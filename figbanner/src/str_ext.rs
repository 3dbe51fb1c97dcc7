use bstr::ByteSlice as _;

pub(crate) trait SubChars {
    /// Splits into the units that each take one output column: whole UTF-8 sequences when `utf8`
    /// is set, single bytes otherwise.
    fn sub_chars(&self, utf8: bool) -> Vec<&[u8]>;
}

impl SubChars for [u8] {
    fn sub_chars(&self, utf8: bool) -> Vec<&[u8]> {
        if utf8 {
            self.char_indices()
                .map(|(start, end, _)| &self[start..end])
                .collect()
        } else {
            self.chunks(1).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SubChars as _;

    #[test]
    fn splits_by_column() {
        let row = "a█b".as_bytes();
        assert_eq!(row.sub_chars(true), ["a".as_bytes(), "█".as_bytes(), "b".as_bytes()]);
        assert_eq!(row.sub_chars(false).len(), 5);
        assert!(b"".sub_chars(true).is_empty());
    }

    #[test]
    fn latin1_bytes() {
        let row = b"\xe9t\xe9";
        assert_eq!(row.sub_chars(false), [b"\xe9".as_slice(), b"t".as_slice(), b"\xe9".as_slice()]);
    }
}
