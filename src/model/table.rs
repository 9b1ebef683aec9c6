//! CSV tokenizer for published spreadsheet exports.
//!
//! Turns raw CSV text into a `Table`: a header row plus data rows whose cells are paired
//! positionally with the headers. Quoted fields may contain commas; quoted fields spanning
//! multiple physical lines are not supported (the published export does not produce them).

/// A tokenized sheet: the header names and the data rows beneath them.
///
/// Every row is padded with empty strings to the header count, and rows whose cells are all
/// empty after trimming are dropped during parsing. Row order equals input line order.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Tokenizes CSV text. Parsing is total: malformed input yields an empty `Table`,
    /// never an error.
    pub fn parse(text: &str) -> Self {
        let mut lines = text.trim().lines();
        let header_line = match lines.next() {
            Some(line) => line,
            None => return Table::default(),
        };

        // The header line is split naively; header cells are not expected to contain commas.
        let headers: Vec<String> = header_line
            .split(',')
            .map(|h| h.trim().replace('"', ""))
            .collect();

        let mut rows = Vec::new();
        for line in lines {
            let values = split_line(line);
            let mut row: Vec<String> = Vec::with_capacity(headers.len());
            for ix in 0..headers.len() {
                row.push(values.get(ix).cloned().unwrap_or_default());
            }
            // A row with nothing in it is a blank spreadsheet line, not data.
            if row.iter().any(|v| !v.trim().is_empty()) {
                rows.push(row);
            }
        }

        Self { headers, rows }
    }

    /// True when the input had no usable data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Splits one data line into cell values.
///
/// A double quote toggles quoted mode, a comma separates fields only outside of quotes, and
/// each extracted value is trimmed. Quote characters themselves never reach the output.
fn split_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    values.push(current.trim().to_string());
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let table = Table::parse("Name,Amount\nAlice,100\nBob,200\n");
        assert_eq!(table.headers(), &["Name", "Amount"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec!["Alice", "100"]);
        assert_eq!(table.rows()[1], vec!["Bob", "200"]);
    }

    #[test]
    fn test_parse_quoted_comma() {
        let table = Table::parse("Name,Address\nAlice,\"12 Main St, Colombo\"\n");
        assert_eq!(table.rows()[0][1], "12 Main St, Colombo");
    }

    #[test]
    fn test_parse_header_only() {
        let table = Table::parse("Name,Amount\n");
        assert!(table.is_empty());
        assert_eq!(table.headers(), &["Name", "Amount"]);
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(Table::parse("").is_empty());
        assert!(Table::parse("   \n  ").is_empty());
    }

    #[test]
    fn test_parse_blank_rows_dropped() {
        let table = Table::parse("Name,Amount\nAlice,100\n,\n  ,  \nBob,200\n");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_short_row_padded() {
        let table = Table::parse("Name,Amount,Receipt\nAlice,100\n");
        assert_eq!(table.rows()[0], vec!["Alice", "100", ""]);
    }

    #[test]
    fn test_parse_long_row_truncated() {
        let table = Table::parse("Name,Amount\nAlice,100,extra,fields\n");
        assert_eq!(table.rows()[0], vec!["Alice", "100"]);
    }

    #[test]
    fn test_parse_quoted_headers() {
        let table = Table::parse("\"Donor Name\", \"Amount (LKR)\"\nAlice,100\n");
        assert_eq!(table.headers(), &["Donor Name", "Amount (LKR)"]);
    }

    #[test]
    fn test_parse_crlf() {
        let table = Table::parse("Name,Amount\r\nAlice,100\r\n");
        assert_eq!(table.rows()[0], vec!["Alice", "100"]);
    }

    #[test]
    fn test_row_count_equals_non_blank_lines() {
        let csv = "A,B\n1,2\n3,4\n,\n5,6\n";
        assert_eq!(Table::parse(csv).len(), 3);
    }
}
