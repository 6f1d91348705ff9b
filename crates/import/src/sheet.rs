//! The bill-split sheet: one row per item, one weight column per person.
//!
//! ```text
//! product,amount,Alice,Bob
//! AH BROOD,"2,39",1,1
//! KAAS,4.99,0,2
//! ```

use bonsplit_core::money::round_cents;
use bonsplit_core::{allocate, within_limit, Allocation, SplitError, SplitLine};
use rust_decimal::Decimal;
use std::io::{Read, Write};
use std::str::FromStr;
use thiserror::Error;

const PRODUCT_HEADER: &str = "product";
const AMOUNT_HEADER: &str = "amount";

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Person column {0} has no name")]
    UnnamedPerson(usize),
    #[error("Invalid amount on line {line}: '{value}'")]
    InvalidAmount { line: u64, value: String },
    #[error("Invalid weight for {person} on line {line}: '{value}'")]
    InvalidWeight { line: u64, person: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitSheet {
    pub people: Vec<String>,
    pub lines: Vec<SplitLine>,
}

impl SplitSheet {
    pub fn new(people: Vec<String>, lines: Vec<SplitLine>) -> Self {
        Self { people, lines }
    }

    /// A blank sheet for `items`: every weight starts at zero.
    pub fn from_items<I>(items: I, people: Vec<String>) -> Self
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let lines = items
            .into_iter()
            .map(|(product, price)| SplitLine::new(product, price, vec![0; people.len()]))
            .collect();
        Self { people, lines }
    }

    pub fn allocate(&self) -> Result<Allocation, SplitError> {
        allocate(&self.lines, &self.people)
    }

    pub fn read<R: Read>(data: R) -> Result<Self, SheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers = reader.headers()?.clone();
        for (idx, expected) in [PRODUCT_HEADER, AMOUNT_HEADER].into_iter().enumerate() {
            match headers.get(idx) {
                Some(h) if h.eq_ignore_ascii_case(expected) => {}
                _ => return Err(SheetError::MissingColumn(expected.to_string())),
            }
        }

        let mut people = Vec::new();
        for (idx, name) in headers.iter().enumerate().skip(2) {
            if name.is_empty() {
                return Err(SheetError::UnnamedPerson(idx));
            }
            people.push(name.to_string());
        }

        let mut lines = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line_no = record.position().map(|p| p.line()).unwrap_or_default();

            let product = record.get(0).unwrap_or_default().to_string();
            let amount_field = record.get(1).unwrap_or_default();
            let price = parse_amount(amount_field).ok_or_else(|| SheetError::InvalidAmount {
                line: line_no,
                value: amount_field.to_string(),
            })?;

            let mut weights = Vec::with_capacity(people.len());
            for (offset, person) in people.iter().enumerate() {
                let field = record.get(offset + 2).unwrap_or_default();
                let weight = if field.is_empty() {
                    0
                } else {
                    field.parse::<u32>().map_err(|_| SheetError::InvalidWeight {
                        line: line_no,
                        person: person.clone(),
                        value: field.to_string(),
                    })?
                };
                weights.push(weight);
            }

            lines.push(SplitLine::new(product, price, weights));
        }

        Ok(Self { people, lines })
    }

    pub fn write<W: Write>(&self, out: W) -> Result<(), SheetError> {
        let mut writer = csv::Writer::from_writer(out);

        let mut header = vec![PRODUCT_HEADER.to_string(), AMOUNT_HEADER.to_string()];
        header.extend(self.people.iter().cloned());
        writer.write_record(&header)?;

        for line in &self.lines {
            let mut row = vec![line.product.clone(), format!("{:.2}", round_cents(line.price))];
            row.extend(line.weights.iter().map(u32::to_string));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Accepts `2,39`, `2.39`, `€ 2,39` and `-0,50`, up to
/// [`bonsplit_core::MAX_AMOUNT`] in magnitude.
fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != '€' && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&cleaned).ok().filter(|a| within_limit(*a))
}
