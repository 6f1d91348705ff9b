use std::fmt::Write;

use bonsplit_core::{Allocation, Money, SplitError};
use bonsplit_import::SplitSheet;
use bonsplit_ocr::ProductRecord;

/// Plain listing of every extracted record, before quantity filtering.
pub fn listing(records: &[ProductRecord]) -> String {
    let mut out = String::from("Extracted products:\n");
    for r in records {
        let tag = if r.is_discount() { " (discount)" } else { "" };
        let _ = writeln!(out, "  {}: {}{tag}", r.name, Money::from_decimal(r.price));
    }
    let total: Money = records.iter().map(|r| Money::from_decimal(r.price)).sum();
    let _ = writeln!(out, "\nTotal items: {}", records.len());
    let _ = writeln!(out, "Total amount: {total}");
    out
}

/// Bill-split table: product, amount, one weight column per person, a grand
/// total row and the per-person totals.
pub fn split_table(sheet: &SplitSheet, allocation: &Allocation, reconcile: bool) -> Result<String, SplitError> {
    let product_w = sheet
        .lines
        .iter()
        .map(|l| l.product.chars().count())
        .chain(["Product".len(), "TOTAL".len()])
        .max()
        .unwrap_or_default();
    let amount_w = sheet
        .lines
        .iter()
        .map(|l| Money::from_decimal(l.price).to_string().chars().count())
        .chain([Money::from_decimal(allocation.grand_total).to_string().chars().count(), "Amount".len()])
        .max()
        .unwrap_or_default();
    let person_w: Vec<usize> = sheet.people.iter().map(|p| p.chars().count().max(3)).collect();

    let mut out = String::new();
    let _ = write!(out, "{:<product_w$}  {:>amount_w$}", "Product", "Amount");
    for (name, w) in sheet.people.iter().zip(&person_w) {
        let _ = write!(out, "  {name:>w$}");
    }
    out.push('\n');

    for line in &sheet.lines {
        let amount = Money::from_decimal(line.price).to_string();
        let _ = write!(out, "{:<product_w$}  {amount:>amount_w$}", line.product);
        for (weight, w) in line.weights.iter().zip(&person_w) {
            let _ = write!(out, "  {weight:>w$}");
        }
        out.push('\n');
    }

    let grand = Money::from_decimal(allocation.grand_total).to_string();
    let _ = writeln!(out, "{:<product_w$}  {grand:>amount_w$}", "TOTAL");

    if allocation.excluded_lines > 0 {
        let _ = writeln!(out, "\n{} line(s) without shares were left out", allocation.excluded_lines);
    }

    let per_person: Vec<(String, Money)> = if reconcile {
        allocation.reconciled()?
    } else {
        allocation
            .totals()
            .iter()
            .map(|t| (t.name.clone(), Money::from_decimal(t.amount)))
            .collect()
    };
    let name_w = sheet.people.iter().map(|p| p.chars().count()).max().unwrap_or_default();
    out.push_str("\nPer person:\n");
    for (name, amount) in per_person {
        let _ = writeln!(out, "  {name:<name_w$}  {amount}");
    }
    Ok(out)
}
