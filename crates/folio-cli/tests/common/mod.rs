use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const STATEMENT: &str = "\
Your account number: 01234-5678901
From December 10, 2025 to January 9, 2026
Your opening balance on December 10, 2025 $1,000.00
Total deposits into your account + 1,500.00
Total withdrawals from your account - 20.00
Your closing balance on January 9, 2026 = $2,480.00
Details of your account activity
Date Description Withdrawals ($) Deposits ($) Balance ($)
12 Dec Payroll deposit ACME CORP 1,500.00 2,500.00
3 Jan Visa Debit purchase - 5432
UBER CANADA TORONTO 20.00 2,480.00
Closing Balance 2,480.00
";

pub const FEBRUARY: &str = "\
Your account number: 01234-5678901
From February 1, 2026 to February 28, 2026
Details of your account activity
5 Feb Payroll deposit ACME CORP 1,500.00 3,980.00
Closing Balance 3,980.00
";

pub const NOT_A_STATEMENT: &str = "\
Dear customer,
Thank you for banking with us.
";

/// Write a single-page PDF printing one text object per line, top to bottom.
pub fn write_text_pdf(path: &Path, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let y = 760.0 - index as f32 * 14.0;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 9.into()]));
        operations.push(Operation::new("Td", vec![40.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}
