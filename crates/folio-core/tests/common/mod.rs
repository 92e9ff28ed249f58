use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// A printed row: cells as (x, text).
pub type Row<'a> = Vec<(f32, &'a str)>;

pub const TOP: f32 = 760.0;
pub const ROW_HEIGHT: f32 = 14.0;

/// Write a PDF whose pages print the given rows top to bottom, each cell as
/// its own text object at its x position.
pub fn write_statement_pdf(path: &Path, pages: &[Vec<Row>]) -> Result<(), Box<dyn std::error::Error>> {
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

    let mut page_ids = Vec::new();

    for rows in pages {
        let mut operations = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let y = TOP - index as f32 * ROW_HEIGHT;
            for (x, text) in row {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 9.into()]));
                operations.push(Operation::new("Td", vec![(*x).into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
                operations.push(Operation::new("ET", vec![]));
            }
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
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

/// Rows of a two-page statement with a Withdrawals | Deposits | Balance table.
pub fn sample_statement() -> Vec<Vec<Row<'static>>> {
    let header = vec![
        (40.0, "Date"),
        (90.0, "Description"),
        (300.0, "Withdrawals ($)"),
        (380.0, "Deposits ($)"),
        (460.0, "Balance ($)"),
    ];
    vec![
        vec![
            vec![(40.0, "Your account number: 01234-5678901")],
            vec![(40.0, "From December 10, 2025 to January 9, 2026")],
            vec![(40.0, "Your opening balance on December 10, 2025 $1,000.00")],
            vec![(40.0, "Details of your account activity")],
            header.clone(),
            vec![(40.0, "28 Dec"), (90.0, "Payroll deposit ACME"), (390.0, "1,500.00"), (470.0, "2,500.00")],
            vec![(90.0, "Misc payment AMZN MKTP"), (390.0, "25.00"), (470.0, "2,525.00")],
            vec![(250.0, "1 of 2")],
        ],
        vec![
            header,
            vec![(40.0, "3 Jan"), (90.0, "Visa Debit purchase"), (310.0, "5.00"), (470.0, "2,520.00")],
            vec![(90.0, "UBER CANADA")],
            vec![(40.0, "Closing Balance"), (470.0, "2,520.00")],
        ],
    ]
}
