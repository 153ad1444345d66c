use miette::Result;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use invoice_export::{ContactResolver, Exporter, PaginationEngine};


/// Full-pipeline run over two pages where page 2 repeats page 1's ids. The
/// engine stops after page 2, keeps only page 1's non-deleted invoices, and
/// the export holds exactly two line-item rows plus one placeholder row.
#[tokio::test]
async fn two_page_run_with_repeated_page() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;

    let page = json!({ "results": [
        {
            "id": "inv-1",
            "invoice_number": "INV-001",
            "invoice_date": "2024-03-01",
            "status": "paid",
            "contact": "c-1",
            "line_items": [
                { "description": "Widget", "quantity": 3, "line_amount": 30 },
                { "description": "Gadget", "quantity": 1, "line_amount": 12.5 }
            ]
        },
        {
            "id": "inv-2",
            "invoice_number": "INV-002",
            "invoice_date": "2024-03-02",
            "status": "draft"
        },
        {
            "id": "inv-3",
            "invoice_number": "INV-003",
            "invoice_date": "2024-03-03",
            "status": "Deleted",
            "line_items": [
                { "description": "Ghost", "quantity": 1, "line_amount": 99 }
            ]
        }
    ]});

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contacts/c-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Acme Ltd" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_utils::mock_client(&server, test_utils::token_store("token", None));
    let mut resolver = ContactResolver::new();
    let report = PaginationEngine::new(Some(50), None)
        .run(&mut client, &mut resolver)
        .await?;

    assert_eq!(report.total_records_seen, 6);
    assert_eq!(report.total_rows_kept, 3);
    assert_eq!(report.rows.len(), 3);

    assert_eq!(report.rows[0].invoice_number, "INV-001");
    assert_eq!(report.rows[0].customer, "Acme Ltd");
    assert_eq!(report.rows[0].description, "Widget");
    assert_eq!(report.rows[0].quantity, "3");
    assert_eq!(report.rows[0].unit_price, "10.00");
    assert_eq!(report.rows[0].line_total, "30.00");

    assert_eq!(report.rows[1].description, "Gadget");
    assert_eq!(report.rows[1].line_total, "12.50");

    // The invoice without line items becomes a single placeholder row.
    assert_eq!(report.rows[2].invoice_number, "INV-002");
    assert_eq!(report.rows[2].customer, "—");
    assert_eq!(report.rows[2].description, "-");
    assert_eq!(report.rows[2].unit_price, "");
    assert_eq!(report.rows[2].line_total, "");

    // No row survived from the deleted invoice.
    assert!(report.rows.iter().all(|row| row.invoice_number != "INV-003"));

    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("invoices.csv");
    Exporter::new(&csv_path)
        .export(&report)
        .map_err(miette::Report::from)?;

    let mut reader = csv::Reader::from_path(&csv_path).expect("readable csv");
    let records = reader.records().count();
    assert_eq!(records, 3);
    Ok(())
}
