use report_table::data::cell_formatter::CellContent;
use report_table::data::column::{Activation, ColumnDescriptor, FormatRule};
use report_table::data::column_layout::{resolve_column_widths, total_width};
use report_table::data::data_view::SortSpec;
use report_table::data::pagination::compute_window;
use report_table::data::record::{Record, RecordSet};
use report_table::data::search_filter::{FilterFields, SearchFilter};
use report_table::record;
use report_table::services::table_orchestrator::{
    TableOptions, TableOrchestrator, TableRender, TableState,
};
use report_table::state::events::TableEvent;
use std::sync::Arc;

fn people() -> RecordSet {
    Arc::new(vec![
        record! { "name" => "John Doe", "city" => "Cali", "saldo" => 1500 },
        record! { "name" => "Jane Smith", "city" => "Bogotá", "saldo" => 200 },
        record! { "name" => "john lee", "city" => "Pasto", "saldo" => 75000 },
    ])
}

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::field("Nombre", "name").with_width(40.0),
        ColumnDescriptor::field("Ciudad", "city"),
        ColumnDescriptor::field("Saldo", "saldo")
            .with_format(FormatRule::Currency(Activation::with_precision(0))),
    ]
}

fn names(rows: &[Record]) -> Vec<String> {
    rows.iter()
        .map(|r| r.get("name").map(|v| v.to_string()).unwrap_or_default())
        .collect()
}

#[test]
fn test_search_over_configured_fields() {
    let options = TableOptions {
        filter_fields: FilterFields::Only(vec!["name".to_string()]),
        ..TableOptions::default()
    };
    let mut table = TableOrchestrator::new(people(), columns(), options).unwrap();
    table.handle(TableEvent::TermChanged("john".into())).unwrap();
    assert_eq!(names(&table.filtered_records()), vec!["John Doe", "john lee"]);

    table.handle(TableEvent::TermChanged("cali".into())).unwrap();
    assert_eq!(table.filtered_count(), 0);

    table.handle(TableEvent::TermChanged(String::new())).unwrap();
    assert_eq!(table.filtered_count(), 3);
}

#[test]
fn test_default_fields_derived_once_per_dataset() {
    let data = people();
    let mut table = TableOrchestrator::new(data.clone(), columns(), TableOptions::default()).unwrap();
    for term in ["j", "jo", "joh", "john"] {
        table.handle(TableEvent::TermChanged(term.into())).unwrap();
    }
    assert_eq!(table.field_derivations(), 1);

    table.handle(TableEvent::DataChanged(data)).unwrap();
    assert_eq!(table.field_derivations(), 1);

    table.handle(TableEvent::DataChanged(people())).unwrap();
    assert_eq!(table.field_derivations(), 2);
}

#[test]
fn test_term_and_page_in_same_cycle() {
    let data: RecordSet = Arc::new(
        (0..50)
            .map(|i| record! { "name" => format!("n{}", i) })
            .collect(),
    );
    let columns = vec![ColumnDescriptor::field("Nombre", "name")];
    let options = TableOptions {
        items_per_page: 5,
        ..TableOptions::default()
    };
    let mut table = TableOrchestrator::new(data, columns, options).unwrap();

    table.handle(TableEvent::PageChanged(4)).unwrap();
    table.handle(TableEvent::TermChanged("n1".into())).unwrap();
    assert_eq!(table.page().index, 0);
    assert_eq!(table.filtered_count(), 11);
    assert_eq!(table.pagination().map(|w| w.total_pages), Some(3));
}

#[test]
fn test_loading_hides_content_until_idle() {
    let mut table = TableOrchestrator::new(people(), columns(), TableOptions::default()).unwrap();
    table.handle(TableEvent::LoadingChanged(true)).unwrap();
    assert_eq!(table.state(), TableState::Loading);
    table.handle(TableEvent::TermChanged("jane".into())).unwrap();
    assert_eq!(table.render(), TableRender::Loading);

    table.handle(TableEvent::LoadingChanged(false)).unwrap();
    let TableRender::Ready(view) = table.render() else {
        panic!("table should be ready");
    };
    assert_eq!(view.filtered_count, 1);
    assert_eq!(view.rows[0].cells[2].content, CellContent::Text("$\u{a0}200".to_string()));
}

#[test]
fn test_sorting_pages_and_export_order() {
    let mut table = TableOrchestrator::new(people(), columns(), TableOptions::default()).unwrap();
    table
        .handle(TableEvent::SortChanged(Some(SortSpec {
            column: 2,
            ascending: false,
        })))
        .unwrap();
    assert_eq!(
        names(&table.current_page_rows()),
        vec!["john lee", "John Doe", "Jane Smith"]
    );

    let TableRender::Ready(view) = table.render() else {
        panic!("table should be ready");
    };
    assert_eq!(view.headers[2].sorted, Some(false));
    assert_eq!(view.headers[0].sorted, None);

    let bundle = table.build_export();
    assert_eq!(
        bundle.spreadsheet.rows[0][0],
        report_table::DataValue::from("John Doe")
    );

    table.handle(TableEvent::SortChanged(None)).unwrap();
    assert_eq!(names(&table.current_page_rows()), names(&people()));
}

#[test]
fn test_width_conservation() {
    let sets: Vec<Vec<Option<f64>>> = vec![
        vec![Some(20.0), Some(30.0), None, None],
        vec![None],
        vec![Some(100.0), None],
        vec![Some(33.3), Some(33.3), Some(33.4)],
        vec![Some(12.5), None, None, None, None, None, None],
    ];
    for widths in sets {
        let columns: Vec<ColumnDescriptor> = widths
            .iter()
            .map(|w| {
                let c = ColumnDescriptor::field("H", "f");
                match w {
                    Some(w) => c.with_width(*w),
                    None => c,
                }
            })
            .collect();
        let resolved = resolve_column_widths(&columns);
        assert!((total_width(&resolved) - 100.0).abs() < 1e-9, "{:?}", widths);
    }
}

#[test]
fn test_filter_idempotence_and_pass_through() {
    let records = people();
    let fields = vec!["name".to_string(), "city".to_string()];
    for term in ["j", "o", "bog", "zzz", "SMITH"] {
        let once = SearchFilter::filter(&records, &fields, term);
        let twice = SearchFilter::filter(&once, &fields, term);
        assert_eq!(once, twice);
    }
    assert_eq!(SearchFilter::filter(&records, &fields, ""), *records);
}

#[test]
fn test_window_always_contains_anchor_pages() {
    for total_items in [1usize, 7, 25, 26, 99, 250, 1000] {
        for per_page in [1usize, 3, 10, 25] {
            let pages = total_items.div_ceil(per_page);
            for current in 1..=pages {
                let window = compute_window(total_items, per_page, current);
                let numbers = window.page_numbers();
                assert!(numbers.contains(&1));
                assert!(numbers.contains(&current));
                if window.total_pages > 1 {
                    assert!(numbers.contains(&window.total_pages));
                }
                assert!(numbers.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
