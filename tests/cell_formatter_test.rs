use report_table::data::cell_formatter::{CellContent, CellFormatter, Tone};
use report_table::data::column::{Activation, ColumnDescriptor, FormatRule};
use report_table::data::record::{DataValue, Record};
use report_table::utils::date_format::format_date;
use report_table::utils::number_format::{format_currency_cop, format_percentage};

fn format(rule: FormatRule, value: impl Into<DataValue>) -> CellContent {
    let column = ColumnDescriptor::field("Col", "v").with_format(rule);
    let record = Record::new().with("v", value);
    CellFormatter::format_record(&column, &record)
}

#[test]
fn test_date_scenarios() {
    assert_eq!(format_date(&DataValue::from("0000-00-00")), "No registra");
    assert_eq!(format_date(&DataValue::from("2023-01-15")), "2023-01-15");
    assert_eq!(format_date(&DataValue::from("")), "No registra");
    assert_eq!(format_date(&DataValue::from("2023-13-45")), "No registra");
    assert_eq!(format_date(&DataValue::from("2023-01-15 08:05")), "2023-01-15 08:05");
}

#[test]
fn test_percentage_scenarios() {
    assert_eq!(format_percentage(&DataValue::Float(0.85), 2).as_deref(), Some("85.00%"));
    assert_eq!(format_percentage(&DataValue::from("0.5"), 0).as_deref(), Some("50%"));
    assert_eq!(
        format(FormatRule::Percentage(Activation::always()), 0.1234).text(),
        "12.34%"
    );
    assert_eq!(
        format(FormatRule::Percentage(Activation::always()), "sin dato"),
        CellContent::Raw(DataValue::from("sin dato"))
    );
}

#[test]
fn test_currency_scenarios() {
    assert_eq!(format_currency_cop(&DataValue::from("no es número"), 2), "0 COP");
    assert_eq!(
        format(FormatRule::Currency(Activation::always()), "1234567.891").text(),
        "$\u{a0}1.234.567,89"
    );
    assert_eq!(
        format(FormatRule::Currency(Activation::with_precision(0)), 999).text(),
        "$\u{a0}999"
    );
}

#[test]
fn test_disabled_rule_uses_default_rendering() {
    assert_eq!(
        format(FormatRule::Currency(Activation::Disabled), 1500),
        CellContent::Raw(DataValue::Integer(1500))
    );
    assert_eq!(
        format(FormatRule::None, "texto"),
        CellContent::Raw(DataValue::from("texto"))
    );
}

#[test]
fn test_predicate_sees_whole_record() {
    let column = ColumnDescriptor::field("Valor", "valor").with_format(FormatRule::Currency(
        Activation::when(|_, record| record.get("moneda") == Some(&DataValue::from("COP"))),
    ));
    let cop = Record::new().with("valor", 2000).with("moneda", "COP");
    let usd = Record::new().with("valor", 2000).with("moneda", "USD");

    assert_eq!(CellFormatter::format_record(&column, &cop).text(), "$\u{a0}2.000,00");
    assert_eq!(
        CellFormatter::format_record(&column, &usd),
        CellContent::Raw(DataValue::Integer(2000))
    );
}

#[test]
fn test_categorical_is_two_way() {
    let tone = |v: &str| match format(FormatRule::Categorical, v) {
        CellContent::Emphasis { tone, .. } => tone,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(tone("ingreso"), Tone::Positive);
    assert_eq!(tone("Desbloqueado"), Tone::Positive);
    assert_eq!(tone("Bloqueado"), Tone::Negative);
    assert_eq!(tone("pendiente"), Tone::Negative);
}

#[test]
fn test_composite_currency() {
    assert_eq!(
        format(FormatRule::CompositeCurrency(Activation::always()), "150000-Abono cuota").text(),
        "$\u{a0}150.000 - (Abono cuota)"
    );
    assert_eq!(
        format(FormatRule::CompositeCurrency(Activation::always()), "sin separador").text(),
        "Formato inválido"
    );
}

#[test]
fn test_missing_field_passes_through() {
    let column = ColumnDescriptor::field("Nada", "missing");
    assert_eq!(
        CellFormatter::format_record(&column, &Record::new()),
        CellContent::Raw(DataValue::Null)
    );
}
