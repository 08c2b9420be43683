//! Tests for ingestion and rendering

use std::io::Write;

use lf_core::{AggFunc, DType, DataError, Value};
use tempfile::NamedTempFile;

use super::*;

fn fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_infer_dtype_order() {
    assert_eq!(infer_dtype(["1", "2"]), DType::Int);
    assert_eq!(infer_dtype(["1", "2.5"]), DType::Float);
    assert_eq!(infer_dtype(["true", "False"]), DType::Bool);
    assert_eq!(infer_dtype(["2024-01-02", "2024-01-03 10:00:00"]), DType::Timestamp);
    assert_eq!(infer_dtype(["1", "x"]), DType::Str);
    assert_eq!(infer_dtype(std::iter::empty()), DType::Float);
}

#[test]
fn test_read_csv_with_na_token_and_usecols() {
    let file = fixture(
        "TIME,GEO,Value,Flag\n\
         2000,EU,5.0,a\n\
         2001,EU,:,b\n\
         2000,Spain,4.3,c\n",
    );
    let options = ReadOptions::new()
        .na_values(&[":"])
        .usecols(&["TIME", "GEO", "Value"]);

    let table = read_csv(file.path(), &options).unwrap();

    assert_eq!(table.shape(), (3, 3));
    assert_eq!(table.column_names(), vec!["TIME", "GEO", "Value"]);
    assert_eq!(table.column("TIME").unwrap().dtype(), DType::Int);
    assert_eq!(table.column("Value").unwrap().dtype(), DType::Float);
    assert_eq!(table.column("Value").unwrap().null_positions(), vec![1]);

    let means = table
        .groupby(&["GEO"])
        .unwrap()
        .select(&["Value"])
        .unwrap()
        .agg(AggFunc::Mean)
        .unwrap();
    assert_eq!(means.at("EU", "Value").unwrap(), Value::Float(5.0));
}

#[test]
fn test_read_multi_character_delimiter_without_header() {
    let file = fixture("1::F::1\n2::M::56\n");
    let options = ReadOptions::new()
        .delimiter("::")
        .no_header(&["user_id", "gender", "age"]);

    let table = read_csv(file.path(), &options).unwrap();

    assert_eq!(table.shape(), (2, 3));
    assert_eq!(table.column("gender").unwrap().get(1), Some(Value::from("M")));
    assert_eq!(table.column("age").unwrap().get(1), Some(Value::Int(56)));
}

#[test]
fn test_dtype_override_and_parse_error() {
    let text = "code,n\n007,1\n042,2\n";

    let options = ReadOptions::new().dtype("code", DType::Str);
    let table = read_str(text, &options).unwrap();
    assert_eq!(table.column("code").unwrap().get(0), Some(Value::from("007")));

    let forced = ReadOptions::new().dtype("n", DType::Bool);
    match read_str(text, &forced) {
        Err(IoError::Parse { column, row, .. }) => {
            assert_eq!(column, "n");
            assert_eq!(row, 0);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_header_errors() {
    let missing = ReadOptions::new().usecols(&["nope"]);
    assert!(matches!(read_str("a,b\n1,2\n", &missing), Err(IoError::Header(_))));

    assert!(matches!(read_str("a,a\n1,2\n", &ReadOptions::new()), Err(IoError::Header(_))));

    let ragged = ReadOptions::new().delimiter("::");
    assert!(matches!(
        read_str("a::b\n1::2::3\n", &ragged),
        Err(IoError::Data(DataError::Alignment { .. }))
    ));
}

#[test]
fn test_read_options_from_json() {
    let options =
        ReadOptions::from_json(r#"{"delimiter": ";", "na_values": ["-"], "dtypes": {"id": "str"}}"#)
            .unwrap();

    assert_eq!(options.delimiter, ";");
    assert!(options.has_header);
    assert_eq!(options.dtypes.get("id"), Some(&DType::Str));

    let table = read_str("id;score\n1;-\n2;3.5\n", &options).unwrap();
    assert_eq!(table.column("id").unwrap().dtype(), DType::Str);
    assert_eq!(table.column("score").unwrap().null_count(), 1);

    assert!(matches!(ReadOptions::from_json("{"), Err(IoError::Json(_))));
}

#[test]
fn test_empty_column_is_float() {
    let table = read_str("a,b\n1,\n2,\n", &ReadOptions::new()).unwrap();
    assert_eq!(table.column("b").unwrap().dtype(), DType::Float);
    assert_eq!(table.column("b").unwrap().null_count(), 2);
}

#[test]
fn test_to_text_aligns_and_truncates() {
    let table = read_str("name,n\nann,1\nbob,22\ncid,3\ndee,4\n", &ReadOptions::new()).unwrap();

    let full = to_text(&table, None);
    let lines: Vec<&str> = full.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with("name   n"));
    assert!(lines[2].ends_with("bob  22"));

    let short = to_text(&table, Some(2));
    assert!(short.contains("..."));
    assert!(short.contains("[4 rows x 2 columns]"));
    assert!(!short.contains("bob"));
}

#[test]
fn test_csv_round_trip_through_file() {
    let table = read_str("k,v\na,1.5\nb,\n", &ReadOptions::new()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    write_csv_path(&table, &path, false).unwrap();
    let reread = read_csv(&path, &ReadOptions::new()).unwrap();

    assert_eq!(reread, table);
    assert_eq!(to_csv_string(&table, true).unwrap(), ",k,v\n0,a,1.5\n1,b,\n");
}

#[test]
fn test_ragged_comma_record_is_alignment_error() {
    assert!(matches!(
        read_str("a,b\n1,2,3\n", &ReadOptions::new()),
        Err(IoError::Data(DataError::Alignment { expected: 2, actual: 3, .. }))
    ));
}
