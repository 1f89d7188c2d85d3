//! Integration tests for csv-guess

use csv_guess::{
    CsvReader, DialectConfig, GuessedType, Guesser, Newline, ReaderOptions, Record, SampleSize,
    SchemaColumn,
};
use std::io::Cursor;
use std::io::Write;
use tempfile::NamedTempFile;

fn read_all(data: &[u8], result: &csv_guess::GuessResult) -> Vec<Record> {
    CsvReader::from_bytes(data, &result.dialect, result.num_fields, ReaderOptions::default())
        .collect::<Result<_, _>>()
        .unwrap()
}

fn names(result: &csv_guess::GuessResult) -> Vec<String> {
    result
        .columns
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.name.clone())
        .collect()
}

#[test]
fn test_guess_comma_delimited() {
    let data = b"name,age,city\nAlice,30,New York\nBob,25,Los Angeles\nCharlie,35,Chicago\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert!(result.dialect.has_header_line);
    assert_eq!(result.num_fields, 3);
    assert_eq!(names(&result), vec!["name", "age", "city"]);
}

#[test]
fn test_guess_tab_delimited() {
    let data = b"name\tage\tcity\nAlice\t30\tNew York\nBob\t25\tLos Angeles\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, '\t');
    assert!(result.dialect.has_header_line);
    assert_eq!(result.num_fields, 3);
}

#[test]
fn test_tabs_win_over_commas_in_values() {
    let data = b"id\tnote\n1\ta, b\n2\tc, d, e\n3\tplain\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, '\t');
    assert_eq!(
        read_all(data, &result)[1],
        vec![Some("2".to_string()), Some("c, d, e".to_string())]
    );
}

#[test]
fn test_guess_semicolon_delimited() {
    let data = b"name;age;city\nAlice;30;New York\nBob;25;Los Angeles\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ';');
}

#[test]
fn test_guess_pipe_delimited() {
    let data = b"name|age|city\nAlice|30|New York\nBob|25|Los Angeles\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, '|');
}

#[test]
fn test_guess_quoted_fields() {
    let data = b"\"name\",\"value\"\n\"hello, world\",\"123\"\n\"test\",\"456\"\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.dialect.quote, Some('"'));
    assert_eq!(
        result.columns.unwrap(),
        vec![
            SchemaColumn::new("name", GuessedType::String),
            SchemaColumn::new("value", GuessedType::Long),
        ]
    );
}

#[test]
fn test_guess_single_quoted() {
    let data = b"'name','value'\n'hello, world','123'\n'test','456'\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.dialect.quote, Some('\''));
    assert_eq!(result.dialect.escape, None);
}

#[test]
fn test_guess_backslash_escape() {
    let data = b"id,quote\n1,\"she said \\\"hi\\\"\"\n2,\"plain\"\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.quote, Some('"'));
    assert_eq!(result.dialect.escape, Some('\\'));
    assert_eq!(
        read_all(data, &result)[0],
        vec![Some("1".to_string()), Some("she said \"hi\"".to_string())]
    );
}

#[test]
fn test_guess_no_header() {
    let data = b"1,2,3\n4,5,6\n7,8,9\n1,5,9\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert!(!result.dialect.has_header_line);
    assert_eq!(result.num_fields, 3);
    // Should have generated column names
    assert_eq!(names(&result), vec!["c0", "c1", "c2"]);
}

#[test]
fn test_sparse_column_does_not_make_a_header() {
    let data = b"1,foo\n2,\n3,\n4,\n5,\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert!(!result.dialect.has_header_line);
    assert_eq!(
        result.columns.unwrap(),
        vec![
            SchemaColumn::new("c0", GuessedType::Long),
            SchemaColumn::new("c1", GuessedType::String),
        ]
    );
}

#[test]
fn test_guess_type_detection() {
    let data =
        b"id,name,score,active,date\n1,Alice,95.5,true,2023-01-15\n2,Bob,87.2,false,2023-02-20\n";
    let result = Guesser::new().guess_bytes(data).unwrap();
    let types: Vec<GuessedType> = result
        .columns
        .unwrap()
        .into_iter()
        .map(|c| c.column_type)
        .collect();

    assert_eq!(
        types,
        vec![
            GuessedType::Long,
            GuessedType::String,
            GuessedType::Double,
            GuessedType::Boolean,
            GuessedType::Timestamp("%Y-%m-%d".to_string()),
        ]
    );
}

#[test]
fn test_long_column_widens_to_double() {
    let data = b"n,label\n1,a\n2,b\n";
    let result = Guesser::new().guess_bytes(data).unwrap();
    assert_eq!(result.columns.unwrap()[0].column_type, GuessedType::Long);

    let data = b"n,label\n1,a\n2,b\n3.14,c\n";
    let result = Guesser::new().guess_bytes(data).unwrap();
    assert_eq!(result.columns.unwrap()[0].column_type, GuessedType::Double);
}

#[test]
fn test_guess_windows_line_endings() {
    let data = b"name,age\r\nAlice,30\r\nBob,25\r\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.dialect.newline, Newline::CRLF);
    assert_eq!(result.num_fields, 2);
}

#[test]
fn test_guess_from_reader() {
    let data = b"a,b,c\n1,2,3\n4,5,6\n";
    let cursor = Cursor::new(data.to_vec());

    let result = Guesser::new().guess_reader(cursor).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.num_fields, 3);
}

#[test]
fn test_guess_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "name,age,city").unwrap();
    writeln!(temp_file, "Alice,30,NYC").unwrap();
    writeln!(temp_file, "Bob,25,LA").unwrap();
    temp_file.flush().unwrap();

    let result = Guesser::new().guess_path(temp_file.path()).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.num_fields, 3);
    assert!(result.dialect.has_header_line);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Guesser::new().guess_path("/definitely/not/here.csv");
    assert!(matches!(result, Err(csv_guess::GuessError::Io(_))));
}

#[test]
fn test_forced_delimiter() {
    let data = b"a;b;c\n1;2;3\n";

    let mut guesser = Guesser::new();
    guesser.delimiter(';');

    let result = guesser.guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ';');
    assert_eq!(result.diff.delimiter, None);
    assert_eq!(result.diff.quote, Some(Some('"')));
}

#[test]
fn test_json_config() {
    let config =
        DialectConfig::from_json(r#"{"delimiter": "|", "has_header_line": false}"#).unwrap();
    let data = b"id|name\n1|a\n2|b\n";

    let result = Guesser::new().config(config).guess_bytes(data).unwrap();

    assert!(!result.dialect.has_header_line);
    assert_eq!(names(&result), vec!["c0", "c1"]);
    assert_eq!(result.diff.has_header_line, None);
}

#[test]
fn test_fully_explicit_config_guesses_nothing() {
    let data = b"Report\n\nid,amount,note\n1,9.5,x\n2,NULL,\"y, z\"\n";
    let first = Guesser::new().guess_bytes(data).unwrap();
    assert!(!first.diff.is_empty());

    let config = DialectConfig::default().complete_from(&first.dialect);
    let second = Guesser::new().config(config).guess_bytes(data).unwrap();

    assert!(second.diff.is_empty());
    assert_eq!(second.dialect, first.dialect);
    assert_eq!(second.columns, first.columns);
}

#[test]
fn test_preamble_comment_and_null_string() {
    let data = b"Sales export\ngenerated 2024\n\nregion,units\n# checked\nnorth,10\nsouth,NULL\neast,7\n";
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.skip_header_lines, 3);
    assert!(result.dialect.has_header_line);
    assert_eq!(result.dialect.comment_line_marker.as_deref(), Some("#"));
    assert_eq!(result.dialect.null_string.as_deref(), Some("NULL"));
    assert_eq!(
        result.columns.as_ref().unwrap()[1],
        SchemaColumn::new("units", GuessedType::Long)
    );

    let records = read_all(data, &result);
    assert_eq!(
        records,
        vec![
            vec![Some("north".to_string()), Some("10".to_string())],
            vec![Some("south".to_string()), None],
            vec![Some("east".to_string()), Some("7".to_string())],
        ]
    );
}

#[test]
fn test_multiline_quoted_values() {
    let data = b"id,text\n1,\"line one\nline two\"\n2,plain\n";

    let mut guesser = Guesser::new();
    guesser.quote(Some('"'));
    let result = guesser.guess_bytes(data).unwrap();

    assert_eq!(result.num_fields, 2);
    assert_eq!(
        read_all(data, &result),
        vec![
            vec![Some("1".to_string()), Some("line one\nline two".to_string())],
            vec![Some("2".to_string()), Some("plain".to_string())],
        ]
    );
}

#[test]
fn test_empty_quoted_is_not_null() {
    let data = b"a,b,c\nx,\"\",\n";
    let mut guesser = Guesser::new();
    guesser.has_header_line(true);
    let result = guesser.guess_bytes(data).unwrap();

    assert_eq!(
        read_all(data, &result),
        vec![vec![Some("x".to_string()), Some(String::new()), None]]
    );
}

#[test]
fn test_sample_size_records() {
    let data = b"a,b\n1,2\n3,4\n5,6\n7,8\n9,10\n";

    let mut guesser = Guesser::new();
    guesser.sample_size(SampleSize::Records(3));

    let result = guesser.guess_bytes(data).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.avg_record_len, data.len() / 3);
}

#[test]
fn test_sample_size_bytes() {
    let data = b"name,age\nAlice,30\nBob,25\nCharlie,35\n";

    let mut guesser = Guesser::new();
    guesser.sample_size(SampleSize::Bytes(20));

    let result = guesser.guess_reader(Cursor::new(data.to_vec())).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.num_fields, 2);
}

#[test]
fn test_utf8_detection() {
    let data = "name,city\nAlice,东京\nBob,Москва\n".as_bytes();
    let result = Guesser::new().guess_bytes(data).unwrap();

    assert_eq!(result.dialect.charset.name(), "UTF-8");
}

#[test]
fn test_utf8_bom() {
    let mut data = vec![0xEF, 0xBB, 0xBF]; // UTF-8 BOM
    data.extend_from_slice(b"a,b,c\n1,2,3\n");

    let result = Guesser::new().guess_bytes(&data).unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.dialect.charset.name(), "UTF-8");
    assert_eq!(names(&result), vec!["a", "b", "c"]);
}

#[test]
fn test_shift_jis_is_reported_as_ms932() {
    let text = "名前,住所,年齢\n".to_string()
        + &"山田太郎,東京都新宿区西新宿,35\n鈴木花子,大阪府大阪市北区梅田,28\n".repeat(20);
    let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(&text);
    assert!(!had_errors);

    let result = Guesser::new().guess_bytes(&bytes).unwrap();

    assert_eq!(result.dialect.charset.name(), "MS932");
    assert_eq!(names(&result), vec!["名前", "住所", "年齢"]);
}

#[test]
fn test_empty_input_defaults() {
    let result = Guesser::new().guess_bytes(b"").unwrap();

    assert_eq!(result.dialect.delimiter, ',');
    assert_eq!(result.dialect.quote, Some('"'));
    assert_eq!(result.columns, None);
}

#[test]
fn test_result_serializes_to_json() {
    let data = b"id;at\n1;2024-01-15 10:00:00\n2;2024-01-16 11:30:00\n";
    let result = Guesser::new().guess_bytes(data).unwrap();
    let json: serde_json::Value = serde_json::to_value(&result).unwrap();

    assert_eq!(json["diff"]["delimiter"], ";");
    assert_eq!(json["diff"]["has_header_line"], true);
    assert!(json["diff"].get("null_string").is_none());
    assert_eq!(json["columns"][1]["type"], "timestamp");
    assert_eq!(json["columns"][1]["format"], "%Y-%m-%d %H:%M:%S");
}
