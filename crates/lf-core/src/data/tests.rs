//! Tests for data module

use std::collections::HashMap;

use approx::assert_abs_diff_eq;

use super::*;

fn scores() -> Table {
    Table::from_columns([
        Column::string("name", ["ann", "bob", "cid", "dee"]),
        Column::string("team", ["red", "blue", "red", "blue"]),
        Column::int("points", vec![10, 20, 30, 40]),
        Column::float_opt("rating", vec![Some(1.5), None, Some(3.5), Some(2.0)]),
    ])
    .unwrap()
}

fn labeled(labels: Vec<Value>) -> Table {
    let n = labels.len() as i64;
    TableBuilder::new()
        .with_column(Column::int("x", (0..n).collect::<Vec<_>>()))
        .unwrap()
        .with_index(Index::from_labels(labels))
        .build()
        .unwrap()
}

#[test]
fn test_column_creation() {
    let ints = Column::int("a", vec![1, 2, 3]);
    assert_eq!(ints.len(), 3);
    assert_eq!(ints.dtype(), DType::Int);
    assert_eq!(ints.dtype().to_string(), "int64");

    let floats = Column::float("b", vec![1.0, f64::NAN]);
    assert_eq!(floats.null_positions(), vec![1]);
    assert_eq!(floats.get(1), Some(Value::Null));

    let strings = Column::string_opt("c", vec![Some("x"), None]);
    assert_eq!(strings.dtype(), DType::Str);
    assert_eq!(strings.null_count(), 1);
    assert_eq!(strings.get(2), None);
}

#[test]
fn test_column_builder_widens_types() {
    let mut builder = ColumnBuilder::new("v");
    builder.push(Value::Int(1)).unwrap();
    builder.push(Value::Null).unwrap();
    builder.push(Value::Float(2.5)).unwrap();
    let column = builder.finish().unwrap();

    assert_eq!(column.dtype(), DType::Float);
    assert_eq!(column.to_values(), vec![Value::Float(1.0), Value::Null, Value::Float(2.5)]);

    let mut strict = ColumnBuilder::with_dtype("v", DType::Int);
    assert!(matches!(
        strict.push(Value::from("x")),
        Err(DataError::TypeMismatch { .. })
    ));
}

#[test]
fn test_aggregates_skip_nulls() {
    let column = Column::int_opt("v", vec![Some(1), None, Some(3)]);

    assert_eq!(column.count(), 2);
    assert_eq!(column.sum().unwrap(), Value::Int(4));
    assert_eq!(column.max().unwrap(), Value::Int(3));
    assert_eq!(column.min().unwrap(), Value::Int(1));
    assert_eq!(column.mean().unwrap(), Some(2.0));
    assert_eq!(column.median().unwrap(), Some(2.0));
    assert_eq!(column.prod().unwrap(), Value::Int(3));
    assert_eq!(column.first(), Value::Int(1));
    assert_eq!(column.last(), Value::Int(3));
}

#[test]
fn test_sample_statistics() {
    let column = Column::float("v", vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    assert_abs_diff_eq!(column.var().unwrap().unwrap(), 2.5, epsilon = 1e-12);
    assert_abs_diff_eq!(column.std().unwrap().unwrap(), 1.58113883, epsilon = 1e-6);

    let stats = column.describe().unwrap();
    assert_eq!(stats.count, 5);
    assert_eq!(stats.q25, 2.0);
    assert_eq!(stats.q50, 3.0);
    assert_eq!(stats.q75, 4.0);
    assert_eq!(stats.max, 5.0);

    let single = Column::float("v", vec![7.0]);
    assert_eq!(single.std().unwrap(), None);
}

#[test]
fn test_numeric_aggregate_on_strings_fails() {
    let column = Column::string("s", ["a", "b"]);

    assert!(matches!(column.sum(), Err(DataError::TypeMismatch { .. })));
    assert!(matches!(column.mean(), Err(DataError::TypeMismatch { .. })));
    assert_eq!(column.max().unwrap(), Value::from("b"));
    assert_eq!(column.count(), 2);
}

#[test]
fn test_arithmetic_propagates_nulls() {
    let a = Column::int_opt("a", vec![Some(1), None, Some(3)]);
    let b = Column::int("b", vec![10, 20, 30]);

    let sum = a.add(&b).unwrap();
    assert_eq!(sum.dtype(), DType::Int);
    assert_eq!(sum.to_values(), vec![Value::Int(11), Value::Null, Value::Int(33)]);

    let ratio = b.div_scalar(4).unwrap();
    assert_eq!(ratio.dtype(), DType::Float);
    assert_eq!(ratio.get(0), Some(Value::Float(2.5)));

    let short = Column::int("c", vec![1]);
    assert!(matches!(a.add(&short), Err(DataError::Alignment { .. })));
    assert!(Column::string("s", ["x"]).add_scalar(1).is_err());
}

#[test]
fn test_apply_and_map() {
    let column = Column::float_opt("v", vec![Some(4.0), None, Some(9.0)]);

    let roots = column.map_f64(f64::sqrt).unwrap();
    assert_eq!(roots.to_values(), vec![Value::Float(2.0), Value::Null, Value::Float(3.0)]);

    let labels = column
        .apply(|v| Value::from(if v.as_f64().unwrap_or(0.0) > 5.0 { "big" } else { "small" }))
        .unwrap();
    assert_eq!(labels.dtype(), DType::Str);
    assert_eq!(labels.get(0), Some(Value::from("small")));
    assert_eq!(labels.get(1), Some(Value::Null));
}

#[test]
fn test_fillna_and_unique() {
    let column = Column::int_opt("v", vec![Some(2), None, Some(2), Some(1)]);

    let filled = column.fillna(0).unwrap();
    assert_eq!(filled.null_count(), 0);
    assert_eq!(filled.dtype(), DType::Int);

    let widened = column.fillna(0.5).unwrap();
    assert_eq!(widened.dtype(), DType::Float);

    assert_eq!(column.unique(), vec![Value::Int(2), Value::Null, Value::Int(1)]);
    assert!(column.fillna("x").is_err());
}

#[test]
fn test_value_equality_across_numeric_types() {
    assert_eq!(Value::Int(2), Value::Float(2.0));
    assert!(Value::Int(2) < Value::Float(2.5));
    assert_eq!(Value::Float(f64::NAN), Value::Null);

    let mut counts: HashMap<Value, usize> = HashMap::new();
    *counts.entry(Value::Int(3)).or_default() += 1;
    *counts.entry(Value::Float(3.0)).or_default() += 1;
    assert_eq!(counts.len(), 1);

    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Null.to_string(), "NaN");
}

#[test]
fn test_table_creation() {
    let table = scores();

    assert_eq!(table.shape(), (4, 4));
    assert_eq!(table.column_names(), vec!["name", "team", "points", "rating"]);
    assert_eq!(table.dtypes()[2], ("points", DType::Int));
    assert!(table.index().is_range());
    assert_eq!(table.to_string(), "Table(4 rows × 4 cols)");
}

#[test]
fn test_table_creation_rejects_bad_columns() {
    let mismatched = Table::from_columns([
        Column::int("a", vec![1, 2]),
        Column::int("b", vec![1, 2, 3]),
    ]);
    assert!(matches!(mismatched, Err(DataError::Alignment { .. })));

    let duplicate = Table::from_columns([Column::int("a", vec![1]), Column::int("a", vec![2])]);
    assert_eq!(duplicate.unwrap_err(), DataError::DuplicateColumn("a".to_string()));
}

#[test]
fn test_column_lookup() {
    let table = scores();

    assert_eq!(table.column("points").unwrap().sum().unwrap(), Value::Int(100));
    match table.column("missing") {
        Err(DataError::ColumnNotFound { name, available }) => {
            assert_eq!(name, "missing");
            assert_eq!(available.len(), 4);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_select_preserves_order_and_index() {
    let table = scores()
        .with_index(Index::from_values(["a", "b", "c", "d"]))
        .unwrap();
    let selected = table.select(["rating", "name"]).unwrap();

    assert_eq!(selected.column_names(), vec!["rating", "name"]);
    assert_eq!(selected.index(), table.index());
    assert!(table.select(["name", "name"]).is_err());
}

#[test]
fn test_self_assignment_is_idempotent() {
    let table = scores();
    for name in table.column_names() {
        let column = table.column(name).unwrap().clone();
        let assigned = table.assign(column).unwrap();
        assert_eq!(assigned.column_names(), table.column_names());
        assert_eq!(assigned, table);
    }
}

#[test]
fn test_table_equality_respects_column_order() {
    let table = scores();
    let reordered = table.select(["team", "name", "points", "rating"]).unwrap();

    assert_ne!(reordered, table);
    assert_eq!(reordered.select(["name", "team", "points", "rating"]).unwrap(), table);
}

#[test]
fn test_assign_replaces_in_place() {
    let mut table = scores();
    let doubled = table.column("points").unwrap().mul_scalar(2).unwrap();
    table.assign_in_place(doubled).unwrap();

    assert_eq!(table.column_names()[2], "points");
    assert_eq!(table.column("points").unwrap().get(0), Some(Value::Int(20)));

    let bonus = Column::int("bonus", vec![1, 1, 1, 1]);
    let extended = table.assign(bonus).unwrap();
    assert_eq!(extended.column_names().last(), Some(&"bonus"));
    assert_eq!(table.ncols(), 4);

    let short = Column::int("short", vec![1]);
    assert!(matches!(table.assign(short), Err(DataError::Alignment { .. })));
}

#[test]
fn test_assign_into_empty_table() {
    let mut table = Table::new();
    table.assign_in_place(Column::int("a", vec![1, 2])).unwrap();
    assert_eq!(table.shape(), (2, 1));
    assert_eq!(table.index().len(), 2);
}

#[test]
fn test_drop_columns_and_rows() {
    let table = scores();

    let fewer = table.drop_columns(&["rating"]).unwrap();
    assert_eq!(fewer.ncols(), 3);
    assert_eq!(table.ncols(), 4);
    assert!(table.drop_columns(&["nope"]).is_err());

    let mut labeled = table.with_index(Index::from_values(["a", "b", "a", "c"])).unwrap();
    labeled.drop_rows_in_place(&[Value::from("a")]).unwrap();
    assert_eq!(labeled.nrows(), 2);
    assert_eq!(labeled.index().labels(), vec![Value::from("b"), Value::from("c")]);
    assert!(matches!(
        labeled.drop_rows(&[Value::from("zzz")]),
        Err(DataError::LabelNotFound { .. })
    ));
}

#[test]
fn test_null_detection_and_dropna() {
    let table = scores();

    let nulls = table.isnull();
    assert_eq!(nulls.column("rating").unwrap().get(1), Some(Value::Bool(true)));
    assert_eq!(nulls.column("name").unwrap().get(1), Some(Value::Bool(false)));

    let complete = table.dropna(DropHow::Any, None).unwrap();
    assert_eq!(complete.nrows(), 3);
    assert_eq!(complete.index().labels(), vec![Value::Int(0), Value::Int(2), Value::Int(3)]);

    let all = table.dropna(DropHow::All, Some(&["rating"])).unwrap();
    assert_eq!(all.nrows(), 3);

    let filled = table.fillna(&[("rating", Value::Float(0.0))]).unwrap();
    assert_eq!(filled.column("rating").unwrap().null_count(), 0);
}

#[test]
fn test_append_row_resets_index() {
    let table = scores()
        .with_index(Index::from_values(["a", "b", "c", "d"]))
        .unwrap();
    let appended = table
        .append_row(&[("name", Value::from("eve")), ("points", Value::Float(12.5))])
        .unwrap();

    assert_eq!(appended.nrows(), 5);
    assert!(appended.index().is_range());
    assert_eq!(appended.column("points").unwrap().dtype(), DType::Float);
    assert_eq!(appended.column("team").unwrap().get(4), Some(Value::Null));
    assert!(table.append_row(&[("nope", Value::Int(1))]).is_err());
}

#[test]
fn test_append_null_row_keeps_column_types() {
    let table = Table::from_columns([
        Column::string_opt("s", vec![None::<&str>]),
        Column::int_opt("n", vec![None]),
    ])
    .unwrap();
    let appended = table.append_row(&[]).unwrap();

    assert_eq!(appended.column("s").unwrap().dtype(), DType::Str);
    assert_eq!(appended.column("n").unwrap().dtype(), DType::Int);
    assert_eq!(appended.column("n").unwrap().null_count(), 2);
}

#[test]
fn test_index_label_lookup() {
    let index = Index::from_values([3, 1, 3, 2]);

    assert_eq!(index.get_loc(&Value::Int(3)).unwrap(), vec![0, 2]);
    assert!(!index.is_unique());
    assert!(index.get_loc(&Value::Int(9)).is_err());

    let range = Index::range(5);
    assert_eq!(range.get_loc(&Value::Int(4)).unwrap(), vec![4]);
    assert!(range.get_loc(&Value::Int(5)).is_err());
}

#[test]
fn test_range_index_bounds() {
    assert!(matches!(
        RangeIndex::new(i64::MAX - 1, 1, 3),
        Err(DataError::IndexOutOfBounds { index: 2, len: 3 })
    ));
    assert!(RangeIndex::new(i64::MAX - 1, 1, 2).is_ok());
    assert!(RangeIndex::new(0, 0, 2).is_err());

    let descending = Index::Range(RangeIndex::new(0, -1, 3).unwrap());
    assert_eq!(descending.get_loc(&Value::Int(-2)).unwrap(), vec![2]);
    assert!(descending.get_loc(&Value::Int(i64::MIN)).is_err());
    assert!(descending.get_loc(&Value::Int(1)).is_err());
}

#[test]
fn test_label_slice_uses_first_positions() {
    let table = labeled(vec![
        Value::from("a"),
        Value::from("b"),
        Value::from("z"),
        Value::from("b"),
        Value::from("c"),
    ]);

    let sliced = table.loc("b", "c").unwrap();
    assert_eq!(sliced.nrows(), 4);
    assert_eq!(sliced.column("x").unwrap().get(0), Some(Value::Int(1)));

    let reversed = table.loc("c", "a").unwrap();
    assert_eq!(reversed.nrows(), 0);
}

#[test]
fn test_positional_and_label_slices_differ() {
    let table = labeled(vec![Value::Int(10), Value::Int(2), Value::Int(1), Value::Int(0)]);

    let by_position = table.iloc(1..3);
    assert_eq!(by_position.column("x").unwrap().to_values(), vec![Value::Int(1), Value::Int(2)]);

    let by_label = table.loc(2, 0).unwrap();
    assert_eq!(by_label.column("x").unwrap().to_values().len(), 3);

    assert_eq!(table.iloc(2..100).nrows(), 2);
    assert_eq!(table.head(2).nrows(), 2);
    assert_eq!(table.tail(1).index().labels(), vec![Value::Int(0)]);
}

#[test]
fn test_loc_labels_and_at() {
    let table = scores().set_index("name").unwrap();

    assert_eq!(table.index().name(), Some("name"));
    assert_eq!(table.ncols(), 3);

    let picked = table
        .loc_labels(&[Value::from("dee"), Value::from("ann")])
        .unwrap();
    assert_eq!(picked.column("points").unwrap().to_values(), vec![Value::Int(40), Value::Int(10)]);
    assert_eq!(table.at("cid", "points").unwrap(), Value::Int(30));
    assert_eq!(table.iat(0, "team").unwrap(), Value::from("red"));

    let restored = table.reset_index().unwrap();
    assert_eq!(restored.column_names()[0], "name");
    assert!(restored.index().is_range());
}

#[test]
fn test_rename_index_keeps_order() {
    let table = labeled(vec![Value::from("a"), Value::from("b")]);
    let mapping = HashMap::from([(Value::from("a"), Value::from("z"))]);
    let renamed = table.rename_index(&mapping);

    assert_eq!(renamed.index().labels(), vec![Value::from("z"), Value::from("b")]);
    assert_eq!(renamed.column("x").unwrap(), table.column("x").unwrap());

    let columns = table.rename_columns(&[("x", "y")]).unwrap();
    assert_eq!(columns.column_names(), vec!["y"]);
    assert_eq!(columns.column("y").unwrap().name(), "y");
}

#[test]
fn test_mask_filtering() {
    let table = scores();
    let mask = table.column("points").unwrap().gt(15).unwrap();
    let filtered = table.filter(&mask).unwrap();

    assert_eq!(filtered.nrows(), 3);
    assert_eq!(filtered.index().labels(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

    let short = Column::bool("m", vec![true]);
    assert!(matches!(table.filter(&short), Err(DataError::Alignment { .. })));

    let not_bool = Column::int("m", vec![1, 0, 1, 0]);
    assert!(matches!(table.filter(&not_bool), Err(DataError::TypeMismatch { .. })));
}

#[test]
fn test_filter_exclusivity() {
    let table = scores();
    let mask = table.column("points").unwrap().ge(25).unwrap();
    let kept = table.filter(&mask).unwrap();

    let complement = mask.invert().unwrap();
    let complement_on_kept = complement.filter(&mask.mask_values("test").unwrap()).unwrap();
    assert_eq!(kept.filter(&complement_on_kept).unwrap().nrows(), 0);
}

#[test]
fn test_null_comparisons() {
    let rating = scores().column("rating").unwrap().clone();

    assert_eq!(rating.gt(0.0).unwrap().get(1), Some(Value::Bool(false)));
    assert_eq!(rating.ne(1.5).unwrap().get(1), Some(Value::Bool(true)));
    assert!(rating.gt("x").is_err());
}

#[test]
fn test_bool_column_compares_with_numbers() {
    let flags = Column::bool("flag", vec![true, false]);

    assert_eq!(flags.eq(1).unwrap().to_values(), vec![Value::Bool(true), Value::Bool(false)]);
    assert_eq!(flags.gt(0).unwrap().to_values(), vec![Value::Bool(true), Value::Bool(false)]);
    assert_eq!(flags.lt(0.5).unwrap().to_values(), vec![Value::Bool(false), Value::Bool(true)]);
    assert_eq!(flags.eq(true).unwrap().to_values(), vec![Value::Bool(true), Value::Bool(false)]);

    let counts = Column::int("n", vec![0, 1, 2]);
    assert_eq!(
        counts.eq(true).unwrap().to_values(),
        vec![Value::Bool(false), Value::Bool(true), Value::Bool(false)]
    );
    assert_eq!(
        flags.is_in(&[Value::Int(0)]).to_values(),
        vec![Value::Bool(false), Value::Bool(true)]
    );
    assert_eq!(
        counts.is_in(&[Value::Bool(true)]).to_values(),
        vec![Value::Bool(false), Value::Bool(true), Value::Bool(false)]
    );
}

#[test]
fn test_mask_combinators() {
    let table = scores();
    let team = table.column("team").unwrap();
    let points = table.column("points").unwrap();

    let red_and_high = team.eq("red").unwrap().and(&points.gt(15).unwrap()).unwrap();
    assert_eq!(table.filter(&red_and_high).unwrap().nrows(), 1);

    let red_or_high = team.eq("red").unwrap().or(&points.gt(35).unwrap()).unwrap();
    assert_eq!(table.filter(&red_or_high).unwrap().nrows(), 3);

    let members = table
        .column("name")
        .unwrap()
        .is_in(&[Value::from("bob"), Value::from("dee")]);
    assert_eq!(table.filter(&members).unwrap().nrows(), 2);
}

#[test]
fn test_predicate_query() {
    let table = scores();
    let predicate = Predicate::compare("team", CmpOp::Eq, "blue")
        .and(Predicate::not_null("rating"))
        .or(Predicate::compare("points", CmpOp::Le, 10));

    let result = table.query(&predicate).unwrap();
    assert_eq!(
        result.column("name").unwrap().to_values(),
        vec![Value::from("ann"), Value::from("dee")]
    );

    let negated = table.query(&Predicate::is_null("rating").negate()).unwrap();
    assert_eq!(negated.nrows(), 3);

    assert_eq!("<=".parse::<CmpOp>().unwrap(), CmpOp::Le);
    assert!("~".parse::<CmpOp>().is_err());
}

#[test]
fn test_filter_rows_with_closure() {
    let table = scores();
    let result = table
        .filter_rows(|row| row.get_f64("points").unwrap().unwrap_or(0.0) > 25.0)
        .unwrap();
    assert_eq!(result.nrows(), 2);
}

#[test]
fn test_sort_values_is_stable_with_nulls_last() {
    let table = Table::from_columns([
        Column::int_opt("k", vec![Some(2), None, Some(1), Some(2)]),
        Column::string("tag", ["a", "b", "c", "d"]),
    ])
    .unwrap();

    let asc = table.sort_values("k", true).unwrap();
    assert_eq!(
        asc.column("tag").unwrap().to_values(),
        vec![Value::from("c"), Value::from("a"), Value::from("d"), Value::from("b")]
    );
    assert_eq!(asc.index().labels()[0], Value::Int(2));

    let desc = table.sort_values("k", false).unwrap();
    assert_eq!(
        desc.column("tag").unwrap().to_values(),
        vec![Value::from("a"), Value::from("d"), Value::from("c"), Value::from("b")]
    );
}

#[test]
fn test_sort_by_several_keys_and_index() {
    let table = scores();
    let sorted = table.sort_by(&[("team", true), ("points", false)]).unwrap();
    assert_eq!(
        sorted.column("name").unwrap().to_values(),
        vec![Value::from("dee"), Value::from("bob"), Value::from("cid"), Value::from("ann")]
    );

    let mut restored = sorted.clone();
    restored.sort_index_in_place(true).unwrap();
    assert_eq!(restored.index().labels(), table.index().labels());
    assert_eq!(restored.column("name").unwrap(), table.column("name").unwrap());
}

#[test]
fn test_rank_tie_breaks() {
    let column = Column::int("v", vec![10, 10, 20]);
    let ranks = |method| {
        column
            .rank(&RankOptions::new(method, true))
            .unwrap()
            .to_values()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect::<Vec<_>>()
    };

    assert_eq!(ranks(RankMethod::First), vec![1.0, 2.0, 3.0]);
    assert_eq!(ranks(RankMethod::Dense), vec![1.0, 1.0, 2.0]);
    assert_eq!(ranks(RankMethod::Min), vec![1.0, 1.0, 3.0]);
    assert_eq!(ranks(RankMethod::Max), vec![2.0, 2.0, 3.0]);
    assert_eq!(ranks(RankMethod::Average), vec![1.5, 1.5, 3.0]);
}

#[test]
fn test_rank_descending_with_nulls() {
    let column = Column::float_opt("v", vec![Some(1.0), None, Some(3.0), Some(3.0)]);
    let ranked = column.rank(&RankOptions::new(RankMethod::First, false)).unwrap();

    assert_eq!(
        ranked.to_values(),
        vec![Value::Float(3.0), Value::Null, Value::Float(1.0), Value::Float(2.0)]
    );
    assert!(matches!(
        "fancy".parse::<RankMethod>(),
        Err(DataError::UnsupportedConfig { .. })
    ));
}

#[test]
fn test_top_n_report() {
    let table = scores().set_index("name").unwrap();
    let ranked = table
        .select(["points"])
        .unwrap()
        .rank(&RankOptions::new(RankMethod::Min, false))
        .unwrap();
    let top = ranked.sort_values("points", true).unwrap().head(2);

    assert_eq!(top.index().labels(), vec![Value::from("dee"), Value::from("cid")]);
}

#[test]
fn test_groupby_first_appearance_order() {
    let table = scores();
    let grouped = table.groupby(&["team"]).unwrap();

    assert_eq!(grouped.ngroups(), 2);
    assert_eq!(
        grouped.keys().cloned().collect::<Vec<_>>(),
        vec![Value::from("red"), Value::from("blue")]
    );

    let sums = grouped.select(&["points"]).unwrap().agg(AggFunc::Sum).unwrap();
    assert_eq!(sums.index().name(), Some("team"));
    assert_eq!(sums.column("points").unwrap().to_values(), vec![Value::Int(40), Value::Int(60)]);

    let sizes = grouped.size().unwrap();
    assert_eq!(sizes.column("size").unwrap().to_values(), vec![Value::Int(2), Value::Int(2)]);

    let blue = grouped.get_group(&Value::from("blue")).unwrap();
    assert_eq!(blue.index().labels(), vec![Value::Int(1), Value::Int(3)]);
}

#[test]
fn test_groupby_single_group_matches_table_sum() {
    let table = Table::from_columns([
        Column::string("k", ["a", "a", "a"]),
        Column::int("x", vec![1, 2, 3]),
        Column::float("y", vec![0.5, 1.5, 2.0]),
    ])
    .unwrap();

    let grouped = table.groupby(&["k"]).unwrap().agg(AggFunc::Sum).unwrap();
    let totals = table.drop_columns(&["k"]).unwrap().reduce_columns(AggFunc::Sum).unwrap();

    assert_eq!(grouped.nrows(), 1);
    for (name, total) in totals {
        assert_eq!(grouped.column(&name).unwrap().get(0), Some(total));
    }
}

#[test]
fn test_groupby_null_keys_and_options() {
    let table = Table::from_columns([
        Column::string_opt("k", vec![Some("b"), None, Some("a"), None]),
        Column::int("x", vec![1, 2, 3, 4]),
    ])
    .unwrap();

    let kept = table.groupby(&["k"]).unwrap().agg(AggFunc::Sum).unwrap();
    assert_eq!(kept.nrows(), 3);
    assert_eq!(kept.index().labels()[1], Value::Null);
    assert_eq!(kept.column("x").unwrap().get(1), Some(Value::Int(6)));

    let options = GroupOptions {
        dropna: true,
        sort: true,
    };
    let sorted = table.groupby_with(&["k"], options).unwrap().agg(AggFunc::Sum).unwrap();
    assert_eq!(sorted.index().labels(), vec![Value::from("a"), Value::from("b")]);
}

#[test]
fn test_sorted_groups_put_null_levels_last() {
    let table = Table::from_columns([
        Column::string_opt("a", vec![Some("y"), None, Some("x")]),
        Column::int("b", vec![1, 1, 1]),
        Column::int("v", vec![1, 2, 3]),
    ])
    .unwrap();
    let options = GroupOptions {
        sort: true,
        ..GroupOptions::default()
    };
    let sums = table
        .groupby_with(&["a", "b"], options)
        .unwrap()
        .agg(AggFunc::Sum)
        .unwrap();

    assert_eq!(
        sums.index().labels(),
        vec![
            Value::Tuple(vec![Value::from("x"), Value::Int(1)]),
            Value::Tuple(vec![Value::from("y"), Value::Int(1)]),
            Value::Tuple(vec![Value::Null, Value::Int(1)]),
        ]
    );
    assert_eq!(sums.column("v").unwrap().to_values(), vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_empty_groups_keep_result_types() {
    let empty = scores().iloc(0..0);
    let grouped = empty.groupby(&["team"]).unwrap();

    assert_eq!(grouped.ngroups(), 0);
    let sums = grouped.select(&["points"]).unwrap().agg(AggFunc::Sum).unwrap();
    assert_eq!(sums.column("points").unwrap().dtype(), DType::Int);
    let counts = grouped.agg_columns(&[("name", AggFunc::Count), ("rating", AggFunc::Max)]).unwrap();
    assert_eq!(counts.dtypes(), vec![("name", DType::Int), ("rating", DType::Float)]);
    assert_eq!(grouped.size().unwrap().column("size").unwrap().dtype(), DType::Int);
}

#[test]
fn test_groupby_multiple_keys_and_custom_reducer() {
    let table = Table::from_columns([
        Column::string("a", ["x", "x", "y"]),
        Column::int("b", vec![1, 1, 2]),
        Column::float("v", vec![1.0, 3.0, 5.0]),
    ])
    .unwrap();
    let grouped = table.groupby(&["a", "b"]).unwrap();

    let means = grouped.agg_columns(&[("v", AggFunc::Mean)]).unwrap();
    assert_eq!(means.index().names(), vec!["a", "b"]);
    assert_eq!(
        means.index().labels()[0],
        Value::Tuple(vec![Value::from("x"), Value::Int(1)])
    );
    assert_eq!(means.column("v").unwrap().get(0), Some(Value::Float(2.0)));

    let spread = |c: &Column| -> Result<Value> {
        let max = c.max()?.as_f64().unwrap_or(0.0);
        let min = c.min()?.as_f64().unwrap_or(0.0);
        Ok(Value::Float(max - min))
    };
    let spreads = grouped.apply(&spread).unwrap();
    assert_eq!(spreads.column("v").unwrap().to_values(), vec![Value::Float(2.0), Value::Float(0.0)]);

    let flat = means.reset_index().unwrap();
    assert_eq!(flat.column_names(), vec!["a", "b", "v"]);
}

#[test]
fn test_reset_index_rejects_mixed_levels() {
    let table = labeled(vec![
        Value::Tuple(vec![Value::from("a"), Value::Int(1)]),
        Value::from("b"),
    ]);
    assert!(matches!(table.reset_index(), Err(DataError::Alignment { .. })));
}

#[test]
fn test_groupby_errors() {
    let table = scores();

    assert!(matches!(table.groupby(&["nope"]), Err(DataError::ColumnNotFound { .. })));
    assert!(table.groupby(&[]).is_err());
    let mean = table.groupby(&["team"]).unwrap().agg(AggFunc::Mean);
    assert!(matches!(mean, Err(DataError::TypeMismatch { .. })));
}

fn long_form() -> Table {
    Table::from_columns([
        Column::string("date", ["d1", "d1", "d2", "d3"]),
        Column::string("item", ["a", "b", "a", "b"]),
        Column::int("qty", vec![1, 2, 3, 4]),
    ])
    .unwrap()
}

#[test]
fn test_pivot_fills_missing_cells() {
    let wide = long_form().pivot("date", "item", "qty").unwrap();

    assert_eq!(wide.shape(), (3, 2));
    assert_eq!(wide.column_names(), vec!["a", "b"]);
    assert_eq!(wide.index().name(), Some("date"));
    assert_eq!(wide.at("d2", "b").unwrap(), Value::Null);
    assert_eq!(wide.at("d3", "b").unwrap(), Value::Int(4));
}

#[test]
fn test_pivot_null_only_column_keeps_value_type() {
    let table = long_form()
        .assign(Column::int_opt("qty", vec![Some(1), None, Some(3), None]))
        .unwrap();

    let wide = table.pivot("date", "item", "qty").unwrap();
    assert_eq!(wide.dtypes(), vec![("a", DType::Int), ("b", DType::Int)]);

    let means = table.pivot_table("date", "item", "qty", Some(AggFunc::Mean)).unwrap();
    assert_eq!(means.column("b").unwrap().dtype(), DType::Float);
    assert_eq!(means.column("b").unwrap().null_count(), 3);
}

#[test]
fn test_pivot_duplicates_need_aggregation() {
    let table = long_form()
        .append_row(&[
            ("date", Value::from("d1")),
            ("item", Value::from("a")),
            ("qty", Value::Int(10)),
        ])
        .unwrap();

    match table.pivot("date", "item", "qty") {
        Err(DataError::AmbiguousDuplicate { count, .. }) => assert_eq!(count, 2),
        other => panic!("unexpected result: {:?}", other),
    }

    let summed = table.pivot_table("date", "item", "qty", Some(AggFunc::Sum)).unwrap();
    assert_eq!(summed.at("d1", "a").unwrap(), Value::Int(11));
}

#[test]
fn test_pivot_melt_round_trip() {
    let long = long_form();
    let wide = long.pivot("date", "item", "qty").unwrap();
    let melted = wide
        .reset_index()
        .unwrap()
        .melt(&MeltOptions {
            var_name: "item".to_string(),
            value_name: "qty".to_string(),
            ..MeltOptions::new(&["date"])
        })
        .unwrap()
        .dropna(DropHow::Any, None)
        .unwrap();

    let triples = |t: &Table| {
        let mut rows: Vec<Vec<Value>> = t
            .select(["date", "item", "qty"])
            .unwrap()
            .rows()
            .map(|r| r.values())
            .collect();
        rows.sort();
        rows
    };
    assert_eq!(triples(&melted), triples(&long));
}

#[test]
fn test_merge_cartesian_pairs() {
    let a = Table::from_columns([Column::int("id", vec![1, 2]), Column::int("x", vec![10, 20])])
        .unwrap();
    let b = Table::from_columns([
        Column::int("id", vec![1, 1, 3]),
        Column::int("y", vec![100, 200, 300]),
    ])
    .unwrap();

    let merged = a.merge(&b, &MergeOptions::on(&["id"])).unwrap();
    assert_eq!(merged.nrows(), 2);
    assert_eq!(merged.column_names(), vec!["id", "x", "y"]);
    assert_eq!(merged.column("id").unwrap().to_values(), vec![Value::Int(1), Value::Int(1)]);
    assert_eq!(merged.column("y").unwrap().to_values(), vec![Value::Int(100), Value::Int(200)]);

    let auto = merge(&a, &b, &MergeOptions::default()).unwrap();
    assert_eq!(auto, merged);
}

#[test]
fn test_merge_join_types() {
    let a = Table::from_columns([Column::int("id", vec![1, 2]), Column::int("x", vec![10, 20])])
        .unwrap();
    let b = Table::from_columns([Column::int("id", vec![3, 1]), Column::int("y", vec![30, 10])])
        .unwrap();

    let left = a.merge(&b, &MergeOptions::on(&["id"]).how(JoinType::Left)).unwrap();
    assert_eq!(left.column("y").unwrap().to_values(), vec![Value::Int(10), Value::Null]);

    let right = a.merge(&b, &MergeOptions::on(&["id"]).how(JoinType::Right)).unwrap();
    assert_eq!(right.column("id").unwrap().to_values(), vec![Value::Int(3), Value::Int(1)]);
    assert_eq!(right.column("x").unwrap().to_values(), vec![Value::Null, Value::Int(10)]);

    let outer = a.merge(&b, &MergeOptions::on(&["id"]).how(JoinType::Outer)).unwrap();
    assert_eq!(
        outer.column("id").unwrap().to_values(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
    assert!(outer.index().is_range());
}

#[test]
fn test_merge_suffixes_and_errors() {
    let a = Table::from_columns([Column::int("id", vec![1]), Column::int("v", vec![1])]).unwrap();
    let b = Table::from_columns([Column::int("id", vec![1]), Column::int("v", vec![2])]).unwrap();

    let merged = a.merge(&b, &MergeOptions::on(&["id"])).unwrap();
    assert_eq!(merged.column_names(), vec!["id", "v_x", "v_y"]);

    let missing = a.merge(&b, &MergeOptions::on(&["nope"]));
    assert!(matches!(missing, Err(DataError::MergeKeyNotFound { side: "left", .. })));

    let c = Table::from_columns([Column::int("other", vec![1])]).unwrap();
    assert!(matches!(
        a.merge(&c, &MergeOptions::default()),
        Err(DataError::MergeKeyNotFound { .. })
    ));
    assert!(matches!(
        "cross".parse::<JoinType>(),
        Err(DataError::UnsupportedConfig { .. })
    ));
}

#[test]
fn test_merge_key_types_survive_empty_results() {
    let a = Table::from_columns([Column::int("id", vec![1]), Column::int("x", vec![10])]).unwrap();
    let b = Table::from_columns([Column::int("id", vec![2]), Column::int("y", vec![20])]).unwrap();

    let merged = a.merge(&b, &MergeOptions::on(&["id"])).unwrap();
    assert_eq!(merged.nrows(), 0);
    assert_eq!(
        merged.dtypes(),
        vec![("id", DType::Int), ("x", DType::Int), ("y", DType::Int)]
    );

    let names = Table::from_columns([Column::string("id", ["p"])]).unwrap();
    let others = Table::from_columns([Column::string("id", ["q"])]).unwrap();
    let merged = names.merge(&others, &MergeOptions::on(&["id"])).unwrap();
    assert_eq!(merged.column("id").unwrap().dtype(), DType::Str);

    assert!(matches!(
        a.merge(&names, &MergeOptions::on(&["id"])),
        Err(DataError::TypeMismatch { .. })
    ));
}

#[test]
fn test_merge_matches_bool_and_int_keys() {
    let flags = Table::from_columns([
        Column::bool("k", vec![true, false]),
        Column::string("label", ["yes", "no"]),
    ])
    .unwrap();
    let codes = Table::from_columns([Column::int("k", vec![1]), Column::int("n", vec![7])]).unwrap();

    let merged = flags.merge(&codes, &MergeOptions::on(&["k"])).unwrap();
    assert_eq!(merged.nrows(), 1);
    assert_eq!(merged.column("label").unwrap().get(0), Some(Value::from("yes")));
    assert_eq!(merged.column("k").unwrap().dtype(), DType::Int);
}

#[test]
fn test_row_reductions() {
    let table = Table::from_columns([
        Column::int("a", vec![1, 2]),
        Column::float_opt("b", vec![Some(10.0), None]),
    ])
    .unwrap();

    let totals = table.reduce_rows(AggFunc::Sum, "total").unwrap();
    assert_eq!(totals.name(), "total");
    assert_eq!(totals.to_values(), vec![Value::Float(11.0), Value::Float(2.0)]);

    let maxes = table.reduce_columns(AggFunc::Max).unwrap();
    assert_eq!(maxes["a"], Value::Int(2));
    assert!(scores().reduce_rows(AggFunc::Sum, "s").is_err());
}

#[test]
fn test_describe_table() {
    let summary = scores().describe().unwrap();

    assert_eq!(summary.column_names(), vec!["points", "rating"]);
    assert_eq!(summary.nrows(), 8);
    assert_eq!(summary.at("count", "rating").unwrap(), Value::Float(3.0));
    assert_eq!(summary.at("max", "points").unwrap(), Value::Float(40.0));
}

#[test]
fn test_options_from_json() {
    let options: MergeOptions = serde_json::from_str(r#"{"on": ["id"], "how": "left"}"#).unwrap();
    assert_eq!(options.how, JoinType::Left);
    assert_eq!(options.suffixes.0, "_x");

    let rank: RankOptions = serde_json::from_str(r#"{"method": "dense"}"#).unwrap();
    assert_eq!(rank.method, RankMethod::Dense);
    assert!(rank.ascending);
}

#[cfg(feature = "proptest")]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn prop_filter_partitions_rows(values in prop::collection::vec(-100i64..100, 0..50), pivot in -100i64..100) {
            let table = Table::from_columns([Column::int("v", values.clone())]).unwrap();
            let mask = table.column("v").unwrap().gt(pivot).unwrap();

            let kept = table.filter(&mask).unwrap();
            let dropped = table.filter(&mask.invert().unwrap()).unwrap();
            prop_assert_eq!(kept.nrows() + dropped.nrows(), values.len());
        }

        #[test]
        fn prop_dense_ranks_have_no_gaps(values in prop::collection::vec(0i64..10, 1..40)) {
            let ranked = Column::int("v", values.clone())
                .rank(&RankOptions::new(RankMethod::Dense, true))
                .unwrap();
            let max = ranked.max().unwrap().as_f64().unwrap();
            let distinct = Column::int("v", values).unique().len();
            prop_assert_eq!(max as usize, distinct);
        }

        #[test]
        fn prop_sort_is_ordered(values in prop::collection::vec(any::<i32>(), 0..50)) {
            let column = Column::int("v", values.into_iter().map(i64::from).collect::<Vec<_>>());
            let sorted = column.sort_values(true).unwrap().to_values();
            prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
