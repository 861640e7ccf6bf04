//! Rendering tests for the statement builders.

use crate::column::{JoinType, int8, integer, text, timestamp_with_time_zone, uuid};
use crate::db::{Db, define_db};
use crate::error::QbError;
use crate::functions::{
    any, array_agg, bit_and, bit_or, count_all, exists, group, star, star_of, string_agg, sum,
};
use crate::qb::{Materialization, Record};
use crate::query::{QueryExecutor, QueryResult, executor_fn};
use crate::table::TableDefinition;
use crate::token::Tokenable;
use crate::value::Value;

fn db() -> Db<impl QueryExecutor> {
    define_db(
        [
            (
                "foo",
                TableDefinition::new([
                    ("id", uuid().primary_key().default("gen_random_uuid()")),
                    (
                        "createDate",
                        timestamp_with_time_zone().not_null().default("now()"),
                    ),
                    ("name", text().not_null()),
                    ("value", integer()),
                    ("bigValue", int8()),
                ]),
            ),
            (
                "bar",
                TableDefinition::new([
                    ("id", uuid().primary_key().default("gen_random_uuid()")),
                    ("fooId", uuid().not_null().references("foo", "id")),
                    ("name", text()),
                    ("with", text()),
                ]),
            ),
        ],
        executor_fn(|_: String, _: Vec<Value>| async {
            Ok::<_, QbError>(QueryResult::<()> {
                rows: Vec::new(),
                affected_count: 0,
            })
        }),
    )
}

fn validation_message(err: QbError) -> String {
    match err {
        QbError::Validation(message) => message,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

// ==================== SELECT ====================

#[test]
fn test_select_basic() {
    let db = db();
    let foo = &db["foo"];
    let sql = db.select(&[&foo["id"], &foo["createDate"]]).from(foo).to_sql();
    assert_eq!(sql.text, r#"SELECT foo.id, foo.create_date "createDate" FROM foo"#);
    assert!(sql.parameters.is_empty());
}

#[test]
fn test_select_where_numbers_parameters() {
    let db = db();
    let foo = &db["foo"];
    let condition = foo["name"]
        .eq("Test")
        .and(foo["value"].gt(1).or(foo["value"].lt(0)));
    let sql = db.select(&[&foo["id"]]).from(foo).where_(&condition).to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.id FROM foo WHERE foo.name = $1 AND (foo.value > $2 OR foo.value < $3)"
    );
    assert_eq!(
        sql.parameters,
        vec![Value::Text("Test".into()), Value::Int(1), Value::Int(0)]
    );
}

#[test]
fn test_select_join_lateral() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let sql = db
        .select(&[&foo["id"]])
        .from(foo)
        .join_lateral(bar)
        .on(&foo["id"].eq(&bar["fooId"]))
        .to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.id FROM foo JOIN LATERAL bar ON (foo.id = bar.foo_id)"
    );
}

#[test]
fn test_select_join_using() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let sql = db
        .select(&[&foo["id"]])
        .from(foo)
        .left_outer_join(bar)
        .using(&[&bar["id"]])
        .to_sql();
    assert_eq!(sql.text, "SELECT foo.id FROM foo LEFT OUTER JOIN bar USING (id)");
}

#[test]
fn test_select_tracks_join_types() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);

    let left = db.select(&[&foo["id"]]).from(foo).left_join(bar);
    assert_eq!(left.join_type("foo"), Some(JoinType::None));
    assert_eq!(left.join_type("bar"), Some(JoinType::LeftJoin));

    let right = db.select(&[&foo["id"]]).from(foo).right_join(bar);
    assert_eq!(right.join_type("foo"), Some(JoinType::LeftSideOfRightJoin));
    assert_eq!(right.join_type("bar"), Some(JoinType::None));

    let full = db.select(&[&foo["id"]]).from(foo).full_join(bar);
    assert_eq!(full.join_type("foo"), Some(JoinType::FullJoin));
    assert_eq!(full.join_type("bar"), Some(JoinType::FullJoin));
    assert_eq!(full.join_type("baz"), None);
}

#[test]
fn test_select_aggregate_alias() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .select(&[&foo["id"], &sum(&foo["value"]).as_("total")])
        .from(foo)
        .to_sql();
    assert_eq!(sql.text, "SELECT foo.id, SUM (foo.value) total FROM foo");
}

#[test]
fn test_select_group_by_having() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .select(&[&foo["name"], &count_all()])
        .from(foo)
        .group_by(&[&foo["name"]])
        .having(&[&count_all().gt(1)])
        .to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.name, COUNT(*) FROM foo GROUP BY foo.name HAVING COUNT(*) > $1"
    );
    assert_eq!(sql.parameters, vec![Value::Int(1)]);
}

#[test]
fn test_select_distinct_order_by() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .select_distinct(&[&foo["name"]])
        .from(foo)
        .order_by(&[&foo["name"].desc().nulls_last(), &foo["id"]])
        .to_sql();
    assert_eq!(
        sql.text,
        "SELECT DISTINCT foo.name FROM foo ORDER BY foo.name DESC NULLS LAST, foo.id"
    );
}

#[test]
fn test_select_star_expands_every_source() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let query = db
        .select(&[&star()])
        .from(foo)
        .inner_join(bar)
        .on(&bar["fooId"].eq(&foo["id"]));
    assert_eq!(
        query.to_sql().text,
        concat!(
            r#"SELECT foo.id, foo.create_date "createDate", foo.name, foo.value, "#,
            r#"foo.big_value "bigValue", bar.id, bar.foo_id "fooId", bar.name, bar."with" "#,
            r#"FROM foo INNER JOIN bar ON (bar.foo_id = foo.id)"#
        )
    );
}

#[test]
fn test_select_star_without_sources() {
    let db = db();
    assert_eq!(db.select(&[&star()]).to_sql().text, "SELECT *");
}

#[test]
fn test_select_star_of_one_source() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let sql = db
        .select(&[&foo["id"], &star_of(bar)])
        .from(foo)
        .join(bar)
        .on(&bar["fooId"].eq(&foo["id"]))
        .to_sql();
    assert_eq!(
        sql.text,
        r#"SELECT foo.id, bar.id, bar.foo_id "fooId", bar.name, bar."with" FROM foo JOIN bar ON (bar.foo_id = foo.id)"#
    );
}

#[test]
fn test_select_reserved_alias() {
    let db = db();
    let user = db["bar"].as_("user");
    let sql = db
        .select(&[&user["id"], &user["with"]])
        .from(&user)
        .to_sql();
    assert_eq!(sql.text, r#"SELECT "user".id, "user"."with" FROM bar "user""#);
}

#[test]
fn test_select_limit_offset_fetch() {
    let db = db();
    let foo = &db["foo"];
    let base = db.select(&[&foo["id"]]).from(foo);

    let sql = base.limit(10).offset(5).to_sql();
    assert_eq!(sql.text, "SELECT foo.id FROM foo LIMIT $1 OFFSET $2");
    assert_eq!(sql.parameters, vec![Value::Int(10), Value::Int(5)]);

    assert_eq!(
        base.fetch(3).to_sql().text,
        "SELECT foo.id FROM foo FETCH FIRST $1 ROWS ONLY"
    );
    assert_eq!(base.limit_all().to_sql().text, "SELECT foo.id FROM foo LIMIT ALL");
}

#[test]
fn test_select_is_persistent() {
    let db = db();
    let foo = &db["foo"];
    let base = db.select(&[&foo["id"]]).from(foo);
    let filtered = base.where_(&foo["name"].eq("a"));

    assert_eq!(base.to_sql().text, "SELECT foo.id FROM foo");
    assert_eq!(filtered.to_sql().text, "SELECT foo.id FROM foo WHERE foo.name = $1");
}

#[test]
fn test_select_row_locks() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let sql = db
        .select(&[&foo["id"]])
        .from(foo)
        .join(bar)
        .on(&bar["fooId"].eq(&foo["id"]))
        .for_update()
        .of(bar)
        .skip_locked()
        .to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.id FROM foo JOIN bar ON (bar.foo_id = foo.id) FOR UPDATE OF bar SKIP LOCKED"
    );

    let sql = db.select(&[&foo["id"]]).from(foo).for_key_share().nowait().to_sql();
    assert_eq!(sql.text, "SELECT foo.id FROM foo FOR KEY SHARE NOWAIT");
}

#[test]
fn test_select_exists_sub_query() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let sub = db
        .select(&[&bar["id"]])
        .from(bar)
        .where_(&bar["fooId"].eq(&foo["id"]));
    let sql = db.select(&[&foo["id"]]).from(foo).where_(&exists(&sub)).to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.id FROM foo WHERE EXISTS (SELECT bar.id FROM bar WHERE bar.foo_id = foo.id)"
    );
}

#[test]
fn test_select_sub_select_as_from_item() {
    let db = db();
    let foo = &db["foo"];
    let sub = db
        .select(&[&foo["id"], &foo["createDate"]])
        .from(foo)
        .where_(&foo["name"].eq("a"))
        .as_("sub");
    let sql = db
        .select(&[&sub["id"], &sub["createDate"]])
        .from(&sub)
        .where_(&sub["id"].is_not_null())
        .to_sql();
    assert_eq!(
        sql.text,
        r#"SELECT sub.id, sub."createDate" "createDate" FROM (SELECT foo.id, foo.create_date "createDate" FROM foo WHERE foo.name = $1) AS sub WHERE sub.id IS NOT NULL"#
    );
}

#[test]
fn test_select_in_list() {
    let db = db();
    let foo = &db["foo"];
    let condition = foo["name"].in_list(["a", "b"]).unwrap();
    let sql = db.select(&[&foo["id"]]).from(foo).where_(&condition).to_sql();
    assert_eq!(sql.text, "SELECT foo.id FROM foo WHERE foo.name IN ($1, $2)");

    let err = foo["name"].in_list(Vec::<&str>::new()).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_select_in_delete_returning() {
    let db = db();
    let foo = &db["foo"];
    let deleted = db.delete_from(foo).returning(&["id"]).unwrap();
    let sql = db
        .select(&[&foo["id"]])
        .from(foo)
        .where_(&foo["id"].in_query(&deleted))
        .to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.id FROM foo WHERE foo.id IN (DELETE FROM foo RETURNING id)"
    );
}

#[test]
fn test_select_in_update_and_insert_returning() {
    let db = db();
    let foo = &db["foo"];
    let updated = db
        .update(foo)
        .set(&Record::new().set("name", "Test"))
        .unwrap()
        .returning(&["id"])
        .unwrap();
    let inserted = db
        .insert_into(foo)
        .values(Record::new().set("name", "Other"))
        .unwrap()
        .returning(&["id"])
        .unwrap();
    let sql = db
        .select(&[&foo["id"]])
        .from(foo)
        .where_(&foo["id"].in_query(&updated).or(foo["id"].in_query(&inserted)))
        .to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.id FROM foo WHERE foo.id IN (UPDATE foo SET name = $1 RETURNING id) \
         OR foo.id IN (INSERT INTO foo (name) VALUES ($2) RETURNING id)"
    );
    assert_eq!(
        sql.parameters,
        vec![Value::Text("Test".into()), Value::Text("Other".into())]
    );
}

#[test]
fn test_select_array_agg() {
    let db = db();
    let foo = &db["foo"];
    let ordered = foo["name"].order_by(&[&foo["name"].desc()]);
    let sql = db
        .select(&[&array_agg(&ordered)])
        .from(foo)
        .having(&[&array_agg(&foo["name"]).is_not_null()])
        .to_sql();
    assert_eq!(
        sql.text,
        r#"SELECT array_agg (foo.name ORDER BY foo.name DESC) "arrayAgg" FROM foo HAVING array_agg (foo.name) IS NOT NULL"#
    );
    assert!(sql.parameters.is_empty());
    assert_eq!(array_agg(&foo["name"]).data_type(), Some("text[]"));
}

#[test]
fn test_select_string_agg() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .select(&[&string_agg(&foo["name"], "-", &[&foo["name"].desc()])])
        .from(foo)
        .to_sql();
    assert_eq!(
        sql.text,
        r#"SELECT string_agg (foo.name, $1 ORDER BY foo.name DESC) "stringAgg" FROM foo"#
    );
    assert_eq!(sql.parameters, vec![Value::Text("-".into())]);

    let unordered = string_agg(&foo["name"], ", ", &[]).to_sql();
    assert_eq!(unordered.text, "string_agg (foo.name, $1)");
}

#[test]
fn test_select_bit_and_bit_or() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .select(&[&bit_and(&foo["value"]), &bit_or(&foo["value"])])
        .from(foo)
        .to_sql();
    assert_eq!(
        sql.text,
        r#"SELECT bit_and (foo.value) "bitAnd", bit_or (foo.value) "bitOr" FROM foo"#
    );
}

#[test]
fn test_select_where_any() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .select(&[&foo["id"]])
        .from(foo)
        .where_(&foo["name"].eq(any(["1", "2", "3"])))
        .to_sql();
    assert_eq!(sql.text, "SELECT foo.id FROM foo WHERE foo.name = ANY ($1)");
    assert_eq!(
        sql.parameters,
        vec![Value::Array(vec![
            Value::Text("1".into()),
            Value::Text("2".into()),
            Value::Text("3".into()),
        ])]
    );

    let empty = db
        .select(&[&foo["id"]])
        .from(foo)
        .where_(&foo["name"].eq(any(Vec::<&str>::new())))
        .to_sql();
    assert_eq!(empty.text, "SELECT foo.id FROM foo WHERE foo.name = ANY ($1)");
    assert_eq!(empty.parameters, vec![Value::Array(Vec::new())]);
}

#[test]
fn test_select_where_group() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .select(&[&foo["id"]])
        .from(foo)
        .where_(&group(&foo["value"].is_null()))
        .to_sql();
    assert_eq!(sql.text, "SELECT foo.id FROM foo WHERE (foo.value IS NULL)");
}

#[test]
fn test_select_case() {
    let db = db();
    let foo = &db["foo"];
    let greatness = db
        .case()
        .when(&foo["value"].gt(0))
        .then("great")
        .else_("not great")
        .end()
        .unwrap()
        .as_("greatness");
    let sql = db.select(&[&foo["id"], &greatness]).from(foo).to_sql();
    assert_eq!(
        sql.text,
        "SELECT foo.id, (CASE WHEN foo.value > $1 THEN $2 ELSE $3 END) greatness FROM foo"
    );
    assert_eq!(
        sql.parameters,
        vec![
            Value::Int(0),
            Value::Text("great".into()),
            Value::Text("not great".into()),
        ]
    );
}

#[test]
fn test_case_requires_a_branch() {
    let db = db();
    let err = db.case().else_(1).end().unwrap_err();
    assert_eq!(validation_message(err), "CASE requires at least one WHEN");
}

#[test]
fn test_select_comment() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .comment("list foos")
        .unwrap()
        .select(&[&foo["id"]])
        .from(foo)
        .to_sql();
    assert_eq!(sql.text, "/*list foos*/ SELECT foo.id FROM foo");
}

// ==================== INSERT ====================

#[test]
fn test_insert_basic() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .insert_into(foo)
        .values(Record::new().set("name", "Test").set("value", 123))
        .unwrap()
        .to_sql();
    assert_eq!(sql.text, "INSERT INTO foo (name, value) VALUES ($1, $2)");
    assert_eq!(sql.parameters, vec![Value::Text("Test".into()), Value::Int(123)]);
}

#[test]
fn test_insert_many_rows() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .insert_into(foo)
        .values([
            Record::new().set("name", "a").set("value", 1),
            Record::new().set("name", "b").set("value", None::<i32>),
        ])
        .unwrap()
        .to_sql();
    assert_eq!(sql.text, "INSERT INTO foo (name, value) VALUES ($1, $2), ($3, $4)");
    assert_eq!(sql.parameters[3], Value::Null);
}

#[test]
fn test_insert_explicit_columns() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .insert_into_columns(foo, &["value", "name"])
        .unwrap()
        .values(Record::new().set("name", "a").set("value", 1))
        .unwrap()
        .to_sql();
    assert_eq!(sql.text, "INSERT INTO foo (value, name) VALUES ($1, $2)");
    assert_eq!(sql.parameters, vec![Value::Int(1), Value::Text("a".into())]);

    assert!(db.insert_into_columns(foo, &["nope"]).is_err());
}

#[test]
fn test_insert_returning() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .insert_into(foo)
        .values(Record::new().set("name", "Test"))
        .unwrap()
        .returning(&["id", "createDate"])
        .unwrap()
        .to_sql();
    assert_eq!(
        sql.text,
        r#"INSERT INTO foo (name) VALUES ($1) RETURNING id, create_date "createDate""#
    );
}

#[test]
fn test_insert_sub_select_value() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let name = db.select(&[&bar["name"]]).from(bar).limit(1);
    let sql = db
        .insert_into(foo)
        .values(Record::new().set("name", &name).set("value", 1))
        .unwrap()
        .to_sql();
    assert_eq!(
        sql.text,
        "INSERT INTO foo (name, value) VALUES ((SELECT bar.name FROM bar LIMIT $1), $2)"
    );
}

#[test]
fn test_insert_on_conflict() {
    let db = db();
    let foo = &db["foo"];
    let insert = db
        .insert_into(foo)
        .values(Record::new().set("id", "x").set("name", "Test"))
        .unwrap();

    assert_eq!(
        insert.on_conflict(&["id"]).unwrap().do_nothing().to_sql().text,
        "INSERT INTO foo (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING"
    );

    let sql = insert
        .on_conflict(&["id"])
        .unwrap()
        .do_update_set(&Record::new().set("name", "Other").maybe("value", None::<i32>))
        .unwrap()
        .where_(&foo["value"].is_null())
        .to_sql();
    assert_eq!(
        sql.text,
        "INSERT INTO foo (id, name) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET name = $3 WHERE foo.value IS NULL"
    );

    assert_eq!(
        insert.on_conflict_on_constraint("foo_pkey").do_nothing().to_sql().text,
        "INSERT INTO foo (id, name) VALUES ($1, $2) ON CONFLICT ON CONSTRAINT foo_pkey DO NOTHING"
    );
}

#[test]
fn test_insert_default_values() {
    let db = db();
    assert_eq!(
        db.insert_into(&db["foo"]).default_values().to_sql().text,
        "INSERT INTO foo DEFAULT VALUES"
    );
}

#[test]
fn test_insert_select() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let sql = db
        .insert_into(bar)
        .select(&[&foo["id"].as_("fooId"), &foo["name"]])
        .unwrap()
        .from(foo)
        .where_(&foo["value"].gt(0))
        .to_sql();
    assert_eq!(
        sql.text,
        r#"INSERT INTO bar (foo_id, name) SELECT foo.id "fooId", foo.name FROM foo WHERE foo.value > $1"#
    );
}

#[test]
fn test_insert_rejects_incomplete_rows() {
    let db = db();
    let insert = db.insert_into(&db["foo"]);

    assert!(insert.values(Vec::<Record>::new()).unwrap_err().is_validation());
    assert!(insert.values(Record::new()).unwrap_err().is_validation());
    assert!(
        insert
            .values(Record::new().maybe("name", None::<&str>))
            .unwrap_err()
            .is_validation()
    );
    assert!(
        insert
            .values([
                Record::new().set("name", "a").set("value", 1),
                Record::new().set("name", "b"),
            ])
            .unwrap_err()
            .is_validation()
    );
    assert!(
        insert
            .values(Record::new().set("missing", 1))
            .unwrap_err()
            .is_validation()
    );
}

// ==================== UPDATE ====================

#[test]
fn test_update_returning() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .update(foo)
        .set(&Record::new().set("name", "Test"))
        .unwrap()
        .where_(&foo["value"].is_null())
        .returning(&["id", "createDate"])
        .unwrap()
        .to_sql();
    assert_eq!(
        sql.text,
        r#"UPDATE foo SET name = $1 WHERE foo.value IS NULL RETURNING id, create_date "createDate""#
    );
    assert_eq!(sql.parameters, vec![Value::Text("Test".into())]);
}

#[test]
fn test_update_from_aliased_table() {
    let db = db();
    let foo = &db["foo"];
    let user = db["bar"].as_("user");
    let sql = db
        .update(foo)
        .set(&Record::new().set("name", "Test"))
        .unwrap()
        .from(&user)
        .where_(&user["fooId"].eq(&foo["id"]).and(user["name"].is_not_null()))
        .to_sql();
    assert_eq!(
        sql.text,
        r#"UPDATE foo SET name = $1 FROM bar "user" WHERE "user".foo_id = foo.id AND "user".name IS NOT NULL"#
    );
}

#[test]
fn test_update_where_current_of() {
    let db = db();
    let sql = db
        .update(&db["foo"])
        .set(&Record::new().set("name", "Test"))
        .unwrap()
        .where_current_of("cursor1")
        .to_sql();
    assert_eq!(sql.text, "UPDATE foo SET name = $1 WHERE CURRENT OF cursor1");
    assert_eq!(sql.parameters.len(), 1);
}

#[test]
fn test_update_reserved_column() {
    let db = db();
    let sql = db
        .update(&db["bar"])
        .set(&Record::new().set("with", "Test"))
        .unwrap()
        .to_sql();
    assert_eq!(sql.text, r#"UPDATE bar SET "with" = $1"#);
}

#[test]
fn test_update_with_expression() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .update(foo)
        .set(&Record::new().set("value", foo["value"].plus(1)))
        .unwrap()
        .to_sql();
    assert_eq!(sql.text, "UPDATE foo SET value = foo.value + $1");
}

#[test]
fn test_update_skips_absent_values() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .update(foo)
        .set(
            &Record::new()
                .set("name", "Test")
                .maybe("value", None::<i32>)
                .set("bigValue", None::<i64>),
        )
        .unwrap()
        .to_sql();
    assert_eq!(sql.text, "UPDATE foo SET name = $1, big_value = $2");
    assert_eq!(sql.parameters[1], Value::Null);

    let err = db
        .update(foo)
        .set(&Record::new().maybe("name", None::<&str>))
        .unwrap_err();
    assert_eq!(validation_message(err), "SET must be setting at least one value.");
}

// ==================== DELETE ====================

#[test]
fn test_delete_using_returning() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let sql = db
        .delete_from(foo)
        .using(&[bar])
        .where_(&foo["id"].ne(&bar["id"]))
        .returning(&["id", "name", "createDate"])
        .unwrap()
        .to_sql();
    assert_eq!(
        sql.text,
        r#"DELETE FROM foo USING bar WHERE foo.id <> bar.id RETURNING id, name, create_date "createDate""#
    );
}

#[test]
fn test_delete_using_values_list() {
    let db = db();
    let foo = &db["foo"];
    let vals = db
        .values(
            "vals",
            [("name", text().not_null())],
            Record::new().set("name", "foo"),
        )
        .unwrap();
    let sql = db
        .delete_from(foo)
        .using(&[&vals])
        .where_(&foo["name"].eq(&vals["name"]))
        .to_sql();
    assert_eq!(
        sql.text,
        r#"DELETE FROM foo USING (VALUES ($1 :: text)) AS vals ("name") WHERE foo.name = vals.name"#
    );
    assert_eq!(sql.parameters, vec![Value::Text("foo".into())]);
}

#[test]
fn test_returning_rejects_unknown_and_empty_columns() {
    let db = db();
    let delete = db.delete_from(&db["foo"]);
    assert!(delete.returning(&[]).unwrap_err().is_validation());
    assert!(delete.returning(&["nope"]).unwrap_err().is_validation());
}

// ==================== TRUNCATE ====================

#[test]
fn test_truncate_options() {
    let db = db();
    let foo = &db["foo"];
    assert_eq!(db.truncate(foo).to_sql().text, "TRUNCATE foo");
    assert_eq!(
        db.truncate(foo).restart_identity().cascade().to_sql().text,
        "TRUNCATE foo RESTART IDENTITY CASCADE"
    );
    assert_eq!(
        db.truncate(foo).continue_identity().restrict().to_sql().text,
        "TRUNCATE foo CONTINUE IDENTITY RESTRICT"
    );
}

// ==================== VALUES ====================

#[test]
fn test_select_from_values_list() {
    let db = db();
    let vals = db
        .values(
            "vals",
            [("id", text().not_null()), ("region", text().not_null())],
            [
                Record::new().set("id", "foo").set("region", "aaa"),
                Record::new().set("id", "bar").set("region", "bbb"),
            ],
        )
        .unwrap();
    let sql = db.select(&[&vals["id"], &vals["region"]]).from(&vals).to_sql();
    assert_eq!(
        sql.text,
        r#"SELECT vals.id, vals.region FROM (VALUES ($1 :: text, $2 :: text), ($3, $4)) AS vals ("id", "region")"#
    );
    assert_eq!(sql.parameters.len(), 4);
}

#[test]
fn test_values_list_rejects_missing_values() {
    let db = db();
    let columns = [("id", text()), ("total", int8())];
    assert!(
        db.values("vals", columns.clone(), Vec::<Record>::new())
            .unwrap_err()
            .is_validation()
    );
    assert!(
        db.values("vals", columns, Record::new().set("id", "a"))
            .unwrap_err()
            .is_validation()
    );
}

// ==================== WITH ====================

#[test]
fn test_with_chained_ctes() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let a = db
        .comment("A")
        .unwrap()
        .select(&[&bar["id"]])
        .from(bar)
        .where_(&bar["name"].eq("Test"));

    let query = db
        .with()
        .cte("a", &a)
        .cte_with("b", |_| {
            Ok(db
                .comment("B")?
                .select(&[&foo["name"]])
                .from(foo)
                .where_(&foo["id"].eq("Test2")))
        })
        .unwrap()
        .query(|refs| {
            let (a, b) = (refs.cte("a")?, refs.cte("b")?);
            Ok(db
                .comment("C")?
                .select(&[&a["id"], &b["name"]])
                .from(a)
                .join(b))
        })
        .unwrap();

    let sql = query.to_sql();
    assert_eq!(
        sql.text,
        "/*C*/ WITH a AS (/*A*/ SELECT bar.id FROM bar WHERE bar.name = $1), b AS (/*B*/ SELECT foo.name FROM foo WHERE foo.id = $2) SELECT a.id, b.name FROM a JOIN b"
    );
    assert_eq!(
        sql.parameters,
        vec![Value::Text("Test".into()), Value::Text("Test2".into())]
    );
}

#[test]
fn test_with_materialization_and_update() {
    let db = db();
    let (foo, bar) = (&db["foo"], &db["bar"]);
    let ids = db.select(&[&bar["fooId"]]).from(bar);
    let query = db
        .with()
        .cte(("ids", Materialization::NotMaterialized), &ids)
        .query(|refs| {
            db.update(foo)
                .set(&Record::new().set("name", "x"))
                .map(|update| update.where_(&foo["id"].in_query(&refs["ids"]["fooId"])))
        })
        .unwrap();
    assert_eq!(
        query.to_sql().text,
        r#"WITH ids AS NOT MATERIALIZED (SELECT bar.foo_id "fooId" FROM bar) UPDATE foo SET name = $1 WHERE foo.id IN (ids."fooId")"#
    );
}

#[test]
fn test_with_requires_a_cte() {
    let db = db();
    let foo = &db["foo"];
    let err = db
        .with()
        .query(|_| Ok(db.select(&[&foo["id"]]).from(foo)))
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_with_unknown_cte() {
    let db = db();
    let err = db
        .with()
        .cte("a", &db.select(&[&db["foo"]["id"]]).from(&db["foo"]))
        .query(|refs| Ok(db.select(&[&refs.cte("b")?["id"]])))
        .unwrap_err();
    assert!(err.is_validation());
}

// ==================== INT8 ====================

#[test]
fn test_int8_guard_on_insert() {
    let db = db();
    let foo = &db["foo"];
    let row = |big: Value| Record::new().set("name", "test").set("bigValue", big);

    assert!(db.insert_into(foo).values(row(Value::Int(9_007_199_254_740_991))).is_ok());
    assert!(db.insert_into(foo).values(row(Value::Text("12345678901234567".into()))).is_ok());

    let err = db
        .insert_into(foo)
        .values(row(Value::Int(10_000_000_000_000_000)))
        .unwrap_err();
    assert!(err.is_int8_out_of_range());
    assert!(err.to_string().contains(r#"column "bigValue""#));

    let err = db
        .insert_into(foo)
        .values(row(Value::Int(-10_000_000_000_000_000)))
        .unwrap_err();
    assert!(err.is_int8_out_of_range());
}

#[test]
fn test_int8_guard_on_update_and_upsert() {
    let db = db();
    let foo = &db["foo"];
    let too_big = Record::new().set("bigValue", 10_000_000_000_000_000i64);

    assert!(db.update(foo).set(&too_big).unwrap_err().is_int8_out_of_range());

    let insert = db
        .insert_into(foo)
        .values(Record::new().set("name", "a"))
        .unwrap();
    let err = insert
        .on_conflict(&[])
        .unwrap()
        .do_update_set(&too_big)
        .unwrap_err();
    assert!(err.is_int8_out_of_range());
}

#[test]
fn test_int8_guard_skips_other_types() {
    let db = db();
    let foo = &db["foo"];
    let sql = db
        .update(foo)
        .set(&Record::new().set("value", 10_000_000_000_000_000i64))
        .unwrap()
        .to_sql();
    assert_eq!(sql.parameters, vec![Value::Int(10_000_000_000_000_000)]);
}

#[test]
fn test_int8_guard_on_values_list() {
    let db = db();
    let err = db
        .values(
            "vals",
            [("total", int8())],
            Record::new().set("total", 10_000_000_000_000_000i64),
        )
        .unwrap_err();
    assert!(err.is_int8_out_of_range());
}
